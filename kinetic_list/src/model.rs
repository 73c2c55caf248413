// Copyright 2025 the Kinetic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Extent model traits and the visible-strip query.

use core::cmp;

/// Result of a visibility query over a list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisibleStrip {
    /// First visible position (inclusive).
    pub start: usize,
    /// One past the last visible position (exclusive).
    pub end: usize,

    /// Total extent of rows before `start`.
    pub before_extent: i32,
    /// Total extent of rows after `end`.
    pub after_extent: i32,
    /// Total extent of all rows.
    pub content_extent: i32,
}

impl VisibleStrip {
    /// Returns `true` if there are no visible rows.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Row extents of a list, indexed `0..len`, in whole pixels.
///
/// Methods that consult prefix sums take `&mut self` so implementations can keep caches.
pub trait ExtentModel {
    /// Number of rows.
    fn len(&self) -> usize;

    /// Returns `true` if there are no rows.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total extent of all rows.
    fn total_extent(&mut self) -> i32;

    /// Extent of one row; never negative.
    fn extent_of(&mut self, index: usize) -> i32;

    /// Offset of the start of row `index` from the top of the list.
    ///
    /// `offset_of(0) == 0`, and `offset_of(i + 1) >= offset_of(i) + extent_of(i)`.
    fn offset_of(&mut self, index: usize) -> i32;

    /// The row at or before `offset`, clamped into `0..len()`.
    fn index_at_offset(&mut self, offset: i32) -> usize;
}

/// An [`ExtentModel`] whose length follows the data set.
pub trait ResizableExtentModel: ExtentModel {
    /// Makes room for `len` rows. New rows get the model's default extent.
    fn set_len(&mut self, len: usize);
}

/// Computes which rows of `model` intersect a viewport.
///
/// `scroll_offset` is the top of the viewport in list coordinates; `overscan_before` and
/// `overscan_after` widen the query to realize rows just outside the viewport.
pub fn compute_visible_strip<M: ExtentModel + ?Sized>(
    model: &mut M,
    scroll_offset: i32,
    viewport_extent: i32,
    overscan_before: i32,
    overscan_after: i32,
) -> VisibleStrip {
    let len = model.len();
    if len == 0 {
        return VisibleStrip::default();
    }

    let content_extent = model.total_extent().max(0);
    if content_extent == 0 {
        // Every row collapsed.
        return VisibleStrip::default();
    }

    let scroll_offset = scroll_offset.max(0);
    let viewport_extent = viewport_extent.max(0);
    let min = scroll_offset.saturating_sub(overscan_before.max(0)).max(0);
    let max = scroll_offset
        .saturating_add(viewport_extent)
        .saturating_add(overscan_after.max(0))
        .min(content_extent);

    if max <= min {
        return VisibleStrip {
            start: 0,
            end: 0,
            before_extent: min,
            after_extent: (content_extent - min).max(0),
            content_extent,
        };
    }

    let mut start = cmp::min(model.index_at_offset(min), len - 1);
    while start > 0 && model.offset_of(start) > min {
        start -= 1;
    }
    // Skip rows that end exactly at the top edge.
    while start + 1 < len && model.offset_of(start + 1) <= min {
        start += 1;
    }

    let mut end = start;
    while end < len && model.offset_of(end) < max {
        end += 1;
    }

    let before_extent = model.offset_of(start);
    let end_start = if end < len {
        model.offset_of(end)
    } else {
        content_extent
    };

    VisibleStrip {
        start,
        end,
        before_extent,
        after_extent: (content_extent - end_start).max(0),
        content_extent,
    }
}
