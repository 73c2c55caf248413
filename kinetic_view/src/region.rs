// Copyright 2025 the Kinetic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Invalidation regions accumulated between frames.

use kurbo::Rect;

/// Window-space rectangles that need repainting.
///
/// Rectangles may overlap and are not a minimal cover; [`Region::union_rect`] gives a single
/// bound for the paint traversal.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Region {
    /// Dirty rectangles in window coordinates.
    pub dirty_rects: Vec<Rect>,
}

impl Region {
    /// Adds `rect`, skipping empty rectangles and exact repeats of the last one.
    pub fn add(&mut self, rect: Rect) {
        if rect.is_zero_area() || self.dirty_rects.last() == Some(&rect) {
            return;
        }
        self.dirty_rects.push(rect);
    }

    /// Returns `true` if nothing needs repainting.
    pub fn is_empty(&self) -> bool {
        self.dirty_rects.is_empty()
    }

    /// Returns the union of all dirty rects.
    pub fn union_rect(&self) -> Option<Rect> {
        let mut it = self.dirty_rects.iter().copied();
        let first = it.next()?;
        Some(it.fold(first, |acc, r| acc.union(r)))
    }
}
