// Copyright 2025 the Kinetic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rows of individual heights, with a lazily maintained prefix-sum cache.

use crate::model::{ExtentModel, ResizableExtentModel};

/// An [`ExtentModel`] backed by per-row extents and prefix sums that are rebuilt on demand.
///
/// Suits rows that are measured one at a time: start from an estimate
/// ([`with_default_extent`](Self::with_default_extent)) and correct each row with
/// [`set_extent`](Self::set_extent) once it has been laid out.
#[derive(Clone, Default, Debug)]
pub struct PrefixSumExtentModel {
    extents: Vec<i32>,
    prefix_starts: Vec<i32>,
    dirty_from: Option<usize>,
    default_extent: i32,
}

impl PrefixSumExtentModel {
    /// Creates an empty model whose new rows have extent `0`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_default_extent(0)
    }

    /// Creates an empty model whose new rows have extent `default_extent`.
    #[must_use]
    pub fn with_default_extent(default_extent: i32) -> Self {
        Self {
            extents: Vec::new(),
            prefix_starts: Vec::new(),
            dirty_from: Some(0),
            default_extent: default_extent.max(0),
        }
    }

    /// Replaces every extent with `size(item)` for each item in order.
    pub fn rebuild<T, I>(&mut self, items: I, size: impl Fn(&T) -> i32)
    where
        I: IntoIterator<Item = T>,
    {
        self.extents.clear();
        self.extents
            .extend(items.into_iter().map(|item| size(&item).max(0)));
        self.prefix_starts.resize(self.extents.len(), 0);
        self.dirty_from = Some(0);
    }

    /// Resizes to `len` rows. New rows get the default extent.
    pub fn set_len(&mut self, len: usize) {
        let old = self.extents.len();
        self.extents.resize(len, self.default_extent);
        self.prefix_starts.resize(len, 0);
        let first_changed = old.min(len);
        self.dirty_from = Some(self.dirty_from.map_or(first_changed, |d| d.min(first_changed)));
    }

    /// Sets the extent of one row, growing the model if needed. Negative extents become `0`.
    pub fn set_extent(&mut self, index: usize, extent: i32) {
        if index >= self.extents.len() {
            self.set_len(index + 1);
        }
        self.extents[index] = extent.max(0);
        self.dirty_from = Some(self.dirty_from.map_or(index, |d| d.min(index)));
    }

    fn ensure_prefix_through(&mut self, through: usize) {
        let len = self.extents.len();
        let Some(dirty_from) = self.dirty_from else {
            return;
        };
        if len == 0 || dirty_from > through {
            return;
        }
        let through = through.min(len - 1);

        let mut pos = if dirty_from == 0 {
            0
        } else {
            self.prefix_starts[dirty_from - 1].saturating_add(self.extents[dirty_from - 1])
        };
        for i in dirty_from..=through {
            self.prefix_starts[i] = pos;
            pos = pos.saturating_add(self.extents[i]);
        }
        self.dirty_from = (through + 1 < len).then_some(through + 1);
    }

    /// Offset of the start of row `index`; `index == len` gives the total extent.
    pub fn offset_at(&mut self, index: usize) -> i32 {
        let len = self.extents.len();
        if index == 0 || len == 0 {
            return 0;
        }
        if index >= len {
            return self.total_extent_for_len(len);
        }
        self.ensure_prefix_through(index);
        self.prefix_starts[index]
    }

    /// Extent of row `index`, or `0` past the end.
    pub fn extent_at(&self, index: usize) -> i32 {
        self.extents.get(index).copied().unwrap_or(0)
    }

    /// Total extent of the first `len` rows (clamped to the row count).
    pub fn total_extent_for_len(&mut self, len: usize) -> i32 {
        let len = len.min(self.extents.len());
        if len == 0 {
            return 0;
        }
        let last = len - 1;
        self.ensure_prefix_through(last);
        self.prefix_starts[last].saturating_add(self.extents[last])
    }

    /// The row at or before `offset` among the first `len` rows.
    pub fn index_at_offset_for_len(&mut self, offset: i32, len: usize) -> usize {
        let len = len.min(self.extents.len());
        if len == 0 {
            return 0;
        }
        self.ensure_prefix_through(len - 1);
        let target = offset.max(0);
        self.prefix_starts[..len]
            .partition_point(|&start| start <= target)
            .saturating_sub(1)
    }
}

impl ExtentModel for PrefixSumExtentModel {
    fn len(&self) -> usize {
        self.extents.len()
    }

    fn total_extent(&mut self) -> i32 {
        let len = self.extents.len();
        self.total_extent_for_len(len)
    }

    fn extent_of(&mut self, index: usize) -> i32 {
        self.extent_at(index)
    }

    fn offset_of(&mut self, index: usize) -> i32 {
        self.offset_at(index)
    }

    fn index_at_offset(&mut self, offset: i32) -> usize {
        let len = self.extents.len();
        self.index_at_offset_for_len(offset, len)
    }
}

impl ResizableExtentModel for PrefixSumExtentModel {
    fn set_len(&mut self, len: usize) {
        Self::set_len(self, len);
    }
}

#[cfg(test)]
mod tests {
    use super::{ExtentModel, PrefixSumExtentModel};
    use crate::model::compute_visible_strip;

    #[test]
    fn grows_and_reports_extents() {
        let mut model = PrefixSumExtentModel::new();
        model.set_extent(0, 10);
        model.set_extent(1, 20);
        model.set_extent(2, 30);

        assert_eq!(model.len(), 3);
        assert_eq!(model.total_extent(), 60);
        assert_eq!(model.offset_of(1), 10);
        assert_eq!(model.offset_of(2), 30);
        assert_eq!(model.offset_of(3), 60);
        assert_eq!(model.extent_of(1), 20);
    }

    #[test]
    fn index_lookup_uses_prefix_sums() {
        let mut model = PrefixSumExtentModel::with_default_extent(10);
        model.set_len(3);
        assert_eq!(model.index_at_offset(-3), 0);
        assert_eq!(model.index_at_offset(5), 0);
        assert_eq!(model.index_at_offset(10), 1);
        assert_eq!(model.index_at_offset(25), 2);
        assert_eq!(model.index_at_offset(300), 2);
        assert_eq!(model.index_at_offset_for_len(25, 2), 1);
    }

    #[test]
    fn edits_invalidate_later_prefixes() {
        let mut model = PrefixSumExtentModel::with_default_extent(10);
        model.set_len(4);
        assert_eq!(model.offset_of(3), 30);
        model.set_extent(1, 50);
        assert_eq!(model.offset_of(1), 10);
        assert_eq!(model.offset_of(3), 70);
        model.set_len(2);
        assert_eq!(model.total_extent(), 60);
        model.set_len(3);
        assert_eq!(model.offset_of(2), 60);
        assert_eq!(model.total_extent(), 70);
    }

    #[test]
    fn rebuild_from_items() {
        let mut model = PrefixSumExtentModel::new();
        model.rebuild(["a", "bbb", "", "cc"], |s| 10 * i32::try_from(s.len()).unwrap());
        assert_eq!(model.total_extent(), 60);
        let strip = compute_visible_strip(&mut model, 35, 10, 0, 0);
        assert_eq!((strip.start, strip.end), (1, 4));
    }
}
