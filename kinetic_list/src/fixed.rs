// Copyright 2025 the Kinetic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Rows of one shared height.

use crate::model::{ExtentModel, ResizableExtentModel};

/// An [`ExtentModel`] where every row has the same extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedExtentModel {
    len: usize,
    extent: i32,
}

impl FixedExtentModel {
    /// Creates a model of `len` rows, each `extent` pixels tall. Negative extents become `0`.
    #[must_use]
    pub const fn new(len: usize, extent: i32) -> Self {
        Self {
            len,
            extent: if extent < 0 { 0 } else { extent },
        }
    }

    /// Sets the number of rows.
    pub const fn set_len(&mut self, len: usize) {
        self.len = len;
    }

    /// Sets the shared row extent. Negative extents become `0`.
    pub const fn set_extent(&mut self, extent: i32) {
        self.extent = if extent < 0 { 0 } else { extent };
    }

    /// The shared row extent.
    #[must_use]
    pub const fn extent(&self) -> i32 {
        self.extent
    }
}

fn rows(count: usize) -> i32 {
    i32::try_from(count).unwrap_or(i32::MAX)
}

impl ExtentModel for FixedExtentModel {
    fn len(&self) -> usize {
        self.len
    }

    fn total_extent(&mut self) -> i32 {
        self.extent.saturating_mul(rows(self.len))
    }

    fn extent_of(&mut self, _index: usize) -> i32 {
        self.extent
    }

    fn offset_of(&mut self, index: usize) -> i32 {
        self.extent.saturating_mul(rows(index))
    }

    fn index_at_offset(&mut self, offset: i32) -> usize {
        if self.len == 0 || self.extent == 0 || offset <= 0 {
            return 0;
        }
        usize::try_from(offset / self.extent)
            .unwrap_or(0)
            .min(self.len - 1)
    }
}

impl ResizableExtentModel for FixedExtentModel {
    fn set_len(&mut self, len: usize) {
        Self::set_len(self, len);
    }
}
