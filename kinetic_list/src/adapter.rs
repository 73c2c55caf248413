// Copyright 2025 the Kinetic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The data side of a list.

/// Supplies the rows of a [`ListView`](crate::ListView).
///
/// After the data changes, call [`ListView::notify_data_set_changed`](crate::ListView::notify_data_set_changed)
/// so the list's extent model follows.
pub trait Adapter {
    /// Number of rows.
    fn count(&self) -> usize;

    /// Stable identifier of the row at `position`.
    fn item_id(&self, position: usize) -> u64 {
        position as u64
    }
}

/// An [`Adapter`] over an owned vector.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VecAdapter<T> {
    items: Vec<T>,
}

impl<T> VecAdapter<T> {
    /// Wraps `items`.
    pub const fn new(items: Vec<T>) -> Self {
        Self { items }
    }

    /// Row at `position`.
    pub fn get(&self, position: usize) -> Option<&T> {
        self.items.get(position)
    }

    /// Mutable access to the rows. The list must be notified after the length changes.
    pub const fn items_mut(&mut self) -> &mut Vec<T> {
        &mut self.items
    }
}

impl<T> Adapter for VecAdapter<T> {
    fn count(&self) -> usize {
        self.items.len()
    }
}

impl<T> FromIterator<T> for VecAdapter<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
