// Copyright 2025 the Kinetic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer identifiers and pointer-id bit sets.

use core::fmt;
use core::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};

/// Stable identifier of a pointer for the duration of a gesture.
pub type PointerId = u32;

/// Largest valid pointer id.
pub const MAX_POINTER_ID: PointerId = 31;

/// A set of pointer ids, one bit per id.
///
/// Touch targets own the pointers in their set; a set never holds ids above
/// [`MAX_POINTER_ID`].
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PointerIdBits(u32);

impl PointerIdBits {
    /// The empty set.
    pub const NONE: Self = Self(0);
    /// Every pointer id.
    pub const ALL: Self = Self(u32::MAX);

    /// Creates a set from raw bits.
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Creates the set containing only `id`.
    ///
    /// `id` must not exceed [`MAX_POINTER_ID`].
    pub const fn from_id(id: PointerId) -> Self {
        debug_assert!(id <= MAX_POINTER_ID, "pointer id out of range");
        Self(1 << (id & MAX_POINTER_ID))
    }

    /// Raw bits.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Returns `true` if no id is in the set.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns `true` if `id` is in the set.
    pub const fn contains_id(self, id: PointerId) -> bool {
        id <= MAX_POINTER_ID && self.0 & (1 << id) != 0
    }

    /// Returns `true` if the sets share an id.
    pub const fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Ids in `self` but not in `other`.
    #[must_use]
    pub const fn without(self, other: Self) -> Self {
        Self(self.0 & !other.0)
    }

    /// Number of ids in the set.
    pub const fn count(self) -> u32 {
        self.0.count_ones()
    }

    /// Smallest id in the set.
    pub const fn first_id(self) -> Option<PointerId> {
        if self.0 == 0 {
            None
        } else {
            Some(self.0.trailing_zeros())
        }
    }

    /// Iterates the ids in ascending order.
    pub fn ids(self) -> impl Iterator<Item = PointerId> {
        (0..=MAX_POINTER_ID).filter(move |id| self.contains_id(*id))
    }
}

impl fmt::Debug for PointerIdBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::ALL {
            return f.write_str("PointerIdBits(ALL)");
        }
        f.debug_tuple("PointerIdBits")
            .field(&format_args!("{:#b}", self.0))
            .finish()
    }
}

impl BitAnd for PointerIdBits {
    type Output = Self;
    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl BitAndAssign for PointerIdBits {
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0;
    }
}

impl BitOr for PointerIdBits {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for PointerIdBits {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl Not for PointerIdBits {
    type Output = Self;
    fn not(self) -> Self {
        Self(!self.0)
    }
}

impl FromIterator<PointerId> for PointerIdBits {
    fn from_iter<I: IntoIterator<Item = PointerId>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Self::NONE, |acc, id| acc | Self::from_id(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_operations() {
        let a: PointerIdBits = [0, 3].into_iter().collect();
        let b = PointerIdBits::from_id(3);
        assert!(a.contains_id(0) && a.contains_id(3));
        assert!(!a.contains_id(1));
        assert_eq!((a & b), b);
        assert_eq!(a.without(b), PointerIdBits::from_id(0));
        assert_eq!(a.count(), 2);
        assert_eq!(a.first_id(), Some(0));
        assert_eq!(a.ids().collect::<Vec<_>>(), vec![0, 3]);
        assert!((!a).intersects(PointerIdBits::from_id(31)));
        assert!(PointerIdBits::NONE.first_id().is_none());
        assert!(!PointerIdBits::ALL.contains_id(32));
    }
}
