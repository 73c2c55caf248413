// Copyright 2025 the Kinetic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the view tree: view identifiers, flags, and local geometry.

use kurbo::{Affine, Rect};

/// Identifier for a view in the tree (generational).
///
/// A stale id (its view was removed) resolves to nothing, so ids can be held as non-owning
/// references.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ViewId(pub(crate) u32, pub(crate) u32);

impl ViewId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

bitflags::bitflags! {
    /// Per-view state flags.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ViewFlags: u16 {
        /// View is visible.
        const VISIBLE                  = 0b0000_0001;
        /// View runs a transient animation and receives pointer events even while invisible.
        const ANIMATING                = 0b0000_0010;
        /// The next event routed to this view through a parent is turned into a cancel.
        const CANCEL_NEXT_UP_EVENT     = 0b0000_0100;
        /// A hovering pointer is over this view.
        const HOVERED                  = 0b0000_1000;
        /// View may start nested scrolls with its ancestors.
        const NESTED_SCROLLING_ENABLED = 0b0001_0000;
        /// View is part of a window.
        const ATTACHED                 = 0b0010_0000;
    }
}

impl Default for ViewFlags {
    fn default() -> Self {
        Self::VISIBLE
    }
}

bitflags::bitflags! {
    /// Per-group dispatch flags.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct GroupFlags: u8 {
        /// A descendant asked this group and its ancestors not to intercept the current gesture.
        const DISALLOW_INTERCEPT     = 0b0000_0001;
        /// Pointers going down over different children are routed to each child separately.
        const SPLIT_MOTION_EVENTS    = 0b0000_0010;
        /// Children are drawn (and hit-tested) in the order given by the group's handler.
        const CHILDREN_DRAWING_ORDER = 0b0000_0100;
    }
}

impl Default for GroupFlags {
    fn default() -> Self {
        Self::SPLIT_MOTION_EVENTS
    }
}

bitflags::bitflags! {
    /// Axes of a nested scroll.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct ScrollAxes: u8 {
        /// Horizontal scrolling.
        const HORIZONTAL = 0b01;
        /// Vertical scrolling.
        const VERTICAL   = 0b10;
    }
}

/// Local geometry and flags for a view.
#[derive(Clone, Debug)]
pub struct LocalView {
    /// Frame in the parent's content coordinates (left, top, right, bottom).
    pub frame: Rect,
    /// Transform of the view's content relative to its frame origin.
    ///
    /// A parent point maps into the view as
    /// `transform⁻¹ * (point + parent_scroll - frame.origin())`.
    pub transform: Affine,
    /// Elevation. Children with higher `z` are drawn on top of, and hit before, lower ones.
    pub z: f64,
    /// State flags.
    pub flags: ViewFlags,
    /// Application-chosen tag for looking the view up again.
    pub tag: Option<i32>,
}

impl Default for LocalView {
    fn default() -> Self {
        Self {
            frame: Rect::ZERO,
            transform: Affine::IDENTITY,
            z: 0.0,
            flags: ViewFlags::default(),
            tag: None,
        }
    }
}

impl LocalView {
    /// A visible view occupying `frame`.
    pub fn with_frame(frame: Rect) -> Self {
        Self {
            frame,
            ..Self::default()
        }
    }

    /// Sets the lookup tag.
    #[must_use]
    pub fn with_tag(mut self, tag: i32) -> Self {
        self.tag = Some(tag);
        self
    }
}
