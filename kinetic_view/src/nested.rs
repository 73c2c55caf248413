// Copyright 2025 the Kinetic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Nested scroll negotiation between a scrolling view and its ancestors.
//!
//! A view starts a nested scroll by walking up its ancestors until one accepts through
//! [`ViewHandler::on_start_nested_scroll`](crate::ViewHandler::on_start_nested_scroll). That
//! ancestor then gets a chance to consume each scroll step before the child applies it
//! (pre-scroll) and to use whatever the child left unconsumed afterwards.

use crate::tree::ViewTree;
use crate::types::{ScrollAxes, ViewFlags, ViewId};

impl ViewTree {
    /// Returns `true` if nested scrolling is enabled for the view.
    pub fn is_nested_scrolling_enabled(&self, id: ViewId) -> bool {
        self.flags(id)
            .is_some_and(|f| f.contains(ViewFlags::NESTED_SCROLLING_ENABLED))
    }

    /// The live ancestor cooperating in the view's current nested scroll.
    fn nested_scrolling_parent(&self, id: ViewId) -> Option<ViewId> {
        self.node(id)?
            .nested_parent
            .filter(|parent| self.is_alive(*parent))
    }

    /// Returns `true` while the view has a nested scroll in progress with an ancestor.
    pub fn has_nested_scrolling_parent(&self, id: ViewId) -> bool {
        self.nested_scrolling_parent(id).is_some()
    }

    /// Starts a nested scroll along `axes` for view `id`.
    ///
    /// Returns `true` if an ancestor accepted, or if a nested scroll is already in progress.
    pub fn start_nested_scroll(&mut self, id: ViewId, axes: ScrollAxes) -> bool {
        if self.has_nested_scrolling_parent(id) {
            return true;
        }
        if !self.is_nested_scrolling_enabled(id) {
            return false;
        }
        let mut child = id;
        let mut cur = self.parent_of(id);
        while let Some(parent) = cur {
            let accepted = self.with_handler(parent, false, |handler, cx| {
                handler.on_start_nested_scroll(cx, child, id, axes)
            });
            if accepted {
                if let Some(node) = self.node_mut(id) {
                    node.nested_parent = Some(parent);
                }
                if let Some(group) = self.group_mut(parent) {
                    group.nested_axes = axes;
                }
                self.with_handler(parent, (), |handler, cx| {
                    handler.on_nested_scroll_accepted(cx, child, id, axes);
                });
                tracing::trace!(?id, ?parent, ?axes, "nested scroll started");
                return true;
            }
            child = parent;
            cur = self.parent_of(parent);
        }
        false
    }

    /// Ends the view's nested scroll, if one is in progress.
    pub fn stop_nested_scroll(&mut self, id: ViewId) {
        let Some(node) = self.node_mut(id) else {
            return;
        };
        let Some(parent) = node.nested_parent.take() else {
            return;
        };
        if !self.is_alive(parent) {
            return;
        }
        self.with_handler(parent, (), |handler, cx| handler.on_stop_nested_scroll(cx, id));
        // A parent relaying to its own ancestors ends its part in the negotiation too.
        if self.has_nested_scrolling_parent(parent) {
            self.stop_nested_scroll(parent);
        }
        if let Some(group) = self.group_mut(parent) {
            group.nested_axes = ScrollAxes::empty();
        }
    }

    /// Offers a scroll step of `(dx, dy)` to the nested-scrolling parent before the view
    /// applies it.
    ///
    /// `consumed` receives what the parent used. `offset_in_window` receives how far the view
    /// moved in the window meanwhile. Returns `true` if the parent consumed any of the step.
    pub fn dispatch_nested_pre_scroll(
        &mut self,
        id: ViewId,
        dx: i32,
        dy: i32,
        consumed: Option<&mut [i32; 2]>,
        offset_in_window: Option<&mut [i32; 2]>,
    ) -> bool {
        if !self.is_nested_scrolling_enabled(id) {
            return false;
        }
        let Some(parent) = self.nested_scrolling_parent(id) else {
            return false;
        };
        if dx == 0 && dy == 0 {
            if let Some(offset) = offset_in_window {
                *offset = [0, 0];
            }
            return false;
        }

        let start = self.location_in_window(id);
        let mut scratch = [0; 2];
        let consumed = consumed.unwrap_or(&mut scratch);
        *consumed = [0, 0];
        self.with_handler(parent, (), |handler, cx| {
            handler.on_nested_pre_scroll(cx, id, dx, dy, &mut *consumed);
        });
        if let Some(offset) = offset_in_window {
            let end = self.location_in_window(id);
            *offset = [end[0] - start[0], end[1] - start[1]];
        }
        consumed[0] != 0 || consumed[1] != 0
    }

    /// Reports a scroll step to the nested-scrolling parent after the view applied what it
    /// could.
    ///
    /// Returns `true` if the step was reported, which requires some non-zero delta.
    pub fn dispatch_nested_scroll(
        &mut self,
        id: ViewId,
        dx_consumed: i32,
        dy_consumed: i32,
        dx_unconsumed: i32,
        dy_unconsumed: i32,
        offset_in_window: Option<&mut [i32; 2]>,
    ) -> bool {
        if !self.is_nested_scrolling_enabled(id) {
            return false;
        }
        let Some(parent) = self.nested_scrolling_parent(id) else {
            return false;
        };
        if dx_consumed == 0 && dy_consumed == 0 && dx_unconsumed == 0 && dy_unconsumed == 0 {
            if let Some(offset) = offset_in_window {
                *offset = [0, 0];
            }
            return false;
        }

        let start = self.location_in_window(id);
        self.with_handler(parent, (), |handler, cx| {
            handler.on_nested_scroll(cx, id, dx_consumed, dy_consumed, dx_unconsumed, dy_unconsumed);
        });
        if let Some(offset) = offset_in_window {
            let end = self.location_in_window(id);
            *offset = [end[0] - start[0], end[1] - start[1]];
        }
        true
    }

    /// Offers a fling to the nested-scrolling parent before the view flings.
    ///
    /// Returns `true` if the parent consumed it; the view should then not fling itself.
    pub fn dispatch_nested_pre_fling(&mut self, id: ViewId, velocity_x: f64, velocity_y: f64) -> bool {
        if !self.is_nested_scrolling_enabled(id) {
            return false;
        }
        let Some(parent) = self.nested_scrolling_parent(id) else {
            return false;
        };
        self.with_handler(parent, false, |handler, cx| {
            handler.on_nested_pre_fling(cx, id, velocity_x, velocity_y)
        })
    }

    /// Reports a fling to the nested-scrolling parent. `consumed` says whether the view
    /// flung itself.
    pub fn dispatch_nested_fling(
        &mut self,
        id: ViewId,
        velocity_x: f64,
        velocity_y: f64,
        consumed: bool,
    ) -> bool {
        if !self.is_nested_scrolling_enabled(id) {
            return false;
        }
        let Some(parent) = self.nested_scrolling_parent(id) else {
            return false;
        };
        self.with_handler(parent, false, |handler, cx| {
            handler.on_nested_fling(cx, id, velocity_x, velocity_y, consumed)
        })
    }
}
