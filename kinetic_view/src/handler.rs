// Copyright 2025 the Kinetic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The behavior attached to each view, and the context it runs in.

use core::any::Any;

use kinetic_motion::MotionEvent;
use kurbo::Rect;

use crate::config::ViewConfiguration;
use crate::tree::ViewTree;
use crate::types::{ScrollAxes, ViewId};

/// Behavior of a view: how it reacts to pointer events, animation frames, and nested scrolls.
///
/// Every method has a default, so a handler only overrides what it needs. The tree calls these
/// methods during dispatch with a [`ViewContext`] for the view the handler belongs to.
///
/// Defaults follow a passive view: pointer events are not handled, intercept hooks never
/// intercept, and the nested-scroll parent hooks decline to start a nested scroll and otherwise
/// pass the scroll on to this view's own nested-scrolling parent.
pub trait ViewHandler: Any {
    /// Handles a touch event delivered to this view. Return `true` if it was consumed.
    ///
    /// Returning `false` for `Down` means the view is not interested in the gesture.
    fn on_touch_event(&mut self, cx: &mut ViewContext<'_>, event: &MotionEvent) -> bool {
        let _ = (cx, event);
        false
    }

    /// Groups only: watches touch events on their way to children.
    ///
    /// Returning `true` steals the gesture: children that were receiving it get a cancel and
    /// subsequent events go to [`on_touch_event`](Self::on_touch_event) of this group.
    fn on_intercept_touch_event(&mut self, cx: &mut ViewContext<'_>, event: &MotionEvent) -> bool {
        let _ = (cx, event);
        false
    }

    /// Handles a hover event. Return `true` if it was consumed.
    fn on_hover_event(&mut self, cx: &mut ViewContext<'_>, event: &MotionEvent) -> bool {
        let _ = (cx, event);
        false
    }

    /// Groups only: returning `true` keeps hover events from reaching children.
    fn on_intercept_hover_event(&mut self, cx: &mut ViewContext<'_>, event: &MotionEvent) -> bool {
        let _ = (cx, event);
        false
    }

    /// Handles a pointer event that is neither touch nor hover (for example a scroll wheel).
    fn on_generic_motion_event(&mut self, cx: &mut ViewContext<'_>, event: &MotionEvent) -> bool {
        let _ = (cx, event);
        false
    }

    /// Groups only, with custom drawing order enabled: the child index to draw at
    /// `drawing_position`. Returning an index `>= child_count` is an error.
    fn child_drawing_order(&mut self, child_count: usize, drawing_position: usize) -> usize {
        let _ = child_count;
        drawing_position
    }

    /// Called once per animation frame; update scroll positions here.
    fn compute_scroll(&mut self, cx: &mut ViewContext<'_>) {
        let _ = cx;
    }

    /// Called when the view leaves its window.
    fn on_detached_from_window(&mut self, cx: &mut ViewContext<'_>) {
        let _ = cx;
    }

    /// Nested-scroll parent: whether to take part in a nested scroll started by `target`, a
    /// descendant reached through the direct child `child`.
    fn on_start_nested_scroll(
        &mut self,
        cx: &mut ViewContext<'_>,
        child: ViewId,
        target: ViewId,
        axes: ScrollAxes,
    ) -> bool {
        let _ = (cx, child, target, axes);
        false
    }

    /// Nested-scroll parent: the nested scroll was accepted. The tree records `axes` first.
    fn on_nested_scroll_accepted(
        &mut self,
        cx: &mut ViewContext<'_>,
        child: ViewId,
        target: ViewId,
        axes: ScrollAxes,
    ) {
        let _ = (cx, child, target, axes);
    }

    /// Nested-scroll parent: the nested scroll ended. Afterwards the tree stops this view's own
    /// nested scroll and clears its axes.
    fn on_stop_nested_scroll(&mut self, cx: &mut ViewContext<'_>, target: ViewId) {
        let _ = (cx, target);
    }

    /// Nested-scroll parent: `target` is about to scroll by `(dx, dy)`. Record the part this
    /// view consumes in `consumed`.
    fn on_nested_pre_scroll(
        &mut self,
        cx: &mut ViewContext<'_>,
        target: ViewId,
        dx: i32,
        dy: i32,
        consumed: &mut [i32; 2],
    ) {
        let _ = target;
        cx.dispatch_nested_pre_scroll(dx, dy, Some(consumed), None);
    }

    /// Nested-scroll parent: `target` scrolled, leaving `(dx_unconsumed, dy_unconsumed)`.
    fn on_nested_scroll(
        &mut self,
        cx: &mut ViewContext<'_>,
        target: ViewId,
        dx_consumed: i32,
        dy_consumed: i32,
        dx_unconsumed: i32,
        dy_unconsumed: i32,
    ) {
        let _ = target;
        cx.dispatch_nested_scroll(dx_consumed, dy_consumed, dx_unconsumed, dy_unconsumed, None);
    }

    /// Nested-scroll parent: `target` is about to fling. Return `true` to consume the fling.
    fn on_nested_pre_fling(
        &mut self,
        cx: &mut ViewContext<'_>,
        target: ViewId,
        velocity_x: f64,
        velocity_y: f64,
    ) -> bool {
        let _ = target;
        cx.dispatch_nested_pre_fling(velocity_x, velocity_y)
    }

    /// Nested-scroll parent: `target` flung (`consumed` says whether it moved itself). Return
    /// `true` if this view reacted to the fling.
    fn on_nested_fling(
        &mut self,
        cx: &mut ViewContext<'_>,
        target: ViewId,
        velocity_x: f64,
        velocity_y: f64,
        consumed: bool,
    ) -> bool {
        let _ = target;
        cx.dispatch_nested_fling(velocity_x, velocity_y, consumed)
    }
}

/// A handler with only default behavior.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainView;

impl ViewHandler for PlainView {}

/// Access to the tree from inside a handler, scoped to the handler's own view.
#[derive(Debug)]
pub struct ViewContext<'a> {
    pub(crate) tree: &'a mut ViewTree,
    pub(crate) id: ViewId,
}

impl ViewContext<'_> {
    /// The view this handler belongs to.
    pub const fn id(&self) -> ViewId {
        self.id
    }

    /// Read access to the whole tree.
    pub fn tree(&self) -> &ViewTree {
        self.tree
    }

    /// Gesture thresholds of the tree.
    pub fn config(&self) -> &ViewConfiguration {
        self.tree.config()
    }

    /// This view's frame in its parent's content coordinates.
    pub fn frame(&self) -> Rect {
        self.tree.frame(self.id).unwrap_or(Rect::ZERO)
    }

    /// Current scroll offset.
    pub fn scroll(&self) -> (i32, i32) {
        self.tree.scroll(self.id).unwrap_or((0, 0))
    }

    /// Scrolls this view's content to `(x, y)` and invalidates it if it moved.
    pub fn scroll_to(&mut self, x: i32, y: i32) {
        self.tree.scroll_to(self.id, x, y);
    }

    /// Scrolls this view's content by `(dx, dy)`.
    pub fn scroll_by(&mut self, dx: i32, dy: i32) {
        let (x, y) = self.scroll();
        self.scroll_to(x + dx, y + dy);
    }

    /// Marks this view's bounds for repaint.
    pub fn invalidate(&mut self) {
        self.tree.invalidate(self.id);
    }

    /// Requests another animation frame and a repaint of this view.
    pub fn post_invalidate_on_animation(&mut self) {
        self.tree.request_animation_frame();
        self.tree.invalidate(self.id);
    }

    /// Asks the parent chain not to intercept the current gesture (or to allow it again).
    pub fn request_parent_disallow_intercept_touch_event(&mut self, disallow: bool) {
        if let Some(parent) = self.tree.parent_of(self.id) {
            self.tree
                .request_disallow_intercept_touch_event(parent, disallow);
        }
    }

    /// Starts a nested scroll along `axes`. Returns `true` if an ancestor cooperates.
    pub fn start_nested_scroll(&mut self, axes: ScrollAxes) -> bool {
        self.tree.start_nested_scroll(self.id, axes)
    }

    /// Ends the current nested scroll, if any.
    pub fn stop_nested_scroll(&mut self) {
        self.tree.stop_nested_scroll(self.id);
    }

    /// Returns `true` while a nested scroll with an ancestor is in progress.
    pub fn has_nested_scrolling_parent(&self) -> bool {
        self.tree.has_nested_scrolling_parent(self.id)
    }

    /// Offers `(dx, dy)` to the nested-scrolling parent before scrolling. See
    /// [`ViewTree::dispatch_nested_pre_scroll`].
    pub fn dispatch_nested_pre_scroll(
        &mut self,
        dx: i32,
        dy: i32,
        consumed: Option<&mut [i32; 2]>,
        offset_in_window: Option<&mut [i32; 2]>,
    ) -> bool {
        self.tree
            .dispatch_nested_pre_scroll(self.id, dx, dy, consumed, offset_in_window)
    }

    /// Reports a scroll step to the nested-scrolling parent. See
    /// [`ViewTree::dispatch_nested_scroll`].
    pub fn dispatch_nested_scroll(
        &mut self,
        dx_consumed: i32,
        dy_consumed: i32,
        dx_unconsumed: i32,
        dy_unconsumed: i32,
        offset_in_window: Option<&mut [i32; 2]>,
    ) -> bool {
        self.tree.dispatch_nested_scroll(
            self.id,
            dx_consumed,
            dy_consumed,
            dx_unconsumed,
            dy_unconsumed,
            offset_in_window,
        )
    }

    /// Offers a fling to the nested-scrolling parent first.
    pub fn dispatch_nested_pre_fling(&mut self, velocity_x: f64, velocity_y: f64) -> bool {
        self.tree
            .dispatch_nested_pre_fling(self.id, velocity_x, velocity_y)
    }

    /// Reports a fling to the nested-scrolling parent.
    pub fn dispatch_nested_fling(&mut self, velocity_x: f64, velocity_y: f64, consumed: bool) -> bool {
        self.tree
            .dispatch_nested_fling(self.id, velocity_x, velocity_y, consumed)
    }
}
