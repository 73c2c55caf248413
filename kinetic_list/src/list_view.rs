// Copyright 2025 the Kinetic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A vertically scrolling list driven by touch drags and flings.

use kinetic_motion::{Action, MotionEvent, PointerId, VelocityTracker};
use kinetic_scroller::{AnimationClock, MonotonicClock, OverScroller, ScrollConfig};
use kinetic_view::{ScrollAxes, ViewContext, ViewHandler};

use crate::adapter::Adapter;
use crate::model::{ExtentModel, ResizableExtentModel, VisibleStrip, compute_visible_strip};

/// A list of rows that scrolls vertically inside its view.
///
/// The list keeps its scroll offset in the view tree (see [`ViewContext::scroll`]) and takes the
/// height of its frame as the viewport. Row geometry comes from the extent model `M`; the row
/// count comes from the adapter `A`.
///
/// Touch handling follows the usual drag-then-fling pattern:
///
/// - A drag starts once the active pointer travels further than the touch slop. If the list is
///   a group with touchable rows, it steals the gesture from them at that point.
/// - Each drag step is offered to the nested-scrolling parent first. The list scrolls by what
///   is left, within its content, and reports any remainder back to the parent.
/// - On release, a fast enough pointer flings the list (after the parent had a chance to take
///   the fling); otherwise the list springs back into range.
///
/// Install the list with [`ViewTree::insert_group`](kinetic_view::ViewTree::insert_group) and
/// enable nested scrolling on it to cooperate with scrolling ancestors.
#[derive(Debug)]
pub struct ListView<A, M, C: AnimationClock = MonotonicClock> {
    adapter: A,
    model: M,
    scroller: OverScroller<C>,
    velocity: VelocityTracker,
    strip: VisibleStrip,
    overscan: i32,
    dragging: bool,
    active_pointer: Option<PointerId>,
    last_motion_y: f64,
    nested_y_offset: i32,
    mismatch_reported: bool,
}

impl<A: Adapter, M: ExtentModel> ListView<A, M> {
    /// Creates a list animated against the wall clock.
    pub fn new(adapter: A, model: M) -> Self {
        Self::with_clock(adapter, model, ScrollConfig::default(), MonotonicClock::new())
    }
}

impl<A: Adapter, M: ExtentModel, C: AnimationClock> ListView<A, M, C> {
    /// Creates a list whose flings use `config` and read time from `clock`.
    pub fn with_clock(adapter: A, model: M, config: ScrollConfig, clock: C) -> Self {
        Self {
            adapter,
            model,
            scroller: OverScroller::with_clock(config, clock),
            velocity: VelocityTracker::new(),
            strip: VisibleStrip::default(),
            overscan: 0,
            dragging: false,
            active_pointer: None,
            last_motion_y: 0.0,
            nested_y_offset: 0,
            mismatch_reported: false,
        }
    }

    /// The adapter.
    pub const fn adapter(&self) -> &A {
        &self.adapter
    }

    /// Mutable access to the adapter. Call
    /// [`notify_data_set_changed`](Self::notify_data_set_changed) after changing the row count.
    pub const fn adapter_mut(&mut self) -> &mut A {
        &mut self.adapter
    }

    /// The extent model.
    pub const fn model(&self) -> &M {
        &self.model
    }

    /// Mutable access to the extent model.
    pub const fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    /// The scroller animating flings and smooth scrolls.
    pub const fn scroller(&self) -> &OverScroller<C> {
        &self.scroller
    }

    /// Extra pixels above and below the viewport counted into [`visible_strip`](Self::visible_strip).
    pub fn set_overscan(&mut self, overscan: i32) {
        self.overscan = overscan.max(0);
    }

    /// Returns `true` while a touch drag is scrolling the list.
    pub const fn is_being_dragged(&self) -> bool {
        self.dragging
    }

    /// Rows as of the last layout.
    pub const fn visible_strip(&self) -> VisibleStrip {
        self.strip
    }

    /// First row intersecting the viewport as of the last layout.
    pub fn first_visible_position(&self) -> Option<usize> {
        (!self.strip.is_empty()).then_some(self.strip.start)
    }

    /// Last row intersecting the viewport as of the last layout.
    pub fn last_visible_position(&self) -> Option<usize> {
        (!self.strip.is_empty()).then(|| self.strip.end - 1)
    }

    /// Flings the list with `velocity_y` pixels per second. Positive velocities move towards
    /// the end of the list.
    pub fn fling(&mut self, cx: &mut ViewContext<'_>, velocity_y: f64) {
        let (x, y) = cx.scroll();
        let max = self.max_scroll(cx);
        let over = cx.config().overfling_distance;
        self.scroller
            .fling_with_overscroll(x, y, 0.0, velocity_y, 0, 0, 0, max, 0, over);
        tracing::debug!(velocity_y, from = y, to = self.scroller.final_y(), "list fling");
        cx.post_invalidate_on_animation();
    }

    /// Animates a scroll by `distance` pixels over `duration` milliseconds, stopping at the ends
    /// of the list.
    pub fn smooth_scroll_by(&mut self, cx: &mut ViewContext<'_>, distance: i32, duration: i64) {
        let (x, y) = cx.scroll();
        let target = y.saturating_add(distance).clamp(0, self.max_scroll(cx));
        if target == y {
            return;
        }
        self.scroller
            .start_scroll_with_duration(x, y, 0, target - y, duration.max(1));
        cx.post_invalidate_on_animation();
    }

    /// Scrolls by `dy` pixels right away, stopping at the ends of the list.
    ///
    /// Returns `true` if the list moved.
    pub fn scroll_list_by(&mut self, cx: &mut ViewContext<'_>, dy: i32) -> bool {
        let (x, y) = cx.scroll();
        let target = y.saturating_add(dy).clamp(0, self.max_scroll(cx));
        cx.scroll_to(x, target);
        self.layout(cx);
        target != y
    }

    /// Jumps so that the top of row `position` sits `y` pixels below the top of the list,
    /// within the scrollable range. Stops any running animation.
    pub fn set_selection_from_top(&mut self, cx: &mut ViewContext<'_>, position: usize, y: i32) {
        self.scroller.abort_animation();
        let len = self.row_count();
        if len == 0 {
            return;
        }
        let top = self.model.offset_of(position.min(len - 1));
        let target = top.saturating_sub(y).clamp(0, self.max_scroll(cx));
        let (x, _) = cx.scroll();
        cx.scroll_to(x, target);
        self.layout(cx);
    }

    /// Recomputes the visible rows from the current scroll offset and frame.
    pub fn layout(&mut self, cx: &ViewContext<'_>) {
        let (_, y) = cx.scroll();
        let viewport = viewport_height(cx);
        let len = self.row_count();
        let mut rows = Rows {
            model: &mut self.model,
            len,
        };
        self.strip = compute_visible_strip(&mut rows, y, viewport, self.overscan, self.overscan);
    }

    /// Largest scroll offset that still fills the viewport.
    pub fn max_scroll(&mut self, cx: &ViewContext<'_>) -> i32 {
        let len = self.row_count();
        let content = Rows {
            model: &mut self.model,
            len,
        }
        .total_extent();
        (content - viewport_height(cx)).max(0)
    }

    /// Rows the list renders: the adapter count, or the model length if that is smaller.
    fn row_count(&mut self) -> usize {
        let count = self.adapter.count();
        let len = self.model.len();
        if count != len && !self.mismatch_reported {
            tracing::error!(
                adapter = count,
                model = len,
                "adapter count changed without notify_data_set_changed; showing the smaller count"
            );
            self.mismatch_reported = true;
        }
        count.min(len)
    }

    fn end_drag(&mut self, cx: &mut ViewContext<'_>) {
        self.dragging = false;
        self.active_pointer = None;
        self.velocity.clear();
        cx.stop_nested_scroll();
    }

    fn spring_back(&mut self, cx: &mut ViewContext<'_>) {
        let (x, y) = cx.scroll();
        let max = self.max_scroll(cx);
        if self.scroller.spring_back(x, y, 0, 0, 0, max) {
            cx.post_invalidate_on_animation();
        }
    }

    fn fling_with_nested_dispatch(&mut self, cx: &mut ViewContext<'_>, velocity_y: f64) {
        let (_, y) = cx.scroll();
        let max = self.max_scroll(cx);
        let can_fling = (y > 0 || velocity_y > 0.0) && (y < max || velocity_y < 0.0);
        if !cx.dispatch_nested_pre_fling(0.0, velocity_y) {
            cx.dispatch_nested_fling(0.0, velocity_y, can_fling);
            if can_fling {
                self.fling(cx, velocity_y);
            }
        }
    }

    fn on_secondary_pointer_up(&mut self, event: &MotionEvent, index: usize) {
        if event.pointer_id(index) != self.active_pointer {
            return;
        }
        let next = if index == 0 { 1 } else { 0 };
        self.last_motion_y = event.y_at(next);
        self.active_pointer = event.pointer_id(next);
        self.velocity.clear();
    }

    fn begin_gesture(&mut self, cx: &mut ViewContext<'_>, event: &MotionEvent) {
        self.last_motion_y = event.y();
        self.active_pointer = event.pointer_id(0);
        cx.start_nested_scroll(ScrollAxes::VERTICAL);
    }

    /// Scrolls the content by a drag step of `delta_y`, sharing it with the nested-scrolling
    /// parent. Returns how far the list moved in the window along the way.
    fn drag_by(&mut self, cx: &mut ViewContext<'_>, delta_y: i32) -> i32 {
        let (x, old_y) = cx.scroll();
        let max = self.max_scroll(cx);
        let over = cx.config().overscroll_distance;
        let new_y = old_y.saturating_add(delta_y).clamp(-over, max + over);
        cx.scroll_to(x, new_y);
        self.layout(cx);

        let scrolled = new_y - old_y;
        let mut offset = [0; 2];
        if cx.dispatch_nested_scroll(0, scrolled, 0, delta_y - scrolled, Some(&mut offset)) {
            offset[1]
        } else {
            0
        }
    }
}

impl<A: Adapter, M: ResizableExtentModel, C: AnimationClock> ListView<A, M, C> {
    /// Resizes the extent model to the adapter's count and keeps the scroll offset in range.
    pub fn notify_data_set_changed(&mut self, cx: &mut ViewContext<'_>) {
        self.model.set_len(self.adapter.count());
        self.mismatch_reported = false;
        let (x, y) = cx.scroll();
        let max = self.max_scroll(cx);
        if y > max {
            self.scroller.abort_animation();
            cx.scroll_to(x, max);
        }
        self.layout(cx);
        cx.invalidate();
    }
}

impl<A, M, C> ViewHandler for ListView<A, M, C>
where
    A: Adapter + 'static,
    M: ExtentModel + 'static,
    C: AnimationClock + 'static,
{
    fn on_intercept_touch_event(&mut self, cx: &mut ViewContext<'_>, event: &MotionEvent) -> bool {
        let action = event.action();
        if action == Action::Move && self.dragging {
            return true;
        }

        match action {
            Action::Down => {
                self.begin_gesture(cx, event);
                self.velocity.clear();
                self.velocity.add_movement(event);
                // Catch a running fling.
                self.dragging = !self.scroller.is_finished();
            }
            Action::Move => {
                let Some(index) = self.active_pointer.and_then(|id| event.find_pointer_index(id))
                else {
                    return false;
                };
                let y = event.y_at(index);
                let nested_vertical = cx
                    .tree()
                    .nested_scroll_axes(cx.id())
                    .contains(ScrollAxes::VERTICAL);
                if (y - self.last_motion_y).abs() > cx.config().touch_slop && !nested_vertical {
                    tracing::trace!(view = ?cx.id(), "list intercepts drag");
                    self.dragging = true;
                    self.last_motion_y = y;
                    self.nested_y_offset = 0;
                    self.velocity.add_movement(event);
                    cx.request_parent_disallow_intercept_touch_event(true);
                }
            }
            Action::Up | Action::Cancel => {
                self.dragging = false;
                self.active_pointer = None;
                self.spring_back(cx);
                cx.stop_nested_scroll();
            }
            Action::PointerUp(index) => self.on_secondary_pointer_up(event, index),
            _ => {}
        }
        self.dragging
    }

    #[allow(
        clippy::cast_possible_truncation,
        reason = "drag deltas are whole pixels"
    )]
    fn on_touch_event(&mut self, cx: &mut ViewContext<'_>, event: &MotionEvent) -> bool {
        let action = event.action();
        if action == Action::Down {
            self.nested_y_offset = 0;
        }
        // Velocity is tracked in window terms, so moves of the list itself do not count.
        let mut tracked = event.clone();
        tracked.offset_location(0.0, f64::from(self.nested_y_offset));
        self.velocity.add_movement(&tracked);

        match action {
            Action::Down => {
                // Touching a running fling stops it and keeps dragging from there.
                self.dragging = !self.scroller.is_finished();
                if self.dragging {
                    self.scroller.abort_animation();
                    cx.request_parent_disallow_intercept_touch_event(true);
                }
                self.begin_gesture(cx, event);
            }
            Action::Move => {
                let Some(index) = self.active_pointer.and_then(|id| event.find_pointer_index(id))
                else {
                    tracing::error!(view = ?cx.id(), "move without an active pointer");
                    return true;
                };
                let y = event.y_at(index);
                let mut delta_y = (self.last_motion_y - y).round() as i32;

                let mut consumed = [0; 2];
                let mut offset = [0; 2];
                if cx.dispatch_nested_pre_scroll(0, delta_y, Some(&mut consumed), Some(&mut offset)) {
                    delta_y -= consumed[1];
                    self.nested_y_offset += offset[1];
                }

                let slop = cx.config().touch_slop.round() as i32;
                if !self.dragging && delta_y.abs() > slop {
                    self.dragging = true;
                    cx.request_parent_disallow_intercept_touch_event(true);
                    delta_y -= slop * delta_y.signum();
                }
                if self.dragging {
                    self.last_motion_y = y - f64::from(offset[1]);
                    let moved = self.drag_by(cx, delta_y);
                    self.last_motion_y -= f64::from(moved);
                    self.nested_y_offset += moved;
                }
            }
            Action::Up => {
                if self.dragging
                    && let Some(id) = self.active_pointer
                {
                    let config = *cx.config();
                    self.velocity
                        .compute_current_velocity(1000.0, config.maximum_fling_velocity);
                    let velocity_y = self.velocity.y_velocity(id);
                    if velocity_y.abs() > config.minimum_fling_velocity {
                        self.fling_with_nested_dispatch(cx, -velocity_y);
                    } else {
                        self.spring_back(cx);
                    }
                } else {
                    self.spring_back(cx);
                }
                self.end_drag(cx);
            }
            Action::Cancel => {
                if self.dragging {
                    self.spring_back(cx);
                }
                self.end_drag(cx);
            }
            Action::PointerDown(index) => {
                self.last_motion_y = event.y_at(index);
                self.active_pointer = event.pointer_id(index);
            }
            Action::PointerUp(index) => {
                self.on_secondary_pointer_up(event, index);
                if let Some(index) = self.active_pointer.and_then(|id| event.find_pointer_index(id)) {
                    self.last_motion_y = event.y_at(index);
                }
            }
            _ => {}
        }
        true
    }

    fn compute_scroll(&mut self, cx: &mut ViewContext<'_>) {
        if self.scroller.compute_scroll_offset() {
            let (x, _) = cx.scroll();
            cx.scroll_to(x, self.scroller.curr_y());
            cx.post_invalidate_on_animation();
        }
        self.layout(cx);
    }

    fn on_detached_from_window(&mut self, cx: &mut ViewContext<'_>) {
        let _ = cx;
        self.scroller.abort_animation();
        self.dragging = false;
        self.active_pointer = None;
        self.velocity.clear();
    }
}

fn viewport_height(cx: &ViewContext<'_>) -> i32 {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "frames are laid out in whole pixels"
    )]
    let height = cx.frame().height().round() as i32;
    height.max(0)
}

/// The first `len` rows of a model.
struct Rows<'a, M: ?Sized> {
    model: &'a mut M,
    len: usize,
}

impl<M: ExtentModel + ?Sized> ExtentModel for Rows<'_, M> {
    fn len(&self) -> usize {
        self.len
    }

    fn total_extent(&mut self) -> i32 {
        if self.len < self.model.len() {
            self.model.offset_of(self.len)
        } else {
            self.model.total_extent()
        }
    }

    fn extent_of(&mut self, index: usize) -> i32 {
        if index < self.len {
            self.model.extent_of(index)
        } else {
            0
        }
    }

    fn offset_of(&mut self, index: usize) -> i32 {
        self.model.offset_of(index)
    }

    fn index_at_offset(&mut self, offset: i32) -> usize {
        self.model
            .index_at_offset(offset)
            .min(self.len.saturating_sub(1))
    }
}
