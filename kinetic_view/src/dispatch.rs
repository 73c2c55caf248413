// Copyright 2025 the Kinetic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer event dispatch: touch targets, hover targets, and generic pointer events.
//!
//! A group routes each touch gesture to the children that accepted its `Down` (or, with
//! splitting enabled, the `PointerDown` of a later finger). Those children are the group's
//! touch targets; they keep receiving the pointers they own until the gesture ends, the group
//! intercepts, or they are cancelled. Hover events are routed to every child under the pointer,
//! with enter and exit synthesized as the pointer crosses child bounds.

use kinetic_motion::{Action, MotionEvent, PointerIdBits, Source};
use kurbo::{Affine, Point, Vec2};
use smallvec::SmallVec;

use crate::tree::{LastTouchDown, ViewTree};
use crate::types::{GroupFlags, ScrollAxes, ViewFlags, ViewId};

type ChildList = SmallVec<[ViewId; 8]>;

impl ViewTree {
    /// Dispatches a touch event to `id` (normally a window root).
    ///
    /// Returns `true` if some view consumed the event.
    pub fn dispatch_touch_event(&mut self, id: ViewId, event: &MotionEvent) -> bool {
        self.last_event_time = event.event_time();
        self.dispatch_touch(id, event)
    }

    /// Dispatches a hover event to `id`. Returns `true` if some view consumed it.
    pub fn dispatch_hover_event(&mut self, id: ViewId, event: &MotionEvent) -> bool {
        self.last_event_time = event.event_time();
        self.dispatch_hover(id, event)
    }

    /// Dispatches an event that is not part of a touch gesture, such as a scroll wheel.
    ///
    /// Pointer events with hover actions go through hover dispatch; other pointer events go to
    /// the front-most child under the pointer, falling back to the group itself. Events from
    /// non-pointer sources go to `id` directly.
    pub fn dispatch_generic_motion_event(&mut self, id: ViewId, event: &MotionEvent) -> bool {
        self.last_event_time = event.event_time();
        self.dispatch_generic(id, event)
    }

    /// Returns `true` if a hovering pointer is over the view.
    pub fn is_hovered(&self, id: ViewId) -> bool {
        self.flags(id).is_some_and(|f| f.contains(ViewFlags::HOVERED))
    }

    pub(crate) fn dispatch_touch(&mut self, id: ViewId, event: &MotionEvent) -> bool {
        if self.is_group(id) {
            self.dispatch_group_touch(id, event)
        } else {
            self.dispatch_view_touch(id, event)
        }
    }

    /// Delivers a touch event to the view's own handler.
    fn dispatch_view_touch(&mut self, id: ViewId, event: &MotionEvent) -> bool {
        let action = event.action();
        if action == Action::Down {
            self.stop_nested_scroll(id);
        }
        let handled = self.with_handler(id, false, |handler, cx| handler.on_touch_event(cx, event));
        if matches!(action, Action::Up | Action::Cancel) || (action == Action::Down && !handled) {
            self.stop_nested_scroll(id);
        }
        handled
    }

    fn dispatch_group_touch(&mut self, group: ViewId, event: &MotionEvent) -> bool {
        let action = event.action();

        // A new gesture drops whatever the previous one left behind.
        if action == Action::Down {
            self.cancel_and_clear_touch_targets(group, Some(event));
            self.reset_touch_state(group);
        }

        let has_targets = self.group(group).is_some_and(|g| !g.touch_targets.is_empty());
        let intercepted = if action == Action::Down || has_targets {
            let disallow = self
                .group_flags(group)
                .is_some_and(|f| f.contains(GroupFlags::DISALLOW_INTERCEPT));
            !disallow
                && self.with_handler(group, false, |handler, cx| {
                    handler.on_intercept_touch_event(cx, event)
                })
        } else {
            // No child took the gesture, so the group keeps it.
            true
        };

        let canceled = self.reset_cancel_next_up_flag(group) || action == Action::Cancel;
        let split = self
            .group_flags(group)
            .is_some_and(|f| f.contains(GroupFlags::SPLIT_MOTION_EVENTS));

        let mut new_target = None;
        let mut already_dispatched = false;
        if !canceled && !intercepted {
            let starts_target = matches!(action, Action::Down | Action::HoverMove)
                || (split && matches!(action, Action::PointerDown(_)));
            if starts_target {
                let action_index = action.index();
                let bits_to_assign = if split {
                    event
                        .pointer_id(action_index)
                        .map_or(PointerIdBits::NONE, PointerIdBits::from_id)
                } else {
                    PointerIdBits::ALL
                };
                if let Some(g) = self.group_mut(group) {
                    g.touch_targets.remove_pointers(bits_to_assign);
                }

                let point = event.point_at(action_index);
                for child in self.ordered_children(group).into_iter().rev() {
                    if !self.can_receive_pointer_events(child)
                        || self.hit_child(group, child, point).is_none()
                    {
                        continue;
                    }
                    // Already receiving an earlier pointer: it gets this one as well.
                    if let Some(bits) = self
                        .group_mut(group)
                        .and_then(|g| g.touch_targets.get_mut(child))
                    {
                        *bits |= bits_to_assign;
                        new_target = Some(child);
                        break;
                    }
                    self.reset_cancel_next_up_flag(child);
                    if self.dispatch_transformed_touch_event(
                        group,
                        event,
                        false,
                        Some(child),
                        bits_to_assign,
                    ) {
                        let child_index = self
                            .children_of(group)
                            .iter()
                            .position(|c| *c == child)
                            .unwrap_or_default();
                        let alive = self.is_alive(child);
                        if let Some(g) = self.group_mut(group) {
                            g.last_touch_down = Some(LastTouchDown {
                                time: event.down_time(),
                                child_index,
                                position: Point::new(event.x(), event.y()),
                            });
                            if alive {
                                g.touch_targets.push_front(child, bits_to_assign);
                            }
                        }
                        new_target = Some(child);
                        already_dispatched = true;
                        break;
                    }
                }

                // No child took the pointer; give it to the least recently added target.
                if new_target.is_none()
                    && let Some(bits) = self
                        .group_mut(group)
                        .and_then(|g| g.touch_targets.last_mut())
                {
                    *bits |= bits_to_assign;
                }
            }
        }

        let has_targets = self.group(group).is_some_and(|g| !g.touch_targets.is_empty());
        let handled = if !has_targets {
            self.dispatch_transformed_touch_event(group, event, canceled, None, PointerIdBits::ALL)
        } else {
            let mut handled = false;
            let targets = self
                .group(group)
                .map(|g| g.touch_targets.snapshot())
                .unwrap_or_default();
            for (child, _) in targets {
                if already_dispatched && new_target == Some(child) {
                    handled = true;
                    continue;
                }
                // Earlier deliveries may have changed the chain.
                let Some(bits) = self.group(group).and_then(|g| g.touch_targets.get(child)) else {
                    continue;
                };
                let cancel_child = self.reset_cancel_next_up_flag(child) || intercepted;
                if self.dispatch_transformed_touch_event(group, event, cancel_child, Some(child), bits)
                {
                    handled = true;
                }
                if cancel_child && let Some(g) = self.group_mut(group) {
                    g.touch_targets.remove(child);
                }
            }
            handled
        };

        if canceled || matches!(action, Action::Up | Action::HoverMove) {
            self.reset_touch_state(group);
        } else if split
            && let Action::PointerUp(index) = action
            && let Some(id) = event.pointer_id(index)
            && let Some(g) = self.group_mut(group)
        {
            g.touch_targets.remove_pointers(PointerIdBits::from_id(id));
        }
        handled
    }

    /// Delivers `event` to `child` (or to the group itself when `None`), restricted to the
    /// pointers in `desired_bits` and moved into the receiver's coordinates.
    ///
    /// With `cancel` set the event is delivered as a `Cancel`, untransformed.
    fn dispatch_transformed_touch_event(
        &mut self,
        group: ViewId,
        event: &MotionEvent,
        cancel: bool,
        child: Option<ViewId>,
        desired_bits: PointerIdBits,
    ) -> bool {
        if cancel || event.action() == Action::Cancel {
            let mut cancel_event = event.clone();
            cancel_event.set_action(Action::Cancel);
            return match child {
                None => self.dispatch_view_touch(group, &cancel_event),
                Some(child) => self.dispatch_touch(child, &cancel_event),
            };
        }

        let old_bits = event.pointer_id_bits();
        let new_bits = old_bits & desired_bits;
        // The receiver owns none of the pointers in this event.
        if new_bits.is_empty() {
            return false;
        }
        if new_bits == old_bits {
            // Same pointers and nothing to move: deliver the caller's event as is.
            match child {
                None => return self.dispatch_view_touch(group, event),
                Some(child) if self.parent_to_child(group, child) == Affine::IDENTITY => {
                    return self.dispatch_touch(child, event);
                }
                Some(_) => {}
            }
        }
        let mut transformed = if new_bits == old_bits {
            event.clone()
        } else {
            match event.split(new_bits) {
                Ok(split) => split,
                Err(err) => {
                    tracing::error!(%err, ?group, "failed to split motion event");
                    return false;
                }
            }
        };
        match child {
            None => self.dispatch_view_touch(group, &transformed),
            Some(child) => {
                transformed.transform(self.parent_to_child(group, child));
                self.dispatch_touch(child, &transformed)
            }
        }
    }

    /// Cancels every touch target of `group` and clears the chain.
    ///
    /// The cancel is built from `event` when given, otherwise synthesized at the time of the
    /// last dispatched event.
    pub fn cancel_and_clear_touch_targets(&mut self, group: ViewId, event: Option<&MotionEvent>) {
        let Some(g) = self.group(group) else {
            return;
        };
        if g.touch_targets.is_empty() {
            return;
        }
        let targets = g.touch_targets.snapshot();
        let cancel = match event {
            Some(event) => event.clone(),
            None => self.synthesized(Action::Cancel),
        };
        for (child, _) in targets {
            self.reset_cancel_next_up_flag(child);
            self.dispatch_transformed_touch_event(group, &cancel, true, Some(child), PointerIdBits::ALL);
        }
        if let Some(g) = self.group_mut(group) {
            g.touch_targets.clear();
        }
    }

    /// Sends a cancel to `child` if it is a touch target of `group`, and unlinks it.
    pub(crate) fn cancel_touch_target(&mut self, group: ViewId, child: ViewId) {
        let removed = self
            .group_mut(group)
            .and_then(|g| g.touch_targets.remove(child));
        if removed.is_some() {
            let cancel = self.synthesized(Action::Cancel);
            self.dispatch_touch(child, &cancel);
        }
    }

    /// Sends a hover exit to `child` if it is a hover target of `group`, and unlinks it.
    pub(crate) fn cancel_hover_target(&mut self, group: ViewId, child: ViewId) {
        let removed = self
            .group_mut(group)
            .and_then(|g| g.hover_targets.remove(child));
        if removed.is_some() {
            let exit = self.synthesized(Action::HoverExit);
            self.dispatch_hover(child, &exit);
        }
    }

    fn reset_touch_state(&mut self, group: ViewId) {
        self.reset_cancel_next_up_flag(group);
        if let Some(g) = self.group_mut(group) {
            g.touch_targets.clear();
            g.flags.remove(GroupFlags::DISALLOW_INTERCEPT);
            g.nested_axes = ScrollAxes::empty();
        }
    }

    /// Clears `CANCEL_NEXT_UP_EVENT` and reports whether it was set.
    fn reset_cancel_next_up_flag(&mut self, id: ViewId) -> bool {
        let Some(node) = self.node_mut(id) else {
            return false;
        };
        let was_set = node.local.flags.contains(ViewFlags::CANCEL_NEXT_UP_EVENT);
        node.local.flags.remove(ViewFlags::CANCEL_NEXT_UP_EVENT);
        was_set
    }

    /// Asks `group` and its ancestors not to intercept the current gesture (or to allow it
    /// again). The flag is cleared automatically when the gesture ends.
    pub fn request_disallow_intercept_touch_event(&mut self, group: ViewId, disallow: bool) {
        let mut cur = Some(group);
        while let Some(id) = cur {
            let Some(g) = self.group_mut(id) else {
                return;
            };
            // Ancestors are already in this state too.
            if g.flags.contains(GroupFlags::DISALLOW_INTERCEPT) == disallow {
                return;
            }
            g.flags.set(GroupFlags::DISALLOW_INTERCEPT, disallow);
            cur = self.parent_of(id);
        }
    }

    pub(crate) fn dispatch_hover(&mut self, id: ViewId, event: &MotionEvent) -> bool {
        if self.is_group(id) {
            self.dispatch_group_hover(id, event)
        } else {
            self.dispatch_view_hover(id, event)
        }
    }

    /// Delivers a hover event to the view's own handler, tracking the hovered state.
    fn dispatch_view_hover(&mut self, id: ViewId, event: &MotionEvent) -> bool {
        let hovered = match event.action() {
            Action::HoverEnter => Some(true),
            Action::HoverExit => Some(false),
            _ => None,
        };
        if let Some(hovered) = hovered
            && let Some(node) = self.node_mut(id)
            && node.local.flags.contains(ViewFlags::HOVERED) != hovered
        {
            node.local.flags.set(ViewFlags::HOVERED, hovered);
            self.invalidate(id);
        }
        self.with_handler(id, false, |handler, cx| handler.on_hover_event(cx, event))
    }

    fn dispatch_group_hover(&mut self, group: ViewId, event: &MotionEvent) -> bool {
        let action = event.action();
        let intercept =
            self.with_handler(group, false, |handler, cx| handler.on_intercept_hover_event(cx, event));

        let mut handled = false;
        // Targets from the previous event; children still under the pointer move to the new
        // chain, the rest get an exit.
        let Some(mut old_targets) = self
            .group_mut(group)
            .map(|g| core::mem::take(&mut g.hover_targets))
        else {
            return false;
        };

        if !intercept && action != Action::HoverExit {
            let point = Point::new(event.x(), event.y());
            for child in self.ordered_children(group).into_iter().rev() {
                if !self.can_receive_pointer_events(child)
                    || self.hit_child(group, child, point).is_none()
                {
                    continue;
                }
                let was_hovered = old_targets.remove(child).is_some();
                if let Some(g) = self.group_mut(group) {
                    g.hover_targets.push_back(child, ());
                }
                match action {
                    Action::HoverEnter if !was_hovered => {
                        handled |= self.dispatch_transformed_generic_pointer_event(group, event, child);
                    }
                    Action::HoverMove if !was_hovered => {
                        let mut synthesized = event.without_history();
                        synthesized.set_action(Action::HoverEnter);
                        handled |=
                            self.dispatch_transformed_generic_pointer_event(group, &synthesized, child);
                        synthesized.set_action(action);
                        handled |=
                            self.dispatch_transformed_generic_pointer_event(group, &synthesized, child);
                    }
                    Action::HoverMove => {
                        handled |= self.dispatch_transformed_generic_pointer_event(group, event, child);
                    }
                    _ => {}
                }
                if handled {
                    break;
                }
            }
        }

        // Exit children the pointer left.
        for (child, ()) in old_targets.snapshot() {
            if action == Action::HoverExit {
                handled |= self.dispatch_transformed_generic_pointer_event(group, event, child);
            } else {
                // Hover moved elsewhere, so results are ignored.
                if action == Action::HoverMove {
                    let mut last_move = event.clone();
                    last_move.set_hover_exit_pending(true);
                    self.dispatch_transformed_generic_pointer_event(group, &last_move, child);
                }
                let mut exit = event.without_history();
                exit.set_action(Action::HoverExit);
                self.dispatch_transformed_generic_pointer_event(group, &exit, child);
            }
        }
        old_targets.clear();

        // The group hovers itself when no child handled the event.
        let hovered_self = self.group(group).is_some_and(|g| g.hovered_self);
        let new_hovered_self =
            !handled && action != Action::HoverExit && !event.is_hover_exit_pending();
        if new_hovered_self == hovered_self {
            if new_hovered_self {
                handled |= self.dispatch_view_hover(group, event);
            }
            return handled;
        }

        if hovered_self {
            if action == Action::HoverExit {
                handled |= self.dispatch_view_hover(group, event);
            } else {
                if action == Action::HoverMove {
                    let mut last_move = event.clone();
                    last_move.set_hover_exit_pending(true);
                    self.dispatch_view_hover(group, &last_move);
                }
                let mut exit = event.without_history();
                exit.set_action(Action::HoverExit);
                self.dispatch_view_hover(group, &exit);
            }
            self.set_hovered_self(group, false);
        }
        if new_hovered_self {
            match action {
                Action::HoverEnter => {
                    handled |= self.dispatch_view_hover(group, event);
                    self.set_hovered_self(group, true);
                }
                Action::HoverMove => {
                    let mut synthesized = event.without_history();
                    synthesized.set_action(Action::HoverEnter);
                    handled |= self.dispatch_view_hover(group, &synthesized);
                    synthesized.set_action(action);
                    handled |= self.dispatch_view_hover(group, &synthesized);
                    self.set_hovered_self(group, true);
                }
                _ => {}
            }
        }
        handled
    }

    fn set_hovered_self(&mut self, group: ViewId, hovered: bool) {
        if let Some(g) = self.group_mut(group) {
            g.hovered_self = hovered;
        }
    }

    /// Sends a hover exit through `group` if it or any child is hovered.
    fn exit_hover_targets(&mut self, group: ViewId) {
        let Some(g) = self.group(group) else {
            return;
        };
        if g.hovered_self || !g.hover_targets.is_empty() {
            let exit = self.synthesized(Action::HoverExit);
            self.dispatch_hover(group, &exit);
        }
    }

    fn dispatch_generic(&mut self, id: ViewId, event: &MotionEvent) -> bool {
        if event.is_pointer_event() {
            if event.action().is_hover() {
                return self.dispatch_hover(id, event);
            }
            if self.is_group(id) {
                return self.dispatch_generic_pointer_event(id, event);
            }
        }
        self.with_handler(id, false, |handler, cx| handler.on_generic_motion_event(cx, event))
    }

    fn dispatch_generic_pointer_event(&mut self, group: ViewId, event: &MotionEvent) -> bool {
        let point = Point::new(event.x(), event.y());
        for child in self.ordered_children(group).into_iter().rev() {
            if !self.can_receive_pointer_events(child)
                || self.hit_child(group, child, point).is_none()
            {
                continue;
            }
            if self.dispatch_transformed_generic_pointer_event(group, event, child) {
                return true;
            }
        }
        self.with_handler(group, false, |handler, cx| handler.on_generic_motion_event(cx, event))
    }

    fn dispatch_transformed_generic_pointer_event(
        &mut self,
        group: ViewId,
        event: &MotionEvent,
        child: ViewId,
    ) -> bool {
        let mut transformed = event.clone();
        transformed.transform(self.parent_to_child(group, child));
        self.dispatch_generic(child, &transformed)
    }

    /// Detaches a view and its subtree from the window.
    ///
    /// Groups cancel their touch targets and exit their hover targets first; children are
    /// detached before their parent's [`on_detached_from_window`] runs.
    ///
    /// [`on_detached_from_window`]: crate::ViewHandler::on_detached_from_window
    pub fn dispatch_detached_from_window(&mut self, id: ViewId) {
        if self.is_group(id) {
            self.cancel_and_clear_touch_targets(id, None);
            self.exit_hover_targets(id);
            self.reset_cancel_next_up_flag(id);
            let children: ChildList = self.children_of(id).iter().copied().collect();
            for child in children {
                self.dispatch_detached_from_window(child);
            }
        }
        self.stop_nested_scroll(id);
        self.with_handler(id, (), |handler, cx| handler.on_detached_from_window(cx));
        if let Some(node) = self.node_mut(id) {
            node.local.flags.remove(
                ViewFlags::ATTACHED | ViewFlags::CANCEL_NEXT_UP_EVENT | ViewFlags::HOVERED,
            );
        }
    }

    /// Marks a view and its subtree so that the next touch event each receives through its
    /// parent becomes a cancel.
    pub fn dispatch_start_temporary_detach(&mut self, id: ViewId) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let Some(node) = self.node_mut(id) else {
                continue;
            };
            node.local.flags.insert(ViewFlags::CANCEL_NEXT_UP_EVENT);
            stack.extend(self.children_of(id).iter().copied());
        }
    }

    /// A single-pointer event at the origin, timed at the last dispatched event.
    fn synthesized(&self, action: Action) -> MotionEvent {
        let time = self.last_event_time;
        MotionEvent::single(action, time, time, Point::ZERO).with_source(Source::TOUCHSCREEN)
    }

    fn can_receive_pointer_events(&self, id: ViewId) -> bool {
        self.flags(id)
            .is_some_and(|f| f.intersects(ViewFlags::VISIBLE | ViewFlags::ANIMATING))
    }

    /// Maps a point in `group`'s coordinates into `child`'s.
    fn parent_to_child(&self, group: ViewId, child: ViewId) -> Affine {
        let (scroll_x, scroll_y) = self.scroll(group).unwrap_or((0, 0));
        let Some(node) = self.node(child) else {
            return Affine::IDENTITY;
        };
        let origin = node.local.frame.origin();
        let offset = Affine::translate(Vec2::new(
            f64::from(scroll_x) - origin.x,
            f64::from(scroll_y) - origin.y,
        ));
        if node.local.transform == Affine::IDENTITY {
            offset
        } else {
            node.local.transform.inverse() * offset
        }
    }

    /// The point in `child`'s coordinates if it falls inside the child's bounds.
    fn hit_child(&self, group: ViewId, child: ViewId, point: Point) -> Option<Point> {
        let node = self.node(child)?;
        if node.local.transform.determinant() == 0.0 {
            return None;
        }
        let local = self.parent_to_child(group, child) * point;
        let size = node.local.frame.size();
        (local.x >= 0.0 && local.x < size.width && local.y >= 0.0 && local.y < size.height)
            .then_some(local)
    }

    /// Children in drawing order, back to front.
    ///
    /// The handler's custom order applies when enabled; children are then stably sorted by
    /// elevation if any of them is raised.
    fn ordered_children(&mut self, group: ViewId) -> ChildList {
        let children: ChildList = self.children_of(group).iter().copied().collect();
        let count = children.len();
        let custom_order = self
            .group_flags(group)
            .is_some_and(|f| f.contains(GroupFlags::CHILDREN_DRAWING_ORDER));
        let mut ordered: ChildList = if custom_order {
            (0..count)
                .map(|position| {
                    let index = self.with_handler(group, position, |handler, _| {
                        handler.child_drawing_order(count, position)
                    });
                    if index < count {
                        children[index]
                    } else {
                        tracing::error!(
                            ?group,
                            index,
                            count,
                            "child drawing order out of range; using natural order"
                        );
                        children[position]
                    }
                })
                .collect()
        } else {
            children
        };
        if count > 1 && ordered.iter().any(|c| self.z(*c).is_some_and(|z| z != 0.0)) {
            ordered.sort_by(|a, b| {
                let za = self.z(*a).unwrap_or_default();
                let zb = self.z(*b).unwrap_or_default();
                za.total_cmp(&zb)
            });
        }
        ordered
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use kinetic_motion::Pointer;
    use kurbo::Rect;

    use super::*;
    use crate::handler::{ViewContext, ViewHandler};
    use crate::types::LocalView;

    #[derive(Clone, Debug, PartialEq)]
    struct Seen {
        view: ViewId,
        kind: &'static str,
        action: Option<Action>,
        at: Point,
        pointers: usize,
        exit_pending: bool,
    }

    type Log = Rc<RefCell<Vec<Seen>>>;

    #[derive(Default)]
    struct Probe {
        log: Log,
        touch: bool,
        hover: bool,
        generic: bool,
        intercept_moves: bool,
        disallow_on_down: bool,
        order: Option<fn(usize, usize) -> usize>,
    }

    impl Probe {
        fn new(log: &Log) -> Self {
            Self {
                log: log.clone(),
                ..Self::default()
            }
        }

        fn touch(mut self) -> Self {
            self.touch = true;
            self
        }

        fn hover(mut self) -> Self {
            self.hover = true;
            self
        }

        fn record(&self, view: ViewId, kind: &'static str, event: Option<&MotionEvent>) {
            self.log.borrow_mut().push(Seen {
                view,
                kind,
                action: event.map(MotionEvent::action),
                at: event.map_or(Point::ZERO, |e| e.point_at(0)),
                pointers: event.map_or(0, MotionEvent::pointer_count),
                exit_pending: event.is_some_and(MotionEvent::is_hover_exit_pending),
            });
        }
    }

    impl ViewHandler for Probe {
        fn on_touch_event(&mut self, cx: &mut ViewContext<'_>, event: &MotionEvent) -> bool {
            self.record(cx.id(), "touch", Some(event));
            if self.disallow_on_down && event.action() == Action::Down {
                cx.request_parent_disallow_intercept_touch_event(true);
            }
            self.touch
        }

        fn on_intercept_touch_event(&mut self, cx: &mut ViewContext<'_>, event: &MotionEvent) -> bool {
            self.record(cx.id(), "intercept", Some(event));
            self.intercept_moves && event.action() == Action::Move
        }

        fn on_hover_event(&mut self, cx: &mut ViewContext<'_>, event: &MotionEvent) -> bool {
            self.record(cx.id(), "hover", Some(event));
            self.hover
        }

        fn on_generic_motion_event(&mut self, cx: &mut ViewContext<'_>, event: &MotionEvent) -> bool {
            self.record(cx.id(), "generic", Some(event));
            self.generic
        }

        fn child_drawing_order(&mut self, child_count: usize, drawing_position: usize) -> usize {
            self.order
                .map_or(drawing_position, |order| order(child_count, drawing_position))
        }

        fn on_detached_from_window(&mut self, cx: &mut ViewContext<'_>) {
            self.record(cx.id(), "detached", None);
        }
    }

    fn actions(log: &Log, view: ViewId, kind: &str) -> Vec<Action> {
        log.borrow()
            .iter()
            .filter(|s| s.view == view && s.kind == kind)
            .filter_map(|s| s.action)
            .collect()
    }

    fn seen(log: &Log, view: ViewId, kind: &str) -> Vec<Seen> {
        log.borrow()
            .iter()
            .filter(|s| s.view == view && s.kind == kind)
            .cloned()
            .collect()
    }

    /// A 400x400 root with `a` on the left half and `b` on the right half.
    fn side_by_side(root: Probe, a: Probe, b: Probe) -> (ViewTree, ViewId, ViewId, ViewId) {
        let mut tree = ViewTree::new();
        let r = tree
            .insert_group(
                None,
                LocalView::with_frame(Rect::new(0.0, 0.0, 400.0, 400.0)),
                Box::new(root),
            )
            .unwrap();
        let a = tree
            .insert(
                Some(r),
                LocalView::with_frame(Rect::new(0.0, 0.0, 200.0, 400.0)),
                Box::new(a),
            )
            .unwrap();
        let b = tree
            .insert(
                Some(r),
                LocalView::with_frame(Rect::new(200.0, 0.0, 400.0, 400.0)),
                Box::new(b),
            )
            .unwrap();
        (tree, r, a, b)
    }

    fn touch(action: Action, t: i64, x: f64, y: f64) -> MotionEvent {
        MotionEvent::single(action, 0, t, Point::new(x, y))
    }

    fn two(action: Action, t: i64, p0: (f64, f64), p1: (f64, f64)) -> MotionEvent {
        MotionEvent::try_new(
            action,
            0,
            t,
            &[Pointer::new(0, p0.0, p0.1), Pointer::new(1, p1.0, p1.1)],
        )
        .unwrap()
    }

    #[test]
    fn down_picks_child_and_gesture_follows_it() {
        let log = Log::default();
        let (mut tree, root, a, b) =
            side_by_side(Probe::new(&log), Probe::new(&log).touch(), Probe::new(&log).touch());

        assert!(tree.dispatch_touch_event(root, &touch(Action::Down, 0, 250.0, 30.0)));
        assert_eq!(tree.touch_targets(root).as_slice(), &[(b, PointerIdBits::from_id(0))]);
        let down = tree.last_touch_down(root).unwrap();
        assert_eq!(down.child_index, 1);
        assert_eq!(down.position, Point::new(250.0, 30.0));

        // Moving over `a` does not retarget the gesture.
        assert!(tree.dispatch_touch_event(root, &touch(Action::Move, 16, 20.0, 30.0)));
        assert!(tree.dispatch_touch_event(root, &touch(Action::Up, 32, 20.0, 30.0)));

        assert!(actions(&log, a, "touch").is_empty());
        assert_eq!(actions(&log, b, "touch"), vec![Action::Down, Action::Move, Action::Up]);
        let points: Vec<_> = seen(&log, b, "touch").iter().map(|s| s.at).collect();
        assert_eq!(
            points,
            vec![Point::new(50.0, 30.0), Point::new(-180.0, 30.0), Point::new(-180.0, 30.0)]
        );
        assert!(tree.touch_targets(root).is_empty());
    }

    #[test]
    fn unhandled_down_falls_back_to_group() {
        let log = Log::default();
        let (mut tree, root, a, _) =
            side_by_side(Probe::new(&log).touch(), Probe::new(&log), Probe::new(&log));

        assert!(tree.dispatch_touch_event(root, &touch(Action::Down, 0, 10.0, 10.0)));
        assert!(tree.touch_targets(root).is_empty());
        // No target, so the group keeps the gesture without asking to intercept again.
        assert!(tree.dispatch_touch_event(root, &touch(Action::Move, 16, 12.0, 10.0)));

        assert_eq!(actions(&log, a, "touch"), vec![Action::Down]);
        assert_eq!(actions(&log, root, "touch"), vec![Action::Down, Action::Move]);
        assert_eq!(actions(&log, root, "intercept"), vec![Action::Down]);
    }

    #[test]
    fn split_pointers_go_to_separate_children() {
        let log = Log::default();
        let (mut tree, root, a, b) =
            side_by_side(Probe::new(&log), Probe::new(&log).touch(), Probe::new(&log).touch());

        tree.dispatch_touch_event(root, &touch(Action::Down, 0, 50.0, 50.0));
        tree.dispatch_touch_event(root, &two(Action::PointerDown(1), 10, (50.0, 50.0), (300.0, 60.0)));
        assert_eq!(
            tree.touch_targets(root).as_slice(),
            &[(b, PointerIdBits::from_id(1)), (a, PointerIdBits::from_id(0))]
        );
        tree.dispatch_touch_event(root, &two(Action::Move, 20, (55.0, 50.0), (310.0, 60.0)));
        tree.dispatch_touch_event(root, &two(Action::PointerUp(1), 30, (55.0, 50.0), (310.0, 60.0)));
        assert_eq!(tree.touch_targets(root).as_slice(), &[(a, PointerIdBits::from_id(0))]);
        tree.dispatch_touch_event(root, &touch(Action::Up, 40, 55.0, 50.0));

        assert_eq!(
            actions(&log, a, "touch"),
            vec![Action::Down, Action::Move, Action::Move, Action::Move, Action::Up]
        );
        assert_eq!(actions(&log, b, "touch"), vec![Action::Down, Action::Move, Action::Up]);
        assert!(seen(&log, a, "touch").iter().all(|s| s.pointers == 1));
        let b_seen = seen(&log, b, "touch");
        assert!(b_seen.iter().all(|s| s.pointers == 1));
        assert_eq!(b_seen[0].at, Point::new(100.0, 60.0));
        assert_eq!(b_seen[1].at, Point::new(110.0, 60.0));
    }

    #[test]
    fn declined_pointer_joins_least_recent_target() {
        let log = Log::default();
        let mut tree = ViewTree::new();
        let root = tree
            .insert_group(
                None,
                LocalView::with_frame(Rect::new(0.0, 0.0, 300.0, 100.0)),
                Box::new(Probe::new(&log)),
            )
            .unwrap();
        let column = |x0: f64| LocalView::with_frame(Rect::new(x0, 0.0, x0 + 100.0, 100.0));
        let a = tree
            .insert(Some(root), column(0.0), Box::new(Probe::new(&log).touch()))
            .unwrap();
        let b = tree
            .insert(Some(root), column(100.0), Box::new(Probe::new(&log).touch()))
            .unwrap();
        let c = tree
            .insert(Some(root), column(200.0), Box::new(Probe::new(&log)))
            .unwrap();

        tree.dispatch_touch_event(root, &touch(Action::Down, 0, 50.0, 50.0));
        tree.dispatch_touch_event(root, &two(Action::PointerDown(1), 10, (50.0, 50.0), (150.0, 50.0)));
        let three = MotionEvent::try_new(
            Action::PointerDown(2),
            0,
            20,
            &[
                Pointer::new(0, 50.0, 50.0),
                Pointer::new(1, 150.0, 50.0),
                Pointer::new(2, 250.0, 50.0),
            ],
        )
        .unwrap();
        assert!(tree.dispatch_touch_event(root, &three));

        assert_eq!(
            tree.touch_targets(root).as_slice(),
            &[
                (b, PointerIdBits::from_id(1)),
                (a, PointerIdBits::from_id(0) | PointerIdBits::from_id(2)),
            ]
        );
        assert_eq!(actions(&log, c, "touch"), vec![Action::Down]);
        let a_last = seen(&log, a, "touch").pop().unwrap();
        assert_eq!(a_last.action, Some(Action::PointerDown(1)));
        assert_eq!(a_last.pointers, 2);
        let b_last = seen(&log, b, "touch").pop().unwrap();
        assert_eq!(b_last.action, Some(Action::Move));
        assert_eq!(b_last.pointers, 1);
    }

    #[test]
    fn child_at_origin_sees_event_unchanged() {
        let log = Log::default();
        let mut tree = ViewTree::new();
        let bounds = Rect::new(0.0, 0.0, 200.0, 200.0);
        let root = tree
            .insert_group(None, LocalView::with_frame(bounds), Box::new(Probe::new(&log)))
            .unwrap();
        let a = tree
            .insert(Some(root), LocalView::with_frame(bounds), Box::new(Probe::new(&log).touch()))
            .unwrap();
        tree.set_motion_event_splitting_enabled(root, false);

        tree.dispatch_touch_event(root, &touch(Action::Down, 0, 30.0, 40.0));
        tree.dispatch_touch_event(root, &two(Action::PointerDown(1), 10, (30.0, 40.0), (90.0, 70.0)));

        let a_seen = seen(&log, a, "touch");
        assert_eq!(a_seen[0].at, Point::new(30.0, 40.0));
        assert_eq!(a_seen[1].action, Some(Action::PointerDown(1)));
        assert_eq!(a_seen[1].pointers, 2);
        assert_eq!(a_seen[1].at, Point::new(30.0, 40.0));
    }

    #[test]
    fn without_splitting_later_pointers_join_the_first_target() {
        let log = Log::default();
        let (mut tree, root, a, b) =
            side_by_side(Probe::new(&log), Probe::new(&log).touch(), Probe::new(&log).touch());
        tree.set_motion_event_splitting_enabled(root, false);

        tree.dispatch_touch_event(root, &touch(Action::Down, 0, 50.0, 50.0));
        tree.dispatch_touch_event(root, &two(Action::PointerDown(1), 10, (50.0, 50.0), (300.0, 60.0)));

        assert_eq!(tree.touch_targets(root).as_slice(), &[(a, PointerIdBits::ALL)]);
        assert!(actions(&log, b, "touch").is_empty());
        let a_seen = seen(&log, a, "touch");
        assert_eq!(a_seen[1].action, Some(Action::PointerDown(1)));
        assert_eq!(a_seen[1].pointers, 2);
    }

    #[test]
    fn intercept_cancels_child_and_takes_gesture() {
        let log = Log::default();
        let mut root = Probe::new(&log).touch();
        root.intercept_moves = true;
        let (mut tree, root, a, _) = side_by_side(root, Probe::new(&log).touch(), Probe::new(&log));

        tree.dispatch_touch_event(root, &touch(Action::Down, 0, 50.0, 50.0));
        assert!(tree.dispatch_touch_event(root, &touch(Action::Move, 16, 50.0, 80.0)));
        assert!(tree.touch_targets(root).is_empty());
        tree.dispatch_touch_event(root, &touch(Action::Move, 32, 50.0, 120.0));
        tree.dispatch_touch_event(root, &touch(Action::Up, 48, 50.0, 120.0));

        assert_eq!(actions(&log, a, "touch"), vec![Action::Down, Action::Cancel]);
        assert_eq!(actions(&log, root, "intercept"), vec![Action::Down, Action::Move]);
        assert_eq!(actions(&log, root, "touch"), vec![Action::Move, Action::Up]);
    }

    #[test]
    fn disallow_intercept_lasts_for_one_gesture() {
        let log = Log::default();
        let mut root = Probe::new(&log);
        root.intercept_moves = true;
        let mut a = Probe::new(&log).touch();
        a.disallow_on_down = true;
        let (mut tree, root, a, _) = side_by_side(root, a, Probe::new(&log));

        tree.dispatch_touch_event(root, &touch(Action::Down, 0, 50.0, 50.0));
        assert!(tree.group_flags(root).unwrap().contains(GroupFlags::DISALLOW_INTERCEPT));
        tree.dispatch_touch_event(root, &touch(Action::Move, 16, 50.0, 80.0));
        tree.dispatch_touch_event(root, &touch(Action::Up, 32, 50.0, 80.0));

        assert_eq!(actions(&log, a, "touch"), vec![Action::Down, Action::Move, Action::Up]);
        assert_eq!(actions(&log, root, "intercept"), vec![Action::Down]);
        assert!(!tree.group_flags(root).unwrap().contains(GroupFlags::DISALLOW_INTERCEPT));
    }

    #[test]
    fn elevation_and_drawing_order_decide_hits() {
        let log = Log::default();
        let mut tree = ViewTree::new();
        let mut root = Probe::new(&log);
        root.order = Some(|count, position| count - 1 - position);
        let root = tree
            .insert_group(
                None,
                LocalView::with_frame(Rect::new(0.0, 0.0, 100.0, 100.0)),
                Box::new(root),
            )
            .unwrap();
        let frame = || LocalView::with_frame(Rect::new(0.0, 0.0, 100.0, 100.0));
        let a = tree
            .insert(Some(root), frame(), Box::new(Probe::new(&log).touch()))
            .unwrap();
        let b = tree
            .insert(Some(root), frame(), Box::new(Probe::new(&log).touch()))
            .unwrap();

        let hit = |tree: &mut ViewTree| {
            tree.dispatch_touch_event(root, &touch(Action::Down, 0, 10.0, 10.0));
            tree.dispatch_touch_event(root, &touch(Action::Cancel, 0, 10.0, 10.0));
            log.borrow().iter().rev().find(|s| s.kind == "touch").map(|s| s.view)
        };

        // Later children draw on top.
        assert_eq!(hit(&mut tree), Some(b));
        tree.set_children_drawing_order_enabled(root, true);
        assert_eq!(hit(&mut tree), Some(a));
        tree.set_children_drawing_order_enabled(root, false);
        tree.set_z(a, 2.0);
        assert_eq!(hit(&mut tree), Some(a));
        tree.set_z(a, 0.0);

        tree.set_visible(b, false);
        assert_eq!(hit(&mut tree), Some(a));
        tree.set_animating(b, true);
        assert_eq!(hit(&mut tree), Some(b));
    }

    #[test]
    fn invalid_drawing_order_falls_back_to_natural() {
        let log = Log::default();
        let mut root = Probe::new(&log);
        root.order = Some(|count, _| count);
        let (mut tree, root, _, b) =
            side_by_side(root, Probe::new(&log).touch(), Probe::new(&log).touch());
        tree.set_children_drawing_order_enabled(root, true);
        tree.dispatch_touch_event(root, &touch(Action::Down, 0, 300.0, 10.0));
        assert_eq!(tree.touch_targets(root).as_slice(), &[(b, PointerIdBits::from_id(0))]);
    }

    #[test]
    fn transformed_child_sees_local_coordinates() {
        let log = Log::default();
        let (mut tree, root, _, b) =
            side_by_side(Probe::new(&log), Probe::new(&log), Probe::new(&log).touch());
        tree.set_transform(b, Affine::scale(2.0));
        tree.scroll_to(root, 0, 20);

        // Content point (300, 60) is at window (300, 40); in b it is (50, 30).
        tree.dispatch_touch_event(root, &touch(Action::Down, 0, 300.0, 40.0));
        assert_eq!(seen(&log, b, "touch")[0].at, Point::new(50.0, 30.0));
        // Outside b's scaled-down bounds.
        tree.set_transform(b, Affine::scale(0.5));
        let _ = tree.dispatch_touch_event(root, &touch(Action::Down, 10, 300.0, 40.0));
        assert!(tree.touch_targets(root).is_empty());
    }

    #[test]
    fn removing_a_target_cancels_it() {
        let log = Log::default();
        let (mut tree, root, a, _) =
            side_by_side(Probe::new(&log), Probe::new(&log).touch(), Probe::new(&log));
        tree.dispatch_touch_event(root, &touch(Action::Down, 5, 50.0, 50.0));
        tree.remove(a).unwrap();

        assert!(tree.touch_targets(root).is_empty());
        assert_eq!(actions(&log, a, "touch"), vec![Action::Down, Action::Cancel]);
        assert_eq!(seen(&log, a, "detached").len(), 1);
    }

    #[test]
    fn temporary_detach_turns_next_event_into_cancel() {
        let log = Log::default();
        let (mut tree, root, a, _) =
            side_by_side(Probe::new(&log), Probe::new(&log).touch(), Probe::new(&log));
        tree.dispatch_touch_event(root, &touch(Action::Down, 0, 50.0, 50.0));
        tree.dispatch_start_temporary_detach(a);
        tree.dispatch_touch_event(root, &touch(Action::Move, 16, 50.0, 60.0));
        tree.dispatch_touch_event(root, &touch(Action::Move, 32, 50.0, 70.0));

        assert_eq!(actions(&log, a, "touch"), vec![Action::Down, Action::Cancel]);
        assert!(tree.touch_targets(root).is_empty());
        assert_eq!(actions(&log, root, "touch"), vec![Action::Move]);
    }

    #[test]
    fn hover_moves_between_children() {
        let log = Log::default();
        let (mut tree, root, a, b) =
            side_by_side(Probe::new(&log), Probe::new(&log), Probe::new(&log).hover());
        let hover = |action, t, x, y| {
            MotionEvent::single(action, t, t, Point::new(x, y)).with_source(Source::MOUSE)
        };

        assert!(!tree.dispatch_hover_event(root, &hover(Action::HoverEnter, 0, 50.0, 50.0)));
        assert!(tree.is_hovered(a));
        assert!(tree.is_hovered(root));
        assert_eq!(tree.hover_targets(root).as_slice(), &[a]);

        assert!(tree.dispatch_hover_event(root, &hover(Action::HoverMove, 10, 300.0, 50.0)));
        assert!(!tree.is_hovered(a));
        assert!(tree.is_hovered(b));
        assert!(!tree.is_hovered(root), "b handled the move, so the group exits itself");
        assert_eq!(tree.hover_targets(root).as_slice(), &[b]);

        tree.dispatch_hover_event(root, &hover(Action::HoverExit, 20, 300.0, 50.0));
        assert!(!tree.is_hovered(b));
        assert!(tree.hover_targets(root).is_empty());

        assert_eq!(
            actions(&log, a, "hover"),
            vec![Action::HoverEnter, Action::HoverMove, Action::HoverExit]
        );
        assert!(seen(&log, a, "hover")[1].exit_pending);
        assert_eq!(
            actions(&log, b, "hover"),
            vec![Action::HoverEnter, Action::HoverMove, Action::HoverExit]
        );
        assert_eq!(seen(&log, b, "hover")[0].at, Point::new(100.0, 50.0));
        assert_eq!(
            actions(&log, root, "hover"),
            vec![Action::HoverEnter, Action::HoverMove, Action::HoverExit]
        );
    }

    #[test]
    fn removing_hovered_child_sends_exit() {
        let log = Log::default();
        let (mut tree, root, a, _) =
            side_by_side(Probe::new(&log), Probe::new(&log).hover(), Probe::new(&log));
        let enter = MotionEvent::single(Action::HoverEnter, 0, 0, Point::new(10.0, 10.0));
        tree.dispatch_hover_event(root, &enter);
        tree.remove(a).unwrap();
        assert!(tree.hover_targets(root).is_empty());
        assert_eq!(actions(&log, a, "hover"), vec![Action::HoverEnter, Action::HoverExit]);
    }

    #[test]
    fn generic_pointer_events_hit_front_most_child() {
        let log = Log::default();
        let mut b = Probe::new(&log);
        b.generic = true;
        let (mut tree, root, a, b) = side_by_side(Probe::new(&log), Probe::new(&log), b);
        let wheel = |x, y| {
            MotionEvent::single(Action::Scroll, 0, 0, Point::new(x, y)).with_source(Source::MOUSE)
        };

        assert!(tree.dispatch_generic_motion_event(root, &wheel(300.0, 10.0)));
        assert!(!tree.dispatch_generic_motion_event(root, &wheel(10.0, 10.0)));
        assert_eq!(actions(&log, b, "generic"), vec![Action::Scroll]);
        assert_eq!(actions(&log, a, "generic"), vec![Action::Scroll]);
        assert_eq!(actions(&log, root, "generic"), vec![Action::Scroll]);
    }

    #[test]
    fn detaching_a_group_cancels_and_notifies_subtree() {
        let log = Log::default();
        let (mut tree, root, a, b) =
            side_by_side(Probe::new(&log), Probe::new(&log).touch(), Probe::new(&log));
        tree.dispatch_touch_event(root, &touch(Action::Down, 0, 50.0, 50.0));
        tree.dispatch_detached_from_window(root);

        assert_eq!(actions(&log, a, "touch"), vec![Action::Down, Action::Cancel]);
        let detached: Vec<_> = log
            .borrow()
            .iter()
            .filter(|s| s.kind == "detached")
            .map(|s| s.view)
            .collect();
        assert_eq!(detached, vec![a, b, root]);
        assert!(!tree.flags(a).unwrap().contains(ViewFlags::ATTACHED));
    }
}
