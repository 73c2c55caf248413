// Copyright 2025 the Kinetic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Core tree implementation: structure, geometry, and handler plumbing.

use core::any::Any;
use core::fmt;

use kurbo::{Affine, Point, Rect, Vec2};
use smallvec::SmallVec;

use crate::config::ViewConfiguration;
use crate::error::{Result, ViewError};
use crate::handler::{ViewContext, ViewHandler};
use crate::region::Region;
use crate::target::{HoverTargets, TouchTargets};
use crate::types::{GroupFlags, LocalView, ScrollAxes, ViewFlags, ViewId};

/// A hierarchy of views with pointer dispatch.
///
/// Views live in an arena and are addressed by generational [`ViewId`]s. A view created with
/// [`ViewTree::insert_group`] can hold children and routes pointer events to them; a view
/// created with [`ViewTree::insert`] is a leaf. Each view carries a [`ViewHandler`] that
/// implements its behavior.
///
/// ## Example
///
/// ```rust
/// use kinetic_view::{LocalView, PlainView, ViewTree};
/// use kurbo::Rect;
///
/// let mut tree = ViewTree::new();
/// let root = tree.insert_group(
///     None,
///     LocalView::with_frame(Rect::new(0.0, 0.0, 400.0, 400.0)),
///     Box::new(PlainView),
/// )
/// .unwrap();
/// let child = tree
///     .insert(Some(root), LocalView::with_frame(Rect::new(0.0, 0.0, 100.0, 40.0)), Box::new(PlainView))
///     .unwrap();
///
/// assert_eq!(tree.parent_of(child), Some(root));
/// tree.remove(child).unwrap();
/// assert!(!tree.is_alive(child));
/// ```
pub struct ViewTree {
    /// slots
    nodes: Vec<Option<Node>>,
    /// last generation per slot (persists across frees)
    generations: Vec<u32>,
    free_list: Vec<usize>,
    damage: Region,
    animation_requested: bool,
    /// Time of the last event entering the tree; synthesized events reuse it.
    pub(crate) last_event_time: i64,
    config: ViewConfiguration,
}

impl fmt::Debug for ViewTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.nodes.len();
        let alive = self.nodes.iter().filter(|n| n.is_some()).count();
        f.debug_struct("ViewTree")
            .field("nodes_total", &total)
            .field("nodes_alive", &alive)
            .field("free_list", &self.free_list.len())
            .field("damage", &self.damage)
            .field("animation_requested", &self.animation_requested)
            .finish_non_exhaustive()
    }
}

impl Default for ViewTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Bookkeeping of the most recent down that found a new touch target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LastTouchDown {
    /// Down time of the gesture.
    pub time: i64,
    /// Index of the receiving child in the group's child list.
    pub child_index: usize,
    /// Position of the down in the group's coordinates.
    pub position: Point,
}

/// Dispatch state of a group.
#[derive(Debug, Default)]
pub(crate) struct GroupState {
    pub(crate) children: Vec<ViewId>,
    pub(crate) flags: GroupFlags,
    pub(crate) touch_targets: TouchTargets,
    pub(crate) hover_targets: HoverTargets,
    pub(crate) hovered_self: bool,
    pub(crate) nested_axes: ScrollAxes,
    pub(crate) last_touch_down: Option<LastTouchDown>,
}

pub(crate) struct Node {
    generation: u32,
    pub(crate) parent: Option<ViewId>,
    pub(crate) local: LocalView,
    pub(crate) scroll: (i32, i32),
    pub(crate) group: Option<GroupState>,
    /// Taken out while the handler runs.
    handler: Option<Box<dyn ViewHandler>>,
    /// Ancestor cooperating in the current nested scroll.
    pub(crate) nested_parent: Option<ViewId>,
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("generation", &self.generation)
            .field("parent", &self.parent)
            .field("local", &self.local)
            .field("scroll", &self.scroll)
            .field("group", &self.group)
            .field("handler_present", &self.handler.is_some())
            .field("nested_parent", &self.nested_parent)
            .finish()
    }
}

impl ViewTree {
    /// Create a new empty tree with default gesture thresholds.
    pub fn new() -> Self {
        Self::with_config(ViewConfiguration::default())
    }

    /// Create a new empty tree with the given gesture thresholds.
    pub fn with_config(config: ViewConfiguration) -> Self {
        Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            damage: Region::default(),
            animation_requested: false,
            last_event_time: 0,
            config,
        }
    }

    /// Gesture thresholds.
    pub const fn config(&self) -> &ViewConfiguration {
        &self.config
    }

    /// Insert a leaf view under `parent` (or as a window root when `None`).
    pub fn insert(
        &mut self,
        parent: Option<ViewId>,
        local: LocalView,
        handler: Box<dyn ViewHandler>,
    ) -> Result<ViewId> {
        self.insert_node(parent, local, handler, None)
    }

    /// Insert a group view under `parent` (or as a window root when `None`).
    pub fn insert_group(
        &mut self,
        parent: Option<ViewId>,
        local: LocalView,
        handler: Box<dyn ViewHandler>,
    ) -> Result<ViewId> {
        self.insert_node(parent, local, handler, Some(GroupState::default()))
    }

    fn insert_node(
        &mut self,
        parent: Option<ViewId>,
        mut local: LocalView,
        handler: Box<dyn ViewHandler>,
        group: Option<GroupState>,
    ) -> Result<ViewId> {
        let attached = match parent {
            None => true,
            Some(p) => {
                let node = self.node(p).ok_or(ViewError::StaleView(p))?;
                if node.group.is_none() {
                    return Err(ViewError::NotAGroup(p));
                }
                node.local.flags.contains(ViewFlags::ATTACHED)
            }
        };
        local.flags.set(ViewFlags::ATTACHED, attached);
        local.flags.remove(ViewFlags::CANCEL_NEXT_UP_EVENT | ViewFlags::HOVERED);

        let idx = if let Some(idx) = self.free_list.pop() {
            idx
        } else {
            self.nodes.push(None);
            self.generations.push(0);
            self.nodes.len() - 1
        };
        let generation = self.generations[idx].wrapping_add(1);
        self.generations[idx] = generation;
        #[allow(
            clippy::cast_possible_truncation,
            reason = "the arena never holds more than u32::MAX views"
        )]
        let id = ViewId::new(idx as u32, generation);
        self.nodes[idx] = Some(Node {
            generation,
            parent,
            local,
            scroll: (0, 0),
            group,
            handler: Some(handler),
            nested_parent: None,
        });
        if let Some(p) = parent
            && let Some(group) = self.group_mut(p)
        {
            group.children.push(id);
        }
        self.invalidate(id);
        Ok(id)
    }

    /// Remove a view and its subtree.
    ///
    /// If the view is receiving touch or hover events through its parent it first gets a
    /// cancel or hover exit; attached views are then detached from the window.
    pub fn remove(&mut self, id: ViewId) -> Result<()> {
        if !self.is_alive(id) {
            return Err(ViewError::StaleView(id));
        }
        self.invalidate(id);
        if let Some(parent) = self.parent_of(id) {
            self.cancel_touch_target(parent, id);
            self.cancel_hover_target(parent, id);
        }
        if self.flags(id).is_some_and(|f| f.contains(ViewFlags::ATTACHED)) {
            self.dispatch_detached_from_window(id);
        }
        // The detach callbacks may have removed the view already.
        if !self.is_alive(id) {
            return Ok(());
        }
        if let Some(parent) = self.parent_of(id)
            && let Some(group) = self.group_mut(parent)
        {
            group.children.retain(|c| *c != id);
        }
        self.free_subtree(id);
        Ok(())
    }

    fn free_subtree(&mut self, id: ViewId) {
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let Some(node) = self.nodes.get_mut(id.idx()).and_then(Option::take) else {
                continue;
            };
            if let Some(group) = node.group {
                stack.extend(group.children.iter().copied());
            }
            self.free_list.push(id.idx());
        }
    }

    #[inline]
    pub(crate) fn node(&self, id: ViewId) -> Option<&Node> {
        self.nodes
            .get(id.idx())?
            .as_ref()
            .filter(|n| n.generation == id.1)
    }

    #[inline]
    pub(crate) fn node_mut(&mut self, id: ViewId) -> Option<&mut Node> {
        self.nodes
            .get_mut(id.idx())?
            .as_mut()
            .filter(|n| n.generation == id.1)
    }

    pub(crate) fn group(&self, id: ViewId) -> Option<&GroupState> {
        self.node(id)?.group.as_ref()
    }

    pub(crate) fn group_mut(&mut self, id: ViewId) -> Option<&mut GroupState> {
        self.node_mut(id)?.group.as_mut()
    }

    /// Returns `true` if `id` refers to a view in the tree.
    pub fn is_alive(&self, id: ViewId) -> bool {
        self.node(id).is_some()
    }

    /// Returns `true` if `id` is a live group.
    pub fn is_group(&self, id: ViewId) -> bool {
        self.group(id).is_some()
    }

    /// Parent of a live view.
    pub fn parent_of(&self, id: ViewId) -> Option<ViewId> {
        self.node(id)?.parent
    }

    /// Children of a live group, in insertion order.
    pub fn children_of(&self, id: ViewId) -> &[ViewId] {
        self.group(id).map_or(&[], |g| g.children.as_slice())
    }

    /// Frame of a live view in its parent's content coordinates.
    pub fn frame(&self, id: ViewId) -> Option<Rect> {
        Some(self.node(id)?.local.frame)
    }

    /// Content transform of a live view.
    pub fn transform(&self, id: ViewId) -> Option<Affine> {
        Some(self.node(id)?.local.transform)
    }

    /// Elevation of a live view.
    pub fn z(&self, id: ViewId) -> Option<f64> {
        Some(self.node(id)?.local.z)
    }

    /// Flags of a live view.
    pub fn flags(&self, id: ViewId) -> Option<ViewFlags> {
        Some(self.node(id)?.local.flags)
    }

    /// Dispatch flags of a live group.
    pub fn group_flags(&self, id: ViewId) -> Option<GroupFlags> {
        Some(self.group(id)?.flags)
    }

    /// Scroll offset of a live view.
    pub fn scroll(&self, id: ViewId) -> Option<(i32, i32)> {
        Some(self.node(id)?.scroll)
    }

    /// Axes of the nested scroll a live group currently takes part in as a parent.
    pub fn nested_scroll_axes(&self, id: ViewId) -> ScrollAxes {
        self.group(id).map_or(ScrollAxes::empty(), |g| g.nested_axes)
    }

    /// The most recent down that found a new touch target in a live group.
    pub fn last_touch_down(&self, id: ViewId) -> Option<LastTouchDown> {
        self.group(id)?.last_touch_down
    }

    /// Current touch targets of a group, most recently added first.
    pub fn touch_targets(&self, id: ViewId) -> SmallVec<[(ViewId, kinetic_motion::PointerIdBits); 4]> {
        self.group(id)
            .map(|g| g.touch_targets.snapshot())
            .unwrap_or_default()
    }

    /// Children of a group currently under a hovering pointer.
    pub fn hover_targets(&self, id: ViewId) -> SmallVec<[ViewId; 4]> {
        self.group(id)
            .map(|g| g.hover_targets.iter().map(|(c, ())| c).collect())
            .unwrap_or_default()
    }

    /// Sets the frame of a live view.
    pub fn set_frame(&mut self, id: ViewId, frame: Rect) {
        self.invalidate(id);
        if let Some(node) = self.node_mut(id) {
            node.local.frame = frame;
        }
        self.invalidate(id);
    }

    /// Sets the content transform of a live view.
    pub fn set_transform(&mut self, id: ViewId, transform: Affine) {
        self.invalidate(id);
        if let Some(node) = self.node_mut(id) {
            node.local.transform = transform;
        }
        self.invalidate(id);
    }

    /// Sets the elevation of a live view.
    pub fn set_z(&mut self, id: ViewId, z: f64) {
        if let Some(node) = self.node_mut(id) {
            node.local.z = z;
        }
        self.invalidate(id);
    }

    /// Shows or hides a live view.
    pub fn set_visible(&mut self, id: ViewId, visible: bool) {
        self.invalidate(id);
        if let Some(node) = self.node_mut(id) {
            node.local.flags.set(ViewFlags::VISIBLE, visible);
        }
    }

    /// Marks a live view as running a transient animation.
    pub fn set_animating(&mut self, id: ViewId, animating: bool) {
        if let Some(node) = self.node_mut(id) {
            node.local.flags.set(ViewFlags::ANIMATING, animating);
        }
    }

    /// Enables or disables nested scrolling for a live view. Disabling stops a nested scroll
    /// in progress.
    pub fn set_nested_scrolling_enabled(&mut self, id: ViewId, enabled: bool) {
        if !enabled {
            self.stop_nested_scroll(id);
        }
        if let Some(node) = self.node_mut(id) {
            node.local.flags.set(ViewFlags::NESTED_SCROLLING_ENABLED, enabled);
        }
    }

    /// Enables or disables splitting pointers of one gesture across children of a group.
    pub fn set_motion_event_splitting_enabled(&mut self, id: ViewId, enabled: bool) {
        if let Some(group) = self.group_mut(id) {
            group.flags.set(GroupFlags::SPLIT_MOTION_EVENTS, enabled);
        }
    }

    /// Enables or disables the handler-defined child drawing order of a group.
    pub fn set_children_drawing_order_enabled(&mut self, id: ViewId, enabled: bool) {
        if let Some(group) = self.group_mut(id) {
            group.flags.set(GroupFlags::CHILDREN_DRAWING_ORDER, enabled);
        }
    }

    /// Scrolls a live view's content to `(x, y)`.
    pub fn scroll_to(&mut self, id: ViewId, x: i32, y: i32) {
        let Some(node) = self.node_mut(id) else {
            return;
        };
        if node.scroll != (x, y) {
            node.scroll = (x, y);
            self.invalidate(id);
        }
    }

    /// Transform from a view's coordinates to window coordinates.
    pub fn window_transform(&self, id: ViewId) -> Affine {
        let mut transform = Affine::IDENTITY;
        let mut cur = Some(id);
        while let Some(id) = cur {
            let Some(node) = self.node(id) else {
                break;
            };
            let mut offset = node.local.frame.origin().to_vec2();
            if let Some(parent) = node.parent.and_then(|p| self.node(p)) {
                offset -= Vec2::new(f64::from(parent.scroll.0), f64::from(parent.scroll.1));
            }
            transform = Affine::translate(offset) * node.local.transform * transform;
            cur = node.parent;
        }
        transform
    }

    /// Top-left corner of a view in window coordinates, rounded to whole pixels.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "window locations are whole pixels"
    )]
    pub fn location_in_window(&self, id: ViewId) -> [i32; 2] {
        let p = self.window_transform(id) * Point::ZERO;
        [(p.x + 0.5).floor() as i32, (p.y + 0.5).floor() as i32]
    }

    /// Marks a view's window-space bounds for repaint.
    pub fn invalidate(&mut self, id: ViewId) {
        let Some(node) = self.node(id) else {
            return;
        };
        let size = node.local.frame.size();
        let local = Rect::from_origin_size(Point::ZERO, size);
        let rect = self.window_transform(id).transform_rect_bbox(local);
        self.damage.add(rect);
    }

    /// Takes the accumulated repaint region.
    pub fn take_damage(&mut self) -> Region {
        core::mem::take(&mut self.damage)
    }

    pub(crate) fn request_animation_frame(&mut self) {
        self.animation_requested = true;
    }

    /// Runs one animation frame: every live view's [`ViewHandler::compute_scroll`] is called,
    /// parents before children.
    ///
    /// Returns `true` if a handler asked for another frame.
    pub fn run_animation_frame(&mut self) -> bool {
        self.animation_requested = false;
        let mut stack: Vec<ViewId> = self
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(idx, n)| {
                let n = n.as_ref()?;
                #[allow(
                    clippy::cast_possible_truncation,
                    reason = "the arena never holds more than u32::MAX views"
                )]
                let id = ViewId::new(idx as u32, n.generation);
                n.parent.is_none().then_some(id)
            })
            .collect();
        stack.reverse();
        while let Some(id) = stack.pop() {
            if !self.is_alive(id) {
                continue;
            }
            self.with_handler(id, (), |handler, cx| handler.compute_scroll(cx));
            stack.extend(self.children_of(id).iter().rev().copied());
        }
        self.animation_requested
    }

    /// Returns `true` if a handler requested an animation frame since the last one ran.
    pub const fn is_animation_requested(&self) -> bool {
        self.animation_requested
    }

    /// Borrow the handler of a live view as its concrete type.
    pub fn handler<T: ViewHandler>(&self, id: ViewId) -> Option<&T> {
        let handler: &dyn Any = self.node(id)?.handler.as_deref()?;
        handler.downcast_ref::<T>()
    }

    /// Mutably borrow the handler of a live view as its concrete type.
    pub fn handler_mut<T: ViewHandler>(&mut self, id: ViewId) -> Option<&mut T> {
        let handler: &mut dyn Any = self.node_mut(id)?.handler.as_deref_mut()?;
        handler.downcast_mut::<T>()
    }

    /// Runs `f` with the handler of `id`, downcast to `T`, and a context for `id`.
    ///
    /// Returns `None` if the view is gone, its handler is not a `T`, or the handler is already
    /// running further up the stack.
    pub fn with_view<T: ViewHandler, R>(
        &mut self,
        id: ViewId,
        f: impl FnOnce(&mut T, &mut ViewContext<'_>) -> R,
    ) -> Option<R> {
        self.with_handler(id, None, |handler, cx| {
            let handler: &mut dyn Any = handler;
            handler.downcast_mut::<T>().map(|handler| f(handler, cx))
        })
    }

    /// Depth-first search from `root` (inclusive) for the first view carrying `tag`.
    pub fn find_view_by_tag(&self, root: ViewId, tag: i32) -> Option<ViewId> {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(node) = self.node(id) else {
                continue;
            };
            if node.local.tag == Some(tag) {
                return Some(id);
            }
            stack.extend(self.children_of(id).iter().rev().copied());
        }
        None
    }

    /// Runs `f` with the handler of `id` and a context for `id`.
    ///
    /// Returns `default` if the view is gone or its handler is already running further up the
    /// stack.
    pub(crate) fn with_handler<R>(
        &mut self,
        id: ViewId,
        default: R,
        f: impl FnOnce(&mut dyn ViewHandler, &mut ViewContext<'_>) -> R,
    ) -> R {
        let Some(node) = self.node_mut(id) else {
            return default;
        };
        let Some(mut handler) = node.handler.take() else {
            tracing::warn!(?id, "view handler re-entered; call skipped");
            return default;
        };
        let result = {
            let mut cx = ViewContext { tree: self, id };
            f(handler.as_mut(), &mut cx)
        };
        if let Some(node) = self.node_mut(id) {
            node.handler = Some(handler);
        }
        result
    }
}
