// Copyright 2025 the Kinetic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=kinetic_view --heading-base-level=0

//! Kinetic View: a view tree with multi-pointer touch dispatch and nested scrolling.
//!
//! A [`ViewTree`] holds a hierarchy of views. Groups route pointer events to their children;
//! leaves and groups alike react through a [`ViewHandler`].
//!
//! - Touch gestures are routed to touch targets: the children that accepted the first pointer
//!   of a gesture. With splitting enabled, later pointers that land on other children start
//!   targets of their own, and each target only sees the pointers it owns.
//! - A group can watch the gesture on its way down and steal it
//!   ([`ViewHandler::on_intercept_touch_event`]); the children that were receiving it get a
//!   cancel. A child can forbid that for the rest of the gesture
//!   ([`ViewContext::request_parent_disallow_intercept_touch_event`]).
//! - Hover events are routed to every child under the pointer with synthesized enter and exit.
//! - Nested scrolling lets a scrolling view share each scroll step and fling with a
//!   cooperating ancestor ([`ViewTree::start_nested_scroll`]).
//! - Children are hit-tested front to back: by elevation, then by drawing order.
//!
//! ## Example
//!
//! ```rust
//! use kinetic_motion::{Action, MotionEvent};
//! use kinetic_view::{LocalView, PlainView, ViewContext, ViewHandler, ViewTree};
//! use kurbo::{Point, Rect};
//!
//! #[derive(Default)]
//! struct Button {
//!     presses: u32,
//! }
//!
//! impl ViewHandler for Button {
//!     fn on_touch_event(&mut self, _cx: &mut ViewContext<'_>, event: &MotionEvent) -> bool {
//!         if event.action() == Action::Up {
//!             self.presses += 1;
//!         }
//!         true
//!     }
//! }
//!
//! let mut tree = ViewTree::new();
//! let window = tree
//!     .insert_group(None, LocalView::with_frame(Rect::new(0.0, 0.0, 400.0, 400.0)), Box::new(PlainView))
//!     .unwrap();
//! let button = tree
//!     .insert(
//!         Some(window),
//!         LocalView::with_frame(Rect::new(100.0, 100.0, 200.0, 140.0)),
//!         Box::new(Button::default()),
//!     )
//!     .unwrap();
//!
//! let at = Point::new(150.0, 120.0);
//! tree.dispatch_touch_event(window, &MotionEvent::single(Action::Down, 0, 0, at));
//! tree.dispatch_touch_event(window, &MotionEvent::single(Action::Up, 0, 40, at));
//! assert_eq!(tree.handler::<Button>(button).unwrap().presses, 1);
//! ```
//!
//! Handlers run with the tree borrowed through their [`ViewContext`]. A handler that is
//! re-entered while it is still running (for example by dispatching an event to its own view)
//! is skipped with a warning and the call is treated as unhandled.

mod config;
mod dispatch;
mod error;
mod handler;
mod nested;
mod region;
mod target;
mod tree;
mod types;

pub use config::ViewConfiguration;
pub use error::{Result, ViewError};
pub use handler::{PlainView, ViewContext, ViewHandler};
pub use region::Region;
pub use tree::{LastTouchDown, ViewTree};
pub use types::{GroupFlags, LocalView, ScrollAxes, ViewFlags, ViewId};
