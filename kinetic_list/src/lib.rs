// Copyright 2025 the Kinetic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=kinetic_list --heading-base-level=0

//! Kinetic List: a touch-scrolled list view over an adapter and an extent model.
//!
//! The list is split into three parts:
//!
//! - An [`Adapter`] says how many rows there are.
//! - An [`ExtentModel`] says how tall each row is and where it starts.
//!   [`FixedExtentModel`] covers uniform rows; [`PrefixSumExtentModel`] covers rows measured
//!   one by one.
//! - [`ListView`] is a [`ViewHandler`](kinetic_view::ViewHandler) that scrolls the rows with
//!   drags and flings, and reports which rows are on screen.
//!
//! [`compute_visible_strip`] is the query underneath: it maps a scroll offset and viewport
//! height to the range of rows that intersect it.
//!
//! ## Example
//!
//! ```rust
//! use kinetic_list::{FixedExtentModel, ListView, VecAdapter};
//! use kinetic_scroller::{ManualClock, ScrollConfig};
//! use kinetic_view::{LocalView, ViewTree};
//! use kurbo::Rect;
//!
//! type Rows = ListView<VecAdapter<u32>, FixedExtentModel, ManualClock>;
//!
//! let clock = ManualClock::new(0);
//! let list = Rows::with_clock(
//!     (0..50).collect(),
//!     FixedExtentModel::new(50, 40),
//!     ScrollConfig::default(),
//!     clock.clone(),
//! );
//! let mut tree = ViewTree::new();
//! let id = tree
//!     .insert_group(None, LocalView::with_frame(Rect::new(0.0, 0.0, 400.0, 400.0)), Box::new(list))
//!     .unwrap();
//!
//! tree.with_view(id, |list: &mut Rows, cx| list.fling(cx, 3000.0));
//! while tree.run_animation_frame() {
//!     clock.advance(16);
//! }
//! let list = tree.handler::<Rows>(id).unwrap();
//! assert!(list.scroller().is_finished());
//! assert!(list.first_visible_position().unwrap() > 20);
//! ```

mod adapter;
mod fixed;
mod list_view;
mod model;
mod prefix_sum;

pub use adapter::{Adapter, VecAdapter};
pub use fixed::FixedExtentModel;
pub use list_view::ListView;
pub use model::{ExtentModel, ResizableExtentModel, VisibleStrip, compute_visible_strip};
pub use prefix_sum::PrefixSumExtentModel;
