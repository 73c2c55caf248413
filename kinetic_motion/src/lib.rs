// Copyright 2025 the Kinetic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=kinetic_motion --heading-base-level=0

//! Kinetic Motion: multi-pointer motion events.
//!
//! A [`MotionEvent`] describes one step of a pointer gesture: an [`Action`], the positions of
//! every pointer currently down (each with a gesture-stable [`PointerId`]), timing, the
//! producing device ([`Source`]), and optionally batched earlier positions.
//!
//! - [`PointerIdBits`]: a set of pointer ids, used to route pointers to different receivers.
//! - [`MotionEvent::split`]: restricts an event to a subset of its pointers and rewrites the
//!   action for that subset.
//! - [`MotionEvent::offset_location`] / [`MotionEvent::transform`]: move an event into a
//!   child's coordinate space.
//! - [`VelocityTracker`]: estimates pointer velocities from a stream of events.
//!
//! ## Example
//!
//! ```rust
//! use kinetic_motion::{Action, MotionEvent, Pointer, PointerIdBits};
//!
//! // A second finger lands while the first is down.
//! let event = MotionEvent::try_new(
//!     Action::PointerDown(1),
//!     0,
//!     16,
//!     &[Pointer::new(0, 10.0, 10.0), Pointer::new(1, 200.0, 10.0)],
//! )
//! .unwrap();
//!
//! // Seen by a receiver that only owns the new finger, it is the start of a gesture.
//! let split = event.split(PointerIdBits::from_id(1)).unwrap();
//! assert_eq!(split.action(), Action::Down);
//! assert_eq!(split.pointer_count(), 1);
//! ```
//!
//! Malformed input to [`MotionEvent::try_new`] is reported as a [`MotionError`]; reading a
//! pointer index that does not exist logs an error and yields zero.

mod error;
mod event;
mod pointer;
mod velocity;

pub use error::{MotionError, Result};
pub use event::{Action, EventFlags, MotionEvent, Pointer, Source};
pub use pointer::{MAX_POINTER_ID, PointerId, PointerIdBits};
pub use velocity::VelocityTracker;
