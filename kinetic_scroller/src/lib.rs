// Copyright 2025 the Kinetic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=kinetic_scroller --heading-base-level=0

//! Kinetic Scroller: spline fling physics and scroll animation.
//!
//! This crate computes where scrolled content should be at a given animation time. It never
//! moves anything itself: owners start an animation and poll it once per frame.
//!
//! - [`Scroller`]: fixed-duration scrolls and spline flings clamped to bounds.
//! - [`OverScroller`]: the same, plus over-scroll past the bounds and spring-back, driven by a
//!   per-axis [`SplineOverScroller`] state machine (spline → ballistic → cubic).
//! - [`spline_tables`]: the shared, lazily built fling curve tables.
//! - [`Interpolator`]: easing curves for fixed-duration scrolls ([`ViscousFluid`] by default,
//!   [`Linear`] for tests and tools).
//! - [`AnimationClock`]: the time source; [`MonotonicClock`] in production, [`ManualClock`] for
//!   deterministic tests and replays.
//!
//! ## Fling model
//!
//! A fling's duration and distance follow a logarithmic deceleration model parameterized by
//! the fling friction and the display density ([`ScrollConfig`]). The position over time
//! follows the spline: fast at first, easing to a stop. When a fling's final position falls
//! outside the bounds it is clamped and its duration shortened so it still ends at rest.
//!
//! ## Example
//!
//! ```rust
//! use kinetic_scroller::{ManualClock, OverScroller, ScrollConfig};
//!
//! let clock = ManualClock::new(0);
//! let mut scroller = OverScroller::with_clock(ScrollConfig::default(), clock.clone());
//! scroller.fling(0, 200, 0.0, 3000.0, 0, 0, 0, 10_000);
//!
//! let mut last = scroller.curr_y();
//! while scroller.compute_scroll_offset() {
//!     assert!(scroller.curr_y() >= last);
//!     last = scroller.curr_y();
//!     clock.advance(16);
//! }
//! assert_eq!(scroller.curr_y(), scroller.final_y());
//! ```
//!
//! All positions are whole pixels; velocities are pixels per second; times are milliseconds.

mod clock;
mod config;
mod interpolator;
mod over_scroller;
mod scroller;
mod spline;

pub use clock::{AnimationClock, ManualClock, MonotonicClock};
pub use config::ScrollConfig;
pub use interpolator::{Interpolator, Linear, ViscousFluid};
pub use over_scroller::{AxisState, OverScroller, SplineOverScroller};
pub use scroller::Scroller;
pub use spline::{NB_SAMPLES, SplineTables, ensure_spline_tables_initialized, spline_tables};
