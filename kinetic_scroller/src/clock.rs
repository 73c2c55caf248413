// Copyright 2025 the Kinetic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Animation time sources.
//!
//! Scrollers read the current animation time when an animation starts and every time they are
//! polled. Production code uses [`MonotonicClock`]; tests and replay tools drive a
//! [`ManualClock`] by hand so every frame is deterministic.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// A millisecond time source for animations.
pub trait AnimationClock {
    /// Current animation time in milliseconds. Must never decrease.
    fn now_millis(&self) -> i64;
}

/// Wall-clock monotonic time, measured from the clock's creation.
#[derive(Clone, Copy, Debug)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Creates a clock whose zero is now.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationClock for MonotonicClock {
    fn now_millis(&self) -> i64 {
        i64::try_from(self.origin.elapsed().as_millis()).unwrap_or(i64::MAX)
    }
}

/// A clock advanced explicitly by the caller.
///
/// Clones share the same time, so one handle can drive several scrollers and a view tree.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Rc<Cell<i64>>,
}

impl ManualClock {
    /// Creates a clock reading `start` milliseconds.
    pub fn new(start: i64) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    /// Sets the current time.
    pub fn set(&self, millis: i64) {
        debug_assert!(millis >= self.now.get(), "animation time must not go backwards");
        self.now.set(millis);
    }

    /// Advances the current time by `millis`.
    pub fn advance(&self, millis: i64) {
        self.now.set(self.now.get() + millis);
    }
}

impl AnimationClock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new(100);
        let other = clock.clone();
        clock.advance(16);
        assert_eq!(other.now_millis(), 116);
        other.set(200);
        assert_eq!(clock.now_millis(), 200);
    }
}
