// Copyright 2025 the Kinetic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Construction-time scroller configuration.

/// Physical parameters shared by [`Scroller`](crate::Scroller) and
/// [`OverScroller`](crate::OverScroller).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollConfig {
    /// Fling friction. Lower values make flings travel further.
    pub friction: f64,
    /// Display density; `1.0` is 160 pixels per inch.
    pub density: f64,
    /// Duration in milliseconds used by `start_scroll` when none is given.
    pub default_duration: i64,
    /// Whether a new fling in the same direction adds the velocity of a running one.
    pub flywheel: bool,
}

impl ScrollConfig {
    /// Default fling friction.
    pub const DEFAULT_FRICTION: f64 = 0.015;
    /// Default `start_scroll` duration in milliseconds.
    pub const DEFAULT_DURATION: i64 = 250;

    /// Returns this configuration with `density` replaced.
    #[must_use]
    pub const fn with_density(mut self, density: f64) -> Self {
        self.density = density;
        self
    }

    /// Returns this configuration with `friction` replaced.
    #[must_use]
    pub const fn with_friction(mut self, friction: f64) -> Self {
        self.friction = friction;
        self
    }

    /// Returns this configuration with flywheel behavior set.
    #[must_use]
    pub const fn with_flywheel(mut self, flywheel: bool) -> Self {
        self.flywheel = flywheel;
        self
    }
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            friction: Self::DEFAULT_FRICTION,
            density: 1.0,
            default_duration: Self::DEFAULT_DURATION,
            flywheel: true,
        }
    }
}
