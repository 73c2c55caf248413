// Copyright 2025 the Kinetic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Gesture thresholds shared by scrolling views.

/// Distances and velocities used to classify gestures, in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewConfiguration {
    /// Distance a pointer must travel before a drag starts.
    pub touch_slop: f64,
    /// Slowest release velocity, in pixels per second, that starts a fling.
    pub minimum_fling_velocity: f64,
    /// Fastest fling velocity, in pixels per second.
    pub maximum_fling_velocity: f64,
    /// How far a drag may pull content past its bounds.
    pub overscroll_distance: i32,
    /// How far a fling may carry content past its bounds.
    pub overfling_distance: i32,
}

impl ViewConfiguration {
    /// Thresholds for a display of the given density (`1.0` is 160 pixels per inch).
    #[allow(
        clippy::cast_possible_truncation,
        reason = "distances are whole pixels"
    )]
    pub fn for_density(density: f64) -> Self {
        Self {
            touch_slop: (8.0 * density + 0.5).floor(),
            minimum_fling_velocity: (50.0 * density + 0.5).floor(),
            maximum_fling_velocity: (8000.0 * density + 0.5).floor(),
            overscroll_distance: 0,
            overfling_distance: (6.0 * density + 0.5) as i32,
        }
    }
}

impl Default for ViewConfiguration {
    fn default() -> Self {
        Self::for_density(1.0)
    }
}
