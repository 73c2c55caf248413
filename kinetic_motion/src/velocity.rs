// Copyright 2025 the Kinetic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer velocity estimation for fling detection.
//!
//! Feed every motion event of a gesture to [`VelocityTracker::add_movement`], then call
//! [`VelocityTracker::compute_current_velocity`] when the gesture ends. Each pointer keeps a
//! short window of recent samples; the velocity is the slope of a least-squares line through
//! the samples inside the horizon.
//!
//! ```
//! use kinetic_motion::{Action, MotionEvent, VelocityTracker};
//! use kurbo::Point;
//!
//! let mut tracker = VelocityTracker::new();
//! tracker.add_movement(&MotionEvent::single(Action::Down, 0, 0, Point::new(0.0, 0.0)));
//! for i in 1..=5 {
//!     let t = i * 10;
//!     // 2 px per millisecond downward.
//!     let y = 2.0 * t as f64;
//!     tracker.add_movement(&MotionEvent::single(Action::Move, 0, t, Point::new(0.0, y)));
//! }
//! tracker.compute_current_velocity(1000.0, f64::MAX);
//! assert!((tracker.y_velocity(0) - 2000.0).abs() < 1e-6);
//! ```

use std::collections::{BTreeMap, VecDeque};

use kurbo::{Point, Vec2};

use crate::event::{Action, MotionEvent};
use crate::pointer::PointerId;

/// Samples older than this, relative to the newest, are ignored.
const HORIZON_MILLIS: i64 = 100;
/// Samples kept per pointer.
const HISTORY_SIZE: usize = 20;
/// A gap this long between samples means the pointer stopped; older samples are dropped.
const ASSUME_POINTER_STOPPED_MILLIS: i64 = 40;

#[derive(Clone, Copy, Debug)]
struct Sample {
    time: i64,
    position: Point,
}

/// Tracks recent pointer positions and estimates their velocity.
#[derive(Clone, Debug, Default)]
pub struct VelocityTracker {
    /// Recent samples per pointer, oldest first.
    samples: BTreeMap<PointerId, VecDeque<Sample>>,
    /// Velocities from the last [`Self::compute_current_velocity`], in the requested units.
    velocities: BTreeMap<PointerId, Vec2>,
}

impl VelocityTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets all samples and velocities.
    pub fn clear(&mut self) {
        self.samples.clear();
        self.velocities.clear();
    }

    /// Records the positions in `event`, including its batched history.
    ///
    /// `Down` and `HoverEnter` start a fresh gesture; `PointerDown` resets only the new
    /// pointer. Up and cancel events carry no new information and are ignored.
    pub fn add_movement(&mut self, event: &MotionEvent) {
        match event.action() {
            Action::Down | Action::HoverEnter => {
                self.clear();
            }
            Action::PointerDown(index) => {
                if let Some(id) = event.pointer_id(index) {
                    self.samples.remove(&id);
                }
            }
            Action::Move | Action::HoverMove => {}
            _ => return,
        }

        for pos in 0..event.history_size() {
            let Some(time) = event.historical_event_time(pos) else {
                continue;
            };
            for (index, pointer) in event.pointers().iter().enumerate() {
                if let Some(position) = event.historical_point(index, pos) {
                    self.push(pointer.id, Sample { time, position });
                }
            }
        }
        for pointer in event.pointers() {
            self.push(
                pointer.id,
                Sample {
                    time: event.event_time(),
                    position: pointer.position,
                },
            );
        }
    }

    fn push(&mut self, id: PointerId, sample: Sample) {
        let samples = self.samples.entry(id).or_default();
        if let Some(last) = samples.back()
            && sample.time - last.time > ASSUME_POINTER_STOPPED_MILLIS
        {
            samples.clear();
        }
        if samples.len() == HISTORY_SIZE {
            samples.pop_front();
        }
        samples.push_back(sample);
    }

    /// Computes velocities for every tracked pointer.
    ///
    /// `units` is the number of milliseconds per velocity unit: `1000.0` yields pixels per
    /// second. Each component is clamped to `±max_velocity`.
    pub fn compute_current_velocity(&mut self, units: f64, max_velocity: f64) {
        self.velocities.clear();
        for (id, samples) in &self.samples {
            let v = estimate(samples) * units;
            let v = Vec2::new(
                v.x.clamp(-max_velocity, max_velocity),
                v.y.clamp(-max_velocity, max_velocity),
            );
            self.velocities.insert(*id, v);
        }
    }

    /// Last computed velocity of pointer `id`, if it was tracked.
    pub fn velocity(&self, id: PointerId) -> Option<Vec2> {
        self.velocities.get(&id).copied()
    }

    /// Last computed X velocity of pointer `id`, or `0.0`.
    pub fn x_velocity(&self, id: PointerId) -> f64 {
        self.velocity(id).map_or(0.0, |v| v.x)
    }

    /// Last computed Y velocity of pointer `id`, or `0.0`.
    pub fn y_velocity(&self, id: PointerId) -> f64 {
        self.velocity(id).map_or(0.0, |v| v.y)
    }
}

/// Least-squares slope of position over time, in pixels per millisecond.
fn estimate(samples: &VecDeque<Sample>) -> Vec2 {
    let Some(newest) = samples.back() else {
        return Vec2::ZERO;
    };
    let window: Vec<Sample> = samples
        .iter()
        .filter(|s| newest.time - s.time <= HORIZON_MILLIS)
        .copied()
        .collect();
    if window.len() < 2 {
        return Vec2::ZERO;
    }

    let n = window.len() as f64;
    let mean_t = window.iter().map(|s| (s.time - newest.time) as f64).sum::<f64>() / n;
    let mean_x = window.iter().map(|s| s.position.x).sum::<f64>() / n;
    let mean_y = window.iter().map(|s| s.position.y).sum::<f64>() / n;

    let mut stt = 0.0;
    let mut stx = 0.0;
    let mut sty = 0.0;
    for s in &window {
        let dt = (s.time - newest.time) as f64 - mean_t;
        stt += dt * dt;
        stx += dt * (s.position.x - mean_x);
        sty += dt * (s.position.y - mean_y);
    }
    if stt == 0.0 {
        return Vec2::ZERO;
    }
    Vec2::new(stx / stt, sty / stt)
}
