// Copyright 2025 the Kinetic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Two-axis scroll animation without edge effects.

use crate::clock::{AnimationClock, MonotonicClock};
use crate::config::ScrollConfig;
use crate::interpolator::{Interpolator, ViscousFluid};
use crate::spline::{FlingModel, ensure_spline_tables_initialized, offset_px, signum, span, spline_tables};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Scroll,
    Fling,
}

/// Computes scroll positions over time for a fixed-duration scroll or a fling.
///
/// A `Scroller` does not move anything by itself. Owners start an animation, then poll
/// [`compute_scroll_offset`](Self::compute_scroll_offset) once per frame and apply
/// [`curr_x`](Self::curr_x)/[`curr_y`](Self::curr_y) to their content.
///
/// Fling finals are clamped to the bounds independently per axis, so a diagonal fling that
/// hits one bound keeps travelling along the other axis.
///
/// ## Example
///
/// ```rust
/// use kinetic_scroller::{Linear, ManualClock, ScrollConfig, Scroller};
///
/// let clock = ManualClock::new(0);
/// let mut scroller = Scroller::with_clock(ScrollConfig::default(), clock.clone())
///     .with_interpolator(Box::new(Linear));
/// scroller.start_scroll_with_duration(0, 0, 100, 0, 1000);
///
/// clock.set(500);
/// assert!(scroller.compute_scroll_offset());
/// assert_eq!(scroller.curr_x(), 50);
///
/// clock.set(1000);
/// assert!(scroller.compute_scroll_offset());
/// assert!(scroller.is_finished());
/// assert_eq!(scroller.curr_x(), 100);
/// ```
#[derive(Debug)]
pub struct Scroller<C: AnimationClock = MonotonicClock> {
    mode: Mode,

    start_x: i32,
    start_y: i32,
    final_x: i32,
    final_y: i32,

    min_x: i32,
    max_x: i32,
    min_y: i32,
    max_y: i32,

    curr_x: i32,
    curr_y: i32,
    start_time: i64,
    duration: i64,
    duration_reciprocal: f64,
    delta_x: f64,
    delta_y: f64,
    finished: bool,
    interpolator: Box<dyn Interpolator>,
    flywheel: bool,

    velocity: f64,
    curr_velocity: f64,
    distance: i32,

    model: FlingModel,
    deceleration: f64,
    default_duration: i64,

    clock: C,
}

impl Scroller {
    /// Creates a scroller driven by the wall clock.
    pub fn new(config: ScrollConfig) -> Self {
        Self::with_clock(config, MonotonicClock::new())
    }
}

impl<C: AnimationClock> Scroller<C> {
    /// Creates a scroller reading time from `clock`.
    pub fn with_clock(config: ScrollConfig, clock: C) -> Self {
        ensure_spline_tables_initialized();
        let model = FlingModel::new(config.friction, config.density);
        Self {
            mode: Mode::Scroll,
            start_x: 0,
            start_y: 0,
            final_x: 0,
            final_y: 0,
            min_x: 0,
            max_x: 0,
            min_y: 0,
            max_y: 0,
            curr_x: 0,
            curr_y: 0,
            start_time: 0,
            duration: 0,
            duration_reciprocal: 0.0,
            delta_x: 0.0,
            delta_y: 0.0,
            finished: true,
            interpolator: Box::new(ViscousFluid::new()),
            flywheel: config.flywheel,
            velocity: 0.0,
            curr_velocity: 0.0,
            distance: 0,
            deceleration: model.compute_deceleration(config.friction),
            model,
            default_duration: config.default_duration,
            clock,
        }
    }

    /// Replaces the curve used by [`start_scroll`](Self::start_scroll).
    #[must_use]
    pub fn with_interpolator(mut self, interpolator: Box<dyn Interpolator>) -> Self {
        self.interpolator = interpolator;
        self
    }

    /// Sets the friction applied to flings.
    pub fn set_friction(&mut self, friction: f64) {
        self.deceleration = self.model.compute_deceleration(friction);
        self.model.friction = friction;
    }

    /// Returns whether the scroller has finished scrolling.
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Forces the finished flag. Positions are left where they are.
    pub fn force_finished(&mut self, finished: bool) {
        self.finished = finished;
    }

    /// Duration of the current animation in milliseconds.
    pub const fn duration(&self) -> i64 {
        self.duration
    }

    /// Current X offset.
    pub const fn curr_x(&self) -> i32 {
        self.curr_x
    }

    /// Current Y offset.
    pub const fn curr_y(&self) -> i32 {
        self.curr_y
    }

    /// Start X offset.
    pub const fn start_x(&self) -> i32 {
        self.start_x
    }

    /// Start Y offset.
    pub const fn start_y(&self) -> i32 {
        self.start_y
    }

    /// Where the scroll will end. Only valid for flings.
    pub const fn final_x(&self) -> i32 {
        self.final_x
    }

    /// Where the scroll will end. Only valid for flings.
    pub const fn final_y(&self) -> i32 {
        self.final_y
    }

    /// Current velocity in pixels per second.
    ///
    /// During a fling this is the slope of the spline. For a fixed-duration scroll it is
    /// `velocity - deceleration * elapsed / 2000`, a linear approximation kept for
    /// compatibility that does not match the interpolated motion.
    pub fn curr_velocity(&self) -> f64 {
        if self.mode == Mode::Fling {
            return self.curr_velocity;
        }
        let elapsed = self.time_passed() as f64;
        self.velocity - self.deceleration * elapsed / 2000.0
    }

    /// Milliseconds since the current animation started.
    pub fn time_passed(&self) -> i64 {
        self.clock.now_millis() - self.start_time
    }

    /// Advances the animation to the current time.
    ///
    /// Returns `true` while the animation is not yet finished, including the call that
    /// snaps to the final position.
    pub fn compute_scroll_offset(&mut self) -> bool {
        if self.finished {
            return false;
        }

        let time_passed = self.time_passed();
        if time_passed < self.duration {
            let elapsed = time_passed as f64;
            match self.mode {
                Mode::Scroll => {
                    let x = self
                        .interpolator
                        .interpolation(elapsed * self.duration_reciprocal);
                    self.curr_x = offset_px(self.start_x, x * self.delta_x);
                    self.curr_y = offset_px(self.start_y, x * self.delta_y);
                }
                Mode::Fling => {
                    let duration = self.duration as f64;
                    let (distance_coef, velocity_coef) =
                        spline_tables().sample_position(elapsed / duration);
                    self.curr_velocity =
                        velocity_coef * f64::from(self.distance) / duration * 1000.0;

                    let span_x = span(self.start_x, self.final_x);
                    self.curr_x = offset_px(self.start_x, distance_coef * span_x)
                        .clamp(self.min_x, self.max_x);
                    let span_y = span(self.start_y, self.final_y);
                    self.curr_y = offset_px(self.start_y, distance_coef * span_y)
                        .clamp(self.min_y, self.max_y);

                    if self.curr_x == self.final_x && self.curr_y == self.final_y {
                        self.finished = true;
                    }
                }
            }
        } else {
            self.curr_x = self.final_x;
            self.curr_y = self.final_y;
            self.finished = true;
        }
        true
    }

    /// Starts a fixed-duration scroll using the configured default duration.
    pub fn start_scroll(&mut self, start_x: i32, start_y: i32, dx: i32, dy: i32) {
        self.start_scroll_with_duration(start_x, start_y, dx, dy, self.default_duration);
    }

    /// Starts a scroll of `(dx, dy)` from `(start_x, start_y)` lasting `duration` milliseconds.
    ///
    /// `duration` must be positive.
    pub fn start_scroll_with_duration(
        &mut self,
        start_x: i32,
        start_y: i32,
        dx: i32,
        dy: i32,
        duration: i64,
    ) {
        debug_assert!(duration > 0, "scroll duration must be positive");
        self.mode = Mode::Scroll;
        self.finished = false;
        self.duration = duration;
        self.start_time = self.clock.now_millis();
        self.start_x = start_x;
        self.start_y = start_y;
        self.final_x = start_x.saturating_add(dx);
        self.final_y = start_y.saturating_add(dy);
        self.delta_x = f64::from(dx);
        self.delta_y = f64::from(dy);
        let reciprocal = 1.0 / duration as f64;
        self.duration_reciprocal = reciprocal;
    }

    /// Starts a fling from `(start_x, start_y)` with the given velocity in pixels per second.
    ///
    /// The travel distance follows the spline deceleration model; the final position is clamped
    /// into `[min_x, max_x]` and `[min_y, max_y]` independently.
    pub fn fling(
        &mut self,
        start_x: i32,
        start_y: i32,
        velocity_x: f64,
        velocity_y: f64,
        min_x: i32,
        max_x: i32,
        min_y: i32,
        max_y: i32,
    ) {
        let mut velocity_x = velocity_x;
        let mut velocity_y = velocity_y;

        if self.flywheel && !self.finished {
            let old_velocity = self.curr_velocity();
            let dx = f64::from(self.final_x - self.start_x);
            let dy = f64::from(self.final_y - self.start_y);
            let hyp = dx.hypot(dy);
            if hyp > 0.0 {
                let old_velocity_x = dx / hyp * old_velocity;
                let old_velocity_y = dy / hyp * old_velocity;
                if signum(velocity_x) == signum(old_velocity_x)
                    && signum(velocity_y) == signum(old_velocity_y)
                {
                    velocity_x += old_velocity_x;
                    velocity_y += old_velocity_y;
                }
            }
        }

        self.mode = Mode::Fling;
        self.finished = false;

        let velocity = velocity_x.hypot(velocity_y);
        self.velocity = velocity;
        self.duration = self.model.fling_duration(velocity);
        self.start_time = self.clock.now_millis();
        self.start_x = start_x;
        self.start_y = start_y;

        let (coeff_x, coeff_y) = if velocity == 0.0 {
            (1.0, 1.0)
        } else {
            (velocity_x / velocity, velocity_y / velocity)
        };

        let total_distance = self.model.fling_distance(velocity);
        #[allow(
            clippy::cast_possible_truncation,
            reason = "the spline distance is truncated to whole pixels"
        )]
        let distance = (total_distance * signum(velocity)) as i32;
        self.distance = distance;

        self.min_x = min_x;
        self.max_x = max_x.max(min_x);
        self.min_y = min_y;
        self.max_y = max_y.max(min_y);

        // Sum before narrowing so a huge velocity saturates instead of overflowing.
        self.final_x = offset_px(start_x, total_distance * coeff_x).clamp(self.min_x, self.max_x);
        self.final_y = offset_px(start_y, total_distance * coeff_y).clamp(self.min_y, self.max_y);

        tracing::trace!(
            velocity,
            duration = self.duration,
            final_x = self.final_x,
            final_y = self.final_y,
            "scroller fling"
        );
    }

    /// Stops the animation and jumps to the final position.
    pub fn abort_animation(&mut self) {
        self.curr_x = self.final_x;
        self.curr_y = self.final_y;
        self.finished = true;
    }

    /// Extends a scroll so it ends `extend` milliseconds after now.
    pub fn extend_duration(&mut self, extend: i64) {
        let passed = self.time_passed();
        self.duration = passed + extend;
        let reciprocal = 1.0 / self.duration as f64;
        self.duration_reciprocal = reciprocal;
        self.finished = false;
    }

    /// Moves the final X position of a running scroll.
    pub fn set_final_x(&mut self, new_x: i32) {
        self.final_x = new_x;
        self.delta_x = f64::from(self.final_x - self.start_x);
        self.finished = false;
    }

    /// Moves the final Y position of a running scroll.
    pub fn set_final_y(&mut self, new_y: i32) {
        self.final_y = new_y;
        self.delta_y = f64::from(self.final_y - self.start_y);
        self.finished = false;
    }

    /// Returns whether a running animation moves in the direction of the given velocity.
    pub fn is_scrolling_in_direction(&self, x_velocity: f64, y_velocity: f64) -> bool {
        !self.finished
            && signum(x_velocity) == signum(f64::from(self.final_x - self.start_x))
            && signum(y_velocity) == signum(f64::from(self.final_y - self.start_y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::interpolator::Linear;
    use proptest::prelude::*;

    fn manual() -> (ManualClock, Scroller<ManualClock>) {
        let clock = ManualClock::new(1_000);
        let scroller = Scroller::with_clock(ScrollConfig::default(), clock.clone());
        (clock, scroller)
    }

    #[test]
    fn linear_scroll_is_deterministic() {
        let (clock, scroller) = manual();
        let mut scroller = scroller.with_interpolator(Box::new(Linear));
        scroller.start_scroll_with_duration(0, 0, 100, 0, 1000);

        clock.advance(500);
        assert!(scroller.compute_scroll_offset());
        assert_eq!(scroller.curr_x(), 50);
        assert_eq!(scroller.curr_y(), 0);
        assert!(!scroller.is_finished(), "halfway is still running");

        clock.advance(700);
        assert!(scroller.compute_scroll_offset());
        assert_eq!(scroller.curr_x(), 100);
        assert!(scroller.is_finished());
        assert!(!scroller.compute_scroll_offset(), "finished scrollers stay finished");
        assert_eq!(scroller.curr_x(), 100);
    }

    #[test]
    fn default_duration_applies() {
        let (clock, mut scroller) = manual();
        scroller.start_scroll(10, 10, -10, 20);
        assert_eq!(scroller.duration(), 250);
        clock.advance(250);
        assert!(scroller.compute_scroll_offset());
        assert_eq!((scroller.curr_x(), scroller.curr_y()), (0, 30));
    }

    #[test]
    fn fling_reaches_spline_distance() {
        let (clock, mut scroller) = manual();
        scroller.fling(0, 0, 0.0, 3000.0, 0, 0, 0, 10_000);
        assert!((1240..=1252).contains(&scroller.duration()));
        assert!((1306..=1312).contains(&scroller.final_y()), "final was {}", scroller.final_y());
        assert_eq!(scroller.final_x(), 0);

        let mut last = scroller.curr_y();
        while scroller.compute_scroll_offset() {
            assert!(scroller.curr_y() >= last, "fling position must not go back");
            last = scroller.curr_y();
            clock.advance(16);
        }
        assert_eq!(scroller.curr_y(), scroller.final_y());
    }

    #[test]
    fn fling_velocity_decays() {
        let (clock, mut scroller) = manual();
        scroller.fling(0, 0, 2000.0, 0.0, 0, 100_000, 0, 0);
        clock.advance(16);
        scroller.compute_scroll_offset();
        let early = scroller.curr_velocity();
        clock.advance(400);
        scroller.compute_scroll_offset();
        let late = scroller.curr_velocity();
        assert!(early > late && late > 0.0, "velocity {early} -> {late}");
    }

    #[test]
    fn diagonal_fling_clamps_axes_independently() {
        let (_clock, mut scroller) = manual();
        scroller.fling(0, 0, 3000.0, 3000.0, 0, 100, 0, 10_000);
        assert_eq!(scroller.final_x(), 100);
        assert!(scroller.final_y() > 100, "y keeps its own unclamped distance");
    }

    #[test]
    fn flywheel_adds_velocity_in_same_direction() {
        let (clock, mut scroller) = manual();
        scroller.fling(0, 0, 0.0, 2000.0, 0, 0, 0, 100_000);
        let single = scroller.final_y();
        clock.advance(50);
        scroller.compute_scroll_offset();
        let y = scroller.curr_y();
        scroller.fling(0, y, 0.0, 2000.0, 0, 0, 0, 100_000);
        assert!(scroller.final_y() - y > single, "second fling travels further");
    }

    #[test]
    fn opposite_fling_does_not_accumulate() {
        let (clock, mut scroller) = manual();
        scroller.fling(0, 5000, 0.0, 2000.0, 0, 0, 0, 100_000);
        clock.advance(50);
        scroller.compute_scroll_offset();
        let y = scroller.curr_y();
        scroller.fling(0, y, 0.0, -2000.0, 0, 0, 0, 100_000);
        let fresh = {
            let (_c, mut s) = manual();
            s.fling(0, y, 0.0, -2000.0, 0, 0, 0, 100_000);
            s.final_y()
        };
        assert_eq!(scroller.final_y(), fresh);
    }

    #[test]
    fn abort_jumps_to_final() {
        let (_clock, mut scroller) = manual();
        scroller.start_scroll_with_duration(0, 0, 40, 80, 500);
        scroller.abort_animation();
        assert!(scroller.is_finished());
        assert_eq!((scroller.curr_x(), scroller.curr_y()), (40, 80));
    }

    #[test]
    fn extend_and_retarget() {
        let (clock, scroller) = manual();
        let mut scroller = scroller.with_interpolator(Box::new(Linear));
        scroller.start_scroll_with_duration(0, 0, 100, 0, 100);
        clock.advance(50);
        scroller.extend_duration(150);
        assert_eq!(scroller.duration(), 200);
        scroller.set_final_x(200);
        clock.advance(50);
        assert!(scroller.compute_scroll_offset());
        assert_eq!(scroller.curr_x(), 100, "half of the extended 200 px");
    }

    #[test]
    fn direction_check() {
        let (_clock, mut scroller) = manual();
        scroller.start_scroll_with_duration(0, 0, 0, 100, 100);
        assert!(scroller.is_scrolling_in_direction(0.0, 10.0));
        assert!(!scroller.is_scrolling_in_direction(0.0, -10.0));
        assert!(!scroller.is_scrolling_in_direction(5.0, 10.0));
        scroller.abort_animation();
        assert!(!scroller.is_scrolling_in_direction(0.0, 10.0));
    }

    #[test]
    fn scroll_mode_velocity_uses_linear_decay() {
        let (clock, mut scroller) = manual();
        scroller.start_scroll_with_duration(0, 0, 100, 0, 1000);
        clock.advance(100);
        // No initial velocity for a plain scroll, so the approximation goes negative.
        assert!(scroller.curr_velocity() < 0.0);
    }

    proptest! {
        #[test]
        fn fling_finals_stay_in_bounds(
            start_x in -500_i32..500,
            start_y in -500_i32..500,
            vx in -20_000.0_f64..20_000.0,
            vy in -20_000.0_f64..20_000.0,
        ) {
            let (clock, mut scroller) = manual();
            scroller.fling(start_x, start_y, vx, vy, -300, 300, -200, 200);
            prop_assert!((-300..=300).contains(&scroller.final_x()));
            prop_assert!((-200..=200).contains(&scroller.final_y()));
            let mut frames = 0;
            while scroller.compute_scroll_offset() {
                prop_assert!((-300..=300).contains(&scroller.curr_x()));
                prop_assert!((-200..=200).contains(&scroller.curr_y()));
                clock.advance(16);
                frames += 1;
                prop_assert!(frames < 10_000, "fling never finished");
            }
            prop_assert!(scroller.is_finished());
            prop_assert!(!scroller.compute_scroll_offset());
        }

        #[test]
        fn huge_fling_finals_stay_in_bounds(
            min in -10_000_i32..10_000,
            len in 0_i32..20_000,
            at in 0.0_f64..=1.0,
            vx in -1.0e12_f64..1.0e12,
            vy in -1.0e12_f64..1.0e12,
        ) {
            let (clock, mut scroller) = manual();
            let max = min + len;
            #[allow(clippy::cast_possible_truncation, reason = "test positions are small")]
            let start = min + (f64::from(len) * at) as i32;
            scroller.fling(start, start, vx, vy, min, max, min, max);
            prop_assert!((min..=max).contains(&scroller.final_x()));
            prop_assert!((min..=max).contains(&scroller.final_y()));
            clock.advance(16);
            scroller.compute_scroll_offset();
            prop_assert!((min..=max).contains(&scroller.curr_x()));
            prop_assert!((min..=max).contains(&scroller.curr_y()));
        }
    }

    #[test]
    fn huge_fling_from_mid_content_is_clamped() {
        let (_clock, mut scroller) = manual();
        scroller.fling(0, 500, 0.0, 1.0e8, 0, 0, 0, 1000);
        assert_eq!(scroller.final_y(), 1000);
        scroller.fling(0, 500, 0.0, -1.0e8, 0, 0, 0, 1000);
        assert_eq!(scroller.final_y(), 0);
    }
}
