// Copyright 2025 the Kinetic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scroll animation that may travel past its bounds and bounce back.
//!
//! Each axis runs its own [`SplineOverScroller`] state machine:
//!
//! - [`AxisState::Spline`]: a fling decelerating along the spline.
//! - [`AxisState::Ballistic`]: constant deceleration past an edge until the velocity is zero.
//! - [`AxisState::Cubic`]: an ease-in-out return to the edge.
//!
//! A fling that reaches a bound before its spline completes continues ballistically into the
//! over-scroll area, then springs back. A fling that starts outside the bounds either bounces,
//! flings back inside, or springs back directly.

use crate::clock::{AnimationClock, MonotonicClock};
use crate::config::ScrollConfig;
use crate::interpolator::{Interpolator, ViscousFluid};
use crate::spline::{FlingModel, ensure_spline_tables_initialized, offset_px, signum, span, spline_tables};

/// Deceleration magnitude of the ballistic phase, in pixels/s².
const GRAVITY: f64 = 2000.0;

/// Phase of a [`SplineOverScroller`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AxisState {
    /// Spline fling (also used, trivially, by fixed-duration scrolls).
    Spline,
    /// Constant deceleration into the over-scroll area.
    Ballistic,
    /// Cubic spring-back toward an edge.
    Cubic,
}

/// Single-axis state machine behind [`OverScroller`].
///
/// All time-dependent operations take the current animation time explicitly.
#[derive(Clone, Debug)]
pub struct SplineOverScroller {
    start: i32,
    current_position: i32,
    final_position: i32,

    /// Initial velocity of the current phase.
    velocity: f64,
    curr_velocity: f64,
    /// Constant deceleration of the ballistic and cubic phases.
    deceleration: f64,

    start_time: i64,
    duration: i64,
    spline_duration: i64,
    spline_distance: i32,

    finished: bool,
    /// Maximum distance allowed past a bound.
    over: i32,
    state: AxisState,

    model: FlingModel,
}

fn deceleration_for(velocity: f64) -> f64 {
    if velocity > 0.0 { -GRAVITY } else { GRAVITY }
}

impl SplineOverScroller {
    /// Creates a finished axis at position 0.
    pub fn new(config: &ScrollConfig) -> Self {
        Self {
            start: 0,
            current_position: 0,
            final_position: 0,
            velocity: 0.0,
            curr_velocity: 0.0,
            deceleration: 0.0,
            start_time: 0,
            duration: 0,
            spline_duration: 0,
            spline_distance: 0,
            finished: true,
            over: 0,
            state: AxisState::Spline,
            model: FlingModel::new(config.friction, config.density),
        }
    }

    /// Current position.
    pub const fn current_position(&self) -> i32 {
        self.current_position
    }

    /// Start position of the current phase.
    pub const fn start(&self) -> i32 {
        self.start
    }

    /// Final position of the current phase.
    pub const fn final_position(&self) -> i32 {
        self.final_position
    }

    /// Current velocity in pixels per second.
    pub const fn curr_velocity(&self) -> f64 {
        self.curr_velocity
    }

    /// Duration of the current phase in milliseconds.
    pub const fn duration(&self) -> i64 {
        self.duration
    }

    /// Start time of the current phase.
    pub const fn start_time(&self) -> i64 {
        self.start_time
    }

    /// Whether this axis is at rest.
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Current phase.
    pub const fn state(&self) -> AxisState {
        self.state
    }

    /// Sets the spline fling friction.
    pub fn set_friction(&mut self, friction: f64) {
        self.model.friction = friction;
    }

    /// Interpolates between start and final by `q`.
    pub fn update_scroll(&mut self, q: f64) {
        self.current_position = offset_px(self.start, q * span(self.start, self.final_position));
    }

    /// Rescales a clamped fling's duration by the spline time needed for the shorter distance.
    fn adjust_duration(&mut self, start: i32, old_final: i32, new_final: i32) {
        let old_distance = span(start, old_final);
        let new_distance = span(start, new_final);
        let x = (new_distance / old_distance).abs();
        if let Some(time_coef) = spline_tables().sample_time(x) {
            #[allow(
                clippy::cast_possible_truncation,
                reason = "durations are truncated to whole milliseconds"
            )]
            let duration = (self.duration as f64 * time_coef) as i64;
            self.duration = duration;
        }
    }

    /// Starts a fixed-duration scroll of `distance` from `start`.
    pub fn start_scroll(&mut self, start: i32, distance: i32, duration: i64, now: i64) {
        self.finished = false;
        self.start = start;
        self.current_position = start;
        self.final_position = start.saturating_add(distance);
        self.start_time = now;
        self.duration = duration;
        self.deceleration = 0.0;
        self.velocity = 0.0;
    }

    /// Stops the axis at its final position.
    pub fn finish(&mut self) {
        self.current_position = self.final_position;
        // Not resetting the velocity lets a following fling pick it up for the flywheel.
        self.finished = true;
    }

    /// Moves the final position of a running animation.
    pub fn set_final_position(&mut self, position: i32) {
        self.final_position = position;
        self.spline_distance = self.final_position - self.start;
        self.finished = false;
    }

    /// Extends the current phase so it ends `extend` milliseconds after `now`.
    pub fn extend_duration(&mut self, extend: i64, now: i64) {
        let elapsed = now - self.start_time;
        self.duration = elapsed + extend;
        self.finished = false;
    }

    /// Starts a spring-back if `start` lies outside `[min, max]`.
    ///
    /// Returns `true` when an animation was started.
    pub fn springback(&mut self, start: i32, min: i32, max: i32, now: i64) -> bool {
        self.finished = true;
        self.start = start;
        self.current_position = start;
        self.final_position = start;
        self.velocity = 0.0;
        self.start_time = now;
        self.duration = 0;

        if start < min {
            self.start_spring_back(start, min);
        } else if start > max {
            self.start_spring_back(start, max);
        }
        !self.finished
    }

    fn start_spring_back(&mut self, start: i32, end: i32) {
        self.finished = false;
        self.state = AxisState::Cubic;
        self.start = start;
        self.current_position = start;
        self.final_position = end;
        let delta = f64::from(start - end);
        self.deceleration = deceleration_for(delta);
        // Only the sign of the velocity matters for the cubic curve.
        self.velocity = -delta;
        self.over = (start - end).abs();
        #[allow(
            clippy::cast_possible_truncation,
            reason = "durations are truncated to whole milliseconds"
        )]
        let duration = (1000.0 * (-2.0 * delta / self.deceleration).sqrt()) as i64;
        self.duration = duration;
    }

    /// Starts a fling from `start` with `velocity`, limited to `[min, max]` plus `over` pixels of
    /// over-scroll.
    pub fn fling(&mut self, start: i32, velocity: f64, min: i32, max: i32, over: i32, now: i64) {
        self.over = over;
        self.finished = false;
        self.velocity = velocity;
        self.curr_velocity = velocity;
        self.duration = 0;
        self.spline_duration = 0;
        self.start_time = now;
        self.start = start;
        self.current_position = start;

        if start > max || start < min {
            self.start_after_edge(start, min, max, velocity, now);
            return;
        }

        self.state = AxisState::Spline;
        let mut total_distance = 0.0;
        if velocity != 0.0 {
            self.spline_duration = self.model.fling_duration(velocity);
            self.duration = self.spline_duration;
            total_distance = self.model.fling_distance(velocity);
        }

        #[allow(
            clippy::cast_possible_truncation,
            reason = "the spline distance is truncated to whole pixels"
        )]
        let spline_distance = (total_distance * signum(velocity)) as i32;
        self.spline_distance = spline_distance;
        self.final_position = start.saturating_add(spline_distance);

        if self.final_position < min {
            self.adjust_duration(self.start, self.final_position, min);
            self.final_position = min;
        }
        if self.final_position > max {
            self.adjust_duration(self.start, self.final_position, max);
            self.final_position = max;
        }
    }

    /// Places the animation on a ballistic curve that passes `end` with `velocity`.
    fn fit_on_bounce_curve(&mut self, start: i32, end: i32, velocity: f64) {
        // Simulate a bounce that started from the edge.
        let duration_to_apex = -velocity / self.deceleration;
        let distance_to_apex = velocity * velocity / 2.0 / self.deceleration.abs();
        let distance_to_edge = f64::from((end - start).abs());
        let total_duration =
            (2.0 * (distance_to_apex + distance_to_edge) / self.deceleration.abs()).sqrt();
        #[allow(
            clippy::cast_possible_truncation,
            reason = "times are truncated to whole milliseconds"
        )]
        let rewind = (1000.0 * (total_duration - duration_to_apex)) as i64;
        self.start_time -= rewind;
        self.start = end;
        self.current_position = end;
        self.velocity = (-self.deceleration * total_duration).trunc();
    }

    fn start_bounce_after_edge(&mut self, start: i32, end: i32, velocity: f64) {
        self.deceleration = deceleration_for(if velocity == 0.0 {
            f64::from(start - end)
        } else {
            velocity
        });
        self.fit_on_bounce_curve(start, end, velocity);
        self.on_edge_reached();
    }

    fn start_after_edge(&mut self, start: i32, min: i32, max: i32, velocity: f64, now: i64) {
        if start > min && start < max {
            tracing::error!(start, min, max, "start_after_edge called from a valid position");
            self.finished = true;
            return;
        }
        let positive = start > max;
        let edge = if positive { max } else { min };
        let over_distance = start - edge;
        let keep_increasing = f64::from(over_distance) * velocity >= 0.0;
        if keep_increasing {
            // Will result in a bounce or a to_boundary depending on velocity.
            self.start_bounce_after_edge(start, edge, velocity);
        } else {
            let total_distance = self.model.fling_distance(velocity);
            if total_distance > f64::from(over_distance.abs()) {
                let (min, max) = if positive { (min, start) } else { (start, max) };
                self.fling(start, velocity, min, max, self.over, now);
            } else {
                self.start_spring_back(start, edge);
            }
        }
    }

    /// Switches a running spline fling into the edge behavior because the content reached an
    /// edge at `start` whose resting position is `end`.
    pub fn notify_edge_reached(&mut self, start: i32, end: i32, over: i32, now: i64) {
        // The fling may already be in a ballistic or cubic phase.
        if self.state == AxisState::Spline {
            self.over = over;
            self.start_time = now;
            // Edge reached from the inside: end is both bounds.
            self.start_after_edge(start, end, end, self.curr_velocity.trunc(), now);
        }
    }

    fn on_edge_reached(&mut self) {
        // `start` is the edge; `velocity` the velocity crossing it.
        let velocity_squared = self.velocity * self.velocity;
        let mut distance = velocity_squared / (2.0 * self.deceleration.abs());
        let sign = signum(self.velocity);

        if distance > f64::from(self.over) {
            // Default deceleration is not sufficient to slow us down before the boundary.
            self.deceleration = -sign * velocity_squared / (2.0 * f64::from(self.over));
            distance = f64::from(self.over);
        }

        #[allow(
            clippy::cast_possible_truncation,
            reason = "over-scroll distances and durations are truncated to whole units"
        )]
        {
            self.over = distance as i32;
            self.state = AxisState::Ballistic;
            self.final_position =
                self.start + (if self.velocity > 0.0 { distance } else { -distance }) as i32;
            self.duration = -((1000.0 * self.velocity / self.deceleration) as i64);
        }
    }

    /// Moves to the next phase once the current one has run out.
    ///
    /// Returns `false` when the axis has nothing left to animate.
    pub fn continue_when_finished(&mut self, now: i64) -> bool {
        match self.state {
            AxisState::Spline => {
                // Duration from start to the clamped edge.
                if self.duration < self.spline_duration {
                    // Enter the over-scroll area.
                    self.start = self.final_position;
                    self.current_position = self.final_position;
                    self.velocity = self.curr_velocity.trunc();
                    self.deceleration = deceleration_for(self.velocity);
                    self.start_time += self.duration;
                    self.on_edge_reached();
                } else {
                    // Normal stop, no need to continue.
                    return false;
                }
            }
            AxisState::Ballistic => {
                self.start_time += self.duration;
                self.start_spring_back(self.final_position, self.start);
            }
            AxisState::Cubic => return false,
        }
        self.update(now);
        true
    }

    /// Updates the current position and velocity for time `now`.
    ///
    /// Returns `false` once the current phase has run out.
    pub fn update(&mut self, now: i64) -> bool {
        let current_time = now - self.start_time;
        if current_time == 0 {
            // Nothing elapsed; a zero-duration phase is already over.
            return self.duration > 0;
        }
        if current_time > self.duration {
            return false;
        }

        let elapsed = current_time as f64;
        let distance = match self.state {
            AxisState::Spline => {
                let spline_duration = self.spline_duration as f64;
                let spline_distance = f64::from(self.spline_distance);
                let (distance_coef, velocity_coef) =
                    spline_tables().sample_position(elapsed / spline_duration);
                self.curr_velocity = velocity_coef * spline_distance / spline_duration * 1000.0;
                distance_coef * spline_distance
            }
            AxisState::Ballistic => {
                let t = elapsed / 1000.0;
                self.curr_velocity = self.velocity + self.deceleration * t;
                self.velocity * t + self.deceleration * t * t / 2.0
            }
            AxisState::Cubic => {
                let t = elapsed / self.duration as f64;
                let t2 = t * t;
                let sign = signum(self.velocity);
                let over = f64::from(self.over);
                self.curr_velocity = sign * over * 6.0 * (-t + t2);
                sign * over * (3.0 * t2 - 2.0 * t * t2)
            }
        };

        self.current_position = offset_px(self.start, distance);
        true
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Mode {
    Scroll,
    Fling,
}

/// Two-axis scroller with over-scroll and spring-back.
///
/// ## Example
///
/// ```rust
/// use kinetic_scroller::{ManualClock, OverScroller, ScrollConfig};
///
/// let clock = ManualClock::new(0);
/// let mut scroller = OverScroller::with_clock(ScrollConfig::default(), clock.clone());
///
/// // Content was dragged 60 px past its top edge.
/// assert!(scroller.spring_back(0, -60, 0, 0, 0, 1000));
/// let mut last = scroller.curr_y();
/// while scroller.compute_scroll_offset() {
///     assert!(scroller.curr_y() >= last && scroller.curr_y() <= 0);
///     last = scroller.curr_y();
///     clock.advance(16);
/// }
/// assert_eq!(scroller.curr_y(), 0);
/// ```
#[derive(Debug)]
pub struct OverScroller<C: AnimationClock = MonotonicClock> {
    mode: Mode,
    scroller_x: SplineOverScroller,
    scroller_y: SplineOverScroller,
    interpolator: Box<dyn Interpolator>,
    flywheel: bool,
    default_duration: i64,
    clock: C,
}

impl OverScroller {
    /// Creates an over-scroller driven by the wall clock.
    pub fn new(config: ScrollConfig) -> Self {
        Self::with_clock(config, MonotonicClock::new())
    }
}

impl<C: AnimationClock> OverScroller<C> {
    /// Creates an over-scroller reading time from `clock`.
    pub fn with_clock(config: ScrollConfig, clock: C) -> Self {
        ensure_spline_tables_initialized();
        Self {
            mode: Mode::Scroll,
            scroller_x: SplineOverScroller::new(&config),
            scroller_y: SplineOverScroller::new(&config),
            interpolator: Box::new(ViscousFluid::new()),
            flywheel: config.flywheel,
            default_duration: config.default_duration,
            clock,
        }
    }

    /// Replaces the curve used by [`start_scroll`](Self::start_scroll).
    pub fn set_interpolator(&mut self, interpolator: Box<dyn Interpolator>) {
        self.interpolator = interpolator;
    }

    /// Sets the spline fling friction on both axes.
    pub fn set_friction(&mut self, friction: f64) {
        self.scroller_x.set_friction(friction);
        self.scroller_y.set_friction(friction);
    }

    /// Horizontal axis.
    pub const fn axis_x(&self) -> &SplineOverScroller {
        &self.scroller_x
    }

    /// Vertical axis.
    pub const fn axis_y(&self) -> &SplineOverScroller {
        &self.scroller_y
    }

    /// Returns whether both axes are at rest.
    pub const fn is_finished(&self) -> bool {
        self.scroller_x.finished && self.scroller_y.finished
    }

    /// Forces the finished flag of both axes.
    pub fn force_finished(&mut self, finished: bool) {
        self.scroller_x.finished = finished;
        self.scroller_y.finished = finished;
    }

    /// Current X offset.
    pub const fn curr_x(&self) -> i32 {
        self.scroller_x.current_position
    }

    /// Current Y offset.
    pub const fn curr_y(&self) -> i32 {
        self.scroller_y.current_position
    }

    /// Current velocity magnitude in pixels per second.
    pub fn curr_velocity(&self) -> f64 {
        self.scroller_x
            .curr_velocity
            .hypot(self.scroller_y.curr_velocity)
    }

    /// Start X offset.
    pub const fn start_x(&self) -> i32 {
        self.scroller_x.start
    }

    /// Start Y offset.
    pub const fn start_y(&self) -> i32 {
        self.scroller_y.start
    }

    /// Final X offset of the current phase.
    pub const fn final_x(&self) -> i32 {
        self.scroller_x.final_position
    }

    /// Final Y offset of the current phase.
    pub const fn final_y(&self) -> i32 {
        self.scroller_y.final_position
    }

    /// Advances both axes to the current time.
    ///
    /// Returns `true` while the animation is not yet finished.
    pub fn compute_scroll_offset(&mut self) -> bool {
        if self.is_finished() {
            return false;
        }

        let now = self.clock.now_millis();
        match self.mode {
            Mode::Scroll => {
                // Any scroller can be used for time, since they were started together.
                let elapsed = now - self.scroller_x.start_time;
                let duration = self.scroller_x.duration;
                if elapsed < duration {
                    let q = self
                        .interpolator
                        .interpolation(elapsed as f64 / duration as f64);
                    self.scroller_x.update_scroll(q);
                    self.scroller_y.update_scroll(q);
                } else {
                    self.abort_animation();
                }
            }
            Mode::Fling => {
                for axis in [&mut self.scroller_x, &mut self.scroller_y] {
                    if !axis.finished && !axis.update(now) && !axis.continue_when_finished(now) {
                        axis.finish();
                    }
                }
            }
        }
        true
    }

    /// Starts a fixed-duration scroll using the configured default duration.
    pub fn start_scroll(&mut self, start_x: i32, start_y: i32, dx: i32, dy: i32) {
        self.start_scroll_with_duration(start_x, start_y, dx, dy, self.default_duration);
    }

    /// Starts a scroll of `(dx, dy)` lasting `duration` milliseconds. `duration` must be positive.
    pub fn start_scroll_with_duration(
        &mut self,
        start_x: i32,
        start_y: i32,
        dx: i32,
        dy: i32,
        duration: i64,
    ) {
        debug_assert!(duration > 0, "scroll duration must be positive");
        let now = self.clock.now_millis();
        self.mode = Mode::Scroll;
        self.scroller_x.start_scroll(start_x, dx, duration, now);
        self.scroller_y.start_scroll(start_y, dy, duration, now);
    }

    /// Springs back into `[min_x, max_x] × [min_y, max_y]` from `(start_x, start_y)`.
    ///
    /// Returns `true` if either axis was out of bounds and started animating.
    pub fn spring_back(
        &mut self,
        start_x: i32,
        start_y: i32,
        min_x: i32,
        max_x: i32,
        min_y: i32,
        max_y: i32,
    ) -> bool {
        let now = self.clock.now_millis();
        self.mode = Mode::Fling;
        // Both axes must be reset, so no short-circuit.
        let spring_x = self.scroller_x.springback(start_x, min_x, max_x, now);
        let spring_y = self.scroller_y.springback(start_y, min_y, max_y, now);
        spring_x || spring_y
    }

    /// Starts a fling without over-scroll.
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
        self.fling_with_overscroll(
            start_x, start_y, velocity_x, velocity_y, min_x, max_x, min_y, max_y, 0, 0,
        );
    }

    /// Starts a fling that may travel `over_x`/`over_y` pixels past the bounds before springing
    /// back.
    pub fn fling_with_overscroll(
        &mut self,
        start_x: i32,
        start_y: i32,
        velocity_x: f64,
        velocity_y: f64,
        min_x: i32,
        max_x: i32,
        min_y: i32,
        max_y: i32,
        over_x: i32,
        over_y: i32,
    ) {
        let mut velocity_x = velocity_x;
        let mut velocity_y = velocity_y;
        // Continue a scroll or fling in progress.
        if self.flywheel && !self.is_finished() {
            let old_velocity_x = self.scroller_x.curr_velocity;
            let old_velocity_y = self.scroller_y.curr_velocity;
            if signum(velocity_x) == signum(old_velocity_x)
                && signum(velocity_y) == signum(old_velocity_y)
            {
                velocity_x += old_velocity_x;
                velocity_y += old_velocity_y;
            }
        }

        let now = self.clock.now_millis();
        self.mode = Mode::Fling;
        self.scroller_x
            .fling(start_x, velocity_x, min_x, max_x, over_x, now);
        self.scroller_y
            .fling(start_y, velocity_y, min_y, max_y, over_y, now);
        tracing::trace!(
            velocity_x,
            velocity_y,
            final_x = self.scroller_x.final_position,
            final_y = self.scroller_y.final_position,
            "over-scroller fling"
        );
    }

    /// Notifies that a horizontal fling reached the edge `final_x` while at `start_x`, with up
    /// to `over_x` pixels of over-scroll.
    pub fn notify_horizontal_edge_reached(&mut self, start_x: i32, final_x: i32, over_x: i32) {
        let now = self.clock.now_millis();
        self.scroller_x
            .notify_edge_reached(start_x, final_x, over_x, now);
    }

    /// Notifies that a vertical fling reached the edge `final_y` while at `start_y`, with up to
    /// `over_y` pixels of over-scroll.
    pub fn notify_vertical_edge_reached(&mut self, start_y: i32, final_y: i32, over_y: i32) {
        let now = self.clock.now_millis();
        self.scroller_y
            .notify_edge_reached(start_y, final_y, over_y, now);
    }

    /// Returns whether the current animation is in an over-scroll or spring-back phase.
    pub fn is_over_scrolled(&self) -> bool {
        (!self.scroller_x.finished && self.scroller_x.state != AxisState::Spline)
            || (!self.scroller_y.finished && self.scroller_y.state != AxisState::Spline)
    }

    /// Stops both axes at their final positions.
    pub fn abort_animation(&mut self) {
        self.scroller_x.finish();
        self.scroller_y.finish();
    }

    /// Milliseconds since the earlier of the two axes started.
    pub fn time_passed(&self) -> i64 {
        let start = self.scroller_x.start_time.min(self.scroller_y.start_time);
        self.clock.now_millis() - start
    }

    /// Returns whether a running animation moves in the direction of the given velocity.
    pub fn is_scrolling_in_direction(&self, x_velocity: f64, y_velocity: f64) -> bool {
        let dx = f64::from(self.scroller_x.final_position - self.scroller_x.start);
        let dy = f64::from(self.scroller_y.final_position - self.scroller_y.start);
        !self.is_finished() && signum(x_velocity) == signum(dx) && signum(y_velocity) == signum(dy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::interpolator::Linear;
    use proptest::prelude::*;

    fn manual() -> (ManualClock, OverScroller<ManualClock>) {
        let clock = ManualClock::new(10_000);
        let scroller = OverScroller::with_clock(ScrollConfig::default(), clock.clone());
        (clock, scroller)
    }

    /// Polls at 60 fps until finished, returning every observed Y.
    fn run_y(clock: &ManualClock, scroller: &mut OverScroller<ManualClock>) -> Vec<i32> {
        let mut ys = vec![scroller.curr_y()];
        let mut frames = 0;
        while scroller.compute_scroll_offset() {
            ys.push(scroller.curr_y());
            clock.advance(16);
            frames += 1;
            assert!(frames < 2_000, "animation never finished");
        }
        ys
    }

    #[test]
    fn spring_back_converges_without_overshoot() {
        let (clock, mut scroller) = manual();
        assert!(scroller.spring_back(0, 1150, 0, 0, 0, 1000));
        assert!(scroller.is_over_scrolled());
        let ys = run_y(&clock, &mut scroller);
        for w in ys.windows(2) {
            assert!(w[1] <= w[0], "spring-back must move toward the edge: {w:?}");
        }
        assert!(ys.iter().all(|y| *y >= 1000), "no overshoot past the edge");
        assert_eq!(scroller.curr_y(), 1000);
        assert!(scroller.is_finished());
    }

    #[test]
    fn spring_back_from_just_before_the_start() {
        let (clock, mut scroller) = manual();
        assert!(scroller.spring_back(-50, 0, 0, 1000, 0, 0));
        assert!(!scroller.is_finished());
        let mut xs = vec![scroller.curr_x()];
        let mut frames = 0;
        while scroller.compute_scroll_offset() {
            xs.push(scroller.curr_x());
            clock.advance(16);
            frames += 1;
            assert!(frames < 2_000, "spring-back never finished");
        }
        for w in xs.windows(2) {
            assert!(w[1] >= w[0], "spring-back must move toward the edge: {w:?}");
        }
        assert!(xs.iter().all(|x| *x <= 0), "no overshoot past the edge");
        assert_eq!(scroller.curr_x(), 0);
        assert!(!scroller.compute_scroll_offset());
        assert!(!scroller.compute_scroll_offset());
    }

    #[test]
    fn huge_fling_from_mid_content_is_clamped() {
        let (_clock, mut scroller) = manual();
        scroller.fling(0, 500, 0.0, 1.0e8, 0, 0, 0, 1000);
        assert_eq!(scroller.final_y(), 1000);
        scroller.abort_animation();
        scroller.fling(0, 500, 0.0, -1.0e8, 0, 0, 0, 1000);
        assert_eq!(scroller.final_y(), 0);
    }

    proptest! {
        #[test]
        fn huge_fling_finals_stay_in_bounds(
            min in -10_000_i32..10_000,
            len in 0_i32..20_000,
            at in 0.0_f64..=1.0,
            vx in -1.0e12_f64..1.0e12,
            vy in -1.0e12_f64..1.0e12,
        ) {
            let (_clock, mut scroller) = manual();
            let max = min + len;
            #[allow(clippy::cast_possible_truncation, reason = "test positions are small")]
            let start = min + (f64::from(len) * at) as i32;
            scroller.fling(start, start, vx, vy, min, max, min, max);
            prop_assert!((min..=max).contains(&scroller.final_x()));
            prop_assert!((min..=max).contains(&scroller.final_y()));
            scroller.abort_animation();
            prop_assert!((min..=max).contains(&scroller.curr_x()));
            prop_assert!((min..=max).contains(&scroller.curr_y()));
        }
    }

    #[test]
    fn spring_back_inside_bounds_is_noop() {
        let (_clock, mut scroller) = manual();
        assert!(!scroller.spring_back(5, 500, 0, 10, 0, 1000));
        assert!(scroller.is_finished());
        assert_eq!((scroller.curr_x(), scroller.curr_y()), (5, 500));
    }

    #[test]
    fn fling_inside_bounds_matches_spline() {
        let (clock, mut scroller) = manual();
        scroller.fling(0, 200, 0.0, 3000.0, 0, 0, 0, 10_000);
        assert_eq!(scroller.final_y(), 200 + 1308);
        let ys = run_y(&clock, &mut scroller);
        assert!(ys.windows(2).all(|w| w[1] >= w[0]), "fling is monotone");
        assert_eq!(scroller.curr_y(), 1508);
    }

    #[test]
    fn clamped_fling_is_shortened() {
        let (_clock, mut scroller) = manual();
        scroller.fling(0, 0, 0.0, 3000.0, 0, 0, 0, 400);
        assert_eq!(scroller.final_y(), 400);
        let full = FlingModel::new(ScrollConfig::DEFAULT_FRICTION, 1.0).fling_duration(3000.0);
        assert!(scroller.axis_y().duration() < full, "clamped flings end sooner");
    }

    #[test]
    fn fling_into_edge_bounces_back() {
        let (clock, mut scroller) = manual();
        scroller.fling_with_overscroll(0, 0, 0.0, 3000.0, 0, 0, 0, 400, 0, 80);
        let ys = run_y(&clock, &mut scroller);
        let peak = *ys.iter().max().unwrap();
        assert!(peak > 400, "fling travels into the over-scroll area");
        assert!(peak <= 480, "no further than the over distance, got {peak}");
        assert_eq!(scroller.curr_y(), 400, "settles on the edge");
    }

    #[test]
    fn fling_from_outside_toward_inside_returns() {
        let (clock, mut scroller) = manual();
        // 50 px past the top, flung downward (toward the content).
        scroller.fling_with_overscroll(0, -50, 0.0, 2000.0, 0, 0, 0, 1000, 0, 100);
        run_y(&clock, &mut scroller);
        assert!((0..=1000).contains(&scroller.curr_y()));
    }

    #[test]
    fn fling_from_outside_away_from_inside_bounces() {
        let (clock, mut scroller) = manual();
        scroller.fling_with_overscroll(0, 1050, 0.0, 1500.0, 0, 0, 0, 1000, 0, 100);
        assert!(scroller.is_over_scrolled());
        let ys = run_y(&clock, &mut scroller);
        assert!(ys.iter().all(|y| *y <= 1150), "bounded by the over distance");
        assert_eq!(scroller.curr_y(), 1000);
    }

    #[test]
    fn notify_edge_reached_switches_to_ballistic() {
        let (clock, mut scroller) = manual();
        scroller.fling(0, 0, 0.0, 4000.0, 0, 0, 0, 100_000);
        clock.advance(48);
        scroller.compute_scroll_offset();
        let y = scroller.curr_y();
        scroller.notify_vertical_edge_reached(y, y, 40);
        assert_eq!(scroller.axis_y().state(), AxisState::Ballistic);
        assert!(scroller.is_over_scrolled());
        let ys = run_y(&clock, &mut scroller);
        assert!(ys.iter().all(|v| *v <= y + 40));
        assert_eq!(scroller.curr_y(), y);
    }

    #[test]
    fn scroll_mode_uses_interpolator() {
        let (clock, mut scroller) = manual();
        scroller.set_interpolator(Box::new(Linear));
        scroller.start_scroll_with_duration(0, 0, 100, -100, 400);
        clock.advance(100);
        assert!(scroller.compute_scroll_offset());
        assert_eq!((scroller.curr_x(), scroller.curr_y()), (25, -25));
        clock.advance(300);
        assert!(scroller.compute_scroll_offset());
        assert!(scroller.is_finished());
        assert_eq!((scroller.curr_x(), scroller.curr_y()), (100, -100));
        assert!(!scroller.compute_scroll_offset());
    }

    #[test]
    fn flywheel_uses_axis_velocity() {
        let (clock, mut scroller) = manual();
        scroller.fling(0, 0, 0.0, 2000.0, 0, 0, 0, 100_000);
        clock.advance(32);
        scroller.compute_scroll_offset();
        let y = scroller.curr_y();
        scroller.fling(0, y, 0.0, 2000.0, 0, 0, 0, 100_000);
        let single = FlingModel::new(ScrollConfig::DEFAULT_FRICTION, 1.0).fling_distance(2000.0);
        assert!(f64::from(scroller.final_y() - y) > single);
    }

    #[test]
    fn time_passed_and_direction() {
        let (clock, mut scroller) = manual();
        scroller.fling(0, 0, -1000.0, 0.0, -10_000, 0, 0, 0);
        clock.advance(30);
        assert_eq!(scroller.time_passed(), 30);
        assert!(scroller.is_scrolling_in_direction(-1.0, 0.0));
        assert!(!scroller.is_scrolling_in_direction(1.0, 0.0));
        assert!(scroller.curr_velocity() > 0.0);
        scroller.abort_animation();
        assert!(scroller.is_finished());
        assert_eq!(scroller.curr_x(), scroller.final_x());
    }
}
