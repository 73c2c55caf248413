// Copyright 2025 the Kinetic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Precomputed fling spline tables and the logarithmic deceleration model.
//!
//! The fling curve is a cubic Bézier-like spline parameterized by an inflexion point and two
//! tensions. Both scrollers sample it through two tables of `NB_SAMPLES + 1` entries:
//!
//! - `position[i]`: fraction of the fling distance covered after `i / NB_SAMPLES` of its duration.
//! - `time[i]`: fraction of the fling duration elapsed once `i / NB_SAMPLES` of the distance is
//!   covered. Used to shorten a fling that gets clamped at a bound.
//!
//! The tables are built once per process and are read-only afterwards.

use std::sync::LazyLock;

/// Number of intervals the spline is sampled at.
pub const NB_SAMPLES: usize = 100;

const INFLEXION: f64 = 0.35;
const START_TENSION: f64 = 0.5;
const END_TENSION: f64 = 1.0;
const P1: f64 = START_TENSION * INFLEXION;
const P2: f64 = 1.0 - END_TENSION * (1.0 - INFLEXION);

const BISECTION_TOLERANCE: f64 = 1e-5;

/// Standard gravity in m/s².
const GRAVITY_EARTH: f64 = 9.806_65;
/// Inches per meter.
const INCHES_PER_METER: f64 = 39.37;
/// Tuning factor applied to the physical coefficient of a fling.
const PHYSICAL_TUNING: f64 = 0.84;
/// Baseline pixels per inch at density 1.0.
const BASE_PPI: f64 = 160.0;

/// Sampled spline tables shared by all scrollers.
#[derive(Clone, Debug)]
pub struct SplineTables {
    position: [f64; NB_SAMPLES + 1],
    time: [f64; NB_SAMPLES + 1],
}

static SPLINE_TABLES: LazyLock<SplineTables> = LazyLock::new(SplineTables::compute);

/// Forces the one-time computation of the spline tables.
///
/// Every scroller constructor calls this, so callers only need it to move the cost to a
/// convenient moment (for example application startup).
pub fn ensure_spline_tables_initialized() {
    LazyLock::force(&SPLINE_TABLES);
}

/// Returns the process-wide spline tables, computing them on first use.
pub fn spline_tables() -> &'static SplineTables {
    &SPLINE_TABLES
}

impl SplineTables {
    fn compute() -> Self {
        let mut position = [0.0; NB_SAMPLES + 1];
        let mut time = [0.0; NB_SAMPLES + 1];

        // Both searches are monotone in alpha, so the lower bound carries over between samples.
        let mut x_min = 0.0_f64;
        let mut y_min = 0.0_f64;
        for i in 0..NB_SAMPLES {
            let alpha = i as f64 / NB_SAMPLES as f64;

            let mut x_max = 1.0;
            let (x, coef) = loop {
                let x = x_min + (x_max - x_min) / 2.0;
                let coef = 3.0 * x * (1.0 - x);
                let tx = coef * ((1.0 - x) * P1 + x * P2) + x * x * x;
                if (tx - alpha).abs() < BISECTION_TOLERANCE {
                    break (x, coef);
                }
                if tx > alpha {
                    x_max = x;
                } else {
                    x_min = x;
                }
            };
            position[i] = coef * ((1.0 - x) * START_TENSION + x) + x * x * x;

            let mut y_max = 1.0;
            let (y, coef) = loop {
                let y = y_min + (y_max - y_min) / 2.0;
                let coef = 3.0 * y * (1.0 - y);
                let dy = coef * ((1.0 - y) * START_TENSION + y) + y * y * y;
                if (dy - alpha).abs() < BISECTION_TOLERANCE {
                    break (y, coef);
                }
                if dy > alpha {
                    y_max = y;
                } else {
                    y_min = y;
                }
            };
            time[i] = coef * ((1.0 - y) * P1 + y * P2) + y * y * y;
        }
        position[NB_SAMPLES] = 1.0;
        time[NB_SAMPLES] = 1.0;

        tracing::trace!(samples = NB_SAMPLES, "fling spline tables built");
        Self { position, time }
    }

    /// Distance fraction table, indexed by elapsed-time sample.
    pub fn position(&self) -> &[f64; NB_SAMPLES + 1] {
        &self.position
    }

    /// Time fraction table, indexed by covered-distance sample.
    pub fn time(&self) -> &[f64; NB_SAMPLES + 1] {
        &self.time
    }

    /// Samples the position table at `t` in `[0, 1]`.
    ///
    /// Returns `(distance_coef, velocity_coef)`: the fraction of the fling distance covered at
    /// `t` and the slope of the table there. Past the last interval the fling is complete and
    /// the pair is `(1.0, 0.0)`.
    pub fn sample_position(&self, t: f64) -> (f64, f64) {
        let index = sample_index(t);
        if index >= NB_SAMPLES {
            return (1.0, 0.0);
        }
        let (t_inf, t_sup) = interval(index);
        let d_inf = self.position[index];
        let d_sup = self.position[index + 1];
        let velocity_coef = (d_sup - d_inf) / (t_sup - t_inf);
        (d_inf + (t - t_inf) * velocity_coef, velocity_coef)
    }

    /// Samples the time table at distance fraction `x` in `[0, 1]`.
    ///
    /// Returns `None` when `x` lies past the last interval, in which case no rescaling applies.
    pub fn sample_time(&self, x: f64) -> Option<f64> {
        let index = sample_index(x);
        if index >= NB_SAMPLES {
            return None;
        }
        let (x_inf, x_sup) = interval(index);
        let t_inf = self.time[index];
        let t_sup = self.time[index + 1];
        Some(t_inf + (x - x_inf) / (x_sup - x_inf) * (t_sup - t_inf))
    }
}

#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "truncation toward zero selects the sample interval; negative inputs clamp to 0"
)]
fn sample_index(fraction: f64) -> usize {
    (NB_SAMPLES as f64 * fraction).max(0.0) as usize
}

fn interval(index: usize) -> (f64, f64) {
    (
        index as f64 / NB_SAMPLES as f64,
        (index + 1) as f64 / NB_SAMPLES as f64,
    )
}

/// Sign of `v` as `-1.0`, `0.0`, or `1.0`.
///
/// Unlike [`f64::signum`], zero maps to zero, which the direction checks rely on.
pub(crate) fn signum(v: f64) -> f64 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Rounds half-way values toward positive infinity, saturating at the `i32` range.
#[allow(
    clippy::cast_possible_truncation,
    reason = "pixel positions are saturated into i32"
)]
pub(crate) fn round_px(v: f64) -> i32 {
    (v + 0.5).floor() as i32
}

/// `start` moved by `distance` pixels, rounded like [`round_px`] and saturated at the `i32`
/// range instead of overflowing.
pub(crate) fn offset_px(start: i32, distance: f64) -> i32 {
    round_px(f64::from(start) + distance)
}

/// `to - from` without `i32` overflow.
pub(crate) fn span(from: i32, to: i32) -> f64 {
    f64::from(to) - f64::from(from)
}

/// Logarithmic fling model: turns an initial velocity into a duration and a distance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct FlingModel {
    /// Fling friction, dimensionless.
    pub(crate) friction: f64,
    /// `g * inches_per_meter * ppi * tuning`, in pixels/s².
    pub(crate) physical_coeff: f64,
    /// Screen pixels per inch.
    pub(crate) ppi: f64,
}

impl FlingModel {
    /// `ln(0.78) / ln(0.9)`.
    pub(crate) fn deceleration_rate() -> f64 {
        0.78_f64.ln() / 0.9_f64.ln()
    }

    pub(crate) fn new(friction: f64, density: f64) -> Self {
        let ppi = density * BASE_PPI;
        Self {
            friction,
            physical_coeff: GRAVITY_EARTH * INCHES_PER_METER * ppi * PHYSICAL_TUNING,
            ppi,
        }
    }

    /// Constant deceleration in pixels/s² for the given friction at this model's density.
    pub(crate) fn compute_deceleration(&self, friction: f64) -> f64 {
        GRAVITY_EARTH * INCHES_PER_METER * self.ppi * friction
    }

    fn spline_deceleration(&self, velocity: f64) -> f64 {
        (INFLEXION * velocity.abs() / (self.friction * self.physical_coeff)).ln()
    }

    /// Fling duration in milliseconds.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "durations are truncated to whole milliseconds"
    )]
    pub(crate) fn fling_duration(&self, velocity: f64) -> i64 {
        let l = self.spline_deceleration(velocity);
        let rate = Self::deceleration_rate();
        (1000.0 * (l / (rate - 1.0)).exp()) as i64
    }

    /// Fling distance in pixels, unsigned.
    pub(crate) fn fling_distance(&self, velocity: f64) -> f64 {
        let l = self.spline_deceleration(velocity);
        let rate = Self::deceleration_rate();
        self.friction * self.physical_coeff * (rate / (rate - 1.0) * l).exp()
    }
}
