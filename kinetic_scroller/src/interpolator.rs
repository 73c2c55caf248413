// Copyright 2025 the Kinetic Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Easing curves for fixed-duration scroll animations.

use core::fmt::Debug;

/// Maps elapsed-time fraction to progress fraction.
///
/// Implementations should map `0.0` to `0.0` and `1.0` to `1.0`; values in between may leave
/// `[0, 1]` for overshooting curves.
pub trait Interpolator: Debug {
    /// Returns the progress fraction for `input` in `[0, 1]`.
    fn interpolation(&self, input: f64) -> f64;
}

/// Identity curve: constant speed.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Linear;

impl Interpolator for Linear {
    fn interpolation(&self, input: f64) -> f64 {
        input
    }
}

/// Exponential ease-out approximating a viscous fluid.
///
/// This is the default curve of both scrollers for [`start_scroll`](crate::Scroller::start_scroll).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViscousFluid {
    normalize: f64,
    offset: f64,
}

impl ViscousFluid {
    /// Controls the viscous fluid effect (how much of it).
    const SCALE: f64 = 8.0;

    /// Creates the curve, normalized so that `1.0` maps to `1.0`.
    pub fn new() -> Self {
        let normalize = 1.0 / Self::viscous_fluid(1.0);
        Self {
            normalize,
            offset: 1.0 - normalize * Self::viscous_fluid(1.0),
        }
    }

    fn viscous_fluid(x: f64) -> f64 {
        let x = x * Self::SCALE;
        if x < 1.0 {
            x - (1.0 - (-x).exp())
        } else {
            // 1/e == exp(-1)
            let start = 0.367_879_441_17;
            let x = 1.0 - (1.0 - x).exp();
            start + x * (1.0 - start)
        }
    }
}

impl Default for ViscousFluid {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpolator for ViscousFluid {
    fn interpolation(&self, input: f64) -> f64 {
        let interpolated = self.normalize * Self::viscous_fluid(input);
        if interpolated > 0.0 {
            interpolated + self.offset
        } else {
            interpolated
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viscous_fluid_endpoints() {
        let curve = ViscousFluid::new();
        assert_eq!(curve.interpolation(0.0), 0.0);
        assert!((curve.interpolation(1.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn viscous_fluid_is_monotone_and_eases_out() {
        let curve = ViscousFluid::new();
        let mut prev = 0.0;
        for i in 1..=100 {
            let v = curve.interpolation(f64::from(i) / 100.0);
            assert!(v >= prev, "curve decreased at {i}");
            prev = v;
        }
        assert!(curve.interpolation(0.5) > 0.5, "ease-out runs ahead of linear");
    }

    #[test]
    fn linear_is_identity() {
        assert_eq!(Linear.interpolation(0.25), 0.25);
    }
}
