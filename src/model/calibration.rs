//! Platt re-mapping of a raw classifier probability.
//!
//! `p_calibrated = sigmoid(a * logit(p_raw) + b)`, fitted offline next to the
//! classifier and shipped in the same artifact.

use serde::{Deserialize, Serialize};

const EPS: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlattCalibration {
    pub a: f64,
    pub b: f64,
}

impl PlattCalibration {
    pub fn is_finite(&self) -> bool {
        self.a.is_finite() && self.b.is_finite()
    }

    pub fn apply(&self, raw_prob: f64) -> f64 {
        let x = logit(raw_prob);
        sigmoid(self.a * x + self.b).clamp(0.0, 1.0)
    }
}

fn clamp_prob(p: f64) -> f64 {
    p.clamp(EPS, 1.0 - EPS)
}

pub fn logit(p: f64) -> f64 {
    let p = clamp_prob(p);
    (p / (1.0 - p)).ln()
}

/// Logistic sigmoid, stable for large `|x|`.
pub fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        let z = (-x).exp();
        1.0 / (1.0 + z)
    } else {
        let z = x.exp();
        z / (1.0 + z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn identity_calibration_keeps_probability() {
        let m = PlattCalibration { a: 1.0, b: 0.0 };
        for p in [0.05, 0.3, 0.5, 0.77, 0.95] {
            assert_relative_eq!(m.apply(p), p, epsilon = 1e-9);
        }
    }

    #[test]
    fn shrinking_slope_pulls_toward_half() {
        let m = PlattCalibration { a: 0.5, b: 0.0 };
        assert!(m.apply(0.9) < 0.9 && m.apply(0.9) > 0.5);
        assert!(m.apply(0.1) > 0.1 && m.apply(0.1) < 0.5);
    }

    #[test]
    fn apply_bounds_output() {
        let m = PlattCalibration { a: 1.2, b: -0.1 };
        assert!((0.0..=1.0).contains(&m.apply(0.999_999)));
        assert!((0.0..=1.0).contains(&m.apply(0.0)));
    }

    #[test]
    fn sigmoid_properties() {
        assert_relative_eq!(sigmoid(0.0), 0.5, epsilon = 1e-12);
        assert!(sigmoid(40.0) <= 1.0 && sigmoid(40.0) > 0.999);
        assert!(sigmoid(-800.0) >= 0.0);
        assert_relative_eq!(sigmoid(logit(0.3)), 0.3, epsilon = 1e-9);
    }
}
