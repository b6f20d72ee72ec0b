//! Easing curves and small vector helpers.

use std::f64::consts;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Named easing curves for camera animations.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    EaseOut,
    #[default]
    EaseInOut,
    /// Quick accelerate, then settle.
    Leap,
}

impl Easing {
    /// Map linear progress in `[0, 1]` through the curve.
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::EaseOut => 1.0 - (1.0 - t).powi(3),
            Easing::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::Leap => {
                if t < 0.3 {
                    t * t * 3.33
                } else {
                    0.33 + 0.67 * (1.0 - (1.0 - (t - 0.3) / 0.7).powi(3))
                }
            }
        }
    }
}

pub fn lerp_vec(a: Vector3<f64>, b: Vector3<f64>, t: f64) -> Vector3<f64> {
    a + (b - a) * t
}

/// Wrap an angle into `[0, 2π)`.
pub fn wrap_angle(theta: f64) -> f64 {
    let tau = 2.0 * consts::PI;
    let wrapped = theta % tau;
    if wrapped < 0.0 {
        wrapped + tau
    } else {
        wrapped
    }
}
