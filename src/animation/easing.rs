//! Easing functions for tweens

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::MotionError;

/// Easing curve selected by name (`"ease-out"`, `"bounce"`, ...)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Easing {
    /// Constant velocity
    Linear,
    /// Fast start, cubic deceleration
    #[default]
    EaseOut,
    /// Slow start, cubic acceleration
    EaseIn,
    /// Cubic acceleration then deceleration, smooth at the midpoint
    EaseInOut,
    /// Four decaying bounces at the end
    Bounce,
}

impl Easing {
    pub const ALL: [Easing; 5] = [
        Easing::Linear,
        Easing::EaseOut,
        Easing::EaseIn,
        Easing::EaseInOut,
        Easing::Bounce,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Easing::Linear => "linear",
            Easing::EaseOut => "ease-out",
            Easing::EaseIn => "ease-in",
            Easing::EaseInOut => "ease-in-out",
            Easing::Bounce => "bounce",
        }
    }

    /// Map normalized progress to normalized output.
    ///
    /// Input is clamped to [0, 1]; both endpoints map exactly onto themselves.
    pub fn apply(self, t: f64) -> f64 {
        if t.is_nan() || t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }

        let v = match self {
            Easing::Linear => t,
            Easing::EaseOut => 1.0 - (1.0 - t).powi(3),
            Easing::EaseIn => t * t * t,
            Easing::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::Bounce => bounce_out(t),
        };
        v.clamp(0.0, 1.0)
    }
}

fn bounce_out(t: f64) -> f64 {
    const N: f64 = 7.5625;
    const D: f64 = 2.75;

    if t < 1.0 / D {
        N * t * t
    } else if t < 2.0 / D {
        let t = t - 1.5 / D;
        N * t * t + 0.75
    } else if t < 2.5 / D {
        let t = t - 2.25 / D;
        N * t * t + 0.9375
    } else {
        let t = t - 2.625 / D;
        N * t * t + 0.984375
    }
}

impl FromStr for Easing {
    type Err = MotionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Easing::ALL
            .into_iter()
            .find(|e| e.name() == s)
            .ok_or_else(|| MotionError::configuration(format!("unknown easing '{}'", s)))
    }
}

impl TryFrom<String> for Easing {
    type Error = MotionError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Easing> for String {
    fn from(e: Easing) -> Self {
        e.name().to_string()
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Apply the easing curve registered under `name` to `t`
pub fn ease(name: &str, t: f64) -> Result<f64, MotionError> {
    Ok(name.parse::<Easing>()?.apply(t))
}
