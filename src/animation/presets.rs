//! Named entrance animations and the background cycle

use std::fmt;
use std::str::FromStr;

use super::engine::Engine;
use super::tween::{Property, PropertySpec, TweenHandle};
use crate::config::TweenOptions;
use crate::error::MotionError;
use crate::target::Target;

/// Gradients rotated through by [`cycle_background`]
pub const BACKGROUND_GRADIENTS: [&str; 4] = [
    "linear-gradient(135deg, #667eea 0%, #764ba2 100%)",
    "linear-gradient(135deg, #f093fb 0%, #f5576c 100%)",
    "linear-gradient(135deg, #4facfe 0%, #00f2fe 100%)",
    "linear-gradient(135deg, #43e97b 0%, #38f9d7 100%)",
];

/// Entrance animations; each snaps to its initial state, then tweens in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    FadeIn,
    FadeInUp,
    ScaleIn,
    SlideInLeft,
    SlideInRight,
    RotateIn,
}

impl Preset {
    pub const ALL: [Preset; 6] = [
        Preset::FadeIn,
        Preset::FadeInUp,
        Preset::ScaleIn,
        Preset::SlideInLeft,
        Preset::SlideInRight,
        Preset::RotateIn,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Preset::FadeIn => "fadeIn",
            Preset::FadeInUp => "fadeInUp",
            Preset::ScaleIn => "scaleIn",
            Preset::SlideInLeft => "slideInLeft",
            Preset::SlideInRight => "slideInRight",
            Preset::RotateIn => "rotateIn",
        }
    }

    /// Properties animated by this preset, opacity always fading 0 -> 1
    pub fn spec(self) -> PropertySpec {
        let spec = PropertySpec::new().with("opacity", 0.0, 1.0);
        match self {
            Preset::FadeIn => spec,
            Preset::FadeInUp => spec.with("y", 50.0, 0.0),
            Preset::ScaleIn => spec.with("scale", 0.8, 1.0),
            Preset::SlideInLeft => spec.with("x", -100.0, 0.0),
            Preset::SlideInRight => spec.with("x", 100.0, 0.0),
            Preset::RotateIn => spec.with("rotation", -180.0, 0.0),
        }
    }

    /// Values written before the tween starts
    pub fn initial(self) -> Vec<(Property, f64)> {
        self.spec()
            .channels()
            .iter()
            .map(|(property, range)| (property.clone(), range.from))
            .collect()
    }

    /// Snap `target` to the initial state and start the tween.
    ///
    /// The snap happens now, even when `options.delay` postpones the tween.
    pub fn play<T: Target>(self, engine: &mut Engine<T>, target: &T, options: TweenOptions) -> TweenHandle {
        if let Err(e) = engine.set(target, &self.initial()) {
            tracing::warn!(preset = self.name(), error = %e, "could not apply initial state");
        }
        engine.animate(target, self.spec(), options)
    }
}

impl FromStr for Preset {
    type Err = MotionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| MotionError::configuration(format!("unknown preset '{}'", s)))
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Swap `target`'s background through [`BACKGROUND_GRADIENTS`] every
/// `interval` milliseconds until the engine is torn down or the target
/// is detached.
pub fn cycle_background<T: Target>(engine: &mut Engine<T>, target: &T, interval: f64) {
    next_background(engine, target.clone(), interval.max(1.0), 0);
}

fn next_background<T: Target>(engine: &mut Engine<T>, target: T, interval: f64, index: usize) {
    let gradient = BACKGROUND_GRADIENTS[index % BACKGROUND_GRADIENTS.len()];
    if let Err(e) = target.set_style("background", gradient) {
        tracing::warn!(error = %e, "stopping background cycle");
        return;
    }
    engine.schedule(interval, move |engine| {
        next_background(engine, target, interval, index + 1)
    });
}
