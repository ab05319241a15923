//! Engine defaults and per-call options

use serde::{Deserialize, Serialize};

use crate::animation::Easing;
use crate::error::{MotionError, MotionResult};
use crate::trigger::RootMargin;

/// Engine-wide defaults, loadable from YAML (or JSON) text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MotionConfig {
    /// Default tween duration in milliseconds
    pub duration: f64,
    pub easing: Easing,
    /// Visible fraction required to fire a trigger
    pub threshold: f64,
    /// CSS margin shorthand applied to the viewport
    pub root_margin: String,
    /// Delay between successive elements of a batch, in milliseconds
    pub stagger: f64,
    pub counter_duration: f64,
    pub counter_suffix: String,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            duration: 800.0,
            easing: Easing::EaseOut,
            threshold: 0.3,
            root_margin: "0px 0px -50px 0px".to_string(),
            stagger: 100.0,
            counter_duration: 2000.0,
            counter_suffix: "+".to_string(),
        }
    }
}

impl MotionConfig {
    /// Parse from YAML string
    pub fn from_yaml(yaml: &str) -> MotionResult<Self> {
        let config: MotionConfig = serde_yaml::from_str(yaml)
            .map_err(|e| MotionError::configuration(format!("config parse error: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> MotionResult<()> {
        if !(self.duration.is_finite() && self.duration > 0.0) {
            return Err(MotionError::configuration(format!(
                "duration must be positive, got {}",
                self.duration
            )));
        }
        if !(self.counter_duration.is_finite() && self.counter_duration > 0.0) {
            return Err(MotionError::configuration(format!(
                "counter_duration must be positive, got {}",
                self.counter_duration
            )));
        }
        if !(self.stagger.is_finite() && self.stagger >= 0.0) {
            return Err(MotionError::configuration(format!(
                "stagger must be non-negative, got {}",
                self.stagger
            )));
        }
        self.trigger_options().validate()?;
        Ok(())
    }

    /// Tween options using the configured duration and easing
    pub fn tween_options(&self, delay: f64) -> TweenOptions {
        TweenOptions {
            duration: self.duration,
            easing: self.easing,
            delay,
            strict: false,
        }
    }

    pub fn trigger_options(&self) -> TriggerOptions {
        TriggerOptions {
            threshold: self.threshold,
            root_margin: self.root_margin.clone(),
            once: true,
        }
    }
}

/// Options for a single tween
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TweenOptions {
    /// Milliseconds; zero or negative finishes on the first evaluated tick
    pub duration: f64,
    pub easing: Easing,
    /// Milliseconds to wait before the first visible change
    pub delay: f64,
    /// Reject non-positive durations instead of finishing immediately
    pub strict: bool,
}

impl Default for TweenOptions {
    fn default() -> Self {
        Self {
            duration: 800.0,
            easing: Easing::EaseOut,
            delay: 0.0,
            strict: false,
        }
    }
}

impl TweenOptions {
    pub fn new(duration: f64) -> Self {
        Self {
            duration,
            ..Default::default()
        }
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    pub fn with_delay(mut self, delay: f64) -> Self {
        self.delay = delay;
        self
    }

    pub fn strict(mut self) -> Self {
        self.strict = true;
        self
    }

    pub fn validate(&self) -> MotionResult<()> {
        if !self.duration.is_finite() {
            return Err(MotionError::configuration(format!(
                "duration must be finite, got {}",
                self.duration
            )));
        }
        if self.strict && self.duration <= 0.0 {
            return Err(MotionError::configuration(format!(
                "duration must be positive, got {}",
                self.duration
            )));
        }
        if !(self.delay.is_finite() && self.delay >= 0.0) {
            return Err(MotionError::configuration(format!(
                "delay must be a non-negative number, got {}",
                self.delay
            )));
        }
        Ok(())
    }
}

/// Options for a visibility trigger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriggerOptions {
    pub threshold: f64,
    pub root_margin: String,
    /// Fire once and stop observing, or fire on every re-entry
    pub once: bool,
}

impl Default for TriggerOptions {
    fn default() -> Self {
        MotionConfig::default().trigger_options()
    }
}

impl TriggerOptions {
    pub fn repeating(mut self) -> Self {
        self.once = false;
        self
    }

    pub fn validate(&self) -> MotionResult<RootMargin> {
        if !(0.0..=1.0).contains(&self.threshold) {
            return Err(MotionError::configuration(format!(
                "threshold must be within [0, 1], got {}",
                self.threshold
            )));
        }
        RootMargin::parse(&self.root_margin)
    }
}
