//! Tween definitions: animatable properties, per-call specs and handles

use std::cell::Cell;
use std::collections::BTreeMap;
use std::rc::Rc;

use serde::Deserialize;

use super::completion::{Completion, TweenOutcome};
use super::compositor::{TransformComponent, TransformCompositor};
use crate::config::TweenOptions;
use crate::error::{MotionError, MotionResult};
use crate::target::Target;

/// Where an interpolated value is written
#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    Opacity,
    /// Routed through the transform compositor
    Transform(TransformComponent),
    /// Any other inline style, written as a bare number
    Style(String),
    /// Integer text content with a fixed suffix
    Counter { suffix: String },
}

impl Property {
    /// Resolve a property by its spec name (`opacity`, `x`, `y`, `rotation`,
    /// `scale`, or a free-form style key)
    pub fn named(name: &str) -> Self {
        match name {
            "opacity" => Property::Opacity,
            "x" => Property::Transform(TransformComponent::X),
            "y" => Property::Transform(TransformComponent::Y),
            "rotation" => Property::Transform(TransformComponent::Rotation),
            "scale" => Property::Transform(TransformComponent::Scale),
            other => Property::Style(other.to_string()),
        }
    }
}

/// Start and end value of one property
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Range {
    pub from: f64,
    pub to: f64,
}

impl Range {
    pub fn new(from: f64, to: f64) -> Self {
        Self { from, to }
    }

    /// Interpolate; an eased value of 1 yields `to` exactly
    pub fn at(&self, eased: f64) -> f64 {
        if eased >= 1.0 {
            self.to
        } else {
            self.from + (self.to - self.from) * eased
        }
    }
}

/// Property ranges animated together by one tween; names are unique
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertySpec {
    channels: Vec<(Property, Range)>,
}

impl PropertySpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a named property
    pub fn with(mut self, name: &str, from: f64, to: f64) -> Self {
        self.insert(Property::named(name), Range::new(from, to));
        self
    }

    pub fn insert(&mut self, property: Property, range: Range) {
        match self.channels.iter_mut().find(|(p, _)| *p == property) {
            Some(slot) => slot.1 = range,
            None => self.channels.push((property, range)),
        }
    }

    /// Parse `{ name: { from, to } }` from YAML or JSON text
    pub fn from_yaml(text: &str) -> MotionResult<Self> {
        let map: BTreeMap<String, Range> = serde_yaml::from_str(text)
            .map_err(|e| MotionError::configuration(format!("property spec parse error: {}", e)))?;
        let mut spec = Self::new();
        for (name, range) in map {
            if !(range.from.is_finite() && range.to.is_finite()) {
                return Err(MotionError::configuration(format!(
                    "property '{}' has a non-finite range",
                    name
                )));
            }
            spec.insert(Property::named(&name), range);
        }
        Ok(spec)
    }

    pub fn channels(&self) -> &[(Property, Range)] {
        &self.channels
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TweenId(pub u64);

/// Lifecycle of a tween; moves forward only.
///
/// A tween that plays out goes `Pending -> Running -> Completed`. The other
/// terminal states end that path early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TweenState {
    /// Waiting for its start time
    Pending,
    Running,
    Completed,
    /// Stopped by teardown; the completion never settles
    Cancelled,
    /// Target went away mid-flight; resolved as skipped
    Skipped,
    /// Invalid options or a detached target; never scheduled
    Rejected,
}

impl TweenState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, TweenState::Pending | TweenState::Running)
    }
}

/// Caller's view of one in-flight tween
#[derive(Debug, Clone)]
pub struct TweenHandle {
    id: TweenId,
    state: Rc<Cell<TweenState>>,
    completion: Completion,
}

impl TweenHandle {
    pub(crate) fn rejected(id: TweenId, err: MotionError) -> Self {
        Self {
            id,
            state: Rc::new(Cell::new(TweenState::Rejected)),
            completion: Completion::rejected(err),
        }
    }

    pub fn id(&self) -> TweenId {
        self.id
    }

    pub fn state(&self) -> TweenState {
        self.state.get()
    }

    pub fn completion(&self) -> Completion {
        self.completion.clone()
    }

    pub fn into_completion(self) -> Completion {
        self.completion
    }
}

/// Write every channel's value for one eased progress.
///
/// Transform components are merged first and written as one composite.
pub(crate) fn apply_values<T: Target>(
    target: &T,
    compositor: &mut TransformCompositor,
    values: impl IntoIterator<Item = (Property, f64)>,
) -> MotionResult<()> {
    let mut transforms = Vec::new();
    for (property, value) in values {
        match property {
            Property::Opacity => target.set_style("opacity", &value.to_string())?,
            Property::Transform(component) => transforms.push((component, value)),
            Property::Style(name) => target.set_style(&name, &value.to_string())?,
            Property::Counter { suffix } => {
                target.set_text(&format!("{}{}", value.floor() as i64, suffix))?
            }
        }
    }
    if !transforms.is_empty() {
        let css = compositor.write_all(target.key(), transforms);
        target.set_style("transform", &css)?;
    }
    Ok(())
}

/// Engine-side record of a scheduled tween
pub(crate) struct Tween<T> {
    pub id: TweenId,
    pub target: T,
    pub spec: PropertySpec,
    pub options: TweenOptions,
    /// Absolute start time (call time + delay)
    pub start: f64,
    pub state: Rc<Cell<TweenState>>,
    pub completion: Completion,
}

impl<T: Target> Tween<T> {
    pub fn new(id: TweenId, target: T, spec: PropertySpec, options: TweenOptions, now: f64) -> Self {
        Self {
            id,
            target,
            spec,
            options,
            start: now + options.delay,
            state: Rc::new(Cell::new(TweenState::Pending)),
            completion: Completion::new(),
        }
    }

    pub fn handle(&self) -> TweenHandle {
        TweenHandle {
            id: self.id,
            state: self.state.clone(),
            completion: self.completion.clone(),
        }
    }

    pub fn progress(&self, now: f64) -> f64 {
        if self.options.duration <= 0.0 {
            return 1.0;
        }
        ((now - self.start) / self.options.duration).clamp(0.0, 1.0)
    }

    /// Advance to `now`; returns the outcome once the tween is over
    pub fn step(&mut self, now: f64, compositor: &mut TransformCompositor) -> Option<TweenOutcome> {
        if !self.target.is_connected() {
            tracing::warn!(tween = self.id.0, "target detached, skipping tween");
            compositor.forget(self.target.key());
            return Some(TweenOutcome::Skipped);
        }
        if now < self.start {
            return None;
        }
        if self.state.get() == TweenState::Pending {
            self.state.set(TweenState::Running);
            tracing::debug!(tween = self.id.0, easing = %self.options.easing, "tween started");
        }

        let progress = self.progress(now);
        let eased = self.options.easing.apply(progress);
        let values = self
            .spec
            .channels()
            .iter()
            .map(|(property, range)| (property.clone(), range.at(eased)));

        if let Err(e) = apply_values(&self.target, compositor, values) {
            tracing::warn!(tween = self.id.0, error = %e, "write failed, skipping tween");
            return Some(TweenOutcome::Skipped);
        }

        if progress < 1.0 {
            None
        } else {
            Some(TweenOutcome::Finished)
        }
    }
}
