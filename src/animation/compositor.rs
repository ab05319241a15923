//! Composite transform state per target
//!
//! `x`, `y`, `rotation` and `scale` all land in the single `transform`
//! style. Each target keeps its components here and the composite string
//! is rebuilt from them on every write, so one property never clobbers
//! another.

use std::collections::HashMap;

use crate::target::TargetKey;

/// One transform-bearing property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformComponent {
    X,
    Y,
    Rotation,
    Scale,
}

/// Live transform contributions of a single target.
///
/// `None` means "never written"; reads fall back to the identity value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TransformState {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub rotation: Option<f64>,
    pub scale: Option<f64>,
}

impl TransformState {
    pub fn set(&mut self, component: TransformComponent, value: f64) {
        match component {
            TransformComponent::X => self.x = Some(value),
            TransformComponent::Y => self.y = Some(value),
            TransformComponent::Rotation => self.rotation = Some(value),
            TransformComponent::Scale => self.scale = Some(value),
        }
    }

    pub fn get(&self, component: TransformComponent) -> f64 {
        match component {
            TransformComponent::X => self.x.unwrap_or(0.0),
            TransformComponent::Y => self.y.unwrap_or(0.0),
            TransformComponent::Rotation => self.rotation.unwrap_or(0.0),
            TransformComponent::Scale => self.scale.unwrap_or(1.0),
        }
    }

    /// Serialize as `translate(..) rotate(..) scale(..)`, omitting
    /// components that were never written.
    pub fn to_css(&self) -> String {
        let mut parts = Vec::with_capacity(3);
        if self.x.is_some() || self.y.is_some() {
            parts.push(format!(
                "translate({}px, {}px)",
                self.get(TransformComponent::X),
                self.get(TransformComponent::Y)
            ));
        }
        if let Some(r) = self.rotation {
            parts.push(format!("rotate({}deg)", r));
        }
        if let Some(s) = self.scale {
            parts.push(format!("scale({})", s));
        }
        if parts.is_empty() {
            "none".to_string()
        } else {
            parts.join(" ")
        }
    }
}

/// Index of transform state keyed by target
#[derive(Debug, Default)]
pub struct TransformCompositor {
    states: HashMap<TargetKey, TransformState>,
}

impl TransformCompositor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one component and return the new composite string
    pub fn write(&mut self, key: TargetKey, component: TransformComponent, value: f64) -> String {
        let state = self.states.entry(key).or_default();
        state.set(component, value);
        state.to_css()
    }

    /// Record several components at once and return the composite string
    pub fn write_all(
        &mut self,
        key: TargetKey,
        values: impl IntoIterator<Item = (TransformComponent, f64)>,
    ) -> String {
        let state = self.states.entry(key).or_default();
        for (component, value) in values {
            state.set(component, value);
        }
        state.to_css()
    }

    pub fn read(&self, key: TargetKey, component: TransformComponent) -> f64 {
        self.states
            .get(&key)
            .copied()
            .unwrap_or_default()
            .get(component)
    }

    pub fn state(&self, key: TargetKey) -> Option<&TransformState> {
        self.states.get(&key)
    }

    /// Drop the recorded state of a target the UI layer has discarded
    pub fn forget(&mut self, key: TargetKey) {
        self.states.remove(&key);
    }

    pub fn clear(&mut self) {
        self.states.clear();
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const K: TargetKey = TargetKey(1);

    #[test]
    fn test_translate_then_rotate_keeps_both() {
        let mut c = TransformCompositor::new();
        c.write(K, TransformComponent::X, 10.0);
        let css = c.write(K, TransformComponent::Rotation, 45.0);
        assert_eq!(css, "translate(10px, 0px) rotate(45deg)");
    }

    #[test]
    fn test_order_independent() {
        let mut a = TransformCompositor::new();
        a.write(K, TransformComponent::Scale, 0.8);
        a.write(K, TransformComponent::Y, 50.0);
        a.write(K, TransformComponent::Rotation, -180.0);

        let mut b = TransformCompositor::new();
        b.write(K, TransformComponent::Rotation, -180.0);
        b.write(K, TransformComponent::Y, 50.0);
        let css = b.write(K, TransformComponent::Scale, 0.8);

        assert_eq!(a.state(K), b.state(K));
        assert_eq!(css, "translate(0px, 50px) rotate(-180deg) scale(0.8)");
    }

    #[test]
    fn test_idempotent() {
        let mut c = TransformCompositor::new();
        let values = [(TransformComponent::X, 5.0), (TransformComponent::Scale, 2.0)];
        let first = c.write_all(K, values);
        let second = c.write_all(K, values);
        assert_eq!(first, second);
    }

    #[test]
    fn test_unset_components_read_identity() {
        let mut c = TransformCompositor::new();
        assert_eq!(c.read(K, TransformComponent::Scale), 1.0);
        c.write(K, TransformComponent::Y, 3.0);
        assert_eq!(c.read(K, TransformComponent::X), 0.0);
        assert_eq!(c.read(K, TransformComponent::Rotation), 0.0);
        assert_eq!(c.read(K, TransformComponent::Y), 3.0);
    }

    #[test]
    fn test_targets_are_independent() {
        let mut c = TransformCompositor::new();
        c.write(TargetKey(1), TransformComponent::X, 1.0);
        let css = c.write(TargetKey(2), TransformComponent::Scale, 2.0);
        assert_eq!(css, "scale(2)");
        assert_eq!(c.len(), 2);
        c.forget(TargetKey(1));
        assert_eq!(c.read(TargetKey(1), TransformComponent::X), 0.0);
    }

    #[test]
    fn test_empty_state_is_none() {
        assert_eq!(TransformState::default().to_css(), "none");
    }
}
