//! Registry of live visibility observers
//!
//! Every installed trigger hands its observer to a registry. Teardown
//! disconnects them all and cancels whatever the engine still has in
//! flight. Registries are plain values: create one per page (or per test)
//! and pass it where triggers are installed.

use std::rc::Rc;

use super::visibility::Observer;
use crate::animation::Engine;
use crate::target::Target;

/// Counts of what a teardown released
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Teardown {
    pub observers: usize,
    pub tweens: usize,
    pub timers: usize,
}

impl Teardown {
    pub fn is_empty(&self) -> bool {
        *self == Teardown::default()
    }
}

#[derive(Default)]
pub struct Registry {
    observers: Vec<Rc<dyn Observer>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, observer: Rc<dyn Observer>) {
        self.observers.push(observer);
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    /// Disconnect and forget every observer; returns how many there were
    pub fn disconnect_all(&mut self) -> usize {
        let count = self.observers.len();
        for observer in self.observers.drain(..) {
            observer.disconnect();
        }
        count
    }

    /// Disconnect every observer and cancel every tween and timer in
    /// `engine`. Calling it again with nothing registered is a no-op.
    pub fn teardown_all<T: Target>(&mut self, engine: &mut Engine<T>) -> Teardown {
        let observers = self.disconnect_all();
        let cancelled = engine.cancel_all();
        let teardown = Teardown {
            observers,
            tweens: cancelled.tweens,
            timers: cancelled.timers,
        };
        if !teardown.is_empty() {
            tracing::info!(
                observers = teardown.observers,
                tweens = teardown.tweens,
                timers = teardown.timers,
                "animations torn down"
            );
        }
        teardown
    }
}
