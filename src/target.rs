//! Host-facing seams: animatable targets and the frame clock

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::{MotionError, MotionResult};

/// Stable identity of a target, used to index per-target state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetKey(pub u64);

/// Opaque handle to one visual element.
///
/// Handles are cheap to clone and never own the element; the UI layer
/// controls its lifetime.
pub trait Target: Clone + 'static {
    fn key(&self) -> TargetKey;

    /// Write one inline style property
    fn set_style(&self, property: &str, value: &str) -> MotionResult<()>;

    /// Currently displayed text, if any
    fn text(&self) -> Option<String>;

    fn set_text(&self, text: &str) -> MotionResult<()>;

    /// Whether the element is still attached to the document
    fn is_connected(&self) -> bool;
}

/// Source of the current time in milliseconds
pub trait Clock {
    fn now(&self) -> f64;
}

/// Clock advanced by hand; clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
}

impl ManualClock {
    pub fn new(start: f64) -> Self {
        Self {
            now: Rc::new(Cell::new(start)),
        }
    }

    pub fn set(&self, now: f64) {
        self.now.set(now);
    }

    pub fn advance(&self, dt: f64) {
        self.now.set(self.now.get() + dt);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        self.now.get()
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    styles: HashMap<String, String>,
    text: Option<String>,
    detached: bool,
    writes: usize,
}

/// In-process target for headless playback and tests
#[derive(Debug, Clone)]
pub struct MemoryTarget {
    key: TargetKey,
    state: Rc<RefCell<MemoryState>>,
}

impl MemoryTarget {
    pub fn new(key: u64) -> Self {
        Self {
            key: TargetKey(key),
            state: Rc::new(RefCell::new(MemoryState::default())),
        }
    }

    pub fn with_text(key: u64, text: &str) -> Self {
        let target = Self::new(key);
        target.state.borrow_mut().text = Some(text.to_string());
        target
    }

    pub fn style(&self, property: &str) -> Option<String> {
        self.state.borrow().styles.get(property).cloned()
    }

    /// Simulate removal from the document
    pub fn detach(&self) {
        self.state.borrow_mut().detached = true;
    }

    /// Total number of style and text writes received
    pub fn writes(&self) -> usize {
        self.state.borrow().writes
    }
}

impl Target for MemoryTarget {
    fn key(&self) -> TargetKey {
        self.key
    }

    fn set_style(&self, property: &str, value: &str) -> MotionResult<()> {
        let mut state = self.state.borrow_mut();
        if state.detached {
            return Err(MotionError::target_unavailable(format!(
                "target {} is detached",
                self.key.0
            )));
        }
        state.styles.insert(property.to_string(), value.to_string());
        state.writes += 1;
        Ok(())
    }

    fn text(&self) -> Option<String> {
        self.state.borrow().text.clone()
    }

    fn set_text(&self, text: &str) -> MotionResult<()> {
        let mut state = self.state.borrow_mut();
        if state.detached {
            return Err(MotionError::target_unavailable(format!(
                "target {} is detached",
                self.key.0
            )));
        }
        state.text = Some(text.to_string());
        state.writes += 1;
        Ok(())
    }

    fn is_connected(&self) -> bool {
        !self.state.borrow().detached
    }
}
