use std::cell::Cell;

use js_sys::WeakMap;
use wasm_bindgen::JsValue;
use web_sys::{HtmlElement, Performance};

use crate::error::{MotionError, MotionResult};
use crate::target::{Clock, Target, TargetKey};

/// Hands out target keys for one engine.
///
/// Keys live in a `WeakMap` keyed by the element object. A cloned node is a
/// new object and gets a new key; another engine's allocator never sees
/// these keys.
#[derive(Debug)]
pub struct KeyAllocator {
    next: Cell<u64>,
    keys: WeakMap,
}

impl KeyAllocator {
    pub fn new() -> Self {
        Self {
            next: Cell::new(0),
            keys: WeakMap::new(),
        }
    }

    /// Key for `element`, allocating one on first sight
    pub fn key_for(&self, element: &HtmlElement) -> TargetKey {
        if let Some(key) = self.keys.get(element).as_f64() {
            return TargetKey(key as u64);
        }
        let key = self.next.get() + 1;
        self.next.set(key);
        self.keys.set(element, &JsValue::from_f64(key as f64));
        TargetKey(key)
    }
}

impl Default for KeyAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// An HTML element driven through its inline style
#[derive(Debug, Clone)]
pub struct DomTarget {
    element: HtmlElement,
    key: TargetKey,
}

impl DomTarget {
    /// Wrap `element`, reusing the key `keys` gave it on an earlier call
    pub fn new(element: HtmlElement, keys: &KeyAllocator) -> Self {
        let key = keys.key_for(&element);
        Self { element, key }
    }

    pub fn element(&self) -> &HtmlElement {
        &self.element
    }
}

impl Target for DomTarget {
    fn key(&self) -> TargetKey {
        self.key
    }

    fn set_style(&self, property: &str, value: &str) -> MotionResult<()> {
        self.element
            .style()
            .set_property(property, value)
            .map_err(|e| MotionError::target_unavailable(format!("style write rejected: {:?}", e)))
    }

    fn text(&self) -> Option<String> {
        self.element.text_content()
    }

    fn set_text(&self, text: &str) -> MotionResult<()> {
        self.element.set_text_content(Some(text));
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.element.is_connected()
    }
}

/// `window.performance.now()`
pub struct PerformanceClock {
    performance: Performance,
}

impl PerformanceClock {
    pub fn new() -> MotionResult<Self> {
        let performance = web_sys::window()
            .and_then(|w| w.performance())
            .ok_or_else(|| MotionError::configuration("window.performance is unavailable"))?;
        Ok(Self { performance })
    }
}

impl Clock for PerformanceClock {
    fn now(&self) -> f64 {
        self.performance.now()
    }
}
