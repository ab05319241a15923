//! Viewport-visibility triggers
//!
//! A [`VisibilityBinding`] turns a stream of intersection records into
//! callback invocations. The host decides where records come from: the
//! browser's IntersectionObserver, or [`HeadlessObserverHost`] which
//! computes them from plain rectangles.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use super::geometry::{intersection_ratio, Rect, RootMargin};
use super::registry::Registry;
use crate::config::TriggerOptions;
use crate::error::MotionResult;
use crate::target::{Target, TargetKey};

/// Browsers report ratios like 0.2999 when crossing a 0.3 threshold
const RATIO_EPSILON: f64 = 1e-3;

/// One observation of a target's visibility
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionRecord {
    /// Visible fraction of the target, 0..=1
    pub ratio: f64,
    pub is_intersecting: bool,
}

impl IntersectionRecord {
    pub fn new(ratio: f64, is_intersecting: bool) -> Self {
        Self { ratio, is_intersecting }
    }

    pub fn hidden() -> Self {
        Self::new(0.0, false)
    }
}

/// Host-side observation of one target
pub trait Observer {
    /// Stop delivering records for the observed target
    fn unobserve(&self);

    /// Release the observation entirely
    fn disconnect(&self);
}

/// Installs observations for targets
pub trait ObserverHost<T> {
    fn observe(
        &self,
        target: &T,
        margin: &RootMargin,
        options: &TriggerOptions,
        binding: Rc<RefCell<VisibilityBinding>>,
    ) -> MotionResult<Rc<dyn Observer>>;
}

/// Callback plus firing policy for one observed target.
///
/// A `once` binding fires on the first qualifying record and then
/// unobserves. A repeating binding disarms after each fire and re-arms
/// only when a record reports the target as not intersecting, so jitter
/// around the threshold cannot fire it twice for one entry.
pub struct VisibilityBinding {
    threshold: f64,
    once: bool,
    armed: bool,
    done: bool,
    fired: usize,
    callback: Box<dyn FnMut()>,
    observer: Option<Weak<dyn Observer>>,
}

impl VisibilityBinding {
    pub fn new(threshold: f64, once: bool, callback: impl FnMut() + 'static) -> Self {
        Self {
            threshold,
            once,
            armed: true,
            done: false,
            fired: 0,
            callback: Box::new(callback),
            observer: None,
        }
    }

    pub(crate) fn attach(&mut self, observer: &Rc<dyn Observer>) {
        self.observer = Some(Rc::downgrade(observer));
    }

    fn qualifies(&self, record: &IntersectionRecord) -> bool {
        record.is_intersecting && record.ratio + RATIO_EPSILON >= self.threshold
    }

    /// Feed records in arrival order; returns how many times the callback ran
    pub fn handle(&mut self, records: &[IntersectionRecord]) -> usize {
        let mut fired = 0;
        for record in records {
            if self.done {
                break;
            }
            tracing::trace!(ratio = record.ratio, intersecting = record.is_intersecting, "visibility record");

            if !record.is_intersecting {
                self.armed = true;
                continue;
            }
            if !self.armed || !self.qualifies(record) {
                continue;
            }

            (self.callback)();
            self.fired += 1;
            fired += 1;

            if self.once {
                self.done = true;
                if let Some(observer) = self.observer.as_ref().and_then(Weak::upgrade) {
                    observer.unobserve();
                }
            } else {
                self.armed = false;
            }
        }
        fired
    }

    pub fn fired(&self) -> usize {
        self.fired
    }

    /// True once a `once` binding has fired
    pub fn is_done(&self) -> bool {
        self.done
    }
}

/// Caller's view of an installed trigger
#[derive(Clone)]
pub struct TriggerHandle {
    binding: Rc<RefCell<VisibilityBinding>>,
}

impl TriggerHandle {
    pub fn fired(&self) -> usize {
        self.binding.borrow().fired()
    }

    pub fn is_done(&self) -> bool {
        self.binding.borrow().is_done()
    }
}

/// Observe `target` and run `callback` when it becomes sufficiently visible.
///
/// The observer is handed to `registry`, which owns it from then on; a
/// target that never becomes visible is still released by
/// [`Registry::teardown_all`].
pub fn on_visible<T, H>(
    host: &H,
    registry: &mut Registry,
    target: &T,
    options: &TriggerOptions,
    callback: impl FnMut() + 'static,
) -> MotionResult<TriggerHandle>
where
    T: Target,
    H: ObserverHost<T>,
{
    let margin = options.validate()?;
    let binding = Rc::new(RefCell::new(VisibilityBinding::new(
        options.threshold,
        options.once,
        callback,
    )));
    let observer = host.observe(target, &margin, options, binding.clone())?;
    binding.borrow_mut().attach(&observer);

    tracing::debug!(
        element = target.key().0,
        threshold = options.threshold,
        once = options.once,
        "visibility trigger installed"
    );
    registry.register(observer);
    Ok(TriggerHandle { binding })
}

/// Observation held by [`HeadlessObserverHost`]
#[derive(Debug, Default)]
pub struct HeadlessObserver {
    unobserved: Cell<bool>,
    disconnected: Cell<bool>,
}

impl HeadlessObserver {
    pub fn is_active(&self) -> bool {
        !self.unobserved.get() && !self.disconnected.get()
    }

    pub fn is_disconnected(&self) -> bool {
        self.disconnected.get()
    }
}

impl Observer for HeadlessObserver {
    fn unobserve(&self) {
        self.unobserved.set(true);
    }

    fn disconnect(&self) {
        self.disconnected.set(true);
    }
}

struct Observation {
    key: TargetKey,
    margin: RootMargin,
    binding: Rc<RefCell<VisibilityBinding>>,
    observer: Rc<HeadlessObserver>,
}

/// Observer host without a browser: records are pushed in by hand or
/// computed from element and viewport rectangles
#[derive(Default)]
pub struct HeadlessObserverHost {
    observations: RefCell<Vec<Observation>>,
}

impl HeadlessObserverHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver `record` to every active observation of `key`
    pub fn emit(&self, key: TargetKey, record: IntersectionRecord) -> usize {
        // Collect first: callbacks may install new observations
        let bindings: Vec<_> = self
            .observations
            .borrow()
            .iter()
            .filter(|o| o.key == key && o.observer.is_active())
            .map(|o| o.binding.clone())
            .collect();
        bindings
            .into_iter()
            .map(|b| b.borrow_mut().handle(&[record]))
            .sum()
    }

    /// Compute each active observation's record for `element` inside
    /// `viewport` (margin applied per observation) and deliver it
    pub fn scroll(&self, key: TargetKey, element: Rect, viewport: Rect) -> usize {
        let pending: Vec<_> = self
            .observations
            .borrow()
            .iter()
            .filter(|o| o.key == key && o.observer.is_active())
            .map(|o| {
                let (ratio, intersecting) = intersection_ratio(&element, &viewport, &o.margin);
                (o.binding.clone(), IntersectionRecord::new(ratio, intersecting))
            })
            .collect();
        pending
            .into_iter()
            .map(|(b, record)| b.borrow_mut().handle(&[record]))
            .sum()
    }

    /// Observations still receiving records
    pub fn active(&self) -> usize {
        self.observations
            .borrow()
            .iter()
            .filter(|o| o.observer.is_active())
            .count()
    }
}

impl<T: Target> ObserverHost<T> for HeadlessObserverHost {
    fn observe(
        &self,
        target: &T,
        margin: &RootMargin,
        _options: &TriggerOptions,
        binding: Rc<RefCell<VisibilityBinding>>,
    ) -> MotionResult<Rc<dyn Observer>> {
        let observer = Rc::new(HeadlessObserver::default());
        self.observations.borrow_mut().push(Observation {
            key: target.key(),
            margin: *margin,
            binding,
            observer: observer.clone(),
        });
        Ok(observer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::MemoryTarget;

    fn counter() -> (Rc<Cell<usize>>, impl FnMut() + 'static) {
        let hits = Rc::new(Cell::new(0));
        let h = hits.clone();
        (hits, move || h.set(h.get() + 1))
    }

    #[test]
    fn test_once_fires_once() {
        let host = HeadlessObserverHost::new();
        let mut registry = Registry::new();
        let target = MemoryTarget::new(1);
        let (hits, cb) = counter();
        let handle = on_visible(&host, &mut registry, &target, &TriggerOptions::default(), cb).unwrap();

        host.emit(target.key(), IntersectionRecord::new(0.5, true));
        host.emit(target.key(), IntersectionRecord::hidden());
        host.emit(target.key(), IntersectionRecord::new(0.8, true));

        assert_eq!(hits.get(), 1);
        assert!(handle.is_done());
        assert_eq!(host.active(), 0);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_below_threshold_does_not_fire() {
        let host = HeadlessObserverHost::new();
        let mut registry = Registry::new();
        let target = MemoryTarget::new(1);
        let (hits, cb) = counter();
        on_visible(&host, &mut registry, &target, &TriggerOptions::default(), cb).unwrap();

        host.emit(target.key(), IntersectionRecord::new(0.1, true));
        assert_eq!(hits.get(), 0);
        host.emit(target.key(), IntersectionRecord::new(0.2995, true));
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_repeating_fires_per_reentry() {
        let host = HeadlessObserverHost::new();
        let mut registry = Registry::new();
        let target = MemoryTarget::new(1);
        let (hits, cb) = counter();
        let options = TriggerOptions::default().repeating();
        on_visible(&host, &mut registry, &target, &options, cb).unwrap();

        let key = target.key();
        host.emit(key, IntersectionRecord::new(0.4, true));
        // Jitter while still inside the viewport
        host.emit(key, IntersectionRecord::new(0.2, true));
        host.emit(key, IntersectionRecord::new(0.5, true));
        assert_eq!(hits.get(), 1);

        host.emit(key, IntersectionRecord::hidden());
        host.emit(key, IntersectionRecord::new(0.9, true));
        assert_eq!(hits.get(), 2);
        assert_eq!(host.active(), 1);
    }

    #[test]
    fn test_scroll_uses_root_margin() {
        let host = HeadlessObserverHost::new();
        let mut registry = Registry::new();
        let target = MemoryTarget::new(1);
        let (hits, cb) = counter();
        on_visible(&host, &mut registry, &target, &TriggerOptions::default(), cb).unwrap();

        let viewport = Rect::new(0.0, 0.0, 1000.0, 800.0);
        // Half inside the literal viewport, but only 25% above the -50px line
        host.scroll(target.key(), Rect::new(0.0, 700.0, 100.0, 200.0), viewport);
        assert_eq!(hits.get(), 0);

        host.scroll(target.key(), Rect::new(0.0, 600.0, 100.0, 200.0), viewport);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_invalid_options_rejected() {
        let host = HeadlessObserverHost::new();
        let mut registry = Registry::new();
        let target = MemoryTarget::new(1);
        let options = TriggerOptions {
            root_margin: "a lot".to_string(),
            ..Default::default()
        };
        assert!(on_visible(&host, &mut registry, &target, &options, || {}).is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_never_visible_target_still_released() {
        let host = HeadlessObserverHost::new();
        let mut registry = Registry::new();
        let target = MemoryTarget::new(1);
        let (hits, cb) = counter();
        on_visible(&host, &mut registry, &target, &TriggerOptions::default(), cb).unwrap();
        target.detach();

        assert_eq!(host.active(), 1);
        assert_eq!(registry.disconnect_all(), 1);
        assert!(registry.is_empty());
        assert_eq!(host.active(), 0);
        assert_eq!(hits.get(), 0);
    }
}
