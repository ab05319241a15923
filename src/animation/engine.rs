//! Frame-driven tween scheduler
//!
//! The engine owns every in-flight tween and pending timer. The host calls
//! [`Engine::tick`] once per display refresh; each tick first runs the timers
//! that came due, then advances every tween by the clock's current time.

use super::completion::TweenOutcome;
use super::compositor::TransformCompositor;
use super::tween::{apply_values, Property, PropertySpec, Tween, TweenHandle, TweenId, TweenState};
use crate::config::TweenOptions;
use crate::error::{MotionError, MotionResult};
use crate::target::{Clock, Target};

type Task<T> = Box<dyn FnOnce(&mut Engine<T>)>;

struct Timer<T> {
    due: f64,
    seq: u64,
    task: Task<T>,
}

/// What a cancellation pass removed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cancelled {
    pub tweens: usize,
    pub timers: usize,
}

pub struct Engine<T> {
    clock: Box<dyn Clock>,
    tweens: Vec<Tween<T>>,
    timers: Vec<Timer<T>>,
    compositor: TransformCompositor,
    next_tween: u64,
    next_timer: u64,
}

impl<T: Target> Engine<T> {
    pub fn new(clock: impl Clock + 'static) -> Self {
        Self {
            clock: Box::new(clock),
            tweens: Vec::new(),
            timers: Vec::new(),
            compositor: TransformCompositor::new(),
            next_tween: 0,
            next_timer: 0,
        }
    }

    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    fn allocate_id(&mut self) -> TweenId {
        self.next_tween += 1;
        TweenId(self.next_tween)
    }

    /// Interpolate `properties` on `target` from their `from` to their `to`
    /// values.
    ///
    /// Nothing is written until the first tick at or after `now + delay`.
    /// Invalid options or a detached target reject the returned completion.
    pub fn animate(&mut self, target: &T, properties: PropertySpec, options: TweenOptions) -> TweenHandle {
        let id = self.allocate_id();
        if let Err(e) = options.validate() {
            return TweenHandle::rejected(id, e);
        }
        if !target.is_connected() {
            return TweenHandle::rejected(
                id,
                MotionError::target_unavailable(format!("target {} is not attached", target.key().0)),
            );
        }

        let tween = Tween::new(id, target.clone(), properties, options, self.now());
        tracing::debug!(
            tween = id.0,
            element = target.key().0,
            properties = tween.spec.len(),
            duration = options.duration,
            delay = options.delay,
            "tween scheduled"
        );
        let handle = tween.handle();
        self.tweens.push(tween);
        handle
    }

    /// Write values immediately, outside of any tween
    pub fn set(&mut self, target: &T, values: &[(Property, f64)]) -> MotionResult<()> {
        if !target.is_connected() {
            return Err(MotionError::target_unavailable(format!(
                "target {} is not attached",
                target.key().0
            )));
        }
        apply_values(target, &mut self.compositor, values.iter().cloned())
    }

    /// Run `task` on the first tick at or after `now + delay` milliseconds
    pub fn schedule(&mut self, delay: f64, task: impl FnOnce(&mut Engine<T>) + 'static) {
        self.next_timer += 1;
        self.timers.push(Timer {
            due: self.now() + delay.max(0.0),
            seq: self.next_timer,
            task: Box::new(task),
        });
    }

    /// Advance every timer and tween to the current time.
    ///
    /// Returns the number of tweens still in flight.
    pub fn tick(&mut self) -> usize {
        let now = self.now();
        self.run_due_timers(now);

        let mut finished = Vec::new();
        let compositor = &mut self.compositor;
        self.tweens.retain_mut(|tween| match tween.step(now, compositor) {
            None => true,
            Some(outcome) => {
                tween.state.set(match outcome {
                    TweenOutcome::Finished => TweenState::Completed,
                    TweenOutcome::Skipped => TweenState::Skipped,
                });
                finished.push((tween.id, tween.completion.clone(), outcome));
                false
            }
        });

        // Settle after the sweep so listeners never observe a half-updated frame
        for (id, completion, outcome) in finished {
            if outcome == TweenOutcome::Finished {
                tracing::debug!(tween = id.0, "tween finished");
            }
            completion.settle(Ok(outcome));
        }
        self.tweens.len()
    }

    fn run_due_timers(&mut self, now: f64) {
        // Only timers due at the start of this tick run now; anything they
        // schedule waits for the next tick.
        let (mut due, pending): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.timers).into_iter().partition(|t| t.due <= now);
        self.timers = pending;
        due.sort_by(|a, b| a.due.total_cmp(&b.due).then(a.seq.cmp(&b.seq)));
        for timer in due {
            (timer.task)(self);
        }
    }

    /// Stop every tween, drop every pending timer and forget all
    /// per-target transform state.
    ///
    /// Cancelled tweens never settle their completion signals.
    pub fn cancel_all(&mut self) -> Cancelled {
        let cancelled = Cancelled {
            tweens: self.tweens.len(),
            timers: self.timers.len(),
        };
        for tween in self.tweens.drain(..) {
            tween.state.set(TweenState::Cancelled);
            tween.completion.cancel();
        }
        self.timers.clear();
        self.compositor.clear();
        cancelled
    }

    pub fn active_tweens(&self) -> usize {
        self.tweens.len()
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// True when no further ticks are needed
    pub fn is_idle(&self) -> bool {
        self.tweens.is_empty() && self.timers.is_empty()
    }

    pub fn compositor(&self) -> &TransformCompositor {
        &self.compositor
    }

    pub fn compositor_mut(&mut self) -> &mut TransformCompositor {
        &mut self.compositor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{Easing, TransformComponent};
    use crate::target::{ManualClock, MemoryTarget};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn setup() -> (Engine<MemoryTarget>, ManualClock) {
        let clock = ManualClock::new(1000.0);
        (Engine::new(clock.clone()), clock)
    }

    fn opacity(target: &MemoryTarget) -> f64 {
        target.style("opacity").unwrap().parse().unwrap()
    }

    #[test]
    fn test_reaches_exact_end_value() {
        let (mut engine, clock) = setup();
        let target = MemoryTarget::new(1);
        let handle = engine.animate(
            &target,
            PropertySpec::new().with("width", 0.0, 100.0),
            TweenOptions::new(300.0).with_easing(Easing::EaseInOut),
        );

        for _ in 0..7 {
            engine.tick();
            clock.advance(50.0);
        }
        assert_eq!(handle.state(), TweenState::Completed);
        assert_eq!(target.style("width").as_deref(), Some("100"));
        assert_eq!(
            handle.completion().result(),
            Some(Ok(TweenOutcome::Finished))
        );
    }

    #[test]
    fn test_interpolates_with_easing() {
        let (mut engine, clock) = setup();
        let target = MemoryTarget::new(1);
        engine.animate(&target, PropertySpec::new().with("opacity", 0.0, 1.0), TweenOptions::new(1000.0));

        engine.tick();
        assert_eq!(opacity(&target), 0.0);
        clock.advance(500.0);
        engine.tick();
        assert!((opacity(&target) - 0.875).abs() < 1e-9);
    }

    #[test]
    fn test_delay_defers_first_write() {
        let (mut engine, clock) = setup();
        let target = MemoryTarget::new(1);
        let handle = engine.animate(
            &target,
            PropertySpec::new().with("opacity", 0.0, 1.0),
            TweenOptions::new(100.0).with_delay(200.0),
        );

        engine.tick();
        clock.advance(150.0);
        engine.tick();
        assert_eq!(target.writes(), 0);
        assert_eq!(handle.state(), TweenState::Pending);

        clock.advance(50.0);
        engine.tick();
        assert_eq!(handle.state(), TweenState::Running);
        assert_eq!(opacity(&target), 0.0);
    }

    #[test]
    fn test_zero_duration_finishes_on_first_tick() {
        let (mut engine, _clock) = setup();
        let target = MemoryTarget::new(1);
        let handle = engine.animate(&target, PropertySpec::new().with("opacity", 0.0, 1.0), TweenOptions::new(0.0));
        assert_eq!(engine.tick(), 0);
        assert_eq!(opacity(&target), 1.0);
        assert!(handle.completion().is_settled());
    }

    #[test]
    fn test_strict_zero_duration_rejects() {
        let (mut engine, _clock) = setup();
        let target = MemoryTarget::new(1);
        let handle = engine.animate(&target, PropertySpec::new(), TweenOptions::new(0.0).strict());
        assert!(matches!(handle.completion().result(), Some(Err(e)) if e.is_configuration()));
        assert_eq!(engine.active_tweens(), 0);
    }

    #[test]
    fn test_detached_at_call_rejects() {
        let (mut engine, _clock) = setup();
        let target = MemoryTarget::new(1);
        target.detach();
        let handle = engine.animate(&target, PropertySpec::new().with("x", 0.0, 1.0), TweenOptions::new(10.0));
        assert!(matches!(
            handle.completion().result(),
            Some(Err(MotionError::TargetUnavailable(_)))
        ));
        assert_eq!(handle.state(), TweenState::Rejected);
    }

    #[test]
    fn test_infinite_duration_rejects() {
        let (mut engine, _clock) = setup();
        let target = MemoryTarget::new(1);
        let handle = engine.animate(
            &target,
            PropertySpec::new().with("opacity", 0.0, 1.0),
            TweenOptions::new(f64::INFINITY),
        );
        assert!(matches!(handle.completion().result(), Some(Err(e)) if e.is_configuration()));
        assert_eq!(handle.state(), TweenState::Rejected);
        assert!(engine.is_idle());
        assert_eq!(target.writes(), 0);
    }

    #[test]
    fn test_detached_during_delay_skips_running() {
        let (mut engine, clock) = setup();
        let target = MemoryTarget::new(1);
        let handle = engine.animate(
            &target,
            PropertySpec::new().with("x", 0.0, 10.0),
            TweenOptions::new(100.0).with_delay(50.0),
        );
        engine.tick();
        assert_eq!(handle.state(), TweenState::Pending);

        target.detach();
        clock.advance(10.0);
        engine.tick();
        assert_eq!(handle.state(), TweenState::Skipped);
        assert!(handle.state().is_terminal());
    }

    #[test]
    fn test_detached_in_flight_is_skipped() {
        let (mut engine, clock) = setup();
        let target = MemoryTarget::new(1);
        let other = MemoryTarget::new(2);
        let handle = engine.animate(&target, PropertySpec::new().with("opacity", 0.0, 1.0), TweenOptions::new(100.0));
        let survivor = engine.animate(&other, PropertySpec::new().with("opacity", 0.0, 1.0), TweenOptions::new(100.0));

        engine.tick();
        target.detach();
        clock.advance(50.0);
        assert_eq!(engine.tick(), 1);
        assert_eq!(handle.completion().result(), Some(Ok(TweenOutcome::Skipped)));
        assert_eq!(handle.state(), TweenState::Skipped);
        assert!(survivor.completion().is_pending());
    }

    #[test]
    fn test_detached_targets_release_transform_state() {
        let (mut engine, clock) = setup();
        let targets: Vec<MemoryTarget> = (0..50).map(MemoryTarget::new).collect();
        for target in &targets {
            engine.animate(target, PropertySpec::new().with("x", 0.0, 10.0), TweenOptions::new(100.0));
        }
        engine.tick();
        assert_eq!(engine.compositor().len(), 50);

        for target in &targets[..30] {
            target.detach();
        }
        clock.advance(10.0);
        engine.tick();
        assert_eq!(engine.compositor().len(), 20);
        assert!(engine.compositor().state(targets[0].key()).is_none());
        assert!(engine.compositor().state(targets[40].key()).is_some());
    }

    #[test]
    fn test_concurrent_transforms_share_composite() {
        let (mut engine, clock) = setup();
        let target = MemoryTarget::new(1);
        engine.animate(&target, PropertySpec::new().with("x", 0.0, 10.0), TweenOptions::new(100.0));
        engine.animate(&target, PropertySpec::new().with("rotation", 0.0, 45.0), TweenOptions::new(200.0));

        clock.advance(200.0);
        engine.tick();
        assert_eq!(
            target.style("transform").as_deref(),
            Some("translate(10px, 0px) rotate(45deg)")
        );
        assert_eq!(engine.compositor().read(target.key(), TransformComponent::Scale), 1.0);
    }

    #[test]
    fn test_timers_run_in_due_order() {
        let (mut engine, clock) = setup();
        let log = Rc::new(RefCell::new(Vec::new()));
        for (delay, name) in [(30.0, "c"), (10.0, "a"), (10.0, "b")] {
            let log = log.clone();
            engine.schedule(delay, move |_| log.borrow_mut().push(name));
        }

        clock.advance(10.0);
        engine.tick();
        assert_eq!(*log.borrow(), vec!["a", "b"]);
        clock.advance(20.0);
        engine.tick();
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
        assert!(engine.is_idle());
    }

    #[test]
    fn test_rescheduling_task_waits_for_next_tick() {
        let (mut engine, _clock) = setup();
        let runs = Rc::new(Cell::new(0));
        fn again(engine: &mut Engine<MemoryTarget>, runs: Rc<Cell<u32>>) {
            runs.set(runs.get() + 1);
            engine.schedule(0.0, move |e| again(e, runs));
        }
        let r = runs.clone();
        engine.schedule(0.0, move |e| again(e, r));

        engine.tick();
        assert_eq!(runs.get(), 1);
        engine.tick();
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn test_cancel_all_stops_without_settling() {
        let (mut engine, clock) = setup();
        let target = MemoryTarget::new(1);
        let handle = engine.animate(&target, PropertySpec::new().with("opacity", 0.0, 1.0), TweenOptions::new(100.0));
        engine.schedule(500.0, |_| panic!("cancelled timer ran"));
        engine.tick();
        let writes = target.writes();

        let cancelled = engine.cancel_all();
        assert_eq!(cancelled, Cancelled { tweens: 1, timers: 1 });
        assert_eq!(handle.state(), TweenState::Cancelled);

        clock.advance(1000.0);
        engine.tick();
        assert_eq!(target.writes(), writes);
        assert!(handle.completion().is_cancelled());
        assert!(engine.is_idle());
        assert!(engine.compositor().is_empty());
    }

    #[test]
    fn test_set_writes_immediately() {
        let (mut engine, _clock) = setup();
        let target = MemoryTarget::new(1);
        engine
            .set(
                &target,
                &[
                    (Property::Opacity, 0.0),
                    (Property::Transform(TransformComponent::Y), 50.0),
                ],
            )
            .unwrap();
        assert_eq!(target.style("opacity").as_deref(), Some("0"));
        assert_eq!(target.style("transform").as_deref(), Some("translate(0px, 50px)"));
    }
}
