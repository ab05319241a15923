//! Staggered batch playback

use std::rc::Rc;

use super::completion::{join_all, Completion};
use super::engine::Engine;
use crate::target::Target;

/// Start `animation` on each target, element `i` beginning `i * step`
/// milliseconds after the call.
///
/// Elements run concurrently; the returned signal settles once every
/// element's own signal has settled, in whatever order they finish.
pub fn stagger<T, F>(engine: &mut Engine<T>, targets: &[T], step: f64, animation: F) -> Completion
where
    T: Target,
    F: Fn(&mut Engine<T>, &T) -> Completion + 'static,
{
    let slots: Vec<Completion> = targets.iter().map(|_| Completion::new()).collect();
    let aggregate = join_all(&slots);
    let animation = Rc::new(animation);
    let step = step.max(0.0);

    tracing::debug!(elements = targets.len(), step, "stagger scheduled");
    for (i, (target, slot)) in targets.iter().zip(slots).enumerate() {
        let animation = animation.clone();
        let target = target.clone();
        engine.schedule(i as f64 * step, move |engine| {
            let started = animation(engine, &target);
            started.on_settle(move |result| {
                slot.settle(result.clone());
            });
        });
    }
    aggregate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{PropertySpec, TweenOutcome};
    use crate::config::TweenOptions;
    use crate::target::{Clock, ManualClock, MemoryTarget};
    use std::cell::RefCell;

    #[test]
    fn test_elements_start_at_step_offsets() {
        let clock = ManualClock::new(0.0);
        let mut engine = Engine::new(clock.clone());
        let targets: Vec<MemoryTarget> = (0..3).map(MemoryTarget::new).collect();
        let starts = Rc::new(RefCell::new(Vec::new()));

        let log = starts.clone();
        let all = stagger(&mut engine, &targets, 100.0, move |engine, target| {
            log.borrow_mut().push((target.key().0, engine.now()));
            engine
                .animate(target, PropertySpec::new().with("opacity", 0.0, 1.0), TweenOptions::new(50.0))
                .into_completion()
        });

        for _ in 0..=10 {
            engine.tick();
            clock.advance(25.0);
        }
        assert_eq!(*starts.borrow(), vec![(0, 0.0), (1, 100.0), (2, 200.0)]);
        assert_eq!(all.result(), Some(Ok(TweenOutcome::Finished)));
    }

    #[test]
    fn test_aggregate_waits_for_slowest() {
        let clock = ManualClock::new(0.0);
        let mut engine = Engine::new(clock.clone());
        let targets: Vec<MemoryTarget> = (0..3).map(MemoryTarget::new).collect();

        // First element is the slowest, so completions arrive out of order
        let all = stagger(&mut engine, &targets, 10.0, |engine, target| {
            let duration = if target.key().0 == 0 { 500.0 } else { 20.0 };
            engine
                .animate(target, PropertySpec::new().with("x", 0.0, 1.0), TweenOptions::new(duration))
                .into_completion()
        });

        let settled_at = Rc::new(RefCell::new(Vec::new()));
        let s = settled_at.clone();
        let c = clock.clone();
        all.on_settle(move |_| s.borrow_mut().push(c.now()));

        while !engine.is_idle() {
            engine.tick();
            clock.advance(10.0);
        }
        assert_eq!(*settled_at.borrow(), vec![500.0]);
    }

    #[test]
    fn test_empty_batch_resolves() {
        let mut engine: Engine<MemoryTarget> = Engine::new(ManualClock::new(0.0));
        let all = stagger(&mut engine, &[], 100.0, |_, _| Completion::new());
        assert_eq!(all.result(), Some(Ok(TweenOutcome::Finished)));
        assert!(engine.is_idle());
    }

    #[test]
    fn test_cancelled_batch_never_settles() {
        let clock = ManualClock::new(0.0);
        let mut engine = Engine::new(clock.clone());
        let targets: Vec<MemoryTarget> = (0..2).map(MemoryTarget::new).collect();
        let all = stagger(&mut engine, &targets, 100.0, |engine, target| {
            engine
                .animate(target, PropertySpec::new().with("opacity", 0.0, 1.0), TweenOptions::new(50.0))
                .into_completion()
        });

        engine.tick();
        engine.cancel_all();
        clock.advance(1000.0);
        engine.tick();
        assert!(all.is_pending());
    }
}
