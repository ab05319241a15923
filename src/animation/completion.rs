//! Resolve-once completion signals

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

use crate::error::MotionError;

/// How a tween (or a batch of tweens) ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TweenOutcome {
    /// Ran to progress 1
    Finished,
    /// Terminated early because the target went away
    Skipped,
}

impl TweenOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            TweenOutcome::Finished => "finished",
            TweenOutcome::Skipped => "skipped",
        }
    }
}

pub type Settled = Result<TweenOutcome, MotionError>;

type Listener = Box<dyn FnOnce(&Settled)>;

enum Slot {
    Pending,
    Settled(Settled),
    Cancelled,
}

struct Inner {
    slot: Slot,
    listeners: Vec<Listener>,
    waker: Option<Waker>,
}

/// Shared signal that settles at most once.
///
/// A cancelled signal never settles: its listeners are dropped unrun and
/// awaiting it stays pending.
#[derive(Clone)]
pub struct Completion {
    inner: Rc<RefCell<Inner>>,
}

impl Completion {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Inner {
                slot: Slot::Pending,
                listeners: Vec::new(),
                waker: None,
            })),
        }
    }

    pub fn resolved(outcome: TweenOutcome) -> Self {
        let c = Self::new();
        c.settle(Ok(outcome));
        c
    }

    pub fn rejected(err: MotionError) -> Self {
        let c = Self::new();
        c.settle(Err(err));
        c
    }

    /// Settle the signal; returns false if it was already settled or cancelled.
    pub fn settle(&self, result: Settled) -> bool {
        let (listeners, waker) = {
            let mut inner = self.inner.borrow_mut();
            if !matches!(inner.slot, Slot::Pending) {
                return false;
            }
            inner.slot = Slot::Settled(result.clone());
            (std::mem::take(&mut inner.listeners), inner.waker.take())
        };

        // Listeners run outside the borrow so they may inspect this signal
        for listener in listeners {
            listener(&result);
        }
        if let Some(waker) = waker {
            waker.wake();
        }
        true
    }

    pub fn cancel(&self) -> bool {
        let mut inner = self.inner.borrow_mut();
        if !matches!(inner.slot, Slot::Pending) {
            return false;
        }
        inner.slot = Slot::Cancelled;
        inner.listeners.clear();
        inner.waker = None;
        true
    }

    /// Run `f` once the signal settles (immediately if it already has)
    pub fn on_settle(&self, f: impl FnOnce(&Settled) + 'static) {
        let settled = {
            let mut guard = self.inner.borrow_mut();
            let inner = &mut *guard;
            match &inner.slot {
                Slot::Pending => {
                    inner.listeners.push(Box::new(f));
                    return;
                }
                Slot::Cancelled => return,
                Slot::Settled(result) => result.clone(),
            }
        };
        f(&settled);
    }

    pub fn result(&self) -> Option<Settled> {
        match &self.inner.borrow().slot {
            Slot::Settled(result) => Some(result.clone()),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.inner.borrow().slot, Slot::Pending)
    }

    pub fn is_settled(&self) -> bool {
        matches!(self.inner.borrow().slot, Slot::Settled(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.inner.borrow().slot, Slot::Cancelled)
    }
}

impl Default for Completion {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Completion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match &self.inner.borrow().slot {
            Slot::Pending => "pending".to_string(),
            Slot::Cancelled => "cancelled".to_string(),
            Slot::Settled(r) => format!("{:?}", r),
        };
        f.debug_struct("Completion").field("state", &state).finish()
    }
}

impl Future for Completion {
    type Output = Settled;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut guard = self.inner.borrow_mut();
        let inner = &mut *guard;
        match &inner.slot {
            Slot::Settled(result) => Poll::Ready(result.clone()),
            _ => {
                inner.waker = Some(cx.waker().clone());
                Poll::Pending
            }
        }
    }
}

/// Combine signals into one that settles after all of them have.
///
/// Counts down from `signals.len()`; the result is the first error seen,
/// otherwise `Finished`. An empty batch resolves immediately.
pub fn join_all(signals: &[Completion]) -> Completion {
    let aggregate = Completion::new();
    if signals.is_empty() {
        aggregate.settle(Ok(TweenOutcome::Finished));
        return aggregate;
    }

    let tally = Rc::new(RefCell::new((signals.len(), None::<MotionError>)));
    for signal in signals {
        let tally = tally.clone();
        let aggregate = aggregate.clone();
        signal.on_settle(move |result| {
            let done = {
                let mut t = tally.borrow_mut();
                if let Err(e) = result {
                    t.1.get_or_insert_with(|| e.clone());
                }
                t.0 -= 1;
                if t.0 == 0 {
                    Some(t.1.take())
                } else {
                    None
                }
            };
            if let Some(error) = done {
                aggregate.settle(match error {
                    Some(e) => Err(e),
                    None => Ok(TweenOutcome::Finished),
                });
            }
        });
    }
    aggregate
}
