//! requestAnimationFrame driver for the engine

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use super::target::DomTarget;
use crate::animation::Engine;
use crate::error::{MotionError, MotionResult};

struct LoopState {
    running: Cell<bool>,
    callback: RefCell<Option<Closure<dyn FnMut(f64)>>>,
}

impl LoopState {
    fn request(&self) -> MotionResult<()> {
        let window = web_sys::window().ok_or_else(|| MotionError::configuration("no window"))?;
        let callback = self.callback.borrow();
        let callback = callback
            .as_ref()
            .ok_or_else(|| MotionError::configuration("frame loop already dropped"))?;
        window
            .request_animation_frame(callback.as_ref().unchecked_ref())
            .map_err(|e| MotionError::configuration(format!("requestAnimationFrame failed: {:?}", e)))?;
        Ok(())
    }
}

/// Ticks the engine once per display refresh while it has work, then
/// parks until [`FrameLoop::ensure_running`] is called again
#[derive(Clone)]
pub struct FrameLoop {
    engine: Rc<RefCell<Engine<DomTarget>>>,
    state: Rc<LoopState>,
}

impl FrameLoop {
    pub fn new(engine: Rc<RefCell<Engine<DomTarget>>>) -> Self {
        let state = Rc::new(LoopState {
            running: Cell::new(false),
            callback: RefCell::new(None),
        });

        let weak = Rc::downgrade(&state);
        let ticked = engine.clone();
        let closure = Closure::<dyn FnMut(f64)>::new(move |_timestamp: f64| {
            let Some(state) = weak.upgrade() else {
                return;
            };
            let idle = match ticked.try_borrow_mut() {
                Ok(mut engine) => {
                    engine.tick();
                    engine.is_idle()
                }
                Err(_) => false,
            };
            if idle {
                state.running.set(false);
            } else if let Err(e) = state.request() {
                tracing::warn!(error = %e, "frame loop stopped");
                state.running.set(false);
            }
        });
        *state.callback.borrow_mut() = Some(closure);

        Self { engine, state }
    }

    /// Request a frame unless one is already pending or there is no work
    pub fn ensure_running(&self) -> MotionResult<()> {
        if self.state.running.get() || self.engine.borrow().is_idle() {
            return Ok(());
        }
        self.state.request()?;
        self.state.running.set(true);
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.state.running.get()
    }
}
