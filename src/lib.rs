use std::cell::RefCell;
use std::rc::Rc;

use js_sys::Promise;
use wasm_bindgen::prelude::*;
use web_sys::HtmlElement;

pub mod animation;
pub mod config;
pub mod dom;
pub mod error;
pub mod target;
pub mod trigger;

pub use animation::{Completion, Easing, Engine, Preset, PropertySpec, TweenHandle, TweenOutcome};
pub use config::{MotionConfig, TriggerOptions, TweenOptions};
pub use error::{MotionError, MotionResult};
pub use target::{Clock, ManualClock, MemoryTarget, Target, TargetKey};
pub use trigger::{on_visible, Registry};

use dom::{into_promise, DomObserverHost, DomTarget, FrameLoop, KeyAllocator, PerformanceClock};

/// Initialize panic hook and console logging
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
    dom::init_logging();
}

/// Page animation engine exposed to JavaScript
#[wasm_bindgen]
pub struct MotionEngine {
    config: MotionConfig,
    engine: Rc<RefCell<Engine<DomTarget>>>,
    registry: Registry,
    frames: FrameLoop,
    keys: KeyAllocator,
    observers: DomObserverHost,
}

#[wasm_bindgen]
impl MotionEngine {
    /// Create an engine, optionally overriding defaults with a YAML/JSON config
    #[wasm_bindgen(constructor)]
    pub fn new(config: Option<String>) -> Result<MotionEngine, JsValue> {
        let config = match config {
            Some(text) => MotionConfig::from_yaml(&text)?,
            None => MotionConfig::default(),
        };
        let engine = Rc::new(RefCell::new(Engine::new(PerformanceClock::new()?)));
        let frames = FrameLoop::new(engine.clone());

        Ok(Self {
            config,
            engine,
            registry: Registry::new(),
            frames,
            keys: KeyAllocator::new(),
            observers: DomObserverHost,
        })
    }

    fn target(&self, element: HtmlElement) -> DomTarget {
        DomTarget::new(element, &self.keys)
    }

    /// Start the frame loop and hand the completion to JavaScript
    fn launch(&self, completion: Completion) -> Result<Promise, JsValue> {
        self.frames.ensure_running()?;
        Ok(into_promise(completion))
    }

    /// Animate properties described as `{ name: { from, to } }` (YAML or JSON)
    #[wasm_bindgen]
    pub fn animate(
        &mut self,
        element: HtmlElement,
        spec: &str,
        duration: Option<f64>,
        easing: Option<String>,
        delay: Option<f64>,
    ) -> Result<Promise, JsValue> {
        let easing = match easing.as_deref().map(str::parse::<Easing>).transpose() {
            Ok(easing) => easing.unwrap_or(self.config.easing),
            Err(e) => return Ok(into_promise(Completion::rejected(e))),
        };
        let spec = match PropertySpec::from_yaml(spec) {
            Ok(spec) => spec,
            Err(e) => return Ok(into_promise(Completion::rejected(e))),
        };
        let options = TweenOptions {
            duration: duration.unwrap_or(self.config.duration),
            easing,
            delay: delay.unwrap_or(0.0),
            strict: false,
        };

        let target = self.target(element);
        let handle = self.engine.borrow_mut().animate(&target, spec, options);
        self.launch(handle.into_completion())
    }

    /// Play a named preset (`fadeIn`, `fadeInUp`, `scaleIn`, `slideInLeft`,
    /// `slideInRight`, `rotateIn`)
    #[wasm_bindgen]
    pub fn play(&mut self, preset: &str, element: HtmlElement, delay: Option<f64>) -> Result<Promise, JsValue> {
        match preset.parse::<Preset>() {
            Ok(preset) => self.play_preset(preset, element, delay),
            Err(e) => Ok(into_promise(Completion::rejected(e))),
        }
    }

    fn play_preset(&mut self, preset: Preset, element: HtmlElement, delay: Option<f64>) -> Result<Promise, JsValue> {
        let target = self.target(element);
        let options = self.config.tween_options(delay.unwrap_or(0.0));
        let handle = preset.play(&mut *self.engine.borrow_mut(), &target, options);
        self.launch(handle.into_completion())
    }

    // === Presets ===

    #[wasm_bindgen]
    pub fn fade_in(&mut self, element: HtmlElement, delay: Option<f64>) -> Result<Promise, JsValue> {
        self.play_preset(Preset::FadeIn, element, delay)
    }

    #[wasm_bindgen]
    pub fn fade_in_up(&mut self, element: HtmlElement, delay: Option<f64>) -> Result<Promise, JsValue> {
        self.play_preset(Preset::FadeInUp, element, delay)
    }

    #[wasm_bindgen]
    pub fn scale_in(&mut self, element: HtmlElement, delay: Option<f64>) -> Result<Promise, JsValue> {
        self.play_preset(Preset::ScaleIn, element, delay)
    }

    #[wasm_bindgen]
    pub fn slide_in_left(&mut self, element: HtmlElement, delay: Option<f64>) -> Result<Promise, JsValue> {
        self.play_preset(Preset::SlideInLeft, element, delay)
    }

    #[wasm_bindgen]
    pub fn slide_in_right(&mut self, element: HtmlElement, delay: Option<f64>) -> Result<Promise, JsValue> {
        self.play_preset(Preset::SlideInRight, element, delay)
    }

    #[wasm_bindgen]
    pub fn rotate_in(&mut self, element: HtmlElement, delay: Option<f64>) -> Result<Promise, JsValue> {
        self.play_preset(Preset::RotateIn, element, delay)
    }

    /// Count up from the element's displayed number to `target`
    #[wasm_bindgen]
    pub fn animate_counter(
        &mut self,
        element: HtmlElement,
        target: f64,
        duration: Option<f64>,
    ) -> Result<Promise, JsValue> {
        if !target.is_finite() {
            return Ok(into_promise(Completion::rejected(MotionError::configuration(
                "counter target must be a finite number",
            ))));
        }
        let options = TweenOptions::new(duration.unwrap_or(self.config.counter_duration));
        let suffix = self.config.counter_suffix.clone();
        let element = self.target(element);
        let handle = self
            .engine
            .borrow_mut()
            .animate_counter(&element, target.trunc() as i64, options, &suffix);
        self.launch(handle.into_completion())
    }

    /// Play a preset on each element, `step` milliseconds apart; resolves
    /// when all of them have finished
    #[wasm_bindgen]
    pub fn stagger(&mut self, elements: js_sys::Array, preset: &str, step: Option<f64>) -> Result<Promise, JsValue> {
        let preset = match preset.parse::<Preset>() {
            Ok(preset) => preset,
            Err(e) => return Ok(into_promise(Completion::rejected(e))),
        };
        let targets = elements
            .iter()
            .map(|value| value.dyn_into::<HtmlElement>().map(|el| self.target(el)))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| JsValue::from_str("stagger expects an array of HTML elements"))?;

        let options = self.config.tween_options(0.0);
        let step = step.unwrap_or(self.config.stagger);
        let all = animation::stagger(&mut *self.engine.borrow_mut(), &targets, step, move |engine, target| {
            preset.play(engine, target, options).into_completion()
        });
        self.launch(all)
    }

    // === Scroll triggers ===

    /// Call `callback` when the element scrolls into view
    #[wasm_bindgen]
    pub fn scroll_trigger(
        &mut self,
        element: HtmlElement,
        callback: js_sys::Function,
        threshold: Option<f64>,
        root_margin: Option<String>,
        once: Option<bool>,
    ) -> Result<(), JsValue> {
        let defaults = self.config.trigger_options();
        let options = TriggerOptions {
            threshold: threshold.unwrap_or(defaults.threshold),
            root_margin: root_margin.unwrap_or(defaults.root_margin),
            once: once.unwrap_or(defaults.once),
        };
        let target = self.target(element);
        on_visible(&self.observers, &mut self.registry, &target, &options, move || {
            if callback.call0(&JsValue::NULL).is_err() {
                tracing::warn!("scroll trigger callback threw");
            }
        })?;
        Ok(())
    }

    /// Play a preset the first time the element scrolls into view
    #[wasm_bindgen]
    pub fn scroll_reveal(&mut self, element: HtmlElement, preset: &str, delay: Option<f64>) -> Result<(), JsValue> {
        let preset = preset.parse::<Preset>()?;
        let target = self.target(element);
        let options = self.config.tween_options(delay.unwrap_or(0.0));
        let engine = self.engine.clone();
        let frames = self.frames.clone();
        let revealed = target.clone();

        on_visible(
            &self.observers,
            &mut self.registry,
            &target,
            &self.config.trigger_options(),
            move || {
                match engine.try_borrow_mut() {
                    Ok(mut engine) => {
                        preset.play(&mut *engine, &revealed, options);
                    }
                    Err(_) => {
                        tracing::warn!(preset = preset.name(), "engine busy, reveal skipped");
                        return;
                    }
                }
                if let Err(e) = frames.ensure_running() {
                    tracing::warn!(error = %e, "could not start frame loop");
                }
            },
        )?;
        Ok(())
    }

    /// Rotate the element's background gradient every `interval` milliseconds
    #[wasm_bindgen]
    pub fn cycle_background(&mut self, element: HtmlElement, interval: Option<f64>) -> Result<(), JsValue> {
        let target = self.target(element);
        animation::cycle_background(&mut *self.engine.borrow_mut(), &target, interval.unwrap_or(3000.0));
        self.frames.ensure_running()?;
        Ok(())
    }

    // === Lifecycle ===

    /// Disconnect every scroll trigger and stop every running animation
    #[wasm_bindgen]
    pub fn cleanup(&mut self) {
        self.registry.teardown_all(&mut *self.engine.borrow_mut());
    }

    #[wasm_bindgen]
    pub fn active_tweens(&self) -> u32 {
        self.engine.borrow().active_tweens() as u32
    }

    #[wasm_bindgen]
    pub fn registered_observers(&self) -> u32 {
        self.registry.len() as u32
    }
}
