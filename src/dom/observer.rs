//! IntersectionObserver-backed observer host

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit};

use super::target::DomTarget;
use crate::config::TriggerOptions;
use crate::error::{MotionError, MotionResult};
use crate::trigger::{IntersectionRecord, Observer, ObserverHost, RootMargin, VisibilityBinding};

type EntriesCallback = Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>;

/// One IntersectionObserver watching one element
pub struct DomObserver {
    observer: IntersectionObserver,
    element: Element,
    // Must outlive the observer
    _callback: EntriesCallback,
}

impl Observer for DomObserver {
    fn unobserve(&self) {
        self.observer.unobserve(&self.element);
    }

    fn disconnect(&self) {
        self.observer.disconnect();
    }
}

impl Drop for DomObserver {
    fn drop(&mut self) {
        self.observer.disconnect();
    }
}

#[derive(Debug, Default)]
pub struct DomObserverHost;

impl ObserverHost<DomTarget> for DomObserverHost {
    fn observe(
        &self,
        target: &DomTarget,
        _margin: &RootMargin,
        options: &TriggerOptions,
        binding: Rc<RefCell<VisibilityBinding>>,
    ) -> MotionResult<Rc<dyn Observer>> {
        let callback: EntriesCallback = Closure::new(move |entries: js_sys::Array, _: IntersectionObserver| {
            let records: Vec<IntersectionRecord> = entries
                .iter()
                .filter_map(|entry| entry.dyn_into::<IntersectionObserverEntry>().ok())
                .map(|entry| IntersectionRecord::new(entry.intersection_ratio(), entry.is_intersecting()))
                .collect();
            match binding.try_borrow_mut() {
                Ok(mut binding) => {
                    binding.handle(&records);
                }
                Err(_) => tracing::warn!("visibility binding busy, dropping records"),
            }
        });

        // Repeating triggers also need the exit crossing to re-arm
        let thresholds = if options.once {
            js_sys::Array::of1(&JsValue::from_f64(options.threshold))
        } else {
            js_sys::Array::of2(&JsValue::from_f64(0.0), &JsValue::from_f64(options.threshold))
        };
        let init = IntersectionObserverInit::new();
        init.set_threshold(&thresholds);
        init.set_root_margin(&options.root_margin);

        let observer = IntersectionObserver::new_with_options(callback.as_ref().unchecked_ref(), &init)
            .map_err(|e| MotionError::configuration(format!("IntersectionObserver rejected options: {:?}", e)))?;
        let element: Element = target.element().clone().into();
        observer.observe(&element);

        Ok(Rc::new(DomObserver {
            observer,
            element,
            _callback: callback,
        }))
    }
}
