use js_sys::Promise;
use wasm_bindgen::JsValue;

use crate::animation::Completion;

/// Expose a completion to JavaScript.
///
/// Resolves with `"finished"` or `"skipped"`, rejects with the error text.
/// A cancelled completion leaves the promise pending forever.
pub fn into_promise(completion: Completion) -> Promise {
    Promise::new(&mut |resolve, reject| {
        completion.on_settle(move |result| {
            let delivered = match result {
                Ok(outcome) => resolve.call1(&JsValue::UNDEFINED, &JsValue::from_str(outcome.as_str())),
                Err(e) => reject.call1(&JsValue::UNDEFINED, &JsValue::from(e.clone())),
            };
            if delivered.is_err() {
                tracing::warn!("promise settlement callback threw");
            }
        });
    })
}
