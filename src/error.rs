//! Error taxonomy shared by the engine and the browser surface

use wasm_bindgen::JsValue;

pub type MotionResult<T> = Result<T, MotionError>;

/// Errors reported through completion signals and fallible setup calls.
///
/// Cloneable so a settled signal can hand the same error to every listener.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum MotionError {
    /// Caller mistake: unknown easing, bad duration, malformed margin, ...
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The target is no longer attached to the document.
    #[error("target unavailable: {0}")]
    TargetUnavailable(String),
}

impl MotionError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn target_unavailable(msg: impl Into<String>) -> Self {
        Self::TargetUnavailable(msg.into())
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}

impl From<MotionError> for JsValue {
    fn from(err: MotionError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}
