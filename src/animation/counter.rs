//! Integer counters rendered as text

use super::engine::Engine;
use super::tween::{Property, PropertySpec, Range, TweenHandle};
use crate::config::TweenOptions;
use crate::target::Target;

/// Parse the number shown in `text`, ignoring every non-digit character.
///
/// `"7+"` reads as 7, `"1,204 users"` as 1204; anything without digits
/// (or too large to fit) reads as 0.
pub fn parse_displayed(text: &str) -> i64 {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(0)
}

impl<T: Target> Engine<T> {
    /// Count from the number currently displayed on `target` up (or down)
    /// to `end`, rewriting the text each frame with `suffix` appended
    pub fn animate_counter(&mut self, target: &T, end: i64, options: TweenOptions, suffix: &str) -> TweenHandle {
        let start = target.text().map(|t| parse_displayed(&t)).unwrap_or(0);
        let mut spec = PropertySpec::new();
        spec.insert(
            Property::Counter {
                suffix: suffix.to_string(),
            },
            Range::new(start as f64, end as f64),
        );
        tracing::debug!(element = target.key().0, start, end, "counter scheduled");
        self.animate(target, spec, options)
    }
}
