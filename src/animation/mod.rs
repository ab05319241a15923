//! Tween engine
//!
//! Easing curves, per-target transform composition, the frame-driven
//! scheduler and the orchestration built on top of it (stagger, counters,
//! presets).

mod completion;
mod compositor;
mod counter;
mod easing;
mod engine;
mod presets;
mod sequencer;
mod tween;

pub use completion::{join_all, Completion, Settled, TweenOutcome};
pub use compositor::{TransformComponent, TransformCompositor, TransformState};
pub use counter::parse_displayed;
pub use easing::{ease, Easing};
pub use engine::{Cancelled, Engine};
pub use presets::{cycle_background, Preset, BACKGROUND_GRADIENTS};
pub use sequencer::stagger;
pub use tween::{Property, PropertySpec, Range, TweenHandle, TweenId, TweenState};
