//! Scroll-triggered playback
//!
//! Visibility bindings, the geometry they are evaluated against, and the
//! registry that tears them down.

pub mod geometry;
pub mod registry;
pub mod visibility;

pub use geometry::{intersection_ratio, Length, Rect, RootMargin};
pub use registry::{Registry, Teardown};
pub use visibility::{
    on_visible, HeadlessObserver, HeadlessObserverHost, IntersectionRecord, Observer, ObserverHost,
    TriggerHandle, VisibilityBinding,
};
