//! Browser bindings: DOM targets, IntersectionObserver, the frame loop,
//! console logging and promise conversion

mod console;
mod frame_loop;
mod observer;
mod promise;
mod target;

pub use console::{init_logging, ConsoleWriter};
pub use frame_loop::FrameLoop;
pub use observer::{DomObserver, DomObserverHost};
pub use promise::into_promise;
pub use target::{DomTarget, KeyAllocator, PerformanceClock};
