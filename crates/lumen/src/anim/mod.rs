//! Runtime-independent animation primitives: spring and eased curves, progress cells and
//! the staggered timelines built from them.

pub mod choreography;
pub mod easing;
pub mod progress;
pub mod spring;

pub use choreography::{Breathing, Choreography, TrackId};
pub use easing::Easing;
pub use progress::{Motion, Progress, Sample, Track};
pub use spring::{DampingKind, Spring, SpringError};
