pub mod component;
pub mod model;
pub mod view;

pub use component::{EffectSlider, SliderInit, SliderMsg, SliderOutput};
pub use model::{SliderError, SliderState, ValueRange};

pub const TRACK_HEIGHT: f64 = 6.0;
pub const THUMB_RADIUS: f64 = 11.0;
/// Horizontal inset so the thumb stays fully visible at both ends.
pub const TRACK_INSET: f64 = THUMB_RADIUS + 3.0;
pub const SLIDER_HEIGHT: i32 = 32;
