pub mod component;
pub mod model;
pub mod view;

pub use component::{MenuInit, MenuMsg, RadialMenu};
pub use model::{Hit, MenuOutput, Satellite, SatelliteGeometry, State};
pub use view::{MenuArt, draw};

/// Drawing area size at which the menu renders at scale 1.
pub const REFERENCE_SIZE: f64 = 480.0;
pub const ICON_SIZE: i32 = 256;
pub const CENTER_RADIUS: f64 = 44.0;
pub const SATELLITE_RADIUS: f64 = 34.0;
pub const LABEL_FONT_SIZE: f64 = 12.0;
pub const LABEL_GAP: f64 = 8.0;
pub const CENTER_ENTRANCE_MS: u64 = 320;
pub const MIN_SCALE: f64 = 0.5;
pub const MAX_SCALE: f64 = 2.0;
