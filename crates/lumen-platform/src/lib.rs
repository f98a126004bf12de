pub mod haptics;
pub mod icon;
pub mod macros;
pub mod photo;
pub mod process;
