pub mod app;
pub mod chrome;
pub mod menu;
pub mod slider;
pub mod theme;
pub mod window;
