pub mod catalog;
pub mod config;
pub mod fsutil;
pub mod gitstatus;
pub mod lifecycle;
pub mod logging;
pub mod model;
pub mod params;
pub mod presets;
pub mod provision;
pub mod registry;
pub mod remote_state;
pub mod templates;
pub mod tui;

mod tui_shell;
