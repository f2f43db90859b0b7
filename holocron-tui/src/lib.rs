//! HOLOCRON TUI library exports.

pub mod config;
pub mod error;
pub mod events;
pub mod keys;
pub mod logging;
pub mod nav;
pub mod notifier;
pub mod state;
pub mod theme;
pub mod views;
pub mod widgets;
