//! Domain layer for the tour overlay.

pub mod events;
pub mod settings;
pub mod state;
