//! Domain layer for step sequencing.

pub mod events;
pub mod registry;
pub mod sequencer;
pub mod templates;
