//! Waymark — Narration.
//!
//! Reads the current tour step aloud through an external synthesizer while
//! guaranteeing that at most one playback is ever alive.

pub mod controller;
pub mod script;

pub use controller::{NarrationController, NarrationEvent, DEFAULT_SYNTHESIS_TIMEOUT};
pub use script::narration_script;
