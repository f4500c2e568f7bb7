//! Waymark — Guided Tour Overlay.
//!
//! Binds the step sequencer, the auto-advance scheduler, the narration
//! controller and the widget controller into one state machine, and talks to
//! navigation, flag persistence and certificate presentation on their
//! behalf.

pub mod application;
pub mod domain;
