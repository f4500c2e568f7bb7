//! Waymark Core — shared tour abstractions.
//!
//! This crate defines the tour model, the collaborator traits the tour engine
//! talks to, and the error type shared by every component. It contains no
//! infrastructure code.

pub mod clock;
pub mod error;
pub mod event;
pub mod flags;
pub mod geometry;
pub mod model;
pub mod ports;
