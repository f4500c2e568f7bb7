//! Waymark — Tour Step Sequencing.
//!
//! Owns the ordered step list and the current index of a running tour, and
//! resolves which template a tour runs.

pub mod domain;
