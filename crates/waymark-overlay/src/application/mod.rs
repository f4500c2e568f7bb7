//! Application layer: the orchestrator, the launch gate and the session
//! event loop.

pub mod launch;
pub mod orchestrator;
mod persistence;
pub mod session;
