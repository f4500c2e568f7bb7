//! Per-identity tour flag persistence.

pub mod memory;
pub mod pg_flag_store;
pub mod schema;
