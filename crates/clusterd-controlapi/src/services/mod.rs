//!
//! # Control api services
//!
//! Handlers never keep state between calls, all coordination happens in the store.
//!
mod cluster;
pub mod filter;
pub mod redact;
pub mod validate;

pub use cluster::ControlApi;
