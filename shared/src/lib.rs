//! Shared types for the manuscript tracking system
//!
//! Contains the domain model exchanged between the orchestration engine,
//! its source adapters, and downstream report consumers. Engine-internal
//! types stay in the tracker crate.

pub mod errors;
pub mod logging;
pub mod types;

pub use errors::*;
pub use types::*;
