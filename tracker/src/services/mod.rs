//! Service implementations
//!
//! Real implementations of the injectable traits: durable JSON state on
//! disk, and an offline adapter that replays captured portal data.

pub mod replay;
pub mod state_store;

pub use replay::ReplayAdapter;
pub use state_store::JsonStateStore;
