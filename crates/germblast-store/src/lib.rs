//! Persistence for the Germblast session server.
//!
//! Sessions talk to storage only through the [`GameStore`] trait: game
//! rows (create, start, score, stop), pairing tokens, and promo checks.
//! [`MemoryStore`] is the in-process implementation.
//!
//! # Modules
//!
//! - [`store`] -- The [`GameStore`] trait
//! - [`memory`] -- [`MemoryStore`], hash maps behind `tokio` locks
//! - [`error`] -- Shared error types

pub mod error;
pub mod memory;
pub mod store;

// Re-export primary types for convenience.
pub use error::StoreError;
pub use memory::MemoryStore;
pub use store::GameStore;
