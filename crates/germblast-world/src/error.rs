//! Error types for the `germblast-world` crate.
//!
//! Spawning itself never fails; every [`WorldError`] comes from
//! validating a spawn configuration before an engine is built.

/// Errors that can occur when building a spawn engine.
#[derive(Debug, thiserror::Error)]
pub enum WorldError {
    /// The microbe catalog has no entries.
    #[error("microbe catalog is empty")]
    EmptyCatalog,

    /// A catalog entry has a non-positive type number or dimension.
    #[error("invalid microbe kind {kind}: {reason}")]
    InvalidKind {
        /// The offending catalog number.
        kind: u32,
        /// What is wrong with it.
        reason: String,
    },

    /// The grid geometry leaves no usable cells.
    #[error("invalid grid: {reason}")]
    InvalidGrid {
        /// Explanation of what is wrong with the geometry.
        reason: String,
    },
}
