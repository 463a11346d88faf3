//! Error types for the store layer.
//!
//! Every failure a [`GameStore`](crate::GameStore) reports is a
//! [`StoreError`]. Callers treat any of them as fatal to the event that
//! triggered the call.

use germblast_types::GameId;

/// Errors that can occur in the store layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No game row exists for the id.
    #[error("game not found: {game_id}")]
    GameNotFound {
        /// The id that was looked up.
        game_id: GameId,
    },

    /// The backing store could not complete the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
