//! The store collaborator seen by sessions.
//!
//! A session never touches game rows directly; it goes through
//! [`GameStore`]. Each method is one round trip and may fail with a
//! [`StoreError`].

use std::future::Future;

use germblast_types::{Game, GameId, GameType, Token, UserId};

use crate::error::StoreError;

/// Persistence operations for games, tokens, and promo entitlement.
///
/// Implementations must be cheap to share: sessions hold the store
/// behind an `Arc` and call it from many connection tasks at once.
pub trait GameStore: Send + Sync + 'static {
    /// Create a game row for `user_id` on a device class.
    fn create_game(
        &self,
        user_id: UserId,
        game_type: GameType,
    ) -> impl Future<Output = Result<Game, StoreError>> + Send;

    /// Mark a game as started now and return the updated row.
    fn start_game(&self, game_id: GameId) -> impl Future<Output = Result<Game, StoreError>> + Send;

    /// Finalize a game with the screen's reported score.
    ///
    /// The authoritative score is the server-counted one; promo holders
    /// are credited double points.
    fn stop_game(
        &self,
        game_id: GameId,
        front_score: u32,
        has_promo: bool,
    ) -> impl Future<Output = Result<Game, StoreError>> + Send;

    /// Add confirmed kills to the server-side score and return the row.
    fn inc_score(
        &self,
        game_id: GameId,
        delta: u32,
    ) -> impl Future<Output = Result<Game, StoreError>> + Send;

    /// Add fired shots to the shot counter and return the row.
    fn inc_shoot_count(
        &self,
        game_id: GameId,
        delta: u32,
    ) -> impl Future<Output = Result<Game, StoreError>> + Send;

    /// Read a game row.
    fn get_game(&self, game_id: GameId) -> impl Future<Output = Result<Game, StoreError>> + Send;

    /// Whether the user currently holds a promo.
    fn user_has_promo(&self, user_id: UserId)
    -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Issue a pairing token for `user_id`.
    fn save_token(&self, user_id: UserId) -> impl Future<Output = Result<Token, StoreError>> + Send;
}
