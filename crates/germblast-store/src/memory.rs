//! In-process [`GameStore`] backed by locked hash maps.
//!
//! Used by the binary when no external database is configured and by
//! every test in the workspace. Rows live for the lifetime of the
//! process.

use std::collections::{HashMap, HashSet};

use chrono::{TimeDelta, Utc};
use germblast_types::{Game, GameId, GameType, Token, UserId};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::StoreError;
use crate::store::GameStore;

/// Hours a pairing token stays valid.
const TOKEN_TTL_HOURS: i64 = 24;

/// Points multiplier for promo holders.
const PROMO_POINTS_MULTIPLIER: u32 = 2;

/// Volatile store for games, tokens, and promo users.
#[derive(Debug, Default)]
pub struct MemoryStore {
    games: RwLock<HashMap<GameId, Game>>,
    tokens: RwLock<HashMap<String, Token>>,
    promo_users: RwLock<HashSet<UserId>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Give `user_id` a promo.
    pub async fn grant_promo(&self, user_id: UserId) {
        self.promo_users.write().await.insert(user_id);
    }

    /// Look up an issued token.
    pub async fn token(&self, token: &str) -> Option<Token> {
        self.tokens.read().await.get(token).cloned()
    }

    /// Number of game rows.
    pub async fn game_count(&self) -> usize {
        self.games.read().await.len()
    }

    /// Apply `f` to a game row and return the updated copy.
    async fn update_game<F>(&self, game_id: GameId, f: F) -> Result<Game, StoreError>
    where
        F: FnOnce(&mut Game) + Send,
    {
        let mut games = self.games.write().await;
        let game = games
            .get_mut(&game_id)
            .ok_or(StoreError::GameNotFound { game_id })?;
        f(game);
        Ok(game.clone())
    }
}

impl GameStore for MemoryStore {
    async fn create_game(&self, user_id: UserId, game_type: GameType) -> Result<Game, StoreError> {
        let game = Game {
            id: GameId::new(),
            user_id,
            game_type,
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
            score: 0,
            score_front: 0,
            score_back: 0,
            score_ok: 0,
            shoot_count: 0,
        };
        self.games.write().await.insert(game.id, game.clone());
        tracing::debug!(game_id = %game.id, user_id = %user_id, %game_type, "Created game");
        Ok(game)
    }

    async fn start_game(&self, game_id: GameId) -> Result<Game, StoreError> {
        let now = Utc::now();
        self.update_game(game_id, |game| game.started_at = Some(now))
            .await
    }

    async fn stop_game(
        &self,
        game_id: GameId,
        front_score: u32,
        has_promo: bool,
    ) -> Result<Game, StoreError> {
        let now = Utc::now();
        let game = self
            .update_game(game_id, |game| {
                game.finished_at = Some(now);
                game.score_front = front_score;
                game.score_back = game.score;
                game.score = game.score_back;
                game.score_ok = if has_promo {
                    game.score.saturating_mul(PROMO_POINTS_MULTIPLIER)
                } else {
                    game.score
                };
            })
            .await?;
        tracing::debug!(
            game_id = %game_id,
            score = game.score,
            score_front = game.score_front,
            points = game.score_ok,
            "Stopped game"
        );
        Ok(game)
    }

    async fn inc_score(&self, game_id: GameId, delta: u32) -> Result<Game, StoreError> {
        self.update_game(game_id, |game| game.score = game.score.saturating_add(delta))
            .await
    }

    async fn inc_shoot_count(&self, game_id: GameId, delta: u32) -> Result<Game, StoreError> {
        self.update_game(game_id, |game| {
            game.shoot_count = game.shoot_count.saturating_add(delta);
        })
        .await
    }

    async fn get_game(&self, game_id: GameId) -> Result<Game, StoreError> {
        self.games
            .read()
            .await
            .get(&game_id)
            .cloned()
            .ok_or(StoreError::GameNotFound { game_id })
    }

    async fn user_has_promo(&self, user_id: UserId) -> Result<bool, StoreError> {
        Ok(self.promo_users.read().await.contains(&user_id))
    }

    async fn save_token(&self, user_id: UserId) -> Result<Token, StoreError> {
        let expires_at = Utc::now()
            .checked_add_signed(TimeDelta::hours(TOKEN_TTL_HOURS))
            .ok_or_else(|| StoreError::Unavailable(String::from("token expiry overflows")))?;
        let token = Token {
            token: Uuid::new_v4().simple().to_string(),
            user_id,
            expires_at,
        };
        self.tokens
            .write()
            .await
            .insert(token.token.clone(), token.clone());
        Ok(token)
    }
}
