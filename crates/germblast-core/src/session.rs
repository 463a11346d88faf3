//! Per-pair session state machine.
//!
//! A [`Session`] ties one screen connection to at most one gun connection
//! and drives the games played between them. It owns the current game
//! row and the [`SpawnEngine`] of that game, talks to the store for
//! every persisted change, and emits events back to the two devices.
//!
//! # States
//!
//! ```text
//!  created --gun joins--> paired
//!     ^                     |
//!     +----gun leaves-------+
//!
//!  created | paired | game_over --game_start--> in_game --game_stop--> game_over
//!  any --screen leaves--> closed
//! ```
//!
//! Handlers that touch the store stage their changes locally and commit
//! them only after every store call they depend on has succeeded, so a
//! failed call leaves the session exactly as it was.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use germblast_store::GameStore;
use germblast_types::events::{self, GameStarted, GameStopped, GunConnected, Killed, PromoFlag};
use germblast_types::{
    ConnectionId, Game, GameType, ScreenConnected, SessionToken, UserId, WorldChanged,
};
use germblast_world::SpawnEngine;
use serde_json::{Value, json};
use tracing::{debug, info};

use crate::config::{AppConfig, GameConfig};
use crate::error::SessionError;
use crate::protocol::Inbound;
use crate::transport::ConnectionHandle;

/// Settings every session reads; built once from [`AppConfig`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSettings {
    /// Game timing and spawn settings.
    pub game: GameConfig,
    /// Instance domain advertised to gun screens, if sticky routing applies.
    pub sticky_domain: Option<String>,
}

impl SessionSettings {
    /// Derive session settings from the loaded configuration.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            game: config.game.clone(),
            sticky_domain: config.sticky_session.sticky_domain(),
        }
    }
}

/// Lifecycle state of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Screen joined, no gun.
    Created,
    /// Screen and gun joined, no game running.
    Paired,
    /// A game is running.
    InGame,
    /// The last game was stopped.
    GameOver,
    /// The screen left; the session is being torn down.
    Closed,
}

impl SessionState {
    /// Lowercase name for logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Paired => "paired",
            Self::InGame => "in_game",
            Self::GameOver => "game_over",
            Self::Closed => "closed",
        }
    }
}

impl core::fmt::Display for SessionState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One screen, an optional gun, and the games they play.
pub struct Session<S> {
    token: SessionToken,
    user_id: UserId,
    game_type: GameType,
    state: SessionState,
    screen: ConnectionHandle,
    gun: Option<ConnectionHandle>,
    game: Option<Game>,
    engine: Option<SpawnEngine>,
    store: Arc<S>,
    settings: Arc<SessionSettings>,
}

impl<S> core::fmt::Debug for Session<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Session")
            .field("token", &self.token)
            .field("user_id", &self.user_id)
            .field("game_type", &self.game_type)
            .field("state", &self.state)
            .field("screen", &self.screen.id())
            .field("gun", &self.gun.as_ref().map(ConnectionHandle::id))
            .field("game", &self.game.as_ref().map(|g| g.id))
            .finish_non_exhaustive()
    }
}

impl<S: GameStore> Session<S> {
    /// Create a session for a freshly joined screen.
    pub const fn new(
        token: SessionToken,
        user_id: UserId,
        game_type: GameType,
        screen: ConnectionHandle,
        store: Arc<S>,
        settings: Arc<SessionSettings>,
    ) -> Self {
        Self {
            token,
            user_id,
            game_type,
            state: SessionState::Created,
            screen,
            gun: None,
            game: None,
            engine: None,
            store,
            settings,
        }
    }

    // -----------------------------------------------------------------------
    // Accessors
    // -----------------------------------------------------------------------

    /// Pairing token.
    pub const fn token(&self) -> &SessionToken {
        &self.token
    }

    /// Owner of the session.
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Device class of the screen.
    pub const fn game_type(&self) -> GameType {
        self.game_type
    }

    /// Current lifecycle state.
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Screen connection id.
    pub const fn screen_id(&self) -> ConnectionId {
        self.screen.id()
    }

    /// Gun connection id, once a gun has joined.
    pub fn gun_id(&self) -> Option<ConnectionId> {
        self.gun.as_ref().map(ConnectionHandle::id)
    }

    /// The current (or last) game row.
    pub const fn game(&self) -> Option<&Game> {
        self.game.as_ref()
    }

    /// The current game's spawn engine.
    pub const fn engine(&self) -> Option<&SpawnEngine> {
        self.engine.as_ref()
    }

    // -----------------------------------------------------------------------
    // Membership
    // -----------------------------------------------------------------------

    /// Greet the screen once the session is registered.
    ///
    /// Gun screens additionally receive the pairing token and, with
    /// sticky routing, the instance domain their gun must connect to.
    pub async fn screen_joined(&mut self) -> Result<(), SessionError> {
        let has_promo = self.store.user_has_promo(self.user_id).await?;

        let mut payload = ScreenConnected {
            has_promo,
            token: None,
            domain: None,
        };
        if self.game_type == GameType::Gun {
            payload.token = Some(self.token.to_string());
            payload.domain.clone_from(&self.settings.sticky_domain);
        }

        self.screen.emit(events::SCREEN_CONNECTED, &payload);
        Ok(())
    }

    /// Attach the gun and tell the screen.
    pub async fn attach_gun(&mut self, gun: ConnectionHandle) -> Result<(), SessionError> {
        if self.state == SessionState::Closed {
            return Err(SessionError::Closed {
                token: self.token.clone(),
            });
        }
        if self.gun.is_some() {
            return Err(SessionError::GunAlreadyAttached {
                token: self.token.clone(),
            });
        }

        let has_promo = self.store.user_has_promo(self.user_id).await?;

        info!(token = %self.token, connection_id = %gun.id(), "Gun attached");
        self.gun = Some(gun);
        if self.state == SessionState::Created {
            self.state = SessionState::Paired;
        }

        self.screen.emit(
            events::GUN_CONNECTED,
            &GunConnected {
                has_promo,
                game_duration: self.settings.game.duration_secs,
            },
        );
        Ok(())
    }

    /// Detach the gun if `connection_id` is the attached one.
    ///
    /// Returns whether a gun was detached. The session stays open.
    pub fn detach_gun(&mut self, connection_id: ConnectionId) -> bool {
        if self.gun_id() != Some(connection_id) {
            return false;
        }
        self.gun = None;
        if self.state == SessionState::Paired {
            self.state = SessionState::Created;
        }
        info!(token = %self.token, %connection_id, "Gun detached");
        self.screen.emit_value(events::GUN_DISCONNECTED, json!({}));
        true
    }

    /// Tear the session down after the screen left.
    ///
    /// Closes the gun connection; further events are ignored.
    pub fn close(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        if let Some(gun) = self.gun.take() {
            gun.close();
        }
        self.screen.close();
        self.engine = None;
        self.state = SessionState::Closed;
        info!(token = %self.token, "Session closed");
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    /// Handle one inbound event at the current time.
    pub async fn handle(&mut self, event: Inbound) -> Result<(), SessionError> {
        self.handle_at(event, Utc::now()).await
    }

    /// Handle one inbound event as if it arrived at `now`.
    ///
    /// Events whose preconditions do not hold are ignored.
    pub async fn handle_at(&mut self, event: Inbound, now: DateTime<Utc>) -> Result<(), SessionError> {
        if self.state == SessionState::Closed {
            return Ok(());
        }
        if self.settings.game.log_events {
            info!(token = %self.token, event = event.name(), payload = ?event, "Inbound event");
        }

        match event {
            Inbound::GunMove(frame) => {
                self.relay(events::GUN_MOVE, frame);
                Ok(())
            }
            Inbound::GunShoot(frame) => {
                self.relay(events::GUN_SHOOT, frame);
                Ok(())
            }
            Inbound::GunCalibrate => self.calibrate().await,
            Inbound::GameStart => self.start_game(now).await,
            Inbound::WorldStep => self.world_step(now).await,
            Inbound::ScreenShoot { x, y, radius } => self.shoot(x, y, radius, now).await,
            Inbound::GameStop { score, force } => self.stop_game(score, force, now).await,
        }
    }

    fn relay(&self, name: &str, frame: Value) {
        self.screen.emit_value(name, frame);
    }

    async fn calibrate(&self) -> Result<(), SessionError> {
        let Some(gun) = &self.gun else {
            return Ok(());
        };
        let has_promo = self.store.user_has_promo(self.user_id).await?;
        gun.emit(events::GUN_CALIBRATE, &PromoFlag { has_promo });
        Ok(())
    }

    async fn start_game(&mut self, now: DateTime<Utc>) -> Result<(), SessionError> {
        if self.state == SessionState::InGame && !self.is_finished(now) {
            debug!(token = %self.token, "Game start ignored, game in progress");
            return Ok(());
        }

        let seed = self
            .settings
            .game
            .spawn
            .seed
            .unwrap_or_else(|| now.timestamp_micros().unsigned_abs());
        let mut engine = SpawnEngine::new(&self.settings.game.spawn, self.game_type, seed)?;

        let game = self.store.create_game(self.user_id, self.game_type).await?;
        let has_promo = self.store.user_has_promo(self.user_id).await?;
        engine.gen_microbes(has_promo, now);
        let game = self.store.start_game(game.id).await?;

        info!(
            token = %self.token,
            game_id = %game.id,
            game_type = %self.game_type,
            seed,
            has_promo,
            "Game started"
        );

        let payload = GameStarted {
            game_duration: self.settings.game.duration_secs,
            has_promo,
            game_id: game.id,
            game_type: self.game_type,
            epoch: engine.epoch(),
            microbes: engine.dump_microbes(),
        };
        self.engine = Some(engine);
        self.game = Some(game);
        self.state = SessionState::InGame;

        self.screen.emit(events::SCREEN_GAME_STARTED, &payload);
        if let Some(gun) = &self.gun {
            gun.emit(events::GUN_GAME_STARTED, &PromoFlag { has_promo });
        }
        Ok(())
    }

    async fn world_step(&mut self, now: DateTime<Utc>) -> Result<(), SessionError> {
        if self.state != SessionState::InGame {
            return Ok(());
        }
        let Some(started_at) = self.game.as_ref().map(|g| g.started_at.unwrap_or(now)) else {
            return Ok(());
        };

        let has_promo = self.store.user_has_promo(self.user_id).await?;
        let Some(engine) = self.engine.as_mut() else {
            return Ok(());
        };
        let Some(change) = engine.check_world(started_at, now, has_promo) else {
            return Ok(());
        };

        debug!(
            token = %self.token,
            epoch = engine.epoch(),
            spawned = change.new_microbes.len(),
            retired = change.removed_microbes.len(),
            "World changed"
        );
        self.screen.emit(
            events::SCREEN_WORLD_CHANGED,
            &WorldChanged {
                epoch: engine.epoch(),
                new_microbes: change.new_microbes,
                removed_microbes: change.removed_microbes,
            },
        );
        Ok(())
    }

    async fn shoot(
        &mut self,
        x: f64,
        y: f64,
        radius: Option<f64>,
        now: DateTime<Utc>,
    ) -> Result<(), SessionError> {
        if self.state != SessionState::InGame || self.is_finished(now) {
            return Ok(());
        }
        let (Some(game_id), Some(engine)) = (self.game.as_ref().map(|g| g.id), self.engine.as_ref())
        else {
            return Ok(());
        };
        let mut staged = engine.clone();

        let mut game = self.store.inc_shoot_count(game_id, 1).await?;
        let has_promo = self.store.user_has_promo(self.user_id).await?;
        let outcome = staged.shoot(x, y, has_promo, radius);
        if !outcome.killed.is_empty() {
            game = self.store.inc_score(game_id, outcome.score).await?;
        }

        self.engine = Some(staged);
        self.game = Some(game);

        if outcome.killed.is_empty() {
            return Ok(());
        }
        let score = self.game.as_ref().map_or(0, |g| g.score);
        debug!(token = %self.token, killed = outcome.killed.len(), score, "Shot landed");
        self.screen.emit(
            events::SCREEN_KILLED,
            &Killed {
                killed: outcome.killed,
                score,
            },
        );
        Ok(())
    }

    async fn stop_game(
        &mut self,
        front_score: u32,
        force: bool,
        now: DateTime<Utc>,
    ) -> Result<(), SessionError> {
        if self.state != SessionState::InGame {
            return Ok(());
        }
        let Some(game_id) = self.game.as_ref().map(|g| g.id) else {
            return Ok(());
        };

        let current = self.store.get_game(game_id).await?;
        if current.is_finished(
            self.settings.game.duration_secs,
            self.settings.game.finish_grace_secs,
            now,
        ) {
            debug!(token = %self.token, %game_id, "Game stop ignored, game already finished");
            return Ok(());
        }

        let has_promo = self.store.user_has_promo(self.user_id).await?;
        let game = self.store.stop_game(game_id, front_score, has_promo).await?;

        let payload = GameStopped {
            score: game.score,
            points: game.score_ok,
            force,
        };
        info!(
            token = %self.token,
            %game_id,
            score = game.score,
            points = game.score_ok,
            front_score,
            force,
            "Game stopped"
        );
        self.game = Some(game);
        self.state = SessionState::GameOver;

        self.screen.emit(events::SCREEN_GAME_STOPPED, &payload);
        if let Some(gun) = &self.gun {
            gun.emit(events::GUN_GAME_STOPPED, &payload);
        }
        Ok(())
    }

    fn is_finished(&self, now: DateTime<Utc>) -> bool {
        self.game.as_ref().is_none_or(|g| {
            g.is_finished(
                self.settings.game.duration_secs,
                self.settings.game.finish_grace_secs,
                now,
            )
        })
    }
}
