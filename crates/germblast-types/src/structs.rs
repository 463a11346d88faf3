//! Record and wire structs shared across the workspace.
//!
//! [`Game`] and [`Token`] mirror the rows owned by the store collaborator.
//! [`MicrobeKind`] is a catalog entry from configuration and
//! [`MicrobeView`] is the projection of a live microbe sent to the screen.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::GameType;
use crate::ids::{GameId, MicrobeId, UserId};

// ---------------------------------------------------------------------------
// Game
// ---------------------------------------------------------------------------

/// A persisted game row.
///
/// Created when the screen starts a game, mutated by every shot and
/// kill, and finalized when the screen reports the game over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Game {
    /// Row identifier.
    pub id: GameId,
    /// Owner of the game.
    pub user_id: UserId,
    /// Device class the game was played on.
    pub game_type: GameType,
    /// When the row was created.
    pub created_at: DateTime<Utc>,
    /// When play started; `None` until the store starts the game.
    pub started_at: Option<DateTime<Utc>>,
    /// When the game was finalized; `None` while in progress.
    pub finished_at: Option<DateTime<Utc>>,
    /// Authoritative score.
    pub score: u32,
    /// Score reported by the screen when it stopped the game.
    pub score_front: u32,
    /// Score counted by the server from confirmed kills.
    pub score_back: u32,
    /// Points credited to the player.
    pub score_ok: u32,
    /// Number of shots fired.
    pub shoot_count: u32,
}

impl Game {
    /// Whether the game can no longer be mutated.
    ///
    /// A game is finished once the store recorded a stop, or once the
    /// wall-clock time since start reaches `duration_secs + grace_secs`.
    pub fn is_finished(&self, duration_secs: u64, grace_secs: u64, now: DateTime<Utc>) -> bool {
        if self.finished_at.is_some() {
            return true;
        }
        let Some(started_at) = self.started_at else {
            return false;
        };
        let limit_secs = i64::try_from(duration_secs.saturating_add(grace_secs)).unwrap_or(i64::MAX);
        let limit = TimeDelta::try_seconds(limit_secs).unwrap_or(TimeDelta::MAX);
        now.signed_duration_since(started_at) >= limit
    }
}

// ---------------------------------------------------------------------------
// Token
// ---------------------------------------------------------------------------

/// A pairing token issued by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Token {
    /// The opaque token string.
    pub token: String,
    /// User the token was issued for.
    pub user_id: UserId,
    /// Expiry instant.
    pub expires_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Microbes
// ---------------------------------------------------------------------------

/// A microbe shape from the configured catalog.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MicrobeKind {
    /// Catalog number of the shape (always positive).
    #[serde(rename = "type")]
    pub kind: u32,
    /// Hit box width in field units.
    pub width: f64,
    /// Hit box height in field units.
    pub height: f64,
}

/// The screen-facing projection of a microbe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MicrobeView {
    /// Epoch the microbe was spawned in.
    pub epoch: u32,
    /// Microbe identifier.
    pub id: MicrobeId,
    /// Catalog number of the shape.
    #[serde(rename = "type")]
    pub kind: u32,
    /// Center x coordinate.
    pub x: f64,
    /// Center y coordinate.
    pub y: f64,
    /// Remaining hit points.
    pub hp: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_game(started_at: Option<DateTime<Utc>>) -> Game {
        Game {
            id: GameId::new(),
            user_id: UserId::new(),
            game_type: GameType::Mouse,
            created_at: Utc::now(),
            started_at,
            finished_at: None,
            score: 0,
            score_front: 0,
            score_back: 0,
            score_ok: 0,
            shoot_count: 0,
        }
    }

    #[test]
    fn unstarted_game_is_not_finished() {
        let game = make_game(None);
        assert!(!game.is_finished(60, 10, Utc::now()));
    }

    #[test]
    fn game_finishes_after_duration_plus_grace() {
        let start = Utc::now();
        let game = make_game(Some(start));

        assert!(!game.is_finished(60, 10, start + TimeDelta::seconds(69)));
        assert!(game.is_finished(60, 10, start + TimeDelta::seconds(70)));
    }

    #[test]
    fn stopped_game_is_finished_immediately() {
        let start = Utc::now();
        let mut game = make_game(Some(start));
        game.finished_at = Some(start);
        assert!(game.is_finished(60, 10, start));
    }

    #[test]
    fn microbe_kind_uses_type_key() {
        let kind: Result<MicrobeKind, _> =
            serde_json::from_str(r#"{"type": 3, "width": 0.2, "height": 0.1}"#);
        assert!(kind.is_ok());
        assert_eq!(kind.map(|k| k.kind).ok(), Some(3));
    }
}
