//! Event names and outbound payloads of the device protocol.
//!
//! Every frame on the wire is a JSON object whose `event` key names the
//! event and whose remaining keys are the payload. Inbound names are
//! matched by the session; outbound payloads below are serialized and
//! wrapped with their name before sending.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::GameType;
use crate::ids::{GameId, MicrobeId};
use crate::structs::MicrobeView;

// ---------------------------------------------------------------------------
// Event names
// ---------------------------------------------------------------------------

/// Screen joined (outbound to screen).
pub const SCREEN_CONNECTED: &str = "screen:connected";
/// Gun paired (outbound to screen).
pub const GUN_CONNECTED: &str = "gun:connected";
/// Gun left (outbound to screen).
pub const GUN_DISCONNECTED: &str = "gun:disconnected";
/// Gun aim update (relayed gun to screen).
pub const GUN_MOVE: &str = "gun:move";
/// Gun trigger pull (relayed gun to screen).
pub const GUN_SHOOT: &str = "gun:shoot";
/// Calibration request (inbound from either device, outbound to gun).
pub const GUN_CALIBRATE: &str = "gun:calibrate";
/// Start a game (inbound from screen).
pub const SCREEN_GAME_START: &str = "screen:game_start";
/// Game started (outbound to screen).
pub const SCREEN_GAME_STARTED: &str = "screen:game_started";
/// Game started (outbound to gun).
pub const GUN_GAME_STARTED: &str = "gun:game_started";
/// World tick request (inbound from screen).
pub const SCREEN_WORLD_STEP: &str = "screen:world_step";
/// Epoch rolled over (outbound to screen).
pub const SCREEN_WORLD_CHANGED: &str = "screen:world_changed";
/// Resolved shot at a point (inbound from screen).
pub const SCREEN_SHOOT: &str = "screen:shoot";
/// Microbes killed by a shot (outbound to screen).
pub const SCREEN_KILLED: &str = "screen:killed";
/// Stop the game (inbound from screen).
pub const SCREEN_GAME_STOP: &str = "screen:game_stop";
/// Game finalized (outbound to screen).
pub const SCREEN_GAME_STOPPED: &str = "screen:game_stopped";
/// Game finalized (outbound to gun).
pub const GUN_GAME_STOPPED: &str = "gun:game_stopped";

// ---------------------------------------------------------------------------
// Payloads
// ---------------------------------------------------------------------------

/// Payload of `screen:connected`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ScreenConnected {
    /// Whether the player holds a promo.
    pub has_promo: bool,
    /// Pairing token, sent to gun screens only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub token: Option<String>,
    /// Instance domain the gun should connect to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub domain: Option<String>,
}

/// Payload of `gun:connected`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GunConnected {
    /// Whether the player holds a promo.
    pub has_promo: bool,
    /// Nominal game length in seconds.
    pub game_duration: u64,
}

/// Payload of `screen:game_started`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GameStarted {
    /// Nominal game length in seconds.
    pub game_duration: u64,
    /// Whether the player holds a promo.
    pub has_promo: bool,
    /// The new game row.
    pub game_id: GameId,
    /// Device class of the screen.
    #[serde(rename = "type")]
    pub game_type: GameType,
    /// Epoch number of the first batch.
    pub epoch: u32,
    /// The first batch.
    pub microbes: Vec<MicrobeView>,
}

/// Payload of `gun:game_started` and `gun:calibrate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PromoFlag {
    /// Whether the player holds a promo.
    pub has_promo: bool,
}

/// Payload of `screen:world_changed`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WorldChanged {
    /// Epoch number after the change.
    pub epoch: u32,
    /// Newly spawned microbes.
    pub new_microbes: Vec<MicrobeView>,
    /// Ids retired with their epoch.
    pub removed_microbes: Vec<MicrobeId>,
}

/// Payload of `screen:killed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Killed {
    /// Ids killed by the shot.
    pub killed: Vec<MicrobeId>,
    /// Cumulative game score after the shot.
    pub score: u32,
}

/// Payload of `screen:game_stopped` and `gun:game_stopped`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GameStopped {
    /// Final authoritative score.
    pub score: u32,
    /// Points credited to the player.
    pub points: u32,
    /// Echo of the screen's `force` flag.
    pub force: bool,
}
