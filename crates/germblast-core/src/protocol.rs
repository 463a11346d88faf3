//! Inbound event decoding and outbound framing.
//!
//! Inbound frames are decoded into [`Inbound`]; anything unrecognized or
//! malformed decodes to `None` and is dropped by the caller. Outbound
//! payloads are framed with [`envelope`].

use germblast_types::events;
use serde::Deserialize;
use serde_json::{Map, Value};

/// A decoded inbound event.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    /// Aim update, relayed to the screen untouched.
    GunMove(Value),
    /// Trigger pull, relayed to the screen untouched.
    GunShoot(Value),
    /// Ask the gun to recalibrate.
    GunCalibrate,
    /// Start a new game.
    GameStart,
    /// Advance the world clock.
    WorldStep,
    /// Resolve a shot at a field point.
    ScreenShoot {
        /// Field x coordinate.
        x: f64,
        /// Field y coordinate.
        y: f64,
        /// Probe half-size; a point probe when absent.
        radius: Option<f64>,
    },
    /// Finalize the current game.
    GameStop {
        /// Score counted by the screen.
        score: u32,
        /// Whether the screen forced the stop.
        force: bool,
    },
}

#[derive(Deserialize)]
struct ShootPayload {
    x: f64,
    y: f64,
    #[serde(default)]
    radius: Option<f64>,
}

#[derive(Deserialize)]
struct StopPayload {
    #[serde(default)]
    score: f64,
    #[serde(default)]
    force: bool,
}

impl Inbound {
    /// Decode a text frame.
    pub fn parse(text: &str) -> Option<Self> {
        let value: Value = serde_json::from_str(text).ok()?;
        Self::from_value(value)
    }

    /// Decode an already-parsed JSON object.
    pub fn from_value(value: Value) -> Option<Self> {
        let name = value.get("event")?.as_str()?.to_owned();
        match name.as_str() {
            events::GUN_MOVE => Some(Self::GunMove(value)),
            events::GUN_SHOOT => Some(Self::GunShoot(value)),
            events::GUN_CALIBRATE => Some(Self::GunCalibrate),
            events::SCREEN_GAME_START => Some(Self::GameStart),
            events::SCREEN_WORLD_STEP => Some(Self::WorldStep),
            events::SCREEN_SHOOT => {
                let shot: ShootPayload = serde_json::from_value(value).ok()?;
                Some(Self::ScreenShoot {
                    x: shot.x,
                    y: shot.y,
                    radius: shot.radius,
                })
            }
            events::SCREEN_GAME_STOP => {
                let stop: StopPayload = serde_json::from_value(value).ok()?;
                Some(Self::GameStop {
                    score: clamp_score(stop.score),
                    force: stop.force,
                })
            }
            _ => None,
        }
    }

    /// Wire name of the event.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::GunMove(_) => events::GUN_MOVE,
            Self::GunShoot(_) => events::GUN_SHOOT,
            Self::GunCalibrate => events::GUN_CALIBRATE,
            Self::GameStart => events::SCREEN_GAME_START,
            Self::WorldStep => events::SCREEN_WORLD_STEP,
            Self::ScreenShoot { .. } => events::SCREEN_SHOOT,
            Self::GameStop { .. } => events::SCREEN_GAME_STOP,
        }
    }
}

/// Screen-reported score as a whole number of points.
///
/// Fractions are dropped; negative and non-finite values count as 0 and
/// huge values saturate.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn clamp_score(score: f64) -> u32 {
    if score.is_nan() || score <= 0.0 {
        return 0;
    }
    if score >= f64::from(u32::MAX) {
        return u32::MAX;
    }
    score.trunc() as u32
}

/// Frame a payload for sending.
///
/// A payload that already names its event is sent as-is, which is how
/// relayed frames pass through. Anything else becomes
/// `{"event": name, ...payload}`; a non-object payload is dropped in
/// favour of the bare name.
pub fn envelope(name: &str, payload: Value) -> Value {
    match payload {
        Value::Object(map) if map.contains_key("event") => Value::Object(map),
        Value::Object(map) => {
            let mut framed = Map::with_capacity(map.len().saturating_add(1));
            framed.insert(String::from("event"), Value::String(name.to_owned()));
            framed.extend(map);
            Value::Object(framed)
        }
        _ => {
            let mut framed = Map::new();
            framed.insert(String::from("event"), Value::String(name.to_owned()));
            Value::Object(framed)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_shot_with_and_without_radius() {
        let shot = Inbound::parse(r#"{"event":"screen:shoot","x":0.5,"y":-0.25}"#);
        assert!(matches!(
            shot,
            Some(Inbound::ScreenShoot { radius: None, .. })
        ));

        let shot = Inbound::parse(r#"{"event":"screen:shoot","x":0,"y":0,"radius":0.1}"#);
        assert!(matches!(
            shot,
            Some(Inbound::ScreenShoot { radius: Some(_), .. })
        ));
    }

    #[test]
    fn stop_defaults_score_and_force() {
        let stop = Inbound::parse(r#"{"event":"screen:game_stop"}"#);
        assert_eq!(stop, Some(Inbound::GameStop { score: 0, force: false }));

        let stop = Inbound::parse(r#"{"event":"screen:game_stop","score":12,"force":true}"#);
        assert_eq!(stop, Some(Inbound::GameStop { score: 12, force: true }));
    }

    #[test]
    fn stop_accepts_any_numeric_score() {
        let stop = Inbound::parse(r#"{"event":"screen:game_stop","score":12.0}"#);
        assert_eq!(stop, Some(Inbound::GameStop { score: 12, force: false }));

        let stop = Inbound::parse(r#"{"event":"screen:game_stop","score":7.9}"#);
        assert_eq!(stop, Some(Inbound::GameStop { score: 7, force: false }));

        let stop = Inbound::parse(r#"{"event":"screen:game_stop","score":-3}"#);
        assert_eq!(stop, Some(Inbound::GameStop { score: 0, force: false }));

        let stop = Inbound::parse(r#"{"event":"screen:game_stop","score":1e12}"#);
        assert_eq!(stop, Some(Inbound::GameStop { score: u32::MAX, force: false }));

        // A non-numeric score is still a malformed frame.
        assert!(Inbound::parse(r#"{"event":"screen:game_stop","score":"lots"}"#).is_none());
    }

    #[test]
    fn relays_keep_the_whole_frame() {
        let frame = json!({ "event": "gun:move", "x": 0.1, "y": 0.2, "extra": [1, 2] });
        let parsed = Inbound::from_value(frame.clone());
        assert_eq!(parsed, Some(Inbound::GunMove(frame)));
    }

    #[test]
    fn unknown_and_malformed_frames_are_dropped() {
        assert!(Inbound::parse("not json").is_none());
        assert!(Inbound::parse(r#"{"x":1}"#).is_none());
        assert!(Inbound::parse(r#"{"event":7}"#).is_none());
        assert!(Inbound::parse(r#"{"event":"screen:dance"}"#).is_none());
        assert!(Inbound::parse(r#"{"event":"screen:shoot","x":"left","y":0}"#).is_none());
        assert!(Inbound::parse(r#"{"event":"screen:shoot","y":0}"#).is_none());
    }

    #[test]
    fn envelope_prepends_name() {
        let framed = envelope("screen:killed", json!({ "killed": [], "score": 0 }));
        assert_eq!(framed, json!({ "event": "screen:killed", "killed": [], "score": 0 }));
    }

    #[test]
    fn envelope_keeps_named_payload() {
        let relayed = json!({ "event": "gun:shoot", "x": 1 });
        assert_eq!(envelope("gun:shoot", relayed.clone()), relayed);
    }

    #[test]
    fn envelope_of_empty_payload() {
        assert_eq!(envelope("gun:disconnected", Value::Null), json!({ "event": "gun:disconnected" }));
        assert_eq!(envelope("gun:disconnected", json!({})), json!({ "event": "gun:disconnected" }));
    }
}
