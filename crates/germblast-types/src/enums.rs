//! Enumeration types shared by the server and its clients.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// The device class a screen reported when it connected.
///
/// The class selects the spawn timing constants and batch sizes, and
/// whether the screen expects to be paired with a separate gun device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum GameType {
    /// Desktop browser aiming with the mouse.
    Mouse,
    /// Screen paired with a phone acting as a light gun.
    Gun,
    /// Single mobile device that is both screen and input.
    Mobile,
}

impl GameType {
    /// Whether the mobile timing profile applies.
    pub const fn is_mobile(self) -> bool {
        matches!(self, Self::Mobile)
    }

    /// Wire name of the device class.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Mouse => "mouse",
            Self::Gun => "gun",
            Self::Mobile => "mobile",
        }
    }
}

impl core::fmt::Display for GameType {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The role a connection plays inside a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum DeviceRole {
    /// Renders the play field; owns the session.
    Screen,
    /// Supplies aim and trigger input.
    Gun,
}

impl core::fmt::Display for DeviceRole {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Screen => f.write_str("screen"),
            Self::Gun => f.write_str("gun"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn game_type_wire_names() {
        let json = serde_json::to_string(&GameType::Mobile).ok();
        assert_eq!(json.as_deref(), Some("\"mobile\""));
        let parsed: Option<GameType> = serde_json::from_str("\"gun\"").ok();
        assert_eq!(parsed, Some(GameType::Gun));
    }

    #[test]
    fn only_mobile_is_mobile() {
        assert!(GameType::Mobile.is_mobile());
        assert!(!GameType::Mouse.is_mobile());
        assert!(!GameType::Gun.is_mobile());
    }
}
