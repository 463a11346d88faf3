//! Shared type definitions for the Germblast session server.
//!
//! This crate is the single source of truth for identifiers, enums, and
//! records used across the workspace. Wire types flow downstream to
//! `TypeScript` via `ts-rs` for the screen and gun clients.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers and the session token
//! - [`enums`] -- Device class and connection role
//! - [`events`] -- Wire event names and outbound payloads
//! - [`structs`] -- Game and token rows, microbe catalog and wire view

pub mod enums;
pub mod events;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{DeviceRole, GameType};
pub use events::{
    GameStarted, GameStopped, GunConnected, Killed, PromoFlag, ScreenConnected, WorldChanged,
};
pub use ids::{ConnectionId, GameId, MicrobeId, SessionToken, UserId};
pub use structs::{Game, MicrobeKind, MicrobeView, Token};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // Files are written to `bindings/` relative to the crate root.
        use ts_rs::TS;

        // IDs
        let _ = crate::ids::UserId::export_all();
        let _ = crate::ids::GameId::export_all();
        let _ = crate::ids::MicrobeId::export_all();
        let _ = crate::ids::ConnectionId::export_all();
        let _ = crate::ids::SessionToken::export_all();

        // Enums
        let _ = crate::enums::GameType::export_all();
        let _ = crate::enums::DeviceRole::export_all();

        // Structs
        let _ = crate::structs::Game::export_all();
        let _ = crate::structs::Token::export_all();
        let _ = crate::structs::MicrobeKind::export_all();
        let _ = crate::structs::MicrobeView::export_all();

        // Outbound payloads
        let _ = crate::events::ScreenConnected::export_all();
        let _ = crate::events::GunConnected::export_all();
        let _ = crate::events::GameStarted::export_all();
        let _ = crate::events::PromoFlag::export_all();
        let _ = crate::events::WorldChanged::export_all();
        let _ = crate::events::Killed::export_all();
        let _ = crate::events::GameStopped::export_all();
    }
}
