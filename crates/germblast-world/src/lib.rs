//! Microbe spawning and hit resolution for Germblast.
//!
//! This crate models the play field of one game: a grid of cells over
//! the `-1..1` field, microbes placed into those cells in timed epochs,
//! and the geometry that decides whether a shot lands.
//!
//! # Modules
//!
//! - [`config`] -- Grid geometry, microbe catalog, and per-device epoch
//!   timing, loaded from the `game.spawn` config section.
//! - [`engine`] -- [`SpawnEngine`]: epoch generation and retirement,
//!   collision-avoiding placement, and shot resolution.
//! - [`error`] -- Error types for invalid spawn configuration.
//! - [`grid`] -- Cell layout, bounds, and the reserved HUD cell.
//! - [`microbe`] -- A single target with its box hit test.

pub mod config;
pub mod engine;
pub mod error;
pub mod grid;
pub mod microbe;

// Re-export primary types at crate root.
pub use config::{EpochProfile, SpawnConfig};
pub use engine::{ShotOutcome, SpawnEngine, WorldChange};
pub use error::WorldError;
pub use grid::{Cell, Grid, round_coord};
pub use microbe::Microbe;
