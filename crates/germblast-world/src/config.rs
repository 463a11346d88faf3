//! Spawn configuration: grid geometry, microbe catalog, epoch timing.
//!
//! Mirrors the `game.spawn` section of `germblast-config.yaml`. All
//! fields have defaults so a partial section is valid.

use germblast_types::{GameType, MicrobeKind};
use serde::Deserialize;

use crate::error::WorldError;

/// Batch sizes and thresholds for one device class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct EpochProfile {
    /// Microbes per epoch.
    pub n_in_epoch: u32,
    /// Microbes per epoch while the player holds a promo.
    pub n_in_epoch_promo: u32,
    /// Steady-state epoch length in milliseconds.
    pub epoch_period_ms: u64,
    /// Delay before the second epoch, in milliseconds.
    ///
    /// Only the desktop profile reads this; mobile always runs on
    /// `epoch_period_ms`.
    pub second_epoch_period_ms: u64,
}

impl EpochProfile {
    /// Batch size for one epoch.
    pub const fn batch_size(&self, has_promo: bool) -> u32 {
        if has_promo {
            self.n_in_epoch_promo
        } else {
            self.n_in_epoch
        }
    }
}

/// Everything a [`SpawnEngine`](crate::SpawnEngine) needs at construction.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SpawnConfig {
    /// Cell width in field units (the field spans `-1..1`).
    #[serde(default = "default_cell_size")]
    pub cell_width: f64,

    /// Cell height in field units.
    #[serde(default = "default_cell_size")]
    pub cell_height: f64,

    /// Height of the HUD strip at the top of the field, excluded from spawning.
    #[serde(default = "default_top_bar_size")]
    pub top_bar_size: f64,

    /// Microbe shapes to choose from.
    #[serde(default = "default_microbe_types")]
    pub microbe_types: Vec<MicrobeKind>,

    /// Timing profile for mouse and gun screens.
    #[serde(default = "default_desktop_profile")]
    pub desktop: EpochProfile,

    /// Timing profile for mobile screens.
    #[serde(default = "default_mobile_profile")]
    pub mobile: EpochProfile,

    /// Fixed RNG seed. When absent each engine seeds from the clock.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            cell_width: default_cell_size(),
            cell_height: default_cell_size(),
            top_bar_size: default_top_bar_size(),
            microbe_types: default_microbe_types(),
            desktop: default_desktop_profile(),
            mobile: default_mobile_profile(),
            seed: None,
        }
    }
}

impl SpawnConfig {
    /// Timing profile for a device class.
    pub const fn profile(&self, game_type: GameType) -> EpochProfile {
        if game_type.is_mobile() {
            self.mobile
        } else {
            self.desktop
        }
    }

    /// Check the catalog and cell sizes.
    ///
    /// Grid bounds are checked separately when the grid is built.
    pub fn validate(&self) -> Result<(), WorldError> {
        if self.microbe_types.is_empty() {
            return Err(WorldError::EmptyCatalog);
        }
        for kind in &self.microbe_types {
            if kind.kind == 0 {
                return Err(WorldError::InvalidKind {
                    kind: kind.kind,
                    reason: String::from("type number must be positive"),
                });
            }
            if kind.width <= 0.0 || kind.height <= 0.0 {
                return Err(WorldError::InvalidKind {
                    kind: kind.kind,
                    reason: format!("dimensions {}x{} must be positive", kind.width, kind.height),
                });
            }
        }
        if self.cell_width <= 0.0 || self.cell_height <= 0.0 {
            return Err(WorldError::InvalidGrid {
                reason: format!(
                    "cell size {}x{} must be positive",
                    self.cell_width, self.cell_height
                ),
            });
        }
        Ok(())
    }
}

const fn default_cell_size() -> f64 {
    0.25
}

const fn default_top_bar_size() -> f64 {
    0.15
}

fn default_microbe_types() -> Vec<MicrobeKind> {
    vec![
        MicrobeKind { kind: 1, width: 0.18, height: 0.18 },
        MicrobeKind { kind: 2, width: 0.2, height: 0.14 },
        MicrobeKind { kind: 3, width: 0.14, height: 0.2 },
        MicrobeKind { kind: 4, width: 0.16, height: 0.16 },
    ]
}

const fn default_desktop_profile() -> EpochProfile {
    EpochProfile {
        n_in_epoch: 6,
        n_in_epoch_promo: 10,
        epoch_period_ms: 3000,
        second_epoch_period_ms: 5000,
    }
}

const fn default_mobile_profile() -> EpochProfile {
    EpochProfile {
        n_in_epoch: 4,
        n_in_epoch_promo: 8,
        epoch_period_ms: 2000,
        second_epoch_period_ms: 2000,
    }
}
