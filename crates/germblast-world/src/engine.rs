//! The spawn engine: epochs of microbes on a grid.
//!
//! One engine lives for one game. It owns every microbe spawned during
//! the game, decides when a new epoch is due, retires old epochs, and
//! resolves shots against the live set.
//!
//! # Epoch schedule
//!
//! The first epoch is generated when the game starts. On desktop screens
//! the second epoch arrives after `second_epoch_period_ms` and nothing is
//! retired; from then on every `epoch_period_ms` the previous epoch is
//! retired and a new one spawned, so two epochs overlap on screen.
//! Mobile screens use `epoch_period_ms` throughout and retire the
//! *current* epoch each time, so only one epoch is ever visible.
//!
//! All randomness comes from a seeded [`StdRng`], so the same seed and
//! the same sequence of calls reproduce the same field.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use germblast_types::{GameType, MicrobeId, MicrobeKind, MicrobeView};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::config::{EpochProfile, SpawnConfig};
use crate::error::WorldError;
use crate::grid::{Cell, Grid};
use crate::microbe::Microbe;

/// Redraws allowed before a placement accepts a colliding cell.
const MAX_REDRAWS: u32 = 10;

/// Candidates damaged by a single promo shot.
const PROMO_SHOT_SPREAD: usize = 4;

/// Result of a world tick that changed the field.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldChange {
    /// Microbes spawned by the new epoch.
    pub new_microbes: Vec<MicrobeView>,
    /// Microbes retired with their epoch.
    pub removed_microbes: Vec<MicrobeId>,
}

/// Result of resolving one shot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShotOutcome {
    /// Points earned by the shot (one per kill).
    pub score: u32,
    /// Microbes killed by the shot.
    pub killed: Vec<MicrobeId>,
}

/// Procedural spawner and hit resolver for one game.
#[derive(Debug, Clone)]
pub struct SpawnEngine {
    game_type: GameType,
    profile: EpochProfile,
    kinds: Vec<MicrobeKind>,
    grid: Grid,
    seed: u64,
    rng: StdRng,
    epoch: u32,
    microbes: Vec<Microbe>,
    last_epoch_time: Option<DateTime<Utc>>,
}

impl SpawnEngine {
    /// Build an engine for a device class.
    pub fn new(config: &SpawnConfig, game_type: GameType, seed: u64) -> Result<Self, WorldError> {
        config.validate()?;
        let grid = Grid::from_config(config)?;

        Ok(Self {
            game_type,
            profile: config.profile(game_type),
            kinds: config.microbe_types.clone(),
            grid,
            seed,
            rng: StdRng::seed_from_u64(seed),
            epoch: 0,
            microbes: Vec::new(),
            last_epoch_time: None,
        })
    }

    /// Current epoch number (0 before the first epoch).
    pub const fn epoch(&self) -> u32 {
        self.epoch
    }

    /// Seed the engine was built with.
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Grid geometry.
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Microbes in creation order.
    pub fn microbes(&self) -> &[Microbe] {
        &self.microbes
    }

    /// Microbes that are still targets.
    pub fn alive(&self) -> impl Iterator<Item = &Microbe> {
        self.microbes.iter().filter(|m| m.is_alive())
    }

    /// Wire views of every live microbe.
    pub fn dump_microbes(&self) -> Vec<MicrobeView> {
        self.alive().map(Microbe::view).collect()
    }

    /// Pick a cell for `microbe`, avoiding live microbes and the reserved cell.
    ///
    /// Gives up after [`MAX_REDRAWS`] redraws and keeps the last draw,
    /// so a crowded grid can end up with two microbes in one cell.
    pub fn set_position(&mut self, microbe: &mut Microbe) {
        let occupied: HashSet<Cell> = self.alive().map(Microbe::cell).collect();
        let reserved = self.grid.reserved_cell();

        let mut cell = self.draw_cell();
        for _ in 0..MAX_REDRAWS {
            if cell != reserved && !occupied.contains(&cell) {
                break;
            }
            cell = self.draw_cell();
        }

        microbe.place(cell, self.grid.cell_center(cell));
    }

    /// Start a new epoch and spawn its batch.
    ///
    /// Each microbe is placed against every live microbe, including the
    /// ones spawned earlier in the same batch.
    pub fn gen_microbes(&mut self, has_promo: bool, now: DateTime<Utc>) -> Vec<MicrobeView> {
        self.epoch = self.epoch.saturating_add(1);
        self.last_epoch_time = Some(now);

        let count = self.profile.batch_size(has_promo);
        let mut batch = Vec::new();
        for _ in 0..count {
            let Some(kind) = self.draw_kind() else {
                continue;
            };
            let mut microbe = Microbe::new(self.epoch, kind);
            self.set_position(&mut microbe);
            batch.push(microbe.view());
            self.microbes.push(microbe);
        }

        debug!(
            epoch = self.epoch,
            spawned = batch.len(),
            has_promo,
            "Generated epoch"
        );
        batch
    }

    /// Advance the world if the current epoch has run its course.
    ///
    /// Returns `None` when no threshold has been crossed. A returned
    /// change always carries a new batch; its removal list is empty while
    /// a desktop game is still filling its first two epochs.
    pub fn check_world(
        &mut self,
        game_started_at: DateTime<Utc>,
        now: DateTime<Utc>,
        has_promo: bool,
    ) -> Option<WorldChange> {
        let last = *self.last_epoch_time.get_or_insert(game_started_at);
        let elapsed_ms = now.signed_duration_since(last).num_milliseconds();
        let mobile = self.game_type.is_mobile();

        if self.epoch >= 2 || mobile {
            if elapsed_ms < threshold(self.profile.epoch_period_ms) {
                return None;
            }
            let retired_epoch = if mobile {
                self.epoch
            } else {
                self.epoch.saturating_sub(1)
            };
            let removed_microbes = self.retire_epoch(retired_epoch);
            self.compact();
            let new_microbes = self.gen_microbes(has_promo, now);
            Some(WorldChange {
                new_microbes,
                removed_microbes,
            })
        } else {
            if elapsed_ms < threshold(self.profile.second_epoch_period_ms) {
                return None;
            }
            let new_microbes = self.gen_microbes(has_promo, now);
            Some(WorldChange {
                new_microbes,
                removed_microbes: Vec::new(),
            })
        }
    }

    /// Resolve a shot at `(x, y)`.
    ///
    /// Only the nearest live microbe is hit-tested. On a hit it dies, and
    /// with a promo so do up to three more of its nearest neighbours.
    pub fn shoot(&mut self, x: f64, y: f64, has_promo: bool, radius: Option<f64>) -> ShotOutcome {
        let mut nearest: Vec<(f64, usize)> = self
            .microbes
            .iter()
            .enumerate()
            .filter(|(_, m)| m.is_alive())
            .map(|(idx, m)| {
                let (mx, my) = m.position();
                ((x - mx).hypot(y - my), idx)
            })
            .collect();
        nearest.sort_by(|a, b| a.0.total_cmp(&b.0));
        nearest.truncate(if has_promo { PROMO_SHOT_SPREAD } else { 1 });

        let is_hit = nearest
            .first()
            .and_then(|&(_, idx)| self.microbes.get(idx))
            .is_some_and(|m| m.is_hit(x, y, radius));

        let mut killed = Vec::new();
        if is_hit {
            for &(_, idx) in &nearest {
                if let Some(microbe) = self.microbes.get_mut(idx) {
                    if microbe.damage() == 0 {
                        killed.push(microbe.id());
                    }
                }
            }
        }

        self.compact();
        ShotOutcome {
            score: u32::try_from(killed.len()).unwrap_or(u32::MAX),
            killed,
        }
    }

    /// Mark every live microbe of `epoch` as retired and return their ids.
    fn retire_epoch(&mut self, epoch: u32) -> Vec<MicrobeId> {
        self.microbes
            .iter_mut()
            .filter(|m| m.is_alive() && m.epoch() == epoch)
            .map(|m| {
                m.kill();
                m.id()
            })
            .collect()
    }

    /// Drop microbes that are no longer alive.
    fn compact(&mut self) {
        self.microbes.retain(Microbe::is_alive);
    }

    fn draw_cell(&mut self) -> Cell {
        Cell {
            x: self.rng.random_range(0..self.grid.cells_x()),
            y: self.rng.random_range(0..self.grid.cells_y()),
        }
    }

    fn draw_kind(&mut self) -> Option<MicrobeKind> {
        let idx = self.rng.random_range(0..self.kinds.len());
        self.kinds.get(idx).copied()
    }
}

/// Milliseconds as a signed threshold comparable with `TimeDelta`.
fn threshold(ms: u64) -> i64 {
    i64::try_from(ms).unwrap_or(i64::MAX)
}
