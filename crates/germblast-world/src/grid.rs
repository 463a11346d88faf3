//! Spawn grid geometry.
//!
//! The play field spans `-1..1` on both axes. The HUD strip at the top
//! is excluded, and the bottom edge is inset by half a cell so microbes
//! never straddle it. The usable area is cut into whole cells; one cell
//! in the top-left corner sits under a fixed on-screen widget and is
//! reserved.

use crate::config::SpawnConfig;
use crate::error::WorldError;

/// Decimal places kept on microbe coordinates.
const COORD_SCALE: f64 = 1_000_000.0;

/// Integer grid coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    /// Column, counted from the left edge.
    pub x: u32,
    /// Row, counted from the bottom edge.
    pub y: u32,
}

/// Bounds and cell layout of the spawn area.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
    cell_width: f64,
    cell_height: f64,
    cells_x: u32,
    cells_y: u32,
}

impl Grid {
    /// Build the grid from the configured cell size and HUD height.
    pub fn from_config(config: &SpawnConfig) -> Result<Self, WorldError> {
        let x_min = -1.0;
        let x_max = 1.0;
        let y_min = -1.0 + config.cell_height / 2.0;
        let y_max = 1.0 - config.top_bar_size;

        let cells_x = whole_cells(x_max - x_min, config.cell_width);
        let cells_y = whole_cells(y_max - y_min, config.cell_height);
        if cells_x == 0 || cells_y == 0 {
            return Err(WorldError::InvalidGrid {
                reason: format!(
                    "cell size {}x{} leaves {cells_x}x{cells_y} usable cells",
                    config.cell_width, config.cell_height
                ),
            });
        }

        Ok(Self {
            x_min,
            x_max,
            y_min,
            y_max,
            cell_width: config.cell_width,
            cell_height: config.cell_height,
            cells_x,
            cells_y,
        })
    }

    /// Number of columns.
    pub const fn cells_x(&self) -> u32 {
        self.cells_x
    }

    /// Number of rows.
    pub const fn cells_y(&self) -> u32 {
        self.cells_y
    }

    /// Left and right bounds.
    pub const fn x_bounds(&self) -> (f64, f64) {
        (self.x_min, self.x_max)
    }

    /// Bottom and top bounds.
    pub const fn y_bounds(&self) -> (f64, f64) {
        (self.y_min, self.y_max)
    }

    /// The top-left cell, kept free for the HUD widget.
    pub const fn reserved_cell(&self) -> Cell {
        Cell {
            x: 0,
            y: self.cells_y.saturating_sub(1),
        }
    }

    /// Center of a cell, rounded to six decimal places.
    pub fn cell_center(&self, cell: Cell) -> (f64, f64) {
        let x = self.x_min + f64::from(cell.x) * self.cell_width + self.cell_width / 2.0;
        let y = self.y_min + f64::from(cell.y) * self.cell_height + self.cell_height / 2.0;
        (round_coord(x), round_coord(y))
    }
}

/// Round a coordinate to six decimal places.
pub fn round_coord(value: f64) -> f64 {
    (value * COORD_SCALE).round() / COORD_SCALE
}

/// `floor(span / size)`, clamped to `0..=u32::MAX`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn whole_cells(span: f64, size: f64) -> u32 {
    let cells = (span / size).floor();
    if cells.is_nan() || cells <= 0.0 {
        0
    } else {
        cells.min(f64::from(u32::MAX)) as u32
    }
}
