//! A single spawn target.
//!
//! Shape is fixed at creation; position is assigned once by the engine's
//! placement step. Health only ever goes down, and a retired microbe is
//! never brought back.

use germblast_types::{MicrobeId, MicrobeKind, MicrobeView};

use crate::grid::Cell;

/// Hit points every microbe spawns with.
const START_HP: u32 = 1;

/// A spawned microbe.
#[derive(Debug, Clone, PartialEq)]
pub struct Microbe {
    id: MicrobeId,
    epoch: u32,
    kind: MicrobeKind,
    cell: Cell,
    x: f64,
    y: f64,
    hp: u32,
    killed: bool,
}

impl Microbe {
    /// Create an unplaced microbe for `epoch`.
    pub fn new(epoch: u32, kind: MicrobeKind) -> Self {
        Self {
            id: MicrobeId::new(),
            epoch,
            kind,
            cell: Cell { x: 0, y: 0 },
            x: 0.0,
            y: 0.0,
            hp: START_HP,
            killed: false,
        }
    }

    /// Fix the microbe at a grid cell and its (rounded) center.
    pub(crate) const fn place(&mut self, cell: Cell, center: (f64, f64)) {
        self.cell = cell;
        self.x = center.0;
        self.y = center.1;
    }

    /// Microbe identifier.
    pub const fn id(&self) -> MicrobeId {
        self.id
    }

    /// Epoch the microbe belongs to.
    pub const fn epoch(&self) -> u32 {
        self.epoch
    }

    /// Catalog shape.
    pub const fn kind(&self) -> MicrobeKind {
        self.kind
    }

    /// Grid cell.
    pub const fn cell(&self) -> Cell {
        self.cell
    }

    /// Center coordinates.
    pub const fn position(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    /// Remaining hit points.
    pub const fn hp(&self) -> u32 {
        self.hp
    }

    /// Axis-aligned hit test against the microbe's box.
    ///
    /// Without a radius the probe is a point and must lie strictly inside
    /// the box; a probe on an edge misses. With a radius the probe is a
    /// square of half-side `radius`, and any overlap counts, including
    /// edges that merely touch.
    pub fn is_hit(&self, x: f64, y: f64, radius: Option<f64>) -> bool {
        let left = self.x - self.kind.width / 2.0;
        let right = self.x + self.kind.width / 2.0;
        let bottom = self.y - self.kind.height / 2.0;
        let top = self.y + self.kind.height / 2.0;

        match radius {
            Some(r) => {
                !(x - r > right || x + r < left || y - r > top || y + r < bottom)
            }
            None => left < x && x < right && bottom < y && y < top,
        }
    }

    /// Drop hit points to zero and return the new value.
    pub const fn damage(&mut self) -> u32 {
        self.hp = 0;
        self.hp
    }

    /// Retire the microbe at the end of its epoch.
    pub const fn kill(&mut self) {
        self.killed = true;
    }

    /// Whether the microbe still counts as a target.
    pub const fn is_alive(&self) -> bool {
        self.hp > 0 && !self.killed
    }

    /// Wire projection sent to the screen.
    pub const fn view(&self) -> MicrobeView {
        MicrobeView {
            epoch: self.epoch,
            id: self.id,
            kind: self.kind.kind,
            x: self.x,
            y: self.y,
            hp: self.hp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_at(x: f64, y: f64) -> Microbe {
        let mut microbe = Microbe::new(1, MicrobeKind { kind: 1, width: 0.2, height: 0.2 });
        microbe.place(Cell { x: 0, y: 0 }, (x, y));
        microbe
    }

    #[test]
    fn point_inside_is_a_hit() {
        let microbe = square_at(0.0, 0.0);
        assert!(microbe.is_hit(0.05, -0.05, None));
    }

    #[test]
    fn point_on_edge_is_not_a_hit() {
        let microbe = square_at(0.0, 0.0);
        assert!(!microbe.is_hit(0.1, 0.0, None));
        assert!(!microbe.is_hit(0.0, -0.1, None));
    }

    #[test]
    fn touching_radius_is_a_hit() {
        let microbe = square_at(0.0, 0.0);
        // Probe box [0.1, 0.3] touches the microbe's right edge at 0.1.
        assert!(microbe.is_hit(0.2, 0.0, Some(0.1)));
    }

    #[test]
    fn radius_miss_on_one_axis_is_a_miss() {
        let microbe = square_at(0.0, 0.0);
        assert!(!microbe.is_hit(0.0, 0.5, Some(0.1)));
        assert!(!microbe.is_hit(-0.5, 0.0, Some(0.1)));
    }

    #[test]
    fn damage_is_idempotent() {
        let mut microbe = square_at(0.0, 0.0);
        assert!(microbe.is_alive());
        assert_eq!(microbe.damage(), 0);
        assert_eq!(microbe.damage(), 0);
        assert!(!microbe.is_alive());
    }

    #[test]
    fn killed_microbe_is_not_alive() {
        let mut microbe = square_at(0.0, 0.0);
        microbe.kill();
        assert_eq!(microbe.hp(), 1);
        assert!(!microbe.is_alive());
    }

    #[test]
    fn view_carries_wire_fields() {
        let microbe = square_at(0.25, -0.5);
        let view = microbe.view();
        assert_eq!(view.id, microbe.id());
        assert_eq!(view.kind, 1);
        assert_eq!(view.epoch, 1);
        assert_eq!(view.hp, 1);
    }
}
