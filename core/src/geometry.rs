//! Pure footprint geometry shared by placement validation, ghost previews,
//! and replenishment.

use serde::{Deserialize, Serialize};

use crate::{Facing, GridPos, ShapeKind};

/// Relative cell offset measured from a footprint's base cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Offset {
    dx: i32,
    dy: i32,
}

impl Offset {
    /// Creates a new relative offset.
    #[must_use]
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    /// Column component of the offset.
    #[must_use]
    pub const fn dx(&self) -> i32 {
        self.dx
    }

    /// Row component of the offset.
    #[must_use]
    pub const fn dy(&self) -> i32 {
        self.dy
    }

    /// Rotates the offset clockwise by the facing's quarter-turn count.
    ///
    /// One clockwise quarter-turn maps `(dx, dy)` to `(dy, -dx)`.
    #[must_use]
    pub fn rotated(self, facing: Facing) -> Self {
        let mut dx = self.dx;
        let mut dy = self.dy;
        for _ in 0..facing.quarter_turns() {
            let next_dx = dy;
            dy = -dx;
            dx = next_dx;
        }
        Self { dx, dy }
    }
}

const L_CELLS: [Offset; 3] = [Offset::new(0, 0), Offset::new(1, 0), Offset::new(0, 1)];
const RECT_2X2_CELLS: [Offset; 4] = [
    Offset::new(0, 0),
    Offset::new(1, 0),
    Offset::new(0, 1),
    Offset::new(1, 1),
];

/// Canonical relative cells of a shape at [`Facing::Right`].
#[must_use]
pub const fn shape_cells(kind: ShapeKind) -> &'static [Offset] {
    match kind {
        ShapeKind::L => &L_CELLS,
        ShapeKind::Rect2x2 => &RECT_2X2_CELLS,
    }
}

/// Computes the absolute cells a shape occupies at the given base and facing.
///
/// Total over its domain; every kind and facing produce a non-empty set.
#[must_use]
pub fn footprint(kind: ShapeKind, base: GridPos, facing: Facing) -> Vec<GridPos> {
    shape_cells(kind)
        .iter()
        .map(|offset| base.offset_by(offset.rotated(facing)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{footprint, shape_cells, Offset};
    use crate::{Facing, GridPos, ShapeKind};

    const ALL_FACINGS: [Facing; 4] = [Facing::Right, Facing::Down, Facing::Left, Facing::Up];
    const ALL_KINDS: [ShapeKind; 2] = [ShapeKind::L, ShapeKind::Rect2x2];

    #[test]
    fn one_quarter_turn_swaps_components_with_sign_flip() {
        assert_eq!(Offset::new(1, 0).rotated(Facing::Down), Offset::new(0, -1));
        assert_eq!(Offset::new(0, 1).rotated(Facing::Down), Offset::new(1, 0));
    }

    #[test]
    fn four_quarter_turns_form_a_group_action() {
        for kind in ALL_KINDS {
            for offset in shape_cells(kind) {
                let full_turn = offset
                    .rotated(Facing::Down)
                    .rotated(Facing::Down)
                    .rotated(Facing::Down)
                    .rotated(Facing::Down);
                assert_eq!(full_turn, *offset, "four quarter-turns must be identity");
            }
        }
    }

    #[test]
    fn footprint_matches_canonical_cells_at_facing_right() {
        let cells = footprint(ShapeKind::L, GridPos::new(4, 7), Facing::Right);
        assert_eq!(
            cells,
            vec![GridPos::new(4, 7), GridPos::new(5, 7), GridPos::new(4, 8)],
        );
    }

    #[test]
    fn rect_footprint_stays_square_under_rotation() {
        for facing in ALL_FACINGS {
            let cells = footprint(ShapeKind::Rect2x2, GridPos::new(10, 10), facing);
            assert_eq!(cells.len(), 4, "square keeps four cells at {facing:?}");
            let min_x = cells.iter().map(GridPos::x).min().expect("non-empty");
            let max_x = cells.iter().map(GridPos::x).max().expect("non-empty");
            let min_y = cells.iter().map(GridPos::y).min().expect("non-empty");
            let max_y = cells.iter().map(GridPos::y).max().expect("non-empty");
            assert_eq!(max_x - min_x, 1);
            assert_eq!(max_y - min_y, 1);
        }
    }

    #[test]
    fn rotated_footprint_can_leave_the_positive_quadrant() {
        let cells = footprint(ShapeKind::L, GridPos::new(0, 0), Facing::Down);
        assert!(
            cells.iter().any(|cell| cell.y() < 0),
            "rotation must be allowed to produce out-of-bounds candidates",
        );
    }

    #[test]
    fn facing_deltas_are_unit_offsets() {
        for facing in ALL_FACINGS {
            let delta = facing.delta();
            assert_eq!(delta.dx().abs() + delta.dy().abs(), 1);
        }
    }
}
