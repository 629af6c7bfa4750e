#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared contracts for the assembly floor editor.
//!
//! Everything that crosses a crate boundary lives here: the [`Command`]
//! vocabulary through which adapters and systems request mutations, the
//! [`Event`] vocabulary the world answers with, the snapshot types those
//! events and queries carry, and the grid, footprint, and input primitives
//! the pure systems compute against. The world stays the only writer of
//! editor state; everything else reads snapshots and emits further commands.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod geometry;
pub mod input;

use geometry::Offset;

/// Canonical banner emitted when the editor boots.
pub const WELCOME_BANNER: &str = "Welcome to the assembly floor.";

/// Total number of command slots along the shared timeline.
pub const TIMELINE_STEPS: usize = 21;

/// Maximum number of tiles an arm may extend beyond its base.
pub const MAX_EXTENSION: i32 = 3;

/// Location of a single grid cell expressed as signed column and row
/// coordinates.
///
/// Coordinates are signed so that rotated footprints may momentarily fall
/// outside the grid and be rejected by bounds checks instead of wrapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPos {
    x: i32,
    y: i32,
}

impl GridPos {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the cell displaced by the provided relative offset.
    #[must_use]
    pub const fn offset_by(self, offset: Offset) -> Self {
        Self {
            x: self.x + offset.dx(),
            y: self.y + offset.dy(),
        }
    }
}

/// Cardinal orientations available to machines and shape sources.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Facing {
    /// Oriented toward decreasing row indices.
    Up,
    /// Oriented toward increasing column indices.
    Right,
    /// Oriented toward increasing row indices.
    Down,
    /// Oriented toward decreasing column indices.
    Left,
}

impl Facing {
    /// Number of clockwise quarter-turns away from [`Facing::Right`].
    #[must_use]
    pub const fn quarter_turns(self) -> u32 {
        match self {
            Self::Right => 0,
            Self::Down => 1,
            Self::Left => 2,
            Self::Up => 3,
        }
    }

    /// Returns the facing rotated one quarter-turn clockwise.
    #[must_use]
    pub const fn rotated_cw(self) -> Self {
        match self {
            Self::Right => Self::Down,
            Self::Down => Self::Left,
            Self::Left => Self::Up,
            Self::Up => Self::Right,
        }
    }

    /// Returns the facing rotated one quarter-turn counter-clockwise.
    #[must_use]
    pub const fn rotated_ccw(self) -> Self {
        match self {
            Self::Right => Self::Up,
            Self::Up => Self::Left,
            Self::Left => Self::Down,
            Self::Down => Self::Right,
        }
    }

    /// Unit cell offset pointing along the facing.
    #[must_use]
    pub const fn delta(self) -> Offset {
        match self {
            Self::Up => Offset::new(0, -1),
            Self::Right => Offset::new(1, 0),
            Self::Down => Offset::new(0, 1),
            Self::Left => Offset::new(-1, 0),
        }
    }
}

/// Kinds of machines that can be placed on the floor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MachineKind {
    /// A rotatable arm that extends along its facing.
    Arm,
}

/// Kinds of shapes a source can produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShapeKind {
    /// Three-cell L tromino.
    L,
    /// Two-by-two square.
    Rect2x2,
}

/// Actions an arm can perform at a timeline step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ArmAction {
    /// Empty slot; the arm holds still.
    None,
    /// Adjust the arm's extension by the command amount.
    Move,
}

/// A single programmed command occupying one timeline slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArmCommand {
    /// Action the arm performs when the step executes.
    pub action: ArmAction,
    /// Signed magnitude applied by the action.
    pub amount: i32,
}

impl Default for ArmCommand {
    fn default() -> Self {
        Self {
            action: ArmAction::None,
            amount: 0,
        }
    }
}

/// Fixed-length command program attached to each arm, one slot per timeline
/// step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArmProgram {
    slots: [ArmCommand; TIMELINE_STEPS],
}

impl Default for ArmProgram {
    fn default() -> Self {
        Self {
            slots: [ArmCommand::default(); TIMELINE_STEPS],
        }
    }
}

impl ArmProgram {
    /// Returns the command stored at the provided step, if the step is in
    /// range.
    #[must_use]
    pub fn command_at(&self, step: usize) -> Option<ArmCommand> {
        self.slots.get(step).copied()
    }

    /// Toggles the slot at `step` for the provided action.
    ///
    /// A slot already holding `action` is cleared back to the empty command;
    /// any other content is replaced by `{action, amount: 0}`. Returns the
    /// resulting slot content, or `None` when the step is out of range.
    pub fn toggle(&mut self, step: usize, action: ArmAction) -> Option<ArmCommand> {
        let slot = self.slots.get_mut(step)?;
        *slot = if slot.action == action {
            ArmCommand::default()
        } else {
            ArmCommand { action, amount: 0 }
        };
        Some(*slot)
    }

    /// Iterator over all slots in step order.
    pub fn iter(&self) -> impl Iterator<Item = &ArmCommand> {
        self.slots.iter()
    }
}

/// Single-character label identifying an arm among the currently placed arms.
///
/// Labels are assigned from the ordered pool `A..Z`; the `?` sentinel is used
/// once the pool is exhausted and is allowed to repeat.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ArmLabel(char);

impl ArmLabel {
    /// Sentinel label handed out once all 26 letters are in use.
    pub const FALLBACK: Self = Self('?');

    /// Creates a new label wrapper around the provided character.
    #[must_use]
    pub const fn new(letter: char) -> Self {
        Self(letter)
    }

    /// Retrieves the underlying character.
    #[must_use]
    pub const fn get(&self) -> char {
        self.0
    }
}

/// Unique identifier assigned to a shape source.
///
/// Identifiers are allocated monotonically by the world and never reused,
/// even when a source is deleted or moved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceId(u32);

impl SourceId {
    /// Creates a new source identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Reasons a placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error, Serialize, Deserialize)]
pub enum PlacementError {
    /// The requested cell or footprint extends beyond the grid bounds.
    #[error("placement target lies outside the grid bounds")]
    OutOfBounds,
    /// The requested cell or footprint overlaps an occupied cell.
    #[error("placement target overlaps an occupied cell")]
    Occupied,
}

/// Immutable representation of a single arm used for queries and events.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArmSnapshot {
    /// Label identifying the arm.
    pub label: ArmLabel,
    /// Grid cell anchoring the arm's base.
    pub base: GridPos,
    /// Orientation of the arm.
    pub facing: Facing,
    /// Tiles the arm currently reaches beyond its base.
    pub extension: i32,
    /// The arm's timeline program.
    pub program: ArmProgram,
}

/// Immutable representation of a placed machine, dispatched by variant tag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MachineSnapshot {
    /// An arm machine.
    Arm(ArmSnapshot),
}

impl MachineSnapshot {
    /// Grid cell owning the machine's anchor.
    #[must_use]
    pub fn base_pos(&self) -> GridPos {
        match self {
            Self::Arm(arm) => arm.base,
        }
    }

    /// Kind tag of the machine.
    #[must_use]
    pub fn kind(&self) -> MachineKind {
        match self {
            Self::Arm(_) => MachineKind::Arm,
        }
    }
}

/// Immutable representation of a single shape source used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SourceSnapshot {
    /// Identifier allocated to the source by the world.
    pub id: SourceId,
    /// Grid cell anchoring the source.
    pub base: GridPos,
    /// Kind of shape the source produces.
    pub kind: ShapeKind,
    /// Orientation applied to spawned footprints.
    pub facing: Facing,
}

/// Immutable representation of a live shape instance used for queries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstanceSnapshot {
    /// Source that spawned the instance.
    pub source: SourceId,
    /// Absolute grid cells occupied by the instance, fixed at creation.
    pub cells: Vec<GridPos>,
}

/// Identity-preserving fields carried across a drag-move of an existing arm.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArmRestore {
    /// Label the arm keeps across the move.
    pub label: ArmLabel,
    /// Program the arm keeps across the move.
    pub program: ArmProgram,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Configures the world's grid, clearing all placed entities.
    ConfigureGrid {
        /// Number of cell columns laid out in the grid.
        columns: u32,
        /// Number of cell rows laid out in the grid.
        rows: u32,
    },
    /// Advances the simulation by one logical tick, rebuilding occupancy.
    Tick,
    /// Requests placement of an arm at the provided origin cell.
    PlaceArm {
        /// Cell anchoring the arm's base.
        origin: GridPos,
        /// Orientation taken from the drop ghost.
        facing: Facing,
        /// Extension taken from the drop ghost.
        extension: i32,
        /// Identity fields preserved when re-placing an existing arm.
        restore: Option<ArmRestore>,
    },
    /// Requests placement of a shape source at the provided origin cell.
    PlaceSource {
        /// Cell anchoring the source.
        origin: GridPos,
        /// Kind of shape the source produces.
        kind: ShapeKind,
        /// Orientation applied to spawned footprints.
        facing: Facing,
    },
    /// Removes the machine anchored at the provided cell, if any.
    ///
    /// Used by pick-up so the vacated cell reads as free for the remainder
    /// of the drag.
    RemoveMachineAt {
        /// Cell to vacate.
        cell: GridPos,
    },
    /// Removes the shape source anchored at the provided cell, if any.
    RemoveSourceAt {
        /// Cell to vacate.
        cell: GridPos,
    },
    /// Deletes at most one entity at the provided cell, in precedence order
    /// shape instance, then shape source, then machine.
    DeleteAt {
        /// Cell targeted by the delete input.
        cell: GridPos,
    },
    /// Requests creation of a shape instance for the provided source.
    SpawnInstance {
        /// Source that should receive a live instance.
        source: SourceId,
    },
    /// Moves the global step cursor to the provided step.
    SetStepCursor {
        /// Step index in `0..TIMELINE_STEPS`.
        step: usize,
    },
    /// Executes the command programmed at the provided step on every arm.
    RunStep {
        /// Step index in `0..TIMELINE_STEPS`.
        step: usize,
    },
    /// Toggles one program slot of the labelled arm for the given action.
    ToggleProgramSlot {
        /// Arm whose program is being authored.
        label: ArmLabel,
        /// Step index of the slot to toggle.
        step: usize,
        /// Pending action applied by the toggle.
        action: ArmAction,
    },
    /// Rotates the labelled arm in place without picking it up.
    RotateArm {
        /// Arm to rotate.
        label: ArmLabel,
        /// Rotation direction; counter-clockwise when `false`.
        clockwise: bool,
    },
    /// Adjusts the labelled arm's extension in place without picking it up.
    AdjustArmExtension {
        /// Arm to adjust.
        label: ArmLabel,
        /// Signed extension change, clamped to the legal range.
        delta: i32,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Confirms that the grid was reconfigured and entities cleared.
    GridConfigured {
        /// Number of cell columns in the new grid.
        columns: u32,
        /// Number of cell rows in the new grid.
        rows: u32,
    },
    /// Indicates that the simulation advanced by one tick.
    TickAdvanced {
        /// Monotonic tick counter after the advance.
        tick: u64,
    },
    /// Confirms that an arm was placed into the world.
    ArmPlaced {
        /// State of the arm after placement.
        snapshot: ArmSnapshot,
    },
    /// Confirms that a machine was removed from the world.
    MachineRemoved {
        /// Final state of the removed machine.
        snapshot: MachineSnapshot,
    },
    /// Confirms that a shape source was placed into the world.
    SourcePlaced {
        /// State of the source after placement.
        snapshot: SourceSnapshot,
    },
    /// Confirms that a shape source was removed from the world.
    SourceRemoved {
        /// Final state of the removed source.
        snapshot: SourceSnapshot,
    },
    /// Confirms that a shape instance was removed from the world.
    InstanceRemoved {
        /// Source the removed instance belonged to.
        source: SourceId,
    },
    /// Confirms that a shape instance was replenished from its source.
    InstanceReplenished {
        /// Source that received a fresh instance.
        source: SourceId,
        /// Absolute cells occupied by the new instance.
        cells: Vec<GridPos>,
    },
    /// Reports that a placement request was rejected.
    PlacementRejected {
        /// Cell provided in the placement request.
        cell: GridPos,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Announces that the global step cursor moved to a new step.
    StepCursorChanged {
        /// Step the cursor now rests on.
        step: usize,
    },
    /// Confirms that a program slot changed through authoring.
    ProgramSlotChanged {
        /// Arm whose program changed.
        label: ArmLabel,
        /// Step index of the changed slot.
        step: usize,
        /// Content of the slot after the toggle.
        command: ArmCommand,
    },
    /// Confirms that an arm rotated in place.
    ArmRotated {
        /// Arm that rotated.
        label: ArmLabel,
        /// Orientation after the rotation.
        facing: Facing,
    },
    /// Confirms that an arm's extension changed.
    ArmExtensionChanged {
        /// Arm whose extension changed.
        label: ArmLabel,
        /// Extension after the change.
        extension: i32,
    },
}

#[cfg(test)]
mod tests {
    use super::{
        ArmAction, ArmCommand, ArmLabel, ArmProgram, Facing, GridPos, PlacementError, ShapeKind,
        SourceId, TIMELINE_STEPS,
    };
    use serde::{de::DeserializeOwned, Serialize};

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn grid_pos_round_trips_through_bincode() {
        assert_round_trip(&GridPos::new(-1, 27));
    }

    #[test]
    fn source_id_round_trips_through_bincode() {
        assert_round_trip(&SourceId::new(42));
    }

    #[test]
    fn arm_label_round_trips_through_bincode() {
        assert_round_trip(&ArmLabel::new('C'));
    }

    #[test]
    fn placement_error_round_trips_through_bincode() {
        assert_round_trip(&PlacementError::Occupied);
    }

    #[test]
    fn shape_kind_round_trips_through_bincode() {
        assert_round_trip(&ShapeKind::Rect2x2);
    }

    #[test]
    fn facing_rotations_are_inverse_operations() {
        for facing in [Facing::Up, Facing::Right, Facing::Down, Facing::Left] {
            assert_eq!(facing.rotated_cw().rotated_ccw(), facing);
            assert_eq!(facing.rotated_ccw().rotated_cw(), facing);
        }
    }

    #[test]
    fn four_clockwise_rotations_return_to_start() {
        let start = Facing::Up;
        let rotated = start.rotated_cw().rotated_cw().rotated_cw().rotated_cw();
        assert_eq!(rotated, start);
    }

    #[test]
    fn default_program_holds_only_empty_slots() {
        let program = ArmProgram::default();
        assert_eq!(program.iter().count(), TIMELINE_STEPS);
        assert!(program
            .iter()
            .all(|command| command.action == ArmAction::None && command.amount == 0));
    }

    #[test]
    fn program_toggle_is_idempotent_over_two_applications() {
        let mut program = ArmProgram::default();

        let set = program.toggle(5, ArmAction::Move).expect("in range");
        assert_eq!(set.action, ArmAction::Move);

        let cleared = program.toggle(5, ArmAction::Move).expect("in range");
        assert_eq!(cleared, ArmCommand::default());

        let set_again = program.toggle(5, ArmAction::Move).expect("in range");
        assert_eq!(set_again.action, ArmAction::Move);
    }

    #[test]
    fn program_toggle_rejects_out_of_range_steps() {
        let mut program = ArmProgram::default();
        assert_eq!(program.toggle(TIMELINE_STEPS, ArmAction::Move), None);
        assert_eq!(program.command_at(TIMELINE_STEPS), None);
    }

    #[test]
    fn placement_error_formats_through_std_error() {
        let error: &dyn std::error::Error = &PlacementError::OutOfBounds;
        assert!(!error.to_string().is_empty());
    }
}
