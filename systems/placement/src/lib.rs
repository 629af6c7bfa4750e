#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure placement system implementing the pick-up / ghost / drop / rollback
//! protocol for machines and shape sources.
//!
//! The system consumes one input frame per tick together with read-only world
//! lookups and responds exclusively with [`Command`] batches. Picking up an
//! existing entity immediately emits a removal command so the vacated cell
//! reads as free for the remainder of the drag, which is what allows dropping
//! an entity back onto its own original cell.

use assembly_core::{
    geometry,
    input::{EditKey, InputFrame, PointerButton},
    ArmLabel, ArmRestore, Command, Facing, GridPos, MachineKind, MachineSnapshot, ShapeKind,
    SourceId, SourceSnapshot, MAX_EXTENSION,
};

/// Discrete pick events emitted by the palette collaborators.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PaletteEvent {
    /// A machine kind was picked from the machine palette.
    MachinePicked(MachineKind),
    /// A shape kind was picked from the shape palette.
    ShapePicked(ShapeKind),
}

/// Cosmetic targeting state set by the confirm key and cleared by cancel.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Selection {
    /// Nothing is selected.
    #[default]
    None,
    /// The arm with the given label is selected.
    Arm(ArmLabel),
    /// The shape source with the given id is selected.
    Source(SourceId),
}

/// Transient not-yet-committed pose shown while an entity is being dragged.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GhostPreview {
    /// A machine drag ghost.
    Machine {
        /// Kind of machine being dragged.
        kind: MachineKind,
        /// Current ghost orientation.
        facing: Facing,
        /// Current ghost extension.
        extension: i32,
    },
    /// A shape-source drag ghost.
    Shape {
        /// Kind of shape being dragged.
        kind: ShapeKind,
        /// Current ghost orientation.
        facing: Facing,
    },
}

#[derive(Clone, Debug)]
enum MachineOrigin {
    Palette,
    Existing { cell: GridPos, restore: ArmRestore },
}

#[derive(Clone, Debug)]
struct MachineDrag {
    kind: MachineKind,
    facing: Facing,
    extension: i32,
    origin: MachineOrigin,
}

#[derive(Clone, Copy, Debug)]
enum ShapeOrigin {
    Palette,
    Existing { cell: GridPos },
}

#[derive(Clone, Copy, Debug)]
struct ShapeDrag {
    kind: ShapeKind,
    facing: Facing,
    origin: ShapeOrigin,
}

/// One value holding the entire drag protocol state, mutually exclusive by
/// construction.
#[derive(Clone, Debug, Default)]
enum DragSession {
    #[default]
    Idle,
    Machine(MachineDrag),
    Shape(ShapeDrag),
}

/// Placement system translating input edges into placement commands.
#[derive(Clone, Debug, Default)]
pub struct Placement {
    session: DragSession,
    selection: Selection,
}

impl Placement {
    /// Creates a new idle placement system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports whether a machine or shape drag is in progress.
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        !matches!(self.session, DragSession::Idle)
    }

    /// Current ghost pose for preview rendering, if a drag is in progress.
    #[must_use]
    pub fn ghost(&self) -> Option<GhostPreview> {
        match &self.session {
            DragSession::Idle => None,
            DragSession::Machine(drag) => Some(GhostPreview::Machine {
                kind: drag.kind,
                facing: drag.facing,
                extension: drag.extension,
            }),
            DragSession::Shape(drag) => Some(GhostPreview::Shape {
                kind: drag.kind,
                facing: drag.facing,
            }),
        }
    }

    /// Current selection for outline rendering and timeline authoring.
    #[must_use]
    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Consumes this tick's input edges and world lookups, emitting commands.
    ///
    /// `hover_cell` is the grid cell under the pointer, or `None` when the
    /// pointer is outside the grid. `placeable` must report whether a cell is
    /// in bounds and unoccupied; `machine_at` and `source_at` mirror the
    /// world's query helpers. `timeline_active` blocks new drags while a
    /// timeline scrub is in progress.
    #[allow(clippy::too_many_arguments)]
    pub fn handle<P, M, S>(
        &mut self,
        frame: &InputFrame,
        hover_cell: Option<GridPos>,
        palette: Option<PaletteEvent>,
        timeline_active: bool,
        mut placeable: P,
        mut machine_at: M,
        mut source_at: S,
        out: &mut Vec<Command>,
    ) where
        P: FnMut(GridPos) -> bool,
        M: FnMut(GridPos) -> Option<MachineSnapshot>,
        S: FnMut(GridPos) -> Option<SourceSnapshot>,
    {
        let hover_machine = hover_cell.and_then(&mut machine_at);
        let hover_source = hover_cell.and_then(&mut source_at);

        self.begin_drags(
            frame,
            hover_cell,
            palette,
            timeline_active,
            hover_machine.as_ref(),
            hover_source.as_ref(),
            out,
        );
        self.edit_ghost(frame);
        self.resolve_drop(frame, hover_cell, &mut placeable, out);
        self.resolve_selection_and_hotkeys(
            frame,
            hover_cell,
            hover_machine.as_ref(),
            hover_source.as_ref(),
            out,
        );

        // Secondary-button deletion stays available even mid-drag.
        if frame.just_pressed(PointerButton::Secondary) {
            if let Some(cell) = hover_cell {
                out.push(Command::DeleteAt { cell });
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn begin_drags(
        &mut self,
        frame: &InputFrame,
        hover_cell: Option<GridPos>,
        palette: Option<PaletteEvent>,
        timeline_active: bool,
        hover_machine: Option<&MachineSnapshot>,
        hover_source: Option<&SourceSnapshot>,
        out: &mut Vec<Command>,
    ) {
        if timeline_active || self.is_dragging() {
            return;
        }

        if let Some(event) = palette {
            match event {
                PaletteEvent::MachinePicked(kind) => {
                    self.session = DragSession::Machine(MachineDrag {
                        kind,
                        facing: Facing::Right,
                        extension: 0,
                        origin: MachineOrigin::Palette,
                    });
                }
                PaletteEvent::ShapePicked(kind) => {
                    self.session = DragSession::Shape(ShapeDrag {
                        kind,
                        facing: Facing::Right,
                        origin: ShapeOrigin::Palette,
                    });
                }
            }
            self.selection = Selection::None;
            return;
        }

        if !frame.just_pressed(PointerButton::Primary) {
            return;
        }

        if let (Some(cell), Some(MachineSnapshot::Arm(arm))) = (hover_cell, hover_machine) {
            out.push(Command::RemoveMachineAt { cell });
            self.session = DragSession::Machine(MachineDrag {
                kind: MachineKind::Arm,
                facing: arm.facing,
                extension: arm.extension,
                origin: MachineOrigin::Existing {
                    cell,
                    restore: ArmRestore {
                        label: arm.label,
                        program: arm.program,
                    },
                },
            });
            self.selection = Selection::None;
            return;
        }

        if let (Some(cell), Some(source)) = (hover_cell, hover_source) {
            out.push(Command::RemoveSourceAt { cell });
            self.session = DragSession::Shape(ShapeDrag {
                kind: source.kind,
                facing: source.facing,
                origin: ShapeOrigin::Existing { cell },
            });
            self.selection = Selection::None;
        }
    }

    /// Rotate and extension keys mutate only the transient ghost pose,
    /// never a placed entity.
    fn edit_ghost(&mut self, frame: &InputFrame) {
        match &mut self.session {
            DragSession::Idle => {}
            DragSession::Machine(drag) => {
                if frame.key_just_pressed(EditKey::RotateLeft) {
                    drag.facing = drag.facing.rotated_ccw();
                }
                if frame.key_just_pressed(EditKey::RotateRight) {
                    drag.facing = drag.facing.rotated_cw();
                }
                if frame.key_just_pressed(EditKey::ExtendIncrease) {
                    drag.extension = (drag.extension + 1).min(MAX_EXTENSION);
                }
                if frame.key_just_pressed(EditKey::ExtendDecrease) {
                    drag.extension = (drag.extension - 1).max(0);
                }
            }
            DragSession::Shape(drag) => {
                if frame.key_just_pressed(EditKey::RotateLeft) {
                    drag.facing = drag.facing.rotated_ccw();
                }
                if frame.key_just_pressed(EditKey::RotateRight) {
                    drag.facing = drag.facing.rotated_cw();
                }
            }
        }
    }

    fn resolve_drop<P>(
        &mut self,
        frame: &InputFrame,
        hover_cell: Option<GridPos>,
        placeable: &mut P,
        out: &mut Vec<Command>,
    ) where
        P: FnMut(GridPos) -> bool,
    {
        if !frame.just_released(PointerButton::Primary) {
            return;
        }

        match std::mem::take(&mut self.session) {
            DragSession::Idle => {}
            DragSession::Machine(drag) => {
                if let Some(cell) = hover_cell.filter(|cell| placeable(*cell)) {
                    let restore = match drag.origin {
                        MachineOrigin::Palette => None,
                        MachineOrigin::Existing { restore, .. } => Some(restore),
                    };
                    out.push(Command::PlaceArm {
                        origin: cell,
                        facing: drag.facing,
                        extension: drag.extension,
                        restore,
                    });
                } else if let MachineOrigin::Existing { cell, restore } = drag.origin {
                    // Rollback keeps the ghost's rotated pose, not the
                    // original one.
                    out.push(Command::PlaceArm {
                        origin: cell,
                        facing: drag.facing,
                        extension: drag.extension,
                        restore: Some(restore),
                    });
                }
            }
            DragSession::Shape(drag) => {
                let committed = hover_cell.is_some_and(|cell| {
                    geometry::footprint(drag.kind, cell, drag.facing)
                        .iter()
                        .all(|footprint_cell| placeable(*footprint_cell))
                });
                if let Some(cell) = hover_cell.filter(|_| committed) {
                    out.push(Command::PlaceSource {
                        origin: cell,
                        kind: drag.kind,
                        facing: drag.facing,
                    });
                } else if let ShapeOrigin::Existing { cell } = drag.origin {
                    out.push(Command::PlaceSource {
                        origin: cell,
                        kind: drag.kind,
                        facing: drag.facing,
                    });
                }
            }
        }
    }

    fn resolve_selection_and_hotkeys(
        &mut self,
        frame: &InputFrame,
        hover_cell: Option<GridPos>,
        hover_machine: Option<&MachineSnapshot>,
        hover_source: Option<&SourceSnapshot>,
        out: &mut Vec<Command>,
    ) {
        if self.is_dragging() {
            return;
        }

        if frame.key_just_pressed(EditKey::Confirm) {
            self.selection = match (hover_machine, hover_source) {
                (Some(MachineSnapshot::Arm(arm)), _) => Selection::Arm(arm.label),
                (None, Some(source)) => Selection::Source(source.id),
                (None, None) => Selection::None,
            };
        }
        if frame.key_just_pressed(EditKey::Cancel) {
            self.selection = Selection::None;
        }
        if frame.key_just_pressed(EditKey::Delete) {
            if let Some(cell) = hover_cell {
                out.push(Command::DeleteAt { cell });
            }
        }

        // In-place editing targets the selected arm, falling back to the
        // hovered one.
        let target = match self.selection {
            Selection::Arm(label) => Some(label),
            Selection::None | Selection::Source(_) => match hover_machine {
                Some(MachineSnapshot::Arm(arm)) => Some(arm.label),
                None => None,
            },
        };
        let Some(label) = target else {
            return;
        };

        if frame.key_just_pressed(EditKey::RotateLeft) {
            out.push(Command::RotateArm {
                label,
                clockwise: false,
            });
        }
        if frame.key_just_pressed(EditKey::RotateRight) {
            out.push(Command::RotateArm {
                label,
                clockwise: true,
            });
        }
        if frame.key_just_pressed(EditKey::ExtendIncrease) {
            out.push(Command::AdjustArmExtension { label, delta: 1 });
        }
        if frame.key_just_pressed(EditKey::ExtendDecrease) {
            out.push(Command::AdjustArmExtension { label, delta: -1 });
        }
    }
}
