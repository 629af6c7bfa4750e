#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for the Assembly Floor editor.

use assembly_core::{
    geometry, ArmProgram, ArmRestore, Command, Event, Facing, GridPos, PlacementError, ShapeKind,
    SourceId, TIMELINE_STEPS, WELCOME_BANNER,
};

mod registry;

use registry::{ArmState, Registry};

const DEFAULT_GRID_COLUMNS: u32 = 32;
const DEFAULT_GRID_ROWS: u32 = 28;

/// Bounded boolean occupancy map rebuilt from registry state.
#[derive(Clone, Debug)]
struct OccupancyGrid {
    columns: u32,
    rows: u32,
    cells: Vec<bool>,
}

impl OccupancyGrid {
    fn new(columns: u32, rows: u32) -> Self {
        let capacity_u64 = u64::from(columns) * u64::from(rows);
        let capacity = usize::try_from(capacity_u64).unwrap_or(0);
        Self {
            columns,
            rows,
            cells: vec![false; capacity],
        }
    }

    fn reset(&mut self) {
        self.cells.fill(false);
    }

    fn in_bounds(&self, cell: GridPos) -> bool {
        cell.x() >= 0
            && cell.y() >= 0
            && (cell.x() as u32) < self.columns
            && (cell.y() as u32) < self.rows
    }

    fn index(&self, cell: GridPos) -> Option<usize> {
        if !self.in_bounds(cell) {
            return None;
        }
        let row = usize::try_from(cell.y()).ok()?;
        let column = usize::try_from(cell.x()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        Some(row * width + column)
    }

    /// Marks a cell occupied; out-of-bounds cells are ignored, never errors.
    fn mark(&mut self, cell: GridPos) {
        if let Some(index) = self.index(cell) {
            if let Some(slot) = self.cells.get_mut(index) {
                *slot = true;
            }
        }
    }

    /// Reports occupancy; out-of-bounds cells read as unoccupied. Callers
    /// must gate placement on `in_bounds` separately.
    fn is_occupied(&self, cell: GridPos) -> bool {
        self.index(cell)
            .is_some_and(|index| self.cells.get(index).copied().unwrap_or(false))
    }

    fn dimensions(&self) -> (u32, u32) {
        (self.columns, self.rows)
    }
}

/// Represents the authoritative editor world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    grid: OccupancyGrid,
    registry: Registry,
    step_cursor: usize,
    tick_index: u64,
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

impl World {
    /// Creates a new world with the default grid dimensions.
    #[must_use]
    pub fn new() -> Self {
        Self {
            banner: WELCOME_BANNER,
            grid: OccupancyGrid::new(DEFAULT_GRID_COLUMNS, DEFAULT_GRID_ROWS),
            registry: Registry::new(),
            step_cursor: 0,
            tick_index: 0,
        }
    }

    /// Recomputes occupancy in full from current registry state.
    ///
    /// Never patched incrementally, so occupancy cannot drift from entity
    /// state even when entities are removed and re-added mid-tick.
    fn rebuild_occupancy(&mut self) {
        self.grid.reset();
        for machine in self.registry.machines() {
            self.grid.mark(machine.base_pos());
        }
        for source in self.registry.sources() {
            self.grid.mark(source.base);
        }
        for instance in self.registry.instances() {
            for cell in &instance.cells {
                self.grid.mark(*cell);
            }
        }
    }

    fn validate_cell(&self, cell: GridPos) -> Result<(), PlacementError> {
        if !self.grid.in_bounds(cell) {
            return Err(PlacementError::OutOfBounds);
        }
        if self.grid.is_occupied(cell) {
            return Err(PlacementError::Occupied);
        }
        Ok(())
    }

    fn place_arm(
        &mut self,
        origin: GridPos,
        facing: Facing,
        extension: i32,
        restore: Option<ArmRestore>,
        out_events: &mut Vec<Event>,
    ) {
        if let Err(reason) = self.validate_cell(origin) {
            out_events.push(Event::PlacementRejected {
                cell: origin,
                reason,
            });
            return;
        }

        let (label, program) = match restore {
            Some(restore) => (restore.label, restore.program),
            None => (self.registry.next_arm_label(), ArmProgram::default()),
        };
        let arm = ArmState {
            label,
            base: origin,
            facing,
            extension: extension.clamp(0, assembly_core::MAX_EXTENSION),
            program,
        };
        let snapshot = arm.snapshot();
        self.registry.add_arm(arm);
        out_events.push(Event::ArmPlaced { snapshot });
    }

    fn place_source(
        &mut self,
        origin: GridPos,
        kind: ShapeKind,
        facing: Facing,
        out_events: &mut Vec<Event>,
    ) {
        if let Err(reason) = self.validate_cell(origin) {
            out_events.push(Event::PlacementRejected {
                cell: origin,
                reason,
            });
            return;
        }

        let source = self.registry.add_source(origin, kind, facing);
        out_events.push(Event::SourcePlaced {
            snapshot: source.snapshot(),
        });
    }

    fn spawn_instance(&mut self, source_id: SourceId, out_events: &mut Vec<Event>) {
        if self.registry.has_instance_for(source_id) {
            return;
        }
        let Some(source) = self.registry.source_by_id(source_id) else {
            return;
        };
        let (base, kind, facing) = (source.base, source.kind, source.facing);

        // The footprint always covers the source's own base cell, which is
        // marked occupied by the source itself, so that one cell is exempt.
        let cells = geometry::footprint(kind, base, facing);
        let free = cells.iter().all(|cell| {
            self.grid.in_bounds(*cell) && (*cell == base || !self.grid.is_occupied(*cell))
        });
        if !free {
            return;
        }

        self.registry.add_instance(source_id, cells.clone());
        out_events.push(Event::InstanceReplenished {
            source: source_id,
            cells,
        });
    }

    fn delete_at(&mut self, cell: GridPos, out_events: &mut Vec<Event>) {
        if let Some(instance) = self.registry.remove_instance_at(cell) {
            out_events.push(Event::InstanceRemoved {
                source: instance.source,
            });
        } else if let Some(source) = self.registry.remove_source_at(cell) {
            out_events.push(Event::SourceRemoved {
                snapshot: source.snapshot(),
            });
        } else if let Some(machine) = self.registry.remove_machine_at(cell) {
            out_events.push(Event::MachineRemoved {
                snapshot: machine.snapshot(),
            });
        }
    }

    fn run_step(&mut self, step: usize, out_events: &mut Vec<Event>) {
        if step >= TIMELINE_STEPS {
            return;
        }
        for arm in self.registry.arms_mut() {
            let Some(command) = arm.program.command_at(step) else {
                continue;
            };
            if command.action == assembly_core::ArmAction::Move
                && arm.adjust_extension(command.amount)
            {
                out_events.push(Event::ArmExtensionChanged {
                    label: arm.label,
                    extension: arm.extension,
                });
            }
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::ConfigureGrid { columns, rows } => {
            world.grid = OccupancyGrid::new(columns, rows);
            world.registry.clear();
            world.step_cursor = 0;
            out_events.push(Event::GridConfigured { columns, rows });
        }
        Command::Tick => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TickAdvanced {
                tick: world.tick_index,
            });
        }
        Command::PlaceArm {
            origin,
            facing,
            extension,
            restore,
        } => world.place_arm(origin, facing, extension, restore, out_events),
        Command::PlaceSource {
            origin,
            kind,
            facing,
        } => world.place_source(origin, kind, facing, out_events),
        Command::RemoveMachineAt { cell } => {
            if let Some(machine) = world.registry.remove_machine_at(cell) {
                out_events.push(Event::MachineRemoved {
                    snapshot: machine.snapshot(),
                });
            }
        }
        Command::RemoveSourceAt { cell } => {
            if let Some(source) = world.registry.remove_source_at(cell) {
                out_events.push(Event::SourceRemoved {
                    snapshot: source.snapshot(),
                });
            }
        }
        Command::DeleteAt { cell } => world.delete_at(cell, out_events),
        Command::SpawnInstance { source } => world.spawn_instance(source, out_events),
        Command::SetStepCursor { step } => {
            if step < TIMELINE_STEPS && step != world.step_cursor {
                world.step_cursor = step;
                out_events.push(Event::StepCursorChanged { step });
            }
        }
        Command::RunStep { step } => world.run_step(step, out_events),
        Command::ToggleProgramSlot {
            label,
            step,
            action,
        } => {
            if let Some(arm) = world.registry.arm_mut(label) {
                let before = arm.program.command_at(step);
                if let Some(command) = arm.program.toggle(step, action) {
                    // Toggling an empty slot with the empty action leaves
                    // the program as it was; stay silent then.
                    if before != Some(command) {
                        out_events.push(Event::ProgramSlotChanged {
                            label,
                            step,
                            command,
                        });
                    }
                }
            }
        }
        Command::RotateArm { label, clockwise } => {
            if let Some(arm) = world.registry.arm_mut(label) {
                arm.facing = if clockwise {
                    arm.facing.rotated_cw()
                } else {
                    arm.facing.rotated_ccw()
                };
                out_events.push(Event::ArmRotated {
                    label,
                    facing: arm.facing,
                });
            }
        }
        Command::AdjustArmExtension { label, delta } => {
            if let Some(arm) = world.registry.arm_mut(label) {
                if arm.adjust_extension(delta) {
                    out_events.push(Event::ArmExtensionChanged {
                        label: arm.label,
                        extension: arm.extension,
                    });
                }
            }
        }
    }

    world.rebuild_occupancy();
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use super::{registry::Machine, OccupancyGrid, World};
    use assembly_core::{
        ArmLabel, ArmSnapshot, GridPos, InstanceSnapshot, MachineSnapshot, SourceSnapshot,
    };

    /// Retrieves the welcome banner that adapters may display to users.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Grid dimensions as `(columns, rows)`.
    #[must_use]
    pub fn dimensions(world: &World) -> (u32, u32) {
        world.grid.dimensions()
    }

    /// Monotonic tick counter.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Current global step cursor along the timeline.
    #[must_use]
    pub fn step_cursor(world: &World) -> usize {
        world.step_cursor
    }

    /// Label the next placed arm would receive.
    #[must_use]
    pub fn next_arm_label(world: &World) -> ArmLabel {
        world.registry.next_arm_label()
    }

    /// Exposes a read-only view of the boolean occupancy grid.
    #[must_use]
    pub fn occupancy_view(world: &World) -> OccupancyView<'_> {
        OccupancyView { grid: &world.grid }
    }

    /// First machine whose base cell matches, if any.
    #[must_use]
    pub fn machine_at(world: &World, cell: GridPos) -> Option<MachineSnapshot> {
        world.registry.machine_at(cell).map(Machine::snapshot)
    }

    /// First shape source whose base cell matches, if any.
    #[must_use]
    pub fn source_at(world: &World, cell: GridPos) -> Option<SourceSnapshot> {
        world
            .registry
            .source_at(cell)
            .map(|source| source.snapshot())
    }

    /// First shape instance covering the cell, if any.
    #[must_use]
    pub fn instance_at(world: &World, cell: GridPos) -> Option<InstanceSnapshot> {
        world
            .registry
            .instance_at(cell)
            .map(|instance| instance.snapshot())
    }

    /// Captures a read-only view of all placed arms ordered by label.
    #[must_use]
    pub fn arm_view(world: &World) -> ArmView {
        ArmView {
            snapshots: world
                .registry
                .arms_sorted()
                .into_iter()
                .map(|arm| arm.snapshot())
                .collect(),
        }
    }

    /// Captures a read-only view of all shape sources in placement order.
    #[must_use]
    pub fn source_view(world: &World) -> SourceView {
        SourceView {
            snapshots: world
                .registry
                .sources()
                .iter()
                .map(|source| source.snapshot())
                .collect(),
        }
    }

    /// Captures a read-only view of all live shape instances.
    #[must_use]
    pub fn instance_view(world: &World) -> InstanceView {
        InstanceView {
            snapshots: world
                .registry
                .instances()
                .iter()
                .map(|instance| instance.snapshot())
                .collect(),
        }
    }

    /// Read-only view into the dense boolean occupancy grid.
    #[derive(Clone, Copy, Debug)]
    pub struct OccupancyView<'a> {
        grid: &'a OccupancyGrid,
    }

    impl OccupancyView<'_> {
        /// Reports whether the cell lies inside the grid bounds.
        #[must_use]
        pub fn in_bounds(&self, cell: GridPos) -> bool {
            self.grid.in_bounds(cell)
        }

        /// Reports whether the cell is occupied; out-of-bounds cells read as
        /// unoccupied, so placement callers must also check `in_bounds`.
        #[must_use]
        pub fn is_occupied(&self, cell: GridPos) -> bool {
            self.grid.is_occupied(cell)
        }

        /// Reports whether the cell is both in bounds and unoccupied.
        #[must_use]
        pub fn is_placeable(&self, cell: GridPos) -> bool {
            self.in_bounds(cell) && !self.is_occupied(cell)
        }

        /// Provides the dimensions of the underlying grid.
        #[must_use]
        pub fn dimensions(&self) -> (u32, u32) {
            self.grid.dimensions()
        }
    }

    /// Read-only snapshot of all placed arms, ordered by ascending label.
    #[derive(Clone, Debug, Default)]
    pub struct ArmView {
        snapshots: Vec<ArmSnapshot>,
    }

    impl ArmView {
        /// Iterator over arm snapshots in lane order.
        pub fn iter(&self) -> impl Iterator<Item = &ArmSnapshot> {
            self.snapshots.iter()
        }

        /// Number of placed arms.
        #[must_use]
        pub fn len(&self) -> usize {
            self.snapshots.len()
        }

        /// Reports whether no arms are placed.
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.snapshots.is_empty()
        }

        /// Timeline lane index of the labelled arm, if placed.
        #[must_use]
        pub fn lane_of(&self, label: ArmLabel) -> Option<usize> {
            self.snapshots
                .iter()
                .position(|snapshot| snapshot.label == label)
        }

        /// Arm occupying the provided lane, if any.
        #[must_use]
        pub fn lane(&self, index: usize) -> Option<&ArmSnapshot> {
            self.snapshots.get(index)
        }
    }

    /// Read-only snapshot of all placed shape sources.
    #[derive(Clone, Debug, Default)]
    pub struct SourceView {
        snapshots: Vec<SourceSnapshot>,
    }

    impl SourceView {
        /// Iterator over source snapshots in placement order.
        pub fn iter(&self) -> impl Iterator<Item = &SourceSnapshot> {
            self.snapshots.iter()
        }

        /// Number of placed sources.
        #[must_use]
        pub fn len(&self) -> usize {
            self.snapshots.len()
        }

        /// Reports whether no sources are placed.
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.snapshots.is_empty()
        }
    }

    /// Read-only snapshot of all live shape instances.
    #[derive(Clone, Debug, Default)]
    pub struct InstanceView {
        snapshots: Vec<InstanceSnapshot>,
    }

    impl InstanceView {
        /// Iterator over instance snapshots.
        pub fn iter(&self) -> impl Iterator<Item = &InstanceSnapshot> {
            self.snapshots.iter()
        }

        /// Reports whether a live instance exists for the provided source.
        #[must_use]
        pub fn has_instance_for(&self, source: assembly_core::SourceId) -> bool {
            self.snapshots
                .iter()
                .any(|snapshot| snapshot.source == source)
        }

        /// Number of live instances.
        #[must_use]
        pub fn len(&self) -> usize {
            self.snapshots.len()
        }

        /// Reports whether no instances are live.
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.snapshots.is_empty()
        }
    }
}
