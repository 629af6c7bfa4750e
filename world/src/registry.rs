//! Authoritative entity storage for machines, shape sources, and live shape
//! instances.

use assembly_core::{
    ArmLabel, ArmProgram, ArmSnapshot, Facing, GridPos, InstanceSnapshot, MachineSnapshot,
    ShapeKind, SourceId, SourceSnapshot, MAX_EXTENSION,
};

/// State of a placed arm stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct ArmState {
    pub(crate) label: ArmLabel,
    pub(crate) base: GridPos,
    pub(crate) facing: Facing,
    pub(crate) extension: i32,
    pub(crate) program: ArmProgram,
}

impl ArmState {
    pub(crate) fn snapshot(&self) -> ArmSnapshot {
        ArmSnapshot {
            label: self.label,
            base: self.base,
            facing: self.facing,
            extension: self.extension,
            program: self.program,
        }
    }

    /// Applies a clamped extension change, reporting whether anything moved.
    pub(crate) fn adjust_extension(&mut self, delta: i32) -> bool {
        let next = (self.extension + delta).clamp(0, MAX_EXTENSION);
        let changed = next != self.extension;
        self.extension = next;
        changed
    }
}

/// A placed machine, dispatched by variant tag.
#[derive(Clone, Debug)]
pub(crate) enum Machine {
    Arm(ArmState),
}

impl Machine {
    pub(crate) fn base_pos(&self) -> GridPos {
        match self {
            Self::Arm(arm) => arm.base,
        }
    }

    pub(crate) fn snapshot(&self) -> MachineSnapshot {
        match self {
            Self::Arm(arm) => MachineSnapshot::Arm(arm.snapshot()),
        }
    }
}

/// State of a placed shape source.
#[derive(Clone, Copy, Debug)]
pub(crate) struct SourceState {
    pub(crate) id: SourceId,
    pub(crate) base: GridPos,
    pub(crate) kind: ShapeKind,
    pub(crate) facing: Facing,
}

impl SourceState {
    pub(crate) fn snapshot(&self) -> SourceSnapshot {
        SourceSnapshot {
            id: self.id,
            base: self.base,
            kind: self.kind,
            facing: self.facing,
        }
    }
}

/// State of a live shape instance; cells are fixed at creation.
#[derive(Clone, Debug)]
pub(crate) struct InstanceState {
    pub(crate) source: SourceId,
    pub(crate) cells: Vec<GridPos>,
}

impl InstanceState {
    pub(crate) fn snapshot(&self) -> InstanceSnapshot {
        InstanceSnapshot {
            source: self.source,
            cells: self.cells.clone(),
        }
    }
}

/// Ordered entity collections with deterministic iteration.
///
/// Insertion order is irrelevant to correctness but stable, which keeps label
/// assignment and timeline lane ordering reproducible across ticks.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    machines: Vec<Machine>,
    sources: Vec<SourceState>,
    instances: Vec<InstanceState>,
    next_source_id: u32,
}

impl Registry {
    pub(crate) fn new() -> Self {
        Self {
            machines: Vec::new(),
            sources: Vec::new(),
            instances: Vec::new(),
            next_source_id: 1,
        }
    }

    /// Clears placed entities while keeping the source id counter, so ids are
    /// process-unique and never reused.
    pub(crate) fn clear(&mut self) {
        self.machines.clear();
        self.sources.clear();
        self.instances.clear();
    }

    pub(crate) fn machines(&self) -> &[Machine] {
        &self.machines
    }

    pub(crate) fn sources(&self) -> &[SourceState] {
        &self.sources
    }

    pub(crate) fn instances(&self) -> &[InstanceState] {
        &self.instances
    }

    pub(crate) fn add_arm(&mut self, arm: ArmState) {
        self.machines.push(Machine::Arm(arm));
    }

    /// Adds a source at the given pose, allocating a fresh identifier.
    pub(crate) fn add_source(
        &mut self,
        base: GridPos,
        kind: ShapeKind,
        facing: Facing,
    ) -> SourceState {
        let source = SourceState {
            id: SourceId::new(self.next_source_id),
            base,
            kind,
            facing,
        };
        self.next_source_id = self.next_source_id.saturating_add(1);
        self.sources.push(source);
        source
    }

    pub(crate) fn add_instance(&mut self, source: SourceId, cells: Vec<GridPos>) {
        self.instances.push(InstanceState { source, cells });
    }

    pub(crate) fn machine_at(&self, cell: GridPos) -> Option<&Machine> {
        self.machines
            .iter()
            .find(|machine| machine.base_pos() == cell)
    }

    pub(crate) fn source_at(&self, cell: GridPos) -> Option<&SourceState> {
        self.sources.iter().find(|source| source.base == cell)
    }

    pub(crate) fn instance_at(&self, cell: GridPos) -> Option<&InstanceState> {
        self.instances
            .iter()
            .find(|instance| instance.cells.iter().any(|occupied| *occupied == cell))
    }

    pub(crate) fn remove_machine_at(&mut self, cell: GridPos) -> Option<Machine> {
        let index = self
            .machines
            .iter()
            .position(|machine| machine.base_pos() == cell)?;
        Some(self.machines.remove(index))
    }

    pub(crate) fn remove_source_at(&mut self, cell: GridPos) -> Option<SourceState> {
        let index = self.sources.iter().position(|source| source.base == cell)?;
        Some(self.sources.remove(index))
    }

    pub(crate) fn remove_instance_at(&mut self, cell: GridPos) -> Option<InstanceState> {
        let index = self
            .instances
            .iter()
            .position(|instance| instance.cells.iter().any(|occupied| *occupied == cell))?;
        Some(self.instances.remove(index))
    }

    pub(crate) fn has_instance_for(&self, source: SourceId) -> bool {
        self.instances
            .iter()
            .any(|instance| instance.source == source)
    }

    pub(crate) fn source_by_id(&self, id: SourceId) -> Option<&SourceState> {
        self.sources.iter().find(|source| source.id == id)
    }

    /// Lowest letter in `A..Z` not currently assigned to a placed arm, or the
    /// `?` sentinel once all 26 are taken.
    pub(crate) fn next_arm_label(&self) -> ArmLabel {
        for letter in 'A'..='Z' {
            let candidate = ArmLabel::new(letter);
            let taken = self.machines.iter().any(|machine| match machine {
                Machine::Arm(arm) => arm.label == candidate,
            });
            if !taken {
                return candidate;
            }
        }
        ArmLabel::FALLBACK
    }

    /// All placed arms ordered by ascending label.
    ///
    /// Position in this sequence defines the timeline lane index; it is
    /// recomputed on demand and never cached.
    pub(crate) fn arms_sorted(&self) -> Vec<&ArmState> {
        let mut arms: Vec<&ArmState> = self
            .machines
            .iter()
            .map(|machine| match machine {
                Machine::Arm(arm) => arm,
            })
            .collect();
        arms.sort_by_key(|arm| arm.label);
        arms
    }

    pub(crate) fn arm_mut(&mut self, label: ArmLabel) -> Option<&mut ArmState> {
        self.machines.iter_mut().find_map(|machine| match machine {
            Machine::Arm(arm) if arm.label == label => Some(arm),
            Machine::Arm(_) => None,
        })
    }

    pub(crate) fn arms_mut(&mut self) -> impl Iterator<Item = &mut ArmState> {
        self.machines.iter_mut().map(|machine| match machine {
            Machine::Arm(arm) => arm,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{ArmState, Registry};
    use assembly_core::{ArmLabel, ArmProgram, Facing, GridPos, ShapeKind};

    fn arm_at(label: char, x: i32, y: i32) -> ArmState {
        ArmState {
            label: ArmLabel::new(label),
            base: GridPos::new(x, y),
            facing: Facing::Right,
            extension: 0,
            program: ArmProgram::default(),
        }
    }

    #[test]
    fn label_pool_hands_out_lowest_unused_letter() {
        let mut registry = Registry::new();
        assert_eq!(registry.next_arm_label(), ArmLabel::new('A'));

        registry.add_arm(arm_at('A', 0, 0));
        registry.add_arm(arm_at('B', 1, 0));
        assert_eq!(registry.next_arm_label(), ArmLabel::new('C'));

        let removed = registry.remove_machine_at(GridPos::new(1, 0));
        assert!(removed.is_some(), "arm B should be removable");
        assert_eq!(registry.next_arm_label(), ArmLabel::new('B'));
    }

    #[test]
    fn label_pool_falls_back_to_sentinel_past_twenty_six_arms() {
        let mut registry = Registry::new();
        for (index, letter) in ('A'..='Z').enumerate() {
            registry.add_arm(arm_at(letter, index as i32, 0));
        }
        assert_eq!(registry.next_arm_label(), ArmLabel::FALLBACK);
    }

    #[test]
    fn arms_sorted_orders_by_label_not_insertion() {
        let mut registry = Registry::new();
        registry.add_arm(arm_at('C', 0, 0));
        registry.add_arm(arm_at('A', 1, 0));
        registry.add_arm(arm_at('B', 2, 0));

        let labels: Vec<char> = registry
            .arms_sorted()
            .iter()
            .map(|arm| arm.label.get())
            .collect();
        assert_eq!(labels, vec!['A', 'B', 'C']);
    }

    #[test]
    fn source_ids_are_monotonic_and_never_reused() {
        let mut registry = Registry::new();
        let first = registry.add_source(GridPos::new(0, 0), ShapeKind::L, Facing::Right);
        let removed = registry.remove_source_at(GridPos::new(0, 0));
        assert!(removed.is_some());

        let second = registry.add_source(GridPos::new(0, 0), ShapeKind::L, Facing::Right);
        assert!(second.id > first.id, "freed ids must not be handed out again");
    }

    #[test]
    fn extension_adjustment_clamps_to_legal_range() {
        let mut arm = arm_at('A', 0, 0);
        assert!(arm.adjust_extension(2));
        assert_eq!(arm.extension, 2);

        assert!(arm.adjust_extension(5));
        assert_eq!(arm.extension, 3, "extension clamps at the maximum");

        assert!(!arm.adjust_extension(1), "clamped change reports no movement");
        assert!(arm.adjust_extension(-10));
        assert_eq!(arm.extension, 0, "extension clamps at zero");
    }
}
