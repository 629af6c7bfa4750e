use assembly_core::{
    input::{ButtonState, EditKey, InputFrame, InputSnapshot, KeySet},
    ArmAction, ArmLabel, Command, Event, Facing, GridPos, MachineKind, MachineSnapshot, ShapeKind,
    SourceId,
};
use assembly_system_placement::{GhostPreview, PaletteEvent, Placement, Selection};
use assembly_world::{apply, query, World};

fn pressed_snapshot() -> InputSnapshot {
    InputSnapshot {
        primary: ButtonState::Pressed,
        ..InputSnapshot::default()
    }
}

fn press_primary() -> InputFrame {
    InputFrame::new(pressed_snapshot(), InputSnapshot::default())
}

fn release_primary() -> InputFrame {
    InputFrame::new(InputSnapshot::default(), pressed_snapshot())
}

fn press_secondary() -> InputFrame {
    InputFrame::new(
        InputSnapshot {
            secondary: ButtonState::Pressed,
            ..InputSnapshot::default()
        },
        InputSnapshot::default(),
    )
}

fn tap_key(key: EditKey) -> InputFrame {
    InputFrame::new(
        InputSnapshot {
            keys: KeySet::default().with_down(key),
            ..InputSnapshot::default()
        },
        InputSnapshot::default(),
    )
}

fn neutral() -> InputFrame {
    InputFrame::default()
}

/// Runs one placement tick against the world and feeds the emitted commands
/// straight back into it, returning the resulting world events.
fn drive(
    world: &mut World,
    placement: &mut Placement,
    frame: &InputFrame,
    hover: Option<GridPos>,
    palette: Option<PaletteEvent>,
) -> Vec<Event> {
    let mut commands = Vec::new();
    {
        let world_ref: &World = world;
        let occupancy = query::occupancy_view(world_ref);
        placement.handle(
            frame,
            hover,
            palette,
            false,
            |cell| occupancy.is_placeable(cell),
            |cell| query::machine_at(world_ref, cell),
            |cell| query::source_at(world_ref, cell),
            &mut commands,
        );
    }
    let mut events = Vec::new();
    for command in commands {
        apply(world, command, &mut events);
    }
    events
}

fn arm_at(world: &World, cell: GridPos) -> assembly_core::ArmSnapshot {
    match query::machine_at(world, cell) {
        Some(MachineSnapshot::Arm(arm)) => arm,
        None => panic!("expected an arm at {cell:?}"),
    }
}

fn seed_arm(world: &mut World, placement: &mut Placement, cell: GridPos) {
    let events = drive(
        world,
        placement,
        &neutral(),
        None,
        Some(PaletteEvent::MachinePicked(MachineKind::Arm)),
    );
    assert!(events.is_empty());
    let events = drive(world, placement, &release_primary(), Some(cell), None);
    assert!(
        matches!(events.as_slice(), [Event::ArmPlaced { .. }]),
        "seeding an arm at {cell:?} failed: {events:?}",
    );
}

fn seed_source(world: &mut World, placement: &mut Placement, cell: GridPos, kind: ShapeKind) {
    let events = drive(
        world,
        placement,
        &neutral(),
        None,
        Some(PaletteEvent::ShapePicked(kind)),
    );
    assert!(events.is_empty());
    let events = drive(world, placement, &release_primary(), Some(cell), None);
    assert!(
        matches!(events.as_slice(), [Event::SourcePlaced { .. }]),
        "seeding a source at {cell:?} failed: {events:?}",
    );
}

#[test]
fn palette_pick_starts_ghost_and_drop_places_arm() {
    let mut world = World::new();
    let mut placement = Placement::new();

    let events = drive(
        &mut world,
        &mut placement,
        &neutral(),
        None,
        Some(PaletteEvent::MachinePicked(MachineKind::Arm)),
    );
    assert!(events.is_empty(), "picking from the palette mutates nothing");
    assert!(matches!(
        placement.ghost(),
        Some(GhostPreview::Machine {
            facing: Facing::Right,
            extension: 0,
            ..
        })
    ));

    let target = GridPos::new(3, 4);
    let events = drive(&mut world, &mut placement, &release_primary(), Some(target), None);
    assert!(matches!(events.as_slice(), [Event::ArmPlaced { .. }]));
    assert!(placement.ghost().is_none(), "drop must end the drag");
    assert_eq!(arm_at(&world, target).label, ArmLabel::new('A'));
}

#[test]
fn palette_drop_on_occupied_cell_vanishes_without_commands() {
    let mut world = World::new();
    let mut placement = Placement::new();
    let blocked = GridPos::new(3, 3);
    seed_arm(&mut world, &mut placement, blocked);

    let events = drive(
        &mut world,
        &mut placement,
        &neutral(),
        None,
        Some(PaletteEvent::MachinePicked(MachineKind::Arm)),
    );
    assert!(events.is_empty());
    let events = drive(&mut world, &mut placement, &release_primary(), Some(blocked), None);
    assert!(
        events.is_empty(),
        "a palette ghost dropped on an occupied cell just vanishes",
    );
    assert!(placement.ghost().is_none());
    assert_eq!(query::arm_view(&world).len(), 1);
}

#[test]
fn failed_drop_of_existing_arm_rolls_back_with_rotated_ghost() {
    let mut world = World::new();
    let mut placement = Placement::new();
    let anchor = GridPos::new(3, 4);
    let origin = GridPos::new(5, 5);
    seed_arm(&mut world, &mut placement, anchor);
    seed_arm(&mut world, &mut placement, origin);
    assert_eq!(arm_at(&world, origin).label, ArmLabel::new('B'));

    // Pick up arm B; the vacated cell must read as free immediately.
    let events = drive(&mut world, &mut placement, &press_primary(), Some(origin), None);
    assert!(matches!(events.as_slice(), [Event::MachineRemoved { .. }]));
    assert!(query::machine_at(&world, origin).is_none());

    // Rotate the ghost mid-drag, then drop onto the occupied anchor cell.
    let events = drive(
        &mut world,
        &mut placement,
        &tap_key(EditKey::RotateRight),
        Some(anchor),
        None,
    );
    assert!(events.is_empty());
    let events = drive(&mut world, &mut placement, &release_primary(), Some(anchor), None);
    assert!(matches!(events.as_slice(), [Event::ArmPlaced { .. }]));

    let restored = arm_at(&world, origin);
    assert_eq!(restored.label, ArmLabel::new('B'), "rollback keeps the label");
    assert_eq!(
        restored.facing,
        Facing::Down,
        "rollback keeps the rotated ghost pose",
    );
}

#[test]
fn moving_an_arm_preserves_label_and_program() {
    let mut world = World::new();
    let mut placement = Placement::new();
    let from = GridPos::new(2, 2);
    let to = GridPos::new(9, 9);
    seed_arm(&mut world, &mut placement, from);
    let mut events = Vec::new();
    apply(
        &mut world,
        Command::ToggleProgramSlot {
            label: ArmLabel::new('A'),
            step: 5,
            action: ArmAction::Move,
        },
        &mut events,
    );

    let _ = drive(&mut world, &mut placement, &press_primary(), Some(from), None);
    let _ = drive(&mut world, &mut placement, &release_primary(), Some(to), None);

    let moved = arm_at(&world, to);
    assert_eq!(moved.label, ArmLabel::new('A'));
    let slot = moved.program.command_at(5).expect("step 5 is in range");
    assert_eq!(slot.action, ArmAction::Move, "programs travel with the arm");
}

#[test]
fn shape_drop_requires_the_entire_footprint_free() {
    let mut world = World::new();
    let mut placement = Placement::new();
    // Occupies (7, 6), one of the L footprint cells anchored at (6, 6).
    seed_arm(&mut world, &mut placement, GridPos::new(7, 6));

    let _ = drive(
        &mut world,
        &mut placement,
        &neutral(),
        None,
        Some(PaletteEvent::ShapePicked(ShapeKind::L)),
    );
    let events = drive(
        &mut world,
        &mut placement,
        &release_primary(),
        Some(GridPos::new(6, 6)),
        None,
    );
    assert!(
        events.is_empty(),
        "a partially blocked footprint must refuse the drop",
    );
    assert!(query::source_view(&world).is_empty());

    let _ = drive(
        &mut world,
        &mut placement,
        &neutral(),
        None,
        Some(PaletteEvent::ShapePicked(ShapeKind::L)),
    );
    let events = drive(
        &mut world,
        &mut placement,
        &release_primary(),
        Some(GridPos::new(12, 12)),
        None,
    );
    assert!(matches!(events.as_slice(), [Event::SourcePlaced { .. }]));
}

#[test]
fn moving_a_source_mints_a_fresh_identifier() {
    let mut world = World::new();
    let mut placement = Placement::new();
    let from = GridPos::new(4, 4);
    let to = GridPos::new(10, 10);
    seed_source(&mut world, &mut placement, from, ShapeKind::Rect2x2);
    let original = query::source_at(&world, from).expect("source seeded").id;

    let events = drive(&mut world, &mut placement, &press_primary(), Some(from), None);
    assert!(matches!(events.as_slice(), [Event::SourceRemoved { .. }]));

    let events = drive(&mut world, &mut placement, &release_primary(), Some(to), None);
    let moved: SourceId = match events.as_slice() {
        [Event::SourcePlaced { snapshot }] => snapshot.id,
        other => panic!("expected the moved source to land, got {other:?}"),
    };
    assert!(moved > original, "re-placing a source allocates a new id");
}

#[test]
fn secondary_click_deletes_the_hovered_entity() {
    let mut world = World::new();
    let mut placement = Placement::new();
    let cell = GridPos::new(6, 3);
    seed_arm(&mut world, &mut placement, cell);

    let events = drive(&mut world, &mut placement, &press_secondary(), Some(cell), None);
    assert!(matches!(events.as_slice(), [Event::MachineRemoved { .. }]));
    assert!(query::arm_view(&world).is_empty());
}

#[test]
fn confirm_selects_hovered_arm_and_cancel_clears_it() {
    let mut world = World::new();
    let mut placement = Placement::new();
    let cell = GridPos::new(2, 2);
    seed_arm(&mut world, &mut placement, cell);

    let _ = drive(
        &mut world,
        &mut placement,
        &tap_key(EditKey::Confirm),
        Some(cell),
        None,
    );
    assert_eq!(placement.selection(), Selection::Arm(ArmLabel::new('A')));

    let _ = drive(&mut world, &mut placement, &tap_key(EditKey::Cancel), None, None);
    assert_eq!(placement.selection(), Selection::None);
}

#[test]
fn idle_rotate_hotkey_targets_the_selected_arm() {
    let mut world = World::new();
    let mut placement = Placement::new();
    let cell = GridPos::new(1, 1);
    seed_arm(&mut world, &mut placement, cell);
    let _ = drive(
        &mut world,
        &mut placement,
        &tap_key(EditKey::Confirm),
        Some(cell),
        None,
    );

    // The pointer is nowhere near the arm; the selection carries the target.
    let events = drive(
        &mut world,
        &mut placement,
        &tap_key(EditKey::RotateRight),
        None,
        None,
    );
    assert_eq!(
        events,
        vec![Event::ArmRotated {
            label: ArmLabel::new('A'),
            facing: Facing::Down,
        }],
    );
}

#[test]
fn extension_hotkeys_clamp_the_ghost_range() {
    let mut world = World::new();
    let mut placement = Placement::new();

    let _ = drive(
        &mut world,
        &mut placement,
        &neutral(),
        None,
        Some(PaletteEvent::MachinePicked(MachineKind::Arm)),
    );
    for _ in 0..5 {
        let _ = drive(
            &mut world,
            &mut placement,
            &tap_key(EditKey::ExtendIncrease),
            None,
            None,
        );
    }
    match placement.ghost() {
        Some(GhostPreview::Machine { extension, .. }) => {
            assert_eq!(extension, 3, "ghost extension clamps at the maximum");
        }
        other => panic!("expected a machine ghost, got {other:?}"),
    }

    let target = GridPos::new(8, 8);
    let _ = drive(&mut world, &mut placement, &release_primary(), Some(target), None);
    assert_eq!(arm_at(&world, target).extension, 3);
}

#[test]
fn timeline_activity_blocks_new_drags() {
    let world = World::new();
    let mut placement = Placement::new();

    let mut commands = Vec::new();
    {
        let world_ref: &World = &world;
        let occupancy = query::occupancy_view(world_ref);
        placement.handle(
            &neutral(),
            None,
            Some(PaletteEvent::MachinePicked(MachineKind::Arm)),
            true,
            |cell| occupancy.is_placeable(cell),
            |cell| query::machine_at(world_ref, cell),
            |cell| query::source_at(world_ref, cell),
            &mut commands,
        );
    }
    assert!(commands.is_empty());
    assert!(
        placement.ghost().is_none(),
        "palette picks are ignored while the timeline is scrubbing",
    );
}
