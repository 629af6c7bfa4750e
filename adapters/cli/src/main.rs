#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter driving a headless assembly floor session.
//!
//! Seeds a small floor through the same input protocol the interactive
//! adapters use (palette drags, selection, timeline clicks), then runs the
//! tick pipeline for a fixed number of ticks and prints the resulting floor.

use anyhow::{ensure, Result};
use clap::Parser;

use assembly_core::{
    input::{ButtonState, EditKey, InputFrame, InputSnapshot, KeySet, ScreenPos, ScreenRect},
    ArmAction, ArmLabel, Command, Event, GridPos, MachineKind, MachineSnapshot, ShapeKind,
    TIMELINE_STEPS,
};
use assembly_system_placement::{PaletteEvent, Placement, Selection};
use assembly_system_replenishment::Replenishment;
use assembly_system_timeline::{Timeline, TimelinePanel};
use assembly_world::{apply, query, World};

/// Headless driver for the assembly floor editor.
#[derive(Parser, Debug)]
#[command(name = "assembly-cli")]
struct Args {
    /// Number of grid columns.
    #[arg(long, default_value_t = 32)]
    columns: u32,

    /// Number of grid rows.
    #[arg(long, default_value_t = 28)]
    rows: u32,

    /// Number of simulation ticks to run.
    #[arg(long, default_value_t = TIMELINE_STEPS)]
    ticks: usize,
}

/// The world plus the three pure systems wired the way interactive adapters
/// wire them.
struct Editor {
    world: World,
    placement: Placement,
    replenishment: Replenishment,
    timeline: Timeline,
}

impl Editor {
    fn new() -> Self {
        Self {
            world: World::new(),
            placement: Placement::new(),
            replenishment: Replenishment::new(),
            timeline: Timeline::new(),
        }
    }

    fn apply_all(&mut self, commands: Vec<Command>) -> Vec<Event> {
        let mut events = Vec::new();
        for command in commands {
            apply(&mut self.world, command, &mut events);
        }
        events
    }

    fn placement_pass(
        &mut self,
        frame: &InputFrame,
        hover: Option<GridPos>,
        palette: Option<PaletteEvent>,
    ) -> Vec<Event> {
        let mut commands = Vec::new();
        {
            let world = &self.world;
            let occupancy = query::occupancy_view(world);
            self.placement.handle(
                frame,
                hover,
                palette,
                self.timeline.is_scrubbing(),
                |cell| occupancy.is_placeable(cell),
                |cell| query::machine_at(world, cell),
                |cell| query::source_at(world, cell),
                &mut commands,
            );
        }
        self.apply_all(commands)
    }

    fn replenishment_pass(&mut self) -> Vec<Event> {
        let mut commands = Vec::new();
        {
            let sources: Vec<_> = query::source_view(&self.world).iter().copied().collect();
            let instances = query::instance_view(&self.world);
            let occupancy = query::occupancy_view(&self.world);
            self.replenishment.handle(
                &sources,
                |id| instances.has_instance_for(id),
                |cell| occupancy.is_placeable(cell),
                &mut commands,
            );
        }
        self.apply_all(commands)
    }

    fn timeline_pass(&mut self, frame: &InputFrame, panel: &TimelinePanel) -> Vec<Event> {
        let arms = query::arm_view(&self.world);
        let lanes: Vec<ArmLabel> = arms.iter().map(|arm| arm.label).collect();
        let selected_lane = match self.placement.selection() {
            Selection::Arm(label) => arms.lane_of(label),
            Selection::None | Selection::Source(_) => None,
        };
        let mut commands = Vec::new();
        self.timeline.handle(
            frame,
            panel,
            &lanes,
            selected_lane,
            Some(ArmAction::Move),
            self.placement.is_dragging(),
            &mut commands,
        );
        self.apply_all(commands)
    }

    /// Drags an entity from the palette and drops it on the target cell.
    fn drop_from_palette(&mut self, palette: PaletteEvent, cell: GridPos) -> Vec<Event> {
        let mut events = self.placement_pass(&InputFrame::default(), None, Some(palette));
        events.extend(self.placement_pass(&release_primary(), Some(cell), None));
        events
    }

    fn panel(&self) -> TimelinePanel {
        TimelinePanel::new(
            ScreenRect::new(0, 0, 364, 200),
            query::arm_view(&self.world).len(),
        )
    }
}

fn release_primary() -> InputFrame {
    InputFrame::new(
        InputSnapshot::default(),
        InputSnapshot {
            primary: ButtonState::Pressed,
            ..InputSnapshot::default()
        },
    )
}

fn press_at(pos: ScreenPos) -> InputFrame {
    InputFrame::new(
        InputSnapshot {
            pointer: pos,
            primary: ButtonState::Pressed,
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

/// Renders the floor as one glyph per cell.
fn render(world: &World) -> String {
    let (columns, rows) = query::dimensions(world);
    let mut lines = Vec::new();
    for y in 0..rows as i32 {
        let mut line = String::new();
        for x in 0..columns as i32 {
            let cell = GridPos::new(x, y);
            let glyph = if let Some(MachineSnapshot::Arm(arm)) = query::machine_at(world, cell) {
                arm.label.get()
            } else if query::source_at(world, cell).is_some() {
                'S'
            } else if query::instance_at(world, cell).is_some() {
                '#'
            } else {
                '.'
            };
            line.push(glyph);
        }
        lines.push(line);
    }
    lines.join("\n")
}

/// Renders one line per arm with its pose and programmed steps.
fn roster(world: &World) -> String {
    let arms = query::arm_view(world);
    let mut lines = Vec::new();
    for arm in arms.iter() {
        let program: String = arm
            .program
            .iter()
            .map(|slot| match slot.action {
                ArmAction::None => '.',
                ArmAction::Move => 'M',
            })
            .collect();
        lines.push(format!(
            "{} @ ({}, {}) facing {:?} extension {}  [{}]",
            arm.label.get(),
            arm.base.x(),
            arm.base.y(),
            arm.facing,
            arm.extension,
            program,
        ));
    }
    lines.join("\n")
}

fn log_events(prefix: &str, events: &[Event]) {
    for event in events {
        println!("{prefix}{event:?}");
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    ensure!(
        args.columns >= 8 && args.rows >= 8,
        "the demo floor needs a grid of at least 8x8 cells"
    );

    let mut editor = Editor::new();
    println!("{}", query::welcome_banner(&editor.world));

    let events = editor.apply_all(vec![Command::ConfigureGrid {
        columns: args.columns,
        rows: args.rows,
    }]);
    log_events("", &events);

    // Seed the floor through the regular drag protocol.
    let arm_cell = GridPos::new(2, 2);
    let events = editor.drop_from_palette(PaletteEvent::MachinePicked(MachineKind::Arm), arm_cell);
    log_events("seed: ", &events);
    let events =
        editor.drop_from_palette(PaletteEvent::ShapePicked(ShapeKind::L), GridPos::new(5, 5));
    log_events("seed: ", &events);
    let events = editor.drop_from_palette(
        PaletteEvent::ShapePicked(ShapeKind::Rect2x2),
        GridPos::new(2, 5),
    );
    log_events("seed: ", &events);

    // Select the arm and author two program slots through the panel.
    let events = editor.placement_pass(&tap_key(EditKey::Confirm), Some(arm_cell), None);
    log_events("select: ", &events);
    let panel = editor.panel();
    for step in [0, 10] {
        let events = editor.timeline_pass(&press_at(panel.slot_center(step, 0)), &panel);
        log_events("author: ", &events);
        let events = editor.timeline_pass(&release_primary(), &panel);
        log_events("author: ", &events);
    }

    // Nudge the selected arm out once so the run has something to show.
    let events = editor.placement_pass(&tap_key(EditKey::ExtendIncrease), None, None);
    log_events("adjust: ", &events);

    for tick in 0..args.ticks {
        let mut events = editor.apply_all(vec![Command::Tick]);
        events.extend(editor.placement_pass(&InputFrame::default(), None, None));
        events.extend(editor.replenishment_pass());
        let panel = editor.panel();
        events.extend(editor.timeline_pass(&InputFrame::default(), &panel));
        let step = tick % TIMELINE_STEPS;
        events.extend(editor.apply_all(vec![
            Command::SetStepCursor { step },
            Command::RunStep { step },
        ]));
        log_events(&format!("tick {tick}: "), &events);
    }

    println!();
    println!("{}", render(&editor.world));
    println!();
    println!("{}", roster(&editor.world));
    println!("step cursor: {}", query::step_cursor(&editor.world));
    Ok(())
}
