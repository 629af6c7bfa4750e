#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure timeline system handling step scrubbing and program authoring.
//!
//! The panel lays out one horizontal lane per placed arm, each divided into
//! one slot per timeline step. Pixel positions are resolved back to steps and
//! lanes by [`TimelinePanel`]; clicks on the selected arm's lane toggle the
//! program slot under the pointer, any other press inside the panel starts a
//! scrub that drags the global step cursor.

use assembly_core::{
    input::{InputFrame, PointerButton, ScreenPos, ScreenRect},
    ArmAction, ArmLabel, Command, TIMELINE_STEPS,
};

/// Height in pixels of one arm lane.
pub const LANE_HEIGHT: i32 = 22;

/// Inner padding between the panel border and its content.
pub const PANEL_PADDING: i32 = 8;

/// Width of the label column to the left of the slot area.
pub const LABEL_COLUMN_WIDTH: i32 = 48;

/// Horizontal gap between adjacent slots.
pub const SLOT_GAP: i32 = 4;

/// Smallest width a slot may shrink to on narrow panels.
pub const MIN_SLOT_WIDTH: i32 = 14;

/// Smallest width the whole slot area may shrink to.
pub const MIN_SLOTS_WIDTH: i32 = 40;

/// Height of the step-number ruler above the first lane.
pub const TICK_LABEL_HEIGHT: i32 = 18;

/// Resolved panel layout mapping pixels to steps and lanes.
///
/// Rebuilt whenever the panel rectangle or the arm count changes; all
/// derived measurements are fixed at construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimelinePanel {
    rect: ScreenRect,
    lane_count: usize,
    slots_x: i32,
    slot_width: i32,
    lanes_y: i32,
}

impl TimelinePanel {
    /// Lays the panel out inside `rect` with one lane per arm.
    ///
    /// A floor without arms still shows a single empty lane so the ruler and
    /// the cursor stay visible.
    #[must_use]
    pub fn new(rect: ScreenRect, arm_count: usize) -> Self {
        let steps = TIMELINE_STEPS as i32;
        let inner_width = rect.width() - PANEL_PADDING * 2;
        let slots_width = (inner_width - LABEL_COLUMN_WIDTH).max(MIN_SLOTS_WIDTH);
        let slot_width =
            ((slots_width - SLOT_GAP * (steps - 1)) / steps).max(MIN_SLOT_WIDTH);
        Self {
            rect,
            lane_count: arm_count.max(1),
            slots_x: rect.x() + PANEL_PADDING + LABEL_COLUMN_WIDTH,
            slot_width,
            lanes_y: rect.y() + PANEL_PADDING + TICK_LABEL_HEIGHT,
        }
    }

    /// The panel's outer rectangle.
    #[must_use]
    pub fn rect(&self) -> ScreenRect {
        self.rect
    }

    /// Number of lanes laid out, at least one.
    #[must_use]
    pub fn lane_count(&self) -> usize {
        self.lane_count
    }

    /// Resolved width of one slot in pixels.
    #[must_use]
    pub fn slot_width(&self) -> i32 {
        self.slot_width
    }

    /// Center pixel of the slot at `step` in lane `row`.
    ///
    /// Useful to adapters that need to aim synthetic pointer input at a
    /// specific slot.
    #[must_use]
    pub fn slot_center(&self, step: usize, row: usize) -> ScreenPos {
        let x = self.slots_x
            + step as i32 * (self.slot_width + SLOT_GAP)
            + self.slot_width / 2;
        let y = self.lanes_y + row as i32 * LANE_HEIGHT + LANE_HEIGHT / 2;
        ScreenPos::new(x, y)
    }

    /// Resolves a pixel position to the timeline step under it.
    ///
    /// Returns `None` outside the panel, inside the label column, on the
    /// gap pixels between slots, and past the right edge of the last slot.
    #[must_use]
    pub fn step_at(&self, pos: ScreenPos) -> Option<usize> {
        if !self.rect.contains(pos) {
            return None;
        }
        let steps = TIMELINE_STEPS as i32;
        let rel = pos.x - self.slots_x;
        if rel < 0 || rel >= self.slot_width * steps + SLOT_GAP * (steps - 1) {
            return None;
        }
        let pitch = self.slot_width + SLOT_GAP;
        if rel % pitch >= self.slot_width {
            return None;
        }
        Some((rel / pitch) as usize)
    }

    /// Resolves a pixel position to the lane under it.
    ///
    /// Returns `None` outside the panel; inside it, positions above the
    /// first lane or below the last clamp to the nearest lane.
    #[must_use]
    pub fn row_at(&self, pos: ScreenPos) -> Option<usize> {
        if !self.rect.contains(pos) {
            return None;
        }
        let rel = (pos.y - self.lanes_y).max(0);
        Some(((rel / LANE_HEIGHT) as usize).min(self.lane_count - 1))
    }
}

/// Timeline system translating panel input into cursor and authoring
/// commands.
#[derive(Clone, Copy, Debug, Default)]
pub struct Timeline {
    scrubbing: bool,
}

impl Timeline {
    /// Creates a new idle timeline system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports whether a scrub drag is in progress.
    #[must_use]
    pub fn is_scrubbing(&self) -> bool {
        self.scrubbing
    }

    /// Consumes this tick's input against the laid-out panel.
    ///
    /// `lanes` lists arm labels in lane order and `selected_lane` is the lane
    /// of the currently selected arm, if any. With an action pending, a press
    /// on a slot of the selected lane toggles that program slot; any other
    /// press inside the panel starts a scrub, which moves the cursor whenever
    /// the pointer is over a slot. `placement_active` blocks new scrubs while
    /// an entity drag is in progress.
    pub fn handle(
        &mut self,
        frame: &InputFrame,
        panel: &TimelinePanel,
        lanes: &[ArmLabel],
        selected_lane: Option<usize>,
        pending_action: Option<ArmAction>,
        placement_active: bool,
        out: &mut Vec<Command>,
    ) {
        if self.scrubbing {
            if !frame.is_down(PointerButton::Primary) {
                self.scrubbing = false;
            } else if let Some(step) = panel.step_at(frame.pointer()) {
                // The world stays silent when the cursor does not move.
                out.push(Command::SetStepCursor { step });
            }
            return;
        }

        if placement_active
            || !frame.just_pressed(PointerButton::Primary)
            || !panel.rect().contains(frame.pointer())
        {
            return;
        }
        let step = panel.step_at(frame.pointer());

        if let (Some(action), Some(step)) = (pending_action, step) {
            if let Some(row) = panel.row_at(frame.pointer()) {
                if selected_lane == Some(row) {
                    if let Some(label) = lanes.get(row) {
                        out.push(Command::ToggleProgramSlot {
                            label: *label,
                            step,
                            action,
                        });
                        return;
                    }
                }
            }
        }

        // Gap pixels and the label column still begin the drag; the cursor
        // catches up once the pointer reaches a slot.
        self.scrubbing = true;
        if let Some(step) = step {
            out.push(Command::SetStepCursor { step });
        }
    }
}
