//! Snapshot-pair input model consumed by the editor systems.
//!
//! Adapters capture one [`InputSnapshot`] per tick; the engine keeps the
//! current and previous snapshots side by side in an [`InputFrame`] so that
//! edges (just-pressed, just-released) are computed by comparison and never
//! by polling mid-tick.

/// State of a single pointer button.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ButtonState {
    /// The button is not held down.
    #[default]
    Released,
    /// The button is held down.
    Pressed,
}

impl ButtonState {
    /// Reports whether the button is currently held.
    #[must_use]
    pub const fn is_pressed(self) -> bool {
        matches!(self, Self::Pressed)
    }
}

/// Pointer buttons the editor reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerButton {
    /// Main button used for drags and scrubbing.
    Primary,
    /// Alternate button used for deletion.
    Secondary,
}

/// Fixed keyset the editor reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EditKey {
    /// Rotate the drag ghost or targeted arm counter-clockwise.
    RotateLeft,
    /// Rotate the drag ghost or targeted arm clockwise.
    RotateRight,
    /// Increase the ghost or targeted arm extension.
    ExtendIncrease,
    /// Decrease the ghost or targeted arm extension.
    ExtendDecrease,
    /// Select the hovered entity.
    Confirm,
    /// Delete the hovered entity.
    Delete,
    /// Clear the current selection.
    Cancel,
}

impl EditKey {
    const COUNT: usize = 7;

    const fn index(self) -> usize {
        match self {
            Self::RotateLeft => 0,
            Self::RotateRight => 1,
            Self::ExtendIncrease => 2,
            Self::ExtendDecrease => 3,
            Self::Confirm => 4,
            Self::Delete => 5,
            Self::Cancel => 6,
        }
    }
}

/// Set of keys held down within one snapshot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct KeySet {
    held: [bool; EditKey::COUNT],
}

impl KeySet {
    /// Returns a copy of the set with the provided key held down.
    #[must_use]
    pub const fn with_down(mut self, key: EditKey) -> Self {
        self.held[key.index()] = true;
        self
    }

    /// Reports whether the provided key is held down.
    #[must_use]
    pub const fn is_down(&self, key: EditKey) -> bool {
        self.held[key.index()]
    }
}

/// Pointer position expressed in screen pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ScreenPos {
    /// Horizontal pixel coordinate.
    pub x: i32,
    /// Vertical pixel coordinate.
    pub y: i32,
}

impl ScreenPos {
    /// Creates a new screen position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle expressed in screen pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ScreenRect {
    x: i32,
    y: i32,
    width: i32,
    height: i32,
}

impl ScreenRect {
    /// Creates a new rectangle from its top-left corner and dimensions.
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Left edge of the rectangle.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Top edge of the rectangle.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Width of the rectangle in pixels.
    #[must_use]
    pub const fn width(&self) -> i32 {
        self.width
    }

    /// Height of the rectangle in pixels.
    #[must_use]
    pub const fn height(&self) -> i32 {
        self.height
    }

    /// One pixel past the right edge.
    #[must_use]
    pub const fn right(&self) -> i32 {
        self.x + self.width
    }

    /// One pixel past the bottom edge.
    #[must_use]
    pub const fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Reports whether the point lies inside the rectangle.
    #[must_use]
    pub const fn contains(&self, point: ScreenPos) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }
}

/// Complete input state captured by an adapter for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    /// Pointer position at capture time.
    pub pointer: ScreenPos,
    /// State of the primary pointer button.
    pub primary: ButtonState,
    /// State of the secondary pointer button.
    pub secondary: ButtonState,
    /// Keys held down at capture time.
    pub keys: KeySet,
}

/// Current and previous input snapshots compared for edge detection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputFrame {
    current: InputSnapshot,
    previous: InputSnapshot,
}

impl InputFrame {
    /// Creates a frame from explicit current and previous snapshots.
    #[must_use]
    pub const fn new(current: InputSnapshot, previous: InputSnapshot) -> Self {
        Self { current, previous }
    }

    /// Produces the next frame by shifting `current` into `previous`.
    #[must_use]
    pub const fn advanced(self, next: InputSnapshot) -> Self {
        Self {
            current: next,
            previous: self.current,
        }
    }

    /// Pointer position captured this tick.
    #[must_use]
    pub const fn pointer(&self) -> ScreenPos {
        self.current.pointer
    }

    const fn button(&self, button: PointerButton) -> (ButtonState, ButtonState) {
        match button {
            PointerButton::Primary => (self.current.primary, self.previous.primary),
            PointerButton::Secondary => (self.current.secondary, self.previous.secondary),
        }
    }

    /// Reports whether the button transitioned from released to pressed.
    #[must_use]
    pub const fn just_pressed(&self, button: PointerButton) -> bool {
        let (current, previous) = self.button(button);
        current.is_pressed() && !previous.is_pressed()
    }

    /// Reports whether the button transitioned from pressed to released.
    #[must_use]
    pub const fn just_released(&self, button: PointerButton) -> bool {
        let (current, previous) = self.button(button);
        !current.is_pressed() && previous.is_pressed()
    }

    /// Reports whether the button is held down this tick.
    #[must_use]
    pub const fn is_down(&self, button: PointerButton) -> bool {
        self.button(button).0.is_pressed()
    }

    /// Reports whether the key transitioned from up to down this tick.
    #[must_use]
    pub const fn key_just_pressed(&self, key: EditKey) -> bool {
        self.current.keys.is_down(key) && !self.previous.keys.is_down(key)
    }
}
