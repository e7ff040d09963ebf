//! Player input: keys, a four-way joystick, and pointer drags.
//!
//! Device capture happens elsewhere. Whatever captures events feeds them to
//! [`UserInput::handle`]; the loop only ever reads the four directional signals
//! through [`DirectionalInput`].

use std::collections::HashSet;

use bitflags::bitflags;
use glam::DVec2;
use tracing::trace;

/// The four directional signals the player entity steers by.
pub trait DirectionalInput {
    fn left(&self) -> bool;
    fn right(&self) -> bool;
    fn up(&self) -> bool;
    fn down(&self) -> bool;
}

bitflags! {
    /// Held arrow keys.
    #[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Joystick: u8 {
        const LEFT = 1;
        const UP = 2;
        const RIGHT = 4;
        const DOWN = 8;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Up,
    Right,
    Down,
    Other(u32),
}

impl Key {
    /// Maps a browser-style key code (37 to 40 are the arrows).
    pub fn from_code(code: u32) -> Key {
        match code {
            37 => Key::Left,
            38 => Key::Up,
            39 => Key::Right,
            40 => Key::Down,
            other => Key::Other(other),
        }
    }

    fn joystick(self) -> Joystick {
        match self {
            Key::Left => Joystick::LEFT,
            Key::Up => Joystick::UP,
            Key::Right => Joystick::RIGHT,
            Key::Down => Joystick::DOWN,
            Key::Other(_) => Joystick::empty(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerSource {
    Mouse,
    Touch,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    KeyDown(Key),
    KeyUp(Key),
    /// Position in screen pixels, time in milliseconds.
    PointerDown { source: PointerSource, at: DVec2, time_ms: f64 },
    PointerMove { source: PointerSource, at: DVec2, time_ms: f64 },
    PointerUp { source: PointerSource, at: DVec2, time_ms: f64 },
}

/// A pointer position with the time it was recorded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragPoint {
    pub at: DVec2,
    pub time_ms: f64,
}

/// A drag gesture in progress or just finished.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Drag {
    pub start: Option<DragPoint>,
    pub now: Option<DragPoint>,
    pub end: Option<DragPoint>,
}

#[derive(Debug, Clone)]
pub struct UserInput {
    enabled: bool,
    running: bool,
    keys: HashSet<Key>,
    joystick: Joystick,
    old_joystick: Joystick,
    pointer: DVec2,
    button_down: bool,
    drag: Drag,
}

impl Default for UserInput {
    fn default() -> Self {
        Self::new()
    }
}

impl UserInput {
    pub fn new() -> Self {
        Self {
            enabled: true,
            running: true,
            keys: HashSet::new(),
            joystick: Joystick::empty(),
            old_joystick: Joystick::empty(),
            pointer: DVec2::ZERO,
            button_down: false,
            drag: Drag::default(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    /// Stops accepting input and forgets anything currently held.
    pub fn disable(&mut self) {
        self.enabled = false;
        self.keys.clear();
        self.joystick = Joystick::empty();
    }

    /// Drags are only tracked while the game is running (not paused).
    pub fn set_running(&mut self, running: bool) {
        self.running = running;
    }

    pub fn joystick(&self) -> Joystick {
        self.joystick
    }

    /// The joystick as it was at the end of the previous frame.
    pub fn old_joystick(&self) -> Joystick {
        self.old_joystick
    }

    pub fn is_key_down(&self, key: Key) -> bool {
        self.keys.contains(&key)
    }

    pub fn pointer(&self) -> DVec2 {
        self.pointer
    }

    pub fn drag(&self) -> &Drag {
        &self.drag
    }

    pub fn handle(&mut self, event: InputEvent) {
        if !self.enabled {
            return;
        }
        trace!(?event, "Input event");

        match event {
            InputEvent::KeyDown(key) => {
                self.keys.insert(key);
                self.joystick |= key.joystick();
            }
            InputEvent::KeyUp(key) => {
                self.keys.remove(&key);
                self.joystick &= !key.joystick();
            }
            InputEvent::PointerDown { source, at, time_ms } => {
                self.pointer = at;
                if source == PointerSource::Mouse {
                    self.button_down = true;
                }
                if self.running {
                    let point = DragPoint { at, time_ms };
                    self.drag = Drag {
                        start: Some(point),
                        now: Some(point),
                        end: None,
                    };
                }
            }
            InputEvent::PointerMove { source, at, time_ms } => {
                self.pointer = at;
                // A mouse only drags with the button held; a moving touch always does.
                let dragging = source == PointerSource::Touch || self.button_down;
                if self.running && dragging {
                    self.drag.now = Some(DragPoint { at, time_ms });
                }
            }
            InputEvent::PointerUp { at, time_ms, .. } => {
                self.pointer = at;
                self.button_down = false;
                if self.running {
                    let point = DragPoint { at, time_ms };
                    self.drag.now = Some(point);
                    self.drag.end = Some(point);
                }
            }
        }
    }

    /// Snapshots the joystick so the next frame can tell what changed.
    pub fn end_frame(&mut self) {
        self.old_joystick = self.joystick;
    }

    /// Directions pressed since the previous frame.
    pub fn just_pressed(&self) -> Joystick {
        self.joystick & !self.old_joystick
    }
}

impl DirectionalInput for UserInput {
    fn left(&self) -> bool {
        self.joystick.contains(Joystick::LEFT)
    }

    fn right(&self) -> bool {
        self.joystick.contains(Joystick::RIGHT)
    }

    fn up(&self) -> bool {
        self.joystick.contains(Joystick::UP)
    }

    fn down(&self) -> bool {
        self.joystick.contains(Joystick::DOWN)
    }
}

/// A fixed set of directional signals, for scripted input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Signals {
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl Signals {
    pub const NONE: Signals = Signals {
        left: false,
        right: false,
        up: false,
        down: false,
    };
}

impl From<Joystick> for Signals {
    fn from(joystick: Joystick) -> Self {
        Signals {
            left: joystick.contains(Joystick::LEFT),
            right: joystick.contains(Joystick::RIGHT),
            up: joystick.contains(Joystick::UP),
            down: joystick.contains(Joystick::DOWN),
        }
    }
}

impl DirectionalInput for Signals {
    fn left(&self) -> bool {
        self.left
    }

    fn right(&self) -> bool {
        self.right
    }

    fn up(&self) -> bool {
        self.up
    }

    fn down(&self) -> bool {
        self.down
    }
}
