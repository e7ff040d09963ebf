//! Entities that walk to waypoints and talk.

use std::collections::VecDeque;
use std::fmt;

use tracing::{debug, trace};

use crate::constants::{ARRIVAL_TOLERANCE, SPEECH_CONTINUATION_DELAY_MS, SPEECH_MS_PER_TEN_CHARS, WALK_CYCLE_FRAMES};
use crate::entity::collision::Collider;
use crate::entity::direction::Direction;
use crate::entity::sprite::{Motion, Sprite};
use crate::entity::FrameContext;
use crate::events::{CommandSender, GameCommand, GameEvent};

/// A one-shot callback run when a waypoint is reached or a speech bubble closes.
pub type Callback = Box<dyn FnOnce()>;

/// A queued travel target.
pub struct Waypoint {
    pub x: f64,
    pub z: f64,
    on_arrive: Option<Callback>,
}

impl fmt::Debug for Waypoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Waypoint")
            .field("x", &self.x)
            .field("z", &self.z)
            .field("on_arrive", &self.on_arrive.is_some())
            .finish()
    }
}

/// An open speech bubble.
pub struct Speech {
    pub text: String,
    pub width: f64,
    /// Horizontal offset of the bubble relative to the actor, keeping it on screen.
    pub offset: f64,
    remaining_ms: f64,
    on_done: Option<Callback>,
}

impl Speech {
    pub fn remaining_ms(&self) -> f64 {
        self.remaining_ms
    }
}

impl fmt::Debug for Speech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Speech")
            .field("text", &self.text)
            .field("width", &self.width)
            .field("offset", &self.offset)
            .field("remaining_ms", &self.remaining_ms)
            .field("on_done", &self.on_done.is_some())
            .finish()
    }
}

struct Continuation {
    delay_ms: f64,
    run: Callback,
}

impl fmt::Debug for Continuation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Continuation").field("delay_ms", &self.delay_ms).finish()
    }
}

/// Bubble offset for an actor at `x`, pushing the bubble inwards near the screen sides.
pub fn speech_offset(x: f64, width: f64) -> f64 {
    if x > 800.0 {
        -width + 40.0
    } else if x < 100.0 {
        -10.0
    } else {
        -width / 2.0
    }
}

/// How long a line of text stays on screen.
pub fn speech_duration_ms(text: &str) -> f64 {
    text.chars().count() as f64 / 10.0 * SPEECH_MS_PER_TEN_CHARS
}

#[derive(Debug)]
pub struct Actor {
    sprite: Sprite,
    destination: Option<Waypoint>,
    waypoints: VecDeque<Waypoint>,
    cell: u8,
    speech: Option<Speech>,
    continuation: Option<Continuation>,
    commands: CommandSender,
}

impl Actor {
    pub fn new(sprite: Sprite, commands: CommandSender) -> Self {
        Self {
            sprite,
            destination: None,
            waypoints: VecDeque::new(),
            cell: 0,
            speech: None,
            continuation: None,
            commands,
        }
    }

    pub fn sprite(&self) -> &Sprite {
        &self.sprite
    }

    pub fn sprite_mut(&mut self) -> &mut Sprite {
        &mut self.sprite
    }

    pub fn commands(&self) -> &CommandSender {
        &self.commands
    }

    /// The active travel target.
    pub fn destination(&self) -> Option<(f64, f64)> {
        self.destination.as_ref().map(|w| (w.x, w.z))
    }

    /// The active travel target, or the first queued one.
    pub fn next_target(&self) -> Option<(f64, f64)> {
        self.destination.as_ref().or(self.waypoints.front()).map(|w| (w.x, w.z))
    }

    /// Number of waypoints waiting behind the active one.
    pub fn queued(&self) -> usize {
        self.waypoints.len()
    }

    /// Whether the actor has anywhere left to go.
    pub fn is_travelling(&self) -> bool {
        self.destination.is_some() || !self.waypoints.is_empty()
    }

    /// Walk cycle frame, `0..30`.
    pub fn cell(&self) -> u8 {
        self.cell
    }

    pub(crate) fn advance_cell(&mut self) {
        self.cell = (self.cell + 1) % WALK_CYCLE_FRAMES;
    }

    /// Queues a waypoint behind any existing ones.
    pub fn move_to(&mut self, x: f64, z: f64, on_arrive: Option<Callback>) {
        trace!(entity = %self.sprite.name(), x, z, "Waypoint queued");
        self.waypoints.push_back(Waypoint { x, z, on_arrive });
    }

    /// Shifts the active and queued waypoints by the given amount.
    pub(crate) fn shift_waypoints(&mut self, dx: f64, dz: f64) {
        for waypoint in self.destination.iter_mut().chain(self.waypoints.iter_mut()) {
            waypoint.x += dx;
            waypoint.z += dz;
        }
    }

    /// Stops moving and runs the active waypoint's callback, if any.
    ///
    /// Unless `fully`, the next queued waypoint becomes active on the following update.
    pub fn stop(&mut self, fully: bool) {
        let arrived = self.destination.take();
        self.halt();
        if fully {
            self.waypoints.clear();
        }
        if let Some(on_arrive) = arrived.and_then(|w| w.on_arrive) {
            on_arrive();
        }
    }

    /// Stops moving. The active waypoint, if any, is dropped without running its callback.
    pub(crate) fn halt(&mut self) {
        self.destination = None;
        self.sprite.set_heading(None);
        self.sprite.orient(Direction::empty());
        self.cell = 0;
    }

    /// Advances timers and travel, then takes one movement step.
    pub fn update(&mut self, ctx: &FrameContext) -> Motion {
        self.tick_speech(ctx.delta_ms);
        if !self.sprite.is_visible() {
            return Motion::Stationary;
        }

        if let Some((x, z)) = self.destination() {
            let center = self.sprite.center();
            let anchor = Collider::point(center.x, center.y, self.sprite.z());
            if anchor.touching(&Collider::point(x, center.y, z), ARRIVAL_TOLERANCE) {
                debug!(entity = %self.sprite.name(), x, z, "Arrived");
                self.stop(false);
            } else {
                self.sprite.set_heading(Some((z - self.sprite.z()).atan2(x - center.x)));
                self.advance_cell();
            }
        } else if let Some(next) = self.waypoints.pop_front() {
            self.destination = Some(next);
        }

        if let Some(heading) = self.sprite.heading() {
            self.sprite.orient(Direction::from_heading(heading));
        }
        self.sprite.move_step(ctx)
    }

    /// Collision response: retreat through the position history until clear of `other`.
    ///
    /// Only an actor that moved this frame retreats.
    pub fn hit(&mut self, other: &Sprite) {
        if !self.sprite.moved() {
            return;
        }
        while self.sprite.touching(other) && self.sprite.reset().is_some() {}
    }

    /// Opens a speech bubble and suspends player input until it closes.
    ///
    /// When the bubble closes, `on_done` runs a short moment later. Without one, input is
    /// re-enabled instead.
    pub fn say(&mut self, text: impl Into<String>, width: f64, on_done: Option<Callback>) {
        let text = text.into();
        let offset = speech_offset(self.sprite.x(), width);
        let remaining_ms = speech_duration_ms(&text);
        debug!(entity = %self.sprite.name(), %text, remaining_ms, "Speech shown");

        self.commands.send(GameCommand::DisableInput);
        self.commands.send(GameCommand::Notify(GameEvent::SpeechShown {
            entity: self.sprite.id(),
            text: text.clone(),
            width,
            offset,
        }));
        self.speech = Some(Speech {
            text,
            width,
            offset,
            remaining_ms,
            on_done,
        });
    }

    pub fn speech(&self) -> Option<&Speech> {
        self.speech.as_ref()
    }

    /// Closes the speech bubble early.
    pub fn dismiss_speech(&mut self) {
        if self.speech.is_some() {
            self.close_speech();
        }
    }

    fn tick_speech(&mut self, delta_ms: f64) {
        if let Some(speech) = self.speech.as_mut() {
            speech.remaining_ms -= delta_ms;
            if speech.remaining_ms <= 0.0 {
                self.close_speech();
            }
        } else if let Some(continuation) = self.continuation.as_mut() {
            continuation.delay_ms -= delta_ms;
            if continuation.delay_ms <= 0.0 {
                if let Some(continuation) = self.continuation.take() {
                    (continuation.run)();
                }
            }
        }
    }

    fn close_speech(&mut self) {
        let Some(speech) = self.speech.take() else {
            return;
        };
        self.commands.send(GameCommand::Notify(GameEvent::SpeechHidden { entity: self.sprite.id() }));
        match speech.on_done {
            Some(run) => {
                self.continuation = Some(Continuation {
                    delay_ms: SPEECH_CONTINUATION_DELAY_MS,
                    run,
                })
            }
            None => self.commands.send(GameCommand::EnableInput),
        }
    }
}
