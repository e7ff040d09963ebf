//! Everything that lives in a room: props, actors, and the player.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use glam::DVec3;

use crate::error::GameResult;
use crate::room::{EdgeDetector, RoomSet};

pub mod actor;
pub mod collision;
pub mod direction;
pub mod ego;
pub mod speed;
pub mod sprite;

pub use actor::{Actor, Callback, Speech, Waypoint};
pub use collision::Collider;
pub use direction::{Direction, Facing};
pub use ego::Ego;
pub use speed::{Step, StepConfig};
pub use sprite::{Motion, ScreenPlacement, Sprite};

static NEXT_ENTITY_ID: AtomicU32 = AtomicU32::new(1);

/// Identity of an entity, stable for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u32);

impl EntityId {
    pub(crate) fn next() -> Self {
        Self(NEXT_ENTITY_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Per-frame inputs shared by every entity update.
pub struct FrameContext<'a> {
    /// Multiplier applied to every step, 1.0 at 60 frames per second.
    pub step_factor: f64,
    /// Time since the previous frame, in milliseconds.
    pub delta_ms: f64,
    /// Whether room boundaries stop movement this frame.
    pub edges_enabled: bool,
    pub bounds: &'a dyn EdgeDetector,
    pub rooms: &'a RoomSet,
}

impl<'a> FrameContext<'a> {
    /// A 60 Hz frame with boundaries enabled.
    pub fn new(rooms: &'a RoomSet, bounds: &'a dyn EdgeDetector) -> Self {
        Self {
            step_factor: 1.0,
            delta_ms: 1000.0 / 60.0,
            edges_enabled: true,
            bounds,
            rooms,
        }
    }
}

/// Behaviour shared by everything the loop keeps in play.
pub trait Entity {
    fn sprite(&self) -> &Sprite;

    fn sprite_mut(&mut self) -> &mut Sprite;

    fn id(&self) -> EntityId {
        self.sprite().id()
    }

    /// Advances the entity by one frame.
    fn update(&mut self, ctx: &FrameContext) -> GameResult<Motion>;

    /// Called for both members of a touching pair, once per frame.
    fn hit(&mut self, other: &Sprite);

    fn touching(&self, other: &Sprite) -> bool {
        self.sprite().touching(other)
    }

    fn reset(&mut self) -> Option<DVec3> {
        self.sprite_mut().reset()
    }

    /// Called when the entity enters play.
    fn on_attach(&mut self) {
        self.sprite_mut().show();
    }

    /// Called when the entity leaves play.
    fn on_detach(&mut self) {
        self.sprite_mut().hide();
    }
}

impl Entity for Sprite {
    fn sprite(&self) -> &Sprite {
        self
    }

    fn sprite_mut(&mut self) -> &mut Sprite {
        self
    }

    /// Props only move when something sets their direction. A boundary simply blocks them.
    fn update(&mut self, ctx: &FrameContext) -> GameResult<Motion> {
        Ok(self.move_step(ctx))
    }

    fn hit(&mut self, other: &Sprite) {
        Sprite::hit(self, other)
    }
}

impl Entity for Actor {
    fn sprite(&self) -> &Sprite {
        Actor::sprite(self)
    }

    fn sprite_mut(&mut self) -> &mut Sprite {
        Actor::sprite_mut(self)
    }

    fn update(&mut self, ctx: &FrameContext) -> GameResult<Motion> {
        Ok(Actor::update(self, ctx))
    }

    fn hit(&mut self, other: &Sprite) {
        Actor::hit(self, other)
    }
}

impl Entity for Ego {
    fn sprite(&self) -> &Sprite {
        Ego::sprite(self)
    }

    fn sprite_mut(&mut self) -> &mut Sprite {
        Ego::sprite_mut(self)
    }

    fn update(&mut self, ctx: &FrameContext) -> GameResult<Motion> {
        Ego::update(self, ctx)
    }

    fn hit(&mut self, other: &Sprite) {
        self.actor_mut().hit(other)
    }
}

/// An entity in play, dispatched by kind.
#[derive(Debug)]
pub enum Object {
    Prop(Sprite),
    Actor(Actor),
    Ego(Ego),
}

impl Object {
    pub fn as_actor(&self) -> Option<&Actor> {
        match self {
            Object::Prop(_) => None,
            Object::Actor(actor) => Some(actor),
            Object::Ego(ego) => Some(ego.actor()),
        }
    }

    pub fn as_actor_mut(&mut self) -> Option<&mut Actor> {
        match self {
            Object::Prop(_) => None,
            Object::Actor(actor) => Some(actor),
            Object::Ego(ego) => Some(ego.actor_mut()),
        }
    }

    pub fn as_ego(&self) -> Option<&Ego> {
        match self {
            Object::Ego(ego) => Some(ego),
            _ => None,
        }
    }

    pub fn as_ego_mut(&mut self) -> Option<&mut Ego> {
        match self {
            Object::Ego(ego) => Some(ego),
            _ => None,
        }
    }

    fn entity(&self) -> &dyn Entity {
        match self {
            Object::Prop(sprite) => sprite,
            Object::Actor(actor) => actor,
            Object::Ego(ego) => ego,
        }
    }

    fn entity_mut(&mut self) -> &mut dyn Entity {
        match self {
            Object::Prop(sprite) => sprite,
            Object::Actor(actor) => actor,
            Object::Ego(ego) => ego,
        }
    }
}

impl Entity for Object {
    fn sprite(&self) -> &Sprite {
        self.entity().sprite()
    }

    fn sprite_mut(&mut self) -> &mut Sprite {
        self.entity_mut().sprite_mut()
    }

    fn update(&mut self, ctx: &FrameContext) -> GameResult<Motion> {
        self.entity_mut().update(ctx)
    }

    fn hit(&mut self, other: &Sprite) {
        self.entity_mut().hit(other)
    }

    fn on_attach(&mut self) {
        self.entity_mut().on_attach()
    }

    fn on_detach(&mut self) {
        self.entity_mut().on_detach()
    }
}
