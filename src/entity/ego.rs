//! The player-controlled actor.

use glam::DVec3;
use tracing::{debug, info};

use crate::constants::{ENTRY_WALK_IN, NORTH_ENTRY_Z, SCREEN_WIDTH, SOUTH_ENTRY_Z};
use crate::entity::actor::Actor;
use crate::entity::direction::Direction;
use crate::entity::sprite::{Motion, Sprite};
use crate::entity::FrameContext;
use crate::error::{GameResult, RoomError};
use crate::events::GameCommand;
use crate::input::DirectionalInput;
use crate::room::{Crossing, Edge, RoomId, RoomSet};

#[derive(Debug)]
pub struct Ego {
    actor: Actor,
    room: RoomId,
    entering: Option<Edge>,
    departure: Option<DVec3>,
}

impl Ego {
    pub fn new(actor: Actor, room: RoomId) -> Self {
        Self {
            actor,
            room,
            entering: None,
            departure: None,
        }
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    pub fn actor_mut(&mut self) -> &mut Actor {
        &mut self.actor
    }

    pub fn sprite(&self) -> &Sprite {
        self.actor.sprite()
    }

    pub fn sprite_mut(&mut self) -> &mut Sprite {
        self.actor.sprite_mut()
    }

    /// The room the player is in. The loop follows this after every update pass.
    pub fn room(&self) -> RoomId {
        self.room
    }

    pub fn set_room(&mut self, room: RoomId) {
        self.room = room;
    }

    /// The side the player entered the current room from, while still walking in.
    pub fn entering(&self) -> Option<Edge> {
        self.entering
    }

    /// Turns the four directional signals into a direction.
    ///
    /// Opposite signals cancel each other out. Up walks towards the horizon, down towards
    /// the viewer.
    pub fn process_user_input(&mut self, input: &dyn DirectionalInput) {
        let mut direction = Direction::empty();
        if input.left() != input.right() {
            direction |= if input.left() { Direction::LEFT } else { Direction::RIGHT };
        }
        if input.up() != input.down() {
            direction |= if input.up() { Direction::IN } else { Direction::OUT };
        }

        if !direction.is_empty() {
            self.actor.advance_cell();
        }
        self.sprite_mut().set_direction(direction);
    }

    pub fn update(&mut self, ctx: &FrameContext) -> GameResult<Motion> {
        let motion = self.actor.update(ctx);
        if let Motion::Crossed(crossing) = motion {
            self.hit_edge(crossing, ctx.rooms)?;
        }
        if self.entering.is_some() && self.sprite().is_visible() && !self.actor.is_travelling() {
            self.entering = None;
            self.departure = None;
        }
        Ok(motion)
    }

    /// Reacts to the player walking into a room boundary.
    ///
    /// Movement always stops. If the current room has an exit on that side, input is
    /// suspended, the player is moved to the destination room's entry point and starts
    /// walking in; reaching the end of that walk re-enables input. Returns whether the
    /// player left the room.
    pub fn hit_edge(&mut self, crossing: Crossing, rooms: &RoomSet) -> GameResult<bool> {
        self.actor.halt();
        self.sprite_mut().step_mut().reset();

        let Crossing::Side(edge) = crossing else {
            debug!(entity = %self.sprite().name(), code = crossing.code(), "No exit for extended edge");
            return Ok(false);
        };
        let Some(exit) = rooms.exit(self.room, edge)? else {
            debug!(entity = %self.sprite().name(), room = self.room, edge = edge.as_ref(), "Edge blocked");
            return Ok(false);
        };
        if !rooms.contains(exit.room) {
            return Err(RoomError::UnknownRoom(exit.room).into());
        }

        info!(from = self.room, to = exit.room, edge = edge.as_ref(), "Leaving room");
        self.actor.commands().send(GameCommand::DisableInput);
        self.sprite_mut().hide();
        self.room = exit.room;
        self.enter_from(exit.entry_side(edge));
        Ok(true)
    }

    /// Places the player just outside the given side of the room and queues the walk in.
    ///
    /// The position it leaves from is kept until the walk in ends, see [`Ego::abort_exit`].
    pub fn enter_from(&mut self, side: Edge) {
        self.departure = Some(self.sprite().position());
        let commands = self.actor.commands().clone();
        let sprite = self.actor.sprite_mut();
        let (width, y, z) = (sprite.width(), sprite.y(), sprite.z());

        let (facing, target) = match side {
            Edge::West => {
                sprite.set_position(-2.0 * width, y, z);
                (Direction::RIGHT, (width + ENTRY_WALK_IN, z))
            }
            Edge::East => {
                sprite.set_position(SCREEN_WIDTH + width, y, z);
                (Direction::LEFT, (SCREEN_WIDTH - width - ENTRY_WALK_IN, z))
            }
            Edge::South => {
                sprite.set_position(sprite.x(), y, SOUTH_ENTRY_Z.0);
                (Direction::IN, (sprite.center().x, SOUTH_ENTRY_Z.1))
            }
            Edge::North => {
                sprite.set_position(sprite.x(), y, NORTH_ENTRY_Z.0);
                (Direction::OUT, (sprite.center().x, NORTH_ENTRY_Z.1))
            }
        };
        sprite.set_direction(facing);
        sprite.step_mut().reset();

        self.actor.move_to(
            target.0,
            target.1,
            Some(Box::new(move || commands.send(GameCommand::EnableInput))),
        );
        self.entering = Some(side);
    }

    /// Stops walking unless the player is being walked somewhere.
    pub fn stand_still(&mut self) {
        if !self.actor.is_travelling() {
            self.actor.halt();
        }
    }

    /// Cancels a room change: the player goes back to `room`, to where it stood before
    /// entering, and stops.
    pub fn abort_exit(&mut self, room: RoomId) {
        self.room = room;
        self.entering = None;
        if let Some(position) = self.departure.take() {
            self.sprite_mut().set_position(position.x, position.y, position.z);
        }
        self.actor.stop(true);
    }

    /// Moves the player and its pending waypoints by the same offset.
    pub(crate) fn nudge(&mut self, dx: f64, dz: f64) {
        let position = self.sprite().position();
        self.sprite_mut().set_position(position.x + dx, position.y, position.z + dz);
        self.actor.shift_waypoints(dx, dz);
    }
}
