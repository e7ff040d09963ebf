#![allow(dead_code)]

use std::cell::Cell;
use std::rc::Rc;

use glam::DVec3;
use roomwalk::entity::{Actor, Callback, Ego, FrameContext, Sprite};
use roomwalk::events::{command_channel, CommandQueue, GameCommand};
use roomwalk::room::{EdgeTable, PropDecl, PropKind, Room, RoomId, RoomSet, ScreenBounds};

/// A shown sprite of the given width, placed at `(x, 0, z)`.
pub fn placed(name: &str, width: f64, x: f64, z: f64) -> Sprite {
    let mut sprite = Sprite::new(name, width, 100.0);
    sprite.set_position(x, 0.0, z);
    sprite.show();
    sprite
}

/// A shown actor and the queue its commands land in.
pub fn actor_at(name: &str, x: f64, z: f64) -> (Actor, CommandQueue) {
    let (sender, queue) = command_channel();
    (Actor::new(placed(name, 50.0, x, z), sender), queue)
}

/// A shown player in `room` and the queue its commands land in.
pub fn ego_at(room: RoomId, x: f64, z: f64) -> (Ego, CommandQueue) {
    let (actor, queue) = actor_at("ego", x, z);
    (Ego::new(actor, room), queue)
}

/// A 60 Hz frame with a step factor of exactly 1.
pub fn frame<'a>(rooms: &'a RoomSet, bounds: &'a ScreenBounds) -> FrameContext<'a> {
    FrameContext::new(rooms, bounds)
}

/// Room 1 with the given `[west, east, south, north]` edges, plus empty rooms up to `count`.
pub fn rooms_with_edges(edges: [RoomId; 4], count: u16) -> RoomSet {
    let mut rooms = RoomSet::new();
    rooms.add_room(Room::new("start").with_edges(EdgeTable::from_rooms(edges))).unwrap();
    for n in 2..=count {
        rooms.add_room(Room::new(format!("room {n}"))).unwrap();
    }
    rooms
}

pub fn scenery(name: &str, width: f64, x: f64, z: f64) -> PropDecl {
    PropDecl::new(name, PropKind::Scenery, width, width, DVec3::new(x, 0.0, z))
}

/// A callback that counts how often it ran.
pub fn counter() -> (Rc<Cell<u32>>, Callback) {
    let count = Rc::new(Cell::new(0));
    let handle = count.clone();
    (count, Box::new(move || handle.set(handle.get() + 1)))
}

pub fn drain(queue: &CommandQueue) -> Vec<GameCommand> {
    queue.drain().collect()
}
