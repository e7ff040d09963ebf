//! Static room data: the edge tables linking rooms, and the props declared in each room.
//!
//! A [`RoomSet`] is the one place that owns room declarations. Props instantiated from a
//! declaration are cached back into it whenever the room is left, so re-entering a room
//! brings back the very same objects.

use std::collections::HashMap;

use glam::DVec3;
use serde::Deserialize;
use tracing::debug;

use crate::entity::{Actor, Entity, Object, Sprite};
use crate::error::RoomError;
use crate::events::CommandSender;

mod edge;
mod parser;

pub use edge::{Crossing, Edge, EdgeDetector, EdgeTable, Exit, ScreenBounds};

/// Room identifier. Rooms are numbered from 1; 0 means "no room".
pub type RoomId = u16;

/// What a prop declaration turns into when its room is entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropKind {
    /// Static dressing: trees, rocks, walls.
    #[default]
    Scenery,
    /// Something that can be picked up and taken out of play.
    Item,
    /// A character that can walk and talk.
    Actor,
}

/// Location of a declaration inside a [`RoomSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PropRef {
    pub room: RoomId,
    pub index: usize,
}

/// A prop placed in a room.
#[derive(Debug)]
pub struct PropDecl {
    pub name: String,
    pub kind: PropKind,
    pub width: f64,
    pub height: f64,
    pub position: DVec3,
    /// Registered by name in the owning [`RoomSet`].
    pub unique: bool,
    pub solid: bool,
    instance: Option<Object>,
    retired: bool,
}

impl PropDecl {
    pub fn new(name: impl Into<String>, kind: PropKind, width: f64, height: f64, position: DVec3) -> Self {
        Self {
            name: name.into(),
            kind,
            width,
            height,
            position,
            unique: false,
            solid: true,
            instance: None,
            retired: false,
        }
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn ignored(mut self) -> Self {
        self.solid = false;
        self
    }

    /// Whether an instance is currently parked in this declaration.
    pub fn is_cached(&self) -> bool {
        self.instance.is_some()
    }

    /// Whether the prop has been taken out of play for good.
    pub fn is_retired(&self) -> bool {
        self.retired
    }

    fn instantiate(&self, origin: PropRef, commands: &CommandSender) -> Object {
        let mut sprite = Sprite::new(self.name.clone(), self.width, self.height);
        sprite.set_position(self.position.x, self.position.y, self.position.z);
        sprite.set_solid(self.solid);
        sprite.set_origin(origin);
        match self.kind {
            PropKind::Actor => Object::Actor(Actor::new(sprite, commands.clone())),
            PropKind::Scenery | PropKind::Item => Object::Prop(sprite),
        }
    }
}

/// One room: its exits and its props.
#[derive(Debug)]
pub struct Room {
    pub name: String,
    pub edges: EdgeTable,
    pub props: Vec<PropDecl>,
}

impl Room {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            edges: EdgeTable::new(),
            props: Vec::new(),
        }
    }

    pub fn with_edges(mut self, edges: EdgeTable) -> Self {
        self.edges = edges;
        self
    }

    pub fn with_prop(mut self, prop: PropDecl) -> Self {
        self.props.push(prop);
        self
    }
}

/// All rooms of a game, plus the registry of unique props.
#[derive(Debug, Default, Deserialize)]
#[serde(try_from = "parser::RawRoomSet")]
pub struct RoomSet {
    rooms: Vec<Room>,
    unique: HashMap<String, PropRef>,
}

impl RoomSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and validates a JSON room table.
    pub fn from_json(json: &str) -> Result<Self, RoomError> {
        let raw: parser::RawRoomSet = serde_json::from_str(json)?;
        RoomSet::try_from(raw)
    }

    /// Appends a room and returns its id. Ids are 1-based and must fit a [`RoomId`].
    pub fn add_room(&mut self, room: Room) -> Result<RoomId, RoomError> {
        let id = RoomId::try_from(self.rooms.len() + 1).map_err(|_| RoomError::TableFull(self.rooms.len()))?;
        for (index, prop) in room.props.iter().enumerate() {
            if prop.unique {
                self.unique.insert(prop.name.clone(), PropRef { room: id, index });
            }
        }
        self.rooms.push(room);
        Ok(id)
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }

    pub fn contains(&self, id: RoomId) -> bool {
        id != 0 && (id as usize) <= self.rooms.len()
    }

    pub fn room(&self, id: RoomId) -> Result<&Room, RoomError> {
        if !self.contains(id) {
            return Err(RoomError::UnknownRoom(id));
        }
        Ok(&self.rooms[id as usize - 1])
    }

    fn room_mut(&mut self, id: RoomId) -> Result<&mut Room, RoomError> {
        if !self.contains(id) {
            return Err(RoomError::UnknownRoom(id));
        }
        Ok(&mut self.rooms[id as usize - 1])
    }

    /// Where `edge` of room `id` leads, or `None` for a wall.
    pub fn exit(&self, id: RoomId, edge: Edge) -> Result<Option<Exit>, RoomError> {
        Ok(self.room(id)?.edges.get(edge))
    }

    /// Looks up a unique prop declaration by name.
    pub fn unique(&self, name: &str) -> Option<(PropRef, &PropDecl)> {
        let origin = *self.unique.get(name)?;
        self.prop(origin).map(|decl| (origin, decl))
    }

    pub fn prop(&self, origin: PropRef) -> Option<&PropDecl> {
        self.room(origin.room).ok()?.props.get(origin.index)
    }

    fn prop_mut(&mut self, origin: PropRef) -> Option<&mut PropDecl> {
        self.room_mut(origin.room).ok()?.props.get_mut(origin.index)
    }

    /// Brings every live prop of a room into play, reusing cached instances.
    pub(crate) fn take_props(&mut self, id: RoomId, commands: &CommandSender) -> Result<Vec<Object>, RoomError> {
        let room = self.room_mut(id)?;
        let mut objects = Vec::with_capacity(room.props.len());
        for (index, decl) in room.props.iter_mut().enumerate() {
            if decl.retired {
                continue;
            }
            let object = match decl.instance.take() {
                Some(object) => object,
                None => decl.instantiate(PropRef { room: id, index }, commands),
            };
            objects.push(object);
        }
        Ok(objects)
    }

    /// Parks an object that left play back in its declaration.
    ///
    /// Objects that were not created from a declaration are dropped.
    pub(crate) fn stash(&mut self, object: Object) {
        let Some(origin) = object.sprite().origin() else {
            debug!(entity = %object.sprite().name(), "Dropping undeclared object");
            return;
        };
        match self.prop_mut(origin) {
            Some(decl) => decl.instance = Some(object),
            None => debug!(entity = %object.sprite().name(), ?origin, "Declaration vanished, dropping object"),
        }
    }

    /// Marks a declaration as permanently out of play.
    pub(crate) fn retire(&mut self, origin: PropRef) {
        if let Some(decl) = self.prop_mut(origin) {
            decl.retired = true;
            decl.instance = None;
        }
    }
}
