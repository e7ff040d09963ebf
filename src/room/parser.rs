//! JSON shapes for room tables, converted into validated [`RoomSet`]s.
//!
//! ```json
//! { "rooms": [
//!     { "name": "meadow", "edges": [0, 2, 0, { "room": 3, "entry": 3 }],
//!       "props": [ { "name": "oak", "width": 80, "height": 200, "x": 300, "z": 600 } ] }
//! ] }
//! ```
//!
//! Edges are listed west, east, south, north. An edge is either a room id (0 for a wall)
//! or an object naming the room and the side of it to enter from.

use glam::DVec3;
use serde::Deserialize;

use crate::error::RoomError;
use crate::room::{Edge, EdgeTable, Exit, PropDecl, PropKind, Room, RoomId, RoomSet};

#[derive(Debug, Deserialize)]
pub(crate) struct RawRoomSet {
    rooms: Vec<RawRoom>,
}

#[derive(Debug, Deserialize)]
struct RawRoom {
    name: String,
    #[serde(default)]
    edges: [RawExit; 4],
    #[serde(default)]
    props: Vec<RawProp>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(untagged)]
enum RawExit {
    Room(RoomId),
    WithEntry { room: RoomId, entry: u8 },
}

impl Default for RawExit {
    fn default() -> Self {
        RawExit::Room(0)
    }
}

#[derive(Debug, Deserialize)]
struct RawProp {
    name: String,
    #[serde(default)]
    kind: PropKind,
    width: f64,
    height: f64,
    x: f64,
    #[serde(default)]
    y: f64,
    z: f64,
    #[serde(default)]
    unique: bool,
    #[serde(default = "default_solid")]
    solid: bool,
}

fn default_solid() -> bool {
    true
}

impl TryFrom<RawRoomSet> for RoomSet {
    type Error = RoomError;

    fn try_from(raw: RawRoomSet) -> Result<Self, Self::Error> {
        let count = raw.rooms.len();
        let mut rooms = RoomSet::new();

        for room in raw.rooms {
            let mut edges = EdgeTable::new();
            for (edge, exit) in Edge::ALL.into_iter().zip(room.edges) {
                let (target, entry) = match exit {
                    RawExit::Room(0) | RawExit::WithEntry { room: 0, .. } => continue,
                    RawExit::Room(target) => (target, None),
                    RawExit::WithEntry { room: target, entry } => {
                        let side = Edge::from_code(entry).ok_or_else(|| {
                            RoomError::InvalidConfig(format!("room '{}': invalid entry side {entry}", room.name))
                        })?;
                        (target, Some(side))
                    }
                };
                if target as usize > count {
                    return Err(RoomError::InvalidConfig(format!(
                        "room '{}': {} edge leads to unknown room {target}",
                        room.name,
                        edge.as_ref()
                    )));
                }
                edges.set(edge, Exit { room: target, entry });
            }

            let mut built = Room::new(room.name).with_edges(edges);
            for prop in room.props {
                if prop.width <= 0.0 || prop.height <= 0.0 {
                    return Err(RoomError::InvalidConfig(format!(
                        "room '{}': prop '{}' has no size",
                        built.name, prop.name
                    )));
                }
                let mut decl = PropDecl::new(prop.name, prop.kind, prop.width, prop.height, DVec3::new(prop.x, prop.y, prop.z));
                decl.unique = prop.unique;
                decl.solid = prop.solid;
                built = built.with_prop(decl);
            }
            rooms.add_room(built)?;
        }

        Ok(rooms)
    }
}
