//! Room edges: where the screen ends, and where each side leads.

use micromap::Map;
use strum_macros::{AsRefStr, EnumIter};

use crate::constants::{GROUND_Z, HORIZON_Z, SCREEN_WIDTH};
use crate::room::RoomId;

/// One of the four sides of a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Edge {
    West = 1,
    East = 2,
    South = 3,
    North = 4,
}

impl Edge {
    pub const ALL: [Edge; 4] = [Edge::West, Edge::East, Edge::South, Edge::North];

    pub const fn opposite(self) -> Edge {
        match self {
            Edge::West => Edge::East,
            Edge::East => Edge::West,
            Edge::South => Edge::North,
            Edge::North => Edge::South,
        }
    }

    /// The numeric edge code (1 = west, 2 = east, 3 = south, 4 = north).
    pub const fn code(self) -> u8 {
        self as u8
    }

    pub const fn from_code(code: u8) -> Option<Edge> {
        match code {
            1 => Some(Edge::West),
            2 => Some(Edge::East),
            3 => Some(Edge::South),
            4 => Some(Edge::North),
            _ => None,
        }
    }
}

/// A boundary an entity tried to move across.
///
/// Besides the four screen sides, detectors may report game specific codes (paths,
/// doors). Those have no entry in an edge table and always block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Crossing {
    Side(Edge),
    Extended(u8),
}

impl Crossing {
    pub fn from_code(code: u8) -> Crossing {
        Edge::from_code(code).map_or(Crossing::Extended(code), Crossing::Side)
    }

    pub fn code(self) -> u8 {
        match self {
            Crossing::Side(edge) => edge.code(),
            Crossing::Extended(code) => code,
        }
    }
}

/// Decides whether a candidate position lies across a room boundary.
pub trait EdgeDetector {
    /// `x` and `z` are the candidate top-left position, `width` the entity's width.
    fn crossing(&self, x: f64, z: f64, width: f64) -> Option<Crossing>;
}

/// Rectangular screen limits: the left and right borders, the horizon and the front of the ground.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenBounds {
    pub width: f64,
    pub horizon: f64,
    pub ground: f64,
}

impl Default for ScreenBounds {
    fn default() -> Self {
        Self {
            width: SCREEN_WIDTH,
            horizon: HORIZON_Z,
            ground: GROUND_Z,
        }
    }
}

impl EdgeDetector for ScreenBounds {
    /// When several limits are crossed at once the later check wins, so the
    /// horizon takes priority over the ground, which takes priority over the sides.
    fn crossing(&self, x: f64, z: f64, width: f64) -> Option<Crossing> {
        let mut edge = None;
        if x < 0.0 {
            edge = Some(Edge::West);
        }
        if x + width > self.width {
            edge = Some(Edge::East);
        }
        if z > self.ground {
            edge = Some(Edge::South);
        }
        if z < self.horizon {
            edge = Some(Edge::North);
        }
        edge.map(Crossing::Side)
    }
}

/// Where an edge leads: the destination room, and optionally the side of that room
/// the entity appears on. Without one, the entity enters from the opposite side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Exit {
    pub room: RoomId,
    pub entry: Option<Edge>,
}

impl Exit {
    pub fn to(room: RoomId) -> Self {
        Self { room, entry: None }
    }

    /// The side of the destination room an entity that crossed `edge` enters from.
    pub fn entry_side(&self, edge: Edge) -> Edge {
        self.entry.unwrap_or(edge.opposite())
    }
}

/// Up to four exits, one per side. A missing side is a wall.
#[derive(Debug, Clone, Default)]
pub struct EdgeTable {
    exits: Map<Edge, Exit, 4>,
}

impl EdgeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from destination room ids in `[west, east, south, north]` order, where 0 is a wall.
    pub fn from_rooms(rooms: [RoomId; 4]) -> Self {
        let mut table = Self::new();
        for (edge, room) in Edge::ALL.into_iter().zip(rooms) {
            if room != 0 {
                table.set(edge, Exit::to(room));
            }
        }
        table
    }

    pub fn set(&mut self, edge: Edge, exit: Exit) {
        self.exits.insert(edge, exit);
    }

    pub fn get(&self, edge: Edge) -> Option<Exit> {
        self.exits.get(&edge).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Edge, Exit)> + '_ {
        self.exits.iter().map(|(edge, exit)| (*edge, *exit))
    }
}
