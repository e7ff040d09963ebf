use bitflags::bitflags;
use strum_macros::{AsRefStr, EnumIter};

/// Quadrant thresholds used by [`Direction::from_heading`], in radians.
const LEFT_QUADRANT: f64 = 2.356;
const RIGHT_QUADRANT: f64 = 0.785;

bitflags! {
    /// Movement direction of an entity, as a bit mask.
    ///
    /// Composite values are diagonals, e.g. `LEFT | IN`. `IN` moves towards the horizon
    /// (decreasing z), `OUT` moves towards the viewer (increasing z).
    ///
    /// Bits outside [`Direction::PLANAR`] may be layered into the same word (jumping, for
    /// instance) and never influence the heading.
    #[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Direction: u8 {
        const LEFT = 0x01;
        const RIGHT = 0x02;
        const IN = 0x04;
        const OUT = 0x08;
        const JUMP_UP = 0x10;
        const JUMP_DOWN = 0x20;

        const PLANAR = Self::LEFT.bits() | Self::RIGHT.bits() | Self::IN.bits() | Self::OUT.bits();
    }
}

impl Direction {
    /// The four single-bit directions, in bit order.
    pub const CARDINALS: [Direction; 4] = [Direction::LEFT, Direction::RIGHT, Direction::IN, Direction::OUT];

    /// Returns the heading (radians) for this mask, or `None` if no planar bit is set.
    ///
    /// Each axis contributes -1, 0 or +1 before the `atan2`, so the result is always a
    /// multiple of 45°. Opposing bits cancel on their axis; when both axes cancel
    /// (e.g. `LEFT | RIGHT`) there is no heading at all.
    pub fn heading(self) -> Option<f64> {
        let axis = |pos: Direction, neg: Direction| self.contains(pos) as i8 as f64 - self.contains(neg) as i8 as f64;
        let dz = axis(Direction::OUT, Direction::IN);
        let dx = axis(Direction::RIGHT, Direction::LEFT);
        if dx == 0.0 && dz == 0.0 {
            return None;
        }
        Some(dz.atan2(dx))
    }

    /// Returns the single cardinal direction closest to a heading, by quadrant.
    ///
    /// The thresholds sit just below 135° and 45°, so the exact diagonals `OUT | LEFT` and
    /// `IN | LEFT` map to `LEFT` while `OUT | RIGHT` and `IN | RIGHT` map to `OUT` and `IN`.
    pub fn from_heading(heading: f64) -> Direction {
        if heading.abs() > LEFT_QUADRANT {
            Direction::LEFT
        } else if heading.abs() < RIGHT_QUADRANT {
            Direction::RIGHT
        } else if heading > 0.0 {
            Direction::OUT
        } else {
            Direction::IN
        }
    }

    /// Returns the facing for the lowest set planar bit, if any.
    pub fn facing(self) -> Option<Facing> {
        Facing::ALL.into_iter().find(|facing| self.contains(facing.direction()))
    }
}

/// The way an entity's sprite sheet faces. Only ever one of four.
///
/// Discriminants match the sprite sheet column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, AsRefStr, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Facing {
    Left = 1,
    Right = 2,
    In = 3,
    #[default]
    Out = 4,
}

impl Facing {
    pub const ALL: [Facing; 4] = [Facing::Left, Facing::Right, Facing::In, Facing::Out];

    pub const fn direction(self) -> Direction {
        match self {
            Facing::Left => Direction::LEFT,
            Facing::Right => Direction::RIGHT,
            Facing::In => Direction::IN,
            Facing::Out => Direction::OUT,
        }
    }

    /// Zero-based sprite sheet column.
    pub const fn as_usize(self) -> usize {
        self as usize - 1
    }
}
