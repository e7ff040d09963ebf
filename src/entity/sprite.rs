//! Positioned, directional, collidable entity.

use circular_buffer::CircularBuffer;
use glam::DVec3;
use tracing::trace;

use crate::constants::POSITION_HISTORY;
use crate::entity::collision::Collider;
use crate::entity::direction::{Direction, Facing};
use crate::entity::speed::{Step, StepConfig};
use crate::entity::{EntityId, FrameContext};
use crate::room::{Crossing, Edge, EdgeDetector, PropRef};

/// Outcome of a single movement step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    /// No heading, nothing to do. The step is reset unless non-planar bits are still held.
    Stationary,
    /// The step rounded to zero pixels, position unchanged.
    Unchanged,
    /// The new position was committed.
    Moved,
    /// The candidate position lies across a boundary and was not committed.
    Crossed(Crossing),
}

/// Where and in which order the render layer should draw a sprite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPlacement {
    pub left: f64,
    pub top: f64,
    pub z_index: i64,
}

#[derive(Debug)]
pub struct Sprite {
    id: EntityId,
    name: String,
    width: f64,
    height: f64,
    radius: f64,
    position: DVec3,
    center: DVec3,
    placed: bool,
    history: CircularBuffer<POSITION_HISTORY, DVec3>,
    direction: Direction,
    previous_direction: Direction,
    facing: Facing,
    heading: Option<f64>,
    step: Step,
    solid: bool,
    moved: bool,
    visible: bool,
    opacity: f64,
    origin: Option<PropRef>,
}

impl Sprite {
    /// Creates an unplaced, hidden, stationary sprite. The collision radius is half the width.
    pub fn new(name: impl Into<String>, width: f64, height: f64) -> Self {
        Self::with_step(name, width, height, StepConfig::default())
    }

    pub fn with_step(name: impl Into<String>, width: f64, height: f64, step: StepConfig) -> Self {
        let radius = width / 2.0;
        Self {
            id: EntityId::next(),
            name: name.into(),
            width,
            height,
            radius,
            position: DVec3::ZERO,
            center: DVec3::splat(radius),
            placed: false,
            history: CircularBuffer::new(),
            direction: Direction::empty(),
            previous_direction: Direction::empty(),
            facing: Facing::default(),
            heading: None,
            step: Step::new(step),
            solid: true,
            moved: false,
            visible: false,
            opacity: 1.0,
            origin: None,
        }
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn position(&self) -> DVec3 {
        self.position
    }

    pub fn x(&self) -> f64 {
        self.position.x
    }

    pub fn y(&self) -> f64 {
        self.position.y
    }

    pub fn z(&self) -> f64 {
        self.position.z
    }

    /// The top-left position offset by the radius on every axis.
    pub fn center(&self) -> DVec3 {
        self.center
    }

    /// Moves the sprite, remembering where it was unless this is its first placement.
    pub fn set_position(&mut self, x: f64, y: f64, z: f64) {
        if self.placed {
            self.history.push_front(self.position);
        }
        self.placed = true;
        self.place(DVec3::new(x, y, z));
    }

    fn place(&mut self, position: DVec3) {
        self.position = position;
        self.center = position + DVec3::splat(self.radius);
    }

    /// Number of remembered positions, most recent first.
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn previous_direction(&self) -> Direction {
        self.previous_direction
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn heading(&self) -> Option<f64> {
        self.heading
    }

    pub fn set_heading(&mut self, heading: Option<f64>) {
        self.heading = heading;
    }

    /// Sets the direction mask and derives the heading from its planar bits.
    ///
    /// An empty mask makes the sprite stationary.
    pub fn set_direction(&mut self, direction: Direction) {
        self.orient(direction);
        self.heading = direction.heading();
    }

    /// Sets the direction mask without touching the heading.
    ///
    /// The previous direction and the facing only change when a non-empty mask differs
    /// from the current one, so diagonals keep whichever facing was held before.
    pub fn orient(&mut self, direction: Direction) {
        if !direction.is_empty() && direction != self.direction {
            self.previous_direction = self.direction;
            if let Some(facing) = direction.facing() {
                self.facing = facing;
            }
        }
        self.direction = direction;
    }

    pub fn step(&self) -> &Step {
        &self.step
    }

    pub fn step_mut(&mut self) -> &mut Step {
        &mut self.step
    }

    /// Advances one step along the heading.
    ///
    /// The distance is rounded to whole pixels before projecting. When boundaries are
    /// enabled for this frame and the candidate lies further outside them, nothing is
    /// committed and the crossing is returned for the caller to act on.
    pub fn move_step(&mut self, ctx: &FrameContext) -> Motion {
        self.moved = false;
        let Some(heading) = self.heading else {
            if self.direction.is_empty() {
                self.step.reset();
            }
            return Motion::Stationary;
        };

        let distance = self.step.distance(ctx.step_factor);
        let x = self.position.x + heading.cos() * distance;
        let z = self.position.z + heading.sin() * distance;
        let crossing = if ctx.edges_enabled {
            ctx.bounds
                .crossing(x, z, self.width)
                .filter(|crossing| self.blocked_by(*crossing, x, z, ctx.bounds))
        } else {
            None
        };
        self.step.advance();

        if let Some(crossing) = crossing {
            return Motion::Crossed(crossing);
        }
        if x == self.position.x && z == self.position.z {
            return Motion::Unchanged;
        }
        self.set_position(x, self.position.y, z);
        self.moved = true;
        Motion::Moved
    }

    /// Whether a move to `(x, z)`, which lies across `crossing`, has to stop.
    ///
    /// A sprite already across that same boundary may move along it or back inside.
    fn blocked_by(&self, crossing: Crossing, x: f64, z: f64, bounds: &dyn EdgeDetector) -> bool {
        let (from_x, from_z) = (self.position.x, self.position.z);
        if bounds.crossing(from_x, from_z, self.width) != Some(crossing) {
            return true;
        }
        match crossing {
            Crossing::Side(Edge::West) => x < from_x,
            Crossing::Side(Edge::East) => x > from_x,
            Crossing::Side(Edge::South) => z > from_z,
            Crossing::Side(Edge::North) => z < from_z,
            Crossing::Extended(_) => false,
        }
    }

    /// Whether the sprite changed position during the current frame.
    pub fn moved(&self) -> bool {
        self.moved
    }

    /// Clears per-frame state. Called by the loop before any entity updates.
    pub fn begin_frame(&mut self) {
        self.moved = false;
    }

    pub fn collider(&self) -> Collider {
        Collider {
            center: self.center,
            radius: self.radius,
            solid: self.solid,
        }
    }

    pub fn touching(&self, other: &Sprite) -> bool {
        self.touching_within(other, 0.0)
    }

    /// Like [`Sprite::touching`], but also true when the two are within `gap` pixels.
    pub fn touching_within(&self, other: &Sprite, gap: f64) -> bool {
        self.collider().touching(&other.collider(), gap)
    }

    /// Rolls back to the most recently remembered position.
    ///
    /// Consumes exactly one history entry and drops the step to its reset value.
    /// With no history, returns `None` and changes nothing.
    pub fn reset(&mut self) -> Option<DVec3> {
        let previous = self.history.pop_front()?;
        self.place(previous);
        self.step.reset();
        trace!(entity = %self.name, x = previous.x, z = previous.z, "Rolled back");
        Some(previous)
    }

    /// Default collision response: a sprite that moved this frame retreats one position.
    pub fn hit(&mut self, _other: &Sprite) {
        if self.moved {
            self.reset();
        }
    }

    pub fn is_solid(&self) -> bool {
        self.solid
    }

    /// Non-solid sprites never touch anything.
    pub fn set_solid(&mut self, solid: bool) {
        self.solid = solid;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    /// Hides the sprite and cancels any fade in progress.
    pub fn hide(&mut self) {
        self.visible = false;
        self.opacity = 1.0;
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    pub fn set_opacity(&mut self, opacity: f64) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    /// The declaration this sprite was instantiated from, if any.
    pub fn origin(&self) -> Option<PropRef> {
        self.origin
    }

    pub(crate) fn set_origin(&mut self, origin: PropRef) {
        self.origin = Some(origin);
    }

    /// Screen rectangle and stacking order. Depth halves on screen and height lifts the sprite up.
    pub fn screen_placement(&self) -> ScreenPlacement {
        let z = self.position.z.floor();
        ScreenPlacement {
            left: self.position.x,
            top: (self.position.z / 2.0).floor() - self.height - self.position.y.floor(),
            z_index: z as i64,
        }
    }
}
