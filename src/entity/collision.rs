//! The one collision metric used throughout the runtime.
//!
//! Every entity is a sphere around its centre point. Two entities touch when the squared
//! distance between their centres in the movement plane (x and z, height ignored) is no
//! more than the squared sum of their radii plus an optional gap. Non-solid entities never
//! touch anything.

use glam::DVec3;

/// The collision shape of an entity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    pub center: DVec3,
    pub radius: f64,
    pub solid: bool,
}

impl Collider {
    pub fn new(center: DVec3, radius: f64) -> Self {
        Self {
            center,
            radius,
            solid: true,
        }
    }

    /// A solid, zero-radius collider at the given point.
    pub fn point(x: f64, y: f64, z: f64) -> Self {
        Self::new(DVec3::new(x, y, z), 0.0)
    }

    /// Squared distance between the two centres, in the x/z plane.
    pub fn planar_distance_squared(&self, other: &Collider) -> f64 {
        let dx = self.center.x - other.center.x;
        let dz = self.center.z - other.center.z;
        dx * dx + dz * dz
    }

    /// Returns true if the two colliders overlap, or come within `gap` of each other.
    pub fn touching(&self, other: &Collider, gap: f64) -> bool {
        if !self.solid || !other.solid {
            return false;
        }
        let reach = self.radius + other.radius + gap;
        self.planar_distance_squared(other) <= reach * reach
    }
}
