//! Simulation space abstraction.
//!
//! The relaxation passes only need body/shape bookkeeping, a fixed step, and
//! read/write access to each body's pose. Anything that can do that (a full
//! rigid-body engine or the [`RepulsionSpace`] stub) can drive them.

mod repulsion;

pub use repulsion::{RepulsionBody, RepulsionShape, RepulsionSpace};

use glam::Vec2;

use crate::error::FloorResult;
use crate::room::RoomFootprint;

/// Kinematic state of a body.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Body {
    pub position: Vec2,
    pub velocity: Vec2,
    pub angle: f32,
    pub angular_velocity: f32,
}

impl Body {
    pub fn at(position: Vec2) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }
}

/// A convex quadrilateral attached to a body, vertices relative to the body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConvexQuad {
    pub vertices: [Vec2; 4],
    pub mass: f32,
}

impl ConvexQuad {
    /// Axis-aligned box of `size` centered on the body.
    pub fn rect(size: Vec2, mass: f32) -> Self {
        let half = size * 0.5;
        Self {
            vertices: [
                Vec2::new(-half.x, -half.y),
                Vec2::new(half.x, -half.y),
                Vec2::new(half.x, half.y),
                Vec2::new(-half.x, half.y),
            ],
            mass,
        }
    }

    /// Box matching a room's true size.
    ///
    /// Mass is the room diagonal, so bigger rooms push harder but sub-linearly.
    pub fn for_room(room: &RoomFootprint) -> Self {
        Self::rect(room.size(), room.diagonal())
    }

    /// Room box grown by `margin` on every side.
    ///
    /// Mass is `(w^2 + h^2)^2` of the true size, far stiffer than the
    /// initial packing so the expansion pass actually spreads rooms out.
    pub fn expanded_for_room(room: &RoomFootprint, margin: f32) -> Self {
        let diagonal_sq = room.width * room.width + room.height * room.height;
        Self::rect(room.size() + Vec2::splat(2.0 * margin), diagonal_sq * diagonal_sq)
    }

    /// Local bounding box `(min, max)` after rotating by `angle`.
    pub fn bounds(&self, angle: f32) -> (Vec2, Vec2) {
        let rotation = Vec2::from_angle(angle);
        let mut min = Vec2::splat(f32::INFINITY);
        let mut max = Vec2::splat(f32::NEG_INFINITY);
        for vertex in self.vertices {
            let v = rotation.rotate(vertex);
            min = min.min(v);
            max = max.max(v);
        }
        (min, max)
    }
}

/// The physics service the relaxation passes drive.
///
/// A space is owned by one stage at a time; a stage drains what it added
/// before handing the space on.
pub trait SimulationSpace {
    type BodyHandle: Copy + Eq + std::fmt::Debug;
    type ShapeHandle: Copy + Eq + std::fmt::Debug;

    /// Insert a new body together with its first shape.
    fn add(&mut self, body: Body, shape: ConvexQuad) -> (Self::BodyHandle, Self::ShapeHandle);

    /// Attach another shape to an existing body.
    fn attach(&mut self, body: Self::BodyHandle, shape: ConvexQuad) -> FloorResult<Self::ShapeHandle>;

    /// Remove a single shape, leaving its body in place.
    fn detach(&mut self, shape: Self::ShapeHandle) -> FloorResult<()>;

    /// Remove a body and a shape. Any other shape still on the body goes too.
    fn remove(&mut self, body: Self::BodyHandle, shape: Self::ShapeHandle) -> FloorResult<()>;

    /// Advance the simulation by `dt` seconds.
    fn step(&mut self, dt: f32);

    fn body(&self, body: Self::BodyHandle) -> FloorResult<Body>;

    fn set_body(&mut self, body: Self::BodyHandle, state: Body) -> FloorResult<()>;

    fn body_count(&self) -> usize;

    fn shape_count(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.body_count() == 0 && self.shape_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_quad_mass_is_diagonal() {
        let room = RoomFootprint::new(3.0, 4.0, 0.0, 0.0);
        let quad = ConvexQuad::for_room(&room);
        assert_eq!(quad.mass, 5.0);
        assert_eq!(quad.bounds(0.0), (Vec2::new(-1.5, -2.0), Vec2::new(1.5, 2.0)));
    }

    #[test]
    fn test_expanded_quad() {
        let room = RoomFootprint::new(3.0, 4.0, 0.0, 0.0);
        let quad = ConvexQuad::expanded_for_room(&room, 2.0);
        assert_eq!(quad.mass, 625.0);
        assert_eq!(quad.bounds(0.0), (Vec2::new(-3.5, -4.0), Vec2::new(3.5, 4.0)));
    }

    #[test]
    fn test_rotated_bounds_swap_axes() {
        let quad = ConvexQuad::rect(Vec2::new(4.0, 2.0), 1.0);
        let (min, max) = quad.bounds(std::f32::consts::FRAC_PI_2);
        assert!((max.x - min.x - 2.0).abs() < 1e-4);
        assert!((max.y - min.y - 4.0).abs() < 1e-4);
    }
}
