//! Deterministic stand-in for a rigid-body engine.
//!
//! Overlapping shapes are pushed apart along the axis of least penetration.
//! Each step resolves a fixed fraction of every penetration, split by mass
//! so heavy bodies barely move, and no body moves further in one step than
//! the deepest overlap it is resolving. Contacts off a body's center also
//! apply torque, which is what the relaxation passes have to cancel. Bodies
//! and shapes live in a `hecs` world; iteration order follows spawn order,
//! so runs are reproducible.

use std::collections::HashMap;

use glam::Vec2;
use hecs::{Entity, World};

use super::{Body, ConvexQuad, SimulationSpace};
use crate::constants::*;
use crate::error::{FloorError, FloorResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RepulsionBody(Entity);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RepulsionShape(Entity);

/// Component linking a shape entity to its body entity
#[derive(Debug, Clone, Copy)]
struct AttachedTo(Entity);

/// Position-correcting overlap resolver with zero gravity.
pub struct RepulsionSpace {
    world: World,
    correction: f32,
    angular_damping: f32,
}

impl Default for RepulsionSpace {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-step snapshot of a shape in world space
struct Placed {
    body: usize,
    min: Vec2,
    max: Vec2,
}

impl RepulsionSpace {
    pub fn new() -> Self {
        Self {
            world: World::new(),
            correction: PHYSICS_OVERLAP_CORRECTION,
            angular_damping: PHYSICS_ANGULAR_DAMPING,
        }
    }

    /// Fraction of each penetration resolved per step, clamped to `(0, 1]`.
    pub fn with_correction(mut self, correction: f32) -> Self {
        self.correction = if correction.is_finite() && correction > 0.0 {
            correction.min(1.0)
        } else {
            PHYSICS_OVERLAP_CORRECTION
        };
        self
    }

    fn shapes_of(&self, body: Entity) -> Vec<Entity> {
        self.world
            .query::<&AttachedTo>()
            .iter()
            .filter(|(_, attached)| attached.0 == body)
            .map(|(entity, _)| entity)
            .collect()
    }
}

impl SimulationSpace for RepulsionSpace {
    type BodyHandle = RepulsionBody;
    type ShapeHandle = RepulsionShape;

    fn add(&mut self, body: Body, shape: ConvexQuad) -> (RepulsionBody, RepulsionShape) {
        let body_entity = self.world.spawn((body,));
        let shape_entity = self.world.spawn((shape, AttachedTo(body_entity)));
        (RepulsionBody(body_entity), RepulsionShape(shape_entity))
    }

    fn attach(&mut self, body: RepulsionBody, shape: ConvexQuad) -> FloorResult<RepulsionShape> {
        if self.world.get::<&Body>(body.0).is_err() {
            return Err(FloorError::UnknownBody);
        }
        Ok(RepulsionShape(self.world.spawn((shape, AttachedTo(body.0)))))
    }

    fn detach(&mut self, shape: RepulsionShape) -> FloorResult<()> {
        if self.world.get::<&ConvexQuad>(shape.0).is_err() {
            return Err(FloorError::UnknownBody);
        }
        self.world.despawn(shape.0).map_err(|_| FloorError::UnknownBody)
    }

    fn remove(&mut self, body: RepulsionBody, shape: RepulsionShape) -> FloorResult<()> {
        self.detach(shape)?;
        if self.world.get::<&Body>(body.0).is_err() {
            return Err(FloorError::UnknownBody);
        }
        for leftover in self.shapes_of(body.0) {
            self.world.despawn(leftover).map_err(|_| FloorError::UnknownBody)?;
        }
        self.world.despawn(body.0).map_err(|_| FloorError::UnknownBody)
    }

    fn step(&mut self, dt: f32) {
        let mut entities = Vec::new();
        let mut bodies = Vec::new();
        for (entity, body) in self.world.query::<&Body>().iter() {
            entities.push(entity);
            bodies.push(*body);
        }
        let index: HashMap<Entity, usize> =
            entities.iter().enumerate().map(|(i, e)| (*e, i)).collect();

        let mut mass = vec![0.0f32; bodies.len()];
        let mut inertia = vec![0.0f32; bodies.len()];
        let mut placed = Vec::new();
        for (_, (quad, attached)) in self.world.query::<(&ConvexQuad, &AttachedTo)>().iter() {
            let Some(&b) = index.get(&attached.0) else {
                continue;
            };
            let (min, max) = quad.bounds(bodies[b].angle);
            let extent = max - min;
            mass[b] += quad.mass;
            inertia[b] += quad.mass * extent.length_squared() / 12.0;
            placed.push(Placed {
                body: b,
                min: bodies[b].position + min,
                max: bodies[b].position + max,
            });
        }
        for i in 0..bodies.len() {
            if mass[i] <= 0.0 {
                mass[i] = 1.0;
            }
            if inertia[i] <= 0.0 {
                inertia[i] = mass[i];
            }
        }

        let mut shift = vec![Vec2::ZERO; bodies.len()];
        let mut limit = vec![0.0f32; bodies.len()];
        let mut spin = vec![0.0f32; bodies.len()];

        // Sweep along x so only shapes whose x spans meet are compared
        placed.sort_by(|a, b| a.min.x.total_cmp(&b.min.x));
        for i in 0..placed.len() {
            for j in (i + 1)..placed.len() {
                let (a, b) = (&placed[i], &placed[j]);
                if b.min.x >= a.max.x {
                    break;
                }
                if a.body == b.body {
                    continue;
                }

                let overlap = a.max.min(b.max) - a.min.max(b.min);
                if overlap.x <= 0.0 || overlap.y <= 0.0 {
                    continue;
                }

                let delta = bodies[b.body].position - bodies[a.body].position;
                let (normal, depth) = if overlap.x < overlap.y {
                    let sign = if delta.x != 0.0 { delta.x.signum() } else { tie_break(a.body, b.body) };
                    (Vec2::new(sign, 0.0), overlap.x)
                } else {
                    let sign = if delta.y != 0.0 { delta.y.signum() } else { tie_break(a.body, b.body) };
                    (Vec2::new(0.0, sign), overlap.y)
                };

                let resolved = depth * self.correction;
                let total = mass[a.body] + mass[b.body];
                let shift_a = -normal * resolved * (mass[b.body] / total);
                let shift_b = normal * resolved * (mass[a.body] / total);
                shift[a.body] += shift_a;
                shift[b.body] += shift_b;
                limit[a.body] = limit[a.body].max(resolved);
                limit[b.body] = limit[b.body].max(resolved);

                let contact = (a.min.max(b.min) + a.max.min(b.max)) * 0.5;
                let torque_a = (contact - bodies[a.body].position).perp_dot(shift_a);
                let torque_b = (contact - bodies[b.body].position).perp_dot(shift_b);
                spin[a.body] += PHYSICS_TORQUE_SCALE * torque_a * mass[a.body] / inertia[a.body];
                spin[b.body] += PHYSICS_TORQUE_SCALE * torque_b * mass[b.body] / inertia[b.body];
            }
        }

        for (i, body) in bodies.iter_mut().enumerate() {
            // Pushes from many neighbours add up; cap them at the deepest one
            let moved = shift[i].clamp_length_max(limit[i]);
            body.position += moved;
            body.velocity = if dt > 0.0 { moved / dt } else { Vec2::ZERO };
            body.angular_velocity = (body.angular_velocity + spin[i]) * self.angular_damping;
            body.angle += body.angular_velocity * dt;
        }

        for (entity, state) in self.world.query_mut::<&mut Body>() {
            if let Some(&i) = index.get(&entity) {
                *state = bodies[i];
            }
        }
    }

    fn body(&self, body: RepulsionBody) -> FloorResult<Body> {
        self.world
            .get::<&Body>(body.0)
            .map(|state| *state)
            .map_err(|_| FloorError::UnknownBody)
    }

    fn set_body(&mut self, body: RepulsionBody, state: Body) -> FloorResult<()> {
        let mut current = self.world.get::<&mut Body>(body.0).map_err(|_| FloorError::UnknownBody)?;
        *current = state;
        Ok(())
    }

    fn body_count(&self) -> usize {
        self.world.query::<&Body>().iter().count()
    }

    fn shape_count(&self) -> usize {
        self.world.query::<&ConvexQuad>().iter().count()
    }
}

/// Direction for two bodies stacked on the same coordinate
fn tie_break(a: usize, b: usize) -> f32 {
    if b > a {
        1.0
    } else {
        -1.0
    }
}
