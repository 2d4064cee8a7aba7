//! Stochastic room seeding.
//!
//! Room sides come from a normal distribution; height is centered on the
//! sampled width rather than the mean, so rooms tend to be squarish.
//! Positions land inside a disc around the dungeon center with a radius
//! drawn uniformly, which concentrates rooms toward the middle.

use std::f32::consts::TAU;

use glam::Vec2;
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::constants::DUNGEON_MIN_ROOM_SIZE;
use crate::error::{FloorError, FloorResult};
use crate::room::RoomFootprint;

/// Samples room footprints around a fixed center.
#[derive(Debug, Clone, Copy)]
pub struct RoomSeeder {
    center: Vec2,
    std_dev: f32,
}

impl RoomSeeder {
    pub fn new(center: Vec2, std_dev: f32) -> Self {
        Self { center, std_dev }
    }

    /// Seed `count` regular rooms with sides around `mean_size`.
    pub fn generate_rooms(
        &self,
        count: usize,
        mean_size: f32,
        packing_radius: f32,
        rng: &mut impl Rng,
    ) -> FloorResult<Vec<RoomFootprint>> {
        puffin::profile_function!();

        let mut rooms = Vec::with_capacity(count + 1);
        for _ in 0..count {
            rooms.push(self.sample_room(mean_size, packing_radius, rng)?);
        }
        Ok(rooms)
    }

    /// Seed the boss room. Callers append it after every regular room.
    pub fn generate_boss_room(
        &self,
        mean_size: f32,
        packing_radius: f32,
        rng: &mut impl Rng,
    ) -> FloorResult<RoomFootprint> {
        self.sample_room(mean_size, packing_radius, rng)
    }

    fn sample_room(
        &self,
        mean_size: f32,
        packing_radius: f32,
        rng: &mut impl Rng,
    ) -> FloorResult<RoomFootprint> {
        let width = self.sample_side(mean_size, rng)?;
        let height = self.sample_side(width, rng)?;
        let position = self.sample_position(packing_radius, rng);
        Ok(RoomFootprint::new(width, height, position.x, position.y))
    }

    fn sample_side(&self, mean: f32, rng: &mut impl Rng) -> FloorResult<f32> {
        let normal = Normal::new(mean, self.std_dev)
            .map_err(|e| FloorError::InvalidConfig(format!("room size distribution: {e}")))?;
        Ok(normal.sample(rng).floor().max(DUNGEON_MIN_ROOM_SIZE))
    }

    fn sample_position(&self, packing_radius: f32, rng: &mut impl Rng) -> Vec2 {
        let theta = TAU * rng.gen::<f32>();
        let radius = packing_radius * rng.gen::<f32>();
        self.center + Vec2::new(theta.cos(), theta.sin()) * radius
    }
}
