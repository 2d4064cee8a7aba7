//! Tunables for a floor generation run.
//!
//! `FloorConfig::default()` reproduces the stock medium dungeon: a hundred
//! rooms around 4x4 cells packed into a 100x100 extent.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::error::{FloorError, FloorResult};

/// How long a relaxation pass runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SimulationBudget {
    /// Fixed number of frames; reproducible across machines
    Frames(u32),
    /// Keep running frames until this much wall-clock time has passed
    WallClock(Duration),
}

/// Physics stepping parameters shared by both relaxation passes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub timestep: f32,
    pub substeps_per_frame: u32,
    pub initial_budget: SimulationBudget,
    pub expansion_budget: SimulationBudget,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            timestep: PHYSICS_TIMESTEP,
            substeps_per_frame: PHYSICS_SUBSTEPS_PER_FRAME,
            initial_budget: SimulationBudget::Frames(PHYSICS_INITIAL_FRAMES),
            expansion_budget: SimulationBudget::Frames(PHYSICS_EXPANSION_FRAMES),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FloorConfig {
    pub room_count: usize,
    pub room_mean_size: f32,
    pub room_size_std_dev: f32,
    pub packing_radius: f32,
    pub boss_mean_size: f32,
    pub boss_packing_radius: f32,
    /// Width and height of the dungeon; rooms are seeded around its center
    pub extent: Vec2,
    pub rooms_to_select: usize,
    pub fitness_exponent: f64,
    pub expansion_margin: f32,
    pub trap_room_probability: f64,
    pub simulation: SimulationConfig,
}

impl Default for FloorConfig {
    fn default() -> Self {
        Self {
            room_count: DUNGEON_ROOM_COUNT,
            room_mean_size: DUNGEON_ROOM_MEAN_SIZE,
            room_size_std_dev: DUNGEON_ROOM_SIZE_STD_DEV,
            packing_radius: DUNGEON_PACKING_RADIUS,
            boss_mean_size: DUNGEON_BOSS_MEAN_SIZE,
            boss_packing_radius: DUNGEON_BOSS_PACKING_RADIUS,
            extent: Vec2::new(DUNGEON_DEFAULT_WIDTH, DUNGEON_DEFAULT_HEIGHT),
            rooms_to_select: SELECTION_ROOM_COUNT,
            fitness_exponent: SELECTION_FITNESS_EXPONENT,
            expansion_margin: DUNGEON_EXPANSION_MARGIN,
            trap_room_probability: DUNGEON_TRAP_ROOM_CHANCE,
            simulation: SimulationConfig::default(),
        }
    }
}

impl FloorConfig {
    /// Geometric center of the dungeon extent
    pub fn center(&self) -> Vec2 {
        self.extent * 0.5
    }

    /// Check every tunable before a run starts.
    pub fn validate(&self) -> FloorResult<()> {
        fn positive(name: &str, value: f32) -> FloorResult<()> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(FloorError::InvalidConfig(format!("{name} must be positive, got {value}")))
            }
        }

        positive("room_mean_size", self.room_mean_size)?;
        positive("room_size_std_dev", self.room_size_std_dev)?;
        positive("boss_mean_size", self.boss_mean_size)?;
        positive("extent.x", self.extent.x)?;
        positive("extent.y", self.extent.y)?;
        positive("simulation.timestep", self.simulation.timestep)?;

        if !(self.packing_radius.is_finite() && self.packing_radius >= 0.0) {
            return Err(FloorError::InvalidConfig("packing_radius must be non-negative".into()));
        }
        if !(self.boss_packing_radius.is_finite() && self.boss_packing_radius >= 0.0) {
            return Err(FloorError::InvalidConfig("boss_packing_radius must be non-negative".into()));
        }
        if !(self.expansion_margin.is_finite() && self.expansion_margin >= 0.0) {
            return Err(FloorError::InvalidConfig("expansion_margin must be non-negative".into()));
        }
        if !(self.fitness_exponent.is_finite() && self.fitness_exponent >= 0.0) {
            return Err(FloorError::InvalidConfig("fitness_exponent must be non-negative".into()));
        }
        if !(0.0..=1.0).contains(&self.trap_room_probability) {
            return Err(FloorError::InvalidConfig(format!(
                "trap_room_probability must be in [0, 1], got {}",
                self.trap_room_probability
            )));
        }
        if self.simulation.substeps_per_frame == 0 {
            return Err(FloorError::InvalidConfig("substeps_per_frame must be at least 1".into()));
        }
        if self.rooms_to_select > self.room_count {
            return Err(FloorError::InvalidConfig(format!(
                "cannot select {} rooms out of {}",
                self.rooms_to_select, self.room_count
            )));
        }

        Ok(())
    }
}
