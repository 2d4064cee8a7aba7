//! Interface for corridor planners.
//!
//! Floor generation stops at the backbone: which room pairs must be joined.
//! Tracing the actual corridors is left to a [`CorridorPlanner`], whose
//! output [`crate::floor::Floor::realize_corridors`] writes onto the grid.

use serde::{Deserialize, Serialize};

use crate::connectivity::BackboneEdge;
use crate::error::FloorResult;
use crate::grid::DungeonGrid;
use crate::room::RoomFootprint;

/// Cost terms a planner is expected to honor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorridorCosts {
    /// Added for every wall cell a corridor cuts through
    pub wall_cut_penalty: f32,
    /// Added for every change of direction
    pub turn_penalty: f32,
    /// Subtracted for every cell that reuses an existing corridor
    pub reuse_reward: f32,
}

impl Default for CorridorCosts {
    fn default() -> Self {
        Self {
            wall_cut_penalty: 5.0,
            turn_penalty: 2.0,
            reuse_reward: 1.0,
        }
    }
}

/// Cells joining the boundaries of the two rooms of a backbone edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Corridor {
    pub edge: BackboneEdge,
    pub cells: Vec<(i32, i32)>,
}

pub trait CorridorPlanner {
    /// Produce one corridor per backbone edge.
    ///
    /// `rooms` is indexed like the backbone (boss room last).
    fn plan(
        &mut self,
        backbone: &[BackboneEdge],
        rooms: &[RoomFootprint],
        grid: &DungeonGrid,
        costs: &CorridorCosts,
    ) -> FloorResult<Vec<Corridor>>;
}
