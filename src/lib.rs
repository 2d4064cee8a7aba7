//! Procedural dungeon floor generation.
//!
//! Rooms are seeded around the dungeon center, pushed apart by a physics
//! relaxation, filtered by area-weighted roulette selection, spaced out by a
//! margin pass, and snapped onto a grid. A Delaunay triangulation of the
//! final rooms gives the minimum spanning tree that corridors must follow.
//!
//! ```no_run
//! let grid = floor_builder::build_floor_seeded(7)?;
//! println!("{grid}");
//! # Ok::<(), floor_builder::FloorError>(())
//! ```

pub mod config;
pub mod connectivity;
pub mod constants;
pub mod error;
pub mod expansion;
pub mod floor;
pub mod grid;
pub mod pathfinding;
pub mod physics;
pub mod rasterize;
pub mod relaxation;
pub mod room;
pub mod seeding;
pub mod selection;
pub mod tile;

pub use config::{FloorConfig, SimulationBudget, SimulationConfig};
pub use connectivity::{BackboneEdge, ConnectivityGraph, DefaultEdgeWeight, EdgeWeight};
pub use error::{FloorError, FloorResult};
pub use floor::{build_floor, build_floor_seeded, Floor, FloorBuilder};
pub use grid::DungeonGrid;
pub use pathfinding::{Corridor, CorridorCosts, CorridorPlanner};
pub use physics::{RepulsionSpace, SimulationSpace};
pub use room::RoomFootprint;
pub use tile::TileType;
