//! The floor generation pipeline.
//!
//! Seed rooms, relax them apart, select a subset by area, resettle the
//! subset with margins, then rasterize it and build the corridor backbone.
//! Stages run strictly in order and any failure discards the whole attempt.

use log::info;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::FloorConfig;
use crate::connectivity::{build_connectivity, ConnectivityGraph, DefaultEdgeWeight, EdgeWeight};
use crate::error::{FloorError, FloorResult};
use crate::expansion::{expand_and_resettle, retain_selected};
use crate::grid::DungeonGrid;
use crate::pathfinding::{CorridorCosts, CorridorPlanner};
use crate::physics::{RepulsionSpace, SimulationSpace};
use crate::rasterize::{center_in_grid, rasterize};
use crate::relaxation::{drain, Relaxer};
use crate::room::RoomFootprint;
use crate::seeding::RoomSeeder;
use crate::selection::select;
use crate::tile::TileType;

/// A generated floor.
#[derive(Debug, Clone)]
pub struct Floor {
    pub grid: DungeonGrid,
    /// Selected rooms at their final grid positions; the boss room is last
    pub rooms: Vec<RoomFootprint>,
    pub connectivity: ConnectivityGraph,
}

impl Floor {
    pub fn boss_room(&self) -> Option<&RoomFootprint> {
        self.rooms.last()
    }

    /// Ask `planner` for the backbone corridors and tag them on the grid.
    ///
    /// Only wall cells become corridor; room cells crossed by a corridor keep
    /// their tag. Returns the number of cells carved.
    pub fn realize_corridors(
        &mut self,
        planner: &mut impl CorridorPlanner,
        costs: &CorridorCosts,
    ) -> FloorResult<usize> {
        puffin::profile_function!();

        let corridors = planner.plan(&self.connectivity.backbone, &self.rooms, &self.grid, costs)?;
        for corridor in &corridors {
            if !self.connectivity.backbone.contains(&corridor.edge) {
                return Err(FloorError::InvariantViolation(format!(
                    "corridor for {}-{} is not on the backbone",
                    corridor.edge.a, corridor.edge.b
                )));
            }
        }

        let mut carved = 0;
        for (x, y) in corridors.iter().flat_map(|c| c.cells.iter().copied()) {
            if let Some(cell) = self.grid.get_mut(x, y) {
                if *cell == TileType::Wall {
                    *cell = TileType::Corridor;
                    carved += 1;
                }
            }
        }

        info!("carved {} corridor cells for {} corridors", carved, corridors.len());
        Ok(carved)
    }
}

/// Runs the generation pipeline for one configuration.
pub struct FloorBuilder<W = DefaultEdgeWeight> {
    config: FloorConfig,
    weight: W,
}

impl FloorBuilder<DefaultEdgeWeight> {
    pub fn new(config: FloorConfig) -> Self {
        Self {
            config,
            weight: DefaultEdgeWeight,
        }
    }
}

impl<W: EdgeWeight> FloorBuilder<W> {
    /// Swap the backbone edge weighting.
    pub fn with_edge_weight<V: EdgeWeight>(self, weight: V) -> FloorBuilder<V> {
        FloorBuilder {
            config: self.config,
            weight,
        }
    }

    pub fn config(&self) -> &FloorConfig {
        &self.config
    }

    /// Generate a floor using `space` for both relaxation passes.
    ///
    /// The space must be empty and is left empty afterwards, whether or not
    /// the build succeeds. Room coordinates in the result are grid cells.
    pub fn build<S: SimulationSpace>(&self, space: &mut S, rng: &mut impl Rng) -> FloorResult<Floor> {
        puffin::profile_function!();

        let config = &self.config;
        config.validate()?;
        if !space.is_empty() {
            return Err(FloorError::InvariantViolation(
                "simulation space must be empty before a build".into(),
            ));
        }

        let seeder = RoomSeeder::new(config.center(), config.room_size_std_dev);
        let mut footprints =
            seeder.generate_rooms(config.room_count, config.room_mean_size, config.packing_radius, rng)?;
        footprints.push(seeder.generate_boss_room(config.boss_mean_size, config.boss_packing_radius, rng)?);
        info!("seeded {} rooms plus a boss room", config.room_count);

        let relaxer = Relaxer::new(&config.simulation);
        let rooms = relaxer.relax(space, &footprints, config.simulation.initial_budget)?;
        info!("initial relaxation finished for {} rooms", rooms.len());

        let areas: Vec<f32> = rooms.iter().map(|room| room.area).collect();
        let boss_index = rooms.len() - 1;
        let selected = match select(&areas, boss_index, config.rooms_to_select, config.fitness_exponent, rng) {
            Ok(selected) => selected,
            Err(err) => {
                drain(space, &rooms)?;
                return Err(err);
            }
        };
        info!("selected {} rooms including the boss room", selected.len());

        let mut kept = retain_selected(space, rooms, &selected)?;
        let expanded = expand_and_resettle(
            space,
            &relaxer,
            &mut kept,
            config.expansion_margin,
            config.simulation.expansion_budget,
        );
        let drained = drain(space, &kept);
        let final_rooms = expanded?;
        drained?;

        let final_rooms = center_in_grid(&final_rooms, config.extent);
        let grid = rasterize(&final_rooms, config.extent, config.trap_room_probability, rng)?;
        info!("rasterized {} rooms onto a {}x{} grid", final_rooms.len(), grid.side, grid.side);

        let connectivity = build_connectivity(&final_rooms, &self.weight)?;

        Ok(Floor {
            grid,
            rooms: final_rooms,
            connectivity,
        })
    }
}

/// Build a floor with the default configuration and a thread-local RNG.
pub fn build_floor() -> FloorResult<DungeonGrid> {
    let builder = FloorBuilder::new(FloorConfig::default());
    let floor = builder.build(&mut RepulsionSpace::new(), &mut rand::thread_rng())?;
    Ok(floor.grid)
}

/// Build a floor with the default configuration, reproducibly from `seed`.
pub fn build_floor_seeded(seed: u64) -> FloorResult<DungeonGrid> {
    let builder = FloorBuilder::new(FloorConfig::default());
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let floor = builder.build(&mut RepulsionSpace::new(), &mut rng)?;
    Ok(floor.grid)
}
