//! Snap final room footprints onto the cell grid.

use glam::Vec2;
use log::debug;
use rand::Rng;

use crate::error::{FloorError, FloorResult};
use crate::grid::DungeonGrid;
use crate::room::RoomFootprint;
use crate::tile::TileType;

/// Shift a layout centered on `extent / 2` to the middle of its grid.
///
/// The grid side is the extent's diagonal, so this leaves the same slack
/// on every side. The offset is whole cells, so rasterized shapes are kept.
pub fn center_in_grid(rooms: &[RoomFootprint], extent: Vec2) -> Vec<RoomFootprint> {
    let side = DungeonGrid::side_for(extent) as f32;
    let offset = ((Vec2::splat(side) - extent) * 0.5).floor().max(Vec2::ZERO);
    rooms.iter().map(|room| room.moved_to(room.center() + offset)).collect()
}

/// Tag each room's cells on a fresh all-wall grid.
///
/// The last room is the boss room. Every other room becomes a trap room
/// with `trap_room_probability`, rolled once per room; a non-finite
/// probability means no traps. Corridors are never written here.
///
/// Fails without tagging anything if a room reaches outside the grid.
pub fn rasterize(
    rooms: &[RoomFootprint],
    extent: Vec2,
    trap_room_probability: f64,
    rng: &mut impl Rng,
) -> FloorResult<DungeonGrid> {
    puffin::profile_function!();

    let mut grid = DungeonGrid::for_extent(extent);
    for (i, room) in rooms.iter().enumerate() {
        let (min_x, min_y, max_x, max_y) = room.cell_bounds();
        let side = grid.side as i32;
        if min_x < 0 || min_y < 0 || max_x > side || max_y > side {
            return Err(FloorError::InvariantViolation(format!(
                "room {} spans cells ({}, {})..({}, {}) outside the {}x{} grid",
                i, min_x, min_y, max_x, max_y, grid.side, grid.side
            )));
        }
    }

    let trap_chance = if trap_room_probability.is_finite() {
        trap_room_probability.clamp(0.0, 1.0)
    } else {
        0.0
    };
    let boss_index = rooms.len().checked_sub(1);
    let mut traps = 0;

    for (i, room) in rooms.iter().enumerate() {
        let tile = if Some(i) == boss_index {
            TileType::BossRoom
        } else if rng.gen_bool(trap_chance) {
            traps += 1;
            TileType::TrapRoom
        } else {
            TileType::Room
        };

        let (min_x, min_y, max_x, max_y) = room.cell_bounds();
        for y in min_y..max_y {
            for x in min_x..max_x {
                grid.set(x, y, tile);
            }
        }
    }

    debug!("tagged {} rooms ({} traps) on a {}x{} grid", rooms.len(), traps, grid.side, grid.side);
    Ok(grid)
}
