//! Dungeon layout constants.

/// Default dungeon extent along x (cells)
pub const DUNGEON_DEFAULT_WIDTH: f32 = 100.0;
/// Default dungeon extent along y (cells)
pub const DUNGEON_DEFAULT_HEIGHT: f32 = 100.0;
/// Number of regular rooms seeded before selection
pub const DUNGEON_ROOM_COUNT: usize = 100;
/// Mean room width in cells
pub const DUNGEON_ROOM_MEAN_SIZE: f32 = 4.0;
/// Standard deviation of room width/height sampling
pub const DUNGEON_ROOM_SIZE_STD_DEV: f32 = 2.5;
/// Smallest allowed room side (cells)
pub const DUNGEON_MIN_ROOM_SIZE: f32 = 2.0;
/// Radius of the disc rooms are initially packed into
pub const DUNGEON_PACKING_RADIUS: f32 = 5.0;
/// Mean boss room width in cells
pub const DUNGEON_BOSS_MEAN_SIZE: f32 = 7.0;
/// Radius of the disc the boss room is packed into
pub const DUNGEON_BOSS_PACKING_RADIUS: f32 = 1.2;
/// Margin added on every side of a room during the expansion pass
pub const DUNGEON_EXPANSION_MARGIN: f32 = 2.0;
/// Chance that a non-boss room is tagged as a trap room
pub const DUNGEON_TRAP_ROOM_CHANCE: f64 = 0.1;
