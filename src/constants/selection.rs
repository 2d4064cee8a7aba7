//! Room selection and connectivity constants.

/// Regular rooms kept after selection (the boss room is added on top)
pub const SELECTION_ROOM_COUNT: usize = 15;
/// Exponent applied to room area to get its fitness
pub const SELECTION_FITNESS_EXPONENT: f64 = 2.0;
/// Redraws allowed for a slot whose bucket is already taken
pub const SELECTION_MAX_RETRIES: usize = 32;
/// Tolerance on the final cumulative fitness value
pub const SELECTION_CUMULATIVE_TOLERANCE: f64 = 1e-6;

/// Backbone weight of any edge touching the boss room
pub const CONNECTIVITY_BOSS_EDGE_WEIGHT: u32 = 20;
