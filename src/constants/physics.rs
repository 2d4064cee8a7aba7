//! Relaxation simulation constants.

/// Fixed physics timestep (seconds)
pub const PHYSICS_TIMESTEP: f32 = 1.0 / 60.0;
/// Physics steps per simulated frame
pub const PHYSICS_SUBSTEPS_PER_FRAME: u32 = 10;
/// Frames simulated while packing the seeded rooms apart
pub const PHYSICS_INITIAL_FRAMES: u32 = 300;
/// Frames simulated while resettling the expanded selection
pub const PHYSICS_EXPANSION_FRAMES: u32 = 200;
/// Fraction of each penetration the repulsion stub resolves per step
pub const PHYSICS_OVERLAP_CORRECTION: f32 = 0.5;
/// Fraction of angular velocity kept after each step
pub const PHYSICS_ANGULAR_DAMPING: f32 = 0.9;
/// Scale applied to contact torque in the repulsion stub
pub const PHYSICS_TORQUE_SCALE: f32 = 0.5;
