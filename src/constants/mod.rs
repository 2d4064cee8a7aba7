//! Generation constants organized by domain.
//!
//! Centralizing magic numbers makes tuning easier and documents intent.
//! [`crate::config::FloorConfig::default`] is built from these values.

mod dungeon;
mod physics;
mod selection;

pub use dungeon::*;
pub use physics::*;
pub use selection::*;
