//! Error hierarchy for floor generation.
//!
//! Every variant is fatal to the current generation attempt. The pipeline
//! never retries internally; callers may rerun it with a fresh seed.

use thiserror::Error;

/// Root error type for all floor generation failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FloorError {
    /// Fewer than three rooms, collinear or coincident centroids.
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// The room adjacency graph splits into several components.
    #[error("disconnected topology: adjacency graph has {components} components")]
    DisconnectedTopology { components: usize },

    /// A selection draw was attempted with no eligible room left.
    #[error("selection pool is empty or has zero total fitness")]
    EmptySelectionPool,

    /// An internal postcondition did not hold (e.g. boss room missing).
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// A tunable is outside its valid range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// A body or shape handle no longer refers to anything in the space.
    #[error("unknown simulation handle")]
    UnknownBody,
}

pub type FloorResult<T> = Result<T, FloorError>;
