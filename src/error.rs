use thiserror::Error;

use crate::geometry::Position;

/// A caller handed the engine something it cannot interpret.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("unknown instruction '{0}'")]
    UnknownInstruction(String),
    #[error("instruction index {0} is out of range")]
    InstructionIndex(usize),
    #[error("grid size must be at least 1, got {size}")]
    GridSize { size: i32 },
    #[error("{what} {position} lies outside a {size}x{size} grid")]
    OutOfBounds {
        what: &'static str,
        position: Position,
        size: i32,
    },
    #[error("instruction budget must be at least 1, got {budget}")]
    Budget { budget: usize },
}

/// Reasons a run never starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    #[error("program has no instructions")]
    EmptyProgram,
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}
