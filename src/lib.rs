//! A headless engine for a robot-programming puzzle.
//!
//! A player fills a budget of instruction slots with Up/Down/Left/Right and
//! runs them: the robot walks the grid, stopping at the first wall, trap or
//! the goal.

pub mod error;
pub mod executor;
pub mod geometry;
pub mod level;
pub mod levels;
pub mod logging;
pub mod observer;
pub mod program;
pub mod session;
pub mod solver;

pub use error::{ConfigurationError, RunError};
pub use executor::{Execution, Outcome, RunReport, Step, run, run_observed};
pub use geometry::{Instruction, Position};
pub use level::Level;
pub use levels::{LevelError, Levels};
pub use observer::{Cue, NullObserver, RecordingObserver, RunObserver};
pub use program::{InstructionSlots, Program};
pub use session::{Session, SessionError};
pub use solver::{SolveResult, Solver};
