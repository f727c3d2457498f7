//! Game session: the caller-owned context that threads the current level,
//! the program being edited and where the robot stands.

use thiserror::Error;
use tracing::info;

use crate::error::RunError;
use crate::executor::{Execution, RunReport};
use crate::geometry::{Instruction, Position};
use crate::level::Level;
use crate::levels::Levels;
use crate::observer::RunObserver;
use crate::program::{InstructionSlots, SlotError};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("level {index} not found (catalog contains {len} levels)")]
    UnknownLevel { index: usize, len: usize },
    #[error(transparent)]
    Run(#[from] RunError),
    #[error(transparent)]
    Slot(#[from] SlotError),
}

#[derive(Debug, Clone)]
pub struct Session {
    levels: Levels,
    index: usize,
    level: Level,
    slots: InstructionSlots,
    robot: Position,
    moves: usize,
    completed: bool,
}

impl Session {
    /// Start on the first level of the catalog.
    pub fn new(levels: Levels) -> Result<Self, SessionError> {
        let level = levels
            .get(0)
            .cloned()
            .ok_or(SessionError::UnknownLevel { index: 0, len: 0 })?;
        Ok(Session {
            slots: InstructionSlots::new(level.budget()),
            robot: level.start(),
            levels,
            index: 0,
            level,
            moves: 0,
            completed: false,
        })
    }

    /// Switch to another level, clearing the program and the robot.
    pub fn load_level(&mut self, index: usize) -> Result<(), SessionError> {
        let level = self
            .levels
            .get(index)
            .cloned()
            .ok_or(SessionError::UnknownLevel {
                index,
                len: self.levels.len(),
            })?;
        info!(index, id = level.id(), name = level.name(), "loading level");

        self.slots = InstructionSlots::new(level.budget());
        self.robot = level.start();
        self.index = index;
        self.level = level;
        self.moves = 0;
        self.completed = false;
        Ok(())
    }

    /// Reload the current level.
    pub fn reset(&mut self) {
        self.slots.clear();
        self.robot = self.level.start();
        self.moves = 0;
        self.completed = false;
    }

    pub fn levels(&self) -> &Levels {
        &self.levels
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn level_index(&self) -> usize {
        self.index
    }

    pub fn slots(&self) -> &InstructionSlots {
        &self.slots
    }

    pub fn robot(&self) -> Position {
        self.robot
    }

    pub fn moves(&self) -> usize {
        self.moves
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn add_instruction(&mut self, instruction: Instruction) -> Result<(), SessionError> {
        Ok(self.slots.push(instruction)?)
    }

    pub fn insert_instruction(
        &mut self,
        index: usize,
        instruction: Instruction,
    ) -> Result<(), SessionError> {
        Ok(self.slots.insert(index, instruction)?)
    }

    pub fn remove_instruction(&mut self, index: usize) -> Result<Instruction, SessionError> {
        Ok(self.slots.remove(index)?)
    }

    pub fn clear_instructions(&mut self) {
        self.slots.clear();
    }

    /// Begin running the current program.
    ///
    /// The execution borrows the session, so nothing can edit the program,
    /// reset or start another run until it is dropped.
    pub fn start_run<O: RunObserver>(&self, observer: O) -> Result<Execution<'_, O>, SessionError> {
        Ok(Execution::start(self.slots.as_slice(), &self.level, observer)?)
    }

    /// Apply a finished run. A failed run puts the robot back on start.
    pub fn settle(&mut self, report: &RunReport) {
        self.moves += report.move_count;
        if report.outcome.is_success() {
            self.completed = true;
            self.robot = report.final_position;
        } else {
            self.robot = self.level.start();
        }
    }

    /// Run the current program to the end without pausing and settle it.
    pub fn run<O: RunObserver>(&mut self, observer: O) -> Result<RunReport, SessionError> {
        let report = self.start_run(observer)?.finish();
        self.settle(&report);
        Ok(report)
    }

    pub fn is_last_level(&self) -> bool {
        self.index + 1 >= self.levels.len()
    }

    /// Advance to the next level. Returns false on the last level.
    pub fn next_level(&mut self) -> bool {
        if self.is_last_level() {
            return false;
        }
        self.load_level(self.index + 1).is_ok()
    }

    /// Back to the first level.
    pub fn restart(&mut self) -> Result<(), SessionError> {
        self.load_level(0)
    }
}
