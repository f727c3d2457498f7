use std::fmt;
use std::ops::Deref;
use std::str::FromStr;

use arrayvec::ArrayVec;
use thiserror::Error;

use crate::error::ConfigurationError;
use crate::geometry::Instruction;

/// Most slots the editor will ever offer. Levels may declare a larger budget;
/// the editor clamps it.
pub const MAX_BUDGET: usize = 64;

/// An ordered list of instructions. Any length is accepted here; the budget
/// is only enforced by [`InstructionSlots`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    instructions: Vec<Instruction>,
}

impl Program {
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Program { instructions }
    }

    pub fn as_slice(&self) -> &[Instruction] {
        &self.instructions
    }
}

impl Deref for Program {
    type Target = [Instruction];

    fn deref(&self) -> &Self::Target {
        &self.instructions
    }
}

impl From<Vec<Instruction>> for Program {
    fn from(instructions: Vec<Instruction>) -> Self {
        Program { instructions }
    }
}

impl FromIterator<Instruction> for Program {
    fn from_iter<T: IntoIterator<Item = Instruction>>(iter: T) -> Self {
        Program {
            instructions: iter.into_iter().collect(),
        }
    }
}

impl FromStr for Program {
    type Err = ConfigurationError;

    /// Tokens are separated by whitespace or commas. A token is either a
    /// word (`up`, `Right`, ...) or a run of single-letter/arrow
    /// instructions (`RRUD`, `→→↑`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut instructions = Vec::new();
        for token in s
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
        {
            if let Some(instruction) = Instruction::from_word(token) {
                instructions.push(instruction);
                continue;
            }
            for ch in token.chars() {
                let instruction = Instruction::try_from(ch)
                    .map_err(|_| ConfigurationError::UnknownInstruction(token.to_string()))?;
                instructions.push(instruction);
            }
        }
        Ok(Program { instructions })
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for instruction in &self.instructions {
            write!(f, "{}", instruction.arrow())?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SlotError {
    #[error("all {budget} instruction slots are full")]
    BudgetExceeded { budget: usize },
    #[error("slot {index} is out of range (filled: {len})")]
    OutOfRange { index: usize, len: usize },
}

/// The player's program under construction, capped at the level budget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstructionSlots {
    items: ArrayVec<Instruction, MAX_BUDGET>,
    budget: usize,
}

impl InstructionSlots {
    /// Budgets above [`MAX_BUDGET`] are clamped to it.
    pub fn new(budget: usize) -> Self {
        InstructionSlots {
            items: ArrayVec::new(),
            budget: budget.min(MAX_BUDGET),
        }
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn remaining(&self) -> usize {
        self.budget - self.items.len()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.budget
    }

    pub fn push(&mut self, instruction: Instruction) -> Result<(), SlotError> {
        if self.is_full() {
            return Err(SlotError::BudgetExceeded {
                budget: self.budget,
            });
        }
        self.items.push(instruction);
        Ok(())
    }

    /// Insert before `index`; `index == len()` appends.
    pub fn insert(&mut self, index: usize, instruction: Instruction) -> Result<(), SlotError> {
        if index > self.items.len() {
            return Err(SlotError::OutOfRange {
                index,
                len: self.items.len(),
            });
        }
        if self.is_full() {
            return Err(SlotError::BudgetExceeded {
                budget: self.budget,
            });
        }
        self.items.insert(index, instruction);
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<Instruction, SlotError> {
        if index >= self.items.len() {
            return Err(SlotError::OutOfRange {
                index,
                len: self.items.len(),
            });
        }
        Ok(self.items.remove(index))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Fill from a parsed program, stopping at the first instruction that
    /// does not fit.
    pub fn extend_from(&mut self, program: &[Instruction]) -> Result<(), SlotError> {
        for &instruction in program {
            self.push(instruction)?;
        }
        Ok(())
    }

    pub fn as_slice(&self) -> &[Instruction] {
        &self.items
    }

    pub fn to_program(&self) -> Program {
        self.items.iter().copied().collect()
    }
}
