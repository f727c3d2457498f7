use std::fmt;

use crate::error::ConfigurationError;

/// A grid cell. Coordinates are signed so that a candidate one step outside
/// the grid can still be represented and classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Position { x, y }
    }

    /// The cell one step away in the given direction. No bounds checking;
    /// coordinates saturate at the ends of `i32`.
    pub fn step(self, instruction: Instruction) -> Position {
        let (dx, dy) = instruction.delta();
        Position {
            x: self.x.saturating_add(dx),
            y: self.y.saturating_add(dy),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<(i32, i32)> for Position {
    fn from((x, y): (i32, i32)) -> Self {
        Position { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Instruction {
    Up,
    Down,
    Left,
    Right,
}

pub const ALL_INSTRUCTIONS: [Instruction; 4] = [
    Instruction::Up,
    Instruction::Down,
    Instruction::Left,
    Instruction::Right,
];

impl Instruction {
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Instruction::Up => (0, -1),
            Instruction::Down => (0, 1),
            Instruction::Left => (-1, 0),
            Instruction::Right => (1, 0),
        }
    }

    pub fn opposite(&self) -> Instruction {
        match self {
            Instruction::Up => Instruction::Down,
            Instruction::Down => Instruction::Up,
            Instruction::Left => Instruction::Right,
            Instruction::Right => Instruction::Left,
        }
    }

    pub fn index(&self) -> usize {
        match self {
            Instruction::Up => 0,
            Instruction::Down => 1,
            Instruction::Left => 2,
            Instruction::Right => 3,
        }
    }

    pub fn from_index(idx: usize) -> Result<Instruction, ConfigurationError> {
        ALL_INSTRUCTIONS
            .get(idx)
            .copied()
            .ok_or(ConfigurationError::InstructionIndex(idx))
    }

    pub fn arrow(&self) -> char {
        match self {
            Instruction::Up => '↑',
            Instruction::Down => '↓',
            Instruction::Left => '←',
            Instruction::Right => '→',
        }
    }

    /// Parse a whole word such as `up` or `Right`.
    pub fn from_word(word: &str) -> Option<Instruction> {
        match word.to_ascii_lowercase().as_str() {
            "up" => Some(Instruction::Up),
            "down" => Some(Instruction::Down),
            "left" => Some(Instruction::Left),
            "right" => Some(Instruction::Right),
            _ => None,
        }
    }
}

impl TryFrom<char> for Instruction {
    type Error = ConfigurationError;

    fn try_from(ch: char) -> Result<Self, Self::Error> {
        match ch {
            'U' | 'u' | '↑' => Ok(Instruction::Up),
            'D' | 'd' | '↓' => Ok(Instruction::Down),
            'L' | 'l' | '←' => Ok(Instruction::Left),
            'R' | 'r' | '→' => Ok(Instruction::Right),
            _ => Err(ConfigurationError::UnknownInstruction(ch.to_string())),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Up => write!(f, "Up"),
            Instruction::Down => write!(f, "Down"),
            Instruction::Left => write!(f, "Left"),
            Instruction::Right => write!(f, "Right"),
        }
    }
}
