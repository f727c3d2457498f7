use std::collections::BTreeSet;
use std::fmt;

use crate::error::ConfigurationError;
use crate::geometry::Position;

/// The static layout of one puzzle. Never changes once built; every run
/// against it starts from `start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Level {
    id: usize,
    name: String,
    description: String,
    size: i32,
    start: Position,
    goal: Position,
    walls: BTreeSet<Position>,
    traps: BTreeSet<Position>,
    budget: usize,
}

impl Level {
    /// Create an empty `size`x`size` level. Walls and traps are added with
    /// [`Level::with_walls`] and [`Level::with_traps`].
    ///
    /// Start and goal must be inside the grid. Walls, traps, start and goal
    /// are allowed to overlap; such a level is malformed but still runs.
    pub fn new(
        size: i32,
        start: Position,
        goal: Position,
        budget: usize,
    ) -> Result<Self, ConfigurationError> {
        if size < 1 {
            return Err(ConfigurationError::GridSize { size });
        }
        if budget < 1 {
            return Err(ConfigurationError::Budget { budget });
        }

        let level = Level {
            id: 0,
            name: String::new(),
            description: String::new(),
            size,
            start,
            goal,
            walls: BTreeSet::new(),
            traps: BTreeSet::new(),
            budget,
        };
        for (what, position) in [("start", start), ("goal", goal)] {
            if !level.is_in_bounds(position) {
                return Err(ConfigurationError::OutOfBounds {
                    what,
                    position,
                    size,
                });
            }
        }
        Ok(level)
    }

    pub fn with_walls(mut self, walls: impl IntoIterator<Item = Position>) -> Self {
        self.walls.extend(walls);
        self
    }

    pub fn with_traps(mut self, traps: impl IntoIterator<Item = Position>) -> Self {
        self.traps.extend(traps);
        self
    }

    pub fn with_id(mut self, id: usize) -> Self {
        self.id = id;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Parse a level grid from text.
    ///
    /// Characters:
    /// - `.` = Floor
    /// - `#` = Wall
    /// - `^` = Trap
    /// - `@` = Robot start
    /// - `*` = Goal
    ///
    /// The grid must be square.
    pub fn from_text(text: &str, budget: usize) -> Result<Self, String> {
        let lines: Vec<&str> = text.lines().map(str::trim_end).collect();

        if lines.is_empty() {
            return Err("Empty grid".to_string());
        }

        let size = lines.len();
        let Ok(side) = i32::try_from(size) else {
            return Err(format!("Grid with {} rows is too large", size));
        };

        let mut start = None;
        let mut goal = None;
        let mut walls = Vec::new();
        let mut traps = Vec::new();

        for (y, line) in lines.iter().enumerate() {
            let width = line.chars().count();
            if width != size {
                return Err(format!(
                    "Row {} has {} cells but the grid has {} rows; grids must be square",
                    y, width, size
                ));
            }
            for (x, ch) in line.chars().enumerate() {
                let pos = Position::new(x as i32, y as i32);
                match ch {
                    '.' => {}
                    '#' => walls.push(pos),
                    '^' => traps.push(pos),
                    '@' => {
                        if start.is_some() {
                            return Err("Multiple robots found".to_string());
                        }
                        start = Some(pos);
                    }
                    '*' => {
                        if goal.is_some() {
                            return Err("Multiple goals found".to_string());
                        }
                        goal = Some(pos);
                    }
                    _ => {
                        return Err(format!(
                            "Invalid character '{}' at position ({}, {})",
                            ch, x, y
                        ));
                    }
                }
            }
        }

        let start = start.ok_or("No robot found on grid")?;
        let goal = goal.ok_or("No goal found on grid")?;

        let level = Level::new(side, start, goal, budget).map_err(|e| e.to_string())?;
        Ok(level.with_walls(walls).with_traps(traps))
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn size(&self) -> i32 {
        self.size
    }

    pub fn start(&self) -> Position {
        self.start
    }

    pub fn goal(&self) -> Position {
        self.goal
    }

    pub fn budget(&self) -> usize {
        self.budget
    }

    pub fn walls(&self) -> impl Iterator<Item = Position> + '_ {
        self.walls.iter().copied()
    }

    pub fn traps(&self) -> impl Iterator<Item = Position> + '_ {
        self.traps.iter().copied()
    }

    pub fn is_in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && pos.x < self.size && pos.y < self.size
    }

    pub fn is_wall(&self, pos: Position) -> bool {
        self.walls.contains(&pos)
    }

    pub fn is_trap(&self, pos: Position) -> bool {
        self.traps.contains(&pos)
    }

    pub fn is_goal(&self, pos: Position) -> bool {
        pos == self.goal
    }

    /// Cells the robot can stand on without the run ending badly.
    pub fn is_open(&self, pos: Position) -> bool {
        self.is_in_bounds(pos) && !self.is_wall(pos) && !self.is_trap(pos)
    }

    /// Draw the grid with the robot at `robot` instead of the start cell.
    ///
    /// A robot on the goal is drawn as `+`, a robot on a trap as `X`.
    pub fn render(&self, robot: Position) -> String {
        let mut out = String::new();
        for y in 0..self.size {
            for x in 0..self.size {
                let pos = Position::new(x, y);
                let ch = if pos == robot {
                    if self.is_goal(pos) {
                        '+'
                    } else if self.is_trap(pos) {
                        'X'
                    } else {
                        '@'
                    }
                } else if self.is_goal(pos) {
                    '*'
                } else if self.is_wall(pos) {
                    '#'
                } else if self.is_trap(pos) {
                    '^'
                } else {
                    '.'
                };
                out.push(ch);
            }
            out.push('\n');
        }
        out
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render(self.start))
    }
}
