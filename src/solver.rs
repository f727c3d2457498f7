use std::collections::VecDeque;

use tracing::debug;

use crate::geometry::{ALL_INSTRUCTIONS, Instruction, Position};
use crate::level::Level;
use crate::program::Program;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SolveResult {
    /// Shortest program, and it fits the level budget.
    Solved(Program),
    /// Shortest program, but it needs more instructions than the budget.
    OverBudget(Program),
    /// The goal cannot be reached without hitting a wall or a trap.
    Impossible,
}

pub struct Solver {
    nodes_explored: usize,
}

impl Solver {
    pub fn new() -> Self {
        Solver { nodes_explored: 0 }
    }

    /// Find the shortest program that takes the robot from start to goal
    /// using a breadth-first search over open cells.
    ///
    /// The goal only counts once the robot moves onto it, so a level that
    /// starts on its goal is solved by stepping out and straight back.
    pub fn solve(&mut self, level: &Level) -> SolveResult {
        if level.is_goal(level.start()) {
            return self.solve_round_trip(level);
        }

        let size = level.size() as usize;
        // came_from[y][x] = instruction used to enter (x, y)
        let mut came_from: Vec<Option<Instruction>> = vec![None; size * size];
        let mut seen = vec![false; size * size];
        let mut queue = VecDeque::new();

        let index = |pos: Position| pos.y as usize * size + pos.x as usize;

        seen[index(level.start())] = true;
        queue.push_back(level.start());

        while let Some(pos) = queue.pop_front() {
            self.nodes_explored += 1;

            for instruction in ALL_INSTRUCTIONS {
                let next = pos.step(instruction);
                if !level.is_open(next) || seen[index(next)] {
                    continue;
                }
                seen[index(next)] = true;
                came_from[index(next)] = Some(instruction);

                if level.is_goal(next) {
                    let program = Self::backtrack(level, next, &came_from, index);
                    debug!(
                        level = level.id(),
                        length = program.len(),
                        nodes = self.nodes_explored,
                        "found path"
                    );
                    return if program.len() <= level.budget() {
                        SolveResult::Solved(program)
                    } else {
                        SolveResult::OverBudget(program)
                    };
                }
                queue.push_back(next);
            }
        }

        debug!(level = level.id(), nodes = self.nodes_explored, "goal unreachable");
        SolveResult::Impossible
    }

    pub fn nodes_explored(&self) -> usize {
        self.nodes_explored
    }

    fn solve_round_trip(&mut self, level: &Level) -> SolveResult {
        self.nodes_explored += 1;
        let start = level.start();
        let Some(out) = ALL_INSTRUCTIONS
            .into_iter()
            .find(|&instruction| level.is_open(start.step(instruction)))
        else {
            debug!(level = level.id(), "start is boxed in");
            return SolveResult::Impossible;
        };

        let program = Program::new(vec![out, out.opposite()]);
        if program.len() <= level.budget() {
            SolveResult::Solved(program)
        } else {
            SolveResult::OverBudget(program)
        }
    }

    fn backtrack(
        level: &Level,
        goal: Position,
        came_from: &[Option<Instruction>],
        index: impl Fn(Position) -> usize,
    ) -> Program {
        let mut instructions = Vec::new();
        let mut pos = goal;
        // Bounded by the number of cells in case of a malformed trail
        for _ in 0..came_from.len() {
            if pos == level.start() {
                break;
            }
            let Some(instruction) = came_from[index(pos)] else {
                break;
            };
            instructions.push(instruction);
            let (dx, dy) = instruction.delta();
            pos = Position::new(pos.x - dx, pos.y - dy);
        }
        instructions.reverse();
        Program::new(instructions)
    }
}

impl Default for Solver {
    fn default() -> Self {
        Self::new()
    }
}
