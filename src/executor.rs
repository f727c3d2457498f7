//! The program executor.
//!
//! A run walks the program one instruction at a time against an immutable
//! [`Level`]. Each call to [`Execution::step`] evaluates exactly one
//! instruction and hands control back, so whoever drives the run decides
//! how long to wait between moves. Ordering is all that matters for the
//! result; elapsed time never does.

use std::fmt;

use tracing::{debug, info};

use crate::error::RunError;
use crate::geometry::{Instruction, Position};
use crate::level::Level;
use crate::observer::{NullObserver, RunObserver};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    WallCollision,
    TrapCollision,
    InstructionsExhausted,
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        *self == Outcome::Success
    }

    /// The line shown to the player once the run is over.
    pub fn message(&self) -> &'static str {
        match self {
            Outcome::Success => "🎉 Success!",
            Outcome::WallCollision => "Hit a wall! Try again.",
            Outcome::TrapCollision => "Hit a trap! Try again.",
            Outcome::InstructionsExhausted => "Not quite there! Try adding more moves.",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success => write!(f, "Success"),
            Outcome::WallCollision => write!(f, "WallCollision"),
            Outcome::TrapCollision => write!(f, "TrapCollision"),
            Outcome::InstructionsExhausted => write!(f, "InstructionsExhausted"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Running,
    Finished(Outcome),
}

/// Mutable state of one in-flight run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionState {
    pub position: Position,
    /// Index of the next instruction to apply.
    pub step_index: usize,
    pub phase: Phase,
}

/// What a single call to [`Execution::step`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    pub index: usize,
    pub instruction: Instruction,
    /// Set when a move event was emitted. Wall collisions never move.
    pub moved_to: Option<Position>,
    /// Set when this step ended the run.
    pub outcome: Option<Outcome>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub outcome: Outcome,
    pub final_position: Position,
    /// Target of every move event, in order. Includes the trap cell when the
    /// run ends on one.
    pub visited: Vec<Position>,
    /// Instructions evaluated, including the one that ended the run.
    pub steps: usize,
    /// Completed moves. A step into a trap is shown but not counted.
    pub move_count: usize,
}

pub struct Execution<'a, O: RunObserver> {
    level: &'a Level,
    program: &'a [Instruction],
    state: ExecutionState,
    visited: Vec<Position>,
    move_count: usize,
    observer: O,
}

impl<'a, O: RunObserver> Execution<'a, O> {
    /// Place the robot on the start cell and get ready to step.
    ///
    /// An empty program is refused before any state exists, and the
    /// observer hears nothing.
    pub fn start(
        program: &'a [Instruction],
        level: &'a Level,
        mut observer: O,
    ) -> Result<Self, RunError> {
        if program.is_empty() {
            return Err(RunError::EmptyProgram);
        }

        debug!(
            level = level.id(),
            instructions = program.len(),
            start = %level.start(),
            "starting run"
        );
        observer.on_step(level.start(), false);

        Ok(Execution {
            level,
            program,
            state: ExecutionState {
                position: level.start(),
                step_index: 0,
                phase: Phase::Running,
            },
            visited: Vec::with_capacity(program.len()),
            move_count: 0,
            observer,
        })
    }

    pub fn state(&self) -> &ExecutionState {
        &self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state.phase != Phase::Running
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn into_observer(self) -> O {
        self.observer
    }

    /// Apply the next instruction. Returns `None` once the run is over.
    pub fn step(&mut self) -> Option<Step> {
        if self.is_finished() {
            return None;
        }

        let index = self.state.step_index;
        // Unreachable while running: the last instruction always finishes
        // the run.
        let Some(&instruction) = self.program.get(index) else {
            self.terminate(Outcome::InstructionsExhausted);
            return None;
        };
        self.state.step_index += 1;

        let current = self.state.position;
        let candidate = current.step(instruction);
        debug!(index, %instruction, from = %current, to = %candidate, "step");

        // Blocked moves end the run where the robot stands.
        if !self.level.is_in_bounds(candidate) || self.level.is_wall(candidate) {
            self.terminate(Outcome::WallCollision);
            return Some(Step {
                index,
                instruction,
                moved_to: None,
                outcome: Some(Outcome::WallCollision),
            });
        }

        // The robot is shown entering the trap before the run fails.
        if self.level.is_trap(candidate) {
            self.move_to(candidate);
            self.terminate(Outcome::TrapCollision);
            return Some(Step {
                index,
                instruction,
                moved_to: Some(candidate),
                outcome: Some(Outcome::TrapCollision),
            });
        }

        self.move_to(candidate);
        self.move_count += 1;

        let outcome = if self.level.is_goal(candidate) {
            Some(Outcome::Success)
        } else if self.state.step_index == self.program.len() {
            Some(Outcome::InstructionsExhausted)
        } else {
            None
        };
        if let Some(outcome) = outcome {
            self.terminate(outcome);
        }

        Some(Step {
            index,
            instruction,
            moved_to: Some(candidate),
            outcome,
        })
    }

    /// The report, once the run has finished.
    pub fn report(&self) -> Option<RunReport> {
        match self.state.phase {
            Phase::Running => None,
            Phase::Finished(outcome) => Some(RunReport {
                outcome,
                final_position: self.state.position,
                visited: self.visited.clone(),
                steps: self.state.step_index,
                move_count: self.move_count,
            }),
        }
    }

    /// Step to the end, calling `pause` after every step. This is where a
    /// front end waits for its animation.
    pub fn drive(mut self, mut pause: impl FnMut(&Step)) -> RunReport {
        loop {
            if let Some(report) = self.report() {
                return report;
            }
            if let Some(step) = self.step() {
                pause(&step);
            }
        }
    }

    pub fn finish(self) -> RunReport {
        self.drive(|_| {})
    }

    fn move_to(&mut self, position: Position) {
        self.state.position = position;
        self.visited.push(position);
        self.observer.on_step(position, true);
    }

    fn terminate(&mut self, outcome: Outcome) {
        self.state.phase = Phase::Finished(outcome);
        info!(
            level = self.level.id(),
            %outcome,
            position = %self.state.position,
            steps = self.state.step_index,
            "run finished"
        );
        self.observer.on_outcome(outcome, self.state.position);
    }
}

impl<O: RunObserver> Iterator for Execution<'_, O> {
    type Item = Step;

    fn next(&mut self) -> Option<Self::Item> {
        self.step()
    }
}

/// Run a program to completion without pausing.
pub fn run(program: &[Instruction], level: &Level) -> Result<RunReport, RunError> {
    run_observed(program, level, NullObserver)
}

pub fn run_observed<O: RunObserver>(
    program: &[Instruction],
    level: &Level,
    observer: O,
) -> Result<RunReport, RunError> {
    Ok(Execution::start(program, level, observer)?.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Instruction::{Down, Left, Right, Up};
    use crate::observer::{RecordingObserver, RunEvent};
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn open_row(goal_x: i32) -> Level {
        Level::new(5, Position::new(0, 2), Position::new(goal_x, 2), 8).unwrap()
    }

    #[test]
    fn test_reach_goal() {
        let level = open_row(3);
        let mut recorder = RecordingObserver::new();
        let report = run_observed(&[Right, Right, Right], &level, &mut recorder).unwrap();

        assert_eq!(report.outcome, Outcome::Success);
        assert_eq!(report.final_position, Position::new(3, 2));
        assert_eq!(recorder.moves().len(), 3);
        assert_eq!(report.move_count, 3);
    }

    #[test]
    fn test_wall_collision() {
        let level = open_row(4).with_walls([Position::new(2, 2)]);
        let mut recorder = RecordingObserver::new();
        let report = run_observed(&[Right, Right, Right], &level, &mut recorder).unwrap();

        assert_eq!(report.outcome, Outcome::WallCollision);
        assert_eq!(report.final_position, Position::new(1, 2));
        assert_eq!(report.steps, 2);
        // No move event toward the wall.
        assert_eq!(recorder.moves(), vec![Position::new(1, 2)]);
    }

    #[test]
    fn test_edge_of_grid_is_a_wall() {
        let level = open_row(4);
        let report = run(&[Left], &level).unwrap();
        assert_eq!(report.outcome, Outcome::WallCollision);
        assert_eq!(report.final_position, level.start());
        assert!(report.visited.is_empty());

        let report = run(&[Down, Down, Down], &level).unwrap();
        assert_eq!(report.outcome, Outcome::WallCollision);
        assert_eq!(report.final_position, Position::new(0, 4));
    }

    #[test]
    fn test_trap_collision() {
        let level = open_row(4).with_traps([Position::new(2, 2)]);
        let mut recorder = RecordingObserver::new();
        let report = run_observed(&[Right, Right], &level, &mut recorder).unwrap();

        assert_eq!(report.outcome, Outcome::TrapCollision);
        assert_eq!(report.final_position, Position::new(2, 2));
        assert_eq!(report.visited, vec![Position::new(1, 2), Position::new(2, 2)]);
        assert_eq!(report.move_count, 1);

        // The move into the trap is emitted before the outcome.
        let events = recorder.events();
        assert_eq!(
            &events[events.len() - 2..],
            &[
                RunEvent::Step {
                    position: Position::new(2, 2),
                    animated: true,
                },
                RunEvent::Outcome {
                    outcome: Outcome::TrapCollision,
                    position: Position::new(2, 2),
                },
            ]
        );
    }

    #[test]
    fn test_instructions_exhausted() {
        let level = open_row(3);
        let report = run(&[Right], &level).unwrap();
        assert_eq!(report.outcome, Outcome::InstructionsExhausted);
        assert_eq!(report.final_position, Position::new(1, 2));
        assert_eq!(report.steps, 1);
    }

    #[test]
    fn test_stops_at_goal() {
        let level = open_row(2);
        let report = run(&[Right, Right, Up, Up, Left], &level).unwrap();
        assert_eq!(report.outcome, Outcome::Success);
        assert_eq!(report.steps, 2);
        assert_eq!(report.final_position, Position::new(2, 2));
    }

    #[test]
    fn test_goal_only_checked_after_moving() {
        // Start on the goal: leaving and coming back succeeds, staying put is
        // impossible because every instruction moves.
        let level = Level::new(3, Position::new(1, 1), Position::new(1, 1), 4).unwrap();
        let report = run(&[Up, Down], &level).unwrap();
        assert_eq!(report.outcome, Outcome::Success);
        assert_eq!(report.steps, 2);
    }

    #[test]
    fn test_empty_program() {
        let level = open_row(3);
        let mut recorder = RecordingObserver::new();
        let result = run_observed(&[], &level, &mut recorder);
        assert_eq!(result, Err(RunError::EmptyProgram));
        assert!(recorder.events().is_empty());
    }

    #[test]
    fn test_initial_placement_not_animated() {
        let level = open_row(3);
        let mut recorder = RecordingObserver::new();
        run_observed(&[Right], &level, &mut recorder).unwrap();
        assert_eq!(
            recorder.events()[0],
            RunEvent::Step {
                position: Position::new(0, 2),
                animated: false,
            }
        );
        assert_eq!(recorder.outcomes(), vec![Outcome::InstructionsExhausted]);
    }

    #[test]
    fn test_manual_stepping() {
        let level = open_row(3);
        let program = [Right, Right, Right];
        let mut execution = Execution::start(&program, &level, NullObserver).unwrap();

        let first = execution.step().unwrap();
        assert_eq!(first.index, 0);
        assert_eq!(first.moved_to, Some(Position::new(1, 2)));
        assert_eq!(first.outcome, None);
        assert!(execution.report().is_none());
        assert_eq!(execution.state().step_index, 1);

        let rest: Vec<Step> = execution.by_ref().collect();
        assert_eq!(rest.len(), 2);
        assert_eq!(rest[1].outcome, Some(Outcome::Success));
        assert!(execution.is_finished());
        assert!(execution.step().is_none());
        assert_eq!(execution.report().unwrap().outcome, Outcome::Success);
    }

    #[test]
    fn test_dropped_execution_reports_no_outcome() {
        let level = open_row(3);
        let program = [Right, Right, Right];
        let mut recorder = RecordingObserver::new();
        {
            let mut execution = Execution::start(&program, &level, &mut recorder).unwrap();
            let step = execution.step().unwrap();
            assert_eq!(step.outcome, None);
            assert!(!execution.is_finished());
        }

        assert!(recorder.outcomes().is_empty());
        assert_eq!(recorder.moves(), vec![Position::new(1, 2)]);
    }

    #[test]
    fn test_drive_pauses_between_steps() {
        let level = open_row(4).with_walls([Position::new(2, 2)]);
        let program = [Right, Right, Right];
        let mut paused = Vec::new();
        let report = Execution::start(&program, &level, NullObserver)
            .unwrap()
            .drive(|step| paused.push(step.index));
        assert_eq!(paused, vec![0, 1]);
        assert_eq!(report.outcome, Outcome::WallCollision);
    }

    #[test]
    fn test_idempotent() {
        let level = open_row(4).with_traps([Position::new(3, 1)]);
        let program = [Up, Right, Right, Down, Right];
        assert_eq!(run(&program, &level), run(&program, &level));
    }

    fn random_level(rng: &mut ChaCha8Rng) -> Level {
        let size = rng.gen_range(2..8);
        let start = Position::new(rng.gen_range(0..size), rng.gen_range(0..size));
        let mut goal = start;
        while goal == start {
            goal = Position::new(rng.gen_range(0..size), rng.gen_range(0..size));
        }
        let mut walls = Vec::new();
        let mut traps = Vec::new();
        for y in 0..size {
            for x in 0..size {
                let pos = Position::new(x, y);
                if pos == start || pos == goal {
                    continue;
                }
                match rng.gen_range(0..10) {
                    0 | 1 => walls.push(pos),
                    2 => traps.push(pos),
                    _ => {}
                }
            }
        }
        Level::new(size, start, goal, 16)
            .unwrap()
            .with_walls(walls)
            .with_traps(traps)
    }

    fn random_program(rng: &mut ChaCha8Rng) -> Vec<Instruction> {
        let len = rng.gen_range(1..20);
        (0..len)
            .map(|_| Instruction::from_index(rng.gen_range(0..4)).unwrap())
            .collect()
    }

    #[test]
    fn test_random_runs_hold_invariants() {
        let mut rng = ChaCha8Rng::seed_from_u64(0x5eed_0f_9a1d_b07);

        for _ in 0..500 {
            let level = random_level(&mut rng);
            let program = random_program(&mut rng);
            let mut recorder = RecordingObserver::new();
            let report = run_observed(&program, &level, &mut recorder).unwrap();

            assert!(report.steps >= 1 && report.steps <= program.len());
            assert_eq!(recorder.outcomes(), vec![report.outcome]);
            assert_eq!(recorder.moves(), report.visited);
            assert_eq!(run(&program, &level).unwrap(), report);

            // Every move is to a neighbouring cell.
            let mut previous = level.start();
            for &pos in &report.visited {
                assert_eq!((pos.x - previous.x).abs() + (pos.y - previous.y).abs(), 1);
                previous = pos;
            }

            let last = program[report.steps - 1];
            match report.outcome {
                Outcome::Success => {
                    assert!(level.is_goal(report.final_position));
                }
                Outcome::WallCollision => {
                    let blocked = report.final_position.step(last);
                    assert!(!level.is_in_bounds(blocked) || level.is_wall(blocked));
                    assert!(level.is_in_bounds(report.final_position));
                    assert!(!level.is_wall(report.final_position));
                }
                Outcome::TrapCollision => {
                    assert!(level.is_trap(report.final_position));
                    assert_eq!(report.visited.last(), Some(&report.final_position));
                }
                Outcome::InstructionsExhausted => {
                    assert_eq!(report.steps, program.len());
                    assert!(!level.is_goal(report.final_position));
                }
            }

            // Nothing before the final step ever touched a trap or the goal.
            for &pos in &report.visited[..report.visited.len().saturating_sub(1)] {
                assert!(!level.is_trap(pos));
                assert!(!level.is_goal(pos));
            }
        }
    }
}
