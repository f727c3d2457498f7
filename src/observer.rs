//! Run observers.
//!
//! The executor never touches a rendering surface. Whatever draws the robot
//! (a terminal, a browser, a test) implements [`RunObserver`] and is told
//! where the robot is and how the run ended.

use crate::executor::Outcome;
use crate::geometry::Position;

pub trait RunObserver {
    /// The robot is now at `position`. `animated` is false only for the
    /// initial placement on the start cell.
    fn on_step(&mut self, position: Position, animated: bool);

    /// Called exactly once per run, after the last `on_step`.
    fn on_outcome(&mut self, outcome: Outcome, position: Position);
}

impl<T: RunObserver + ?Sized> RunObserver for &mut T {
    fn on_step(&mut self, position: Position, animated: bool) {
        (**self).on_step(position, animated);
    }

    fn on_outcome(&mut self, outcome: Outcome, position: Position) {
        (**self).on_outcome(outcome, position);
    }
}

/// An observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl RunObserver for NullObserver {
    fn on_step(&mut self, _position: Position, _animated: bool) {}
    fn on_outcome(&mut self, _outcome: Outcome, _position: Position) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunEvent {
    Step { position: Position, animated: bool },
    Outcome { outcome: Outcome, position: Position },
}

/// Keeps every callback in order. Used for replays and headless tests.
#[derive(Debug, Default, Clone)]
pub struct RecordingObserver {
    events: Vec<RunEvent>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[RunEvent] {
        &self.events
    }

    /// Positions of animated moves only.
    pub fn moves(&self) -> Vec<Position> {
        self.events
            .iter()
            .filter_map(|event| match event {
                RunEvent::Step {
                    position,
                    animated: true,
                } => Some(*position),
                _ => None,
            })
            .collect()
    }

    pub fn outcomes(&self) -> Vec<Outcome> {
        self.events
            .iter()
            .filter_map(|event| match event {
                RunEvent::Outcome { outcome, .. } => Some(*outcome),
                _ => None,
            })
            .collect()
    }
}

impl RunObserver for RecordingObserver {
    fn on_step(&mut self, position: Position, animated: bool) {
        self.events.push(RunEvent::Step { position, animated });
    }

    fn on_outcome(&mut self, outcome: Outcome, position: Position) {
        self.events.push(RunEvent::Outcome { outcome, position });
    }
}

/// Sound effects a front end may play. Purely observational: nothing in the
/// engine waits on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    Button,
    Drop,
    Right,
    Wrong,
    Broken,
    Coins,
}

impl Cue {
    pub fn for_outcome(outcome: Outcome) -> Cue {
        match outcome {
            Outcome::Success => Cue::Right,
            Outcome::WallCollision => Cue::Wrong,
            Outcome::TrapCollision => Cue::Broken,
            Outcome::InstructionsExhausted => Cue::Wrong,
        }
    }

    /// Asset name, matching the files shipped with the web front end.
    pub fn name(&self) -> &'static str {
        match self {
            Cue::Button => "btn",
            Cue::Drop => "drop",
            Cue::Right => "right",
            Cue::Wrong => "wrong",
            Cue::Broken => "broken",
            Cue::Coins => "coins",
        }
    }
}
