use std::process;
use std::thread;
use std::time::Duration;

use clap::{Parser, Subcommand};
use gridbot::{
    Cue, Level, Levels, Outcome, Position, Program, RunError, RunObserver, Session, SessionError,
    SolveResult, Solver, logging,
};
use tracing::debug;

/// Prints the board as the robot moves and the message once it stops.
struct TerminalObserver<'a> {
    level: &'a Level,
    frames: bool,
    moves: usize,
}

impl RunObserver for TerminalObserver<'_> {
    fn on_step(&mut self, position: Position, animated: bool) {
        if animated {
            self.moves += 1;
        }
        if self.frames {
            println!("\nMove {} {}:\n{}", self.moves, position, self.level.render(position));
        }
    }

    fn on_outcome(&mut self, outcome: Outcome, position: Position) {
        debug!(cue = Cue::for_outcome(outcome).name(), "feedback cue");
        println!("{} (ended at {})", outcome.message(), position);
    }
}

#[derive(Parser)]
#[command(name = "gridbot")]
#[command(about = "Program a robot across a grid puzzle", long_about = None)]
struct Args {
    /// Path to a levels file (defaults to the built-in levels)
    #[arg(short, long, value_name = "FILE", global = true)]
    levels: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List every level in the catalog
    List,

    /// Print a level's board
    Show {
        /// Level number (1-indexed)
        #[arg(value_name = "LEVEL")]
        level: usize,
    },

    /// Run a program against a level
    Run {
        /// Level number (1-indexed)
        #[arg(value_name = "LEVEL")]
        level: usize,

        /// Instructions, e.g. "RRU", "right right up" or "→→↑"
        #[arg(value_name = "PROGRAM", default_value = "")]
        program: String,

        /// Delay between moves, in milliseconds
        #[arg(short, long, default_value = "400")]
        delay_ms: u64,

        /// Print the board after every move
        #[arg(short, long)]
        frames: bool,
    },

    /// Find the shortest program for a level
    Solve {
        /// Level number (1-indexed)
        #[arg(value_name = "LEVEL")]
        level: usize,
    },
}

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

fn load_levels(path: Option<&str>) -> Levels {
    let result = match path {
        Some(path) => Levels::from_file(path),
        None => Levels::builtin(),
    };
    match result {
        Ok(levels) => levels,
        Err(e) => fail(format!("loading levels: {}", e)),
    }
}

/// Validate a 1-indexed level number and return its 0-based index.
fn level_index(levels: &Levels, number: usize) -> usize {
    if number == 0 {
        fail("level numbers must be at least 1");
    }
    if number > levels.len() {
        fail(format!(
            "level {} not found (catalog contains {} levels)",
            number,
            levels.len()
        ));
    }
    number - 1
}

fn list(levels: &Levels) {
    for level in levels.iter() {
        println!(
            "level: {:<3}  name: {:<14}  grid: {}x{}  budget: {:<3}  {}",
            level.id(),
            level.name(),
            level.size(),
            level.size(),
            level.budget(),
            level.description()
        );
    }
}

fn show(levels: &Levels, number: usize) {
    let index = level_index(levels, number);
    if let Some(level) = levels.get(index) {
        println!("Level {}: {} ({} moves)", level.id(), level.name(), level.budget());
        print!("{}", level);
    }
}

fn run(levels: Levels, number: usize, text: &str, delay_ms: u64, frames: bool) -> bool {
    let index = level_index(&levels, number);
    let program: Program = match text.parse() {
        Ok(program) => program,
        Err(e) => fail(e),
    };

    let mut session = match Session::new(levels) {
        Ok(session) => session,
        Err(e) => fail(e),
    };
    if let Err(e) = session.load_level(index) {
        fail(e);
    }
    for &instruction in program.iter() {
        if let Err(e) = session.add_instruction(instruction) {
            fail(format!(
                "{} ({} instructions given, level {} allows {})",
                e,
                program.len(),
                number,
                session.level().budget()
            ));
        }
    }

    let level = session.level();
    println!("Level {}: {}", level.id(), level.description());

    let observer = TerminalObserver {
        level,
        frames,
        moves: 0,
    };
    let delay = Duration::from_millis(delay_ms);
    let report = match session.start_run(observer) {
        Ok(execution) => execution.drive(|step| {
            if step.outcome.is_none() {
                thread::sleep(delay);
            }
        }),
        Err(SessionError::Run(RunError::EmptyProgram)) => {
            println!("Add some commands first!");
            return false;
        }
        Err(e) => fail(e),
    };
    session.settle(&report);

    println!(
        "outcome: {}  steps: {}  moves: {}  program: {}",
        report.outcome,
        report.steps,
        report.move_count,
        session.slots().to_program()
    );
    if report.outcome.is_success() {
        if session.is_last_level() {
            println!("You finished every level!");
        } else {
            println!("Great job! You completed level {}!", number);
        }
    }
    report.outcome.is_success()
}

fn solve(levels: &Levels, number: usize) -> bool {
    let index = level_index(levels, number);
    let Some(level) = levels.get(index) else {
        return false;
    };

    let mut solver = Solver::new();
    let result = solver.solve(level);
    let (solved_char, program) = match &result {
        SolveResult::Solved(program) => ('Y', program.to_string()),
        SolveResult::OverBudget(program) => ('B', program.to_string()),
        SolveResult::Impossible => ('X', String::new()),
    };

    println!(
        "level: {:<3}  solved: {}  steps: {:<3}  budget: {:<3}  states: {:<5}  program: {}",
        number,
        solved_char,
        program.chars().count(),
        level.budget(),
        solver.nodes_explored(),
        program
    );
    matches!(result, SolveResult::Solved(_))
}

fn main() {
    logging::init();
    let args = Args::parse();

    let levels = load_levels(args.levels.as_deref());

    let ok = match args.command {
        Command::List => {
            list(&levels);
            true
        }
        Command::Show { level } => {
            show(&levels, level);
            true
        }
        Command::Run {
            level,
            program,
            delay_ms,
            frames,
        } => run(levels, level, &program, delay_ms, frames),
        Command::Solve { level } => solve(&levels, level),
    };

    if !ok {
        process::exit(1);
    }
}
