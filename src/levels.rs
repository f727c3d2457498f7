use std::fs;
use std::io;
use std::path::Path;

use thiserror::Error;
use tracing::debug;

use crate::level::Level;

const CLASSIC: &str = include_str!("../levels/classic.txt");

/// Error type for level parsing operations.
#[derive(Debug, Error)]
pub enum LevelError {
    /// IO error when reading from file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    /// Invalid level content
    #[error("Invalid level: {0}")]
    InvalidLevel(String),
}

impl From<String> for LevelError {
    fn from(err: String) -> Self {
        LevelError::InvalidLevel(err)
    }
}

/// Metadata collected from `; key: value` lines ahead of a grid.
#[derive(Debug, Default)]
struct Header {
    name: Option<String>,
    description: Option<String>,
    budget: Option<usize>,
}

impl Header {
    fn apply(&mut self, comment: &str) -> Result<(), LevelError> {
        let Some((key, value)) = comment.split_once(':') else {
            return Ok(());
        };
        let value = value.trim();
        match key.trim().to_ascii_lowercase().as_str() {
            "name" => self.name = Some(value.to_string()),
            "description" => self.description = Some(value.to_string()),
            "budget" => {
                let budget = value
                    .parse()
                    .map_err(|_| format!("budget '{}' is not a number", value))?;
                self.budget = Some(budget);
            }
            // Anything else is an ordinary comment.
            _ => {}
        }
        Ok(())
    }
}

/// An ordered catalog of levels, indexed from 0.
#[derive(Debug, Clone)]
pub struct Levels {
    levels: Vec<Level>,
}

impl Levels {
    /// Parse a catalog of levels from a string.
    ///
    /// The format uses:
    /// - Lines starting with `;` as comments and level separators
    /// - `; name: ...`, `; description: ...` and `; budget: N` to describe
    ///   the level that follows
    /// - Grid rows as accepted by [`Level::from_text`]
    /// - Empty lines between levels (optional)
    ///
    /// Every level needs a budget. Levels get 1-based ids in file order.
    pub fn from_text(contents: &str) -> Result<Self, LevelError> {
        let mut levels = Vec::new();
        let mut header = Header::default();
        let mut grid = String::new();

        for line in contents.lines() {
            let line = line.trim();

            if let Some(comment) = line.strip_prefix(';') {
                // A comment after a grid closes that level
                if !grid.is_empty() {
                    levels.push(finish_level(&grid, &mut header, levels.len() + 1)?);
                    grid.clear();
                }
                header.apply(comment)?;
                continue;
            }

            if line.is_empty() {
                if !grid.is_empty() {
                    levels.push(finish_level(&grid, &mut header, levels.len() + 1)?);
                    grid.clear();
                }
                continue;
            }

            grid.push_str(line);
            grid.push('\n');
        }

        if !grid.is_empty() {
            levels.push(finish_level(&grid, &mut header, levels.len() + 1)?);
        }

        debug!(count = levels.len(), "loaded level catalog");
        Ok(Levels { levels })
    }

    /// Parse a catalog from a text file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LevelError> {
        let contents = fs::read_to_string(path)?;
        Self::from_text(&contents)
    }

    /// The five levels the game ships with.
    pub fn builtin() -> Result<Self, LevelError> {
        Self::from_text(CLASSIC)
    }

    /// Get the nth level (0-indexed).
    pub fn get(&self, index: usize) -> Option<&Level> {
        self.levels.get(index)
    }

    /// Get the number of levels.
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Level> {
        self.levels.iter()
    }
}

fn finish_level(grid: &str, header: &mut Header, id: usize) -> Result<Level, LevelError> {
    let header = std::mem::take(header);
    let budget = header
        .budget
        .ok_or_else(|| format!("level {}: missing budget", id))?;
    let level = Level::from_text(grid.trim_end(), budget)
        .map_err(|e| format!("level {}: {}", id, e))?;

    Ok(level
        .with_id(id)
        .with_name(header.name.unwrap_or_else(|| format!("Level {}", id)))
        .with_description(header.description.unwrap_or_default()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Position;

    #[test]
    fn test_from_text_basic() {
        let level1 = "@.*\n\
                      ...\n\
                      ...";

        let level2 = "....\n\
                      @#.*\n\
                      ..^.\n\
                      ....";

        let contents = format!(
            "; name: One\n; budget: 2\n{}\n\n; name: Two\n; description: second\n; budget: 5\n{}\n",
            level1, level2
        );

        let levels = Levels::from_text(&contents).unwrap();

        assert_eq!(levels.len(), 2);

        // Verify levels match the original strings when formatted back
        assert_eq!(levels.get(0).unwrap().to_string().trim_end(), level1);
        assert_eq!(levels.get(1).unwrap().to_string().trim_end(), level2);

        let second = levels.get(1).unwrap();
        assert_eq!(second.id(), 2);
        assert_eq!(second.name(), "Two");
        assert_eq!(second.description(), "second");
        assert_eq!(second.budget(), 5);
        assert!(levels.get(2).is_none());
    }

    #[test]
    fn test_comment_closes_level() {
        let contents = "; budget: 1\n@*\n..\n; budget: 2\n*@\n..";
        let levels = Levels::from_text(contents).unwrap();
        assert_eq!(levels.len(), 2);
        assert_eq!(levels.get(0).unwrap().budget(), 1);
        assert_eq!(levels.get(1).unwrap().budget(), 2);
        assert_eq!(levels.get(1).unwrap().name(), "Level 2");
    }

    #[test]
    fn test_builtin_levels() {
        let levels = Levels::builtin().unwrap();
        assert_eq!(levels.len(), 5);

        let names: Vec<&str> = levels.iter().map(|l| l.name()).collect();
        assert_eq!(
            names,
            vec![
                "First Steps",
                "Wall Blocker",
                "Maze Runner",
                "Danger Zone",
                "Complex Path"
            ]
        );
        let budgets: Vec<usize> = levels.iter().map(|l| l.budget()).collect();
        assert_eq!(budgets, vec![3, 6, 12, 8, 8]);

        let maze = levels.get(2).unwrap();
        assert_eq!(maze.start(), Position::new(0, 0));
        assert_eq!(maze.goal(), Position::new(4, 4));
        assert_eq!(maze.walls().count(), 6);
        assert!(maze.is_wall(Position::new(3, 3)));

        let complex = levels.get(4).unwrap();
        let traps: Vec<Position> = complex.traps().collect();
        assert_eq!(
            traps,
            vec![Position::new(0, 1), Position::new(0, 2), Position::new(4, 2)]
        );
        for level in levels.iter() {
            assert_eq!(level.size(), 5);
        }
    }

    #[test]
    fn test_from_text_invalid_level() {
        let contents = "; budget: 3\n\n@.*\n.@.\n...\n";

        let result = Levels::from_text(contents);
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), LevelError::InvalidLevel(_)));
    }

    #[test]
    fn test_missing_budget() {
        let err = Levels::from_text("@*\n..").unwrap_err();
        assert!(matches!(err, LevelError::InvalidLevel(msg) if msg.contains("missing budget")));
    }

    #[test]
    fn test_bad_budget() {
        let err = Levels::from_text("; budget: lots\n@*\n..").unwrap_err();
        assert!(matches!(err, LevelError::InvalidLevel(_)));
    }

    #[test]
    fn test_from_file_no_file() {
        let result = Levels::from_file("nonexistent_file.txt");
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), LevelError::Io(_)));
    }
}
