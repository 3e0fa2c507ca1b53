//! Core positional types shared by symbols and sources

use serde::Deserialize;
use serde::Serialize;

/// A line/column location inside a source file (1-based, 0 = unknown)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub column: u32,
}

impl Position {
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// Start/end span of a name occurrence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TextRange {
    pub begin: Position,
    pub end: Position,
}

impl TextRange {
    pub const fn new(begin: Position, end: Position) -> Self {
        Self { begin, end }
    }

    /// Range covering `len` columns on a single line
    pub const fn on_line(line: u32, column: u32, len: u32) -> Self {
        Self {
            begin: Position::new(line, column),
            end: Position::new(line, column.saturating_add(len)),
        }
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.begin <= pos && pos <= self.end
    }
}

impl std::fmt::Display for TextRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.begin.line == self.end.line {
            write!(
                f,
                "{}:{}-{}",
                self.begin.line, self.begin.column, self.end.column
            )
        } else {
            write!(f, "{}-{}", self.begin, self.end)
        }
    }
}
