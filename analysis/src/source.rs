//! Per-file symbol tables produced by the analysis engine

use crate::symbol::Symbol;
use std::fmt::Debug;
use std::path::Path;
use std::path::PathBuf;

/// Symbol table of one analyzed file.
///
/// Owned by the engine's cache; the ledger and index only hold shared
/// references to it.
pub trait SymbolSource: Debug + Send + Sync {
    /// File identity this table was produced for
    fn path(&self) -> &Path;

    /// Symbol occurrences found in the file, in source order
    fn symbols(&self) -> &[Symbol];
}

/// Plain in-memory symbol table
#[derive(Debug, Clone, Default)]
pub struct FileSymbols {
    path: PathBuf,
    symbols: Vec<Symbol>,
}

impl FileSymbols {
    pub fn new(path: impl Into<PathBuf>, symbols: Vec<Symbol>) -> Self {
        Self {
            path: path.into(),
            symbols,
        }
    }
}

impl SymbolSource for FileSymbols {
    fn path(&self) -> &Path {
        &self.path
    }

    fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }
}
