//! Incremental per-file symbol index
//!
//! Each analysis pass over a file replaces that file's symbols in bulk.
//! Occurrences that compare equal (same name, position and resolved type)
//! collapse into one entry, so repeated resolution of the same text never
//! accumulates duplicates.

use crate::descriptor::FieldDescriptor;
use crate::source::SymbolSource;
use crate::symbol::Symbol;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::collections::HashMap;
use std::collections::HashSet;
use std::path::Path;
use std::path::PathBuf;
use tracing::debug;

/// Concurrent symbol index keyed by file
#[derive(Debug, Default)]
pub struct SymbolIndex {
    /// File index: file_path -> symbols in source order
    files: DashMap<PathBuf, Vec<Symbol>>,
    /// Name index: symbol name -> files containing it
    names: DashMap<String, HashSet<PathBuf>>,
}

impl SymbolIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace everything known about `path` with `symbols`.
    ///
    /// Returns the number of distinct symbols stored for the file.
    pub fn replace_file(&self, path: &Path, symbols: impl IntoIterator<Item = Symbol>) -> usize {
        let deduped = dedupe(symbols);
        let count = deduped.len();

        match self.files.entry(path.to_path_buf()) {
            Entry::Occupied(mut occupied) => {
                self.unlink_names(path, occupied.get());
                self.link_names(path, &deduped);
                occupied.insert(deduped);
            }
            Entry::Vacant(vacant) => {
                self.link_names(path, &deduped);
                vacant.insert(deduped);
            }
        }

        debug!(path = %path.display(), symbols = count, "replaced file symbols");
        count
    }

    /// Index a symbol table from the analysis engine
    pub fn replace_source(&self, source: &dyn SymbolSource) -> usize {
        self.replace_file(source.path(), source.symbols().iter().cloned())
    }

    /// Drop all symbols of a file; returns how many were removed
    pub fn remove_file(&self, path: &Path) -> usize {
        match self.files.entry(path.to_path_buf()) {
            Entry::Occupied(occupied) => {
                self.unlink_names(path, occupied.get());
                occupied.remove().len()
            }
            Entry::Vacant(_) => 0,
        }
    }

    pub fn symbols_in(&self, path: &Path) -> Vec<Symbol> {
        self.files
            .get(path)
            .map(|symbols| symbols.clone())
            .unwrap_or_default()
    }

    /// All symbols named `name`, across files
    pub fn lookup(&self, name: &str) -> Vec<Symbol> {
        let paths: Vec<PathBuf> = match self.names.get(name) {
            Some(paths) => paths.iter().cloned().collect(),
            None => return Vec::new(),
        };

        let mut found = Vec::new();
        for path in paths {
            if let Some(symbols) = self.files.get(&path) {
                found.extend(symbols.iter().filter(|s| s.name() == name).cloned());
            }
        }
        found
    }

    /// Field descriptors for every declared field in the index
    pub fn field_descriptors(&self) -> Vec<FieldDescriptor> {
        self.files
            .iter()
            .flat_map(|entry| {
                entry
                    .value()
                    .iter()
                    .filter_map(Symbol::to_field_descriptor)
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.files.iter().map(|entry| entry.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    fn link_names(&self, path: &Path, symbols: &[Symbol]) {
        for symbol in symbols {
            self.names
                .entry(symbol.name().to_string())
                .or_default()
                .insert(path.to_path_buf());
        }
    }

    fn unlink_names(&self, path: &Path, symbols: &[Symbol]) {
        for symbol in symbols {
            if let Entry::Occupied(mut occupied) = self.names.entry(symbol.name().to_string()) {
                occupied.get_mut().remove(path);
                if occupied.get().is_empty() {
                    occupied.remove();
                }
            }
        }
    }
}

/// Keep the first position of each identity, with the latest occurrence's data
fn dedupe(symbols: impl IntoIterator<Item = Symbol>) -> Vec<Symbol> {
    let mut positions: HashMap<Symbol, usize> = HashMap::new();
    let mut out: Vec<Symbol> = Vec::new();
    for symbol in symbols {
        match positions.get(&symbol) {
            Some(&at) => out[at] = symbol,
            None => {
                positions.insert(symbol.clone(), out.len());
                out.push(symbol);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::FileSymbols;
    use crate::symbol::Occurrence;
    use crate::types::TextRange;
    use pretty_assertions::assert_eq;

    fn symbol(name: &str, pos: usize, ty: Option<&str>) -> Symbol {
        Occurrence::new(name, pos, TextRange::on_line(1, pos as u32, 1))
            .resolve(ty.map(str::to_string))
    }

    #[test]
    fn test_replace_collapses_equal_occurrences() {
        let index = SymbolIndex::new();
        let path = Path::new("src/Main.java");

        let first = symbol("count", 10, Some("int"));
        let again = Occurrence::new("count", 10, TextRange::on_line(1, 10, 5))
            .declaration()
            .resolve(Some("int".to_string()));

        let stored = index.replace_file(path, vec![first, symbol("other", 20, None), again]);
        assert_eq!(stored, 2);

        let symbols = index.symbols_in(path);
        assert_eq!(symbols.len(), 2);
        assert_eq!(symbols[0].name(), "count");
        // later occurrence wins
        assert!(symbols[0].is_declaration());
    }

    #[test]
    fn test_reanalysis_replaces_previous_pass() {
        let index = SymbolIndex::new();
        let path = Path::new("src/A.java");

        index.replace_file(path, vec![symbol("a", 1, None), symbol("b", 5, None)]);
        assert_eq!(index.lookup("b").len(), 1);

        index.replace_file(path, vec![symbol("a", 1, Some("String"))]);
        assert_eq!(index.len(), 1);
        assert!(index.lookup("b").is_empty());
        assert_eq!(index.lookup("a")[0].resolved_type(), Some("String"));
    }

    #[test]
    fn test_lookup_across_files_and_remove() {
        let index = SymbolIndex::new();
        let a = FileSymbols::new("a.src", vec![symbol("shared", 1, None)]);
        let b = FileSymbols::new("b.src", vec![symbol("shared", 7, None)]);
        index.replace_source(&a);
        index.replace_source(&b);

        assert_eq!(index.file_count(), 2);
        assert_eq!(index.lookup("shared").len(), 2);

        assert_eq!(index.remove_file(Path::new("a.src")), 1);
        assert_eq!(index.remove_file(Path::new("a.src")), 0);
        assert_eq!(index.lookup("shared").len(), 1);
        assert!(!index.is_empty());
    }

    #[test]
    fn test_field_descriptors() {
        let index = SymbolIndex::new();
        let field = Occurrence::new("id", 3, TextRange::on_line(2, 3, 2))
            .declaration()
            .field(Some("private"), "User")
            .resolve(Some("long".to_string()));
        index.replace_file(Path::new("User.java"), vec![field, symbol("local", 9, None)]);

        let fields = index.field_descriptors();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].declaration(), "private long id");
    }
}
