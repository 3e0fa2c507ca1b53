//! Analysis result ledger: the outcome of one analysis run

use crate::diagnostic::DiagnosticRecord;
use crate::report::Channel;
use crate::report::DiagnosticSink;
use crate::source::SymbolSource;
use chrono::DateTime;
use chrono::Utc;
use std::collections::HashMap;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

/// Summary returned for a run without diagnostics
pub const NOT_COMPILED: &str = "not compiled.";

/// Per-file symbol tables keyed by file identity
pub type Sources = HashMap<PathBuf, Arc<dyn SymbolSource>>;

/// Aggregate result of one analysis run.
///
/// `success` is set by the caller and not derived from the contents; callers
/// should keep it false whenever a file failed or an ERROR was reported (see
/// [`AnalysisLedger::is_consistent`]).
#[derive(Debug, Clone)]
pub struct AnalysisLedger {
    run_id: Uuid,
    created_at: DateTime<Utc>,
    success: bool,
    sources: Sources,
    diagnostics: Vec<DiagnosticRecord>,
    failed_files: HashSet<PathBuf>,
}

impl AnalysisLedger {
    /// Ledger for a run that produced no sources
    pub fn empty(success: bool) -> Self {
        Self::new(success, Sources::new())
    }

    pub fn new(success: bool, sources: Sources) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            created_at: Utc::now(),
            success,
            sources,
            diagnostics: Vec::new(),
            failed_files: HashSet::new(),
        }
    }

    /// Full ledger. `diagnostics` is copied; later changes to the caller's
    /// slice owner do not reach the ledger.
    pub fn with_diagnostics(
        success: bool,
        sources: Sources,
        diagnostics: &[DiagnosticRecord],
        failed_files: HashSet<PathBuf>,
    ) -> Self {
        Self {
            diagnostics: diagnostics.to_vec(),
            failed_files,
            ..Self::new(success, sources)
        }
    }

    pub const fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub const fn is_success(&self) -> bool {
        self.success
    }

    pub const fn sources(&self) -> &Sources {
        &self.sources
    }

    /// Files that did not produce usable output
    pub const fn error_files(&self) -> &HashSet<PathBuf> {
        &self.failed_files
    }

    /// Diagnostics in discovery order
    pub fn diagnostics(&self) -> &[DiagnosticRecord] {
        &self.diagnostics
    }

    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    pub fn warning_count(&self) -> usize {
        self.diagnostics.len() - self.error_count()
    }

    /// Whether `success` matches the recommended policy: no failed files and
    /// no ERROR diagnostics
    pub fn is_consistent(&self) -> bool {
        let clean = self.failed_files.is_empty() && self.error_count() == 0;
        self.success == clean
    }

    /// One line per diagnostic, or [`NOT_COMPILED`] when there are none
    pub fn summary(&self) -> String {
        if !self.has_diagnostics() {
            return NOT_COMPILED.to_string();
        }
        self.diagnostics
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Send every diagnostic to `sink`: ERROR to the error channel, the rest
    /// to the warning channel, each line prefixed with `prefix` if given.
    pub fn report_to<S: DiagnosticSink + ?Sized>(&self, sink: &S, prefix: Option<&str>) {
        for diagnostic in &self.diagnostics {
            let channel = if diagnostic.is_error() {
                Channel::Error
            } else {
                Channel::Warning
            };
            let line = match prefix {
                Some(prefix) => format!("{prefix} {diagnostic}"),
                None => diagnostic.to_string(),
            };
            sink.record(channel, &line);
        }
    }
}
