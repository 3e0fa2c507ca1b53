//! Integration tests for the persistence module

use crate::compression::CompressionLevel;
use crate::config::StoreConfig;
use crate::error::PersistenceError;
use crate::history::AnalysisHistory;
use crate::records::COMPILE_RESULT_ENTITY_TYPE;
use crate::records::DIAGNOSTIC_ENTITY_TYPE;
use crate::store::EntityStore;
use pretty_assertions::assert_eq;
use sift_analysis::AnalysisLedger;
use sift_analysis::CollectingSink;
use sift_analysis::DiagnosticRecord;
use sift_analysis::Failure;
use sift_analysis::FileSymbols;
use sift_analysis::Occurrence;
use sift_analysis::Severity;
use sift_analysis::Sources;
use sift_analysis::StackFrame;
use sift_analysis::SymbolSource;
use sift_analysis::TextRange;
use sift_analysis::catch_failure;
use std::collections::HashSet;
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;
use tempfile::tempdir;

fn file_config(dir: &TempDir) -> StoreConfig {
    StoreConfig {
        path: dir.path().join("history/analysis.store"),
        compression_level: CompressionLevel::Fast,
        max_runs: 10,
    }
}

/// Simulates one analysis run over `files`, where `Broken.src` makes the
/// engine panic.
fn analyze(dir: &TempDir, files: &[&str]) -> AnalysisLedger {
    let mut sources = Sources::new();
    let mut diagnostics = Vec::new();
    let mut failed = HashSet::new();

    for name in files {
        let path = dir.path().join(name);
        fs::write(&path, "source").unwrap();

        let outcome = catch_failure(StackFrame::new("resolver.rs", 120, "resolve_file"), || {
            if name.starts_with("Broken") {
                panic!("unexpected end of input");
            }
            let symbol = Occurrence::new("field", 4, TextRange::on_line(1, 4, 5))
                .declaration()
                .field(Some("private"), "Model")
                .resolve(Some("int".to_string()));
            FileSymbols::new(&path, vec![symbol])
        });

        match outcome {
            Ok(table) => {
                diagnostics.push(
                    DiagnosticRecord::new(Severity::Warning, "field is never read")
                        .with_file(&path)
                        .at(1, 4),
                );
                sources.insert(path, Arc::new(table) as Arc<dyn SymbolSource>);
            }
            Err(failure) => {
                if let Some(record) = failure.diagnostic() {
                    diagnostics.push(record);
                }
                failed.insert(path);
            }
        }
    }

    let success = failed.is_empty();
    AnalysisLedger::with_diagnostics(success, sources, &diagnostics, failed)
}

#[test]
fn test_crashed_run_is_recorded_and_survives_reopen() {
    let dir = tempdir().unwrap();
    let config = file_config(&dir);
    let ledger = analyze(&dir, &["Model.src", "Broken.src"]);

    assert!(!ledger.is_success());
    assert!(ledger.is_consistent());
    assert_eq!(ledger.error_files().len(), 1);
    assert_eq!(ledger.sources().len(), 1);
    assert_eq!(ledger.diagnostics().len(), 2);

    let sink = CollectingSink::new();
    ledger.report_to(&sink, Some("analysis:"));
    assert_eq!(sink.lines().len(), 2);

    let entity = {
        let history = AnalysisHistory::new(Arc::new(EntityStore::open(&config).unwrap()), 10);
        history.record(&ledger).unwrap()
    };

    let reopened = AnalysisHistory::new(Arc::new(EntityStore::open(&config).unwrap()), 10);
    let runs = reopened.runs().unwrap();
    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].entity, entity);
    assert!(!runs[0].success);
    assert_eq!(runs[0].problems, 2);

    let stored = reopened.diagnostics(entity).unwrap();
    assert_eq!(stored[0].kind, Severity::Warning);
    assert_eq!(
        stored[0].path,
        Some(fs::canonicalize(dir.path().join("Model.src")).unwrap())
    );
    assert_eq!(stored[1].kind, Severity::Error);
    assert_eq!(stored[1].path, None);
    assert_eq!(stored[1].code.as_deref(), Some("resolve_file"));
    assert_eq!(stored[1].line, 120);
    assert_eq!(stored[1].message, "unexpected end of input");
}

#[test]
fn test_new_ids_do_not_collide_after_reopen() {
    let dir = tempdir().unwrap();
    let config = file_config(&dir);

    let first = {
        let history = AnalysisHistory::new(Arc::new(EntityStore::open(&config).unwrap()), 0);
        history.record(&AnalysisLedger::empty(true)).unwrap()
    };
    let history = AnalysisHistory::new(Arc::new(EntityStore::open(&config).unwrap()), 0);
    let second = history.record(&AnalysisLedger::empty(true)).unwrap();

    assert!(second > first);
    assert_eq!(history.runs().unwrap().len(), 2);
}

#[test]
fn test_failed_persist_leaves_store_and_ledger_intact() {
    let dir = tempdir().unwrap();
    let history = AnalysisHistory::new(Arc::new(EntityStore::open(&file_config(&dir)).unwrap()), 0);
    let ledger = AnalysisLedger::with_diagnostics(
        false,
        Sources::new(),
        &[DiagnosticRecord::new(Severity::Error, "missing")
            .with_file(dir.path().join("vanished.src"))],
        HashSet::new(),
    );

    let err = history.record(&ledger).unwrap_err();
    assert!(matches!(err, PersistenceError::CanonicalPath { .. }));
    assert!(history.runs().unwrap().is_empty());
    assert!(!dir.path().join("history/analysis.store").exists());

    // the ledger can still be reported
    assert!(ledger.summary().contains("missing"));
}

#[test]
fn test_entity_types_group_records() {
    let dir = tempdir().unwrap();
    let store = Arc::new(EntityStore::open(&file_config(&dir)).unwrap());
    let history = AnalysisHistory::new(Arc::clone(&store), 0);
    history.record(&analyze(&dir, &["A.src", "B.src"])).unwrap();

    assert_eq!(store.entities_of_type(COMPILE_RESULT_ENTITY_TYPE).unwrap().len(), 1);
    assert_eq!(store.entities_of_type(DIAGNOSTIC_ENTITY_TYPE).unwrap().len(), 2);
    assert!(store.path().unwrap().ends_with("history/analysis.store"));
}

#[test]
fn test_empty_stack_failure_is_not_synthesized() {
    let failure = Failure::new("lost", Vec::new());
    assert!(failure.diagnostic().is_none());
}
