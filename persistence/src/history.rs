//! Queryable history of analysis runs

use crate::entity::Entity;
use crate::entity::EntityId;
use crate::error::PersistenceError;
use crate::error::Result;
use crate::records::COMPILE_RESULT_ENTITY_TYPE;
use crate::records::DIAGNOSTIC_LINK;
use crate::records::Persist;
use crate::store::EntityStore;
use crate::store::StoreTransaction;
use chrono::DateTime;
use chrono::Utc;
use sift_analysis::AnalysisLedger;
use sift_analysis::DiagnosticRecord;
use sift_analysis::Severity;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;
use tracing::info;
use tracing::warn;

/// Stored view of one analysis run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub entity: EntityId,
    pub store_id: String,
    pub created_at: DateTime<Utc>,
    pub success: bool,
    pub problems: u64,
}

/// Stored view of one diagnostic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDiagnostic {
    pub kind: Severity,
    pub line: u32,
    pub column: u32,
    pub message: String,
    pub path: Option<PathBuf>,
    pub code: Option<String>,
}

impl StoredDiagnostic {
    /// Rebuild the in-memory record this entity was written from
    pub fn to_record(&self) -> DiagnosticRecord {
        let mut record =
            DiagnosticRecord::new(self.kind, self.message.clone()).at(self.line, self.column);
        if let Some(path) = &self.path {
            record = record.with_file(path);
        }
        if let Some(code) = &self.code {
            record = record.with_code(code.clone());
        }
        record
    }
}

impl std::fmt::Display for StoredDiagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.to_record(), f)
    }
}

/// Records ledgers into an [`EntityStore`] and reads them back
#[derive(Debug, Clone)]
pub struct AnalysisHistory {
    store: Arc<EntityStore>,
    max_runs: usize,
}

impl AnalysisHistory {
    /// `max_runs` of 0 keeps every run
    pub const fn new(store: Arc<EntityStore>, max_runs: usize) -> Self {
        Self { store, max_runs }
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    /// Persist `ledger` in its own transaction.
    ///
    /// Once the run is committed this returns `Ok`; retention is applied
    /// afterwards and its failures are only logged.
    pub fn record(&self, ledger: &AnalysisLedger) -> Result<EntityId> {
        let mut txn = self.store.begin();
        let entity = txn.new_entity(ledger.entity_type());
        ledger.persist(&mut txn, entity)?;
        txn.commit()?;

        info!(
            run = %ledger.store_id(),
            %entity,
            success = ledger.is_success(),
            problems = ledger.diagnostics().len(),
            "recorded analysis run"
        );

        if let Err(err) = self.prune() {
            warn!(%entity, error = %err, "failed to prune analysis history");
        }
        Ok(entity)
    }

    /// All readable runs, newest first. Malformed run entities are skipped.
    pub fn runs(&self) -> Result<Vec<RunSummary>> {
        let mut runs: Vec<RunSummary> = self
            .store
            .entities_of_type(COMPILE_RESULT_ENTITY_TYPE)?
            .iter()
            .filter_map(|entity| match run_summary(entity) {
                Ok(run) => Some(run),
                Err(err) => {
                    warn!(entity = %entity.id, error = %err, "skipping unreadable run");
                    None
                }
            })
            .collect();
        runs.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.entity.cmp(&a.entity))
        });
        Ok(runs)
    }

    pub fn latest(&self) -> Result<Option<RunSummary>> {
        Ok(self.runs()?.into_iter().next())
    }

    /// Look a run up by entity id (`#12`) or store id
    pub fn find(&self, key: &str) -> Result<Option<RunSummary>> {
        let by_entity = key.parse::<EntityId>().ok();
        Ok(self
            .runs()?
            .into_iter()
            .find(|run| Some(run.entity) == by_entity || run.store_id == key))
    }

    /// Diagnostics of `run`, in the order they were discovered
    pub fn diagnostics(&self, run: EntityId) -> Result<Vec<StoredDiagnostic>> {
        self.store
            .linked(run, DIAGNOSTIC_LINK)?
            .iter()
            .map(stored_diagnostic)
            .collect()
    }

    /// Drop the oldest runs beyond `max_runs`, with their diagnostics.
    ///
    /// Each run goes in its own transaction. A run another writer already
    /// removed is skipped.
    fn prune(&self) -> Result<usize> {
        if self.max_runs == 0 {
            return Ok(0);
        }
        let runs = self.runs()?;
        if runs.len() <= self.max_runs {
            return Ok(0);
        }

        let mut removed = 0;
        for run in &runs[self.max_runs..] {
            match self.delete_run(run.entity) {
                Ok(()) => removed += 1,
                Err(PersistenceError::EntityNotFound(_) | PersistenceError::Conflict(_)) => {
                    debug!(run = %run.entity, "run already pruned");
                }
                Err(err) => return Err(err),
            }
        }

        if removed > 0 {
            info!(removed, kept = self.max_runs, "pruned analysis history");
        }
        Ok(removed)
    }

    fn delete_run(&self, run: EntityId) -> Result<()> {
        let mut txn = self.store.begin();
        for child in self.store.linked(run, DIAGNOSTIC_LINK)? {
            txn.delete_entity(child.id)?;
        }
        txn.delete_entity(run)?;
        txn.commit()
    }
}

fn invalid(entity: &Entity, reason: &str) -> PersistenceError {
    PersistenceError::InvalidRecord {
        entity_type: entity.entity_type.clone(),
        id: entity.id,
        reason: reason.to_string(),
    }
}

fn run_summary(entity: &Entity) -> Result<RunSummary> {
    let seconds = entity
        .int("createdAt")
        .ok_or_else(|| invalid(entity, "missing createdAt"))?;
    let created_at = DateTime::<Utc>::from_timestamp(seconds, 0)
        .ok_or_else(|| invalid(entity, "createdAt out of range"))?;

    Ok(RunSummary {
        entity: entity.id,
        store_id: entity.string("storeId").unwrap_or_default().to_string(),
        created_at,
        success: entity
            .bool("result")
            .ok_or_else(|| invalid(entity, "missing result"))?,
        problems: entity
            .int("problems")
            .and_then(|n| u64::try_from(n).ok())
            .ok_or_else(|| invalid(entity, "missing problems"))?,
    })
}

fn stored_diagnostic(entity: &Entity) -> Result<StoredDiagnostic> {
    let position = |name: &str| {
        entity
            .int(name)
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(0)
    };

    Ok(StoredDiagnostic {
        kind: Severity::from_name(
            entity
                .string("kind")
                .ok_or_else(|| invalid(entity, "missing kind"))?,
        ),
        line: position("line"),
        column: position("column"),
        message: entity.string("message").unwrap_or_default().to_string(),
        path: entity.string("path").map(PathBuf::from),
        code: entity.string("code").map(str::to_string),
    })
}
