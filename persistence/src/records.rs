//! Writing analysis records into a store transaction
//!
//! Each persisted record type gets its own [`Persist`] implementation, called
//! explicitly by the storage layer. `persist` never begins or commits a
//! transaction; the caller owns it, so the write composes with anything else
//! in the same atomic unit.

use crate::entity::EntityId;
use crate::entity::PropertyValue;
use crate::error::PersistenceError;
use crate::error::Result;
use crate::store::StoreTransaction;
use sift_analysis::AnalysisLedger;
use sift_analysis::DiagnosticRecord;
use std::fs;
use uuid::Uuid;

pub const COMPILE_RESULT_ENTITY_TYPE: &str = "CompileResult";
pub const DIAGNOSTIC_ENTITY_TYPE: &str = "Diagnostic";
/// Link from a run to each of its diagnostics
pub const DIAGNOSTIC_LINK: &str = "diagnostic";

/// A record that can write itself onto a store entity
pub trait Persist {
    /// Identifier of this persisted instance
    fn store_id(&self) -> String;

    /// Logical type name the store groups records by
    fn entity_type(&self) -> &'static str;

    /// Write this record's properties onto `entity`, creating and linking
    /// child entities for owned sub-records.
    ///
    /// Call at most once per instance.
    fn persist<T: StoreTransaction + ?Sized>(&self, txn: &mut T, entity: EntityId) -> Result<()>;
}

impl Persist for DiagnosticRecord {
    /// Diagnostics have no identity of their own; every call yields a fresh id
    fn store_id(&self) -> String {
        Uuid::new_v4().to_string()
    }

    fn entity_type(&self) -> &'static str {
        DIAGNOSTIC_ENTITY_TYPE
    }

    fn persist<T: StoreTransaction + ?Sized>(&self, txn: &mut T, entity: EntityId) -> Result<()> {
        let path = canonical_path(self)?;
        write_diagnostic(txn, entity, self, path)
    }
}

impl Persist for AnalysisLedger {
    fn store_id(&self) -> String {
        self.run_id().to_string()
    }

    fn entity_type(&self) -> &'static str {
        COMPILE_RESULT_ENTITY_TYPE
    }

    fn persist<T: StoreTransaction + ?Sized>(&self, txn: &mut T, entity: EntityId) -> Result<()> {
        // Resolve every path before writing anything: one unresolvable
        // source aborts the whole ledger.
        let paths = self
            .diagnostics()
            .iter()
            .map(canonical_path)
            .collect::<Result<Vec<_>>>()?;

        txn.set_property(entity, "createdAt", self.created_at().timestamp().into())?;
        txn.set_property(entity, "result", self.is_success().into())?;
        txn.set_property(entity, "problems", self.diagnostics().len().into())?;
        txn.set_property(entity, "storeId", self.store_id().into())?;

        for (diagnostic, path) in self.diagnostics().iter().zip(paths) {
            let child = txn.new_entity(diagnostic.entity_type());
            write_diagnostic(txn, child, diagnostic, path)?;
            txn.add_link(entity, DIAGNOSTIC_LINK, child)?;
        }
        Ok(())
    }
}

fn canonical_path(diagnostic: &DiagnosticRecord) -> Result<Option<String>> {
    let Some(path) = diagnostic.path() else {
        return Ok(None);
    };
    let canonical = fs::canonicalize(path).map_err(|source| PersistenceError::CanonicalPath {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(canonical.to_string_lossy().into_owned()))
}

fn write_diagnostic<T: StoreTransaction + ?Sized>(
    txn: &mut T,
    entity: EntityId,
    diagnostic: &DiagnosticRecord,
    path: Option<String>,
) -> Result<()> {
    txn.set_property(entity, "kind", diagnostic.severity().as_str().into())?;
    txn.set_property(entity, "line", diagnostic.line().into())?;
    txn.set_property(entity, "column", diagnostic.column().into())?;
    txn.set_property(entity, "message", diagnostic.message().into())?;
    if let Some(path) = path {
        txn.set_property(entity, "path", PropertyValue::String(path))?;
    }
    if let Some(code) = diagnostic.code() {
        txn.set_property(entity, "code", code.into())?;
    }
    Ok(())
}
