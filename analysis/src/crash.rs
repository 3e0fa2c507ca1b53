//! Turning internal analysis failures into diagnostics
//!
//! Analysis of malformed input can fail deep inside the engine where no
//! per-file diagnostic channel exists. [`synthesize`] turns such a failure
//! into an ordinary ERROR record so it surfaces in the run's ledger.

use crate::diagnostic::DiagnosticRecord;
use crate::diagnostic::Severity;
use serde::Deserialize;
use serde::Serialize;

/// One frame of a failure's call stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackFrame {
    pub file_name: String,
    pub line: u32,
    pub routine: String,
}

impl StackFrame {
    pub fn new(file_name: impl Into<String>, line: u32, routine: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            line,
            routine: routine.into(),
        }
    }
}

/// An unexpected failure raised while analyzing
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Failure {
    pub message: Option<String>,
    /// Most specific frame first
    pub frames: Vec<StackFrame>,
}

impl Failure {
    pub fn new(message: impl Into<String>, frames: Vec<StackFrame>) -> Self {
        Self {
            message: Some(message.into()),
            frames,
        }
    }

    pub fn diagnostic(&self) -> Option<DiagnosticRecord> {
        synthesize(Some(self))
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message.as_deref().unwrap_or("analysis failure"))?;
        if let Some(frame) = self.frames.first() {
            write!(f, " at {}({}:{})", frame.routine, frame.file_name, frame.line)?;
        }
        Ok(())
    }
}

/// Build an ERROR diagnostic from the failure's most specific frame.
///
/// Returns `None` when there is no failure or its stack is empty; the caller
/// then has no location to report and should log the failure itself.
pub fn synthesize(failure: Option<&Failure>) -> Option<DiagnosticRecord> {
    let failure = failure?;
    let frame = failure.frames.first()?;

    let record = DiagnosticRecord::new(
        Severity::Error,
        failure.message.clone().unwrap_or_default(),
    )
    .with_synthetic_source(frame.file_name.clone())
    .at(frame.line, 0)
    .with_code(frame.routine.clone());

    Some(record)
}
