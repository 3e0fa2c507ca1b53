//! Analysis results and symbol identity for sift
//!
//! This crate holds the data side of an incremental source-analysis server:
//! the per-run [`AnalysisLedger`], normalized [`DiagnosticRecord`]s, the
//! crash-to-diagnostic [`synthesize`] step, and the [`Symbol`] identity model
//! consumed by completion and indexing.

pub mod crash;
pub mod descriptor;
pub mod diagnostic;
pub mod guard;
pub mod index;
pub mod ledger;
pub mod report;
pub mod source;
pub mod symbol;
pub mod types;

pub use crash::Failure;
pub use crash::StackFrame;
pub use crash::synthesize;
pub use descriptor::CandidateKind;
pub use descriptor::CandidateUnit;
pub use descriptor::FieldDescriptor;
pub use diagnostic::DiagnosticRecord;
pub use diagnostic::DiagnosticSource;
pub use diagnostic::NativeDiagnostic;
pub use diagnostic::Severity;
pub use guard::catch_failure;
pub use index::SymbolIndex;
pub use ledger::AnalysisLedger;
pub use ledger::NOT_COMPILED;
pub use ledger::Sources;
pub use report::Channel;
pub use report::CollectingSink;
pub use report::DiagnosticSink;
pub use report::TracingSink;
pub use source::FileSymbols;
pub use source::SymbolSource;
pub use symbol::Occurrence;
pub use symbol::Symbol;
pub use types::Position;
pub use types::TextRange;
