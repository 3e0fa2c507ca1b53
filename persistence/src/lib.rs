//! Analysis history persistence for sift
//!
//! This crate provides the transactional entity store the analysis server
//! records its runs into, the [`Persist`] writers for ledgers and
//! diagnostics, and a query layer over past runs.

pub mod compression;
pub mod config;
pub mod entity;
pub mod error;
pub mod history;
pub mod records;
mod storage;
pub mod store;

#[cfg(test)]
mod tests;

pub use compression::CompressionLevel;
pub use compression::Compressor;
pub use config::StoreConfig;
pub use entity::Entity;
pub use entity::EntityId;
pub use entity::PropertyValue;
pub use error::PersistenceError;
pub use error::Result;
pub use history::AnalysisHistory;
pub use history::RunSummary;
pub use history::StoredDiagnostic;
pub use records::COMPILE_RESULT_ENTITY_TYPE;
pub use records::DIAGNOSTIC_ENTITY_TYPE;
pub use records::DIAGNOSTIC_LINK;
pub use records::Persist;
pub use store::EntityStore;
pub use store::StoreTransaction;
pub use store::Transaction;

/// Magic bytes at the start of a store snapshot
pub const SIFT_MAGIC: &[u8] = b"SIFT";

/// Current snapshot format version
pub const FORMAT_VERSION: u16 = 1;
