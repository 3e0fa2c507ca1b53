//! Error types for persistence operations

use crate::entity::EntityId;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PersistenceError>;

#[derive(Error, Debug)]
pub enum PersistenceError {
    /// I/O errors during file operations
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A diagnostic's source file could not be resolved to a canonical path
    #[error("Failed to resolve canonical path for {path:?}: {source}")]
    CanonicalPath {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// MessagePack serialization errors
    #[error("MessagePack serialization error: {0}")]
    MessagePack(#[from] rmp_serde::encode::Error),

    /// MessagePack deserialization errors
    #[error("MessagePack deserialization error: {0}")]
    MessagePackDecode(#[from] rmp_serde::decode::Error),

    /// Compression errors
    #[error("Compression error: {0}")]
    Compression(String),

    /// Invalid magic bytes in file header
    #[error("Invalid file format: expected SIFT magic bytes")]
    InvalidMagic,

    /// Unsupported format version
    #[error("Unsupported format version: {0} (expected {1})")]
    UnsupportedVersion(u16, u16),

    /// Corrupt snapshot data
    #[error("Corrupt store data: {0}")]
    CorruptData(String),

    /// Entity does not exist in the store or the transaction
    #[error("Entity not found: {0}")]
    EntityNotFound(EntityId),

    /// Another transaction changed the entity since it was read
    #[error("Concurrent modification of entity {0}")]
    Conflict(EntityId),

    /// A stored entity is missing properties its record type requires
    #[error("Invalid {entity_type} record {id}: {reason}")]
    InvalidRecord {
        entity_type: String,
        id: EntityId,
        reason: String,
    },

    /// Lock acquisition failed
    #[error("Failed to acquire lock: {0}")]
    LockPoisoned(String),

    /// Configuration file could not be parsed
    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),
}
