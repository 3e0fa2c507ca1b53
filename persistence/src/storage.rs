//! On-disk snapshot of the entity table
//!
//! Layout: `SIFT` magic, little-endian `u16` format version, little-endian
//! `u64` payload length, then the Zstd-compressed MessagePack payload.

use crate::FORMAT_VERSION;
use crate::SIFT_MAGIC;
use crate::compression::CompressionLevel;
use crate::compression::Compressor;
use crate::entity::Entity;
use crate::entity::EntityId;
use crate::error::PersistenceError;
use crate::error::Result;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::fs::File;
use std::io::BufReader;
use std::io::BufWriter;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use tracing::debug;

/// Complete contents of a store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub(crate) struct StoreState {
    pub next_id: u64,
    pub entities: BTreeMap<EntityId, Entity>,
}

/// Snapshot file backing a persistent store
#[derive(Debug, Clone)]
pub(crate) struct SnapshotFile {
    path: PathBuf,
    compressor: Compressor,
}

impl SnapshotFile {
    /// Nothing is created on disk until the first [`SnapshotFile::save`]
    pub fn new(path: PathBuf, compression_level: CompressionLevel) -> Self {
        Self {
            path,
            compressor: Compressor::new(compression_level),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the snapshot; `None` when no snapshot was written yet
    pub fn load(&self) -> Result<Option<StoreState>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let file = File::open(&self.path)?;
        let mut reader = BufReader::new(file);

        // Validate magic bytes
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if magic != SIFT_MAGIC {
            return Err(PersistenceError::InvalidMagic);
        }

        // Validate version
        let mut version_bytes = [0u8; 2];
        reader.read_exact(&mut version_bytes)?;
        let version = u16::from_le_bytes(version_bytes);
        if version != FORMAT_VERSION {
            return Err(PersistenceError::UnsupportedVersion(
                version,
                FORMAT_VERSION,
            ));
        }

        let mut len_bytes = [0u8; 8];
        reader.read_exact(&mut len_bytes)?;
        let len = usize::try_from(u64::from_le_bytes(len_bytes))
            .map_err(|_| PersistenceError::CorruptData("payload too large".to_string()))?;

        let mut compressed = Vec::new();
        reader.read_to_end(&mut compressed)?;
        if compressed.len() != len {
            return Err(PersistenceError::CorruptData(format!(
                "expected {len} payload bytes, found {}",
                compressed.len()
            )));
        }

        let bytes = self.compressor.decompress(&compressed)?;
        let state: StoreState = rmp_serde::from_slice(&bytes)?;
        debug!(
            path = %self.path.display(),
            entities = state.entities.len(),
            "loaded store snapshot"
        );
        Ok(Some(state))
    }

    /// Write the snapshot through a temporary file and an atomic rename
    pub fn save(&self, state: &StoreState) -> Result<()> {
        let bytes = rmp_serde::to_vec(state)?;
        let compressed = self.compressor.compress(&bytes)?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let temp_path = self.path.with_extension("tmp");
        {
            let file = File::create(&temp_path)?;
            let mut writer = BufWriter::new(file);
            writer.write_all(SIFT_MAGIC)?;
            writer.write_all(&FORMAT_VERSION.to_le_bytes())?;
            writer.write_all(&(compressed.len() as u64).to_le_bytes())?;
            writer.write_all(&compressed)?;
            writer.flush()?;
        }
        fs::rename(&temp_path, &self.path)?;

        debug!(
            path = %self.path.display(),
            entities = state.entities.len(),
            ratio = Compressor::compression_ratio(bytes.len(), compressed.len()),
            "wrote store snapshot"
        );
        Ok(())
    }
}
