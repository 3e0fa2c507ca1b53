//! Compression utilities using Zstd

use crate::error::PersistenceError;
use crate::error::Result;
use serde::Deserialize;
use std::io::Read;
use std::io::Write;

/// Compression level for Zstd
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "LevelRepr")]
pub enum CompressionLevel {
    /// Fast compression (level 1)
    Fast,
    /// Balanced compression (level 3)
    #[default]
    Balanced,
    /// Maximum compression (level 9)
    Maximum,
    /// Custom level (1-22)
    Custom(i32),
}

impl CompressionLevel {
    /// Convert to Zstd compression level
    pub fn to_level(self) -> i32 {
        match self {
            Self::Fast => 1,
            Self::Balanced => 3,
            Self::Maximum => 9,
            Self::Custom(level) => level.clamp(1, 22),
        }
    }
}

/// Config spelling: a level name or a number
#[derive(Deserialize)]
#[serde(untagged)]
enum LevelRepr {
    Named(String),
    Numeric(i32),
}

impl TryFrom<LevelRepr> for CompressionLevel {
    type Error = String;

    fn try_from(repr: LevelRepr) -> std::result::Result<Self, Self::Error> {
        match repr {
            LevelRepr::Numeric(level) => Ok(Self::Custom(level)),
            LevelRepr::Named(name) => match name.to_ascii_lowercase().as_str() {
                "fast" => Ok(Self::Fast),
                "balanced" => Ok(Self::Balanced),
                "maximum" | "max" => Ok(Self::Maximum),
                other => Err(format!("unknown compression level `{other}`")),
            },
        }
    }
}

/// Zstd compressor for store snapshots
#[derive(Debug, Clone)]
pub struct Compressor {
    level: CompressionLevel,
}

impl Compressor {
    /// Create a new compressor with the specified level
    pub const fn new(level: CompressionLevel) -> Self {
        Self { level }
    }

    /// Compress data using Zstd
    pub fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        let mut encoder = zstd::Encoder::new(Vec::new(), self.level.to_level())
            .map_err(|e| PersistenceError::Compression(e.to_string()))?;

        encoder
            .write_all(data)
            .map_err(|e| PersistenceError::Compression(e.to_string()))?;

        encoder
            .finish()
            .map_err(|e| PersistenceError::Compression(e.to_string()))
    }

    /// Decompress data using Zstd
    pub fn decompress(&self, compressed: &[u8]) -> Result<Vec<u8>> {
        let mut decoder = zstd::Decoder::new(compressed)
            .map_err(|e| PersistenceError::Compression(e.to_string()))?;

        let mut decompressed = Vec::new();
        decoder
            .read_to_end(&mut decompressed)
            .map_err(|e| PersistenceError::Compression(e.to_string()))?;

        Ok(decompressed)
    }

    /// Calculate compression ratio
    pub fn compression_ratio(original_size: usize, compressed_size: usize) -> f32 {
        if original_size == 0 {
            return 0.0;
        }
        1.0 - (compressed_size as f32 / original_size as f32)
    }
}
