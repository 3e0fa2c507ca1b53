//! Store configuration

use crate::compression::CompressionLevel;
use crate::error::Result;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use tracing::debug;

/// Configuration for the analysis history store
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Snapshot file (defaults to ~/.sift/history/analysis.store)
    pub path: PathBuf,
    /// Compression level (defaults to Balanced)
    pub compression_level: CompressionLevel,
    /// Maximum number of analysis runs kept (defaults to 100, 0 keeps all)
    pub max_runs: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        let base = dirs::home_dir()
            .map(|p| p.join(".sift/history"))
            .unwrap_or_else(|| PathBuf::from(".sift/history"));

        Self {
            path: base.join("analysis.store"),
            compression_level: CompressionLevel::Balanced,
            max_runs: 100,
        }
    }
}

impl StoreConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load from a TOML file; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "no store config, using defaults");
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PersistenceError;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = StoreConfig::default();
        assert!(config.path.ends_with(".sift/history/analysis.store"));
        assert_eq!(config.compression_level, CompressionLevel::Balanced);
        assert_eq!(config.max_runs, 100);
    }

    #[test]
    fn test_parse_partial_config() {
        let config = StoreConfig::from_toml_str(
            r#"
path = "/var/lib/sift/runs.store"
compression_level = "maximum"
"#,
        )
        .unwrap();
        assert_eq!(config.path, PathBuf::from("/var/lib/sift/runs.store"));
        assert_eq!(config.compression_level, CompressionLevel::Maximum);
        assert_eq!(config.max_runs, 100);

        let numeric = StoreConfig::from_toml_str("compression_level = 12\nmax_runs = 0").unwrap();
        assert_eq!(numeric.compression_level, CompressionLevel::Custom(12));
        assert_eq!(numeric.max_runs, 0);
    }

    #[test]
    fn test_bad_level_is_a_config_error() {
        let err = StoreConfig::from_toml_str("compression_level = \"ultra\"").unwrap_err();
        assert!(matches!(err, PersistenceError::Config(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempdir().unwrap();
        let config = StoreConfig::load(&dir.path().join("sift.toml")).unwrap();
        assert_eq!(config, StoreConfig::default());

        let path = dir.path().join("sift.toml");
        fs::write(&path, "max_runs = 5").unwrap();
        assert_eq!(StoreConfig::load(&path).unwrap().max_runs, 5);
    }
}
