//! Service configuration
//!
//! Resolves where finished print sheets are written.

use crate::types::*;
use std::path::{Path, PathBuf};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Environment variable overriding the data directory
pub const DATA_DIR_ENV: &str = "SCRYFALL_DATA_DIR";

/// Directory name for print output under the data directory
pub const PRINTS_SUBDIR: &str = "scryfall_prints";

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ServiceConfig {
    /// Directory receiving generated print sheets
    pub output_dir: PathBuf,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl ServiceConfig {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// Build the configuration from the environment.
    ///
    /// `SCRYFALL_DATA_DIR` wins when set, then the user cache directory,
    /// then the system temp directory.
    pub fn from_env() -> Self {
        let data_dir = std::env::var_os(DATA_DIR_ENV).map(PathBuf::from);
        Self::new(resolve_output_dir(data_dir.as_deref()))
    }

    /// Load configuration from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let config = serde_json::from_slice(&bytes)
            .map_err(|e| PrintError::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Save configuration to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| PrintError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }
}

fn resolve_output_dir(data_dir: Option<&Path>) -> PathBuf {
    if let Some(dir) = data_dir {
        return dir.join(PRINTS_SUBDIR);
    }
    match dirs::cache_dir() {
        Some(cache) => cache.join("scryfall_mcp").join(PRINTS_SUBDIR),
        None => std::env::temp_dir()
            .join("scryfall_downloads")
            .join(PRINTS_SUBDIR),
    }
}
