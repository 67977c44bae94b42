//! Static dataset access.
//!
//! The dataset is a read-only tree of pre-aggregated JSON documents:
//! - `<mode>/<map>/trophies/brawler-<tier>-trophies.json`
//! - `<mode>/<map>/ranked/brawler-<tier>-rank.json`
//! - `<mode>/<map>/trophies/team-<tier>-trophies.json`

mod dataset;
mod listing;

pub use dataset::*;
pub use listing::*;

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading the dataset.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    #[error("Remote dataset error: {0}")]
    Remote(String),
}

impl StorageError {
    /// Whether the error means "this document does not exist" rather than
    /// "it exists but could not be read".
    pub fn is_not_found(&self) -> bool {
        match self {
            StorageError::PathNotFound(_) | StorageError::DocumentNotFound(_) => true,
            StorageError::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        }
    }
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    /// Folder holding one mode's maps.
    pub fn mode_dir(&self, mode: crate::models::GameMode) -> PathBuf {
        self.data_dir.join(mode.folder())
    }

    /// Absolute location of a dataset document.
    pub fn document_path(&self, key: &DatasetKey) -> PathBuf {
        self.data_dir.join(key.relative_path())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Bucket, GameMode, RankTier};

    #[test]
    fn test_storage_config_paths() {
        let config = StorageConfig::new(PathBuf::from("/data"));

        assert_eq!(
            config.mode_dir(GameMode::GemGrab),
            PathBuf::from("/data/gemgrab")
        );

        let key = DatasetKey::brawlers(
            GameMode::Heist,
            "safe_zone",
            Bucket::Ranked(RankTier::R13),
        )
        .unwrap();
        assert_eq!(
            config.document_path(&key),
            PathBuf::from("/data/heist/safe_zone/ranked/brawler-13-rank.json")
        );
    }

    #[test]
    fn test_storage_config_default() {
        let config = StorageConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("./data"));
    }

    #[test]
    fn test_is_not_found() {
        assert!(StorageError::PathNotFound(PathBuf::from("x")).is_not_found());
        assert!(StorageError::DocumentNotFound("x".into()).is_not_found());
        assert!(StorageError::Io(std::io::Error::from(std::io::ErrorKind::NotFound)).is_not_found());
        assert!(!StorageError::Remote("boom".into()).is_not_found());
    }
}
