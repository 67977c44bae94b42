//! Dataset document resolution and loading.
//!
//! A [`DatasetKey`] names exactly one document. Sources fetch the raw bytes;
//! the [`DatasetAccessor`] parses them and degrades any failure to an empty
//! record list, so callers never have to treat "no data" as an error.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::{StorageConfig, StorageError};
use crate::models::{
    validate_map_id, Bucket, CharacterStatRecord, GameMode, SelectionError, TeamStatRecord,
};

/// What a document holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Brawler,
    Team,
}

impl RecordKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            RecordKind::Brawler => "brawler",
            RecordKind::Team => "team",
        }
    }
}

/// Identifies one dataset document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DatasetKey {
    pub mode: GameMode,
    pub map: String,
    pub bucket: Bucket,
    pub kind: RecordKind,
}

impl DatasetKey {
    /// Key for a per-brawler document.
    pub fn brawlers(mode: GameMode, map: &str, bucket: Bucket) -> Result<Self, SelectionError> {
        validate_map_id(map)?;
        Ok(Self {
            mode,
            map: map.to_string(),
            bucket,
            kind: RecordKind::Brawler,
        })
    }

    /// Key for a team document. Teams are only published per trophy bucket.
    pub fn teams(mode: GameMode, map: &str, bucket: Bucket) -> Result<Self, SelectionError> {
        validate_map_id(map)?;
        if !matches!(bucket, Bucket::Trophies(_)) {
            return Err(SelectionError::TeamRequiresTrophies);
        }
        Ok(Self {
            mode,
            map: map.to_string(),
            bucket,
            kind: RecordKind::Team,
        })
    }

    /// Path relative to the dataset root, always `/`-separated.
    pub fn relative_path(&self) -> String {
        format!(
            "{}/{}/{}/{}-{}-{}.json",
            self.mode.folder(),
            self.map,
            self.bucket.dir_name(),
            self.kind.prefix(),
            self.bucket.tier_value(),
            self.bucket.suffix()
        )
    }
}

impl std::fmt::Display for DatasetKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.relative_path())
    }
}

/// Somewhere dataset documents can be read from.
#[async_trait]
pub trait DatasetSource: Send + Sync {
    /// Short description for logs and the status endpoint.
    fn describe(&self) -> String;

    /// Fetch the raw bytes of one document.
    async fn fetch(&self, key: &DatasetKey) -> Result<Vec<u8>, StorageError>;
}

/// Reads documents from a local directory tree.
#[derive(Debug, Clone)]
pub struct LocalDatasetSource {
    config: StorageConfig,
}

impl LocalDatasetSource {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl DatasetSource for LocalDatasetSource {
    fn describe(&self) -> String {
        format!("local:{}", self.config.data_dir.display())
    }

    async fn fetch(&self, key: &DatasetKey) -> Result<Vec<u8>, StorageError> {
        let path = self.config.document_path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::PathNotFound(path))
            }
            Err(e) => Err(StorageError::Io(e)),
        }
    }
}

/// Outcome of a load, kept alongside the (possibly empty) records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadStatus {
    Loaded,
    Missing,
    Unreadable,
}

/// Records from one document. Failures leave `records` empty.
#[derive(Debug, Clone)]
pub struct DatasetLoad<T> {
    pub records: Vec<T>,
    pub status: LoadStatus,
}

impl<T> DatasetLoad<T> {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn degraded(status: LoadStatus) -> Self {
        Self {
            records: Vec::new(),
            status,
        }
    }
}

/// Loads and parses dataset documents from a [`DatasetSource`].
#[derive(Clone)]
pub struct DatasetAccessor {
    source: Arc<dyn DatasetSource>,
}

impl DatasetAccessor {
    pub fn new(source: Arc<dyn DatasetSource>) -> Self {
        Self { source }
    }

    /// Accessor over a local directory.
    pub fn local(config: StorageConfig) -> Self {
        Self::new(Arc::new(LocalDatasetSource::new(config)))
    }

    pub fn describe(&self) -> String {
        self.source.describe()
    }

    pub async fn load_brawlers(&self, key: &DatasetKey) -> DatasetLoad<CharacterStatRecord> {
        debug_assert_eq!(key.kind, RecordKind::Brawler);
        self.load(key).await
    }

    pub async fn load_teams(&self, key: &DatasetKey) -> DatasetLoad<TeamStatRecord> {
        debug_assert_eq!(key.kind, RecordKind::Team);
        self.load(key).await
    }

    /// Fetch and parse one document. Exactly one read, no retries.
    pub async fn load<T: DeserializeOwned>(&self, key: &DatasetKey) -> DatasetLoad<T> {
        let bytes = match self.source.fetch(key).await {
            Ok(bytes) => bytes,
            Err(e) if e.is_not_found() => {
                debug!("No dataset at {}", key);
                return DatasetLoad::degraded(LoadStatus::Missing);
            }
            Err(e) => {
                warn!("Failed to read dataset {}: {}", key, e);
                return DatasetLoad::degraded(LoadStatus::Unreadable);
            }
        };

        match serde_json::from_slice::<Vec<T>>(&bytes) {
            Ok(records) => {
                debug!("Loaded {} records from {}", records.len(), key);
                DatasetLoad {
                    records,
                    status: LoadStatus::Loaded,
                }
            }
            Err(e) => {
                warn!("Failed to parse dataset {}: {}", key, e);
                DatasetLoad::degraded(LoadStatus::Unreadable)
            }
        }
    }
}
