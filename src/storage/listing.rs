//! Map enumeration.
//!
//! The scanner only needs to know which maps exist for a mode, so listing
//! sits behind [`MapLister`]. The filesystem implementation globs the data
//! directory; the static implementation serves a fixed table (used when the
//! dataset lives on a remote host that cannot be listed).

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::{StorageConfig, StorageError};
use crate::models::{validate_map_id, GameMode};

/// Capability to enumerate the maps that have data for a mode.
#[async_trait]
pub trait MapLister: Send + Sync {
    /// Map identifiers, sorted and de-duplicated.
    async fn list_maps(&self, mode: GameMode) -> Result<Vec<String>, StorageError>;
}

/// Lists maps from the local dataset tree.
#[derive(Debug, Clone)]
pub struct FsMapLister {
    config: StorageConfig,
}

impl FsMapLister {
    pub fn new(config: StorageConfig) -> Self {
        Self { config }
    }

    fn scan(&self, mode: GameMode) -> Result<Vec<String>, StorageError> {
        let mode_dir = self.config.mode_dir(mode);
        if !mode_dir.is_dir() {
            debug!("No data directory for mode {}", mode);
            return Ok(Vec::new());
        }

        // <mode>/<map>/<bucket-kind>/<document>.json
        let pattern = format!("{}/*/*/*.json", escaped(&mode_dir)?);
        let mut maps = BTreeSet::new();
        for entry in glob::glob(&pattern)? {
            match entry {
                Ok(path) => match map_name_of(&path) {
                    Some(map) if validate_map_id(&map).is_ok() => {
                        maps.insert(map);
                    }
                    Some(map) => debug!("Skipping unusable map directory {:?}", map),
                    None => {}
                },
                Err(e) => warn!("Skipping unreadable dataset entry: {}", e),
            }
        }

        Ok(maps.into_iter().collect())
    }
}

#[async_trait]
impl MapLister for FsMapLister {
    async fn list_maps(&self, mode: GameMode) -> Result<Vec<String>, StorageError> {
        let lister = self.clone();
        tokio::task::spawn_blocking(move || lister.scan(mode))
            .await
            .map_err(|e| StorageError::InvalidPath(format!("listing task failed: {}", e)))?
    }
}

/// Lists maps from a fixed table keyed by mode folder name.
#[derive(Debug, Clone, Default)]
pub struct StaticMapLister {
    maps: HashMap<String, Vec<String>>,
}

impl StaticMapLister {
    pub fn new(maps: HashMap<String, Vec<String>>) -> Self {
        Self { maps }
    }

    pub fn with_mode(mut self, mode: GameMode, maps: &[&str]) -> Self {
        self.maps.insert(
            mode.folder().to_string(),
            maps.iter().map(|m| m.to_string()).collect(),
        );
        self
    }
}

#[async_trait]
impl MapLister for StaticMapLister {
    async fn list_maps(&self, mode: GameMode) -> Result<Vec<String>, StorageError> {
        let maps: BTreeSet<String> = self
            .maps
            .get(mode.folder())
            .map(|m| m.iter().cloned().collect())
            .unwrap_or_default();
        Ok(maps.into_iter().collect())
    }
}

/// Modification time of the newest dataset document, if any.
pub fn last_updated(config: &StorageConfig) -> Result<Option<DateTime<Utc>>, StorageError> {
    if !config.data_dir.is_dir() {
        return Ok(None);
    }

    let pattern = format!("{}/*/*/*/*.json", escaped(&config.data_dir)?);
    let newest = glob::glob(&pattern)?
        .filter_map(Result::ok)
        .filter_map(|path| std::fs::metadata(path).and_then(|m| m.modified()).ok())
        .max();

    Ok(newest.map(DateTime::<Utc>::from))
}

fn escaped(dir: &Path) -> Result<String, StorageError> {
    dir.to_str()
        .map(glob::Pattern::escape)
        .ok_or_else(|| StorageError::InvalidPath(dir.display().to_string()))
}

/// `<mode>/<map>/<bucket>/<file>` → `<map>`.
fn map_name_of(path: &Path) -> Option<String> {
    let map_dir: PathBuf = path.parent()?.parent()?.to_path_buf();
    map_dir.file_name()?.to_str().map(str::to_string)
}
