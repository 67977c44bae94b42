use std::sync::Arc;

use crate::calculate::ScanOptions;
use crate::config::{AppConfig, ConfigError};
use crate::fetch::{FetcherConfig, HttpDatasetSource};
use crate::models::MinGames;
use crate::storage::{DatasetAccessor, FsMapLister, MapLister, StaticMapLister, StorageConfig};

/// Presentation policy shared by the handlers.
#[derive(Debug, Clone)]
pub struct ViewSettings {
    pub min_total_games: u64,
    pub default_min_games: MinGames,
    pub scan: ScanOptions,
    pub cors_origin: String,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            min_total_games: 0,
            default_min_games: MinGames::default(),
            scan: ScanOptions::default(),
            cors_origin: "*".to_string(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub accessor: DatasetAccessor,
    pub lister: Arc<dyn MapLister>,
    pub settings: Arc<ViewSettings>,
    /// Local dataset root; `None` when documents come from a remote host.
    pub storage: Option<Arc<StorageConfig>>,
}

impl AppState {
    /// Wire sources and settings from configuration. A configured
    /// `dataset.base_url` switches to the HTTP source and the static map table.
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let settings = ViewSettings {
            min_total_games: config.listing.min_total_games,
            default_min_games: config.default_min_games()?,
            scan: ScanOptions {
                per_map_timeout: config.scan_timeout(),
            },
            cors_origin: config.server.cors_origin.clone(),
        };

        let state = match config.dataset.remote_url()? {
            Some(base_url) => {
                let mut fetcher = FetcherConfig::new(base_url);
                fetcher.timeout = config.dataset.timeout();
                let source = HttpDatasetSource::new(fetcher)
                    .map_err(|e| ConfigError::ValidationError(e.to_string()))?;
                Self {
                    accessor: DatasetAccessor::new(Arc::new(source)),
                    lister: Arc::new(StaticMapLister::new(config.listing.maps.clone())),
                    settings: Arc::new(settings),
                    storage: None,
                }
            }
            None => {
                let storage = StorageConfig::new(config.data_dir.clone());
                Self {
                    accessor: DatasetAccessor::local(storage.clone()),
                    lister: Arc::new(FsMapLister::new(storage.clone())),
                    settings: Arc::new(settings),
                    storage: Some(Arc::new(storage)),
                }
            }
        };

        Ok(state)
    }
}
