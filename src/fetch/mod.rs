//! HTTP dataset source.
//!
//! Reads dataset documents from a static file host (CDN, object store, the
//! front end's own `/data` folder). The path layout is the same as on disk.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use reqwest::Client;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::storage::{DatasetKey, DatasetSource, StorageError};

/// Errors that can occur during fetching.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Not found: {0}")]
    NotFound(Url),

    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },
}

impl From<FetchError> for StorageError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::NotFound(url) => StorageError::DocumentNotFound(url.to_string()),
            other => StorageError::Remote(other.to_string()),
        }
    }
}

/// Configuration for the HTTP source.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Root URL of the dataset, e.g. `https://cdn.example.com/data/`
    pub base_url: Url,

    /// Request timeout
    pub timeout: Duration,

    /// User agent string
    pub user_agent: String,
}

impl FetcherConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(10),
            user_agent: format!("brawlpick/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Dataset source backed by a static HTTP host.
pub struct HttpDatasetSource {
    client: Client,
    config: FetcherConfig,
}

impl HttpDatasetSource {
    pub fn new(config: FetcherConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .unwrap_or_else(|_| HeaderValue::from_static("brawlpick")),
        );

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { client, config })
    }

    /// Build the document URL, percent-encoding each path segment.
    pub fn url_for(&self, key: &DatasetKey) -> Result<Url, FetchError> {
        document_url(&self.config.base_url, key)
    }

    async fn get(&self, url: Url) -> Result<Vec<u8>, FetchError> {
        debug!("Fetching {}", url);
        let response = self.client.get(url.as_str()).send().await?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(url));
        }
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}

#[async_trait]
impl DatasetSource for HttpDatasetSource {
    fn describe(&self) -> String {
        format!("http:{}", self.config.base_url)
    }

    async fn fetch(&self, key: &DatasetKey) -> Result<Vec<u8>, StorageError> {
        let url = self.url_for(key)?;
        Ok(self.get(url).await?)
    }
}

fn document_url(base: &Url, key: &DatasetKey) -> Result<Url, FetchError> {
    let mut url = base.clone();
    {
        let mut segments = url
            .path_segments_mut()
            .map_err(|_| FetchError::InvalidUrl(base.to_string()))?;
        segments.pop_if_empty();
        for segment in key.relative_path().split('/') {
            segments.push(segment);
        }
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Bucket, GameMode};

    fn key(map: &str) -> DatasetKey {
        DatasetKey::brawlers(GameMode::KnockOut, map, Bucket::BASELINE).unwrap()
    }

    #[test]
    fn test_document_url() {
        let base = Url::parse("https://cdn.example.com/data/").unwrap();
        let url = document_url(&base, &key("belles_rock")).unwrap();
        assert_eq!(
            url.as_str(),
            "https://cdn.example.com/data/knockout/belles_rock/trophies/brawler-700-trophies.json"
        );
    }

    #[test]
    fn test_document_url_without_trailing_slash() {
        let base = Url::parse("https://cdn.example.com/data").unwrap();
        let url = document_url(&base, &key("belles_rock")).unwrap();
        assert!(url.as_str().starts_with("https://cdn.example.com/data/knockout/"));
    }

    #[test]
    fn test_document_url_encodes_spaces() {
        let base = Url::parse("https://cdn.example.com/").unwrap();
        let url = document_url(&base, &key("Goldarm Gulch")).unwrap();
        assert!(url.as_str().contains("/Goldarm%20Gulch/"));
    }

    #[test]
    fn test_document_url_rejects_cannot_be_base() {
        let base = Url::parse("mailto:someone@example.com").unwrap();
        assert!(matches!(
            document_url(&base, &key("x")),
            Err(FetchError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_not_found_maps_to_storage_not_found() {
        let url = Url::parse("https://cdn.example.com/x.json").unwrap();
        let err: StorageError = FetchError::NotFound(url).into();
        assert!(err.is_not_found());

        let err: StorageError = FetchError::HttpStatus {
            status: 500,
            message: "Internal Server Error".into(),
        }
        .into();
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_describe() {
        let config = FetcherConfig::new(Url::parse("https://cdn.example.com/data/").unwrap());
        let source = HttpDatasetSource::new(config).unwrap();
        assert_eq!(source.describe(), "http:https://cdn.example.com/data/");
    }
}
