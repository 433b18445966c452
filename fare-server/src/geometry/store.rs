//! Geometry stores: where route paths are loaded from.

use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;

use crate::domain::StationPair;

use super::error::GeometryError;
use super::types::{GeometryDocument, RouteGeometry};

/// Default maximum concurrent geometry requests.
const DEFAULT_MAX_CONCURRENT: usize = 8;

/// Trait for loading stored route geometry.
///
/// This abstraction allows the resolver to be tested without I/O.
pub trait GeometryStore: Send + Sync {
    /// Load the geometry stored under exactly `key`.
    ///
    /// Returns `Ok(None)` when nothing is stored for that direction.
    fn load(
        &self,
        key: StationPair,
    ) -> impl Future<Output = Result<Option<RouteGeometry>, GeometryError>> + Send;
}

/// Geometry store reading `{departure}-{arrival}.json` files from a directory.
#[derive(Debug, Clone)]
pub struct DirectoryGeometryStore {
    dir: PathBuf,
}

impl DirectoryGeometryStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: StationPair) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl GeometryStore for DirectoryGeometryStore {
    async fn load(&self, key: StationPair) -> Result<Option<RouteGeometry>, GeometryError> {
        let path = self.path_for(key);
        let json = match tokio::fs::read_to_string(&path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(GeometryError::Io(format!(
                    "failed to read {}: {e}",
                    path.display()
                )));
            }
        };

        let doc: GeometryDocument = serde_json::from_str(&json)
            .map_err(|e| GeometryError::Json(format!("{}: {e}", path.display())))?;
        Ok(Some(doc.into_geometry(key)))
    }
}

/// Configuration for the geometry HTTP client.
#[derive(Debug, Clone)]
pub struct GeometryClientConfig {
    /// Base URL documents are served under
    pub base_url: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl GeometryClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 15,
        }
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// Geometry store fetching `GET {base}/{departure}-{arrival}.json`.
#[derive(Debug, Clone)]
pub struct GeometryClient {
    http: reqwest::Client,
    base_url: String,
    semaphore: Arc<Semaphore>,
}

impl GeometryClient {
    pub fn new(config: GeometryClientConfig) -> Result<Self, GeometryError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            semaphore: Arc::new(Semaphore::new(config.max_concurrent)),
        })
    }

    fn url_for(&self, key: StationPair) -> String {
        format!("{}/{key}.json", self.base_url)
    }
}

impl GeometryStore for GeometryClient {
    async fn load(&self, key: StationPair) -> Result<Option<RouteGeometry>, GeometryError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| GeometryError::Http("Semaphore closed".to_string()))?;

        let response = self.http.get(self.url_for(key)).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GeometryError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        let doc: GeometryDocument =
            serde_json::from_str(&body).map_err(|e| GeometryError::Json(e.to_string()))?;
        Ok(Some(doc.into_geometry(key)))
    }
}
