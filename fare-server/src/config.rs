//! Server configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Default listen address.
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// Where fares, geometries and saved filters come from.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Address to listen on.
    pub bind_addr: SocketAddr,

    /// Fare query service base URL. Takes precedence over `fare_data_file`.
    pub fare_api_url: Option<String>,

    /// API key for the fare query service.
    pub fare_api_key: Option<String>,

    /// Local JSON file of fare records, used when no API URL is set.
    pub fare_data_file: Option<PathBuf>,

    /// Geometry document base URL. Takes precedence over `geometry_dir`.
    pub geometry_url: Option<String>,

    /// Local directory of geometry documents.
    pub geometry_dir: Option<PathBuf>,

    /// JSON file for saved filter states; kept in memory when unset.
    pub filter_store_path: Option<PathBuf>,
}

/// A configuration value that could not be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {name}: {value:?}")]
pub struct ConfigError {
    name: &'static str,
    value: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            fare_api_url: None,
            fare_api_key: None,
            fare_data_file: None,
            geometry_url: None,
            geometry_dir: None,
            filter_store_path: None,
        }
    }
}

impl ServerConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from any variable lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let bind = var("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind.trim().parse().map_err(|_| ConfigError {
            name: "BIND_ADDR",
            value: bind.clone(),
        })?;

        Ok(Self {
            bind_addr,
            fare_api_url: var("FARE_API_URL"),
            fare_api_key: var("FARE_API_KEY"),
            fare_data_file: var("FARE_DATA_FILE").map(PathBuf::from),
            geometry_url: var("GEOMETRY_URL"),
            geometry_dir: var("GEOMETRY_DIR").map(PathBuf::from),
            filter_store_path: var("FILTER_STORE_PATH").map(PathBuf::from),
        })
    }

    pub fn with_bind_addr(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    pub fn with_fare_api(mut self, url: impl Into<String>, key: Option<String>) -> Self {
        self.fare_api_url = Some(url.into());
        self.fare_api_key = key;
        self
    }

    pub fn with_fare_data_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.fare_data_file = Some(path.into());
        self
    }

    pub fn with_geometry_url(mut self, url: impl Into<String>) -> Self {
        self.geometry_url = Some(url.into());
        self
    }

    pub fn with_geometry_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.geometry_dir = Some(dir.into());
        self
    }

    pub fn with_filter_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.filter_store_path = Some(path.into());
        self
    }
}
