//! Application state for the web layer.

use std::sync::Arc;

use crate::domain::StationPair;
use crate::fares::{FareClient, FareError, FareQuery, FareRecord, FareSource, FileFareSource};
use crate::filter::{FilterDefaults, KeyValueStore};
use crate::geometry::{
    DirectoryGeometryStore, GeometryClient, GeometryError, GeometryResolver, GeometryStore,
    RouteGeometry,
};

/// The fare source chosen at startup.
#[derive(Clone)]
pub enum FareBackend {
    Http(FareClient),
    File(FileFareSource),
}

impl FareSource for FareBackend {
    async fn fetch(&self, query: &FareQuery) -> Result<Vec<FareRecord>, FareError> {
        match self {
            FareBackend::Http(client) => client.fetch(query).await,
            FareBackend::File(file) => file.fetch(query).await,
        }
    }
}

/// The geometry store chosen at startup.
#[derive(Debug, Clone)]
pub enum GeometryBackend {
    Http(GeometryClient),
    Directory(DirectoryGeometryStore),
    /// No geometry configured; every route is unknown.
    Disabled,
}

impl GeometryStore for GeometryBackend {
    async fn load(&self, key: StationPair) -> Result<Option<RouteGeometry>, GeometryError> {
        match self {
            GeometryBackend::Http(client) => client.load(key).await,
            GeometryBackend::Directory(dir) => dir.load(key).await,
            GeometryBackend::Disabled => Ok(None),
        }
    }
}

/// Shared application state.
///
/// Contains all the services needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// Where fare rows come from
    pub fares: Arc<FareBackend>,

    /// Session-cached route geometry
    pub geometry: Arc<GeometryResolver<GeometryBackend>>,

    /// Saved filter states
    pub filters: Arc<dyn KeyValueStore + Send + Sync>,

    /// Filter values applied before the user touches anything
    pub defaults: FilterDefaults,
}

impl AppState {
    /// Create a new app state.
    pub fn new(
        fares: FareBackend,
        geometry: GeometryBackend,
        filters: impl KeyValueStore + Send + Sync + 'static,
        defaults: FilterDefaults,
    ) -> Self {
        Self {
            fares: Arc::new(fares),
            geometry: Arc::new(GeometryResolver::new(geometry)),
            filters: Arc::new(filters),
            defaults,
        }
    }
}
