//! Session-cached geometry resolution.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use moka::future::Cache as MokaCache;

use crate::domain::{StationId, StationPair};

use super::error::GeometryError;
use super::store::GeometryStore;
use super::types::RouteGeometry;

/// Why a cache fill produced no value. Not-found is not cached, so a
/// later request for the same key tries the store again.
#[derive(Debug)]
enum LoadError {
    NotFound,
    Store(GeometryError),
}

/// Resolves route geometries through a session cache in front of a store.
///
/// The cache only grows during a session. A cached geometry answers both
/// directions of its pair without touching the store.
pub struct GeometryResolver<S> {
    store: S,
    cache: MokaCache<StationPair, Arc<RouteGeometry>>,
}

impl<S: GeometryStore> GeometryResolver<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            cache: MokaCache::builder().build(),
        }
    }

    /// Resolve the geometry from `departure` to `arrival`.
    pub async fn resolve(
        &self,
        departure: StationId,
        arrival: StationId,
    ) -> Result<Option<Arc<RouteGeometry>>, GeometryError> {
        self.resolve_pair(StationPair::new(departure, arrival)).await
    }

    /// Resolve the geometry for `key`.
    ///
    /// A cached `key` is returned as is and a cached reverse key is returned
    /// reversed. Otherwise exactly one load of `key` is issued; concurrent
    /// callers for the same key share it. A missing document gives `None`
    /// and the reverse key is not tried.
    pub async fn resolve_pair(
        &self,
        key: StationPair,
    ) -> Result<Option<Arc<RouteGeometry>>, GeometryError> {
        if let Some(geometry) = self.cached(key).await {
            tracing::debug!(%key, "geometry cache hit");
            return Ok(Some(geometry));
        }

        let loaded = self
            .cache
            .try_get_with(key, async {
                match self.store.load(key).await {
                    Ok(Some(geometry)) => Ok(Arc::new(geometry)),
                    Ok(None) => Err(LoadError::NotFound),
                    Err(e) => Err(LoadError::Store(e)),
                }
            })
            .await;

        match loaded {
            Ok(geometry) => Ok(Some(geometry)),
            Err(err) => match err.as_ref() {
                LoadError::NotFound => {
                    tracing::debug!(%key, "no geometry stored");
                    Ok(None)
                }
                LoadError::Store(e) => Err(e.clone()),
            },
        }
    }

    /// Resolve many pairs concurrently.
    ///
    /// Each undirected pair is loaded at most once, in the first direction
    /// requested. A failed load is logged and leaves its pairs out of the
    /// result; it never fails the batch. Every requested direction that
    /// resolved is present in the result.
    pub async fn resolve_batch(
        &self,
        pairs: &[StationPair],
    ) -> HashMap<StationPair, Arc<RouteGeometry>> {
        let mut load_set: Vec<StationPair> = Vec::new();
        for pair in pairs {
            if !load_set.iter().any(|p| p.undirected() == pair.undirected()) {
                load_set.push(*pair);
            }
        }

        let results = join_all(load_set.iter().map(|&key| self.resolve_pair(key))).await;

        let mut loaded: HashMap<StationPair, Arc<RouteGeometry>> = HashMap::new();
        for (key, result) in load_set.into_iter().zip(results) {
            match result {
                Ok(Some(geometry)) => {
                    loaded.insert(key.undirected(), geometry);
                }
                Ok(None) => {}
                Err(e) => tracing::warn!(%key, error = %e, "failed to load geometry"),
            }
        }

        let mut resolved = HashMap::new();
        for &pair in pairs {
            let Some(geometry) = loaded.get(&pair.undirected()) else {
                continue;
            };
            let geometry = if geometry.key == pair {
                Arc::clone(geometry)
            } else {
                Arc::new(geometry.reversed())
            };
            resolved.insert(pair, geometry);
        }

        tracing::debug!(
            requested = pairs.len(),
            resolved = resolved.len(),
            "resolved geometry batch"
        );

        resolved
    }

    async fn cached(&self, key: StationPair) -> Option<Arc<RouteGeometry>> {
        if let Some(geometry) = self.cache.get(&key).await {
            return Some(geometry);
        }
        self.cache
            .get(&key.reversed())
            .await
            .map(|g| Arc::new(g.reversed()))
    }
}
