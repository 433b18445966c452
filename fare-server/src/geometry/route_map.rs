//! Keyed geometry display state.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;

use crate::domain::StationPair;

use super::types::{RouteGeometry, Vertex};

/// Geometries currently shown, keyed by station pair.
///
/// Loads finish in any order and may land after the requested set has
/// moved on. Only geometries whose key is still requested are merged, and
/// merging the same geometry twice changes nothing.
#[derive(Debug, Clone, Default)]
pub struct RouteMap {
    requested: HashSet<StationPair>,
    geometries: HashMap<StationPair, Arc<RouteGeometry>>,
}

impl RouteMap {
    pub fn new(requested: impl IntoIterator<Item = StationPair>) -> Self {
        Self {
            requested: requested.into_iter().collect(),
            geometries: HashMap::new(),
        }
    }

    /// Replace the requested keys, dropping geometries no longer requested.
    pub fn request(&mut self, keys: impl IntoIterator<Item = StationPair>) {
        self.requested = keys.into_iter().collect();
        let requested = &self.requested;
        self.geometries.retain(|key, _| requested.contains(key));
    }

    pub fn is_requested(&self, key: StationPair) -> bool {
        self.requested.contains(&key)
    }

    /// Merge a resolved geometry. Returns whether it was kept.
    pub fn merge(&mut self, geometry: Arc<RouteGeometry>) -> bool {
        if !self.is_requested(geometry.key) {
            tracing::debug!(key = %geometry.key, "discarding stale geometry");
            return false;
        }
        self.geometries.insert(geometry.key, geometry);
        true
    }

    /// Merge every geometry of a batch result.
    pub fn merge_all(&mut self, geometries: impl IntoIterator<Item = Arc<RouteGeometry>>) {
        for geometry in geometries {
            self.merge(geometry);
        }
    }

    pub fn get(&self, key: StationPair) -> Option<&RouteGeometry> {
        self.geometries.get(&key).map(Arc::as_ref)
    }

    pub fn len(&self) -> usize {
        self.geometries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty()
    }

    /// Requested keys with no geometry yet.
    pub fn missing(&self) -> Vec<StationPair> {
        let mut missing: Vec<StationPair> = self
            .requested
            .iter()
            .filter(|k| !self.geometries.contains_key(k))
            .copied()
            .collect();
        missing.sort();
        missing
    }

    /// Vertex lists keyed by `"{departure}-{arrival}"`.
    pub fn to_response(&self) -> HashMap<String, RouteShape> {
        self.geometries
            .iter()
            .map(|(key, g)| {
                (
                    key.to_string(),
                    RouteShape {
                        coordinates: g.vertices.clone(),
                    },
                )
            })
            .collect()
    }
}

/// Serialized form of one merged geometry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteShape {
    pub coordinates: Vec<Vertex>,
}
