//! Route geometry types.

use serde::{Deserialize, Serialize};

use crate::domain::StationPair;

/// A (latitude, longitude) vertex.
pub type Vertex = (f64, f64);

/// The drawn path of a route between two stations.
///
/// Geometry is directional: the first vertex is at the departure station.
/// The opposite direction is the same path with its vertices reversed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteGeometry {
    pub key: StationPair,
    pub vertices: Vec<Vertex>,
}

impl RouteGeometry {
    pub fn new(key: StationPair, vertices: Vec<Vertex>) -> Self {
        Self { key, vertices }
    }

    /// The same path travelled from arrival to departure.
    pub fn reversed(&self) -> Self {
        Self {
            key: self.key.reversed(),
            vertices: self.vertices.iter().rev().copied().collect(),
        }
    }
}

/// Stored geometry document, addressed by `"{departure}-{arrival}"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeometryDocument {
    pub coordinates: Vec<Vertex>,
}

impl GeometryDocument {
    pub fn into_geometry(self, key: StationPair) -> RouteGeometry {
        RouteGeometry::new(key, self.coordinates)
    }
}
