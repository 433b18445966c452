//! Route geometry resolution.
//!
//! Geometries are stored per direction under `"{departure}-{arrival}"` and
//! resolved through a session cache that serves either direction of a
//! cached pair.

mod error;
mod resolver;
mod route_map;
mod store;
mod types;

pub use error::GeometryError;
pub use resolver::GeometryResolver;
pub use route_map::{RouteMap, RouteShape};
pub use store::{DirectoryGeometryStore, GeometryClient, GeometryClientConfig, GeometryStore};
pub use types::{GeometryDocument, RouteGeometry, Vertex};
