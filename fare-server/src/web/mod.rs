//! Web layer for the fare explorer.
//!
//! Provides HTTP endpoints for searching journeys, resolving route
//! geometry and keeping saved filter states.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::{AppState, FareBackend, GeometryBackend};
