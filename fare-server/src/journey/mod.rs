//! Journey aggregation.
//!
//! Groups flat pricing observations into per-route journeys carrying the
//! facet values seen across their offers and pooled price statistics.

mod aggregate;

pub use aggregate::{Journey, aggregate};
