//! Domain types for fare aggregation.
//!
//! These types represent validated fare data. Identifiers enforce their
//! invariants at construction time, so code that receives them can trust
//! their validity.

mod observation;
mod price;
mod station;

#[cfg(test)]
pub(crate) use observation::fixtures;
pub use observation::PricingObservation;
pub use price::{PriceSummary, round_half_away_from_zero};
pub use station::{InvalidStationId, InvalidStationPair, Station, StationId, StationPair};
