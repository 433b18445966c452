//! Faceted filtering of journeys.
//!
//! Each facet (carrier, travel class, discount card) holds a list of
//! selected and a list of excluded values. Clicking a value cycles it
//! through include, exclude and neutral. An offer passes a facet when it
//! is not excluded and, if anything is selected, is one of the selected
//! values. Journeys are recomputed from scratch whenever the state changes.

mod facet;
mod pinned;
mod state;
mod store;
mod view;

pub use facet::{Facet, FacetSelection, Membership};
pub use pinned::JourneyFilter;
pub use state::{FilterAction, FilterDefaults, FilterState, UNRESTRICTED_CARD};
pub use store::{
    FilterStoreError, JsonFileStore, KeyValueStore, MemoryStore, SavedFilters, UpdateFn,
};
pub use view::{FilteredJourney, recompute, recompute_cards, recompute_journey};
