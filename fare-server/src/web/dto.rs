//! Data transfer objects for web requests and responses.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{PriceSummary, PricingObservation, Station, StationPair};
use crate::filter::{FilterState, FilteredJourney, JourneyFilter};
use crate::predicate::FareFilters;

/// Most entries kept from any filter list.
pub const MAX_FILTER_ENTRIES: usize = 50;

/// Most characters kept from any filter string.
pub const MAX_FILTER_CHARS: usize = 200;

/// Most station pairs resolved in one routes request.
pub const MAX_ROUTE_PAIRS: usize = 200;

/// Request to search journeys.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JourneysRequest {
    /// Conditions sent to the fare store
    #[serde(default)]
    pub filters: FareFilters,

    /// Facet state applied to the aggregated journeys; defaults when absent
    #[serde(default)]
    pub facets: Option<FilterState>,

    /// Per-card filters, keyed `"{departure}-{arrival}"`; these replace
    /// `facets` for their journey
    #[serde(default)]
    pub cards: HashMap<StationPair, JourneyFilter>,

    /// First departure day to include
    #[serde(default)]
    pub date_from: Option<NaiveDate>,

    /// Last departure day to include
    #[serde(default)]
    pub date_to: Option<NaiveDate>,
}

impl JourneysRequest {
    /// Apply the list and string caps to every client-supplied list:
    /// filters, facets and per-card filters. At most
    /// [`MAX_FILTER_ENTRIES`] card filters are kept.
    pub fn sanitized(self) -> Self {
        Self {
            filters: sanitize_filters(self.filters),
            facets: self.facets.map(|f| f.map_lists(sanitize_list)),
            cards: self
                .cards
                .into_iter()
                .take(MAX_FILTER_ENTRIES)
                .map(|(key, card)| (key, card.map_lists(sanitize_list)))
                .collect(),
            ..self
        }
    }
}

/// Cap list lengths and string sizes, and strip angle brackets.
pub fn sanitize_filters(filters: FareFilters) -> FareFilters {
    FareFilters {
        carriers: sanitize_list(filters.carriers),
        classes: sanitize_list(filters.classes),
        discount_cards: sanitize_list(filters.discount_cards),
        flexibilities: sanitize_list(filters.flexibilities),
        selected_dates: sanitize_list(filters.selected_dates),
        ..filters
    }
}

fn sanitize_list(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .take(MAX_FILTER_ENTRIES)
        .map(|v| sanitize_text(&v))
        .collect()
}

fn sanitize_text(value: &str) -> String {
    value
        .chars()
        .filter(|c| *c != '<' && *c != '>')
        .take(MAX_FILTER_CHARS)
        .collect()
}

/// A journey card in search results.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneyResult {
    /// `"{departure}-{arrival}"`
    pub key: StationPair,
    pub departure_station: Station,
    pub arrival_station: Station,
    pub carriers: Vec<String>,
    pub classes: Vec<String>,
    pub discount_cards: Vec<String>,
    /// Every offer, before facet filtering
    pub offer_count: usize,
    /// Offers passing the facet state
    pub offers: Vec<PricingObservation>,
    /// Statistics over every offer
    pub raw: PriceSummary,
    /// Statistics over the visible offers
    pub filtered: PriceSummary,
    /// What the card shows: raw unless a filter is active
    pub display: PriceSummary,
    pub filters_active: bool,
}

impl From<&FilteredJourney<'_>> for JourneyResult {
    fn from(view: &FilteredJourney<'_>) -> Self {
        let journey = view.journey();
        Self {
            key: journey.key(),
            departure_station: journey.departure_station().clone(),
            arrival_station: journey.arrival_station().clone(),
            carriers: journey.carriers().to_vec(),
            classes: journey.classes().to_vec(),
            discount_cards: journey.discount_cards().to_vec(),
            offer_count: journey.offers().len(),
            offers: view.offers().iter().map(|o| (*o).clone()).collect(),
            raw: view.raw_summary(),
            filtered: view.filtered_summary(),
            display: view.display_summary(),
            filters_active: view.filters_active(),
        }
    }
}

/// Response for a journey search.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneysResponse {
    /// Journeys found before facet filtering
    pub total_journeys: usize,
    /// Journeys with at least one visible offer
    pub journeys: Vec<JourneyResult>,
    /// The facet state that was applied
    pub facets: FilterState,
}

/// Query for route geometries.
#[derive(Debug, Deserialize)]
pub struct RoutesQuery {
    /// Comma-separated `"{departure}-{arrival}"` pairs
    #[serde(default)]
    pub pairs: String,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
