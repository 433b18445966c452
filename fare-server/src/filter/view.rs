//! Recomputing the visible journeys for a filter state.

use std::collections::HashMap;

use crate::domain::{PriceSummary, PricingObservation, StationPair};
use crate::journey::Journey;

use super::pinned::JourneyFilter;
use super::state::FilterState;

/// A journey as currently visible: its passing offers and their statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct FilteredJourney<'a> {
    journey: &'a Journey,
    offers: Vec<&'a PricingObservation>,
    filtered: PriceSummary,
    filters_active: bool,
}

impl<'a> FilteredJourney<'a> {
    /// Filter one journey's offers; `None` when nothing passes.
    fn build(journey: &'a Journey, state: &FilterState) -> Option<Self> {
        let offers: Vec<&PricingObservation> = journey
            .offers()
            .iter()
            .filter(|offer| state.passes_offer(offer))
            .collect();

        let filtered = PriceSummary::pooled(offers.iter().copied())?;

        Some(Self {
            journey,
            offers,
            filtered,
            filters_active: state.is_active(),
        })
    }

    pub fn journey(&self) -> &'a Journey {
        self.journey
    }

    /// Offers passing every facet, in journey order. Never empty.
    pub fn offers(&self) -> &[&'a PricingObservation] {
        &self.offers
    }

    /// Pooled statistics over every offer, ignoring filters.
    pub fn raw_summary(&self) -> PriceSummary {
        self.journey.summary()
    }

    /// Pooled statistics over the visible offers only.
    pub fn filtered_summary(&self) -> PriceSummary {
        self.filtered
    }

    /// Whether any facet has a selected or excluded value.
    pub fn filters_active(&self) -> bool {
        self.filters_active
    }

    /// The statistics a card shows: raw when no filter is active,
    /// otherwise the filtered ones.
    pub fn display_summary(&self) -> PriceSummary {
        if self.filters_active {
            self.filtered
        } else {
            self.raw_summary()
        }
    }
}

/// Apply `state` to every journey.
///
/// Journeys left without offers are dropped; an empty result is a valid
/// outcome, not an error.
pub fn recompute<'a>(journeys: &'a [Journey], state: &FilterState) -> Vec<FilteredJourney<'a>> {
    journeys
        .iter()
        .filter_map(|journey| FilteredJourney::build(journey, state))
        .collect()
}

/// Apply a journey card's own filter.
pub fn recompute_journey<'a>(
    journey: &'a Journey,
    filter: &JourneyFilter,
) -> Option<FilteredJourney<'a>> {
    FilteredJourney::build(journey, filter.state())
}

/// Apply `state` to every journey, except that a journey with its own card
/// filter in `cards` uses that instead.
pub fn recompute_cards<'a>(
    journeys: &'a [Journey],
    state: &FilterState,
    cards: &HashMap<StationPair, JourneyFilter>,
) -> Vec<FilteredJourney<'a>> {
    journeys
        .iter()
        .filter_map(|journey| match cards.get(&journey.key()) {
            Some(card) => recompute_journey(journey, card),
            None => FilteredJourney::build(journey, state),
        })
        .collect()
}
