//! Cross-journey filter state and its reducer.

use serde::{Deserialize, Serialize};

use crate::domain::PricingObservation;

use super::facet::{Facet, FacetSelection, Membership};

/// Discount card code for unrestricted, maximum-price fares.
pub const UNRESTRICTED_CARD: &str = "MAX";

/// Values excluded before the user touches anything.
///
/// `Clear` restores these rather than emptying every facet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterDefaults {
    pub excluded_discount_cards: Vec<String>,
}

impl FilterDefaults {
    /// Defaults that exclude nothing.
    pub fn none() -> Self {
        Self {
            excluded_discount_cards: Vec::new(),
        }
    }
}

impl Default for FilterDefaults {
    fn default() -> Self {
        Self {
            excluded_discount_cards: vec![UNRESTRICTED_CARD.to_string()],
        }
    }
}

/// A user action on the filter state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum FilterAction {
    /// Toggle towards selected.
    Select { facet: Facet, value: String },
    /// Toggle towards excluded.
    Exclude { facet: Facet, value: String },
    /// Reset every facet to the defaults.
    Clear,
}

/// Selected/excluded values for every facet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    #[serde(default)]
    carrier: FacetSelection,
    #[serde(default)]
    travel_class: FacetSelection,
    #[serde(default)]
    discount_card: FacetSelection,
    #[serde(skip)]
    defaults: FilterDefaults,
}

impl Default for FilterState {
    fn default() -> Self {
        Self::new(FilterDefaults::default())
    }
}

impl FilterState {
    /// A state seeded from `defaults`.
    pub fn new(defaults: FilterDefaults) -> Self {
        let mut state = Self {
            carrier: FacetSelection::default(),
            travel_class: FacetSelection::default(),
            discount_card: FacetSelection::default(),
            defaults,
        };
        state.seed_defaults();
        state
    }

    /// A state with no defaults and nothing selected.
    pub fn empty() -> Self {
        Self::new(FilterDefaults::none())
    }

    /// Keep the current selections but reset to `defaults` on `Clear`.
    pub fn with_defaults(mut self, defaults: FilterDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    fn seed_defaults(&mut self) {
        for card in &self.defaults.excluded_discount_cards {
            self.discount_card.exclude(card);
        }
    }

    pub fn defaults(&self) -> &FilterDefaults {
        &self.defaults
    }

    pub fn facet(&self, facet: Facet) -> &FacetSelection {
        match facet {
            Facet::Carrier => &self.carrier,
            Facet::TravelClass => &self.travel_class,
            Facet::DiscountCard => &self.discount_card,
        }
    }

    pub(crate) fn facet_mut(&mut self, facet: Facet) -> &mut FacetSelection {
        match facet {
            Facet::Carrier => &mut self.carrier,
            Facet::TravelClass => &mut self.travel_class,
            Facet::DiscountCard => &mut self.discount_card,
        }
    }

    /// The state after `action`; `self` is left untouched.
    pub fn reduce(&self, action: &FilterAction) -> Self {
        let mut next = self.clone();
        next.apply(action);
        next
    }

    /// Apply `action` in place.
    pub fn apply(&mut self, action: &FilterAction) {
        match action {
            FilterAction::Select { facet, value } => {
                self.facet_mut(*facet).toggle(value, Membership::Selected)
            }
            FilterAction::Exclude { facet, value } => {
                self.facet_mut(*facet).toggle(value, Membership::Excluded)
            }
            FilterAction::Clear => self.clear(),
        }
    }

    /// Reset every facet to the defaults.
    pub fn clear(&mut self) {
        for facet in Facet::ALL {
            *self.facet_mut(facet) = FacetSelection::default();
        }
        self.seed_defaults();
    }

    pub fn membership(&self, facet: Facet, value: &str) -> Membership {
        self.facet(facet).membership(value)
    }

    pub fn is_selected(&self, facet: Facet, value: &str) -> bool {
        self.facet(facet).is_selected(value)
    }

    pub fn is_excluded(&self, facet: Facet, value: &str) -> bool {
        self.facet(facet).is_excluded(value)
    }

    pub fn is_neutral(&self, facet: Facet, value: &str) -> bool {
        self.facet(facet).is_neutral(value)
    }

    pub fn passes(&self, facet: Facet, value: &str) -> bool {
        self.facet(facet).passes(value)
    }

    /// Whether an offer passes every facet.
    pub fn passes_offer(&self, offer: &PricingObservation) -> bool {
        Facet::ALL
            .iter()
            .all(|facet| self.passes(*facet, facet.value_of(offer)))
    }

    /// Any facet has a selected or excluded value.
    pub fn is_active(&self) -> bool {
        Facet::ALL.iter().any(|facet| !self.facet(*facet).is_empty())
    }

    /// Rebuild every facet's lists through `clean`.
    pub fn map_lists(mut self, clean: impl Fn(Vec<String>) -> Vec<String>) -> Self {
        for facet in Facet::ALL {
            let selection = std::mem::take(self.facet_mut(facet));
            *self.facet_mut(facet) = selection.map_lists(&clean);
        }
        self
    }
}
