//! Tri-state selection for a single facet.

use serde::{Deserialize, Serialize};

use crate::domain::PricingObservation;

/// An offer attribute the user can filter journeys on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Facet {
    Carrier,
    TravelClass,
    DiscountCard,
}

impl Facet {
    pub const ALL: [Facet; 3] = [Facet::Carrier, Facet::TravelClass, Facet::DiscountCard];

    /// The offer's value for this facet.
    pub fn value_of<'a>(&self, offer: &'a PricingObservation) -> &'a str {
        match self {
            Facet::Carrier => &offer.carrier,
            Facet::TravelClass => &offer.travel_class,
            Facet::DiscountCard => &offer.discount_card,
        }
    }
}

/// Where a value stands in a facet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Membership {
    Selected,
    Excluded,
    Neutral,
}

/// Selected and excluded values of one facet.
///
/// A value is never in both lists. Lists keep insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawSelection")]
pub struct FacetSelection {
    selected: Vec<String>,
    excluded: Vec<String>,
}

/// Unchecked wire form; normalised so excluded wins on overlap.
#[derive(Deserialize)]
struct RawSelection {
    #[serde(default)]
    selected: Vec<String>,
    #[serde(default)]
    excluded: Vec<String>,
}

impl From<RawSelection> for FacetSelection {
    fn from(raw: RawSelection) -> Self {
        let mut selection = FacetSelection::default();
        for value in raw.selected {
            selection.select(&value);
        }
        for value in raw.excluded {
            selection.exclude(&value);
        }
        selection
    }
}

impl FacetSelection {
    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn excluded(&self) -> &[String] {
        &self.excluded
    }

    pub fn membership(&self, value: &str) -> Membership {
        if contains(&self.selected, value) {
            Membership::Selected
        } else if contains(&self.excluded, value) {
            Membership::Excluded
        } else {
            Membership::Neutral
        }
    }

    pub fn is_selected(&self, value: &str) -> bool {
        self.membership(value) == Membership::Selected
    }

    pub fn is_excluded(&self, value: &str) -> bool {
        self.membership(value) == Membership::Excluded
    }

    pub fn is_neutral(&self, value: &str) -> bool {
        self.membership(value) == Membership::Neutral
    }

    /// Whether an offer with this value is visible.
    ///
    /// Excluded values never pass. With any value selected only selected
    /// values pass; with none selected everything not excluded passes.
    pub fn passes(&self, value: &str) -> bool {
        (self.selected.is_empty() || contains(&self.selected, value))
            && !contains(&self.excluded, value)
    }

    /// Rebuild both lists through `clean`, which may drop or rewrite
    /// values. Excluded still wins if two values end up equal.
    pub fn map_lists(self, clean: impl Fn(Vec<String>) -> Vec<String>) -> Self {
        FacetSelection::from(RawSelection {
            selected: clean(self.selected),
            excluded: clean(self.excluded),
        })
    }

    /// No value is selected or excluded.
    pub fn is_empty(&self) -> bool {
        self.selected.is_empty() && self.excluded.is_empty()
    }

    /// Toggle towards `target`: a selected or excluded value goes back to
    /// neutral, a neutral value moves to `target`.
    pub(crate) fn toggle(&mut self, value: &str, target: Membership) {
        match self.membership(value) {
            Membership::Selected => remove(&mut self.selected, value),
            Membership::Excluded => remove(&mut self.excluded, value),
            Membership::Neutral => match target {
                Membership::Selected => self.selected.push(value.to_string()),
                Membership::Excluded => self.excluded.push(value.to_string()),
                Membership::Neutral => {}
            },
        }
    }

    /// Force `value` into `selected`.
    pub(crate) fn select(&mut self, value: &str) {
        remove(&mut self.excluded, value);
        if !contains(&self.selected, value) {
            self.selected.push(value.to_string());
        }
    }

    /// Force `value` into `excluded`.
    pub(crate) fn exclude(&mut self, value: &str) {
        remove(&mut self.selected, value);
        if !contains(&self.excluded, value) {
            self.excluded.push(value.to_string());
        }
    }

    /// Return `value` to neutral.
    pub(crate) fn reset(&mut self, value: &str) {
        remove(&mut self.selected, value);
        remove(&mut self.excluded, value);
    }
}

fn contains(list: &[String], value: &str) -> bool {
    list.iter().any(|v| v == value)
}

fn remove(list: &mut Vec<String>, value: &str) {
    list.retain(|v| v != value);
}
