//! Per-journey filter with single-value pins.
//!
//! Journey cards let the user click a facet value once to keep only that
//! value, again to hide it, and a third time to reset. The clicked value is
//! "pinned": it sits in `selected` like any other, but the filter remembers
//! it so the next click demotes it straight to `excluded`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::facet::{Facet, Membership};
use super::state::{FilterAction, FilterState};

/// Filter state for one journey card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawJourneyFilter")]
pub struct JourneyFilter {
    state: FilterState,
    pinned: BTreeMap<Facet, String>,
}

/// Unchecked wire form; pins whose value is not selected are dropped.
#[derive(Deserialize)]
struct RawJourneyFilter {
    #[serde(default)]
    state: FilterState,
    #[serde(default)]
    pinned: BTreeMap<Facet, String>,
}

impl From<RawJourneyFilter> for JourneyFilter {
    fn from(raw: RawJourneyFilter) -> Self {
        let mut filter = JourneyFilter::new(raw.state);
        for (facet, value) in raw.pinned {
            if filter.state.is_selected(facet, &value) {
                filter.pinned.insert(facet, value);
            }
        }
        filter
    }
}

impl JourneyFilter {
    /// Start from an existing state with nothing pinned.
    pub fn new(state: FilterState) -> Self {
        Self {
            state,
            pinned: BTreeMap::new(),
        }
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    /// The pinned value for `facet`, if any.
    pub fn pinned(&self, facet: Facet) -> Option<&str> {
        self.pinned.get(&facet).map(String::as_str)
    }

    /// Pin `value`: select it and remember it. A previous pin on the same
    /// facet returns to neutral.
    pub fn pin(&mut self, facet: Facet, value: &str) {
        if let Some(previous) = self.pinned.remove(&facet)
            && previous != value
        {
            self.state.facet_mut(facet).reset(&previous);
        }
        self.state.facet_mut(facet).select(value);
        self.pinned.insert(facet, value.to_string());
    }

    /// Single-click cycle: neutral → pinned → excluded → neutral.
    ///
    /// A value selected through the multi-value actions (not pinned) goes
    /// back to neutral.
    pub fn click(&mut self, facet: Facet, value: &str) {
        if self.pinned(facet) == Some(value) {
            self.pinned.remove(&facet);
            self.state.facet_mut(facet).exclude(value);
            return;
        }

        match self.state.membership(facet, value) {
            Membership::Neutral => self.pin(facet, value),
            Membership::Selected | Membership::Excluded => {
                self.state.facet_mut(facet).reset(value)
            }
        }
    }

    /// Apply a multi-value action. Pins whose value is no longer selected
    /// are forgotten.
    pub fn apply(&mut self, action: &FilterAction) {
        self.state.apply(action);
        let state = &self.state;
        self.pinned
            .retain(|facet, value| state.is_selected(*facet, value));
    }

    /// Rebuild every list through `clean`. Pins are cleaned the same way
    /// and dropped if their value is no longer selected.
    pub fn map_lists(self, clean: impl Fn(Vec<String>) -> Vec<String>) -> Self {
        let state = self.state.map_lists(&clean);
        let pinned = self
            .pinned
            .into_iter()
            .filter_map(|(facet, value)| clean(vec![value]).pop().map(|v| (facet, v)))
            .collect();
        JourneyFilter::from(RawJourneyFilter { state, pinned })
    }

    /// The filter after `action`; `self` is left untouched.
    pub fn reduce(&self, action: &FilterAction) -> Self {
        let mut next = self.clone();
        next.apply(action);
        next
    }
}
