//! User-supplied fare filter parameters.

use serde::{Deserialize, Serialize};

/// Filter parameters accepted by the fare search.
///
/// Every recognised option is listed here; unknown keys are rejected at
/// deserialisation time. Absent and empty lists both mean "no condition".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FareFilters {
    #[serde(default)]
    pub carriers: Vec<String>,

    #[serde(default)]
    pub classes: Vec<String>,

    #[serde(default)]
    pub discount_cards: Vec<String>,

    #[serde(default)]
    pub flexibilities: Vec<String>,

    /// Calendar dates as `YYYY-MM-DD`, matched as whole local days.
    #[serde(default)]
    pub selected_dates: Vec<String>,

    pub train_number: Option<u32>,

    pub departure_station_id: Option<u32>,

    pub arrival_station_id: Option<u32>,
}

impl FareFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_carriers<S: Into<String>>(mut self, carriers: impl IntoIterator<Item = S>) -> Self {
        self.carriers = carriers.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_classes<S: Into<String>>(mut self, classes: impl IntoIterator<Item = S>) -> Self {
        self.classes = classes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_discount_cards<S: Into<String>>(
        mut self,
        cards: impl IntoIterator<Item = S>,
    ) -> Self {
        self.discount_cards = cards.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_flexibilities<S: Into<String>>(
        mut self,
        flexibilities: impl IntoIterator<Item = S>,
    ) -> Self {
        self.flexibilities = flexibilities.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_dates<S: Into<String>>(mut self, dates: impl IntoIterator<Item = S>) -> Self {
        self.selected_dates = dates.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_train_number(mut self, train_number: u32) -> Self {
        self.train_number = Some(train_number);
        self
    }

    pub fn with_stations(mut self, departure: u32, arrival: u32) -> Self {
        self.departure_station_id = Some(departure);
        self.arrival_station_id = Some(arrival);
        self
    }
}

/// Presence rule for numeric filters.
///
/// A value counts as present only when it is set and non-zero, so `0` is
/// indistinguishable from an absent filter.
pub fn present_if(value: Option<u32>) -> Option<u32> {
    value.filter(|v| *v != 0)
}
