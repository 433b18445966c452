//! Fare store record DTOs.
//!
//! These types map directly to rows returned by the fare query service.
//! Station identifiers are optional because the store keeps rows whose
//! stations could not be resolved; such rows are rejected on conversion.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::predicate::{Field, FieldSource};

/// Station reference as stored, possibly unresolved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationRef {
    pub id: Option<u32>,
    #[serde(default)]
    pub name: String,
}

/// One stored fare row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FareRecord {
    pub departure_station: StationRef,
    pub arrival_station: StationRef,
    pub travel_class: String,
    pub discount_card: String,
    pub carrier: String,
    #[serde(default)]
    pub flexibility: Option<String>,
    #[serde(default)]
    pub train_name: String,
    pub train_number: u32,
    pub departure_date: NaiveDateTime,
    pub min_price: f64,
    pub avg_price: f64,
    pub max_price: f64,
    #[serde(default = "default_sellable")]
    pub is_sellable: bool,
    #[serde(default)]
    pub unsellable_reason: Option<String>,
    #[serde(default)]
    pub days_before_departure: i32,
    /// Set by the scraper when the row could not be priced correctly.
    #[serde(default)]
    pub is_error: bool,
}

fn default_sellable() -> bool {
    true
}

impl FieldSource for FareRecord {
    fn flag(&self, field: Field) -> Option<bool> {
        match field {
            Field::IsError => Some(self.is_error),
            _ => None,
        }
    }

    fn text(&self, field: Field) -> Option<&str> {
        match field {
            Field::Carrier => Some(&self.carrier),
            Field::TravelClass => Some(&self.travel_class),
            Field::DiscountCard => Some(&self.discount_card),
            Field::Flexibility => self.flexibility.as_deref(),
            _ => None,
        }
    }

    fn number(&self, field: Field) -> Option<u32> {
        match field {
            Field::TrainNumber => Some(self.train_number),
            Field::DepartureStationId => self.departure_station.id,
            Field::ArrivalStationId => self.arrival_station.id,
            _ => None,
        }
    }

    fn timestamp(&self, field: Field) -> Option<NaiveDateTime> {
        match field {
            Field::DepartureDate => Some(self.departure_date),
            _ => None,
        }
    }
}
