//! Pricing observations: one row of scraped fare data.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::station::{Station, StationPair};

/// A single observed fare for one train, class and discount card.
///
/// Observations are produced by the fare store and never modified here.
/// `min_price <= avg_price <= max_price` is expected but not checked;
/// everything downstream copes with rows that break it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingObservation {
    pub departure_station: Station,
    pub arrival_station: Station,
    pub travel_class: String,
    pub discount_card: String,
    pub carrier: String,
    /// Ticket flexibility label, when the source reports one.
    pub flexibility: Option<String>,
    pub train_name: String,
    pub train_number: u32,
    /// Local wall-clock departure time.
    pub departure_date: NaiveDateTime,
    pub min_price: f64,
    pub avg_price: f64,
    pub max_price: f64,
    pub is_sellable: bool,
    pub unsellable_reason: Option<String>,
    pub days_before_departure: i32,
}

impl PricingObservation {
    /// The journey this observation belongs to.
    pub fn station_pair(&self) -> StationPair {
        StationPair::new(self.departure_station.id, self.arrival_station.id)
    }

    /// The three price fields, in min/avg/max order.
    pub fn prices(&self) -> [f64; 3] {
        [self.min_price, self.avg_price, self.max_price]
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::observation;
    use super::*;

    #[test]
    fn station_pair_is_directional() {
        let obs = observation(1, 2, "sncf", (20.0, 30.0, 40.0));
        assert_eq!(obs.station_pair().to_string(), "1-2");
    }

    #[test]
    fn prices_in_field_order() {
        let obs = observation(1, 2, "sncf", (20.0, 30.0, 40.0));
        assert_eq!(obs.prices(), [20.0, 30.0, 40.0]);
    }

    #[test]
    fn json_uses_camel_case() {
        let obs = observation(1, 2, "ouigo", (10.0, 15.0, 19.0));
        let json = serde_json::to_value(&obs).unwrap();
        assert_eq!(json["departureStation"]["id"], 1);
        assert_eq!(json["minPrice"], 10.0);
        assert_eq!(json["daysBeforeDeparture"], 14);
        let back: PricingObservation = serde_json::from_value(json).unwrap();
        assert_eq!(back, obs);
    }
}
