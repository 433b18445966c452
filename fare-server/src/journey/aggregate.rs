//! Grouping of pricing observations into journeys.

use std::collections::HashMap;

use serde::Serialize;

use crate::domain::{PriceSummary, PricingObservation, Station, StationPair};

/// All offers observed for one departure → arrival station pair.
///
/// A journey is rebuilt from observations on every computation and never
/// changes once [`aggregate`] has returned it. It always holds at least one
/// offer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Journey {
    key: StationPair,
    departure_station: Station,
    arrival_station: Station,
    offers: Vec<PricingObservation>,
    carriers: Vec<String>,
    classes: Vec<String>,
    discount_cards: Vec<String>,
    #[serde(flatten)]
    summary: PriceSummary,
}

impl Journey {
    /// Start a journey from its first offer.
    fn seed(offer: PricingObservation) -> Self {
        Self {
            key: offer.station_pair(),
            departure_station: offer.departure_station.clone(),
            arrival_station: offer.arrival_station.clone(),
            carriers: vec![offer.carrier.clone()],
            classes: vec![offer.travel_class.clone()],
            discount_cards: vec![offer.discount_card.clone()],
            summary: PriceSummary::of_offer(&offer),
            offers: vec![offer],
        }
    }

    /// Append an offer, extend the facet sets and rescan the statistics.
    fn push_offer(&mut self, offer: PricingObservation) {
        union_into(&mut self.carriers, &offer.carrier);
        union_into(&mut self.classes, &offer.travel_class);
        union_into(&mut self.discount_cards, &offer.discount_card);
        self.offers.push(offer);
        // Full rescan over every offer seen so far; offers is never empty here.
        self.summary = PriceSummary::pooled(&self.offers).unwrap_or(self.summary);
    }

    /// `"{departure}-{arrival}"` key.
    pub fn key(&self) -> StationPair {
        self.key
    }

    pub fn departure_station(&self) -> &Station {
        &self.departure_station
    }

    pub fn arrival_station(&self) -> &Station {
        &self.arrival_station
    }

    pub fn offers(&self) -> &[PricingObservation] {
        &self.offers
    }

    /// Distinct carriers, in order of first appearance.
    pub fn carriers(&self) -> &[String] {
        &self.carriers
    }

    /// Distinct travel classes, in order of first appearance.
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Distinct discount cards, in order of first appearance.
    pub fn discount_cards(&self) -> &[String] {
        &self.discount_cards
    }

    /// Pooled min/avg/max over every offer.
    pub fn summary(&self) -> PriceSummary {
        self.summary
    }
}

fn union_into(set: &mut Vec<String>, value: &str) {
    if !set.iter().any(|v| v == value) {
        set.push(value.to_string());
    }
}

/// Group observations by station pair.
///
/// Journeys come out in the order their first offer appears in the input,
/// and offers keep their input order within a journey. Offer counts across
/// the result always sum to `observations.len()`.
pub fn aggregate(observations: &[PricingObservation]) -> Vec<Journey> {
    let mut index: HashMap<StationPair, usize> = HashMap::new();
    let mut journeys: Vec<Journey> = Vec::new();

    for offer in observations {
        let key = offer.station_pair();
        match index.get(&key) {
            Some(&i) => journeys[i].push_offer(offer.clone()),
            None => {
                index.insert(key, journeys.len());
                journeys.push(Journey::seed(offer.clone()));
            }
        }
    }

    tracing::debug!(
        observations = observations.len(),
        journeys = journeys.len(),
        "aggregated observations"
    );

    journeys
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fixtures::observation;

    #[test]
    fn empty_input_gives_no_journeys() {
        assert!(aggregate(&[]).is_empty());
    }

    #[test]
    fn groups_by_station_pair() {
        let observations = vec![
            observation(1, 2, "sncf", (20.0, 30.0, 40.0)),
            observation(1, 2, "sncf", (25.0, 35.0, 45.0)),
        ];
        let journeys = aggregate(&observations);

        assert_eq!(journeys.len(), 1);
        let journey = &journeys[0];
        assert_eq!(journey.key().to_string(), "1-2");
        assert_eq!(journey.offers().len(), 2);
        assert_eq!(journey.summary().min_price, 20.0);
        assert_eq!(journey.summary().max_price, 45.0);
        assert_eq!(journey.summary().avg_price, 33.0);
    }

    #[test]
    fn direction_matters() {
        let observations = vec![
            observation(1, 2, "sncf", (20.0, 30.0, 40.0)),
            observation(2, 1, "sncf", (20.0, 30.0, 40.0)),
        ];
        let journeys = aggregate(&observations);
        assert_eq!(journeys.len(), 2);
        assert_eq!(journeys[0].key().to_string(), "1-2");
        assert_eq!(journeys[1].key().to_string(), "2-1");
    }

    #[test]
    fn facets_in_first_appearance_order() {
        let mut first = observation(1, 2, "ouigo", (10.0, 15.0, 20.0));
        first.travel_class = "2".into();
        let mut second = observation(1, 2, "sncf", (30.0, 40.0, 50.0));
        second.travel_class = "1".into();
        second.discount_card = "MAX".into();
        let third = observation(1, 2, "ouigo", (12.0, 14.0, 16.0));

        let journeys = aggregate(&[first, second, third]);
        let journey = &journeys[0];
        assert_eq!(journey.carriers(), ["ouigo", "sncf"]);
        assert_eq!(journey.classes(), ["2", "1"]);
        assert_eq!(journey.discount_cards(), ["NONE", "MAX"]);
    }

    #[test]
    fn journey_order_follows_first_offer() {
        let observations = vec![
            observation(5, 6, "sncf", (1.0, 2.0, 3.0)),
            observation(1, 2, "sncf", (1.0, 2.0, 3.0)),
            observation(5, 6, "sncf", (1.0, 2.0, 3.0)),
        ];
        let keys: Vec<String> = aggregate(&observations)
            .iter()
            .map(|j| j.key().to_string())
            .collect();
        assert_eq!(keys, ["5-6", "1-2"]);
    }

    #[test]
    fn stations_carry_names() {
        let journeys = aggregate(&[observation(3, 4, "sncf", (1.0, 2.0, 3.0))]);
        assert_eq!(journeys[0].departure_station().name, "Station 3");
        assert_eq!(journeys[0].arrival_station().name, "Station 4");
    }

    #[test]
    fn serializes_flat_summary() {
        let journeys = aggregate(&[observation(1, 2, "sncf", (20.0, 30.0, 40.0))]);
        let json = serde_json::to_value(&journeys[0]).unwrap();
        assert_eq!(json["key"], "1-2");
        assert_eq!(json["minPrice"], 20.0);
        assert_eq!(json["avgPrice"], 30.0);
        assert_eq!(json["discountCards"][0], "NONE");
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::domain::fixtures::observation;
    use proptest::prelude::*;

    fn observations() -> impl Strategy<Value = Vec<PricingObservation>> {
        proptest::collection::vec(
            (1u32..5, 1u32..5, prop_oneof!["sncf", "ouigo"], 1.0f64..200.0),
            0..40,
        )
        .prop_map(|rows| {
            rows.into_iter()
                .map(|(dep, arr, carrier, price)| {
                    observation(dep, arr, &carrier, (price, price + 5.0, price + 10.0))
                })
                .collect()
        })
    }

    proptest! {
        /// Offer counts are conserved and no journey is empty
        #[test]
        fn offers_conserved(obs in observations()) {
            let journeys = aggregate(&obs);
            let total: usize = journeys.iter().map(|j| j.offers().len()).sum();
            prop_assert_eq!(total, obs.len());
            prop_assert!(journeys.iter().all(|j| !j.offers().is_empty()));
        }

        /// Incremental rescans agree with a one-shot pooled summary
        #[test]
        fn summary_matches_pooled(obs in observations()) {
            for journey in aggregate(&obs) {
                prop_assert_eq!(Some(journey.summary()), PriceSummary::pooled(journey.offers()));
            }
        }

        /// Every journey's offers share its key
        #[test]
        fn offers_share_key(obs in observations()) {
            for journey in aggregate(&obs) {
                prop_assert!(journey.offers().iter().all(|o| o.station_pair() == journey.key()));
            }
        }
    }
}
