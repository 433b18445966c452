//! Pooled price statistics.

use serde::{Deserialize, Serialize};

use super::observation::PricingObservation;

/// Min/avg/max over a pooled sample of prices.
///
/// The sample is built from all three price fields of every offer, so the
/// minimum is the smallest of any min, avg or max field and the average
/// mixes the three semantics. `avg_price` is rounded half away from zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSummary {
    pub min_price: f64,
    pub avg_price: f64,
    pub max_price: f64,
}

impl PriceSummary {
    /// Pool `[min, avg, max]` of every offer and summarise.
    ///
    /// Returns `None` when there are no offers.
    pub fn pooled<'a, I>(offers: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a PricingObservation>,
    {
        Self::from_prices(offers.into_iter().flat_map(|o| o.prices()))
    }

    /// Summary of a single offer's three price fields.
    pub fn of_offer(offer: &PricingObservation) -> Self {
        let mut sample = Sample::starting_at(offer.min_price);
        sample.push(offer.avg_price);
        sample.push(offer.max_price);
        sample.summary()
    }

    /// Summarise an arbitrary price sample.
    pub fn from_prices(prices: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut prices = prices.into_iter();
        let mut sample = Sample::starting_at(prices.next()?);
        for price in prices {
            sample.push(price);
        }
        Some(sample.summary())
    }
}

/// Running totals over a non-empty sample.
struct Sample {
    count: usize,
    sum: f64,
    min: f64,
    max: f64,
}

impl Sample {
    fn starting_at(price: f64) -> Self {
        Self {
            count: 1,
            sum: price,
            min: price,
            max: price,
        }
    }

    fn push(&mut self, price: f64) {
        self.count += 1;
        self.sum += price;
        // f64::min/max skip NaN
        self.min = self.min.min(price);
        self.max = self.max.max(price);
    }

    fn summary(&self) -> PriceSummary {
        PriceSummary {
            min_price: self.min,
            avg_price: round_half_away_from_zero(self.sum / self.count as f64),
            max_price: self.max,
        }
    }
}

/// Round to the nearest integer, ties away from zero (32.5 → 33, -2.5 → -3).
pub fn round_half_away_from_zero(value: f64) -> f64 {
    value.round()
}
