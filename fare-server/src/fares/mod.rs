//! Fare query service.
//!
//! The fare store holds scraped pricing rows. It is queried with a match
//! expression built by [`crate::predicate`] plus optional date bounds and
//! returns raw [`FareRecord`]s, which [`convert`] validates into domain
//! observations.
//!
//! Two sources are provided: [`FareClient`] talks to the HTTP service and
//! [`FileFareSource`] serves a local JSON file.

mod client;
pub mod convert;
mod error;
mod file;
mod types;

use std::future::Future;

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{Value, json};

use crate::predicate::{Field, FieldSource, MatchExpression};

pub use client::{FareClient, FareClientConfig};
pub use convert::{ConversionError, aggregate_records, convert_records};
pub use error::FareError;
pub use file::FileFareSource;
pub use types::{FareRecord, StationRef};

#[cfg(test)]
pub(crate) use types::fixtures;

/// A query against the fare store.
#[derive(Debug, Clone, PartialEq)]
pub struct FareQuery {
    /// Condition every returned row must satisfy.
    pub predicate: MatchExpression,
    /// First departure day to include.
    pub date_from: Option<NaiveDate>,
    /// Last departure day to include.
    pub date_to: Option<NaiveDate>,
}

impl FareQuery {
    pub fn new(predicate: MatchExpression) -> Self {
        Self {
            predicate,
            date_from: None,
            date_to: None,
        }
    }

    /// Restrict departures to `[from, to]` (whole days, either side optional).
    pub fn with_date_range(mut self, from: Option<NaiveDate>, to: Option<NaiveDate>) -> Self {
        self.date_from = from;
        self.date_to = to;
        self
    }

    fn in_range(&self, departure: NaiveDateTime) -> bool {
        let day = departure.date();
        self.date_from.is_none_or(|from| day >= from) && self.date_to.is_none_or(|to| day <= to)
    }

    /// Whether a record satisfies both the predicate and the date bounds.
    pub fn accepts<R: FieldSource + ?Sized>(&self, record: &R) -> bool {
        self.predicate.matches(record)
            && record
                .timestamp(Field::DepartureDate)
                .is_none_or(|ts| self.in_range(ts))
    }

    /// Request body sent to the fare query service.
    pub fn to_body(&self) -> Value {
        json!({
            "match": self.predicate.to_document(),
            "dateFrom": self.date_from.map(|d| d.to_string()),
            "dateTo": self.date_to.map(|d| d.to_string()),
        })
    }
}

/// Trait for fetching fare rows.
///
/// This abstraction allows the web layer to be tested with local data.
pub trait FareSource {
    /// Fetch every row matching the query.
    fn fetch(
        &self,
        query: &FareQuery,
    ) -> impl Future<Output = Result<Vec<FareRecord>, FareError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predicate::{FareFilters, build_match};

    #[test]
    fn body_contains_match_and_bounds() {
        let query = FareQuery::new(build_match(&FareFilters::default()).unwrap())
            .with_date_range(NaiveDate::from_ymd_opt(2024, 3, 1), None);
        let body = query.to_body();
        assert_eq!(body["match"]["is_error"]["$ne"], true);
        assert_eq!(body["dateFrom"], "2024-03-01");
        assert!(body["dateTo"].is_null());
    }

    #[test]
    fn accepts_respects_bounds() {
        let query = FareQuery::new(MatchExpression::default()).with_date_range(
            NaiveDate::from_ymd_opt(2024, 3, 10),
            NaiveDate::from_ymd_opt(2024, 3, 10),
        );
        assert!(query.accepts(&fixtures::record(1, 2, "sncf", 10)));
        assert!(!query.accepts(&fixtures::record(1, 2, "sncf", 11)));
        assert!(!query.accepts(&fixtures::record(1, 2, "sncf", 9)));
    }
}
