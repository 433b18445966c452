//! Filter parameters → match expression.

use chrono::NaiveDate;

use super::expr::{Clause, DayWindow, Field, MatchExpression};
use super::filters::{FareFilters, present_if};

/// Error from predicate construction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PredicateError {
    /// A selected date is not a `YYYY-MM-DD` calendar date
    #[error("invalid date: {0:?} (expected YYYY-MM-DD)")]
    InvalidDate(String),
}

/// Build the fare store condition for a set of filters.
///
/// Errored records are always excluded. Each non-empty list becomes an
/// "is one of" clause, present numeric filters become exact matches, and
/// selected dates become whole-day windows (several dates are ORed, since
/// a record has exactly one departure time). Everything else is ANDed.
pub fn build_match(filters: &FareFilters) -> Result<MatchExpression, PredicateError> {
    let mut clauses = vec![Clause::NotTrue(Field::IsError)];

    for (field, values) in [
        (Field::Carrier, &filters.carriers),
        (Field::TravelClass, &filters.classes),
        (Field::DiscountCard, &filters.discount_cards),
        (Field::Flexibility, &filters.flexibilities),
    ] {
        if !values.is_empty() {
            clauses.push(Clause::OneOf(field, values.clone()));
        }
    }

    for (field, value) in [
        (Field::TrainNumber, filters.train_number),
        (Field::DepartureStationId, filters.departure_station_id),
        (Field::ArrivalStationId, filters.arrival_station_id),
    ] {
        if let Some(value) = present_if(value) {
            clauses.push(Clause::Equals(field, value));
        }
    }

    let mut windows = filters
        .selected_dates
        .iter()
        .map(|d| parse_day(d).map(|w| Clause::Within(Field::DepartureDate, w)))
        .collect::<Result<Vec<_>, _>>()?;

    match windows.len() {
        0 => {}
        1 => clauses.append(&mut windows),
        _ => clauses.push(Clause::AnyOf(windows)),
    }

    Ok(MatchExpression::new(clauses))
}

fn parse_day(s: &str) -> Result<DayWindow, PredicateError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .ok()
        .and_then(DayWindow::for_date)
        .ok_or_else(|| PredicateError::InvalidDate(s.to_string()))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn window(date: &str) -> DayWindow {
        parse_day(date).unwrap()
    }

    #[test]
    fn no_filters_gives_baseline_only() {
        let expr = build_match(&FareFilters::default()).unwrap();
        assert_eq!(expr.clauses(), &[Clause::NotTrue(Field::IsError)]);
    }

    #[test]
    fn empty_lists_impose_nothing() {
        let filters = FareFilters::new()
            .with_carriers(Vec::<String>::new())
            .with_dates(Vec::<String>::new());
        let expr = build_match(&filters).unwrap();
        assert_eq!(expr.clauses().len(), 1);
    }

    #[test]
    fn zero_numbers_are_absent() {
        let filters = FareFilters::new().with_train_number(0).with_stations(0, 0);
        let expr = build_match(&filters).unwrap();
        assert_eq!(expr.clauses(), &[Clause::NotTrue(Field::IsError)]);
    }

    #[test]
    fn numbers_become_exact_matches() {
        let filters = FareFilters::new().with_train_number(6201).with_stations(1, 2);
        let expr = build_match(&filters).unwrap();
        assert_eq!(
            &expr.clauses()[1..],
            &[
                Clause::Equals(Field::TrainNumber, 6201),
                Clause::Equals(Field::DepartureStationId, 1),
                Clause::Equals(Field::ArrivalStationId, 2),
            ]
        );
    }

    #[test]
    fn carrier_and_single_date() {
        let filters = FareFilters::new()
            .with_carriers(["sncf"])
            .with_dates(["2024-03-10"]);
        let expr = build_match(&filters).unwrap();

        assert_eq!(
            expr.clauses(),
            &[
                Clause::NotTrue(Field::IsError),
                Clause::OneOf(Field::Carrier, vec!["sncf".to_string()]),
                Clause::Within(Field::DepartureDate, window("2024-03-10")),
            ]
        );
        assert_eq!(
            expr.to_document(),
            json!({
                "is_error": { "$ne": true },
                "carrier": { "$in": ["sncf"] },
                "departure_date": {
                    "$gte": "2024-03-10T00:00:00.000",
                    "$lte": "2024-03-10T23:59:59.999",
                },
            })
        );
    }

    #[test]
    fn multiple_dates_are_ored() {
        let filters = FareFilters::new().with_dates(["2024-03-10", "2024-03-12", "2024-03-15"]);
        let expr = build_match(&filters).unwrap();

        let Clause::AnyOf(branches) = &expr.clauses()[1] else {
            panic!("expected an OR branch, got {:?}", expr.clauses());
        };
        assert_eq!(branches.len(), 3);
        assert_eq!(
            branches[1],
            Clause::Within(Field::DepartureDate, window("2024-03-12"))
        );

        let doc = expr.to_document();
        assert_eq!(doc["$or"].as_array().unwrap().len(), 3);
        assert!(doc.get("departure_date").is_none());
    }

    #[test]
    fn all_list_facets() {
        let filters = FareFilters::new()
            .with_classes(["1"])
            .with_discount_cards(["NONE", "AVANTAGE_JEUNE"])
            .with_flexibilities(["semi-flexible"]);
        let expr = build_match(&filters).unwrap();
        let doc = expr.to_document();
        assert_eq!(doc["travel_class"], json!({ "$in": ["1"] }));
        assert_eq!(
            doc["discount_card"],
            json!({ "$in": ["NONE", "AVANTAGE_JEUNE"] })
        );
        assert_eq!(doc["flexibility"], json!({ "$in": ["semi-flexible"] }));
    }

    #[test]
    fn invalid_date_rejected() {
        let filters = FareFilters::new().with_dates(["10/03/2024"]);
        assert_eq!(
            build_match(&filters),
            Err(PredicateError::InvalidDate("10/03/2024".to_string()))
        );
        let filters = FareFilters::new().with_dates(["2024-02-30"]);
        assert!(build_match(&filters).is_err());
    }
}
