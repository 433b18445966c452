//! Declarative match expressions for the fare store.

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{Map, Value, json};

/// Timestamp format used in rendered documents (local wall clock, millis).
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// A filterable field of a stored fare record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    IsError,
    Carrier,
    TravelClass,
    DiscountCard,
    Flexibility,
    DepartureDate,
    TrainNumber,
    DepartureStationId,
    ArrivalStationId,
}

impl Field {
    /// Name of the field in the store.
    pub fn name(&self) -> &'static str {
        match self {
            Field::IsError => "is_error",
            Field::Carrier => "carrier",
            Field::TravelClass => "travel_class",
            Field::DiscountCard => "discount_card",
            Field::Flexibility => "flexibility",
            Field::DepartureDate => "departure_date",
            Field::TrainNumber => "train_number",
            Field::DepartureStationId => "departure_station_id",
            Field::ArrivalStationId => "arrival_station_id",
        }
    }
}

/// A closed local-time window covering one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl DayWindow {
    /// `[00:00:00.000, 23:59:59.999]` on `date`.
    pub fn for_date(date: NaiveDate) -> Option<Self> {
        Some(Self {
            start: date.and_hms_milli_opt(0, 0, 0, 0)?,
            end: date.and_hms_milli_opt(23, 59, 59, 999)?,
        })
    }

    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        self.start <= ts && ts <= self.end
    }
}

/// One condition of a match expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    /// Field is anything but `true` (including missing).
    NotTrue(Field),
    /// Field equals one of the listed values.
    OneOf(Field, Vec<String>),
    /// Field equals the number.
    Equals(Field, u32),
    /// Timestamp field lies within the window.
    Within(Field, DayWindow),
    /// At least one of the nested clauses holds.
    AnyOf(Vec<Clause>),
}

/// Read access to the fields of a record, for in-memory evaluation.
pub trait FieldSource {
    fn flag(&self, field: Field) -> Option<bool>;
    fn text(&self, field: Field) -> Option<&str>;
    fn number(&self, field: Field) -> Option<u32>;
    fn timestamp(&self, field: Field) -> Option<NaiveDateTime>;
}

impl Clause {
    fn matches<R: FieldSource + ?Sized>(&self, record: &R) -> bool {
        match self {
            Clause::NotTrue(field) => record.flag(*field) != Some(true),
            Clause::OneOf(field, values) => record
                .text(*field)
                .is_some_and(|v| values.iter().any(|candidate| candidate == v)),
            Clause::Equals(field, value) => record.number(*field) == Some(*value),
            Clause::Within(field, window) => record
                .timestamp(*field)
                .is_some_and(|ts| window.contains(ts)),
            Clause::AnyOf(clauses) => clauses.iter().any(|c| c.matches(record)),
        }
    }

    /// Render as a `(key, value)` entry of a store document.
    fn to_entry(&self) -> (String, Value) {
        match self {
            Clause::NotTrue(field) => (field.name().to_string(), json!({ "$ne": true })),
            Clause::OneOf(field, values) => (field.name().to_string(), json!({ "$in": values })),
            Clause::Equals(field, value) => (field.name().to_string(), json!(value)),
            Clause::Within(field, window) => (
                field.name().to_string(),
                json!({
                    "$gte": window.start.format(TIMESTAMP_FORMAT).to_string(),
                    "$lte": window.end.format(TIMESTAMP_FORMAT).to_string(),
                }),
            ),
            Clause::AnyOf(clauses) => {
                let branches: Vec<Value> = clauses
                    .iter()
                    .map(|c| {
                        let (key, value) = c.to_entry();
                        let mut branch = Map::new();
                        branch.insert(key, value);
                        Value::Object(branch)
                    })
                    .collect();
                ("$or".to_string(), Value::Array(branches))
            }
        }
    }
}

/// A conjunction of clauses; the single condition handed to the fare store.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MatchExpression {
    clauses: Vec<Clause>,
}

impl MatchExpression {
    pub fn new(clauses: Vec<Clause>) -> Self {
        Self { clauses }
    }

    /// The ANDed clauses, in construction order.
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Evaluate against a record in memory.
    pub fn matches<R: FieldSource + ?Sized>(&self, record: &R) -> bool {
        self.clauses.iter().all(|c| c.matches(record))
    }

    /// Render as a document-store query object.
    ///
    /// Clauses become top-level keys (implicit AND); a multi-date branch
    /// becomes `$or`.
    pub fn to_document(&self) -> Value {
        let mut doc = Map::new();
        for clause in &self.clauses {
            let (key, value) = clause.to_entry();
            doc.insert(key, value);
        }
        Value::Object(doc)
    }
}
