//! Conversion from fare store DTOs to domain types.
//!
//! A batch either converts completely or not at all: a single malformed
//! row would otherwise skew every statistic computed over the batch.

use crate::domain::{PricingObservation, Station, StationId};
use crate::journey::{Journey, aggregate};

use super::types::{FareRecord, StationRef};

/// Error during DTO to domain conversion.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    /// A row has no usable station identifier
    #[error("row {row}: missing {side} station id")]
    MissingStationId { row: usize, side: &'static str },
}

/// Convert a single stored row.
pub fn convert_record(row: usize, record: &FareRecord) -> Result<PricingObservation, ConversionError> {
    let departure_station = convert_station(row, "departure", &record.departure_station)?;
    let arrival_station = convert_station(row, "arrival", &record.arrival_station)?;

    Ok(PricingObservation {
        departure_station,
        arrival_station,
        travel_class: record.travel_class.clone(),
        discount_card: record.discount_card.clone(),
        carrier: record.carrier.clone(),
        flexibility: record.flexibility.clone(),
        train_name: record.train_name.clone(),
        train_number: record.train_number,
        departure_date: record.departure_date,
        min_price: record.min_price,
        avg_price: record.avg_price,
        max_price: record.max_price,
        is_sellable: record.is_sellable,
        unsellable_reason: record.unsellable_reason.clone(),
        days_before_departure: record.days_before_departure,
    })
}

fn convert_station(
    row: usize,
    side: &'static str,
    station: &StationRef,
) -> Result<Station, ConversionError> {
    let id = station
        .id
        .and_then(|id| StationId::new(id).ok())
        .ok_or(ConversionError::MissingStationId { row, side })?;
    Ok(Station::new(id, station.name.clone()))
}

/// Convert a whole batch, failing on the first malformed row.
pub fn convert_records(records: &[FareRecord]) -> Result<Vec<PricingObservation>, ConversionError> {
    records
        .iter()
        .enumerate()
        .map(|(row, record)| convert_record(row, record))
        .collect()
}

/// Convert a batch and group it into journeys.
pub fn aggregate_records(records: &[FareRecord]) -> Result<Vec<Journey>, ConversionError> {
    let observations = convert_records(records).inspect_err(|e| {
        tracing::warn!(rows = records.len(), error = %e, "rejecting fare batch");
    })?;
    Ok(aggregate(&observations))
}
