//! File-backed fare source for development and tests.
//!
//! Loads a JSON array of fare records and answers queries by evaluating
//! the match expression in memory.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::RwLock;

use super::error::FareError;
use super::types::FareRecord;
use super::{FareQuery, FareSource};

/// Fare source serving records from a JSON file.
#[derive(Clone)]
pub struct FileFareSource {
    path: PathBuf,
    records: Arc<RwLock<Arc<Vec<FareRecord>>>>,
}

impl FileFareSource {
    /// Load records from `path`.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, FareError> {
        let path = path.into();
        let records = load(&path)?;
        tracing::info!(path = %path.display(), rows = records.len(), "loaded fare data");

        Ok(Self {
            path,
            records: Arc::new(RwLock::new(Arc::new(records))),
        })
    }

    /// Number of records loaded.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the file held no records.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Reload records from disk (useful for development).
    ///
    /// On failure the current records are kept.
    pub async fn reload(&self) -> Result<usize, FareError> {
        let records = load(&self.path)?;
        let count = records.len();
        *self.records.write().await = Arc::new(records);
        Ok(count)
    }
}

impl FareSource for FileFareSource {
    async fn fetch(&self, query: &FareQuery) -> Result<Vec<FareRecord>, FareError> {
        let records = self.records.read().await.clone();
        Ok(records
            .iter()
            .filter(|r| query.accepts(*r))
            .cloned()
            .collect())
    }
}

fn load(path: &Path) -> Result<Vec<FareRecord>, FareError> {
    let json = std::fs::read_to_string(path)
        .map_err(|e| FareError::Data(format!("failed to read {}: {e}", path.display())))?;
    serde_json::from_str(&json).map_err(|e| FareError::Json {
        message: format!("failed to parse {}: {e}", path.display()),
        body: None,
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use tempfile::tempdir;

    use super::super::types::fixtures::record;
    use super::*;
    use crate::predicate::{FareFilters, build_match};

    fn write_records(dir: &Path, records: &[FareRecord]) -> PathBuf {
        let path = dir.join("fares.json");
        std::fs::write(&path, serde_json::to_string(records).unwrap()).unwrap();
        path
    }

    #[tokio::test]
    async fn filters_by_predicate() {
        let dir = tempdir().unwrap();
        let mut errored = record(1, 2, "sncf", 10);
        errored.is_error = true;
        let path = write_records(
            dir.path(),
            &[
                record(1, 2, "sncf", 10),
                record(1, 2, "ouigo", 10),
                record(1, 2, "sncf", 11),
                errored,
            ],
        );
        let source = FileFareSource::new(&path).unwrap();
        assert_eq!(source.len().await, 4);

        let filters = FareFilters::new()
            .with_carriers(["sncf"])
            .with_dates(["2024-03-10"]);
        let query = FareQuery::new(build_match(&filters).unwrap());
        let rows = source.fetch(&query).await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].carrier, "sncf");
        assert!(!rows[0].is_error);
    }

    #[tokio::test]
    async fn date_range_bounds() {
        let dir = tempdir().unwrap();
        let path = write_records(
            dir.path(),
            &[record(1, 2, "sncf", 9), record(1, 2, "sncf", 10), record(1, 2, "sncf", 12)],
        );
        let source = FileFareSource::new(&path).unwrap();

        let query = FareQuery::new(build_match(&FareFilters::default()).unwrap()).with_date_range(
            NaiveDate::from_ymd_opt(2024, 3, 10),
            NaiveDate::from_ymd_opt(2024, 3, 11),
        );
        let rows = source.fetch(&query).await.unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn reload_picks_up_changes() {
        let dir = tempdir().unwrap();
        let path = write_records(dir.path(), &[record(1, 2, "sncf", 10)]);
        let source = FileFareSource::new(&path).unwrap();

        write_records(dir.path(), &[record(1, 2, "sncf", 10), record(3, 4, "sncf", 10)]);
        assert_eq!(source.reload().await.unwrap(), 2);
        assert_eq!(source.len().await, 2);
    }

    #[tokio::test]
    async fn empty_file() {
        let dir = tempdir().unwrap();
        let path = write_records(dir.path(), &[]);
        let source = FileFareSource::new(&path).unwrap();
        assert!(source.is_empty().await);

        write_records(dir.path(), &[record(1, 2, "sncf", 10)]);
        source.reload().await.unwrap();
        assert!(!source.is_empty().await);
    }

    #[test]
    fn missing_file_is_error() {
        let result = FileFareSource::new("/nonexistent/fares.json");
        assert!(matches!(result, Err(FareError::Data(_))));
    }
}
