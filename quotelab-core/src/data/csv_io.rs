//! CSV bar ingestion — the file-based market-data boundary.
//!
//! Expected header: `timestamp,open,high,low,close,volume` with RFC 3339
//! timestamps. Validation happens in `BarSeries::new`; a malformed row fails
//! the whole load rather than being dropped.

use std::io::Read;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::{Bar, BarSeries};
use crate::error::DataError;

#[derive(Debug, Deserialize)]
struct CsvBarRow {
    timestamp: DateTime<Utc>,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

/// Read a bar series from any CSV reader.
pub fn read_bars<R: Read>(reader: R) -> Result<BarSeries, DataError> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut bars = Vec::new();
    for row in csv_reader.deserialize::<CsvBarRow>() {
        let row = row.map_err(|e| DataError::Csv(e.to_string()))?;
        bars.push(Bar::new(
            row.timestamp,
            row.open,
            row.high,
            row.low,
            row.close,
            row.volume,
        ));
    }
    BarSeries::new(bars)
}

/// Read a bar series from a CSV file on disk.
pub fn read_bars_from_path(path: &Path) -> Result<BarSeries, DataError> {
    let file = std::fs::File::open(path)
        .map_err(|e| DataError::Csv(format!("{}: {e}", path.display())))?;
    read_bars(file)
}
