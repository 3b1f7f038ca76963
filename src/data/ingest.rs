//! Ingestion boundary: dataset sources and a CSV reference source.
//!
//! Spreadsheet readers and other format-specific loaders live behind
//! [`DatasetSource`]; the engine only consumes the resulting
//! [`TelemetryDataset`]. [`CsvSource`] is a minimal reference implementation
//! used by the demos and tests.

use std::fs;
use std::path::Path;

use crate::data::dataset::{DatasetBuilder, TelemetryDataset, TelemetrySample};
use crate::error::LoadError;

/// Supplies a fully-populated dataset for a file path.
pub trait DatasetSource {
    fn load(&self, path: &Path) -> Result<TelemetryDataset, LoadError>;
}

// Column cap inherited from the trace table layout (timestamp + 8 channels).
const MAX_DATA_COLUMNS: usize = 9;

/// Delimiter-separated telemetry table reader.
///
/// Table conventions:
/// - first row: channel names (blank names become `Channel N`)
/// - optional second row: units, detected by a non-numeric first cell
/// - data rows: timestamp in milliseconds in the first column, then channel
///   values; blank or non-numeric cells leave that channel undefined for the
///   sample, rows with a non-numeric timestamp are skipped
#[derive(Debug, Clone)]
pub struct CsvSource {
    pub delimiter: char,
}

impl Default for CsvSource {
    fn default() -> Self {
        Self { delimiter: ',' }
    }
}

impl DatasetSource for CsvSource {
    fn load(&self, path: &Path) -> Result<TelemetryDataset, LoadError> {
        let text = fs::read_to_string(path).map_err(|source| LoadError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;

        let rows: Vec<Vec<&str>> = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(|line| line.split(self.delimiter).map(str::trim).collect())
            .collect();

        if rows.len() < 2 || rows[0].len() < 2 {
            return Err(LoadError::FormatInvalid(
                "the table must have at least 2 rows and 2 columns".to_string(),
            ));
        }

        let cols = rows[0].len().min(MAX_DATA_COLUMNS);
        let names: Vec<String> = rows[0][1..cols]
            .iter()
            .enumerate()
            .map(|(i, cell)| {
                if cell.is_empty() {
                    format!("Channel {}", i + 1)
                } else {
                    cell.to_string()
                }
            })
            .collect();

        let has_unit_row = rows[1]
            .first()
            .map_or(false, |cell| cell.parse::<f64>().is_err());
        let units: Vec<String> = (0..names.len())
            .map(|i| {
                if has_unit_row {
                    rows[1].get(i + 1).map(|c| c.to_string()).unwrap_or_default()
                } else {
                    String::new()
                }
            })
            .collect();

        let mut builder = DatasetBuilder::new();
        for (name, unit) in names.iter().zip(&units) {
            builder = builder.channel(name, unit);
        }

        let data_rows = &rows[if has_unit_row { 2 } else { 1 }..];
        let mut skipped = 0usize;
        for row in data_rows {
            let Some(first) = row.first() else { continue };
            let Ok(timestamp_ms) = first.parse::<f64>() else {
                skipped += 1;
                continue;
            };
            let mut sample = TelemetrySample::new(timestamp_ms / 1000.0);
            for (i, name) in names.iter().enumerate() {
                if let Some(cell) = row.get(i + 1) {
                    if let Ok(value) = cell.parse::<f64>() {
                        sample = sample.with_value(name, value);
                    }
                }
            }
            builder = builder.sample(sample);
        }
        if skipped > 0 {
            log::debug!("{skipped} rows skipped (non-numeric timestamp)");
        }

        Ok(builder.build())
    }
}
