//! CSV loading for the preprocessed sensor export.
//!
//! The file needs at least `timestamp`, `value_hr`, `value_eda` and `temp`
//! columns. Any failure here is fatal to dashboard construction.

use crate::data::types::{Channel, Reading};
use chrono::{DateTime, NaiveDate, NaiveDateTime, SubsecRound, TimeZone, Utc};
use std::io::Read;
use std::path::{Path, PathBuf};

/// Default name of the input file.
pub const DEFAULT_DATA_FILE: &str = "preprocessed_data.csv";

const TIMESTAMP_COLUMN: &str = "timestamp";

/// Errors raised while loading readings.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),
    #[error("missing required column `{0}`")]
    MissingColumn(&'static str),
    #[error("row {row}: invalid timestamp `{value}`")]
    InvalidTimestamp { row: usize, value: String },
    #[error("row {row}: invalid number `{value}` in column `{column}`")]
    InvalidNumber {
        row: usize,
        column: &'static str,
        value: String,
    },
    #[error("input has no header row")]
    Empty,
}

/// Load readings from a CSV file on disk.
pub fn load_csv(path: &Path) -> Result<Vec<Reading>, LoadError> {
    let content = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let readings = parse_csv(content.as_bytes())?;
    tracing::info!(path = %path.display(), count = readings.len(), "loaded readings");
    Ok(readings)
}

/// Parse readings from any CSV source.
///
/// Rows keep their file order. Data rows are numbered from 1.
pub fn parse_csv<R: Read>(source: R) -> Result<Vec<Reading>, LoadError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(source);

    let headers = reader.headers()?.clone();
    if headers.is_empty() {
        return Err(LoadError::Empty);
    }
    let column = |name: &'static str| -> Result<usize, LoadError> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or(LoadError::MissingColumn(name))
    };

    let ts_idx = column(TIMESTAMP_COLUMN)?;
    let channel_idx = [
        column(Channel::HeartRate.key())?,
        column(Channel::Eda.key())?,
        column(Channel::Temperature.key())?,
    ];

    let mut readings = Vec::new();
    for (i, record) in reader.records().enumerate() {
        let record = record?;
        let row = i + 1;

        let raw_ts = record.get(ts_idx).unwrap_or_default();
        let timestamp = parse_timestamp(raw_ts).ok_or_else(|| LoadError::InvalidTimestamp {
            row,
            value: raw_ts.to_string(),
        })?;

        let mut values = [0.0; 3];
        for ((slot, idx), channel) in values.iter_mut().zip(channel_idx).zip(Channel::ALL) {
            let raw = record.get(idx).unwrap_or_default();
            *slot = raw.parse::<f64>().map_err(|_| LoadError::InvalidNumber {
                row,
                column: channel.key(),
                value: raw.to_string(),
            })?;
        }

        readings.push(Reading::new(timestamp, values[0], values[1], values[2]));
    }

    if readings.is_empty() {
        tracing::warn!("CSV has a header but no data rows");
    }

    Ok(readings)
}

/// Parse a timestamp in one of the accepted export formats.
///
/// Naive date-times are taken as UTC. A bare integer is epoch milliseconds.
/// Sub-millisecond digits are truncated, since scales work in whole
/// milliseconds.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    parse_instant(s).map(|t| t.trunc_subsecs(3))
}

fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for fmt in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| Utc.from_utc_datetime(&naive));
    }

    s.parse::<i64>()
        .ok()
        .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
}
