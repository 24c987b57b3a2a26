//! CSV file market-data adapter.
//!
//! Reads one file of `timestamp,open,high,low,close,volume` rows. Timestamps
//! are epoch milliseconds or `YYYY-MM-DD HH:MM:SS` (a `T` separator is also
//! accepted).

use crate::domain::error::CrosstraderError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;
use chrono::{DateTime, NaiveDateTime};
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::debug;

pub struct CsvAdapter {
    path: PathBuf,
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

pub(crate) fn data_err(reason: impl Into<String>) -> CrosstraderError {
    CrosstraderError::Data {
        reason: reason.into(),
    }
}

pub(crate) fn parse_field<T>(
    record: &csv::StringRecord,
    idx: usize,
    name: &str,
) -> Result<T, CrosstraderError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    record
        .get(idx)
        .ok_or_else(|| data_err(format!("missing {name} column")))?
        .trim()
        .parse()
        .map_err(|e| data_err(format!("invalid {name} value: {e}")))
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, CrosstraderError> {
    let raw = raw.trim();
    if let Ok(ms) = raw.parse::<i64>() {
        return DateTime::from_timestamp_millis(ms)
            .map(|dt| dt.naive_utc())
            .ok_or_else(|| data_err(format!("timestamp out of range: {ms}")));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|e| data_err(format!("invalid timestamp '{raw}': {e}")))
}

impl DataPort for CsvAdapter {
    fn fetch_bars(
        &self,
        symbol: &str,
        timeframe: &str,
        limit: usize,
    ) -> Result<Vec<OhlcvBar>, CrosstraderError> {
        let content = fs::read_to_string(&self.path)
            .map_err(|e| data_err(format!("failed to read {}: {}", self.path.display(), e)))?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| data_err(format!("CSV parse error: {e}")))?;

            let timestamp = parse_timestamp(
                record
                    .get(0)
                    .ok_or_else(|| data_err("missing timestamp column"))?,
            )?;

            bars.push(OhlcvBar {
                timestamp,
                open: parse_field(&record, 1, "open")?,
                high: parse_field(&record, 2, "high")?,
                low: parse_field(&record, 3, "low")?,
                close: parse_field(&record, 4, "close")?,
                volume: parse_field(&record, 5, "volume")?,
            });
        }

        bars.sort_by_key(|b| b.timestamp);
        if let Some(pair) = bars.windows(2).find(|w| w[0].timestamp == w[1].timestamp) {
            return Err(data_err(format!("duplicate bar at {}", pair[0].timestamp)));
        }

        let skip = bars.len().saturating_sub(limit);
        let bars = bars.split_off(skip);
        debug!(symbol, timeframe, count = bars.len(), "bars loaded");
        Ok(bars)
    }
}
