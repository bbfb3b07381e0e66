//! Bars from local CSV files.
//!
//! One file per (symbol, interval) at `{dir}/{SYMBOL}_{LABEL}.csv`, e.g.
//! `EURUSD_H4.csv`, with a header row `timestamp,open,high,low,close` and
//! rows in chronological order.

use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::bars::BarSource;
use super::provider::FetchError;
use crate::domain::{Bar, Interval};

#[derive(Debug, Clone)]
pub struct CsvBars {
    dir: PathBuf,
}

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(default)]
    timestamp: Option<String>,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
}

impl CsvBars {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, symbol: &str, interval: Interval) -> PathBuf {
        self.dir
            .join(format!("{}_{}.csv", symbol.to_ascii_uppercase(), interval.label()))
    }
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

impl BarSource for CsvBars {
    fn name(&self) -> &str {
        "csv"
    }

    fn bars(&self, symbol: &str, interval: Interval, count: usize) -> Result<Vec<Bar>, FetchError> {
        let path = self.path_for(symbol, interval);
        if !path.exists() {
            return Err(FetchError::NoData {
                symbol: symbol.to_string(),
                interval,
            });
        }

        let mut reader = csv::Reader::from_path(&path)
            .map_err(|e| FetchError::Io(format!("{}: {e}", path.display())))?;

        let mut bars = Vec::new();
        for (line, row) in reader.deserialize::<CsvRow>().enumerate() {
            let row = row.map_err(|e| {
                FetchError::ResponseFormatChanged(format!(
                    "{} row {}: {e}",
                    path.display(),
                    line + 1
                ))
            })?;
            let mut bar = Bar::new(row.open, row.high, row.low, row.close);
            bar.timestamp = row.timestamp.as_deref().and_then(parse_timestamp);
            bars.push(bar);
        }

        let start = bars.len().saturating_sub(count);
        Ok(bars.split_off(start))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write_fixture(dir: &Path, name: &str, body: &str) {
        fs::write(dir.join(name), body).unwrap();
    }

    #[test]
    fn reads_tail_of_file() {
        let tmp = tempfile::tempdir().unwrap();
        write_fixture(
            tmp.path(),
            "EURUSD_H1.csv",
            "timestamp,open,high,low,close\n\
             2024-01-02 00:00:00,1.10,1.11,1.09,1.105\n\
             2024-01-02 01:00:00,1.105,1.12,1.10,1.115\n\
             2024-01-02 02:00:00,1.115,1.13,1.11,1.125\n",
        );

        let bars = CsvBars::new(tmp.path()).bars("eurusd", Interval::H1, 2).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[1].close, 1.125);
        assert_eq!(
            bars[0].timestamp,
            NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(1, 0, 0)
        );
    }

    #[test]
    fn missing_file_is_no_data() {
        let tmp = tempfile::tempdir().unwrap();
        let err = CsvBars::new(tmp.path()).bars("GBPUSD", Interval::D1, 10).unwrap_err();
        assert!(matches!(err, FetchError::NoData { .. }));
    }

    #[test]
    fn malformed_row_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        write_fixture(
            tmp.path(),
            "USDJPY_D1.csv",
            "timestamp,open,high,low,close\n2024-01-02,150,151,abc,150.5\n",
        );
        let err = CsvBars::new(tmp.path()).bars("USDJPY", Interval::D1, 10).unwrap_err();
        assert!(matches!(err, FetchError::ResponseFormatChanged(_)));
    }

    #[test]
    fn date_only_timestamps_parse() {
        assert_eq!(
            parse_timestamp("2024-03-05"),
            NaiveDate::from_ymd_opt(2024, 3, 5).unwrap().and_hms_opt(0, 0, 0)
        );
        assert_eq!(parse_timestamp("yesterday"), None);
    }
}
