//! Frozen readings, replayed without network access.
//!
//! A replay file is a JSON array of records, one per (symbol, interval):
//!
//! ```json
//! [
//!   {"symbol": "EURUSD", "interval": "H1", "reading": {"close": 1.085, "trend_stop": 1.082, "trend_strength": 27.0}},
//!   {"symbol": "USDJPY", "interval": "H1", "error": {"timeout": {"symbol": "USDJPY"}}}
//! ]
//! ```
//!
//! Snapshots captured from a live provider can be replayed later to rebuild
//! the exact same matrix and decision log. Failures keep their `FetchError`
//! kind, so a replayed failure reads exactly like the live one.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use super::provider::{FetchError, MarketDataProvider};
use crate::domain::{Interval, Pair, Signal};
use crate::reading::IndicatorReading;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayRecord {
    pub symbol: String,
    pub interval: Interval,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reading: Option<IndicatorReading>,
    /// Secondary recommendation returned by `fetch_recommendation`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recommendation: Option<Signal>,
    /// Replayed as a fetch failure when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<FetchError>,
}

#[derive(Debug, Clone, Default)]
struct Entry {
    reading: Option<IndicatorReading>,
    recommendation: Option<Signal>,
    error: Option<FetchError>,
}

#[derive(Debug, Clone, Default)]
pub struct ReplayProvider {
    entries: BTreeMap<(String, Interval), Entry>,
    supplies_bars: bool,
}

impl ReplayProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: Vec<ReplayRecord>) -> Self {
        let mut provider = Self::new();
        for rec in records {
            if rec.reading.as_ref().is_some_and(|r| !r.bars.is_empty()) {
                provider.supplies_bars = true;
            }
            provider.entries.insert(
                (rec.symbol.to_ascii_uppercase(), rec.interval),
                Entry {
                    reading: rec.reading,
                    recommendation: rec.recommendation,
                    error: rec.error,
                },
            );
        }
        provider
    }

    pub fn from_json(json: &str) -> Result<Self, FetchError> {
        let records: Vec<ReplayRecord> = serde_json::from_str(json)
            .map_err(|e| FetchError::ResponseFormatChanged(format!("invalid replay file: {e}")))?;
        Ok(Self::from_records(records))
    }

    pub fn from_path(path: &Path) -> Result<Self, FetchError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| FetchError::Io(format!("{}: {e}", path.display())))?;
        Self::from_json(&json)
    }

    pub fn insert_reading(&mut self, symbol: &str, interval: Interval, reading: IndicatorReading) {
        if !reading.bars.is_empty() {
            self.supplies_bars = true;
        }
        let entry = self.entry(symbol, interval);
        entry.reading = Some(reading);
        entry.error = None;
    }

    pub fn insert_recommendation(&mut self, symbol: &str, interval: Interval, signal: Signal) {
        self.entry(symbol, interval).recommendation = Some(signal);
    }

    pub fn insert_failure(&mut self, symbol: &str, interval: Interval, error: FetchError) {
        let entry = self.entry(symbol, interval);
        entry.reading = None;
        entry.error = Some(error);
    }

    fn entry(&mut self, symbol: &str, interval: Interval) -> &mut Entry {
        self.entries
            .entry((symbol.to_ascii_uppercase(), interval))
            .or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn records(&self) -> Vec<ReplayRecord> {
        self.entries
            .iter()
            .map(|((symbol, interval), e)| ReplayRecord {
                symbol: symbol.clone(),
                interval: *interval,
                reading: e.reading.clone(),
                recommendation: e.recommendation,
                error: e.error.clone(),
            })
            .collect()
    }

    pub fn to_json(&self) -> Result<String, FetchError> {
        serde_json::to_string_pretty(&self.records())
            .map_err(|e| FetchError::Other(format!("failed to serialize replay: {e}")))
    }

    /// Record everything `source` returns for the given pairs and intervals.
    ///
    /// Failures are captured as failure records, so the replay reproduces them.
    pub fn capture<P: MarketDataProvider + ?Sized>(
        source: &P,
        pairs: &[Pair],
        intervals: &[Interval],
    ) -> Self {
        let mut replay = Self::new();
        for &interval in intervals {
            for pair in pairs {
                let symbol = pair.symbol();
                match source.fetch_reading(symbol, interval) {
                    Ok(reading) => {
                        let needs_fallback = reading.recommendation.is_none();
                        replay.insert_reading(symbol, interval, reading);
                        if needs_fallback {
                            if let Ok(Some(sig)) = source.fetch_recommendation(symbol, interval) {
                                replay.insert_recommendation(symbol, interval, sig);
                            }
                        }
                    }
                    Err(e) => replay.insert_failure(symbol, interval, e),
                }
            }
        }
        tracing::info!(provider = source.name(), records = replay.len(), "captured replay");
        replay
    }
}

impl MarketDataProvider for ReplayProvider {
    fn name(&self) -> &str {
        "replay"
    }

    fn supplies_bars(&self) -> bool {
        self.supplies_bars
    }

    fn fetch_reading(&self, symbol: &str, interval: Interval) -> Result<IndicatorReading, FetchError> {
        let key = (symbol.to_ascii_uppercase(), interval);
        match self.entries.get(&key) {
            Some(Entry {
                error: Some(err), ..
            }) => Err(err.clone()),
            Some(Entry {
                reading: Some(r), ..
            }) => Ok(r.clone()),
            _ => Err(FetchError::NoData {
                symbol: symbol.to_string(),
                interval,
            }),
        }
    }

    fn fetch_recommendation(
        &self,
        symbol: &str,
        interval: Interval,
    ) -> Result<Option<Signal>, FetchError> {
        let key = (symbol.to_ascii_uppercase(), interval);
        Ok(self.entries.get(&key).and_then(|e| e.recommendation))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replays_readings_and_failures() {
        let json = r#"[
            {"symbol": "EURUSD", "interval": "H1", "reading": {"close": 1.085, "trend_stop": 1.082, "trend_strength": 27.0}},
            {"symbol": "USDJPY", "interval": "H1", "error": {"timeout": {"symbol": "USDJPY"}}}
        ]"#;
        let p = ReplayProvider::from_json(json).unwrap();

        let r = p.fetch_reading("EURUSD", Interval::H1).unwrap();
        assert_eq!(r.close(), Some(1.085));
        assert_eq!(
            p.fetch_reading("USDJPY", Interval::H1),
            Err(FetchError::Timeout {
                symbol: "USDJPY".into()
            })
        );
        assert!(matches!(
            p.fetch_reading("EURUSD", Interval::D1),
            Err(FetchError::NoData { .. })
        ));
        assert!(!p.supplies_bars());
    }

    #[test]
    fn json_round_trip_preserves_records() {
        let mut p = ReplayProvider::new();
        p.insert_reading("EURUSD", Interval::H4, IndicatorReading::from_indicators(1.1, 1.09, 30.0));
        p.insert_recommendation("EURUSD", Interval::H4, Signal::Sell);
        p.insert_failure(
            "GBPUSD",
            Interval::H4,
            FetchError::HttpStatus {
                status: 500,
                symbol: "GBPUSD".into(),
            },
        );
        p.insert_failure("AUDUSD", Interval::H4, FetchError::CircuitBreakerTripped);

        let back = ReplayProvider::from_json(&p.to_json().unwrap()).unwrap();
        assert_eq!(back.records(), p.records());
        assert_eq!(
            back.fetch_recommendation("EURUSD", Interval::H4),
            Ok(Some(Signal::Sell))
        );
    }

    #[test]
    fn capture_records_failures_too() {
        let mut live = ReplayProvider::new();
        live.insert_reading("EURUSD", Interval::H1, IndicatorReading::from_indicators(1.1, 1.0, 30.0));
        let pairs = vec![
            Pair::from_symbol("EURUSD").unwrap(),
            Pair::from_symbol("GBPUSD").unwrap(),
        ];

        let captured = ReplayProvider::capture(&live, &pairs, &[Interval::H1]);
        assert_eq!(captured.len(), 2);
        assert!(captured.fetch_reading("EURUSD", Interval::H1).is_ok());
        assert!(captured.fetch_reading("GBPUSD", Interval::H1).is_err());
    }

    #[test]
    fn captured_failure_replays_with_its_original_kind() {
        let mut live = ReplayProvider::new();
        let timeout = FetchError::Timeout {
            symbol: "USDJPY".into(),
        };
        live.insert_failure("USDJPY", Interval::H1, timeout.clone());
        let pairs = vec![Pair::from_symbol("USDJPY").unwrap()];

        let captured = ReplayProvider::capture(&live, &pairs, &[Interval::H1]);
        let back = ReplayProvider::from_json(&captured.to_json().unwrap()).unwrap();

        let replayed = back.fetch_reading("USDJPY", Interval::H1).unwrap_err();
        assert_eq!(replayed, timeout);
        assert_eq!(replayed.to_string(), "request for USDJPY timed out");
    }
}
