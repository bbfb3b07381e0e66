//! Market-data provider trait and structured fetch errors.
//!
//! The `MarketDataProvider` trait abstracts over indicator sources (TradingView
//! scanner, locally computed bars, replayed snapshots) so the assembler can be
//! driven by live data or frozen fixtures alike.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::domain::{Interval, Signal};
use crate::reading::IndicatorReading;

/// Why a reading could not be produced.
///
/// Every variant is recovered at the pair level: the assembler turns it into
/// a NEUTRAL signal and records the message. Serializable so replay files
/// keep the exact failure a live provider returned.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("request for {symbol} timed out")]
    Timeout { symbol: String },

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("HTTP {status} for {symbol}")]
    HttpStatus { status: u16, symbol: String },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("no data for {symbol} on {interval}")]
    NoData { symbol: String, interval: Interval },

    #[error("hard stop: provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("I/O error: {0}")]
    Io(String),

    #[error("data error: {0}")]
    Other(String),
}

/// Source of indicator readings for (symbol, interval).
///
/// Absent indicator fields are reported as `None` inside the reading, not as
/// errors; `Err` is reserved for the whole request failing.
pub trait MarketDataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// True if readings carry a bar series.
    fn supplies_bars(&self) -> bool;

    fn fetch_reading(&self, symbol: &str, interval: Interval) -> Result<IndicatorReading, FetchError>;

    /// Secondary aggregate recommendation, consulted only as a fallback.
    fn fetch_recommendation(
        &self,
        _symbol: &str,
        _interval: Interval,
    ) -> Result<Option<Signal>, FetchError> {
        Ok(None)
    }
}

impl<P: MarketDataProvider + ?Sized> MarketDataProvider for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn supplies_bars(&self) -> bool {
        (**self).supplies_bars()
    }

    fn fetch_reading(&self, symbol: &str, interval: Interval) -> Result<IndicatorReading, FetchError> {
        (**self).fetch_reading(symbol, interval)
    }

    fn fetch_recommendation(
        &self,
        symbol: &str,
        interval: Interval,
    ) -> Result<Option<Signal>, FetchError> {
        (**self).fetch_recommendation(symbol, interval)
    }
}

impl<P: MarketDataProvider + ?Sized> MarketDataProvider for Arc<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn supplies_bars(&self) -> bool {
        (**self).supplies_bars()
    }

    fn fetch_reading(&self, symbol: &str, interval: Interval) -> Result<IndicatorReading, FetchError> {
        (**self).fetch_reading(symbol, interval)
    }

    fn fetch_recommendation(
        &self,
        symbol: &str,
        interval: Interval,
    ) -> Result<Option<Signal>, FetchError> {
        (**self).fetch_recommendation(symbol, interval)
    }
}
