//! TradingView scanner provider.
//!
//! One POST per (symbol, interval) to the public scanner endpoint, asking for
//! the aggregate recommendation, close, parabolic SAR and ADX columns at the
//! interval's resolution. Null columns become absent reading fields. Handles
//! retries with exponential backoff and shares a circuit breaker across calls.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use super::circuit_breaker::CircuitBreaker;
use super::provider::{FetchError, MarketDataProvider};
use crate::domain::{Interval, Signal};
use crate::reading::IndicatorReading;

/// Column order of every scan request.
const COLUMNS: [&str; 4] = ["Recommend.All", "close", "SAR", "ADX"];

/// Connection settings for the scanner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingViewSettings {
    #[serde(default = "default_screener")]
    pub screener: String,
    #[serde(default = "default_exchange")]
    pub exchange: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

fn default_screener() -> String {
    "forex".into()
}

fn default_exchange() -> String {
    "FX_IDC".into()
}

fn default_base_url() -> String {
    "https://scanner.tradingview.com".into()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    2
}

fn default_base_delay_ms() -> u64 {
    500
}

impl Default for TradingViewSettings {
    fn default() -> Self {
        Self {
            screener: default_screener(),
            exchange: default_exchange(),
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ScanRequest {
    symbols: ScanSymbols,
    columns: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ScanSymbols {
    tickers: Vec<String>,
    query: ScanQuery,
}

#[derive(Debug, Serialize)]
struct ScanQuery {
    types: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ScanResponse {
    #[serde(default)]
    data: Vec<ScanRow>,
}

#[derive(Debug, Deserialize)]
struct ScanRow {
    s: String,
    d: Vec<Option<f64>>,
}

/// Column suffix selecting the interval's resolution; daily has none.
pub fn resolution(interval: Interval) -> &'static str {
    match interval {
        Interval::M1 => "1",
        Interval::M5 => "5",
        Interval::M15 => "15",
        Interval::M30 => "30",
        Interval::H1 => "60",
        Interval::H2 => "120",
        Interval::H4 => "240",
        Interval::D1 => "",
        Interval::W1 => "1W",
        Interval::MN => "1M",
    }
}

fn columns_for(interval: Interval) -> Vec<String> {
    let res = resolution(interval);
    COLUMNS
        .iter()
        .map(|c| {
            if res.is_empty() {
                (*c).to_string()
            } else {
                format!("{c}|{res}")
            }
        })
        .collect()
}

/// Turn a scan response into a reading; `ticker` is `EXCHANGE:SYMBOL`.
pub(crate) fn parse_scan(ticker: &str, resp: ScanResponse) -> Result<IndicatorReading, FetchError> {
    let row = resp
        .data
        .into_iter()
        .find(|r| r.s.eq_ignore_ascii_case(ticker))
        .ok_or_else(|| FetchError::SymbolNotFound {
            symbol: ticker.to_string(),
        })?;

    if row.d.len() != COLUMNS.len() {
        return Err(FetchError::ResponseFormatChanged(format!(
            "expected {} columns for {ticker}, got {}",
            COLUMNS.len(),
            row.d.len()
        )));
    }

    Ok(IndicatorReading {
        recommendation: row.d[0].map(Signal::from_recommendation),
        close: row.d[1],
        trend_stop: row.d[2],
        trend_strength: row.d[3],
        ..IndicatorReading::default()
    })
}

pub struct TradingViewProvider {
    client: reqwest::blocking::Client,
    settings: TradingViewSettings,
    circuit_breaker: Arc<CircuitBreaker>,
}

impl TradingViewProvider {
    pub fn new(
        settings: TradingViewSettings,
        circuit_breaker: Arc<CircuitBreaker>,
    ) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent("Mozilla/5.0 (X11; Linux x86_64) fxstrength")
            .build()
            .map_err(|e| FetchError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            settings,
            circuit_breaker,
        })
    }

    fn scan_url(&self) -> String {
        format!(
            "{}/{}/scan",
            self.settings.base_url.trim_end_matches('/'),
            self.settings.screener
        )
    }

    fn ticker(&self, symbol: &str) -> String {
        format!("{}:{}", self.settings.exchange, symbol)
    }

    /// One scan with retry and circuit breaker logic.
    fn scan(&self, symbol: &str, interval: Interval) -> Result<IndicatorReading, FetchError> {
        let ticker = self.ticker(symbol);
        let body = ScanRequest {
            symbols: ScanSymbols {
                tickers: vec![ticker.clone()],
                query: ScanQuery { types: vec![] },
            },
            columns: columns_for(interval),
        };
        let url = self.scan_url();
        let base_delay = Duration::from_millis(self.settings.base_delay_ms);
        let mut last_error = FetchError::Other(format!("no attempt made for {symbol}"));

        for attempt in 0..=self.settings.max_retries {
            if attempt > 0 {
                let delay = retry_delay(base_delay, attempt, &last_error);
                tracing::warn!(%symbol, %interval, attempt, error = %last_error, "retrying scan");
                std::thread::sleep(delay);
            }

            if !self.circuit_breaker.is_allowed() {
                return Err(FetchError::CircuitBreakerTripped);
            }

            let resp = match self.client.post(&url).json(&body).send() {
                Ok(resp) => resp,
                Err(e) => {
                    self.circuit_breaker.record_failure();
                    last_error = if e.is_timeout() {
                        FetchError::Timeout {
                            symbol: symbol.to_string(),
                        }
                    } else {
                        FetchError::NetworkUnreachable(e.to_string())
                    };
                    continue;
                }
            };

            let status = resp.status();
            if status == reqwest::StatusCode::FORBIDDEN {
                self.circuit_breaker.trip();
                return Err(FetchError::CircuitBreakerTripped);
            }
            if status == reqwest::StatusCode::UNAUTHORIZED {
                return Err(FetchError::AuthenticationRequired(
                    "scanner rejected the request".into(),
                ));
            }
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                self.circuit_breaker.record_failure();
                let retry_after_secs = resp
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(60);
                last_error = FetchError::RateLimited { retry_after_secs };
                continue;
            }
            if !status.is_success() {
                self.circuit_breaker.record_failure();
                last_error = FetchError::HttpStatus {
                    status: status.as_u16(),
                    symbol: symbol.to_string(),
                };
                continue;
            }

            let parsed: ScanResponse = resp.json().map_err(|e| {
                FetchError::ResponseFormatChanged(format!("failed to parse scan for {symbol}: {e}"))
            })?;
            self.circuit_breaker.record_success();
            return parse_scan(&ticker, parsed);
        }

        Err(last_error)
    }
}

/// Longest `retry-after` honoured before giving the attempt another go.
const MAX_RETRY_AFTER_SECS: u64 = 30;

/// Exponential backoff, stretched to the server's `retry-after` (capped) after a 429.
fn retry_delay(base_delay: Duration, attempt: u32, last_error: &FetchError) -> Duration {
    let backoff = base_delay * 2u32.pow(attempt.saturating_sub(1));
    match last_error {
        FetchError::RateLimited { retry_after_secs } => {
            backoff.max(Duration::from_secs((*retry_after_secs).min(MAX_RETRY_AFTER_SECS)))
        }
        _ => backoff,
    }
}

impl MarketDataProvider for TradingViewProvider {
    fn name(&self) -> &str {
        "tradingview"
    }

    fn supplies_bars(&self) -> bool {
        false
    }

    /// `Recommend.All` already rides on every scan, so a missing value would
    /// come back missing again; no second request is made.
    fn fetch_reading(&self, symbol: &str, interval: Interval) -> Result<IndicatorReading, FetchError> {
        self.scan(symbol, interval)
    }
}
