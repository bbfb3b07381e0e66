//! Immutable run configuration: pair basket, per-timeframe policies,
//! classifier and remark selection.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use thiserror::Error;

use crate::classifier::ClassifierKind;
use crate::domain::{CurrencyCode, DomainError, Interval, Pair};
use crate::remark::RemarkPolicy;

/// Tunable parameters of one timeframe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeframePolicy {
    pub interval: Interval,
    /// Minimum trend strength (ADX) for a directional reading to be trusted.
    #[serde(default = "default_strength_threshold")]
    pub strength_threshold: f64,
    /// Minimum |close - trend stop| for a directional reading to be trusted.
    #[serde(default)]
    pub proximity_buffer: f64,
    /// Bars back for breakout and percentage-change comparison.
    #[serde(default = "default_lookback")]
    pub lookback: usize,
    /// Bars on each side confirming a fractal swing.
    #[serde(default = "default_swing_window")]
    pub swing_window: usize,
    /// Percentage move needed for a momentum call.
    #[serde(default = "default_pct_threshold")]
    pub pct_threshold: f64,
}

fn default_strength_threshold() -> f64 {
    20.0
}

fn default_lookback() -> usize {
    20
}

fn default_swing_window() -> usize {
    2
}

fn default_pct_threshold() -> f64 {
    0.25
}

impl TimeframePolicy {
    pub fn new(interval: Interval) -> Self {
        Self {
            interval,
            strength_threshold: default_strength_threshold(),
            proximity_buffer: 0.0,
            lookback: default_lookback(),
            swing_window: default_swing_window(),
            pct_threshold: default_pct_threshold(),
        }
    }

    pub fn with_strength_threshold(mut self, threshold: f64) -> Self {
        self.strength_threshold = threshold;
        self
    }

    pub fn with_proximity_buffer(mut self, buffer: f64) -> Self {
        self.proximity_buffer = buffer;
        self
    }

    pub fn with_lookback(mut self, lookback: usize) -> Self {
        self.lookback = lookback;
        self
    }

    pub fn with_swing_window(mut self, window: usize) -> Self {
        self.swing_window = window;
        self
    }

    pub fn with_pct_threshold(mut self, pct: f64) -> Self {
        self.pct_threshold = pct;
        self
    }

    /// Bars a bar-series classifier may need for this policy.
    pub fn bars_required(&self) -> usize {
        (self.lookback + 1).max(2 * self.swing_window + 1)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let label = self.interval;
        for (field, value) in [
            ("strength_threshold", self.strength_threshold),
            ("proximity_buffer", self.proximity_buffer),
            ("pct_threshold", self.pct_threshold),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidParameter {
                    interval: label,
                    field,
                    reason: format!("must be a finite, non-negative number (got {value})"),
                });
            }
        }
        if self.lookback == 0 {
            return Err(ConfigError::InvalidParameter {
                interval: label,
                field: "lookback",
                reason: "must be >= 1".into(),
            });
        }
        if self.swing_window == 0 {
            return Err(ConfigError::InvalidParameter {
                interval: label,
                field: "swing_window",
                reason: "must be >= 1".into(),
            });
        }
        Ok(())
    }
}

/// Everything the matrix assembler needs for one run.
///
/// Omitted fields take the values of [`MatrixConfig::default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatrixConfig {
    pub pairs: Vec<Pair>,
    /// Column order of the output table.
    pub timeframes: Vec<TimeframePolicy>,
    pub classifier: ClassifierKind,
    pub remark: RemarkPolicy,
    /// Currencies listed here lead the table in this order; the rest follow alphabetically.
    pub display_order: Vec<CurrencyCode>,
}

/// The nine-pair majors basket on H1/H4/D1.
pub const DEFAULT_PAIRS: [&str; 9] = [
    "EURUSD", "GBPUSD", "USDJPY", "AUDUSD", "NZDUSD", "USDCAD", "EURJPY", "EURGBP", "GBPJPY",
];

/// Display order used by the default configuration.
pub const DEFAULT_DISPLAY_ORDER: [&str; 8] = ["USD", "EUR", "GBP", "JPY", "AUD", "NZD", "CAD", "CHF"];

impl Default for MatrixConfig {
    fn default() -> Self {
        let pairs = DEFAULT_PAIRS
            .iter()
            .filter_map(|s| Pair::from_symbol(s).ok())
            .collect();
        let display_order = DEFAULT_DISPLAY_ORDER
            .iter()
            .filter_map(|c| CurrencyCode::new(c).ok())
            .collect();
        Self {
            pairs,
            timeframes: vec![
                TimeframePolicy::new(Interval::H1).with_pct_threshold(0.1),
                TimeframePolicy::new(Interval::H4).with_pct_threshold(0.25),
                TimeframePolicy::new(Interval::D1).with_pct_threshold(0.5),
            ],
            classifier: ClassifierKind::default(),
            remark: RemarkPolicy::default(),
            display_order,
        }
    }
}

impl MatrixConfig {
    /// Union of all currencies in the pair basket.
    pub fn currencies(&self) -> BTreeSet<CurrencyCode> {
        self.pairs
            .iter()
            .flat_map(|p| [p.base().clone(), p.quote().clone()])
            .collect()
    }

    pub fn intervals(&self) -> Vec<Interval> {
        self.timeframes.iter().map(|t| t.interval).collect()
    }

    /// Largest bar count any timeframe policy may need.
    pub fn max_bars_required(&self) -> usize {
        self.timeframes
            .iter()
            .map(TimeframePolicy::bars_required)
            .max()
            .unwrap_or(0)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pairs.is_empty() {
            return Err(ConfigError::NoPairs);
        }
        if self.timeframes.is_empty() {
            return Err(ConfigError::NoTimeframes);
        }

        let mut symbols = HashSet::new();
        for pair in &self.pairs {
            if !symbols.insert(pair.symbol()) {
                return Err(ConfigError::DuplicatePair(pair.symbol().to_string()));
            }
        }

        let mut intervals = HashSet::new();
        for tf in &self.timeframes {
            if !intervals.insert(tf.interval) {
                return Err(ConfigError::DuplicateTimeframe(tf.interval));
            }
            tf.validate()?;
        }

        self.remark.validate()?;
        Ok(())
    }
}

/// Configuration errors, raised before any data is fetched.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration lists no currency pairs")]
    NoPairs,

    #[error("configuration lists no timeframes")]
    NoTimeframes,

    #[error("pair {0} is configured more than once")]
    DuplicatePair(String),

    #[error("timeframe {0} is configured more than once")]
    DuplicateTimeframe(Interval),

    #[error("timeframe {interval}: {field} {reason}")]
    InvalidParameter {
        interval: Interval,
        field: &'static str,
        reason: String,
    },

    #[error("remark policy: {0}")]
    InvalidRemarkPolicy(String),

    #[error(transparent)]
    Domain(#[from] DomainError),
}
