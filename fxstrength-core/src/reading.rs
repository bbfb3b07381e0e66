//! Indicator readings: the raw numeric inputs of one signal decision.

use serde::{Deserialize, Serialize};

use crate::domain::{Bar, Signal};

/// One sample of inputs for a single (pair, interval).
///
/// Every field may be absent. Non-finite numbers count as absent; use the
/// accessor methods rather than the raw fields when classifying.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorReading {
    #[serde(default)]
    pub close: Option<f64>,
    /// Trend-stop level (parabolic SAR).
    #[serde(default)]
    pub trend_stop: Option<f64>,
    /// Trend-strength value (ADX).
    #[serde(default)]
    pub trend_strength: Option<f64>,
    /// Chronologically ascending bar series.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bars: Vec<Bar>,
    /// Aggregate recommendation from the provider, used only as a fallback.
    #[serde(default)]
    pub recommendation: Option<Signal>,
}

impl IndicatorReading {
    /// A reading with every field absent.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_indicators(close: f64, trend_stop: f64, trend_strength: f64) -> Self {
        Self {
            close: Some(close),
            trend_stop: Some(trend_stop),
            trend_strength: Some(trend_strength),
            ..Self::default()
        }
    }

    pub fn from_bars(bars: Vec<Bar>) -> Self {
        Self {
            close: bars.last().map(|b| b.close),
            bars,
            ..Self::default()
        }
    }

    pub fn with_recommendation(mut self, recommendation: Signal) -> Self {
        self.recommendation = Some(recommendation);
        self
    }

    pub fn close(&self) -> Option<f64> {
        finite(self.close)
    }

    pub fn trend_stop(&self) -> Option<f64> {
        finite(self.trend_stop)
    }

    pub fn trend_strength(&self) -> Option<f64> {
        finite(self.trend_strength)
    }
}

fn finite(v: Option<f64>) -> Option<f64> {
    v.filter(|x| x.is_finite())
}
