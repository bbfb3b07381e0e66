//! Discrete trade signal.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Directional call for one (pair, timeframe).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Signal {
    Buy,
    Sell,
    Neutral,
}

/// Score at or above which an aggregate recommendation counts as a buy.
pub const RECOMMENDATION_BUY_LEVEL: f64 = 0.1;

impl Signal {
    /// Map an aggregate recommendation score in `[-1, 1]` onto a signal.
    ///
    /// Strong buy/sell bands collapse onto `Buy`/`Sell`. Non-finite scores are neutral.
    pub fn from_recommendation(score: f64) -> Self {
        if !score.is_finite() {
            Signal::Neutral
        } else if score >= RECOMMENDATION_BUY_LEVEL {
            Signal::Buy
        } else if score <= -RECOMMENDATION_BUY_LEVEL {
            Signal::Sell
        } else {
            Signal::Neutral
        }
    }

    /// Ledger contribution to the base currency.
    pub fn base_delta(self) -> i32 {
        match self {
            Signal::Buy => 1,
            Signal::Sell => -1,
            Signal::Neutral => 0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Signal::Buy => "BUY",
            Signal::Sell => "SELL",
            Signal::Neutral => "NEUTRAL",
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
