//! Bar: one OHLC candle of a pair's price series.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// OHLC bar for a single pair on a single interval.
///
/// Series are always chronologically ascending; the last element is the
/// most recent (possibly still forming) bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    #[serde(default)]
    pub timestamp: Option<NaiveDateTime>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl Bar {
    pub fn new(open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            timestamp: None,
            open,
            high,
            low,
            close,
        }
    }

    /// Returns true if any price field is not a finite number (void bar).
    pub fn is_void(&self) -> bool {
        !(self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite())
    }

    /// Basic OHLC sanity check: high is the top of the candle, low the bottom.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.close > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bar() -> Bar {
        Bar::new(1.0850, 1.0872, 1.0841, 1.0866)
    }

    #[test]
    fn bar_is_sane() {
        assert!(sample_bar().is_sane());
    }

    #[test]
    fn bar_detects_void() {
        let mut bar = sample_bar();
        bar.close = f64::NAN;
        assert!(bar.is_void());
        assert!(!bar.is_sane());

        let mut bar = sample_bar();
        bar.high = f64::INFINITY;
        assert!(bar.is_void());
    }

    #[test]
    fn bar_detects_insane_high_low() {
        let mut bar = sample_bar();
        bar.high = 1.0800; // below low
        assert!(!bar.is_sane());
    }
}
