//! Range breakout: the latest bar against the preceding `lookback` bars.
//!
//! BUY when the latest high exceeds the highest high of the window, SELL when
//! the latest low undercuts the lowest low. The window excludes the latest
//! bar. An outside bar breaking both sides reads as BUY.

use super::{all_finite, px, Basis, Classification, SignalClassifier};
use crate::config::TimeframePolicy;
use crate::domain::Signal;
use crate::reading::IndicatorReading;

#[derive(Debug, Clone, Copy, Default)]
pub struct BreakoutClassifier;

impl SignalClassifier for BreakoutClassifier {
    fn name(&self) -> &str {
        "breakout"
    }

    fn requires_bars(&self) -> bool {
        true
    }

    fn classify(&self, reading: &IndicatorReading, policy: &TimeframePolicy) -> Classification {
        let bars = &reading.bars;
        let needed = policy.lookback + 1;
        if bars.len() < needed {
            return Classification::neutral(
                Basis::InsufficientHistory,
                format!("{} bars, breakout needs {needed}", bars.len()),
            );
        }

        let recent = &bars[bars.len() - needed..];
        if !all_finite(recent) {
            return Classification::neutral(
                Basis::InsufficientHistory,
                "void bar inside the breakout window",
            );
        }

        let (window, latest) = recent.split_at(policy.lookback);
        let latest = &latest[0];
        let range_high = window.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
        let range_low = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);

        if latest.high > range_high {
            Classification::new(
                Signal::Buy,
                Basis::Directional,
                format!(
                    "high {} breaks {}-bar high {}",
                    px(latest.high),
                    policy.lookback,
                    px(range_high)
                ),
            )
        } else if latest.low < range_low {
            Classification::new(
                Signal::Sell,
                Basis::Directional,
                format!(
                    "low {} breaks {}-bar low {}",
                    px(latest.low),
                    policy.lookback,
                    px(range_low)
                ),
            )
        } else {
            Classification::neutral(
                Basis::InsideRange,
                format!(
                    "inside {}-bar range {}..{}",
                    policy.lookback,
                    px(range_low),
                    px(range_high)
                ),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Bar, Interval};

    fn policy(lookback: usize) -> TimeframePolicy {
        TimeframePolicy::new(Interval::H4).with_lookback(lookback)
    }

    fn flat(n: usize) -> Vec<Bar> {
        (0..n).map(|_| Bar::new(1.10, 1.11, 1.09, 1.10)).collect()
    }

    fn classify(bars: Vec<Bar>, lookback: usize) -> Classification {
        BreakoutClassifier.classify(&IndicatorReading::from_bars(bars), &policy(lookback))
    }

    #[test]
    fn new_high_is_buy() {
        let mut bars = flat(6);
        bars.push(Bar::new(1.10, 1.12, 1.095, 1.115));
        let c = classify(bars, 5);
        assert_eq!(c.signal, Signal::Buy);
        assert_eq!(c.basis, Basis::Directional);
    }

    #[test]
    fn new_low_is_sell() {
        let mut bars = flat(6);
        bars.push(Bar::new(1.10, 1.105, 1.08, 1.085));
        assert_eq!(classify(bars, 5).signal, Signal::Sell);
    }

    #[test]
    fn equal_high_is_not_a_breakout() {
        let mut bars = flat(6);
        bars.push(Bar::new(1.10, 1.11, 1.09, 1.10));
        let c = classify(bars, 5);
        assert_eq!(c.signal, Signal::Neutral);
        assert_eq!(c.basis, Basis::InsideRange);
    }

    #[test]
    fn only_the_lookback_window_counts() {
        // an old spike outside the window must not block the breakout
        let mut bars = vec![Bar::new(1.10, 1.50, 1.09, 1.10)];
        bars.extend(flat(3));
        bars.push(Bar::new(1.10, 1.12, 1.095, 1.115));
        assert_eq!(classify(bars, 3).signal, Signal::Buy);
    }

    #[test]
    fn outside_bar_reads_as_buy() {
        let mut bars = flat(4);
        bars.push(Bar::new(1.10, 1.13, 1.07, 1.10));
        assert_eq!(classify(bars, 4).signal, Signal::Buy);
    }

    #[test]
    fn too_few_bars() {
        let c = classify(flat(5), 5);
        assert_eq!(c.signal, Signal::Neutral);
        assert_eq!(c.basis, Basis::InsufficientHistory);
    }

    #[test]
    fn void_bar_in_window() {
        let mut bars = flat(6);
        bars[3].low = f64::NAN;
        bars.push(Bar::new(1.10, 1.12, 1.095, 1.115));
        assert_eq!(classify(bars, 5).basis, Basis::InsufficientHistory);
    }
}
