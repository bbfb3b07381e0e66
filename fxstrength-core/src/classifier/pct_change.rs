//! Percentage change of close over `lookback` bars.
//!
//! `pct = (close_now - close_past) / close_past * 100`, where `close_past`
//! is the close `lookback` bars before the latest one.

use super::{px, Basis, Classification, SignalClassifier};
use crate::config::TimeframePolicy;
use crate::domain::Signal;
use crate::reading::IndicatorReading;

/// Denominators with a smaller magnitude are treated as zero.
pub const MIN_DENOMINATOR: f64 = 1e-12;

#[derive(Debug, Clone, Copy, Default)]
pub struct PctChangeClassifier;

impl SignalClassifier for PctChangeClassifier {
    fn name(&self) -> &str {
        "pct_change"
    }

    fn requires_bars(&self) -> bool {
        true
    }

    fn classify(&self, reading: &IndicatorReading, policy: &TimeframePolicy) -> Classification {
        let bars = &reading.bars;
        let n = bars.len();
        if n < policy.lookback + 1 {
            return Classification::neutral(
                Basis::InsufficientHistory,
                format!("{n} bars, {}-bar change needs {}", policy.lookback, policy.lookback + 1),
            );
        }

        let now = bars[n - 1].close;
        let past = bars[n - 1 - policy.lookback].close;
        if !now.is_finite() || !past.is_finite() {
            return Classification::neutral(Basis::InsufficientHistory, "void close in comparison");
        }
        if past.abs() < MIN_DENOMINATOR {
            return Classification::neutral(
                Basis::Degenerate,
                format!("reference close {past} is zero"),
            );
        }

        let pct = (now - past) / past * 100.0;
        let threshold = policy.pct_threshold;
        let detail = format!(
            "{}-bar change {pct:+.3}% ({} -> {}), threshold {threshold}%",
            policy.lookback,
            px(past),
            px(now)
        );
        if pct > threshold {
            Classification::new(Signal::Buy, Basis::Directional, detail)
        } else if pct < -threshold {
            Classification::new(Signal::Sell, Basis::Directional, detail)
        } else {
            Classification::neutral(Basis::InsideRange, detail)
        }
    }
}
