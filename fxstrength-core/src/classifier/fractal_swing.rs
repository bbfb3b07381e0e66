//! Fractal swing break.
//!
//! Bar `i` is a swing high when its high strictly exceeds the highs of the
//! `swing_window` bars on each side; swing lows mirror this. Only interior
//! bars can be confirmed. The latest close is compared with the last swing
//! high and last swing low found: above the high → BUY, below the low → SELL.

use super::{all_finite, px, Basis, Classification, SignalClassifier};
use crate::config::TimeframePolicy;
use crate::domain::{Bar, Signal};
use crate::reading::IndicatorReading;

#[derive(Debug, Clone, Copy, Default)]
pub struct FractalSwingClassifier;

/// Last confirmed swing levels in scan order.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SwingLevels {
    pub high: Option<f64>,
    pub low: Option<f64>,
}

/// Scan interior bars for fractal swing highs and lows.
pub fn last_swings(bars: &[Bar], window: usize) -> SwingLevels {
    let mut levels = SwingLevels::default();
    if window == 0 || bars.len() < 2 * window + 1 {
        return levels;
    }

    for i in window..bars.len() - window {
        let neighbours = bars[i - window..i]
            .iter()
            .chain(&bars[i + 1..=i + window]);
        let (mut is_high, mut is_low) = (true, true);
        for n in neighbours {
            is_high &= bars[i].high > n.high;
            is_low &= bars[i].low < n.low;
        }
        if is_high {
            levels.high = Some(bars[i].high);
        }
        if is_low {
            levels.low = Some(bars[i].low);
        }
    }

    levels
}

impl SignalClassifier for FractalSwingClassifier {
    fn name(&self) -> &str {
        "fractal_swing"
    }

    fn requires_bars(&self) -> bool {
        true
    }

    fn classify(&self, reading: &IndicatorReading, policy: &TimeframePolicy) -> Classification {
        let bars = &reading.bars;
        let w = policy.swing_window;
        let needed = 2 * w + 1;
        if bars.len() < needed {
            return Classification::neutral(
                Basis::InsufficientHistory,
                format!("{} bars, swing window {w} needs {needed}", bars.len()),
            );
        }
        if !all_finite(bars) {
            return Classification::neutral(Basis::InsufficientHistory, "void bar in series");
        }

        let close = bars[bars.len() - 1].close;
        let (high, low) = match last_swings(bars, w) {
            SwingLevels {
                high: Some(h),
                low: Some(l),
            } => (h, l),
            levels => {
                let missing = if levels.high.is_none() { "high" } else { "low" };
                return Classification::neutral(
                    Basis::NoSwing,
                    format!("no confirmed swing {missing} (window {w})"),
                );
            }
        };

        if close > high {
            Classification::new(
                Signal::Buy,
                Basis::Directional,
                format!("close {} above swing high {}", px(close), px(high)),
            )
        } else if close < low {
            Classification::new(
                Signal::Sell,
                Basis::Directional,
                format!("close {} below swing low {}", px(close), px(low)),
            )
        } else {
            Classification::neutral(
                Basis::InsideRange,
                format!("close {} between swings {}..{}", px(close), px(low), px(high)),
            )
        }
    }
}
