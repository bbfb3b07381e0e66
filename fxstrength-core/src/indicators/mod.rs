//! Bar-series indicators used to derive readings locally.
//!
//! Providers that only supply raw bars (synthetic, CSV) run these to fill the
//! close / trend-stop / trend-strength fields of an
//! [`IndicatorReading`](crate::reading::IndicatorReading).
//! Every indicator returns a series aligned with its input; warmup slots are NaN.

pub mod adx;
pub mod parabolic_sar;
pub mod smoothing;

pub use adx::Adx;
pub use parabolic_sar::ParabolicSar;

use crate::domain::Bar;

/// A pure function from a bar series to a numeric series of the same length.
///
/// No value at index t may depend on bars after t.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "adx_14").
    fn name(&self) -> &str;

    /// Number of leading bars that produce no valid output.
    fn lookback(&self) -> usize;

    fn compute(&self, bars: &[Bar]) -> Vec<f64>;

    /// Value at the most recent bar, if it is a finite number.
    fn latest(&self, bars: &[Bar]) -> Option<f64> {
        self.compute(bars).last().copied().filter(|v| v.is_finite())
    }
}

/// Synthetic bars from close prices for testing.
///
/// open = prev close (or close for the first bar),
/// high = max(open, close) + 0.001, low = min(open, close) - 0.001.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar::new(open, open.max(close) + 0.001, open.min(close) - 0.001, close)
        })
        .collect()
}

/// Bars from explicit (open, high, low, close) tuples.
#[cfg(test)]
pub fn make_ohlc_bars(data: &[(f64, f64, f64, f64)]) -> Vec<Bar> {
    data.iter()
        .map(|&(open, high, low, close)| Bar::new(open, high, low, close))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_skips_warmup_nan() {
        let bars = make_bars(&[1.10]);
        assert_eq!(ParabolicSar::default_params().latest(&bars), None);
        assert_eq!(Adx::new(14).latest(&bars), None);
    }
}
