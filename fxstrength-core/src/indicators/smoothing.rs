//! True range and Wilder smoothing, shared by the ADX computation.

use crate::domain::Bar;

/// True Range series.
///
/// TR[0] = high[0] - low[0] (no previous close).
/// TR[t] = max(high - low, |high - close[t-1]|, |low - close[t-1]|).
pub fn true_range(bars: &[Bar]) -> Vec<f64> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let range = bar.high - bar.low;
            let tr = match i.checked_sub(1).map(|p| bars[p].close) {
                None => range,
                Some(pc) => range.max((bar.high - pc).abs()).max((bar.low - pc).abs()),
            };
            if tr.is_finite() {
                tr
            } else {
                f64::NAN
            }
        })
        .collect()
}

/// Wilder smoothing (alpha = 1/period).
///
/// Seeded with the mean of the first run of `period` consecutive finite
/// values; a non-finite value after the seed voids the rest of the series.
pub fn wilder_smooth(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if period == 0 || n < period {
        return result;
    }

    let Some(seed_start) = (0..=n - period)
        .find(|&i| values[i..i + period].iter().all(|v| v.is_finite()))
    else {
        return result;
    };

    let seed_end = seed_start + period;
    let mut prev = values[seed_start..seed_end].iter().sum::<f64>() / period as f64;
    result[seed_end - 1] = prev;

    let alpha = 1.0 / period as f64;
    for i in seed_end..n {
        if !values[i].is_finite() {
            break;
        }
        prev = alpha * values[i] + (1.0 - alpha) * prev;
        result[i] = prev;
    }

    result
}
