//! ADX: Average Directional Index (Wilder), the trend-strength input.
//!
//! 1. +DM / -DM from consecutive bars
//! 2. Wilder-smooth +DM, -DM and true range
//! 3. +DI, -DI = 100 * smoothed DM / smoothed TR
//! 4. DX = 100 * |+DI - -DI| / (+DI + -DI)
//! 5. ADX = Wilder-smoothed DX
//!
//! Lookback: 2 * period.

use super::smoothing::{true_range, wilder_smooth};
use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Adx {
    period: usize,
    name: String,
}

impl Adx {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ADX period must be >= 1");
        Self {
            period,
            name: format!("adx_{period}"),
        }
    }

    /// Wilder's default period of 14.
    pub fn default_params() -> Self {
        Self::new(14)
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

/// Directional movement (+DM, -DM) for each bar; index 0 is NaN.
fn directional_movement(bars: &[Bar]) -> (Vec<f64>, Vec<f64>) {
    let n = bars.len();
    let mut plus = vec![f64::NAN; n];
    let mut minus = vec![f64::NAN; n];

    for i in 1..n {
        let up = bars[i].high - bars[i - 1].high;
        let down = bars[i - 1].low - bars[i].low;
        if !up.is_finite() || !down.is_finite() {
            continue;
        }
        plus[i] = if up > down && up > 0.0 { up } else { 0.0 };
        minus[i] = if down > up && down > 0.0 { down } else { 0.0 };
    }

    (plus, minus)
}

impl Indicator for Adx {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        2 * self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        if n < 2 {
            return vec![f64::NAN; n];
        }

        let (plus_dm, minus_dm) = directional_movement(bars);
        let smooth_tr = wilder_smooth(&true_range(bars), self.period);
        let smooth_plus = wilder_smooth(&plus_dm, self.period);
        let smooth_minus = wilder_smooth(&minus_dm, self.period);

        let dx: Vec<f64> = (0..n)
            .map(|i| {
                let (tr, p, m) = (smooth_tr[i], smooth_plus[i], smooth_minus[i]);
                if !(tr.is_finite() && p.is_finite() && m.is_finite()) || tr == 0.0 {
                    return f64::NAN;
                }
                let plus_di = 100.0 * p / tr;
                let minus_di = 100.0 * m / tr;
                let di_sum = plus_di + minus_di;
                if di_sum == 0.0 {
                    0.0
                } else {
                    100.0 * (plus_di - minus_di).abs() / di_sum
                }
            })
            .collect();

        wilder_smooth(&dx, self.period)
    }
}
