//! Parabolic SAR: Wilder's stop-and-reverse level, the trend-stop input.
//!
//! Sequential and stateful: tracks direction, extreme point (EP) and
//! acceleration factor (AF). Needs at least two bars.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct ParabolicSar {
    af_start: f64,
    af_step: f64,
    af_max: f64,
    name: String,
}

/// Running SAR state between bars.
struct SarState {
    long: bool,
    af: f64,
    ep: f64,
    sar: f64,
}

impl ParabolicSar {
    pub fn new(af_start: f64, af_step: f64, af_max: f64) -> Self {
        assert!(af_start > 0.0, "AF start must be > 0");
        assert!(af_step > 0.0, "AF step must be > 0");
        assert!(af_max >= af_start, "AF max must be >= AF start");
        Self {
            af_start,
            af_step,
            af_max,
            name: format!("psar_{af_start}_{af_step}_{af_max}"),
        }
    }

    /// 0.02 / 0.02 / 0.20
    pub fn default_params() -> Self {
        Self::new(0.02, 0.02, 0.20)
    }

    fn advance(&self, st: &mut SarState, prev2: &Bar, prev1: &Bar, bar: &Bar) {
        let mut next = st.sar + st.af * (st.ep - st.sar);

        if st.long {
            // SAR may not sit above either of the two previous lows
            next = next.min(prev1.low).min(prev2.low);
            if bar.low < next {
                st.long = false;
                next = st.ep;
                st.ep = bar.low;
                st.af = self.af_start;
            } else if bar.high > st.ep {
                st.ep = bar.high;
                st.af = (st.af + self.af_step).min(self.af_max);
            }
        } else {
            next = next.max(prev1.high).max(prev2.high);
            if bar.high > next {
                st.long = true;
                next = st.ep;
                st.ep = bar.high;
                st.af = self.af_start;
            } else if bar.low < st.ep {
                st.ep = bar.low;
                st.af = (st.af + self.af_step).min(self.af_max);
            }
        }

        st.sar = next;
    }
}

impl Indicator for ParabolicSar {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut result = vec![f64::NAN; n];
        if n < 2 || bars[0].is_void() || bars[1].is_void() {
            return result;
        }

        let long = bars[1].close >= bars[0].close;
        let mut st = SarState {
            long,
            af: self.af_start,
            ep: if long { bars[1].high } else { bars[1].low },
            sar: if long { bars[0].low } else { bars[0].high },
        };
        result[1] = st.sar;

        for i in 2..n {
            // A void bar (or one adjacent to it) freezes the state and emits no value.
            if bars[i].is_void() || bars[i - 1].is_void() || bars[i - 2].is_void() {
                continue;
            }
            self.advance(&mut st, &bars[i - 2], &bars[i - 1], &bars[i]);
            result[i] = st.sar;
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_ohlc_bars;

    #[test]
    fn psar_uptrend_below_price() {
        let data: Vec<_> = (0..10)
            .map(|i| {
                let base = 1.10 + i as f64 * 0.003;
                (base, base + 0.002, base - 0.001, base + 0.0015)
            })
            .collect();
        let bars = make_ohlc_bars(&data);
        let result = ParabolicSar::default_params().compute(&bars);

        for i in 2..10 {
            assert!(
                result[i] < bars[i].low,
                "PSAR ({}) should be below low ({}) at bar {i} in uptrend",
                result[i],
                bars[i].low,
            );
        }
    }

    #[test]
    fn psar_flips_above_after_reversal() {
        let bars = make_ohlc_bars(&[
            (1.000, 1.050, 0.980, 1.030),
            (1.030, 1.080, 1.010, 1.070),
            (1.070, 1.120, 1.050, 1.110),
            (1.110, 1.150, 1.090, 1.140),
            (1.140, 1.145, 1.000, 1.010),
            (1.010, 1.020, 0.950, 0.960),
            (0.960, 0.970, 0.900, 0.910),
        ]);
        let result = ParabolicSar::default_params().compute(&bars);
        let last = *result.last().unwrap();
        assert!(last > bars[6].close, "PSAR should sit above price after the drop");
        assert!(result[3] < bars[3].close, "PSAR should sit below price in the rally");
    }

    #[test]
    fn psar_af_caps_at_max() {
        let data: Vec<_> = (0..30)
            .map(|i| {
                let base = 1.0 + i as f64 * 0.01;
                (base, base + 0.01, base - 0.005, base + 0.008)
            })
            .collect();
        let bars = make_ohlc_bars(&data);
        let result = ParabolicSar::new(0.02, 0.02, 0.10).compute(&bars);
        let valid = result.iter().filter(|v| v.is_finite()).count();
        assert_eq!(valid, 29);
    }

    #[test]
    fn psar_too_few_bars() {
        let bars = make_ohlc_bars(&[(1.0, 1.05, 0.95, 1.02)]);
        let result = ParabolicSar::default_params().compute(&bars);
        assert!(result.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn psar_void_bar_yields_nan_slot() {
        let mut bars = make_ohlc_bars(&[
            (1.00, 1.02, 0.99, 1.01),
            (1.01, 1.03, 1.00, 1.02),
            (1.02, 1.04, 1.01, 1.03),
            (1.03, 1.05, 1.02, 1.04),
        ]);
        bars[2].high = f64::NAN;
        let result = ParabolicSar::default_params().compute(&bars);
        assert!(result[2].is_nan());
        assert!(result[3].is_nan());
    }
}
