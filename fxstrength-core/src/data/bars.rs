//! Readings derived locally from a bar series.

use super::provider::{FetchError, MarketDataProvider};
use crate::domain::{Bar, Interval};
use crate::indicators::{Adx, Indicator, ParabolicSar};
use crate::reading::IndicatorReading;

/// Anything that can hand back the most recent `count` bars for a symbol,
/// oldest first.
pub trait BarSource: Send + Sync {
    fn name(&self) -> &str;

    fn bars(&self, symbol: &str, interval: Interval, count: usize) -> Result<Vec<Bar>, FetchError>;
}

/// Wraps a [`BarSource`] and fills close, SAR and ADX from the bars.
///
/// Readings carry the bars themselves, so bar-based classifiers work too.
pub struct BarBackedProvider<S> {
    source: S,
    bar_count: usize,
    sar: ParabolicSar,
    adx: Adx,
}

impl<S: BarSource> BarBackedProvider<S> {
    pub fn new(source: S, bar_count: usize) -> Self {
        Self {
            source,
            bar_count,
            sar: ParabolicSar::default_params(),
            adx: Adx::default_params(),
        }
    }

    pub fn with_indicators(mut self, sar: ParabolicSar, adx: Adx) -> Self {
        self.sar = sar;
        self.adx = adx;
        self
    }

    pub fn bar_count(&self) -> usize {
        self.bar_count
    }

    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S: BarSource> MarketDataProvider for BarBackedProvider<S> {
    fn name(&self) -> &str {
        self.source.name()
    }

    fn supplies_bars(&self) -> bool {
        true
    }

    fn fetch_reading(&self, symbol: &str, interval: Interval) -> Result<IndicatorReading, FetchError> {
        let bars = self.source.bars(symbol, interval, self.bar_count)?;
        if bars.is_empty() {
            return Err(FetchError::NoData {
                symbol: symbol.to_string(),
                interval,
            });
        }

        let trend_stop = self.sar.latest(&bars);
        let trend_strength = self.adx.latest(&bars);
        let mut reading = IndicatorReading::from_bars(bars);
        reading.trend_stop = trend_stop;
        reading.trend_strength = trend_strength;
        Ok(reading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_bars;

    struct Fixed(Vec<Bar>);

    impl BarSource for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        fn bars(&self, _: &str, _: Interval, count: usize) -> Result<Vec<Bar>, FetchError> {
            let start = self.0.len().saturating_sub(count);
            Ok(self.0[start..].to_vec())
        }
    }

    #[test]
    fn fills_indicators_from_bars() {
        let closes: Vec<f64> = (0..60).map(|i| 1.0 + i as f64 * 0.002).collect();
        let provider = BarBackedProvider::new(Fixed(make_bars(&closes)), 50);
        let r = provider.fetch_reading("EURUSD", Interval::H1).unwrap();

        assert_eq!(r.bars.len(), 50);
        assert_eq!(r.close(), Some(*closes.last().unwrap()));
        let sar = r.trend_stop().unwrap();
        assert!(sar < r.close().unwrap(), "uptrend SAR sits below price");
        assert!(r.trend_strength().unwrap() > 20.0);
    }

    #[test]
    fn short_series_leaves_strength_absent() {
        let provider = BarBackedProvider::new(Fixed(make_bars(&[1.0, 1.01, 1.02])), 50);
        let r = provider.fetch_reading("EURUSD", Interval::H1).unwrap();
        assert_eq!(r.close(), Some(1.02));
        assert_eq!(r.trend_strength(), None);
    }

    #[test]
    fn empty_series_is_no_data() {
        let provider = BarBackedProvider::new(Fixed(vec![]), 50);
        assert!(matches!(
            provider.fetch_reading("EURUSD", Interval::D1),
            Err(FetchError::NoData { .. })
        ));
    }
}
