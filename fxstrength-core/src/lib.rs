//! FX Strength Core: currency strength matrix engine.
//!
//! This crate turns per-pair indicator readings into a currency × timeframe
//! strength table:
//! - Domain types (currencies, pairs, intervals, bars, signals)
//! - Indicator readings and the bar indicators that derive them (SAR, ADX)
//! - Signal classifiers (SAR+ADX, breakout, fractal swing, percentage change)
//! - Zero-sum score ledger, one per timeframe
//! - Remark policies over a currency's score vector
//! - Matrix assembly with an append-only decision log
//! - Data providers (TradingView scanner, bar-backed, replay)

pub mod classifier;
pub mod config;
pub mod data;
pub mod domain;
pub mod indicators;
pub mod ledger;
pub mod matrix;
pub mod reading;
pub mod remark;

pub use classifier::{Basis, Classification, ClassifierKind, SignalClassifier};
pub use config::{ConfigError, MatrixConfig, TimeframePolicy};
pub use data::{FetchError, MarketDataProvider};
pub use domain::{Bar, CurrencyCode, Interval, Pair, Signal};
pub use ledger::{LedgerError, ScoreLedger};
pub use matrix::{
    DecisionLog, DecisionRecord, MatrixAssembler, MatrixError, MatrixRow, MatrixSnapshot,
    ScoreMatrix, TimeframeColumn,
};
pub use reading::IndicatorReading;
pub use remark::{Remark, RemarkPolicy};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: everything a parallel runner shares is Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        // Domain types
        require_send::<Bar>();
        require_sync::<Bar>();
        require_send::<Pair>();
        require_sync::<Pair>();
        require_send::<IndicatorReading>();
        require_sync::<IndicatorReading>();

        // Config and results
        require_send::<MatrixConfig>();
        require_sync::<MatrixConfig>();
        require_send::<ScoreLedger>();
        require_sync::<ScoreLedger>();
        require_send::<TimeframeColumn>();
        require_sync::<TimeframeColumn>();
        require_send::<MatrixSnapshot>();
        require_sync::<MatrixSnapshot>();

        // Providers and the assembler
        require_send::<data::ReplayProvider>();
        require_sync::<data::ReplayProvider>();
        require_send::<data::TradingViewProvider>();
        require_sync::<data::TradingViewProvider>();
        require_send::<data::BarBackedProvider<data::SyntheticBars>>();
        require_sync::<data::BarBackedProvider<data::SyntheticBars>>();
        require_send::<MatrixAssembler<Box<dyn MarketDataProvider>>>();
        require_sync::<MatrixAssembler<Box<dyn MarketDataProvider>>>();
    }

    /// Classifiers see one reading and one policy, nothing else: no ledger,
    /// no other pairs, no other timeframes.
    #[test]
    fn classifier_trait_sees_only_reading_and_policy() {
        fn _check_trait_object_builds(
            c: &dyn SignalClassifier,
            reading: &IndicatorReading,
            policy: &TimeframePolicy,
        ) -> Classification {
            c.classify(reading, policy)
        }
    }
}
