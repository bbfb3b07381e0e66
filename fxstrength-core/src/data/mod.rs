//! Data layer: where indicator readings come from.
//!
//! - `provider`: the `MarketDataProvider` trait and `FetchError`
//! - `tradingview`: live scanner readings over HTTP
//! - `bars` / `synthetic` / `csv_bars`: readings computed from bar series
//! - `replay`: frozen readings for offline and reproducible runs
//! - `circuit_breaker`: shared back-off state for the live provider

pub mod bars;
pub mod circuit_breaker;
pub mod csv_bars;
pub mod provider;
pub mod replay;
pub mod synthetic;
pub mod tradingview;

pub use bars::{BarBackedProvider, BarSource};
pub use circuit_breaker::{BreakerState, CircuitBreaker};
pub use csv_bars::CsvBars;
pub use provider::{FetchError, MarketDataProvider};
pub use replay::{ReplayProvider, ReplayRecord};
pub use synthetic::SyntheticBars;
pub use tradingview::{TradingViewProvider, TradingViewSettings};
