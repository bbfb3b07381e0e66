//! Domain types: currencies, pairs, intervals, bars, signals.

pub mod bar;
pub mod currency;
pub mod interval;
pub mod signal;

pub use bar::Bar;
pub use currency::{CurrencyCode, DomainError, Pair};
pub use interval::Interval;
pub use signal::Signal;
