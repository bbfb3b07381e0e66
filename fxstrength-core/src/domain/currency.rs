//! Currency codes and currency pairs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// ISO-style three-letter currency code (e.g. `EUR`, `JPY`).
///
/// Always three ASCII uppercase letters; lowercase input is normalized on parse.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode(String);

impl CurrencyCode {
    pub fn new(code: &str) -> Result<Self, DomainError> {
        let code = code.trim().to_ascii_uppercase();
        if code.len() != 3 || !code.bytes().all(|b| b.is_ascii_uppercase()) {
            return Err(DomainError::InvalidCurrency(code));
        }
        Ok(Self(code))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CurrencyCode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<CurrencyCode> for String {
    fn from(code: CurrencyCode) -> Self {
        code.0
    }
}

/// A tradable base/quote combination plus the provider-specific symbol.
///
/// Invariant: `base != quote`. Enforced by [`Pair::new`] and on deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawPair", into = "RawPair")]
pub struct Pair {
    base: CurrencyCode,
    quote: CurrencyCode,
    symbol: String,
}

impl Pair {
    pub fn new(
        base: CurrencyCode,
        quote: CurrencyCode,
        symbol: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let symbol = symbol.into();
        if base == quote {
            return Err(DomainError::SameCurrency { symbol, currency: base });
        }
        if symbol.trim().is_empty() {
            return Err(DomainError::EmptySymbol);
        }
        Ok(Self { base, quote, symbol })
    }

    /// Build a pair from a six-letter symbol such as `EURUSD`.
    pub fn from_symbol(symbol: &str) -> Result<Self, DomainError> {
        let symbol = symbol.trim();
        if symbol.len() != 6 || !symbol.is_ascii() {
            return Err(DomainError::UnparseableSymbol(symbol.to_string()));
        }
        let base = CurrencyCode::new(&symbol[..3])?;
        let quote = CurrencyCode::new(&symbol[3..])?;
        Self::new(base, quote, symbol.to_ascii_uppercase())
    }

    pub fn base(&self) -> &CurrencyCode {
        &self.base
    }

    pub fn quote(&self) -> &CurrencyCode {
        &self.quote
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }
}

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}/{})", self.symbol, self.base, self.quote)
    }
}

/// Wire shape of a pair, validated into [`Pair`].
///
/// `base` and `quote` may be omitted together for six-letter symbols; giving
/// only one of them is an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawPair {
    symbol: String,
    #[serde(default)]
    base: Option<CurrencyCode>,
    #[serde(default)]
    quote: Option<CurrencyCode>,
}

impl TryFrom<RawPair> for Pair {
    type Error = DomainError;

    fn try_from(raw: RawPair) -> Result<Self, Self::Error> {
        match (raw.base, raw.quote) {
            (Some(base), Some(quote)) => Pair::new(base, quote, raw.symbol),
            (None, None) => Pair::from_symbol(&raw.symbol),
            _ => Err(DomainError::HalfSpecifiedPair(raw.symbol)),
        }
    }
}

impl From<Pair> for RawPair {
    fn from(pair: Pair) -> Self {
        RawPair {
            symbol: pair.symbol,
            base: Some(pair.base),
            quote: Some(pair.quote),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("invalid currency code '{0}' (expected three letters)")]
    InvalidCurrency(String),

    #[error("pair {symbol} has identical base and quote currency {currency}")]
    SameCurrency { symbol: String, currency: CurrencyCode },

    #[error("pair symbol must not be empty")]
    EmptySymbol,

    #[error("cannot split '{0}' into base and quote currencies")]
    UnparseableSymbol(String),

    #[error("pair {0} must give both base and quote, or neither")]
    HalfSpecifiedPair(String),

    #[error("unknown interval '{0}'")]
    UnknownInterval(String),
}
