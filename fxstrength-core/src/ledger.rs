//! Zero-sum score ledger for one timeframe.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::domain::{CurrencyCode, Pair, Signal};

/// Per-currency signed scores for one timeframe.
///
/// Every currency is seeded at 0 up front; `apply` only ever touches seeded
/// keys, so the key set never changes after construction. Each BUY/SELL moves
/// exactly two currencies in opposite directions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreLedger {
    scores: BTreeMap<CurrencyCode, i32>,
}

impl ScoreLedger {
    pub fn new(currencies: impl IntoIterator<Item = CurrencyCode>) -> Self {
        Self {
            scores: currencies.into_iter().map(|c| (c, 0)).collect(),
        }
    }

    /// Fold one pair's signal: BUY credits base and debits quote, SELL mirrors, NEUTRAL is a no-op.
    pub fn apply(&mut self, pair: &Pair, signal: Signal) -> Result<(), LedgerError> {
        for ccy in [pair.base(), pair.quote()] {
            if !self.scores.contains_key(ccy) {
                return Err(LedgerError::UnseededCurrency {
                    currency: ccy.clone(),
                    pair: pair.symbol().to_string(),
                });
            }
        }

        let delta = signal.base_delta();
        if delta != 0 {
            for (ccy, d) in [(pair.base(), delta), (pair.quote(), -delta)] {
                if let Some(score) = self.scores.get_mut(ccy) {
                    *score += d;
                }
            }
        }
        Ok(())
    }

    pub fn score(&self, currency: &CurrencyCode) -> Option<i32> {
        self.scores.get(currency).copied()
    }

    /// Scores in currency-code order.
    pub fn iter(&self) -> impl Iterator<Item = (&CurrencyCode, i32)> {
        self.scores.iter().map(|(c, s)| (c, *s))
    }

    pub fn currencies(&self) -> impl Iterator<Item = &CurrencyCode> {
        self.scores.keys()
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Sum of all scores; zero whenever the ledger was only touched through `apply`.
    pub fn total(&self) -> i64 {
        self.scores.values().map(|&s| i64::from(s)).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("currency {currency} of pair {pair} was not seeded in the ledger")]
    UnseededCurrency { currency: CurrencyCode, pair: String },
}
