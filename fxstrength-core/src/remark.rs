//! Remark classification of a currency's score vector across timeframes.
//!
//! Exactly one policy applies per run. The policies are not interchangeable
//! and are never blended:
//! - `Conservative`: flags only out-of-band scores pulling in opposite directions.
//! - `SignAgreement`: reports whether every timeframe agrees on the sign.
//! - `MagnitudeBanded`: grades the summed score as strong, weak or neutral.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::ConfigError;

/// Qualitative label attached to one row of the matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Remark {
    Neutral,
    Invalid,
    Strong,
    Weak,
    Agreement,
}

impl Remark {
    pub fn as_str(self) -> &'static str {
        match self {
            Remark::Neutral => "NEUTRAL",
            Remark::Invalid => "INVALID",
            Remark::Strong => "STRONG",
            Remark::Weak => "WEAK",
            Remark::Agreement => "AGREEMENT",
        }
    }
}

impl fmt::Display for Remark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rule mapping a score vector to a [`Remark`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RemarkPolicy {
    /// All scores within `[-band, band]` → NEUTRAL; some score above `band`
    /// and some below `-band` → INVALID; anything else → NEUTRAL.
    Conservative {
        #[serde(default = "default_band")]
        band: i32,
    },
    /// All positive, all negative, or all zero → AGREEMENT; otherwise INVALID.
    SignAgreement,
    /// Sum ≥ `threshold` → STRONG; sum ≤ `-threshold` → WEAK; otherwise NEUTRAL.
    MagnitudeBanded {
        #[serde(default = "default_magnitude")]
        threshold: i32,
    },
}

fn default_band() -> i32 {
    3
}

fn default_magnitude() -> i32 {
    2
}

impl Default for RemarkPolicy {
    fn default() -> Self {
        RemarkPolicy::Conservative {
            band: default_band(),
        }
    }
}

impl RemarkPolicy {
    pub fn name(&self) -> &'static str {
        match self {
            RemarkPolicy::Conservative { .. } => "conservative",
            RemarkPolicy::SignAgreement => "sign_agreement",
            RemarkPolicy::MagnitudeBanded { .. } => "magnitude_banded",
        }
    }

    pub fn remark(&self, scores: &[i32]) -> Remark {
        match *self {
            RemarkPolicy::Conservative { band } => {
                let conflicting = scores.iter().any(|&s| s > band) && scores.iter().any(|&s| s < -band);
                if conflicting {
                    Remark::Invalid
                } else {
                    Remark::Neutral
                }
            }
            RemarkPolicy::SignAgreement => {
                let agree = scores.iter().all(|&s| s > 0)
                    || scores.iter().all(|&s| s < 0)
                    || scores.iter().all(|&s| s == 0);
                if agree {
                    Remark::Agreement
                } else {
                    Remark::Invalid
                }
            }
            RemarkPolicy::MagnitudeBanded { threshold } => {
                let total: i32 = scores.iter().sum();
                if total >= threshold {
                    Remark::Strong
                } else if total <= -threshold {
                    Remark::Weak
                } else {
                    Remark::Neutral
                }
            }
        }
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            RemarkPolicy::Conservative { band } if band < 0 => Err(ConfigError::InvalidRemarkPolicy(
                format!("conservative band must be >= 0 (got {band})"),
            )),
            RemarkPolicy::MagnitudeBanded { threshold } if threshold <= 0 => {
                Err(ConfigError::InvalidRemarkPolicy(format!(
                    "magnitude threshold must be >= 1 (got {threshold})"
                )))
            }
            _ => Ok(()),
        }
    }
}
