//! Signal classification: one indicator reading in, one trade signal out.
//!
//! Classifiers are pure and total: whatever the reading contains (including
//! nothing at all) they terminate in a [`Signal`] and say why. Missing inputs,
//! short histories and degenerate arithmetic are branches here, never errors.

pub mod breakout;
pub mod fractal_swing;
pub mod pct_change;
pub mod sar_adx;

pub use breakout::BreakoutClassifier;
pub use fractal_swing::FractalSwingClassifier;
pub use pct_change::PctChangeClassifier;
pub use sar_adx::SarAdxClassifier;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::TimeframePolicy;
use crate::domain::Signal;
use crate::reading::IndicatorReading;

/// Which rule produced a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Basis {
    /// Primary inputs gave a clean direction.
    Directional,
    /// Inputs were valid but showed no breakout / move / swing break.
    InsideRange,
    /// Trend strength below the policy threshold.
    WeakTrend,
    /// Close within the proximity buffer of the trend stop.
    TooClose,
    /// Close exactly at the trend stop.
    Undecided,
    /// A required field was absent.
    MissingInput,
    /// The data provider failed for this pair.
    FetchFailed,
    /// Fewer bars than the window needs, or void bars in the window.
    InsufficientHistory,
    /// Zero or near-zero denominator.
    Degenerate,
    /// No confirmed swing high or swing low.
    NoSwing,
}

impl Basis {
    /// True when the signal came from a degraded or fallback path.
    pub fn is_degraded(self) -> bool {
        !matches!(self, Basis::Directional | Basis::InsideRange | Basis::WeakTrend)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Basis::Directional => "directional",
            Basis::InsideRange => "inside_range",
            Basis::WeakTrend => "weak_trend",
            Basis::TooClose => "too_close",
            Basis::Undecided => "undecided",
            Basis::MissingInput => "missing_input",
            Basis::FetchFailed => "fetch_failed",
            Basis::InsufficientHistory => "insufficient_history",
            Basis::Degenerate => "degenerate",
            Basis::NoSwing => "no_swing",
        }
    }
}

impl fmt::Display for Basis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub signal: Signal,
    pub basis: Basis,
    /// True when `signal` is the provider's aggregate recommendation.
    pub fallback_used: bool,
    pub rationale: String,
}

impl Classification {
    pub fn new(signal: Signal, basis: Basis, rationale: impl Into<String>) -> Self {
        Self {
            signal,
            basis,
            fallback_used: false,
            rationale: rationale.into(),
        }
    }

    pub fn neutral(basis: Basis, rationale: impl Into<String>) -> Self {
        Self::new(Signal::Neutral, basis, rationale)
    }

    /// Resolve to the reading's recommendation if present, else NEUTRAL.
    pub fn fallback(reading: &IndicatorReading, basis: Basis, reason: &str) -> Self {
        match reading.recommendation {
            Some(rec) => Self {
                signal: rec,
                basis,
                fallback_used: true,
                rationale: format!("{reason}; fallback recommendation {rec}"),
            },
            None => Self::neutral(basis, format!("{reason}; no fallback, NEUTRAL")),
        }
    }

    /// NEUTRAL standing in for a reading that could not be fetched.
    pub fn fetch_failed(reason: impl fmt::Display) -> Self {
        Self::neutral(Basis::FetchFailed, format!("fetch failed: {reason}"))
    }
}

/// Trait for signal classifiers.
///
/// Implementations must be total: `classify` returns for every reading and
/// never panics.
pub trait SignalClassifier: Send + Sync {
    /// Short identifier (e.g., "sar_adx").
    fn name(&self) -> &str;

    /// True if the classifier reads the bar series rather than point indicators.
    fn requires_bars(&self) -> bool;

    /// True if a provider-side aggregate recommendation can change the outcome.
    fn uses_fallback(&self) -> bool {
        false
    }

    fn classify(&self, reading: &IndicatorReading, policy: &TimeframePolicy) -> Classification;
}

/// Serializable classifier selection; one kind applies to a whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifierKind {
    /// Close vs parabolic SAR, gated by ADX, with recommendation fallback.
    #[default]
    SarAdx,
    /// Latest bar breaking the preceding `lookback` bars' range.
    Breakout,
    /// Latest close breaking the last confirmed fractal swing.
    FractalSwing,
    /// Percentage change of close over `lookback` bars.
    PctChange,
}

impl ClassifierKind {
    pub fn build(self) -> Box<dyn SignalClassifier> {
        match self {
            ClassifierKind::SarAdx => Box::new(SarAdxClassifier),
            ClassifierKind::Breakout => Box::new(BreakoutClassifier),
            ClassifierKind::FractalSwing => Box::new(FractalSwingClassifier),
            ClassifierKind::PctChange => Box::new(PctChangeClassifier),
        }
    }

    pub fn requires_bars(self) -> bool {
        !matches!(self, ClassifierKind::SarAdx)
    }
}

/// Format a price with enough precision for both JPY and non-JPY pairs.
pub(crate) fn px(v: f64) -> String {
    format!("{v:.5}")
}

/// Bars that are usable for window comparisons.
pub(crate) fn all_finite(bars: &[crate::domain::Bar]) -> bool {
    bars.iter().all(|b| !b.is_void())
}
