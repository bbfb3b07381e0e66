//! Close vs parabolic SAR, gated by ADX trend strength.
//!
//! Rule order:
//! 1. close or SAR absent → recommendation fallback (else NEUTRAL)
//! 2. ADX present and `< strength_threshold` → NEUTRAL
//! 3. `|close - SAR| < proximity_buffer` → recommendation fallback (else NEUTRAL)
//! 4. close above SAR → BUY, below → SELL, equal → fallback (else NEUTRAL)
//!
//! Both comparisons are strict: ADX equal to the threshold and a distance
//! equal to the buffer let the direction test proceed. An absent ADX does
//! not gate.

use super::{px, Basis, Classification, SignalClassifier};
use crate::config::TimeframePolicy;
use crate::domain::Signal;
use crate::reading::IndicatorReading;

#[derive(Debug, Clone, Copy, Default)]
pub struct SarAdxClassifier;

impl SignalClassifier for SarAdxClassifier {
    fn name(&self) -> &str {
        "sar_adx"
    }

    fn requires_bars(&self) -> bool {
        false
    }

    fn uses_fallback(&self) -> bool {
        true
    }

    fn classify(&self, reading: &IndicatorReading, policy: &TimeframePolicy) -> Classification {
        let (close, sar) = match (reading.close(), reading.trend_stop()) {
            (Some(c), Some(s)) => (c, s),
            (close, _) => {
                let missing = if close.is_none() { "close" } else { "SAR" };
                return Classification::fallback(
                    reading,
                    Basis::MissingInput,
                    &format!("missing primary input ({missing})"),
                );
            }
        };

        let adx = reading.trend_strength();
        if let Some(adx) = adx {
            if adx < policy.strength_threshold {
                return Classification::neutral(
                    Basis::WeakTrend,
                    format!(
                        "ADX {adx:.1} below threshold {:.1}: weak trend",
                        policy.strength_threshold
                    ),
                );
            }
        }

        let distance = (close - sar).abs();
        if distance < policy.proximity_buffer {
            return Classification::fallback(
                reading,
                Basis::TooClose,
                &format!(
                    "|close - SAR| {} within buffer {}: too close to call",
                    px(distance),
                    px(policy.proximity_buffer)
                ),
            );
        }

        let adx_note = adx.map_or_else(|| "ADX n/a".to_string(), |a| format!("ADX {a:.1}"));
        if close > sar {
            Classification::new(
                Signal::Buy,
                Basis::Directional,
                format!("close {} above SAR {} ({adx_note})", px(close), px(sar)),
            )
        } else if close < sar {
            Classification::new(
                Signal::Sell,
                Basis::Directional,
                format!("close {} below SAR {} ({adx_note})", px(close), px(sar)),
            )
        } else {
            Classification::fallback(
                reading,
                Basis::Undecided,
                &format!("close equals SAR at {}", px(close)),
            )
        }
    }
}
