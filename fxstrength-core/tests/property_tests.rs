//! Property tests for ledger, classifier and remark invariants.
//!
//! Uses proptest to verify:
//! 1. Zero-sum: every ledger column sums to zero after any signal sequence
//! 2. Seeding: every configured currency exists at 0 before any apply
//! 3. Commutativity: pair order within a timeframe does not change scores
//! 4. Totality: classifiers return for arbitrary (even non-finite) readings
//! 5. Strict gating: ADX strictly below threshold is always NEUTRAL

use proptest::prelude::*;
use fxstrength_core::classifier::{Basis, ClassifierKind, SarAdxClassifier, SignalClassifier};
use fxstrength_core::config::TimeframePolicy;
use fxstrength_core::domain::{Bar, CurrencyCode, Interval, Pair, Signal};
use fxstrength_core::ledger::ScoreLedger;
use fxstrength_core::reading::IndicatorReading;
use fxstrength_core::remark::{Remark, RemarkPolicy};

const SYMBOLS: [&str; 9] = [
    "EURUSD", "GBPUSD", "USDJPY", "AUDUSD", "NZDUSD", "USDCAD", "EURJPY", "EURGBP", "GBPJPY",
];

fn pairs() -> Vec<Pair> {
    SYMBOLS.iter().map(|s| Pair::from_symbol(s).unwrap()).collect()
}

fn seeded(pairs: &[Pair]) -> ScoreLedger {
    ScoreLedger::new(
        pairs
            .iter()
            .flat_map(|p| [p.base().clone(), p.quote().clone()]),
    )
}

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_signal() -> impl Strategy<Value = Signal> {
    prop_oneof![Just(Signal::Buy), Just(Signal::Sell), Just(Signal::Neutral)]
}

/// One signal per basket pair, in basket order.
fn arb_signals() -> impl Strategy<Value = Vec<Signal>> {
    prop::collection::vec(arb_signal(), SYMBOLS.len())
}

/// A number that is sometimes absent and sometimes not finite.
fn arb_field() -> impl Strategy<Value = Option<f64>> {
    prop_oneof![
        4 => (0.5..200.0_f64).prop_map(Some),
        1 => Just(None),
        1 => Just(Some(f64::NAN)),
        1 => Just(Some(f64::INFINITY)),
    ]
}

fn arb_bars() -> impl Strategy<Value = Vec<Bar>> {
    prop::collection::vec((0.5..2.0_f64, 0.0..0.02_f64, 0.0..0.02_f64), 0..60).prop_map(|raw| {
        raw.into_iter()
            .map(|(close, up, down)| Bar::new(close, close + up, close - down, close))
            .collect()
    })
}

fn arb_reading() -> impl Strategy<Value = IndicatorReading> {
    (
        arb_field(),
        arb_field(),
        arb_field(),
        arb_bars(),
        prop::option::of(arb_signal()),
    )
        .prop_map(|(close, trend_stop, trend_strength, bars, recommendation)| IndicatorReading {
            close,
            trend_stop,
            trend_strength,
            bars,
            recommendation,
        })
}

// ── 1–3. Ledger ──────────────────────────────────────────────────────

proptest! {
    #[test]
    fn ledger_stays_zero_sum(signals in arb_signals()) {
        let pairs = pairs();
        let mut ledger = seeded(&pairs);
        for (pair, sig) in pairs.iter().zip(&signals) {
            ledger.apply(pair, *sig).unwrap();
            prop_assert_eq!(ledger.total(), 0);
        }
    }

    #[test]
    fn seeded_ledger_has_every_currency_at_zero(n in 1usize..=SYMBOLS.len()) {
        let pairs = &pairs()[..n];
        let ledger = seeded(pairs);
        for pair in pairs {
            prop_assert_eq!(ledger.score(pair.base()), Some(0));
            prop_assert_eq!(ledger.score(pair.quote()), Some(0));
        }
    }

    #[test]
    fn pair_order_does_not_matter(signals in arb_signals(), seed in any::<u64>()) {
        let pairs = pairs();
        let mut forward = seeded(&pairs);
        for (pair, sig) in pairs.iter().zip(&signals) {
            forward.apply(pair, *sig).unwrap();
        }

        // deterministic permutation from the seed
        let mut order: Vec<usize> = (0..pairs.len()).collect();
        let mut s = seed;
        for i in (1..order.len()).rev() {
            s = s.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            order.swap(i, (s >> 33) as usize % (i + 1));
        }
        let mut shuffled = seeded(&pairs);
        for &i in &order {
            shuffled.apply(&pairs[i], signals[i]).unwrap();
        }

        prop_assert_eq!(forward, shuffled);
    }

    #[test]
    fn score_magnitude_bounded_by_pair_count(signals in arb_signals()) {
        let pairs = pairs();
        let mut ledger = seeded(&pairs);
        for (pair, sig) in pairs.iter().zip(&signals) {
            ledger.apply(pair, *sig).unwrap();
        }
        for (ccy, score) in ledger.iter() {
            let involved = pairs
                .iter()
                .filter(|p| p.base() == ccy || p.quote() == ccy)
                .count() as i32;
            prop_assert!(score.abs() <= involved);
        }
    }
}

// ── 4–5. Classifiers ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn classifiers_are_total(reading in arb_reading(), lookback in 1usize..30, window in 1usize..5) {
        let policy = TimeframePolicy::new(Interval::H4)
            .with_lookback(lookback)
            .with_swing_window(window);
        for kind in [
            ClassifierKind::SarAdx,
            ClassifierKind::Breakout,
            ClassifierKind::FractalSwing,
            ClassifierKind::PctChange,
        ] {
            let c = kind.build().classify(&reading, &policy);
            if c.signal != Signal::Neutral {
                prop_assert!(c.basis == Basis::Directional || c.fallback_used);
            }
            if c.fallback_used {
                prop_assert_eq!(Some(c.signal), reading.recommendation);
            }
        }
    }

    #[test]
    fn adx_below_threshold_is_always_neutral(
        close in 0.5..2.0_f64,
        sar in 0.5..2.0_f64,
        adx in 0.0..19.999_f64,
        rec in prop::option::of(arb_signal()),
    ) {
        let mut reading = IndicatorReading::from_indicators(close, sar, adx);
        reading.recommendation = rec;
        let c = SarAdxClassifier.classify(&reading, &TimeframePolicy::new(Interval::D1));
        prop_assert_eq!(c.signal, Signal::Neutral);
        prop_assert_eq!(c.basis, Basis::WeakTrend);
    }
}

// ── Remarks ──────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn conservative_in_band_is_neutral(scores in prop::collection::vec(-3i32..=3, 1..6)) {
        prop_assert_eq!(RemarkPolicy::default().remark(&scores), Remark::Neutral);
    }

    #[test]
    fn sign_agreement_is_symmetric(scores in prop::collection::vec(-8i32..=8, 1..6)) {
        let negated: Vec<i32> = scores.iter().map(|s| -s).collect();
        let policy = RemarkPolicy::SignAgreement;
        prop_assert_eq!(policy.remark(&scores), policy.remark(&negated));
    }
}

#[test]
fn currency_codes_reject_bad_input() {
    assert!(CurrencyCode::new("EU").is_err());
    assert!(CurrencyCode::new("E1R").is_err());
    assert_eq!(CurrencyCode::new("eur").unwrap().as_str(), "EUR");
}
