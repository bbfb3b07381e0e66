//! Matrix assembly: timeframe outer loop, pair inner loop.
//!
//! For each configured timeframe a fresh [`ScoreLedger`] is seeded with every
//! currency, each pair is fetched, classified and folded in, and the ledger
//! becomes one column. Columns are then outer-joined on currency and a
//! [`Remark`] is computed per row.
//!
//! [`MatrixAssembler::assemble_timeframe`] and [`MatrixAssembler::join`] are
//! public so callers can build columns concurrently; as long as `join` sees
//! them in declared order the output is identical to [`MatrixAssembler::run`].

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::time::Instant;
use thiserror::Error;

use crate::classifier::{Basis, Classification, SignalClassifier};
use crate::config::{ConfigError, MatrixConfig, TimeframePolicy};
use crate::data::MarketDataProvider;
use crate::domain::{CurrencyCode, Interval, Pair, Signal};
use crate::ledger::{LedgerError, ScoreLedger};
use crate::reading::IndicatorReading;
use crate::remark::{Remark, RemarkPolicy};

#[derive(Debug, Error)]
pub enum MatrixError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("expected columns {expected:?}, got {got:?}")]
    ColumnMismatch {
        expected: Vec<Interval>,
        got: Vec<Interval>,
    },
}

/// One classification, as it was folded into a ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub interval: Interval,
    pub symbol: String,
    pub base: CurrencyCode,
    pub quote: CurrencyCode,
    pub signal: Signal,
    pub basis: Basis,
    #[serde(default)]
    pub fallback_used: bool,
    pub rationale: String,
}

impl DecisionRecord {
    fn new(interval: Interval, pair: &Pair, c: Classification) -> Self {
        Self {
            interval,
            symbol: pair.symbol().to_string(),
            base: pair.base().clone(),
            quote: pair.quote().clone(),
            signal: c.signal,
            basis: c.basis,
            fallback_used: c.fallback_used,
            rationale: c.rationale,
        }
    }
}

/// Append-only decision log in assembly order (timeframe outer, pair inner).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DecisionLog {
    records: Vec<DecisionRecord>,
}

impl DecisionLog {
    pub fn new() -> Self {
        Self::default()
    }

    fn extend(&mut self, records: Vec<DecisionRecord>) {
        self.records.extend(records);
    }

    pub fn records(&self) -> &[DecisionRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &DecisionRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn for_interval(&self, interval: Interval) -> impl Iterator<Item = &DecisionRecord> {
        self.records.iter().filter(move |r| r.interval == interval)
    }

    /// Number of decisions taken on a degraded or fallback path.
    pub fn degraded_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| r.basis.is_degraded() || r.fallback_used)
            .count()
    }
}

/// One timeframe's finished ledger plus the decisions that built it.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeframeColumn {
    pub interval: Interval,
    pub ledger: ScoreLedger,
    pub records: Vec<DecisionRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixRow {
    pub currency: CurrencyCode,
    /// One score per timeframe, in the matrix's column order.
    pub scores: Vec<i32>,
    pub remark: Remark,
}

/// Currency × timeframe score table with a remark column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreMatrix {
    pub timeframes: Vec<Interval>,
    pub rows: Vec<MatrixRow>,
    pub remark_policy: RemarkPolicy,
}

impl ScoreMatrix {
    pub fn row(&self, currency: &CurrencyCode) -> Option<&MatrixRow> {
        self.rows.iter().find(|r| &r.currency == currency)
    }

    pub fn score(&self, currency: &CurrencyCode, interval: Interval) -> Option<i32> {
        let col = self.timeframes.iter().position(|&t| t == interval)?;
        self.row(currency).and_then(|r| r.scores.get(col).copied())
    }

    /// Sum of one column; zero for every column built through a ledger.
    pub fn column_total(&self, interval: Interval) -> Option<i64> {
        let col = self.timeframes.iter().position(|&t| t == interval)?;
        Some(self.rows.iter().map(|r| i64::from(r.scores[col])).sum())
    }

    pub fn currencies(&self) -> impl Iterator<Item = &CurrencyCode> {
        self.rows.iter().map(|r| &r.currency)
    }
}

impl fmt::Display for ScoreMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<8}", "Currency")?;
        for tf in &self.timeframes {
            write!(f, "{:>6}", tf.label())?;
        }
        writeln!(f, "  Remark")?;
        for row in &self.rows {
            write!(f, "{:<8}", row.currency.as_str())?;
            for s in &row.scores {
                write!(f, "{s:>6}")?;
            }
            writeln!(f, "  {}", row.remark)?;
        }
        Ok(())
    }
}

/// Result of one full run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixSnapshot {
    pub matrix: ScoreMatrix,
    pub log: DecisionLog,
}

pub struct MatrixAssembler<P> {
    config: MatrixConfig,
    provider: P,
    classifier: Box<dyn SignalClassifier>,
    currencies: BTreeSet<CurrencyCode>,
}

impl<P: MarketDataProvider> MatrixAssembler<P> {
    /// Validate `config` and bind it to a provider.
    pub fn new(config: MatrixConfig, provider: P) -> Result<Self, ConfigError> {
        config.validate()?;
        let classifier = config.classifier.build();
        let currencies = config.currencies();
        Ok(Self {
            config,
            provider,
            classifier,
            currencies,
        })
    }

    pub fn config(&self) -> &MatrixConfig {
        &self.config
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn classifier_name(&self) -> &str {
        self.classifier.name()
    }

    /// Classify every pair for one timeframe into a fresh ledger.
    ///
    /// Fetch failures become NEUTRAL decisions; only ledger invariant
    /// violations are returned as errors.
    pub fn assemble_timeframe(&self, policy: &TimeframePolicy) -> Result<TimeframeColumn, MatrixError> {
        let interval = policy.interval;
        let mut ledger = ScoreLedger::new(self.currencies.iter().cloned());
        let mut records = Vec::with_capacity(self.config.pairs.len());

        for pair in &self.config.pairs {
            let decision = match self.provider.fetch_reading(pair.symbol(), interval) {
                Ok(reading) => self.classify(pair, interval, reading, policy),
                Err(e) => {
                    tracing::warn!(symbol = pair.symbol(), %interval, error = %e, "fetch failed, scoring NEUTRAL");
                    Classification::fetch_failed(&e)
                }
            };

            ledger.apply(pair, decision.signal)?;
            tracing::debug!(
                symbol = pair.symbol(),
                %interval,
                signal = %decision.signal,
                basis = %decision.basis,
                fallback = decision.fallback_used,
                "classified"
            );
            records.push(DecisionRecord::new(interval, pair, decision));
        }

        Ok(TimeframeColumn {
            interval,
            ledger,
            records,
        })
    }

    /// Classify, fetching the secondary recommendation only when the primary
    /// rule fell through to the fallback and the reading carries none.
    fn classify(
        &self,
        pair: &Pair,
        interval: Interval,
        reading: IndicatorReading,
        policy: &TimeframePolicy,
    ) -> Classification {
        let first = self.classifier.classify(&reading, policy);
        let wants_fallback = self.classifier.uses_fallback()
            && reading.recommendation.is_none()
            && first.basis.is_degraded();
        if !wants_fallback {
            return first;
        }

        match self.provider.fetch_recommendation(pair.symbol(), interval) {
            Ok(Some(rec)) => self
                .classifier
                .classify(&reading.with_recommendation(rec), policy),
            Ok(None) => first,
            Err(e) => {
                tracing::warn!(symbol = pair.symbol(), %interval, error = %e, "recommendation fetch failed");
                first
            }
        }
    }

    /// Outer-join finished columns into the matrix and concatenate their logs.
    ///
    /// `columns` must follow the configured timeframe order.
    pub fn join(&self, columns: Vec<TimeframeColumn>) -> Result<MatrixSnapshot, MatrixError> {
        let expected = self.config.intervals();
        let got: Vec<Interval> = columns.iter().map(|c| c.interval).collect();
        if expected != got {
            return Err(MatrixError::ColumnMismatch { expected, got });
        }

        let mut table: BTreeMap<CurrencyCode, Vec<i32>> = BTreeMap::new();
        for (col, column) in columns.iter().enumerate() {
            for (ccy, score) in column.ledger.iter() {
                let scores = table
                    .entry(ccy.clone())
                    .or_insert_with(|| vec![0; columns.len()]);
                scores[col] = score;
            }
        }

        let policy = self.config.remark;
        let mut rows = Vec::with_capacity(table.len());
        for ccy in &self.config.display_order {
            if let Some(scores) = table.remove(ccy) {
                rows.push(row(ccy.clone(), scores, &policy));
            }
        }
        rows.extend(table.into_iter().map(|(ccy, scores)| row(ccy, scores, &policy)));

        let mut log = DecisionLog::new();
        for column in columns {
            log.extend(column.records);
        }

        Ok(MatrixSnapshot {
            matrix: ScoreMatrix {
                timeframes: expected,
                rows,
                remark_policy: policy,
            },
            log,
        })
    }

    /// Build every column in declared order and join them.
    pub fn run(&self) -> Result<MatrixSnapshot, MatrixError> {
        let start = Instant::now();
        tracing::info!(
            provider = self.provider.name(),
            classifier = self.classifier.name(),
            pairs = self.config.pairs.len(),
            timeframes = self.config.timeframes.len(),
            "assembling matrix"
        );

        let columns = self
            .config
            .timeframes
            .iter()
            .map(|tf| self.assemble_timeframe(tf))
            .collect::<Result<Vec<_>, _>>()?;
        let snapshot = self.join(columns)?;

        tracing::info!(
            decisions = snapshot.log.len(),
            degraded = snapshot.log.degraded_count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "matrix assembled"
        );
        Ok(snapshot)
    }
}

fn row(currency: CurrencyCode, scores: Vec<i32>, policy: &RemarkPolicy) -> MatrixRow {
    let remark = policy.remark(&scores);
    MatrixRow {
        currency,
        scores,
        remark,
    }
}
