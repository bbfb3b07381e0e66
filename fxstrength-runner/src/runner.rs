//! Snapshot runner: wires config, provider and assembler together.
//!
//! Two entry points:
//! - `run_snapshot()`: builds the provider from the config, then runs. Used by the CLI.
//! - `run_with_provider()`: takes an already-built provider. Used by tests and replays.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use fxstrength_core::data::{
    BarBackedProvider, CircuitBreaker, CsvBars, FetchError, MarketDataProvider, ReplayProvider,
    SyntheticBars, TradingViewProvider,
};
use fxstrength_core::matrix::{DecisionLog, MatrixAssembler, MatrixError, ScoreMatrix, TimeframeColumn};

use crate::config::{ConfigError, ProviderConfig, SnapshotConfig};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("provider setup failed: {0}")]
    Provider(#[from] FetchError),
    #[error("matrix error: {0}")]
    Matrix(#[from] MatrixError),
}

/// Current schema version for persisted reports.
pub const SCHEMA_VERSION: u32 = 1;

/// Complete result of one snapshot run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatrixReport {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub generated_at: DateTime<Utc>,
    pub config_hash: String,
    pub provider: String,
    pub classifier: String,
    pub parallel: bool,
    pub elapsed_ms: u64,
    pub matrix: ScoreMatrix,
    pub log: DecisionLog,
}

/// Default schema version for serde deserialization of older JSON without the field.
fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Instantiate the provider a config names.
pub fn build_provider(config: &SnapshotConfig) -> Result<Box<dyn MarketDataProvider>, RunError> {
    let bar_count = config.run.bar_count;
    let provider: Box<dyn MarketDataProvider> = match &config.provider {
        ProviderConfig::TradingView(settings) => Box::new(TradingViewProvider::new(
            settings.clone(),
            Arc::new(CircuitBreaker::default_provider()),
        )?),
        ProviderConfig::Synthetic { seed } => {
            Box::new(BarBackedProvider::new(SyntheticBars::new(*seed), bar_count))
        }
        ProviderConfig::Csv { dir } => Box::new(BarBackedProvider::new(CsvBars::new(dir), bar_count)),
        ProviderConfig::Replay { path } => Box::new(ReplayProvider::from_path(path)?),
    };
    Ok(provider)
}

/// Run one snapshot from a config (builds the provider itself).
pub fn run_snapshot(config: &SnapshotConfig) -> Result<MatrixReport, RunError> {
    config.validate()?;
    let provider = build_provider(config)?;
    run_with_provider(config, provider)
}

/// Run one snapshot against a pre-built provider.
pub fn run_with_provider<P: MarketDataProvider>(
    config: &SnapshotConfig,
    provider: P,
) -> Result<MatrixReport, RunError> {
    config.check_bars(Some(provider.supplies_bars()), provider.name())?;

    let start = Instant::now();
    let config_hash = config.config_hash()?;
    let provider_name = provider.name().to_string();
    let assembler = MatrixAssembler::new(config.matrix.clone(), provider)
        .map_err(ConfigError::from)?;
    let classifier = assembler.classifier_name().to_string();

    tracing::info!(
        provider = %provider_name,
        classifier = %classifier,
        parallel = config.run.parallel,
        hash = &config_hash[..12],
        "starting snapshot"
    );

    let snapshot = if config.run.parallel {
        let columns = config
            .matrix
            .timeframes
            .par_iter()
            .map(|tf| assembler.assemble_timeframe(tf))
            .collect::<Result<Vec<TimeframeColumn>, MatrixError>>()?;
        assembler.join(columns)?
    } else {
        assembler.run()?
    };

    let elapsed_ms = start.elapsed().as_millis() as u64;
    tracing::info!(
        rows = snapshot.matrix.rows.len(),
        decisions = snapshot.log.len(),
        degraded = snapshot.log.degraded_count(),
        elapsed_ms,
        "snapshot complete"
    );

    Ok(MatrixReport {
        schema_version: SCHEMA_VERSION,
        generated_at: Utc::now(),
        config_hash,
        provider: provider_name,
        classifier,
        parallel: config.run.parallel,
        elapsed_ms,
        matrix: snapshot.matrix,
        log: snapshot.log,
    })
}
