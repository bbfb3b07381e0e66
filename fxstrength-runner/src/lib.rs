//! FX Strength Runner: snapshot orchestration and report export.
//!
//! This crate builds on `fxstrength-core` to provide:
//! - TOML snapshot configuration with provider selection
//! - Sequential or rayon-parallel matrix assembly
//! - Versioned reports with config fingerprints
//! - JSON, CSV, and Markdown artifacts

pub mod config;
pub mod export;
pub mod runner;

pub use config::{ConfigError, ProviderConfig, RunOptions, SnapshotConfig, MAX_BAR_COUNT};
pub use export::{
    export_json, export_log_csv, export_matrix_csv, generate_report, import_json, load_artifacts,
    matrix_markdown, save_artifacts,
};
pub use runner::{build_provider, run_snapshot, run_with_provider, MatrixReport, RunError, SCHEMA_VERSION};
