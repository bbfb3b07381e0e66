//! Serializable snapshot configuration.
//!
//! A snapshot config is one TOML file with three sections:
//!
//! ```toml
//! [matrix]      # pairs, timeframes, classifier, remark policy, display order
//! [provider]    # type = "tradingview" | "synthetic" | "csv" | "replay"
//! [run]         # parallel, bar_count
//! ```
//!
//! Every section is optional; omitted sections take their defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use fxstrength_core::config::MatrixConfig;
use fxstrength_core::data::TradingViewSettings;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(String),

    #[error("invalid matrix config: {0}")]
    Matrix(#[from] fxstrength_core::config::ConfigError),

    #[error("classifier '{classifier}' needs bar series but provider '{provider}' supplies none")]
    BarsUnavailable { classifier: String, provider: String },

    #[error("bar_count {bar_count} is below the {required} bars the timeframes need")]
    BarCount { bar_count: usize, required: usize },

    #[error("bar_count {bar_count} exceeds the maximum of {max}")]
    BarCountTooLarge { bar_count: usize, max: usize },
}

/// Upper bound on bars fetched per (pair, interval).
pub const MAX_BAR_COUNT: usize = 10_000;

/// Where readings come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Live scanner readings.
    #[serde(rename = "tradingview")]
    TradingView(TradingViewSettings),

    /// Deterministic random-walk bars.
    Synthetic {
        #[serde(default = "default_seed")]
        seed: u64,
    },

    /// `{dir}/{SYMBOL}_{INTERVAL}.csv` bar files.
    Csv { dir: PathBuf },

    /// Frozen readings captured earlier.
    Replay { path: PathBuf },
}

fn default_seed() -> u64 {
    42
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig::TradingView(TradingViewSettings::default())
    }
}

impl ProviderConfig {
    pub fn name(&self) -> &'static str {
        match self {
            ProviderConfig::TradingView(_) => "tradingview",
            ProviderConfig::Synthetic { .. } => "synthetic",
            ProviderConfig::Csv { .. } => "csv",
            ProviderConfig::Replay { .. } => "replay",
        }
    }

    /// Whether readings will carry bars; `None` until a replay file is loaded.
    pub fn supplies_bars(&self) -> Option<bool> {
        match self {
            ProviderConfig::TradingView(_) => Some(false),
            ProviderConfig::Synthetic { .. } | ProviderConfig::Csv { .. } => Some(true),
            ProviderConfig::Replay { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOptions {
    /// Build timeframe columns concurrently.
    #[serde(default)]
    pub parallel: bool,
    /// Bars fetched per (pair, interval) by bar-backed providers.
    #[serde(default = "default_bar_count")]
    pub bar_count: usize,
}

fn default_bar_count() -> usize {
    200
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            parallel: false,
            bar_count: default_bar_count(),
        }
    }
}

/// Top-level config file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SnapshotConfig {
    #[serde(default)]
    pub matrix: MatrixConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub run: RunOptions,
}

impl SnapshotConfig {
    /// Parse and validate a config from TOML.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: SnapshotConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Reject configs that cannot produce a meaningful matrix before any fetch.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.matrix.validate()?;
        self.check_bars(self.provider.supplies_bars(), self.provider.name())?;

        if self.run.bar_count > MAX_BAR_COUNT {
            return Err(ConfigError::BarCountTooLarge {
                bar_count: self.run.bar_count,
                max: MAX_BAR_COUNT,
            });
        }

        let required = self.matrix.max_bars_required();
        if self.provider.supplies_bars() == Some(true) && self.run.bar_count < required {
            return Err(ConfigError::BarCount {
                bar_count: self.run.bar_count,
                required,
            });
        }
        Ok(())
    }

    /// Bar-series classifiers are useless against a provider without bars.
    pub fn check_bars(&self, supplies_bars: Option<bool>, provider: &str) -> Result<(), ConfigError> {
        if self.matrix.classifier.requires_bars() && supplies_bars == Some(false) {
            return Err(ConfigError::BarsUnavailable {
                classifier: self.matrix.classifier.build().name().to_string(),
                provider: provider.to_string(),
            });
        }
        Ok(())
    }

    /// Content hash of the full config (blake3 over canonical JSON).
    ///
    /// Two runs with identical configs share a hash.
    pub fn config_hash(&self) -> Result<String, ConfigError> {
        let json = serde_json::to_string(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        Ok(blake3::hash(json.as_bytes()).to_hex().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fxstrength_core::classifier::ClassifierKind;
    use fxstrength_core::domain::Interval;
    use fxstrength_core::remark::RemarkPolicy;

    #[test]
    fn empty_file_is_default_config() {
        let config = SnapshotConfig::from_toml("").unwrap();
        assert_eq!(config, SnapshotConfig::default());
        assert_eq!(config.matrix.pairs.len(), 9);
        assert_eq!(config.provider.name(), "tradingview");
    }

    #[test]
    fn parses_full_config() {
        let toml_str = r#"
            [matrix]
            classifier = "breakout"
            display_order = ["EUR", "USD"]
            remark = { type = "magnitude_banded", threshold = 3 }

            [[matrix.pairs]]
            symbol = "EURUSD"

            [[matrix.pairs]]
            symbol = "FX:GBPUSD"
            base = "GBP"
            quote = "USD"

            [[matrix.timeframes]]
            interval = "H4"
            lookback = 30

            [provider]
            type = "synthetic"
            seed = 7

            [run]
            parallel = true
            bar_count = 120
        "#;
        let config = SnapshotConfig::from_toml(toml_str).unwrap();
        assert_eq!(config.matrix.classifier, ClassifierKind::Breakout);
        assert_eq!(config.matrix.remark, RemarkPolicy::MagnitudeBanded { threshold: 3 });
        assert_eq!(config.matrix.pairs[1].symbol(), "FX:GBPUSD");
        assert_eq!(config.matrix.timeframes[0].interval, Interval::H4);
        assert_eq!(config.matrix.timeframes[0].lookback, 30);
        assert_eq!(config.matrix.timeframes[0].strength_threshold, 20.0);
        assert_eq!(config.provider, ProviderConfig::Synthetic { seed: 7 });
        assert!(config.run.parallel);
    }

    #[test]
    fn tradingview_settings_flatten_into_provider_table() {
        let config = SnapshotConfig::from_toml(
            "[provider]\ntype = \"tradingview\"\nexchange = \"OANDA\"\ntimeout_secs = 5\n",
        )
        .unwrap();
        match config.provider {
            ProviderConfig::TradingView(s) => {
                assert_eq!(s.exchange, "OANDA");
                assert_eq!(s.timeout_secs, 5);
                assert_eq!(s.screener, "forex");
            }
            other => panic!("unexpected provider {other:?}"),
        }
    }

    #[test]
    fn oversized_bar_count_is_rejected() {
        let toml_str = r#"
            [[matrix.timeframes]]
            interval = "MN"

            [provider]
            type = "synthetic"

            [run]
            bar_count = 4000000
        "#;
        let err = SnapshotConfig::from_toml(toml_str).unwrap_err();
        assert!(
            matches!(
                err,
                ConfigError::BarCountTooLarge {
                    bar_count: 4_000_000,
                    max: MAX_BAR_COUNT
                }
            ),
            "{err}"
        );
    }

    #[test]
    fn default_config_round_trips_through_toml() {
        let config = SnapshotConfig::default();
        let back = SnapshotConfig::from_toml(&config.to_toml().unwrap()).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn bar_classifier_with_scanner_is_rejected() {
        let err = SnapshotConfig::from_toml("[matrix]\nclassifier = \"fractal_swing\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::BarsUnavailable { .. }), "{err}");
    }

    #[test]
    fn short_bar_count_is_rejected() {
        let toml_str = "[matrix]\nclassifier = \"pct_change\"\n[provider]\ntype = \"synthetic\"\n[run]\nbar_count = 5\n";
        assert!(matches!(
            SnapshotConfig::from_toml(toml_str),
            Err(ConfigError::BarCount { required: 21, .. })
        ));
    }

    #[test]
    fn invalid_matrix_is_rejected() {
        let toml_str = "[matrix]\npairs = []\n";
        assert!(matches!(
            SnapshotConfig::from_toml(toml_str),
            Err(ConfigError::Matrix(_))
        ));
    }

    #[test]
    fn config_hash_tracks_content() {
        let a = SnapshotConfig::default();
        let mut b = a.clone();
        assert_eq!(a.config_hash().unwrap(), b.config_hash().unwrap());
        b.run.parallel = true;
        assert_ne!(a.config_hash().unwrap(), b.config_hash().unwrap());
        assert_eq!(a.config_hash().unwrap().len(), 64);
    }
}
