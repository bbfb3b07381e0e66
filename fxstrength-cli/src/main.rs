//! FX Strength CLI: compute, export, and capture currency strength matrices.
//!
//! Commands:
//! - `matrix`: build the matrix from a TOML config and print or save it
//! - `capture`: freeze the configured provider's readings into a replay file
//! - `config`: print the default configuration as TOML

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use fxstrength_core::classifier::ClassifierKind;
use fxstrength_core::data::{ReplayProvider, TradingViewSettings};
use fxstrength_runner::{
    build_provider, export_json, export_log_csv, export_matrix_csv, matrix_markdown, run_snapshot,
    save_artifacts, MatrixReport, ProviderConfig, SnapshotConfig,
};

#[derive(Parser)]
#[command(
    name = "fxstrength",
    about = "FX Strength: currency strength matrix across timeframes"
)]
struct Cli {
    /// Verbose logging (debug level, one line per classification).
    #[arg(short, long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the strength matrix and print it.
    Matrix {
        #[command(flatten)]
        source: SourceArgs,

        /// Override the configured classifier.
        #[arg(long, value_enum)]
        classifier: Option<ClassifierArg>,

        /// Output format on stdout.
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Also print the decision log.
        #[arg(long, default_value_t = false)]
        log: bool,

        /// Build timeframe columns in parallel.
        #[arg(long, default_value_t = false)]
        parallel: bool,

        /// Save report.json, matrix.csv, decisions.csv and report.md here.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Record the provider's readings for the configured basket into a replay file.
    Capture {
        #[command(flatten)]
        source: SourceArgs,

        /// Replay file to write.
        #[arg(long, default_value = "replay.json")]
        out: PathBuf,
    },
    /// Print the default configuration as TOML.
    Config,
}

#[derive(clap::Args)]
struct SourceArgs {
    /// Path to a TOML config file. Defaults to the built-in majors basket.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the configured data provider.
    #[arg(long, value_enum)]
    provider: Option<ProviderArg>,

    /// Seed for the synthetic provider (applies to a configured one too).
    #[arg(long)]
    seed: Option<u64>,

    /// Directory of `{SYMBOL}_{INTERVAL}.csv` files for the csv provider.
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Replay file for the replay provider.
    #[arg(long)]
    replay: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ProviderArg {
    Tradingview,
    Synthetic,
    Csv,
    Replay,
}

#[derive(Clone, Copy, ValueEnum)]
enum ClassifierArg {
    SarAdx,
    Breakout,
    FractalSwing,
    PctChange,
}

impl From<ClassifierArg> for ClassifierKind {
    fn from(arg: ClassifierArg) -> Self {
        match arg {
            ClassifierArg::SarAdx => ClassifierKind::SarAdx,
            ClassifierArg::Breakout => ClassifierKind::Breakout,
            ClassifierArg::FractalSwing => ClassifierKind::FractalSwing,
            ClassifierArg::PctChange => ClassifierKind::PctChange,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Csv,
    Json,
    Markdown,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Matrix {
            source,
            classifier,
            format,
            log,
            parallel,
            output_dir,
        } => run_matrix_cmd(source, classifier, format, log, parallel, output_dir),
        Commands::Capture { source, out } => run_capture_cmd(source, out),
        Commands::Config => {
            print!("{}", SnapshotConfig::default().to_toml()?);
            Ok(())
        }
    }
}

/// Logs go to stderr so stdout carries only the requested output.
fn init_logging(verbose: bool) {
    let default = if verbose { "fxstrength=debug" } else { "fxstrength=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(source: &SourceArgs) -> Result<SnapshotConfig> {
    let mut config = match &source.config {
        Some(path) => SnapshotConfig::from_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => SnapshotConfig::default(),
    };
    apply_source_args(&mut config, source)?;
    Ok(config)
}

/// Layer command-line provider flags over the loaded config.
///
/// `--seed`, `--data-dir` and `--replay` apply to whichever provider ends up
/// selected, whether it came from `--provider` or the config file.
fn apply_source_args(config: &mut SnapshotConfig, source: &SourceArgs) -> Result<()> {
    if let Some(provider) = source.provider {
        let current = std::mem::take(&mut config.provider);
        config.provider = match provider {
            ProviderArg::Tradingview => match current {
                ProviderConfig::TradingView(settings) => ProviderConfig::TradingView(settings),
                _ => ProviderConfig::TradingView(TradingViewSettings::default()),
            },
            ProviderArg::Synthetic => match current {
                ProviderConfig::Synthetic { seed } => ProviderConfig::Synthetic { seed },
                _ => ProviderConfig::Synthetic { seed: 42 },
            },
            ProviderArg::Csv => match (&source.data_dir, current) {
                (Some(dir), _) => ProviderConfig::Csv { dir: dir.clone() },
                (None, ProviderConfig::Csv { dir }) => ProviderConfig::Csv { dir },
                (None, _) => bail!("--provider csv requires --data-dir"),
            },
            ProviderArg::Replay => match (&source.replay, current) {
                (Some(path), _) => ProviderConfig::Replay { path: path.clone() },
                (None, ProviderConfig::Replay { path }) => ProviderConfig::Replay { path },
                (None, _) => bail!("--provider replay requires --replay"),
            },
        };
    }

    match &mut config.provider {
        ProviderConfig::Synthetic { seed } => {
            if let Some(s) = source.seed {
                *seed = s;
            }
        }
        ProviderConfig::Csv { dir } => {
            if let Some(d) = &source.data_dir {
                *dir = d.clone();
            }
        }
        ProviderConfig::Replay { path } => {
            if let Some(p) = &source.replay {
                *path = p.clone();
            }
        }
        ProviderConfig::TradingView(_) => {}
    }
    Ok(())
}

fn run_matrix_cmd(
    source: SourceArgs,
    classifier: Option<ClassifierArg>,
    format: OutputFormat,
    log: bool,
    parallel: bool,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let mut config = load_config(&source)?;
    if let Some(kind) = classifier {
        config.matrix.classifier = kind.into();
    }
    config.run.parallel |= parallel;
    config.validate()?;

    let report = run_snapshot(&config)?;

    match format {
        OutputFormat::Table => print_table(&report, log),
        OutputFormat::Csv => {
            print!("{}", export_matrix_csv(&report.matrix)?);
            if log {
                println!();
                print!("{}", export_log_csv(&report.log)?);
            }
        }
        OutputFormat::Json => println!("{}", export_json(&report)?),
        OutputFormat::Markdown => print!("{}", matrix_markdown(&report.matrix)),
    }

    if let Some(dir) = output_dir {
        let run_dir = save_artifacts(&report, &dir)?;
        eprintln!("Artifacts saved to: {}", run_dir.display());
    }
    Ok(())
}

fn run_capture_cmd(source: SourceArgs, out: PathBuf) -> Result<()> {
    let config = load_config(&source)?;
    config.validate()?;
    let provider = build_provider(&config)?;
    let replay = ReplayProvider::capture(&provider, &config.matrix.pairs, &config.matrix.intervals());
    std::fs::write(&out, replay.to_json()?)
        .with_context(|| format!("failed to write {}", out.display()))?;
    eprintln!("Captured {} readings to {}", replay.len(), out.display());
    Ok(())
}

fn print_table(report: &MatrixReport, log: bool) {
    println!();
    println!("=== Currency Strength ===");
    println!("Provider:       {}", report.provider);
    println!("Classifier:     {}", report.classifier);
    println!("Remark policy:  {}", report.matrix.remark_policy.name());
    println!("Generated:      {}", report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"));
    println!();
    print!("{}", report.matrix);

    let degraded = report.log.degraded_count();
    if degraded > 0 {
        println!();
        println!("WARNING: {degraded} of {} decisions took a degraded path", report.log.len());
    }
    if report.provider == "synthetic" {
        println!("WARNING: Results based on SYNTHETIC data");
    }

    if log {
        println!();
        println!("--- Decisions ---");
        for r in report.log.iter() {
            println!(
                "{:<4} {:<8} {:<8} {:<20} {}",
                r.interval.label(),
                r.symbol,
                r.signal.as_str(),
                r.basis.as_str(),
                r.rationale
            );
        }
    }
    println!();
}
