//! Reporting and export: JSON, CSV, and Markdown artifact generation.
//!
//! Provides three export formats for snapshot reports:
//! - **JSON**: full round-trip serialization with schema versioning
//! - **CSV**: the strength matrix and the decision log for external tools
//! - **Markdown**: human-readable table plus run metadata
//!
//! All persisted artifacts include a `schema_version` field. Unknown versions
//! are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use fxstrength_core::matrix::{DecisionLog, ScoreMatrix};

use crate::runner::{MatrixReport, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `MatrixReport` to pretty JSON.
pub fn export_json(report: &MatrixReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize MatrixReport to JSON")
}

/// Deserialize a `MatrixReport` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<MatrixReport> {
    let report: MatrixReport =
        serde_json::from_str(json).context("failed to deserialize MatrixReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export the matrix as CSV: `currency`, one column per timeframe, `remark`.
pub fn export_matrix_csv(matrix: &ScoreMatrix) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    let mut header = vec!["currency".to_string()];
    header.extend(matrix.timeframes.iter().map(|tf| tf.label().to_string()));
    header.push("remark".to_string());
    wtr.write_record(&header)?;

    for row in &matrix.rows {
        let mut record = vec![row.currency.to_string()];
        record.extend(row.scores.iter().map(|s| s.to_string()));
        record.push(row.remark.to_string());
        wtr.write_record(&record)?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export the decision log as CSV, one row per classification.
///
/// Columns: interval, symbol, base, quote, signal, basis, fallback_used, rationale
pub fn export_log_csv(log: &DecisionLog) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "interval",
        "symbol",
        "base",
        "quote",
        "signal",
        "basis",
        "fallback_used",
        "rationale",
    ])?;

    for r in log.iter() {
        wtr.write_record([
            r.interval.label(),
            r.symbol.as_str(),
            r.base.as_str(),
            r.quote.as_str(),
            r.signal.as_str(),
            r.basis.as_str(),
            if r.fallback_used { "true" } else { "false" },
            r.rationale.as_str(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Markdown reports ───────────────────────────────────────────────

/// Render the matrix as a Markdown table.
pub fn matrix_markdown(matrix: &ScoreMatrix) -> String {
    let mut md = String::with_capacity(512);
    md.push_str("| Currency |");
    for tf in &matrix.timeframes {
        md.push_str(&format!(" {} |", tf.label()));
    }
    md.push_str(" Remark |\n| --- |");
    for _ in &matrix.timeframes {
        md.push_str(" ---: |");
    }
    md.push_str(" --- |\n");

    for row in &matrix.rows {
        md.push_str(&format!("| {} |", row.currency));
        for s in &row.scores {
            md.push_str(&format!(" {s:+} |"));
        }
        md.push_str(&format!(" {} |\n", row.remark));
    }
    md
}

/// Generate a Markdown report for one snapshot.
pub fn generate_report(report: &MatrixReport) -> String {
    let mut md = String::with_capacity(2048);

    md.push_str("# Currency Strength Report\n\n");

    md.push_str("## Metadata\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!(
        "| Generated | {} |\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    md.push_str(&format!("| Provider | {} |\n", report.provider));
    md.push_str(&format!("| Classifier | {} |\n", report.classifier));
    md.push_str(&format!(
        "| Remark Policy | {} |\n",
        report.matrix.remark_policy.name()
    ));
    md.push_str(&format!("| Config Hash | {} |\n", report.config_hash));
    md.push_str(&format!("| Elapsed | {} ms |\n", report.elapsed_ms));
    if report.provider == "synthetic" {
        md.push_str("| Data | **SYNTHETIC** |\n");
    }
    md.push('\n');

    md.push_str("## Strength Matrix\n\n");
    md.push_str(&matrix_markdown(&report.matrix));
    md.push('\n');

    let degraded: Vec<_> = report
        .log
        .iter()
        .filter(|r| r.basis.is_degraded() || r.fallback_used)
        .collect();
    md.push_str("## Degraded Decisions\n\n");
    if degraded.is_empty() {
        md.push_str("None.\n");
    } else {
        md.push_str("| Interval | Pair | Signal | Basis | Rationale |\n");
        md.push_str("| --- | --- | --- | --- | --- |\n");
        for r in degraded {
            md.push_str(&format!(
                "| {} | {} | {} | {} | {} |\n",
                r.interval,
                r.symbol,
                r.signal,
                r.basis,
                r.rationale.replace('|', "\\|")
            ));
        }
    }

    md
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for one snapshot.
///
/// Creates a directory named `snapshot_{timestamp}/` under `output_dir`
/// containing:
/// - `report.json`: the full `MatrixReport`
/// - `matrix.csv`: the strength table
/// - `decisions.csv`: the decision log
/// - `report.md`: human-readable summary
///
/// Returns the path to the created directory.
pub fn save_artifacts(report: &MatrixReport, output_dir: &Path) -> Result<PathBuf> {
    let dirname = format!("snapshot_{}", report.generated_at.format("%Y%m%d_%H%M%S"));
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    std::fs::write(run_dir.join("report.json"), export_json(report)?)?;
    std::fs::write(run_dir.join("matrix.csv"), export_matrix_csv(&report.matrix)?)?;
    std::fs::write(run_dir.join("decisions.csv"), export_log_csv(&report.log)?)?;
    std::fs::write(run_dir.join("report.md"), generate_report(report))?;

    tracing::info!(dir = %run_dir.display(), "saved artifacts");
    Ok(run_dir)
}

/// Load a `MatrixReport` from an artifact directory's report.json.
///
/// Rejects unknown schema versions.
pub fn load_artifacts(dir: &Path) -> Result<MatrixReport> {
    let path = dir.join("report.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}
