//! CLI entry point for the data quality and bias checker.

use anyhow::{Result, anyhow};
use chrono::Local;
use clap::Parser;
use data_sanity::{AnalysisConfig, AnalysisEngine, NoticeLevel, Report, ReportWriter, Thresholds};
use dotenv::dotenv;
use std::path::{Path, PathBuf};
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    author = "Data Sanity Team",
    version,
    about = "Data quality and bias checker",
    long_about = "Profiles a CSV dataset and reports data quality issues and potential bias\n\
                  across sensitive attributes.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  MISSING_VALUE_THRESHOLD       Missing-value alert threshold in percent (5.0)\n  \
                  DOMINANT_IMBALANCE_THRESHOLD  Dominant group threshold in percent (90.0)\n  \
                  RARE_IMBALANCE_THRESHOLD      Rare group threshold in percent (10.0)\n  \
                  DISPARITY_THRESHOLD           Outcome disparity threshold in points (20.0)\n  \
                  DIR_THRESHOLD                 Disparate Impact Ratio threshold (0.8)\n\n\
                  EXAMPLES:\n  \
                  # Quality checks only\n  \
                  data-sanity -i loans.csv\n\n  \
                  # Full bias analysis\n  \
                  data-sanity -i loans.csv --sensitive gender,race --outcome loan_status \\\n      \
                  --favorable Approved --privileged Male\n\n  \
                  # Machine-readable output\n  \
                  data-sanity -i loans.csv --sensitive '[\"gender\"]' --json | jq .summary_alerts"
)]
struct Args {
    /// Path to the CSV file to analyze
    #[arg(short, long)]
    input: String,

    /// Sensitive attributes, as a JSON array or a comma-separated list
    #[arg(short, long)]
    sensitive: Option<String>,

    /// Outcome (decision) column
    #[arg(long)]
    outcome: Option<String>,

    /// Outcome value counted as favorable
    #[arg(long)]
    favorable: Option<String>,

    /// Privileged group value for Disparate Impact Ratio
    #[arg(long)]
    privileged: Option<String>,

    /// Missing-value alert threshold in percent (overrides MISSING_VALUE_THRESHOLD)
    #[arg(long)]
    missing_threshold: Option<f64>,

    /// Dominant group threshold in percent (overrides DOMINANT_IMBALANCE_THRESHOLD)
    #[arg(long)]
    dominant_threshold: Option<f64>,

    /// Rare group threshold in percent (overrides RARE_IMBALANCE_THRESHOLD)
    #[arg(long)]
    rare_threshold: Option<f64>,

    /// Outcome disparity threshold in percentage points (overrides DISPARITY_THRESHOLD)
    #[arg(long)]
    disparity_threshold: Option<f64>,

    /// Disparate Impact Ratio threshold (overrides DIR_THRESHOLD)
    #[arg(long)]
    dir_threshold: Option<f64>,

    /// Output directory for --emit-report
    #[arg(short, long, default_value = "./outputs")]
    output: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings, errors and the final result)
    #[arg(short, long)]
    quiet: bool,

    /// Output JSON to stdout instead of human-readable summary
    ///
    /// Disables all progress logs; only outputs the final JSON report.
    #[arg(long)]
    json: bool,

    /// Write the JSON report to the output directory
    ///
    /// The report will be saved as <input_name>_report.json
    #[arg(short = 'r', long)]
    emit_report: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    // Thresholds come from the environment, so .env must be loaded first
    dotenv().ok();

    if !Path::new(&args.input).exists() {
        return Err(anyhow!("Input file not found: {}", args.input));
    }

    let thresholds = resolve_thresholds(&args)?;
    let config = build_config(&args, thresholds);

    info!("Analyzing dataset: {}", args.input);
    let report = AnalysisEngine::new(config)
        .analyze_file(&args.input)
        .map_err(|e| {
            error!("Analysis of '{}' failed: {}", args.input, e);
            anyhow!("{}", e)
        })?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if args.emit_report {
        let input_stem = extract_file_stem(&args.input);
        let writer = ReportWriter::new(PathBuf::from(&args.output));
        let report_path = writer.write_report_to_file(&report, &input_stem)?;
        info!("Report written to: {}", report_path.display());
    }

    print_human_readable_summary(&report, &args);

    Ok(())
}

/// Environment thresholds with CLI overrides applied.
fn resolve_thresholds(args: &Args) -> Result<Thresholds> {
    let mut thresholds = Thresholds::from_env()?;

    if let Some(v) = args.missing_threshold {
        thresholds.missing_value_pct = v;
    }
    if let Some(v) = args.dominant_threshold {
        thresholds.dominant_imbalance_pct = v;
    }
    if let Some(v) = args.rare_threshold {
        thresholds.rare_imbalance_pct = v;
    }
    if let Some(v) = args.disparity_threshold {
        thresholds.disparity_pct = v;
    }
    if let Some(v) = args.dir_threshold {
        thresholds.dir_ratio = v;
    }

    thresholds.validate()?;
    Ok(thresholds)
}

fn build_config(args: &Args, thresholds: Thresholds) -> AnalysisConfig {
    let mut builder = AnalysisConfig::builder().thresholds(thresholds);

    if let Some(ref sensitive) = args.sensitive {
        builder = builder.sensitive_attributes_raw(sensitive);
    }
    if let Some(ref outcome) = args.outcome {
        builder = builder.outcome_column(outcome);
    }
    if let Some(ref favorable) = args.favorable {
        builder = builder.favorable_outcome_value(favorable);
    }
    if let Some(ref privileged) = args.privileged {
        builder = builder.privileged_group_value(privileged);
    }

    builder.build()
}

/// Extract the file stem (name without extension) from a path.
fn extract_file_stem(path: &str) -> String {
    Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output")
        .to_string()
}

/// Truncate a string to max length with ellipsis
fn truncate_str(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Print a human-readable summary of the report.
///
/// This is the default output when `--json` is not specified.
fn print_human_readable_summary(report: &Report, args: &Args) {
    let details = &report.file_details;
    let checks = &report.quality_checks;

    println!();
    println!("{}", "=".repeat(80));
    println!("DATA SANITY REPORT");
    println!("{}", "=".repeat(80));
    println!("Generated: {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
    println!(
        "Input:     {} ({} rows x {} columns)",
        args.input, details.rows, details.columns
    );
    println!();

    // Quality
    println!("QUALITY CHECKS");
    println!("{}", "-".repeat(40));
    println!("  Duplicate rows: {}", checks.duplicate_rows);
    if checks.missing_values.is_empty() {
        println!("  No missing values");
    } else {
        println!("  {:<24} {:>8} {:>10}", "Column", "Missing", "Percent");
        for (column, stat) in checks.missing_values.iter() {
            println!(
                "  {:<24} {:>8} {:>9.2}%",
                truncate_str(column, 23),
                stat.count,
                stat.percentage
            );
        }
    }
    println!();

    // Bias
    println!("BIAS CHECKS");
    println!("{}", "-".repeat(40));
    if report.bias_flags.attributes.is_empty() {
        println!("  No sensitive attributes analyzed");
    }
    for attribute in &report.bias_flags.attributes {
        let critical = attribute.flags.iter().filter(|f| f.is_critical()).count();
        println!(
            "  {}: {} flags ({} critical)",
            attribute.attribute,
            attribute.flags.len(),
            critical
        );
    }
    for notice in report.bias_flags.notices_at(NoticeLevel::Info) {
        println!("  i {}", notice.message);
    }
    for notice in report.bias_flags.notices_at(NoticeLevel::Error) {
        println!("  ! {}", notice.message);
    }
    println!();

    // Alerts
    if report.summary_alerts.is_empty() {
        println!("No alerts raised.");
    } else {
        println!("SUMMARY ALERTS ({})", report.summary_alerts.len());
        println!("{}", "-".repeat(40));
        for alert in &report.summary_alerts {
            println!("  [{}] {}", alert.alert_type, alert.message);
        }
    }
    println!();

    println!("Use --json for machine-readable output");
    println!("Use --emit-report to save the JSON report");
    println!("{}", "=".repeat(80));
}
