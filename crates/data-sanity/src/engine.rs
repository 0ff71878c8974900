//! Analysis engine: profile, aggregate, evaluate bias, assemble.

use crate::bias::BiasFlagEngine;
use crate::config::AnalysisConfig;
use crate::error::{Result, ResultExt};
use crate::loader::load_table;
use crate::profiler::ColumnProfiler;
use crate::quality::QualityAggregator;
use crate::reporting::ReportAssembler;
use crate::types::{FileDetails, Report};
use polars::prelude::*;
use std::path::Path;
use tracing::info;

/// Runs the full quality and bias analysis for one table.
///
/// The engine holds only its configuration; every call to [`analyze`] starts
/// from scratch and identical inputs produce identical reports.
///
/// # Example
///
/// ```rust,ignore
/// use data_sanity::{AnalysisConfig, AnalysisEngine, Thresholds};
///
/// let config = AnalysisConfig::builder()
///     .sensitive_attributes(["gender"])
///     .outcome_column("loan_status")
///     .favorable_outcome_value("Approved")
///     .privileged_group_value("Male")
///     .thresholds(Thresholds::from_env()?)
///     .build();
///
/// let report = AnalysisEngine::new(config).analyze_file("loans.csv")?;
/// println!("{}", serde_json::to_string_pretty(&report)?);
/// ```
///
/// [`analyze`]: AnalysisEngine::analyze
#[derive(Debug, Clone)]
pub struct AnalysisEngine {
    config: AnalysisConfig,
}

impl AnalysisEngine {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    /// Analyze an in-memory table.
    ///
    /// Fails only on infrastructure errors while computing the quality
    /// section. Bias problems never fail the call; they are reported in
    /// `bias_flags`.
    pub fn analyze(&self, df: &DataFrame, file_name: Option<&str>) -> Result<Report> {
        info!("{}", "=".repeat(60));
        info!("Starting data quality and bias analysis...");
        info!("{}", "=".repeat(60));

        let file_details = FileDetails {
            file_name: file_name.map(str::to_string),
            rows: df.height(),
            columns: df.width(),
            column_names: df
                .get_column_names()
                .into_iter()
                .map(|name| name.to_string())
                .collect(),
        };
        info!("Table: {} rows x {} columns", file_details.rows, file_details.columns);

        // Step 1: Column profiles
        let profiles = ColumnProfiler::profile_table(df).context("Column profiling failed")?;

        // Step 2: Quality checks
        let quality = QualityAggregator::aggregate(df, &profiles, &self.config.thresholds)
            .context("Quality checks failed")?;

        // Step 3: Bias flags
        let bias_flags = BiasFlagEngine::evaluate(df, &self.config);

        // Step 4: Report
        let report = ReportAssembler::assemble(file_details, quality, bias_flags);
        info!(
            "Analysis complete: {} summary alerts",
            report.summary_alerts.len()
        );

        Ok(report)
    }

    /// Load a CSV file and analyze it, recording its file name in the report.
    pub fn analyze_file(&self, path: impl AsRef<Path>) -> Result<Report> {
        let path = path.as_ref();
        info!("Loading dataset from: {}", path.display());
        let df = load_table(path)?;
        let file_name = path.file_name().and_then(|n| n.to_str());
        self.analyze(&df, file_name)
    }
}

static_assertions::assert_impl_all!(AnalysisEngine: Send, Sync);
static_assertions::assert_impl_all!(AnalysisConfig: Send, Sync);
static_assertions::assert_impl_all!(Report: Send, Sync);
