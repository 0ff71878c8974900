//! Data Quality and Bias Analysis Library
//!
//! Inspects a tabular dataset and produces a structured report of data quality
//! facts and fairness warnings, built with Rust and Polars.
//!
//! # Overview
//!
//! - **Column Profiling**: type inference, missing values, descriptive statistics
//!   and value-frequency previews
//! - **Quality Checks**: missing-value and duplicate-row alerts
//! - **Bias Checks**: group imbalance, favorable-outcome disparity and Disparate
//!   Impact Ratio over designated sensitive attributes
//! - **Reporting**: a deterministic JSON report with consolidated summary alerts
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use data_sanity::{AnalysisConfig, AnalysisEngine, Thresholds, load_table};
//!
//! let df = load_table("loans.csv")?;
//!
//! let config = AnalysisConfig::builder()
//!     .sensitive_attributes_raw(r#"["gender", "race"]"#)
//!     .outcome_column("loan_status")
//!     .favorable_outcome_value("Approved")
//!     .privileged_group_value("Male")
//!     .thresholds(Thresholds::from_env()?)
//!     .build();
//!
//! let report = AnalysisEngine::new(config).analyze(&df, Some("loans.csv"))?;
//!
//! for alert in &report.summary_alerts {
//!     println!("[{}] {}", alert.alert_type, alert.message);
//! }
//! ```
//!
//! # Configuration
//!
//! Thresholds default to the common rules of thumb (5% missing, 90%/10%
//! representation band, 20-point disparity, 0.8 DIR) and can be overridden
//! through the environment or the builder:
//!
//! ```rust,ignore
//! use data_sanity::Thresholds;
//!
//! let thresholds = Thresholds::builder()
//!     .missing_value_pct(10.0)
//!     .dir_ratio(0.75)
//!     .build()?;
//! ```
//!
//! Configuration gaps (no outcome column, unknown attributes, ...) never fail
//! an analysis; they are reported under `bias_flags._info` and
//! `bias_flags._error`.

pub mod bias;
pub mod config;
pub mod engine;
pub mod error;
pub mod loader;
pub mod profiler;
pub mod quality;
pub mod reporting;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use bias::{BiasFlagEngine, GroupStats, GroupStatsCalculator, OutcomeSpec};
pub use config::{
    AnalysisConfig, AnalysisConfigBuilder, AttributeParseError, ConfigValidationError,
    Thresholds, ThresholdsBuilder, parse_sensitive_attributes,
};
pub use engine::AnalysisEngine;
pub use error::{AnalysisError, Result as AnalysisResult, ResultExt};
pub use loader::load_table;
pub use profiler::ColumnProfiler;
pub use quality::{QualityAggregator, QualityOutcome};
pub use reporting::{ReportAssembler, ReportWriter};
pub use types::{
    AttributeFlags, BiasFlag, BiasFlags, ColumnProfile, DirSummary, FileDetails, FlagDetails,
    FlagKind, GlobalNotice, ImbalanceDirection, InferredType, MissingValueStat, NoticeLevel,
    NumericStats, OrderedMap, QualityChecks, Report, Severity, SummaryAlert,
};
