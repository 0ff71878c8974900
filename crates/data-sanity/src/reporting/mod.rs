//! Report assembly and output.
//!
//! [`ReportAssembler`] merges the quality and bias sections into a [`Report`]
//! and derives the consolidated `summary_alerts`. [`ReportWriter`] persists a
//! report as `<name>_report.json` (`--emit-report` CLI flag).
//!
//! # Example
//!
//! ```rust,ignore
//! use data_sanity::reporting::ReportWriter;
//!
//! let report = engine.analyze(&df, &config, Some("loans.csv"))?;
//! println!("{}", serde_json::to_string_pretty(&report)?);
//!
//! let writer = ReportWriter::new(PathBuf::from("output"));
//! writer.write_report_to_file(&report, "loans")?;
//! ```
//!
//! [`Report`]: crate::types::Report

mod assembler;
mod writer;

pub use assembler::{
    ALERT_BIAS_DISPARATE_IMPACT, ALERT_BIAS_DISPARITY, ALERT_BIAS_IMBALANCE, ReportAssembler,
};
pub use writer::ReportWriter;
