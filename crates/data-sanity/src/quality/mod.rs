//! Data quality aggregation module.
//!
//! This module turns column profiles into the `quality_checks` report section
//! and raises missing-value and duplicate-row alerts.

mod aggregator;

pub use aggregator::{ALERT_DUPLICATE_ROWS, ALERT_MISSING_DATA, QualityAggregator, QualityOutcome};
