//! Column profiling.
//!
//! This module computes per-column descriptive facts:
//! - Missing count and percentage
//! - Type inference (numeric, boolean, text)
//! - Descriptive statistics for numeric columns
//! - A value-frequency preview for low-cardinality columns
//!
//! The profiler knows nothing about bias semantics.

mod statistics;
mod type_inference;

use crate::error::{AnalysisError, Result, ResultExt};
use crate::types::{ColumnProfile, InferredType, OrderedMap};
use crate::utils::{cell_texts, parse_number, percentage};
use polars::prelude::*;
use std::collections::HashMap;
use tracing::debug;

pub(crate) use statistics::compute_numeric_stats;
pub(crate) use type_inference::infer_column_type;

/// Columns with fewer distinct values than this always get a preview.
pub const PREVIEW_MAX_DISTINCT: usize = 50;
/// Columns whose distinct/rows ratio is below this get a preview.
pub const PREVIEW_MAX_DISTINCT_RATIO: f64 = 0.5;
/// Number of entries in a value preview.
pub const PREVIEW_TOP_N: usize = 10;

/// Column profiler for analyzing table structure.
pub struct ColumnProfiler;

impl ColumnProfiler {
    /// Profile every column of the table, in column order.
    pub fn profile_table(df: &DataFrame) -> Result<Vec<ColumnProfile>> {
        df.get_column_names()
            .into_iter()
            .map(|name| Self::profile_column(df, name.as_str()))
            .collect()
    }

    /// Profile a single column.
    pub fn profile_column(df: &DataFrame, col_name: &str) -> Result<ColumnProfile> {
        let col = df
            .column(col_name)
            .map_err(|_| AnalysisError::ColumnNotFound(col_name.to_string()))?;
        let series = col.as_materialized_series();
        let row_count = df.height();

        let texts = cell_texts(series).context(format!("Failed to read column '{}'", col_name))?;
        let present: Vec<&str> = texts.iter().flatten().map(String::as_str).collect();
        let missing_count = row_count - present.len();

        let inferred_type = infer_column_type(series.dtype(), &present);

        let numeric_stats = if inferred_type == InferredType::Numeric {
            let values: Vec<f64> = present.iter().filter_map(|v| parse_number(v)).collect();
            compute_numeric_stats(&values)
        } else {
            None
        };

        let counts = count_values(&present);
        let unique_count = counts.len();
        let value_counts_preview = build_preview(counts, row_count);

        debug!(
            "Profiled '{}': {} ({} missing, {} distinct)",
            col_name,
            inferred_type.as_str(),
            missing_count,
            unique_count
        );

        Ok(ColumnProfile {
            name: col_name.to_string(),
            dtype: format!("{:?}", series.dtype()),
            inferred_type,
            missing_count,
            missing_percentage: percentage(missing_count, row_count),
            unique_count,
            numeric_stats,
            value_counts_preview,
        })
    }
}

/// Count occurrences of each value, in first-encountered order.
fn count_values<'a>(present: &[&'a str]) -> Vec<(&'a str, usize)> {
    let mut counts: Vec<(&'a str, usize)> = Vec::new();
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    for &value in present {
        match index.get(value) {
            Some(&idx) => counts[idx].1 += 1,
            None => {
                index.insert(value, counts.len());
                counts.push((value, 1));
            }
        }
    }
    counts
}

/// Top values by descending frequency for low-cardinality columns.
///
/// Either cardinality rule qualifies a column. Ties keep first-encountered order.
fn build_preview(mut counts: Vec<(&str, usize)>, row_count: usize) -> Option<OrderedMap<usize>> {
    let distinct = counts.len();
    if distinct == 0 {
        return None;
    }
    let low_cardinality = distinct < PREVIEW_MAX_DISTINCT
        || (distinct as f64 / row_count as f64) < PREVIEW_MAX_DISTINCT_RATIO;
    if !low_cardinality {
        return None;
    }

    // `sort_by` is stable, so equal counts stay in encounter order.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    Some(
        counts
            .into_iter()
            .take(PREVIEW_TOP_N)
            .map(|(value, count)| (value.to_string(), count))
            .collect(),
    )
}
