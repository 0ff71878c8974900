//! Per-group statistics for a sensitive attribute.

use crate::error::{AnalysisError, Result, ResultExt};
use crate::utils::{cell_texts, percentage, values_match};
use polars::prelude::*;
use std::collections::HashMap;

/// Outcome column and the value counted as favorable.
#[derive(Debug, Clone, Copy)]
pub struct OutcomeSpec<'a> {
    pub column: &'a str,
    pub favorable_value: &'a str,
}

/// Statistics for one distinct value of a sensitive attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupStats {
    pub group: String,
    pub count: usize,
    /// Share of non-missing attribute values, 0..=100.
    pub proportion: f64,
    /// Rows of this group whose outcome is non-missing.
    pub outcome_count: usize,
    pub favorable_count: usize,
    /// `favorable_count / outcome_count * 100`; `None` without an outcome or
    /// when the group has no non-missing outcomes.
    pub favorable_rate: Option<f64>,
}

impl GroupStats {
    fn new(group: String) -> Self {
        Self {
            group,
            count: 0,
            proportion: 0.0,
            outcome_count: 0,
            favorable_count: 0,
            favorable_rate: None,
        }
    }

    /// Selection rate as a fraction, for ratio comparisons.
    pub fn selection_rate(&self) -> Option<f64> {
        self.favorable_rate.map(|rate| rate / 100.0)
    }
}

pub struct GroupStatsCalculator;

impl GroupStatsCalculator {
    /// Compute statistics for every distinct non-missing value of `attribute`,
    /// in first-encountered order. Rows with a missing attribute value are
    /// excluded entirely.
    pub fn compute(
        df: &DataFrame,
        attribute: &str,
        outcome: Option<OutcomeSpec<'_>>,
    ) -> Result<Vec<GroupStats>> {
        let groups = cell_texts(column(df, attribute)?.as_materialized_series())
            .context(format!("Failed to read sensitive attribute '{}'", attribute))?;

        let outcomes = match outcome {
            Some(spec) => Some(
                cell_texts(column(df, spec.column)?.as_materialized_series())
                    .context(format!("Failed to read outcome column '{}'", spec.column))?,
            ),
            None => None,
        };

        let mut stats: Vec<GroupStats> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for (row, group) in groups.iter().enumerate() {
            let Some(group) = group else {
                continue;
            };
            let idx = match index.get(group.as_str()) {
                Some(&idx) => idx,
                None => {
                    index.insert(group.clone(), stats.len());
                    stats.push(GroupStats::new(group.clone()));
                    stats.len() - 1
                }
            };

            let entry = &mut stats[idx];
            entry.count += 1;

            if let (Some(outcomes), Some(spec)) = (&outcomes, outcome)
                && let Some(Some(value)) = outcomes.get(row)
            {
                entry.outcome_count += 1;
                if values_match(value, spec.favorable_value) {
                    entry.favorable_count += 1;
                }
            }
        }

        let total: usize = stats.iter().map(|s| s.count).sum();
        for entry in &mut stats {
            entry.proportion = percentage(entry.count, total);
            if outcome.is_some() && entry.outcome_count > 0 {
                entry.favorable_rate = Some(percentage(entry.favorable_count, entry.outcome_count));
            }
        }

        Ok(stats)
    }
}

fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name)
        .map_err(|_| AnalysisError::ColumnNotFound(name.to_string()))
}
