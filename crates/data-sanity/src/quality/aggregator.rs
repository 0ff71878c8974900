use crate::config::Thresholds;
use crate::error::Result;
use crate::types::{ColumnProfile, MissingValueStat, QualityChecks, SummaryAlert};
use crate::utils::round2;
use polars::prelude::*;
use tracing::{info, warn};

pub const ALERT_MISSING_DATA: &str = "Missing Data";
pub const ALERT_DUPLICATE_ROWS: &str = "Duplicate Rows";

/// Output of the quality pass: the `quality_checks` section and its alerts.
#[derive(Debug, Clone)]
pub struct QualityOutcome {
    pub checks: QualityChecks,
    pub alerts: Vec<SummaryAlert>,
}

pub struct QualityAggregator;

impl QualityAggregator {
    /// Assemble `quality_checks` from column profiles plus dataset-level facts.
    pub fn aggregate(
        df: &DataFrame,
        profiles: &[ColumnProfile],
        thresholds: &Thresholds,
    ) -> Result<QualityOutcome> {
        let mut checks = QualityChecks::default();
        let mut alerts = Vec::new();

        // Missing values
        for profile in profiles {
            if profile.missing_count == 0 {
                continue;
            }
            checks.missing_values.insert(
                profile.name.clone(),
                MissingValueStat {
                    count: profile.missing_count,
                    percentage: round2(profile.missing_percentage),
                },
            );
            if let Some(alert) = Self::missing_value_alert(profile, thresholds) {
                warn!(
                    "Missing data alert: '{}' has {:.2}% missing values",
                    profile.name, profile.missing_percentage
                );
                alerts.push(alert);
            }
        }

        // Duplicate rows
        checks.duplicate_rows = Self::count_duplicate_rows(df)?;
        if checks.duplicate_rows > 0 {
            warn!(
                "Duplicate rows alert: {} duplicates found",
                checks.duplicate_rows
            );
            alerts.push(SummaryAlert::new(
                ALERT_DUPLICATE_ROWS,
                format!(
                    "{} exact duplicate rows detected.",
                    checks.duplicate_rows
                ),
            ));
        }

        // Types, statistics and previews
        for profile in profiles {
            checks
                .column_data_types
                .insert(profile.name.clone(), profile.inferred_type);
            if let Some(stats) = &profile.numeric_stats {
                checks
                    .column_statistics
                    .insert(profile.name.clone(), stats.clone());
            }
            if let Some(preview) = &profile.value_counts_preview {
                checks
                    .unique_values_preview
                    .insert(profile.name.clone(), preview.clone());
            }
        }

        info!(
            "Quality checks complete: {} columns with missing values, {} duplicate rows",
            checks.missing_values.len(),
            checks.duplicate_rows
        );

        Ok(QualityOutcome { checks, alerts })
    }

    /// Rows beyond the first occurrence of each distinct row.
    pub fn count_duplicate_rows(df: &DataFrame) -> Result<usize> {
        if df.height() == 0 || df.width() == 0 {
            return Ok(0);
        }
        let distinct = df
            .unique::<&str, &str>(None, UniqueKeepStrategy::First, None)?
            .height();
        Ok(df.height() - distinct)
    }

    /// Compares the unrounded percentage; the message shows two decimals.
    fn missing_value_alert(profile: &ColumnProfile, thresholds: &Thresholds) -> Option<SummaryAlert> {
        if profile.missing_percentage <= thresholds.missing_value_pct {
            return None;
        }
        Some(
            SummaryAlert::new(
                ALERT_MISSING_DATA,
                format!(
                    "'{}' has {:.2}% missing values, exceeding threshold of {}%.",
                    profile.name, profile.missing_percentage, thresholds.missing_value_pct
                ),
            )
            .with_column(profile.name.clone()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiler::ColumnProfiler;

    fn aggregate(df: &DataFrame) -> QualityOutcome {
        let profiles = ColumnProfiler::profile_table(df).unwrap();
        QualityAggregator::aggregate(df, &profiles, &Thresholds::default()).unwrap()
    }

    #[test]
    fn test_missing_values_only_lists_affected_columns() {
        let df = df![
            "a" => [Some(1i64), None, Some(3)],
            "b" => [Some(1i64), Some(2), Some(3)],
        ]
        .unwrap();
        let outcome = aggregate(&df);

        assert!(outcome.checks.missing_values.contains_key("a"));
        assert!(!outcome.checks.missing_values.contains_key("b"));
        let stat = outcome.checks.missing_values.get("a").unwrap();
        assert_eq!(stat.count, 1);
        assert_eq!(stat.percentage, 33.33);
    }

    #[test]
    fn test_missing_alert_above_threshold() {
        let df = df!["a" => [Some(1i64), None, Some(3), Some(4)]].unwrap();
        let outcome = aggregate(&df);
        assert_eq!(outcome.alerts.len(), 1);
        assert_eq!(outcome.alerts[0].alert_type, ALERT_MISSING_DATA);
        assert_eq!(outcome.alerts[0].column.as_deref(), Some("a"));
    }

    #[test]
    fn test_missing_at_threshold_does_not_alert() {
        // 1 of 20 rows missing = exactly 5%.
        let mut values: Vec<Option<i64>> = (0..19).map(Some).collect();
        values.push(None);
        let df = df!["a" => values].unwrap();
        let outcome = aggregate(&df);
        assert!(outcome.alerts.is_empty());
    }

    #[test]
    fn test_duplicate_rows_counted_beyond_first() {
        let df = df![
            "x" => [1i64, 1, 1, 2],
            "y" => ["a", "a", "a", "b"],
        ]
        .unwrap();
        let outcome = aggregate(&df);
        assert_eq!(outcome.checks.duplicate_rows, 2);
        assert!(
            outcome
                .alerts
                .iter()
                .any(|a| a.alert_type == ALERT_DUPLICATE_ROWS)
        );
    }

    #[test]
    fn test_no_duplicates() {
        let df = df!["x" => [1i64, 2, 3]].unwrap();
        assert_eq!(QualityAggregator::count_duplicate_rows(&df).unwrap(), 0);
    }

    #[test]
    fn test_statistics_only_for_numeric_columns() {
        let df = df![
            "n" => [1.0f64, 2.0, 3.0],
            "t" => ["a", "b", "c"],
        ]
        .unwrap();
        let outcome = aggregate(&df);
        assert!(outcome.checks.column_statistics.contains_key("n"));
        assert!(!outcome.checks.column_statistics.contains_key("t"));
        assert_eq!(outcome.checks.column_data_types.len(), 2);
    }
}
