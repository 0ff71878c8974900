//! Bias flag evaluation: imbalance, outcome disparity and Disparate Impact Ratio.

use super::groups::{GroupStats, GroupStatsCalculator, OutcomeSpec};
use crate::config::{AnalysisConfig, Thresholds};
use crate::error::Result;
use crate::types::{
    AttributeFlags, BiasFlag, BiasFlags, DirSummary, FlagDetails, FlagKind, ImbalanceDirection,
    NoticeLevel, OrderedMap, Severity,
};
use crate::utils::{round2, values_match};
use polars::prelude::*;
use tracing::{info, warn};

/// Flags and global notices produced for a single attribute.
#[derive(Debug, Default)]
struct AttributeOutcome {
    flags: Vec<BiasFlag>,
    errors: Vec<BiasFlag>,
}

pub struct BiasFlagEngine;

impl BiasFlagEngine {
    /// Evaluate every configured sensitive attribute against the table.
    ///
    /// Never fails: configuration gaps become `_info` notices and per-attribute
    /// failures become `_error` notices.
    pub fn evaluate(df: &DataFrame, config: &AnalysisConfig) -> BiasFlags {
        let mut result = BiasFlags::default();

        for problem in &config.input_errors {
            warn!("Input error: {}", problem);
            result.push_notice(NoticeLevel::Error, BiasFlag::error(problem.clone()));
        }

        if config.sensitive_attributes.is_empty() {
            if config.input_errors.is_empty() {
                result.push_notice(
                    NoticeLevel::Info,
                    BiasFlag::info("No sensitive attributes provided. Bias checks were skipped."),
                );
            }
            return result;
        }

        let (present, missing): (Vec<&String>, Vec<&String>) = config
            .sensitive_attributes
            .iter()
            .partition(|name| df.column(name.as_str()).is_ok());

        if !missing.is_empty() {
            let names: Vec<&str> = missing.iter().map(|s| s.as_str()).collect();
            warn!("Sensitive attributes not found: {:?}", names);
            result.push_notice(
                NoticeLevel::Info,
                BiasFlag::info(format!(
                    "Missing Columns: the following sensitive attributes were not found in your data: {}. Please check column names.",
                    names.join(", ")
                )),
            );
        }

        if present.is_empty() {
            return result;
        }

        let outcome = Self::resolve_outcome(df, config, &mut result);
        let privileged = match (outcome, config.privileged_group_value.as_deref()) {
            (Some(_), Some(value)) => Some(value),
            (Some(_), None) => {
                result.push_notice(
                    NoticeLevel::Info,
                    BiasFlag::info(
                        "No privileged group value provided. Disparate Impact Ratio checks were skipped.",
                    ),
                );
                None
            }
            (None, _) => None,
        };

        for attribute in present {
            info!("Evaluating bias for sensitive attribute '{}'", attribute);
            match Self::evaluate_attribute(df, attribute, outcome, privileged, &config.thresholds) {
                Ok(evaluation) => {
                    for error in evaluation.errors {
                        result.push_notice(NoticeLevel::Error, error);
                    }
                    result.attributes.push(AttributeFlags {
                        attribute: attribute.clone(),
                        flags: evaluation.flags,
                    });
                }
                Err(e) => {
                    warn!("Bias analysis failed for '{}': {}", attribute, e);
                    result.push_notice(
                        NoticeLevel::Error,
                        BiasFlag::error(format!(
                            "Bias analysis failed for '{}': {}",
                            attribute, e
                        )),
                    );
                }
            }
        }

        result
    }

    /// Determine whether outcome-based checks can run, recording an `_info`
    /// notice for each reason they cannot.
    fn resolve_outcome<'a>(
        df: &DataFrame,
        config: &'a AnalysisConfig,
        result: &mut BiasFlags,
    ) -> Option<OutcomeSpec<'a>> {
        let Some(column) = config.outcome_column.as_deref() else {
            result.push_notice(
                NoticeLevel::Info,
                BiasFlag::info(
                    "No outcome column provided. Disparity and Disparate Impact Ratio checks were skipped.",
                ),
            );
            return None;
        };

        if df.column(column).is_err() {
            warn!("Outcome column '{}' not found", column);
            result.push_notice(
                NoticeLevel::Info,
                BiasFlag::info(format!(
                    "Outcome column '{}' not found in the data. Disparity and Disparate Impact Ratio checks were skipped.",
                    column
                )),
            );
            return None;
        }

        let Some(favorable_value) = config.favorable_outcome_value.as_deref() else {
            result.push_notice(
                NoticeLevel::Info,
                BiasFlag::info(
                    "No favorable outcome value provided. Disparity and Disparate Impact Ratio checks were skipped.",
                ),
            );
            return None;
        };

        Some(OutcomeSpec {
            column,
            favorable_value,
        })
    }

    fn evaluate_attribute(
        df: &DataFrame,
        attribute: &str,
        outcome: Option<OutcomeSpec<'_>>,
        privileged: Option<&str>,
        thresholds: &Thresholds,
    ) -> Result<AttributeOutcome> {
        let stats = GroupStatsCalculator::compute(df, attribute, outcome)?;
        let mut result = AttributeOutcome::default();

        if stats.is_empty() {
            result.flags.push(BiasFlag::info(format!(
                "Sensitive attribute '{}' contains only missing values. Bias checks were skipped.",
                attribute
            )));
            return Ok(result);
        }

        result
            .flags
            .extend(check_imbalance(attribute, &stats, thresholds));

        let Some(outcome) = outcome else {
            return Ok(result);
        };

        for group in stats.iter().filter(|s| s.favorable_rate.is_none()) {
            result.flags.push(BiasFlag::info(format!(
                "Group '{}' in '{}' has no non-missing values in '{}'. It was excluded from outcome checks.",
                group.group, attribute, outcome.column
            )));
        }

        let rated: Vec<&GroupStats> = stats.iter().filter(|s| s.favorable_rate.is_some()).collect();
        result
            .flags
            .push(check_disparity(attribute, outcome.column, &rated, thresholds));

        if let Some(privileged) = privileged {
            match check_disparate_impact(attribute, outcome.column, &rated, &stats, privileged, thresholds) {
                Ok(flag) => result.flags.push(flag),
                Err(notice) => {
                    warn!("Disparate Impact Ratio skipped for '{}': {}", attribute, notice.message);
                    result.errors.push(notice);
                }
            }
        }

        Ok(result)
    }
}

/// One flag per group outside the representation band. Groups are judged
/// independently.
fn check_imbalance(attribute: &str, stats: &[GroupStats], thresholds: &Thresholds) -> Vec<BiasFlag> {
    let mut flags = Vec::new();
    for group in stats {
        let (direction, message) = if group.proportion > thresholds.dominant_imbalance_pct {
            (
                ImbalanceDirection::Dominant,
                format!(
                    "Value '{}' makes up {:.2}% of data in '{}', exceeding dominant threshold of {}%. This significant imbalance could lead to bias.",
                    group.group, group.proportion, attribute, thresholds.dominant_imbalance_pct
                ),
            )
        } else if group.proportion < thresholds.rare_imbalance_pct {
            (
                ImbalanceDirection::Rare,
                format!(
                    "Value '{}' makes up {:.2}% of data in '{}', below rare threshold of {}%. This rare representation could lead to bias if not handled.",
                    group.group, group.proportion, attribute, thresholds.rare_imbalance_pct
                ),
            )
        } else {
            continue;
        };

        warn!(
            "Bias imbalance for '{}': '{}' at {:.2}%",
            attribute, group.group, group.proportion
        );
        flags.push(
            BiasFlag::new(FlagKind::Imbalance, Severity::Critical, message).with_details(
                FlagDetails::Imbalance {
                    group: group.group.clone(),
                    proportion: round2(group.proportion),
                    direction,
                },
            ),
        );
    }
    flags
}

/// Compare the highest and lowest favorable rates.
fn check_disparity(
    attribute: &str,
    outcome_column: &str,
    rated: &[&GroupStats],
    thresholds: &Thresholds,
) -> BiasFlag {
    if rated.len() < 2 {
        return BiasFlag::info(format!(
            "Not enough groups with outcome data in '{}' to check for disparity in '{}'.",
            attribute, outcome_column
        ));
    }

    let (mut max, mut min) = (rated[0], rated[0]);
    for &group in &rated[1..] {
        if rate(group) > rate(max) {
            max = group;
        }
        if rate(group) < rate(min) {
            min = group;
        }
    }

    let gap = rate(max) - rate(min);
    if gap > thresholds.disparity_pct {
        warn!(
            "Bias disparity for '{}' on '{}': {:.2} points",
            attribute, outcome_column, gap
        );
        BiasFlag::new(
            FlagKind::Disparity,
            Severity::Critical,
            format!(
                "Significant outcome disparity detected in '{}' across '{}' groups. Highest rate: {:.2}% ('{}'), lowest rate: {:.2}% ('{}'). Difference: {:.2} percentage points, exceeding threshold of {}.",
                outcome_column,
                attribute,
                rate(max),
                max.group,
                rate(min),
                min.group,
                gap,
                thresholds.disparity_pct
            ),
        )
        .with_details(FlagDetails::Disparity {
            max_group: max.group.clone(),
            max_rate: round2(rate(max)),
            min_group: min.group.clone(),
            min_rate: round2(rate(min)),
            gap: round2(gap),
        })
    } else {
        BiasFlag::info(format!(
            "Outcome disparity in '{}' across '{}' groups is {:.2} percentage points, which is below the alert threshold of {}.",
            outcome_column, attribute, gap, thresholds.disparity_pct
        ))
    }
}

/// Build the DIR Summary flag, or the `_error` notice explaining why the
/// ratio cannot be computed for this attribute.
fn check_disparate_impact(
    attribute: &str,
    outcome_column: &str,
    rated: &[&GroupStats],
    all: &[GroupStats],
    privileged: &str,
    thresholds: &Thresholds,
) -> std::result::Result<BiasFlag, BiasFlag> {
    let Some(reference) = find_group(all, privileged) else {
        return Err(BiasFlag::error(format!(
            "Privileged group value '{}' not found in column '{}'. Cannot calculate Disparate Impact Ratio.",
            privileged, attribute
        )));
    };

    let reference_rate = match reference.selection_rate() {
        None => {
            return Err(BiasFlag::error(format!(
                "Privileged group '{}' in '{}' has no non-missing values in '{}'. Cannot calculate Disparate Impact Ratio.",
                reference.group, attribute, outcome_column
            )));
        }
        Some(r) if r == 0.0 => {
            return Err(BiasFlag::error(format!(
                "Privileged group '{}' in '{}' has a 0% selection rate in '{}'. Disparate Impact Ratio cannot be meaningfully calculated.",
                reference.group, attribute, outcome_column
            )));
        }
        Some(r) => r,
    };

    let selection_rates: OrderedMap<f64> = rated
        .iter()
        .map(|g| (g.group.clone(), round2(rate(g))))
        .collect();

    let mut ratios = OrderedMap::new();
    let mut critical_comparisons = Vec::new();
    for group in rated.iter().filter(|g| g.group != reference.group) {
        let Some(selection) = group.selection_rate() else {
            continue;
        };
        let ratio = selection / reference_rate;
        ratios.insert(group.group.clone(), round2(ratio));
        if ratio < thresholds.dir_ratio {
            warn!(
                "Disparate impact for '{}' vs '{}' in '{}': {:.2}",
                group.group, reference.group, attribute, ratio
            );
            critical_comparisons.push(group.group.clone());
        }
    }

    let (severity, message) = if critical_comparisons.is_empty() {
        (
            Severity::Info,
            format!(
                "Disparate Impact Ratio for '{}' relative to privileged group '{}': no comparison below threshold {}.",
                attribute, reference.group, thresholds.dir_ratio
            ),
        )
    } else {
        (
            Severity::Critical,
            format!(
                "Disparate Impact Ratio for {} vs '{}' in '{}' is below threshold {}. This indicates potential adverse impact.",
                quoted_list(&critical_comparisons),
                reference.group,
                attribute,
                thresholds.dir_ratio
            ),
        )
    };

    Ok(
        BiasFlag::new(FlagKind::DisparateImpact, severity, message).with_details(
            FlagDetails::DisparateImpact(DirSummary {
                privileged_group: reference.group.clone(),
                selection_rates,
                ratios,
                critical_comparisons,
            }),
        ),
    )
}

/// Exact match on the trimmed value first, then a case-insensitive or numeric match.
fn find_group<'a>(stats: &'a [GroupStats], value: &str) -> Option<&'a GroupStats> {
    let value = value.trim();
    stats
        .iter()
        .find(|g| g.group == value)
        .or_else(|| stats.iter().find(|g| values_match(&g.group, value)))
}

fn rate(group: &GroupStats) -> f64 {
    group.favorable_rate.unwrap_or(0.0)
}

fn quoted_list(items: &[String]) -> String {
    items
        .iter()
        .map(|s| format!("'{}'", s))
        .collect::<Vec<_>>()
        .join(", ")
}
