use crate::quality::QualityOutcome;
use crate::types::{
    BiasFlag, BiasFlags, FileDetails, FlagDetails, FlagKind, ImbalanceDirection, Report,
    SummaryAlert,
};

pub const ALERT_BIAS_IMBALANCE: &str = "Bias Imbalance";
pub const ALERT_BIAS_DISPARITY: &str = "Bias Disparity";
pub const ALERT_BIAS_DISPARATE_IMPACT: &str = "Bias Disparate Impact";

/// Merges the quality and bias sections into the final report.
pub struct ReportAssembler;

impl ReportAssembler {
    /// Build the report. Summary alerts are the quality alerts in order,
    /// followed by one alert per critical bias flag in attribute order.
    pub fn assemble(file_details: FileDetails, quality: QualityOutcome, bias_flags: BiasFlags) -> Report {
        let mut summary_alerts = quality.alerts;
        summary_alerts.extend(Self::bias_alerts(&bias_flags));

        Report {
            file_details,
            quality_checks: quality.checks,
            bias_flags,
            summary_alerts,
        }
    }

    /// Summary alerts for every critical flag, in attribute then flag order.
    pub fn bias_alerts(bias_flags: &BiasFlags) -> Vec<SummaryAlert> {
        bias_flags
            .attributes
            .iter()
            .flat_map(|attr| {
                attr.flags
                    .iter()
                    .filter(|f| f.is_critical())
                    .filter_map(move |f| summarize_flag(&attr.attribute, f))
            })
            .collect()
    }
}

fn summarize_flag(attribute: &str, flag: &BiasFlag) -> Option<SummaryAlert> {
    let alert = match (flag.kind, flag.details.as_ref()?) {
        (
            FlagKind::Imbalance,
            FlagDetails::Imbalance {
                group,
                proportion,
                direction,
            },
        ) => {
            let verdict = match direction {
                ImbalanceDirection::Dominant => "Significant imbalance.",
                ImbalanceDirection::Rare => "Rare representation.",
            };
            SummaryAlert::new(
                ALERT_BIAS_IMBALANCE,
                format!("'{}' is {:.2}% '{}'. {}", attribute, proportion, group, verdict),
            )
            .with_group(group.clone())
        }
        (
            FlagKind::Disparity,
            FlagDetails::Disparity {
                max_group,
                min_group,
                gap,
                ..
            },
        ) => SummaryAlert::new(
            ALERT_BIAS_DISPARITY,
            format!(
                "'{}' shows {:.2} percentage points disparity in favorable outcomes between '{}' and '{}'.",
                attribute, gap, max_group, min_group
            ),
        ),
        (FlagKind::DisparateImpact, FlagDetails::DisparateImpact(summary)) => {
            let comparisons: Vec<String> = summary
                .critical_comparisons
                .iter()
                .map(|group| match summary.ratios.get(group) {
                    Some(ratio) => format!("'{}' ({:.2})", group, ratio),
                    None => format!("'{}'", group),
                })
                .collect();
            SummaryAlert::new(
                ALERT_BIAS_DISPARATE_IMPACT,
                format!(
                    "Disparate impact in '{}' relative to '{}': {}.",
                    attribute,
                    summary.privileged_group,
                    comparisons.join(", ")
                ),
            )
        }
        _ => return None,
    };
    Some(alert.with_column(attribute))
}
