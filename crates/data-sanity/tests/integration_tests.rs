//! Integration tests for the analysis engine.
//!
//! These tests run the full load-analyze-serialize path over CSV fixtures.

use data_sanity::{
    AnalysisConfig, AnalysisEngine, FlagDetails, FlagKind, InferredType, NoticeLevel, Report,
    Severity, Thresholds, load_table,
};
use polars::prelude::*;
use pretty_assertions::assert_eq;
use std::path::PathBuf;

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_csv(filename: &str) -> DataFrame {
    load_table(fixtures_path().join(filename)).expect("Failed to read CSV fixture")
}

fn loans_config() -> AnalysisConfig {
    AnalysisConfig::builder()
        .sensitive_attributes_raw(r#"["gender", "race"]"#)
        .outcome_column("approved")
        .favorable_outcome_value("approved")
        .privileged_group_value("M")
        .build()
}

fn analyze(filename: &str, config: AnalysisConfig) -> Report {
    AnalysisEngine::new(config)
        .analyze_file(fixtures_path().join(filename))
        .expect("Analysis failed")
}

// ============================================================================
// Quality Checks
// ============================================================================

#[test]
fn test_loans_quality_section() {
    let report = analyze("loans.csv", loans_config());

    assert_eq!(report.file_details.file_name.as_deref(), Some("loans.csv"));
    assert_eq!(report.file_details.rows, 100);
    assert_eq!(
        report.file_details.column_names,
        vec!["applicant_id", "gender", "race", "income", "approved"]
    );

    let checks = &report.quality_checks;
    assert_eq!(checks.duplicate_rows, 0);
    assert_eq!(checks.missing_values.len(), 1);
    let income = checks.missing_values.get("income").unwrap();
    assert_eq!(income.count, 10);
    assert_eq!(income.percentage, 10.0);

    assert_eq!(
        checks.column_data_types.get("income"),
        Some(&InferredType::Numeric)
    );
    assert_eq!(
        checks.column_data_types.get("gender"),
        Some(&InferredType::Text)
    );
    assert!(checks.column_statistics.contains_key("income"));
    assert!(!checks.column_statistics.contains_key("gender"));

    // applicant_id is unique per row: no preview
    assert!(!checks.unique_values_preview.contains_key("applicant_id"));
    let gender = checks.unique_values_preview.get("gender").unwrap();
    assert_eq!(gender.get("M"), Some(&60));
    assert_eq!(gender.get("F"), Some(&40));
}

#[test]
fn test_missing_counts_match_null_cells() {
    let df = load_csv("loans.csv");
    let report = AnalysisEngine::new(AnalysisConfig::default())
        .analyze(&df, None)
        .unwrap();

    let null_cells: usize = df.get_columns().iter().map(|c| c.null_count()).sum();
    let reported: usize = report
        .quality_checks
        .missing_values
        .values()
        .map(|m| m.count)
        .sum();
    assert_eq!(reported, null_cells);
}

#[test]
fn test_duplicate_rows_fixture() {
    let report = analyze("duplicates.csv", AnalysisConfig::default());
    assert_eq!(report.quality_checks.duplicate_rows, 3);
    assert_eq!(report.summary_alerts[0].alert_type, "Duplicate Rows");
    assert_eq!(
        report.summary_alerts[0].message,
        "3 exact duplicate rows detected."
    );
}

#[test]
fn test_statistics_are_ordered() {
    let report = analyze("loans.csv", AnalysisConfig::default());
    for stats in report.quality_checks.column_statistics.values() {
        assert!(stats.min <= stats.p25);
        assert!(stats.p25 <= stats.p50);
        assert!(stats.p50 <= stats.p75);
        assert!(stats.p75 <= stats.max);
    }
}

// ============================================================================
// Bias Checks
// ============================================================================

#[test]
fn test_loans_bias_section() {
    let report = analyze("loans.csv", loans_config());
    let bias = &report.bias_flags;

    // gender: 60/40 split, 50% vs 30% approval
    let gender = bias.attribute("gender").unwrap();
    assert!(gender.flags.iter().all(|f| f.kind != FlagKind::Imbalance));
    let dir = gender
        .flags
        .iter()
        .find(|f| f.kind == FlagKind::DisparateImpact)
        .unwrap();
    assert_eq!(dir.severity, Severity::Critical);
    let Some(FlagDetails::DisparateImpact(summary)) = &dir.details else {
        panic!("expected DIR details");
    };
    assert_eq!(summary.ratios.get("F"), Some(&0.6));
    assert_eq!(summary.critical_comparisons, vec!["F".to_string()]);

    // A 20-point gap is not above the 20-point threshold
    assert!(gender.flags.iter().all(|f| f.kind != FlagKind::Disparity));

    // race: 95/5 split
    let race = bias.attribute("race").unwrap();
    let imbalance = race
        .flags
        .iter()
        .filter(|f| f.kind == FlagKind::Imbalance)
        .count();
    assert_eq!(imbalance, 2);

    // "M" is not a race value
    let errors: Vec<_> = bias.notices_at(NoticeLevel::Error).collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("'race'"));
    assert_eq!(bias.notices_at(NoticeLevel::Info).count(), 0);
}

#[test]
fn test_loans_summary_alert_order() {
    let report = analyze("loans.csv", loans_config());
    let alerts: Vec<(&str, Option<&str>, Option<&str>)> = report
        .summary_alerts
        .iter()
        .map(|a| {
            (
                a.alert_type.as_str(),
                a.column.as_deref(),
                a.group.as_deref(),
            )
        })
        .collect();

    assert_eq!(
        alerts,
        vec![
            ("Missing Data", Some("income"), None),
            ("Bias Disparate Impact", Some("gender"), None),
            ("Bias Imbalance", Some("race"), Some("A")),
            ("Bias Imbalance", Some("race"), Some("B")),
        ]
    );
}

#[test]
fn test_disparity_fixture() {
    let config = AnalysisConfig::builder()
        .sensitive_attributes_raw("group")
        .outcome_column("hired")
        .favorable_outcome_value("1")
        .build();
    let report = analyze("disparity.csv", config);

    let group = report.bias_flags.attribute("group").unwrap();
    let disparity = group
        .flags
        .iter()
        .find(|f| f.kind == FlagKind::Disparity)
        .unwrap();
    assert_eq!(
        disparity.details,
        Some(FlagDetails::Disparity {
            max_group: "a".to_string(),
            max_rate: 70.0,
            min_group: "b".to_string(),
            min_rate: 45.0,
            gap: 25.0,
        })
    );
    assert!(
        report
            .summary_alerts
            .iter()
            .any(|a| a.alert_type == "Bias Disparity")
    );

    // Raising the threshold turns the flag into an informational note
    let config = AnalysisConfig::builder()
        .sensitive_attributes_raw("group")
        .outcome_column("hired")
        .favorable_outcome_value("1")
        .thresholds(Thresholds::builder().disparity_pct(30.0).build().unwrap())
        .build();
    let report = analyze("disparity.csv", config);
    let group = report.bias_flags.attribute("group").unwrap();
    assert!(group.flags.iter().all(|f| f.kind != FlagKind::Disparity));
}

#[test]
fn test_zero_privileged_rate_isolated_to_attribute() {
    let config = AnalysisConfig::builder()
        .sensitive_attributes(["sex", "region"])
        .outcome_column("outcome")
        .favorable_outcome_value("yes")
        .privileged_group_value("M")
        .build();
    let report = analyze("zero_privileged.csv", config);
    let bias = &report.bias_flags;

    assert!(
        bias.notices_at(NoticeLevel::Error)
            .any(|e| e.message.contains("0% selection rate") && e.message.contains("'sex'"))
    );
    let sex = bias.attribute("sex").unwrap();
    assert!(sex.flags.iter().all(|f| f.kind != FlagKind::DisparateImpact));

    // The other attribute is still analyzed
    let region = bias.attribute("region").unwrap();
    assert!(region.flags.iter().any(|f| f.kind == FlagKind::Disparity));
}

#[test]
fn test_unknown_sensitive_attribute_reported() {
    let config = AnalysisConfig::builder()
        .sensitive_attributes_raw("gender, religion")
        .build();
    let report = analyze("loans.csv", config);
    let json = serde_json::to_value(&report).unwrap();

    let info = json["bias_flags"]["_info"].as_array().unwrap();
    assert!(
        info.iter()
            .any(|n| n["message"].as_str().unwrap().contains("religion"))
    );
    assert!(json["bias_flags"]["gender"].is_array());
    assert!(json["bias_flags"].get("religion").is_none());
}

#[test]
fn test_malformed_attribute_list_reported_as_error() {
    let config = AnalysisConfig::builder()
        .sensitive_attributes_raw(r#"["gender""#)
        .build();
    let report = analyze("loans.csv", config);
    let json = serde_json::to_value(&report).unwrap();

    let errors = json["bias_flags"]["_error"].as_array().unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["type"], "Error");
    assert!(
        errors[0]["message"]
            .as_str()
            .unwrap()
            .starts_with("Could not parse sensitive attributes")
    );
}

// ============================================================================
// Report Shape
// ============================================================================

#[test]
fn test_report_json_shape() {
    let report = analyze("loans.csv", loans_config());
    let json = serde_json::to_value(&report).unwrap();

    let top: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
    assert_eq!(
        top.len(),
        4,
        "report should only contain its four sections"
    );
    for key in ["file_details", "quality_checks", "bias_flags", "summary_alerts"] {
        assert!(json.get(key).is_some(), "missing section {}", key);
    }

    let dir = json["bias_flags"]["gender"]
        .as_array()
        .unwrap()
        .iter()
        .find(|f| f["type"] == "DIR Summary")
        .unwrap();
    assert_eq!(dir["details"]["privileged_group"], "M");
    assert_eq!(dir["details"]["selection_rates"]["M"], 50.0);
    assert_eq!(dir["details"]["selection_rates"]["F"], 30.0);
    assert_eq!(dir["details"]["DIR_vs_F"], 0.6);

    let income_stats = &json["quality_checks"]["column_statistics"]["income"];
    assert_eq!(income_stats["count"], 90);
    assert!(income_stats.get("25%").is_some());
}

#[test]
fn test_analysis_is_idempotent() {
    let df = load_csv("loans.csv");
    let engine = AnalysisEngine::new(loans_config());

    let first = serde_json::to_string(&engine.analyze(&df, Some("loans.csv")).unwrap()).unwrap();
    let second = serde_json::to_string(&engine.analyze(&df, Some("loans.csv")).unwrap()).unwrap();
    assert_eq!(first, second);
}

// ============================================================================
// Loader
// ============================================================================

#[test]
fn test_empty_fixture_is_rejected() {
    let err = load_table(fixtures_path().join("empty.csv")).unwrap_err();
    assert_eq!(err.error_code(), "EMPTY_DATA");
    assert!(err.is_input_error());
}

#[test]
fn test_missing_file_is_io_error() {
    let err = load_table(fixtures_path().join("does_not_exist.csv")).unwrap_err();
    assert_eq!(err.error_code(), "IO_ERROR");
}
