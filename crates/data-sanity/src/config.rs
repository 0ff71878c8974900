//! Configuration types for the analysis engine.
//!
//! Thresholds are process-wide values (usually read once from the environment at
//! startup) that are passed explicitly into every analysis via [`AnalysisConfig`].
//! Both types use the builder pattern.

use serde::{Deserialize, Serialize};

/// Environment variable for the missing-value alert threshold (percent).
pub const ENV_MISSING_VALUE_THRESHOLD: &str = "MISSING_VALUE_THRESHOLD";
/// Environment variable for the dominant-group imbalance threshold (percent).
pub const ENV_DOMINANT_IMBALANCE_THRESHOLD: &str = "DOMINANT_IMBALANCE_THRESHOLD";
/// Environment variable for the rare-group imbalance threshold (percent).
pub const ENV_RARE_IMBALANCE_THRESHOLD: &str = "RARE_IMBALANCE_THRESHOLD";
/// Environment variable for the outcome disparity threshold (percentage points).
pub const ENV_DISPARITY_THRESHOLD: &str = "DISPARITY_THRESHOLD";
/// Environment variable for the Disparate Impact Ratio threshold.
pub const ENV_DIR_THRESHOLD: &str = "DIR_THRESHOLD";

/// Alert thresholds used by the quality and bias checks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    /// Columns with a missing percentage above this value raise a `Missing Data` alert.
    /// Default: 5.0
    pub missing_value_pct: f64,

    /// A group making up more than this percentage of an attribute is dominant.
    /// Default: 90.0
    pub dominant_imbalance_pct: f64,

    /// A group making up less than this percentage of an attribute is rare.
    /// Default: 10.0
    pub rare_imbalance_pct: f64,

    /// Gap in favorable-outcome rate (percentage points) that raises a disparity flag.
    /// Default: 20.0
    pub disparity_pct: f64,

    /// Disparate Impact Ratio below which a comparison is critical (the "80% rule").
    /// Default: 0.8
    pub dir_ratio: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            missing_value_pct: 5.0,
            dominant_imbalance_pct: 90.0,
            rare_imbalance_pct: 10.0,
            disparity_pct: 20.0,
            dir_ratio: 0.8,
        }
    }
}

impl Thresholds {
    /// Create a new thresholds builder.
    pub fn builder() -> ThresholdsBuilder {
        ThresholdsBuilder::default()
    }

    /// Read thresholds from the process environment, falling back to defaults
    /// for unset variables.
    pub fn from_env() -> Result<Self, ConfigValidationError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read thresholds through an arbitrary key lookup.
    ///
    /// Set-but-unparseable values are an error rather than silently defaulted.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigValidationError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| -> Result<Option<f64>, ConfigValidationError> {
            match lookup(key) {
                None => Ok(None),
                Some(raw) if raw.trim().is_empty() => Ok(None),
                Some(raw) => raw.trim().parse::<f64>().map(Some).map_err(|_| {
                    ConfigValidationError::InvalidEnvValue {
                        variable: key.to_string(),
                        value: raw,
                    }
                }),
            }
        };

        let mut builder = Thresholds::builder();
        if let Some(v) = read(ENV_MISSING_VALUE_THRESHOLD)? {
            builder = builder.missing_value_pct(v);
        }
        if let Some(v) = read(ENV_DOMINANT_IMBALANCE_THRESHOLD)? {
            builder = builder.dominant_imbalance_pct(v);
        }
        if let Some(v) = read(ENV_RARE_IMBALANCE_THRESHOLD)? {
            builder = builder.rare_imbalance_pct(v);
        }
        if let Some(v) = read(ENV_DISPARITY_THRESHOLD)? {
            builder = builder.disparity_pct(v);
        }
        if let Some(v) = read(ENV_DIR_THRESHOLD)? {
            builder = builder.dir_ratio(v);
        }
        builder.build()
    }

    /// Validate the thresholds and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        let percentages = [
            ("missing_value_pct", self.missing_value_pct),
            ("dominant_imbalance_pct", self.dominant_imbalance_pct),
            ("rare_imbalance_pct", self.rare_imbalance_pct),
            ("disparity_pct", self.disparity_pct),
        ];
        for (field, value) in percentages {
            if !(0.0..=100.0).contains(&value) {
                return Err(ConfigValidationError::InvalidPercentage {
                    field: field.to_string(),
                    value,
                });
            }
        }

        if !(0.0..=1.0).contains(&self.dir_ratio) {
            return Err(ConfigValidationError::InvalidRatio(self.dir_ratio));
        }

        if self.rare_imbalance_pct >= self.dominant_imbalance_pct {
            return Err(ConfigValidationError::InvertedImbalanceBand {
                rare: self.rare_imbalance_pct,
                dominant: self.dominant_imbalance_pct,
            });
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid threshold for '{field}': {value} (must be between 0 and 100)")]
    InvalidPercentage { field: String, value: f64 },

    #[error("Invalid DIR threshold: {0} (must be between 0.0 and 1.0)")]
    InvalidRatio(f64),

    #[error("Rare imbalance threshold {rare} must be below dominant threshold {dominant}")]
    InvertedImbalanceBand { rare: f64, dominant: f64 },

    #[error("Environment variable {variable}='{value}' is not a number")]
    InvalidEnvValue { variable: String, value: String },
}

/// Builder for [`Thresholds`] with fluent API.
#[derive(Debug, Default)]
pub struct ThresholdsBuilder {
    missing_value_pct: Option<f64>,
    dominant_imbalance_pct: Option<f64>,
    rare_imbalance_pct: Option<f64>,
    disparity_pct: Option<f64>,
    dir_ratio: Option<f64>,
}

impl ThresholdsBuilder {
    /// Set the missing-value alert threshold (percent, e.g. 5.0).
    pub fn missing_value_pct(mut self, pct: f64) -> Self {
        self.missing_value_pct = Some(pct);
        self
    }

    /// Set the dominant-group imbalance threshold (percent, e.g. 90.0).
    pub fn dominant_imbalance_pct(mut self, pct: f64) -> Self {
        self.dominant_imbalance_pct = Some(pct);
        self
    }

    /// Set the rare-group imbalance threshold (percent, e.g. 10.0).
    pub fn rare_imbalance_pct(mut self, pct: f64) -> Self {
        self.rare_imbalance_pct = Some(pct);
        self
    }

    /// Set the disparity threshold in percentage points.
    pub fn disparity_pct(mut self, points: f64) -> Self {
        self.disparity_pct = Some(points);
        self
    }

    /// Set the Disparate Impact Ratio threshold (e.g. 0.8).
    pub fn dir_ratio(mut self, ratio: f64) -> Self {
        self.dir_ratio = Some(ratio);
        self
    }

    /// Build the thresholds.
    ///
    /// Returns validated `Thresholds` or an error if validation fails.
    pub fn build(self) -> Result<Thresholds, ConfigValidationError> {
        let defaults = Thresholds::default();
        let thresholds = Thresholds {
            missing_value_pct: self.missing_value_pct.unwrap_or(defaults.missing_value_pct),
            dominant_imbalance_pct: self
                .dominant_imbalance_pct
                .unwrap_or(defaults.dominant_imbalance_pct),
            rare_imbalance_pct: self.rare_imbalance_pct.unwrap_or(defaults.rare_imbalance_pct),
            disparity_pct: self.disparity_pct.unwrap_or(defaults.disparity_pct),
            dir_ratio: self.dir_ratio.unwrap_or(defaults.dir_ratio),
        };

        thresholds.validate()?;
        Ok(thresholds)
    }
}

/// Per-request analysis configuration.
///
/// Use [`AnalysisConfig::builder()`] to create one. Every field besides the
/// thresholds is optional and independently omittable; checks whose
/// prerequisites are missing are skipped and reported as notices.
///
/// # Example
///
/// ```rust,ignore
/// use data_sanity::config::{AnalysisConfig, Thresholds};
///
/// let config = AnalysisConfig::builder()
///     .sensitive_attributes_raw(r#"["gender", "race"]"#)
///     .outcome_column("loan_status")
///     .favorable_outcome_value("Approved")
///     .privileged_group_value("Male")
///     .thresholds(Thresholds::from_env()?)
///     .build();
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Columns designated for bias analysis, in request order, without duplicates.
    pub sensitive_attributes: Vec<String>,

    /// Decision column whose favorable rate is compared across groups.
    pub outcome_column: Option<String>,

    /// Outcome value counted as a favorable result.
    pub favorable_outcome_value: Option<String>,

    /// Reference group value for Disparate Impact Ratio.
    pub privileged_group_value: Option<String>,

    /// Alert thresholds.
    pub thresholds: Thresholds,

    /// Problems found while parsing request input. Reported as `_error` notices.
    #[serde(default)]
    pub input_errors: Vec<String>,
}

impl AnalysisConfig {
    /// Create a new configuration builder.
    pub fn builder() -> AnalysisConfigBuilder {
        AnalysisConfigBuilder::default()
    }
}

/// Builder for [`AnalysisConfig`].
#[derive(Debug, Default)]
pub struct AnalysisConfigBuilder {
    sensitive_attributes: Vec<String>,
    outcome_column: Option<String>,
    favorable_outcome_value: Option<String>,
    privileged_group_value: Option<String>,
    thresholds: Option<Thresholds>,
    input_errors: Vec<String>,
}

impl AnalysisConfigBuilder {
    /// Set the sensitive attributes from an already-parsed list.
    pub fn sensitive_attributes<I, S>(mut self, attributes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sensitive_attributes = normalize_attribute_names(attributes.into_iter().map(Into::into));
        self
    }

    /// Set the sensitive attributes from a raw request string.
    ///
    /// Accepts a JSON array (`["gender", "race"]`) or a comma-separated list
    /// (`gender, race`). A malformed JSON array leaves the list empty and records
    /// an input error instead of failing.
    pub fn sensitive_attributes_raw(mut self, raw: &str) -> Self {
        match parse_sensitive_attributes(raw) {
            Ok(attributes) => self.sensitive_attributes = attributes,
            Err(e) => {
                self.sensitive_attributes.clear();
                self.input_errors.push(e.to_string());
            }
        }
        self
    }

    /// Set the outcome column. Blank names are treated as absent.
    pub fn outcome_column(mut self, column: impl Into<String>) -> Self {
        self.outcome_column = non_blank(column.into());
        self
    }

    /// Set the favorable outcome value. Blank values are treated as absent.
    pub fn favorable_outcome_value(mut self, value: impl Into<String>) -> Self {
        self.favorable_outcome_value = non_blank(value.into());
        self
    }

    /// Set the privileged group value. Blank values are treated as absent.
    pub fn privileged_group_value(mut self, value: impl Into<String>) -> Self {
        self.privileged_group_value = non_blank(value.into());
        self
    }

    /// Set the alert thresholds.
    pub fn thresholds(mut self, thresholds: Thresholds) -> Self {
        self.thresholds = Some(thresholds);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> AnalysisConfig {
        AnalysisConfig {
            sensitive_attributes: self.sensitive_attributes,
            outcome_column: self.outcome_column,
            favorable_outcome_value: self.favorable_outcome_value,
            privileged_group_value: self.privileged_group_value,
            thresholds: self.thresholds.unwrap_or_default(),
            input_errors: self.input_errors,
        }
    }
}

/// Error parsing a sensitive-attribute list.
#[derive(Debug, thiserror::Error)]
#[error(
    "Could not parse sensitive attributes. Please ensure it's a valid JSON array of strings \
     (e.g., '[\"Gender\", \"Race\"]'). Error: {0}"
)]
pub struct AttributeParseError(#[from] serde_json::Error);

/// Parse a sensitive-attribute list from a JSON array or comma-separated string.
///
/// Names are trimmed, blank names dropped and duplicates removed (first
/// occurrence wins). Non-string JSON elements are kept in their textual form.
pub fn parse_sensitive_attributes(raw: &str) -> Result<Vec<String>, AttributeParseError> {
    let trimmed = raw.trim();
    if trimmed.starts_with('[') {
        let values: Vec<serde_json::Value> = serde_json::from_str(trimmed)?;
        let names = values.into_iter().map(|v| match v {
            serde_json::Value::String(s) => s,
            other => other.to_string(),
        });
        return Ok(normalize_attribute_names(names));
    }

    Ok(normalize_attribute_names(
        trimmed.split(',').map(str::to_string),
    ))
}

fn normalize_attribute_names(names: impl Iterator<Item = String>) -> Vec<String> {
    let mut result: Vec<String> = Vec::new();
    for name in names {
        let name = name.trim();
        if !name.is_empty() && !result.iter().any(|existing| existing == name) {
            result.push(name.to_string());
        }
    }
    result
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
