use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::collections::HashMap;

// ============================================================================
// Ordered maps
// ============================================================================

/// A string-keyed map that serializes in insertion order.
///
/// Report maps are keyed by column or group name and must come out in table
/// order so that repeated analyses produce byte-identical JSON. Lookups go
/// through a position index, so building a map is linear in its size.
#[derive(Debug, Clone)]
pub struct OrderedMap<V> {
    entries: Vec<(String, V)>,
    index: HashMap<String, usize>,
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<V: PartialEq> PartialEq for OrderedMap<V> {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<V> OrderedMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the value for `key`, keeping the original position on replace.
    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        match self.index.get(&key) {
            Some(&idx) => self.entries[idx].1 = value,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.index.get(key).map(|&idx| &self.entries[idx].1)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<V> FromIterator<(String, V)> for OrderedMap<V> {
    fn from_iter<I: IntoIterator<Item = (String, V)>>(iter: I) -> Self {
        let mut map = OrderedMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

// ============================================================================
// Column profiles
// ============================================================================

/// Semantic type of a column as seen by the analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InferredType {
    Numeric,
    Boolean,
    Text,
}

impl InferredType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InferredType::Numeric => "numeric",
            InferredType::Boolean => "boolean",
            InferredType::Text => "text",
        }
    }
}

/// Descriptive statistics of a numeric column.
///
/// Field names follow the familiar `describe()` layout so that chart and table
/// renderers can consume them directly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumericStats {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (N-1). Absent for fewer than two values.
    pub std: Option<f64>,
    pub min: f64,
    #[serde(rename = "25%")]
    pub p25: f64,
    #[serde(rename = "50%")]
    pub p50: f64,
    #[serde(rename = "75%")]
    pub p75: f64,
    pub max: f64,
}

/// Per-column facts produced by the profiler.
#[derive(Debug, Clone, Serialize)]
pub struct ColumnProfile {
    pub name: String,
    /// Storage dtype reported by polars, e.g. `Int64` or `String`.
    pub dtype: String,
    pub inferred_type: InferredType,
    pub missing_count: usize,
    /// Unrounded; the report rounds to two decimals.
    pub missing_percentage: f64,
    /// Distinct non-missing values.
    pub unique_count: usize,
    pub numeric_stats: Option<NumericStats>,
    /// Top values by frequency, present for low-cardinality columns only.
    pub value_counts_preview: Option<OrderedMap<usize>>,
}

// ============================================================================
// Report
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct FileDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    pub rows: usize,
    pub columns: usize,
    pub column_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingValueStat {
    pub count: usize,
    /// Rounded to two decimals.
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct QualityChecks {
    pub missing_values: OrderedMap<MissingValueStat>,
    pub duplicate_rows: usize,
    pub column_data_types: OrderedMap<InferredType>,
    pub column_statistics: OrderedMap<NumericStats>,
    pub unique_values_preview: OrderedMap<OrderedMap<usize>>,
}

/// A consolidated, high-severity finding shown at the top of a report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryAlert {
    #[serde(rename = "type")]
    pub alert_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    pub message: String,
}

impl SummaryAlert {
    pub fn new(alert_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            alert_type: alert_type.into(),
            column: None,
            group: None,
            message: message.into(),
        }
    }

    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }
}

/// Kind of a bias flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FlagKind {
    Imbalance,
    Disparity,
    #[serde(rename = "DIR Summary")]
    DisparateImpact,
    Info,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

/// Structured payload attached to a bias flag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FlagDetails {
    Imbalance {
        group: String,
        proportion: f64,
        direction: ImbalanceDirection,
    },
    Disparity {
        max_group: String,
        max_rate: f64,
        min_group: String,
        min_rate: f64,
        gap: f64,
    },
    DisparateImpact(DirSummary),
}

/// Which side of the acceptable representation band a group falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImbalanceDirection {
    Dominant,
    Rare,
}

/// Disparate Impact Ratio results for one sensitive attribute.
///
/// Serializes as `{privileged_group, selection_rates, DIR_vs_<group>..., critical_comparisons}`.
#[derive(Debug, Clone, PartialEq)]
pub struct DirSummary {
    pub privileged_group: String,
    /// Selection rate per group, as a percentage rounded to two decimals.
    pub selection_rates: OrderedMap<f64>,
    /// DIR per unprivileged group, rounded to two decimals.
    pub ratios: OrderedMap<f64>,
    /// Groups whose unrounded DIR fell below the threshold, in group order.
    pub critical_comparisons: Vec<String>,
}

impl Serialize for DirSummary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(3 + self.ratios.len()))?;
        map.serialize_entry("privileged_group", &self.privileged_group)?;
        map.serialize_entry("selection_rates", &self.selection_rates)?;
        for (group, ratio) in self.ratios.iter() {
            map.serialize_entry(&format!("DIR_vs_{}", group), ratio)?;
        }
        map.serialize_entry("critical_comparisons", &self.critical_comparisons)?;
        map.end()
    }
}

/// A single bias finding or notice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BiasFlag {
    #[serde(rename = "type")]
    pub kind: FlagKind,
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<FlagDetails>,
}

impl BiasFlag {
    pub fn new(kind: FlagKind, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity,
            message: message.into(),
            details: None,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(FlagKind::Info, Severity::Info, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(FlagKind::Error, Severity::Warning, message)
    }

    pub fn with_details(mut self, details: FlagDetails) -> Self {
        self.details = Some(details);
        self
    }

    pub fn is_critical(&self) -> bool {
        self.severity == Severity::Critical
    }
}

/// Findings for one sensitive attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeFlags {
    pub attribute: String,
    pub flags: Vec<BiasFlag>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A configuration-level notice not tied to a single attribute's findings.
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalNotice {
    pub level: NoticeLevel,
    pub flag: BiasFlag,
}

/// Bias section of the report.
///
/// Serializes as an object keyed by attribute name, followed by `_info` and
/// `_error` arrays when notices of that level exist.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BiasFlags {
    pub attributes: Vec<AttributeFlags>,
    pub notices: Vec<GlobalNotice>,
}

impl BiasFlags {
    pub fn attribute(&self, name: &str) -> Option<&AttributeFlags> {
        self.attributes.iter().find(|a| a.attribute == name)
    }

    pub fn notices_at(&self, level: NoticeLevel) -> impl Iterator<Item = &BiasFlag> {
        self.notices
            .iter()
            .filter(move |n| n.level == level)
            .map(|n| &n.flag)
    }

    pub fn push_notice(&mut self, level: NoticeLevel, flag: BiasFlag) {
        self.notices.push(GlobalNotice { level, flag });
    }
}

impl Serialize for BiasFlags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let info: Vec<&BiasFlag> = self.notices_at(NoticeLevel::Info).collect();
        let errors: Vec<&BiasFlag> = self.notices_at(NoticeLevel::Error).collect();

        let mut map = serializer.serialize_map(None)?;
        for attribute in &self.attributes {
            map.serialize_entry(&attribute.attribute, &attribute.flags)?;
        }
        if !info.is_empty() {
            map.serialize_entry("_info", &info)?;
        }
        if !errors.is_empty() {
            map.serialize_entry("_error", &errors)?;
        }
        map.end()
    }
}

/// The final quality and bias report for one table.
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub file_details: FileDetails,
    pub quality_checks: QualityChecks,
    pub bias_flags: BiasFlags,
    pub summary_alerts: Vec<SummaryAlert>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ordered_map_keeps_insertion_order() {
        let mut map = OrderedMap::new();
        map.insert("zeta", 1);
        map.insert("alpha", 2);
        map.insert("zeta", 3);
        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"zeta":3,"alpha":2}"#);
        assert_eq!(map.get("zeta"), Some(&3));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_ordered_map_large_build_keeps_lookups() {
        let map: OrderedMap<usize> = (0..20_000).map(|i| (format!("g{}", i), i)).collect();
        assert_eq!(map.len(), 20_000);
        assert_eq!(map.get("g19999"), Some(&19_999));
        assert_eq!(map.keys().next(), Some("g0"));
        assert!(!map.contains_key("g20000"));
    }

    #[test]
    fn test_bias_flags_serialize_notices_last() {
        let mut flags = BiasFlags::default();
        flags.attributes.push(AttributeFlags {
            attribute: "gender".to_string(),
            flags: vec![BiasFlag::info("ok")],
        });
        flags.push_notice(NoticeLevel::Error, BiasFlag::error("bad"));

        let value = serde_json::to_value(&flags).unwrap();
        assert_eq!(value["gender"][0]["type"], "Info");
        assert_eq!(value["_error"][0]["message"], "bad");
        assert!(value.get("_info").is_none());
    }

    #[test]
    fn test_dir_summary_serialization() {
        let summary = DirSummary {
            privileged_group: "M".to_string(),
            selection_rates: [("M".to_string(), 50.0), ("F".to_string(), 30.0)]
                .into_iter()
                .collect(),
            ratios: [("F".to_string(), 0.6)].into_iter().collect(),
            critical_comparisons: vec!["F".to_string()],
        };
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(
            value,
            json!({
                "privileged_group": "M",
                "selection_rates": {"M": 50.0, "F": 30.0},
                "DIR_vs_F": 0.6,
                "critical_comparisons": ["F"]
            })
        );
    }

    #[test]
    fn test_numeric_stats_uses_percentile_keys() {
        let stats = NumericStats {
            count: 1,
            mean: 1.0,
            std: None,
            min: 1.0,
            p25: 1.0,
            p50: 1.0,
            p75: 1.0,
            max: 1.0,
        };
        let value = serde_json::to_value(&stats).unwrap();
        assert!(value.get("25%").is_some());
        assert!(value["std"].is_null());
    }
}
