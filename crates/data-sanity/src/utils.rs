//! Shared cell-level helpers.
//!
//! Every component reads cells through [`cell_texts`] so that "missing",
//! group keys and preview keys mean the same thing across the report.

use once_cell::sync::Lazy;
use polars::prelude::*;
use std::collections::HashMap;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

// =============================================================================
// Cell Text Utilities
// =============================================================================

/// Boolean-like tokens, grouped by pair. The pair index keeps `yes` from
/// pairing with `false`.
static BOOLEAN_TOKENS: Lazy<HashMap<&'static str, (usize, bool)>> = Lazy::new(|| {
    let pairs = [("true", "false"), ("yes", "no"), ("y", "n"), ("t", "f")];
    let mut tokens = HashMap::new();
    for (idx, (truthy, falsy)) in pairs.into_iter().enumerate() {
        tokens.insert(truthy, (idx, true));
        tokens.insert(falsy, (idx, false));
    }
    tokens
});

/// Look up a boolean-like token, returning its pair index and truth value.
pub fn boolean_token(s: &str) -> Option<(usize, bool)> {
    BOOLEAN_TOKENS
        .get(s.trim().to_ascii_lowercase().as_str())
        .copied()
}

/// Parse a trimmed cell as a finite number.
pub fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Textual form of a number as it appears in report keys (`1` for `1.0`).
pub fn format_number(value: f64) -> String {
    format!("{}", value)
}

/// Read a column as trimmed cell texts, `None` for missing cells.
///
/// Nulls, non-finite floats (NaN and infinities) and text that is empty after
/// trimming all count as missing. Float32 cells are formatted from the f32
/// value so that `0.1f32` reads as `0.1`.
pub fn cell_texts(series: &Series) -> PolarsResult<Vec<Option<String>>> {
    match series.dtype() {
        DataType::Float32 => {
            return Ok(series
                .f32()?
                .into_iter()
                .map(|v| v.filter(|x| x.is_finite()).map(|x| x.to_string()))
                .collect());
        }
        DataType::Float64 => {
            return Ok(series
                .f64()?
                .into_iter()
                .map(|v| v.filter(|x| x.is_finite()).map(format_number))
                .collect());
        }
        _ => {}
    }

    let as_text = series.cast(&DataType::String)?;
    let values = as_text.str()?;
    Ok(values
        .into_iter()
        .map(|v| {
            v.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
        .collect())
}

/// Round to two decimals for display.
#[inline]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Percentage of `part` in `whole`, 0 when `whole` is 0.
#[inline]
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

/// Case-insensitive match between a cell and a configured value, with a
/// numeric comparison when both sides parse (`"1"` matches `1.0`).
pub fn values_match(cell: &str, configured: &str) -> bool {
    let cell = cell.trim();
    let configured = configured.trim();
    if cell.eq_ignore_ascii_case(configured) {
        return true;
    }
    match (parse_number(cell), parse_number(configured)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_boolean_token() {
        assert_eq!(boolean_token(" Yes "), Some((1, true)));
        assert_eq!(boolean_token("FALSE"), Some((0, false)));
        assert_eq!(boolean_token("maybe"), None);
    }

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number(" 42 "), Some(42.0));
        assert_eq!(parse_number("-1.5e2"), Some(-150.0));
        assert_eq!(parse_number("NaN"), None);
        assert_eq!(parse_number("inf"), None);
        assert_eq!(parse_number("abc"), None);
    }

    #[test]
    fn test_cell_texts_strings() {
        let series = Series::new("c".into(), &[Some(" a "), Some(""), None, Some("b")]);
        let texts = cell_texts(&series).unwrap();
        assert_eq!(
            texts,
            vec![Some("a".to_string()), None, None, Some("b".to_string())]
        );
    }

    #[test]
    fn test_cell_texts_floats_treat_nan_as_missing() {
        let series = Series::new("c".into(), &[Some(1.0f64), Some(f64::NAN), None, Some(2.5)]);
        let texts = cell_texts(&series).unwrap();
        assert_eq!(
            texts,
            vec![Some("1".to_string()), None, None, Some("2.5".to_string())]
        );
    }

    #[test]
    fn test_cell_texts_floats_treat_infinity_as_missing() {
        let series = Series::new(
            "c".into(),
            &[Some(1.0f64), Some(f64::INFINITY), Some(3.0), Some(f64::NEG_INFINITY)],
        );
        let texts = cell_texts(&series).unwrap();
        assert_eq!(
            texts,
            vec![Some("1".to_string()), None, Some("3".to_string()), None]
        );
    }

    #[test]
    fn test_cell_texts_float32_uses_short_form() {
        let series = Series::new("c".into(), &[Some(0.1f32), None, Some(2.0), Some(f32::NAN)]);
        let texts = cell_texts(&series).unwrap();
        assert_eq!(
            texts,
            vec![Some("0.1".to_string()), None, Some("2".to_string()), None]
        );
    }

    #[test]
    fn test_cell_texts_integers() {
        let series = Series::new("c".into(), &[Some(1i64), None, Some(30)]);
        let texts = cell_texts(&series).unwrap();
        assert_eq!(
            texts,
            vec![Some("1".to_string()), None, Some("30".to_string())]
        );
    }

    #[test]
    fn test_values_match() {
        assert!(values_match("Approved", " approved"));
        assert!(values_match("1", "1.0"));
        assert!(!values_match("Denied", "Approved"));
    }

    #[test]
    fn test_percentage_zero_whole() {
        assert_eq!(percentage(3, 0), 0.0);
        assert_eq!(percentage(1, 4), 25.0);
        assert_eq!(round2(33.33333), 33.33);
    }
}
