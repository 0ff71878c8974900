//! Type inference logic for column analysis.

use crate::types::InferredType;
use crate::utils::{boolean_token, is_numeric_dtype, parse_number};
use polars::prelude::*;

/// Infer the semantic type of a column from its storage dtype and its
/// non-missing cell texts.
///
/// Mixed or unparseable content falls back to [`InferredType::Text`]; a column
/// without any values is also text since nothing confirms it is numeric.
pub(crate) fn infer_column_type(dtype: &DataType, present: &[&str]) -> InferredType {
    if present.is_empty() {
        return InferredType::Text;
    }

    // Check 1: Native types
    if dtype == &DataType::Boolean {
        return InferredType::Boolean;
    }
    if is_numeric_dtype(dtype) {
        return InferredType::Numeric;
    }

    // Check 2: Boolean-like text ("yes"/"no", "true"/"false", ...)
    if is_boolean_like(present) {
        return InferredType::Boolean;
    }

    // Check 3: Text whose every value parses as a number
    if present.iter().all(|v| parse_number(v).is_some()) {
        return InferredType::Numeric;
    }

    InferredType::Text
}

/// All values come from a single boolean token pair.
pub(crate) fn is_boolean_like(present: &[&str]) -> bool {
    let mut pair: Option<usize> = None;
    for value in present {
        let Some((idx, _)) = boolean_token(value) else {
            return false;
        };
        match pair {
            Some(p) if p != idx => return false,
            _ => pair = Some(idx),
        }
    }
    pair.is_some()
}
