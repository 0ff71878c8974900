//! Table loading.
//!
//! Only CSV input is supported. Parsing tries progressively more lenient
//! strategies before giving up.

use crate::error::{AnalysisError, Result};
use polars::io::csv::read::CsvReadOptions;
use polars::prelude::*;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Rows used for CSV schema inference.
const INFER_SCHEMA_ROWS: usize = 100;

/// Load a table from `path`.
///
/// # Errors
///
/// - [`AnalysisError::UnsupportedFileType`] for anything but `.csv` (Excel
///   workbooks included)
/// - [`AnalysisError::EmptyData`] when the file has no content or no columns
/// - [`AnalysisError::Io`] / [`AnalysisError::Polars`] when every parse strategy fails
pub fn load_table(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    check_extension(path)?;

    let content = std::fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Err(AnalysisError::EmptyData(path.display().to_string()));
    }

    let df = load_csv_with_fallbacks(path, &content)?;
    if df.width() == 0 {
        return Err(AnalysisError::EmptyData(path.display().to_string()));
    }

    info!("Loaded '{}': {} rows x {} columns", path.display(), df.height(), df.width());
    Ok(df)
}

fn check_extension(path: &Path) -> Result<()> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    match extension.as_str() {
        "csv" => Ok(()),
        "xls" | "xlsx" => Err(AnalysisError::UnsupportedFileType(format!(
            "{} (Excel workbooks are not supported; export the sheet as CSV)",
            path.display()
        ))),
        _ => Err(AnalysisError::UnsupportedFileType(path.display().to_string())),
    }
}

fn load_csv_with_fallbacks(path: &Path, content: &str) -> Result<DataFrame> {
    // Strategy 1: Standard loading with quote handling
    match CsvReadOptions::default()
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
        .finish()
    {
        Ok(df) => return Ok(df),
        Err(e) => {
            debug!("Standard loading failed: {}", e);
        }
    }

    // Strategy 2: Without quote handling
    match CsvReadOptions::default()
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .with_has_header(true)
        .with_parse_options(CsvParseOptions::default().with_quote_char(None))
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
        .finish()
    {
        Ok(df) => return Ok(df),
        Err(e) => {
            debug!("Loading without quotes failed: {}", e);
        }
    }

    // Strategy 3: Pre-clean content
    let cleaned = clean_csv_content(content);
    CsvReadOptions::default()
        .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
        .with_has_header(true)
        .into_reader_with_file_handle(Cursor::new(cleaned))
        .finish()
        .map_err(|e| AnalysisError::from(e).with_context(format!("Failed to parse '{}'", path.display())))
}

/// Collapse doubled quotes and drop blank lines.
fn clean_csv_content(content: &str) -> String {
    content
        .replace("\"\"\"", "\"")
        .replace("\"\"", "\"")
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_file(name: &str, content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("data_sanity_loader_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_csv() {
        let path = temp_file("basic.csv", "a,b\n1,x\n2,y\n");
        let df = load_table(&path).unwrap();
        assert_eq!(df.shape(), (2, 2));
    }

    #[test]
    fn test_empty_file_is_empty_data() {
        let path = temp_file("empty.csv", "  \n");
        let err = load_table(&path).unwrap_err();
        assert_eq!(err.error_code(), "EMPTY_DATA");
    }

    #[test]
    fn test_excel_is_unsupported() {
        let err = load_table("report.xlsx").unwrap_err();
        assert_eq!(err.error_code(), "UNSUPPORTED_FILE_TYPE");
        assert!(err.to_string().contains("Excel"));
    }

    #[test]
    fn test_unknown_extension_is_unsupported() {
        let err = load_table("notes.txt").unwrap_err();
        assert!(matches!(err, AnalysisError::UnsupportedFileType(_)));
    }

    #[test]
    fn test_clean_csv_content() {
        let cleaned = clean_csv_content("a,b\n\n\"\"x\"\",1\n");
        assert_eq!(cleaned, "a,b\n\"x\",1");
    }
}
