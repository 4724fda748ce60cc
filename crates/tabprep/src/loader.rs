//! CSV loading.
//!
//! Column names come from the header row; dtypes are inferred from every
//! row of the file. The usual spreadsheet/pandas missing markers load as null.

use crate::error::{PrepError, Result, ResultExt};
use polars::io::csv::read::{CsvParseOptions, CsvReadOptions, NullValues};
use polars::prelude::*;
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info, warn};

/// Field values treated as missing in addition to empty fields.
pub const MISSING_MARKERS: [&str; 11] = [
    "NA", "N/A", "n/a", "NaN", "nan", "-NaN", "NULL", "null", "None", "#N/A", "<NA>",
];

/// Load a comma-delimited file with a header row.
///
/// Fails with [`PrepError::FileNotFound`] when the path does not exist. If the
/// first parse fails, blank lines are stripped and the content is parsed once
/// more before giving up. Field values are never rewritten.
pub fn load_csv(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(PrepError::FileNotFound(path.to_path_buf()));
    }

    info!("Loading dataset from {}", path.display());

    let df = match read_options()
        .try_into_reader_with_file_path(Some(path.to_path_buf()))?
        .finish()
    {
        Ok(df) => df,
        Err(e) => {
            warn!("Standard CSV parse failed ({}), retrying without blank lines", e);
            let content = std::fs::read_to_string(path)?;
            parse_csv_str(&clean_csv_content(&content))
                .context(format!("Failed to parse {}", path.display()))?
        }
    };

    info!(
        "Loaded {} rows x {} columns",
        df.height(),
        df.width()
    );
    for col in df.get_columns() {
        debug!("  {}: {}", col.name(), col.dtype());
    }

    Ok(df)
}

/// Parse CSV text that is already in memory.
pub fn parse_csv_str(content: &str) -> Result<DataFrame> {
    let cursor = Cursor::new(content.as_bytes().to_vec());
    let df = read_options()
        .into_reader_with_file_handle(cursor)
        .finish()?;
    Ok(df)
}

fn read_options() -> CsvReadOptions {
    let null_values: Vec<PlSmallStr> = MISSING_MARKERS.iter().map(|m| (*m).into()).collect();

    CsvReadOptions::default()
        .with_has_header(true)
        // Scan every row so a late text value does not break a numeric guess
        .with_infer_schema_length(None)
        .with_parse_options(
            CsvParseOptions::default()
                .with_separator(b',')
                .with_quote_char(Some(b'"'))
                .with_null_values(Some(NullValues::AllColumns(null_values))),
        )
}

/// Drop whitespace-only lines, leaving every field untouched.
fn clean_csv_content(content: &str) -> String {
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
