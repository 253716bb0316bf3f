//! Shared CSV and column helpers.
//!
//! All dataset reading and writing goes through these functions so every
//! artifact uses the same header and missing-value conventions.

use polars::prelude::*;
use std::fs::{self, File};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{ProcessingError, Result, ResultExt};

// =============================================================================
// CSV I/O
// =============================================================================

/// Read a CSV file with a header row.
///
/// A missing file is reported as [`ProcessingError::SourceUnreachable`] so
/// callers can distinguish "nothing there" from a parse failure.
pub fn read_csv(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(ProcessingError::SourceUnreachable {
            source_name: path.display().to_string(),
            reason: "file not found".to_string(),
        });
    }

    debug!("Reading CSV: {}", path.display());
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .try_into_reader_with_file_path(Some(PathBuf::from(path)))
        .context(format!("Opening {}", path.display()))?
        .finish()
        .context(format!("Parsing {}", path.display()))
}

/// Parse CSV content already held in memory (e.g. an HTTP response body).
pub fn read_csv_bytes(bytes: Vec<u8>, source_name: &str) -> Result<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(None)
        .into_reader_with_file_handle(Cursor::new(bytes))
        .finish()
        .context(format!("Parsing {}", source_name))
}

/// Write a DataFrame as CSV with a header row, creating parent directories.
pub fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).context(format!("Creating {}", parent.display()))?;
    }

    let mut file = File::create(path).context(format!("Creating {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_separator(b',')
        .finish(df)
        .context(format!("Writing {}", path.display()))?;

    debug!("Wrote {} rows to {}", df.height(), path.display());
    Ok(())
}

// =============================================================================
// Column Extraction
// =============================================================================

/// Extract a column as `f64` values, or `None` if the column is absent.
///
/// Values that cannot be cast (e.g. non-numeric strings) become missing.
pub fn optional_f64_column(df: &DataFrame, name: &str) -> Result<Option<Vec<Option<f64>>>> {
    let Ok(column) = df.column(name) else {
        return Ok(None);
    };

    let casted = column
        .cast(&DataType::Float64)
        .context(format!("Casting '{}' to Float64", name))?;
    let values = casted
        .f64()
        .context(format!("Reading '{}' as Float64", name))?
        .into_iter()
        .map(|v| v.filter(|x| x.is_finite()))
        .collect();

    Ok(Some(values))
}

/// Extract a column as trimmed strings, or `None` if the column is absent.
///
/// Empty cells are treated as missing.
pub fn optional_string_column(
    df: &DataFrame,
    name: &str,
) -> Result<Option<Vec<Option<String>>>> {
    let Ok(column) = df.column(name) else {
        return Ok(None);
    };

    let casted = column
        .cast(&DataType::String)
        .context(format!("Casting '{}' to String", name))?;
    let values = casted
        .str()
        .context(format!("Reading '{}' as String", name))?
        .into_iter()
        .map(|v| {
            v.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
        .collect();

    Ok(Some(values))
}

/// Extract a required column as `f64` values.
pub fn required_f64_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    optional_f64_column(df, name)?.ok_or_else(|| ProcessingError::ColumnNotFound(name.to_string()))
}
