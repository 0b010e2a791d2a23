//! Listing file loader
//!
//! Turns a CSV or JSON listing export into a cleaned [`DataFrame`]:
//!
//! ```text
//!  .csv / .json
//!       │  parse cells as text
//!       ▼
//!  rename reserved columns ─► check required columns
//!       │
//!       ▼
//!  coerce numeric columns (unparseable → missing)
//!       │
//!       ▼
//!  drop rows with missing or non-positive price / odometer
//! ```

use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::{debug, info, warn};
use serde_json::Value as JsonValue;

use crate::config::LoaderConfig;
use crate::data::{DataFrame, FloatArray, Series};
use crate::error::{CoreError, Result};

#[cfg(test)]
mod tests;

/// Origin reported in errors for data that did not come from a file
const IN_MEMORY: &str = "<memory>";

/// Cells of a parsed file before type coercion
struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<Option<String>>>,
}

/// Load a listing file, dispatching on its extension.
///
/// Supported formats:
/// * `.csv`  – header row followed by one listing per line
/// * `.json` – records-oriented array, `[{ "make": "ford", "price": 9500, ... }, ...]`
pub fn load(path: impl AsRef<Path>, config: &LoaderConfig) -> Result<DataFrame> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let table = match ext.as_str() {
        "csv" => {
            let file = File::open(path).map_err(|e| CoreError::unavailable(path, e))?;
            read_csv(file, path)?
        }
        "json" => {
            let text =
                std::fs::read_to_string(path).map_err(|e| CoreError::unavailable(path, e))?;
            read_json(&text, path)?
        }
        other => {
            return Err(CoreError::unavailable(
                path,
                format!("unsupported file extension '.{}'", other),
            ))
        }
    };

    let frame = clean(table, path, config)?;
    info!(
        "loaded {} listings with {} columns from {}",
        frame.nrows(),
        frame.ncols(),
        path.display()
    );
    Ok(frame)
}

/// Load CSV listing data from any reader
pub fn load_csv_reader<R: Read>(reader: R, config: &LoaderConfig) -> Result<DataFrame> {
    let origin = Path::new(IN_MEMORY);
    clean(read_csv(reader, origin)?, origin, config)
}

/// Load records-oriented JSON listing data from a string
pub fn load_json_str(json: &str, config: &LoaderConfig) -> Result<DataFrame> {
    let origin = Path::new(IN_MEMORY);
    clean(read_json(json, origin)?, origin, config)
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

fn read_csv<R: Read>(reader: R, origin: &Path) -> Result<RawTable> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| CoreError::unavailable(origin, format!("reading CSV headers: {}", e)))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, record) in reader.records().enumerate() {
        let record = record
            .map_err(|e| CoreError::unavailable(origin, format!("CSV row {}: {}", row_no, e)))?;
        let cells = (0..headers.len())
            .map(|i| record.get(i).filter(|cell| !cell.is_empty()).map(String::from))
            .collect();
        rows.push(cells);
    }

    Ok(RawTable { headers, rows })
}

fn read_json(text: &str, origin: &Path) -> Result<RawTable> {
    let root: JsonValue = serde_json::from_str(text)
        .map_err(|e| CoreError::unavailable(origin, format!("parsing JSON: {}", e)))?;
    let records = root
        .as_array()
        .ok_or_else(|| CoreError::unavailable(origin, "expected a top-level JSON array"))?;

    // Union of keys in first-seen order
    let mut headers: Vec<String> = Vec::new();
    for (i, record) in records.iter().enumerate() {
        let object = record
            .as_object()
            .ok_or_else(|| CoreError::unavailable(origin, format!("row {} is not an object", i)))?;
        for key in object.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .filter_map(|record| record.as_object())
        .map(|object| {
            headers
                .iter()
                .map(|h| object.get(h).and_then(json_cell))
                .collect()
        })
        .collect();

    Ok(RawTable { headers, rows })
}

fn json_cell(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => None,
        JsonValue::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

/// Parse a numeric cell, tolerating currency symbols and thousands separators
///
/// Anything that still fails to parse becomes `NaN` (missing).
pub fn parse_number(cell: &str) -> f64 {
    let cleaned: String = cell
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' '))
        .collect();
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(f64::NAN)
}

// ---------------------------------------------------------------------------
// Cleaning
// ---------------------------------------------------------------------------

fn clean(table: RawTable, origin: &Path, config: &LoaderConfig) -> Result<DataFrame> {
    let RawTable { headers, rows } = table;
    let headers: Vec<String> = headers
        .iter()
        .map(|h| config.renamed(h).to_string())
        .collect();

    for required in &config.required_columns {
        if !headers.contains(required) {
            return Err(CoreError::unavailable(
                origin,
                format!("missing required column '{}'", required),
            ));
        }
    }
    for key in [&config.price_column, &config.odometer_column] {
        if !headers.contains(key) {
            return Err(CoreError::unavailable(
                origin,
                format!("missing required column '{}'", key),
            ));
        }
    }

    let mut frame = DataFrame::new();
    for (idx, name) in headers.iter().enumerate() {
        let cells = rows.iter().map(|row| row.get(idx).cloned().flatten());
        let numeric = config.is_numeric(name)
            || *name == config.price_column
            || *name == config.odometer_column;

        let series = if numeric {
            let values: FloatArray = cells
                .map(|cell| cell.as_deref().map_or(f64::NAN, parse_number))
                .collect();
            Series::Float(values)
        } else {
            Series::optional_string(cells.collect::<Vec<_>>())
        };

        frame = frame
            .with_column(name.clone(), series)
            .map_err(|e| CoreError::unavailable(origin, e))?;
    }

    let price = frame.float_column(&config.price_column)?;
    let odometer = frame.float_column(&config.odometer_column)?;

    let mut missing = 0usize;
    let mut non_positive = 0usize;
    let mask: Vec<bool> = price
        .iter()
        .zip(odometer.iter())
        .map(|(&p, &o)| {
            if p.is_nan() || o.is_nan() {
                missing += 1;
                false
            } else if p <= 0.0 || o <= 0.0 {
                non_positive += 1;
                false
            } else {
                true
            }
        })
        .collect();

    if missing > 0 {
        warn!(
            "dropped {} rows with missing {} or {}",
            missing, config.price_column, config.odometer_column
        );
    }
    if non_positive > 0 {
        warn!(
            "dropped {} rows with non-positive {} or {}",
            non_positive, config.price_column, config.odometer_column
        );
    }

    let cleaned = frame.filter(&mask)?;
    if let Some(series) = cleaned.get_column(&config.price_column) {
        if let Ok(stats) = series.describe() {
            debug!(
                "{}: n={} median={:.0} min={:.0} max={:.0}",
                config.price_column, stats.count, stats.q50, stats.min, stats.max
            );
        }
    }
    Ok(cleaned)
}
