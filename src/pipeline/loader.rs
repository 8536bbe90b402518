use csv::{ReaderBuilder, StringRecord};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, instrument, warn};

use crate::config::ColumnConfig;
use crate::error::{ReportError, Result};
use crate::types::{FieldValue, Record};

/// Positions of the expected columns within the header row
#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    product: usize,
    establishment: usize,
    value: usize,
    quantity: usize,
    url: usize,
}

impl ColumnIndex {
    fn resolve(headers: &StringRecord, columns: &ColumnConfig) -> Result<Self> {
        let find = |name: &str| -> Result<usize> {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}').trim() == name)
                .ok_or_else(|| {
                    warn!(
                        "Column '{}' not found; headers present: {:?}",
                        name,
                        headers.iter().collect::<Vec<_>>()
                    );
                    ReportError::MissingColumn(name.to_string())
                })
        };

        Ok(Self {
            product: find(&columns.product)?,
            establishment: find(&columns.establishment)?,
            value: find(&columns.value)?,
            quantity: find(&columns.quantity)?,
            url: find(&columns.url)?,
        })
    }
}

/// Load every line item from the delimited file at `path`.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn load_records(path: &Path, columns: &ColumnConfig, delimiter: u8) -> Result<Vec<Record>> {
    if !path.exists() {
        return Err(ReportError::InputNotFound(path.to_path_buf()));
    }
    let file = File::open(path)?;
    let records = read_records(file, columns, delimiter)?;
    info!("Loaded {} line items", records.len());
    Ok(records)
}

/// Read line items from any reader holding a header row followed by data rows.
pub fn read_records<R: Read>(reader: R, columns: &ColumnConfig, delimiter: u8) -> Result<Vec<Record>> {
    let mut csv_reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let index = ColumnIndex::resolve(&headers, columns)?;

    let rows = csv_reader
        .records()
        .collect::<std::result::Result<Vec<StringRecord>, csv::Error>>()?;

    let value_numeric = is_numeric_column(&rows, index.value);
    let quantity_numeric = is_numeric_column(&rows, index.quantity);
    debug!(value_numeric, quantity_numeric, "Inferred numeric column types");

    let records = rows
        .iter()
        .map(|row| Record {
            product: cell(row, index.product).to_string(),
            establishment: cell(row, index.establishment).to_string(),
            value: typed_cell(row, index.value, value_numeric),
            quantity: typed_cell(row, index.quantity, quantity_numeric),
            source_url: cell(row, index.url).to_string(),
        })
        .collect();

    Ok(records)
}

fn cell(row: &StringRecord, idx: usize) -> &str {
    row.get(idx).unwrap_or("")
}

/// Plain float that is neither NaN nor infinite
fn parse_finite(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// A column is numeric when it has at least one value and every non-empty
/// cell parses as a finite plain float.
fn is_numeric_column(rows: &[StringRecord], idx: usize) -> bool {
    let mut seen_value = false;
    for row in rows {
        let raw = cell(row, idx).trim();
        if raw.is_empty() {
            continue;
        }
        if parse_finite(raw).is_none() {
            return false;
        }
        seen_value = true;
    }
    seen_value
}

fn typed_cell(row: &StringRecord, idx: usize, numeric: bool) -> FieldValue {
    let raw = cell(row, idx);
    if raw.trim().is_empty() {
        return FieldValue::Missing;
    }
    if numeric {
        if let Some(number) = parse_finite(raw.trim()) {
            return FieldValue::Number(number);
        }
    }
    FieldValue::Text(raw.to_string())
}
