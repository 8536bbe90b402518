use serde::Serialize;
use tracing::{debug, info};

use super::categorize::categorize;
use crate::constants::{CURRENCY_FALLBACK, QUANTITY_FALLBACK};
use crate::types::{FieldValue, NormalizedRecord, Record};

/// Counts of fields that could not be parsed and were replaced by a fallback
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NormalizationStats {
    pub records: usize,
    pub currency_fallbacks: usize,
    pub quantity_fallbacks: usize,
}

/// Parse a locale formatted amount such as `R$ 1.234,56`.
///
/// Periods are thousands separators and are removed before the decimal
/// comma becomes a period. Returns `None` when the result is not a finite
/// number.
pub fn parse_currency(text: &str, marker: &str) -> Option<f64> {
    let stripped = if marker.is_empty() {
        text.trim().to_string()
    } else {
        text.replace(marker, "").trim().to_string()
    };
    stripped
        .replace('.', "")
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}

/// Parse a quantity such as `2,5`. Only the decimal comma is converted.
pub fn parse_quantity(text: &str) -> Option<f64> {
    text.replace(',', ".")
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
}

/// Cleaned number for a cell, or `None` when it needs the fallback.
/// Missing cells are zero: they add nothing to any sum.
fn clean_with(value: &FieldValue, parse: impl Fn(&str) -> Option<f64>) -> Option<f64> {
    match value {
        FieldValue::Number(n) if n.is_finite() => Some(*n),
        FieldValue::Number(_) => None,
        FieldValue::Text(text) => parse(text),
        FieldValue::Missing => Some(0.0),
    }
}

/// Monetary value of a cell; numbers pass through, unreadable text is `0.0`
pub fn clean_currency(value: &FieldValue, marker: &str) -> f64 {
    clean_with(value, |text| parse_currency(text, marker)).unwrap_or(CURRENCY_FALLBACK)
}

/// Quantity of a cell; numbers pass through, unreadable text counts as one unit
pub fn clean_quantity(value: &FieldValue) -> f64 {
    clean_with(value, parse_quantity).unwrap_or(QUANTITY_FALLBACK)
}

/// Grouping key for free-form names: uppercase, then trim
pub fn normalize_text(text: &str) -> String {
    text.to_uppercase().trim().to_string()
}

pub fn normalize_record(record: &Record, marker: &str) -> NormalizedRecord {
    let product_key = normalize_text(&record.product);
    let establishment_key = normalize_text(&record.establishment);
    let category = categorize(&establishment_key);

    NormalizedRecord {
        product: record.product.clone(),
        establishment: record.establishment.clone(),
        product_key,
        establishment_key,
        category,
        value: clean_currency(&record.value, marker),
        quantity: clean_quantity(&record.quantity),
        source_url: record.source_url.clone(),
    }
}

/// Normalize every record, counting the fields that fell back to defaults.
pub fn normalize_all(records: &[Record], marker: &str) -> (Vec<NormalizedRecord>, NormalizationStats) {
    let mut stats = NormalizationStats {
        records: records.len(),
        ..Default::default()
    };

    let normalized = records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            if clean_with(&record.value, |text| parse_currency(text, marker)).is_none() {
                stats.currency_fallbacks += 1;
                debug!(row = i + 1, value = ?record.value, "Unreadable value, using {}", CURRENCY_FALLBACK);
            }
            if clean_with(&record.quantity, parse_quantity).is_none() {
                stats.quantity_fallbacks += 1;
                debug!(row = i + 1, quantity = ?record.quantity, "Unreadable quantity, using {}", QUANTITY_FALLBACK);
            }
            normalize_record(record, marker)
        })
        .collect();

    info!(
        "Normalized {} records ({} value fallbacks, {} quantity fallbacks)",
        stats.records, stats.currency_fallbacks, stats.quantity_fallbacks
    );

    (normalized, stats)
}
