use serde::{Deserialize, Serialize};
use std::fmt;

/// A numeric cell as seen by the loader.
///
/// Columns where every non-empty cell is a plain number are loaded as `Number`;
/// any other column keeps its raw text and goes through locale cleaning.
/// Empty cells are `Missing` and contribute nothing to sums.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Number(f64),
    Text(String),
    Missing,
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

/// One receipt line item as read from the input table
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub product: String,
    pub establishment: String,
    pub value: FieldValue,
    pub quantity: FieldValue,
    /// Only used as a per-row counting key
    pub source_url: String,
}

/// Establishment category assigned by keyword matching
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Pharmacy,
    Market,
    Fuel,
    Food,
    Other,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Pharmacy => write!(f, "Pharmacy"),
            Category::Market => write!(f, "Market"),
            Category::Fuel => write!(f, "Fuel"),
            Category::Food => write!(f, "Food"),
            Category::Other => write!(f, "Other"),
        }
    }
}

impl Category {
    /// Keywords tested against the uppercased establishment name.
    /// `Other` is the fallback and has none.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Category::Pharmacy => &["FARMACIA", "DROGARIA", "FARM", "DROG"],
            Category::Market => &["SUPERMERCADO", "MERCADO", "ATACADO", "SUPER", "VILA", "CENTER"],
            Category::Fuel => &["POSTO", "COMBUSTIVEL", "AUTO POSTO", "GASOLINA"],
            Category::Food => &["RESTAURANTE", "LANCHES", "BURGER", "FOOD", "PIZZA"],
            Category::Other => &[],
        }
    }

    /// All categories in matching priority order
    pub fn all() -> &'static [Category] {
        &[
            Category::Pharmacy,
            Category::Market,
            Category::Fuel,
            Category::Food,
            Category::Other,
        ]
    }
}

/// A record after numeric cleaning, key normalization and categorization
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub product: String,
    pub establishment: String,
    pub product_key: String,
    pub establishment_key: String,
    pub category: Category,
    pub value: f64,
    pub quantity: f64,
    pub source_url: String,
}

/// Grouped totals for one product key or one category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    pub key: String,
    pub quantity: f64,
    pub value: f64,
    pub count: usize,
}

impl AggregateRow {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            quantity: 0.0,
            value: 0.0,
            count: 0,
        }
    }

    pub fn add(&mut self, record: &NormalizedRecord) {
        self.quantity += record.quantity;
        self.value += record.value;
        self.count += 1;
    }
}
