use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::types::{AggregateRow, Category, NormalizedRecord};

/// Overall totals across every record, including unnamed products
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Summary {
    pub rows: usize,
    pub total_spend: f64,
    pub total_quantity: f64,
}

/// Everything the reporter needs, computed once per run
#[derive(Debug, Clone, Serialize)]
pub struct Aggregates {
    pub summary: Summary,
    pub top_by_frequency: Vec<AggregateRow>,
    pub top_by_spend: Vec<AggregateRow>,
    pub categories: Vec<AggregateRow>,
    pub deep_dives: Vec<DeepDive>,
}

/// Most frequent products within one establishment category
#[derive(Debug, Clone, Serialize)]
pub struct DeepDive {
    pub category: Category,
    pub rows: Vec<AggregateRow>,
}

pub fn summarize(records: &[NormalizedRecord]) -> Summary {
    records.iter().fold(
        Summary {
            rows: records.len(),
            ..Default::default()
        },
        |mut summary, record| {
            summary.total_spend += record.value;
            summary.total_quantity += record.quantity;
            summary
        },
    )
}

/// Group records by product key. Records with an empty product name carry
/// no key and are left out of product rankings.
pub fn group_by_product<'a, I>(records: I) -> Vec<AggregateRow>
where
    I: IntoIterator<Item = &'a NormalizedRecord>,
{
    let mut groups: HashMap<&str, AggregateRow> = HashMap::new();
    for record in records {
        if record.product_key.is_empty() {
            continue;
        }
        groups
            .entry(record.product_key.as_str())
            .or_insert_with(|| AggregateRow::new(record.product_key.as_str()))
            .add(record);
    }
    groups.into_values().collect()
}

fn by_count(a: &AggregateRow, b: &AggregateRow) -> Ordering {
    b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key))
}

fn by_value(a: &AggregateRow, b: &AggregateRow) -> Ordering {
    b.value.total_cmp(&a.value).then_with(|| a.key.cmp(&b.key))
}

/// Products sorted by number of line items, most frequent first
pub fn top_by_frequency(rows: &[AggregateRow], n: usize) -> Vec<AggregateRow> {
    let mut sorted = rows.to_vec();
    sorted.sort_by(by_count);
    sorted.truncate(n);
    sorted
}

/// Products sorted by total spend, largest first
pub fn top_by_spend(rows: &[AggregateRow], n: usize) -> Vec<AggregateRow> {
    let mut sorted = rows.to_vec();
    sorted.sort_by(by_value);
    sorted.truncate(n);
    sorted
}

/// Spend and item count per category, largest spend first. Only categories
/// with at least one record appear.
pub fn category_breakdown(records: &[NormalizedRecord]) -> Vec<AggregateRow> {
    let mut groups: HashMap<Category, AggregateRow> = HashMap::new();
    for record in records {
        groups
            .entry(record.category)
            .or_insert_with(|| AggregateRow::new(record.category.to_string()))
            .add(record);
    }
    let mut rows: Vec<AggregateRow> = groups.into_values().collect();
    rows.sort_by(by_value);
    rows
}

/// Most frequent products among the records of `category`. Empty when the
/// category has no records.
pub fn deep_dive(records: &[NormalizedRecord], category: Category, n: usize) -> DeepDive {
    let rows = group_by_product(records.iter().filter(|r| r.category == category));
    DeepDive {
        category,
        rows: top_by_frequency(&rows, n),
    }
}

pub fn aggregate(
    records: &[NormalizedRecord],
    top_n: usize,
    deep_dive_top: usize,
    deep_dive_categories: &[Category],
) -> Aggregates {
    let products = group_by_product(records);

    Aggregates {
        summary: summarize(records),
        top_by_frequency: top_by_frequency(&products, top_n),
        top_by_spend: top_by_spend(&products, top_n),
        categories: category_breakdown(records),
        deep_dives: deep_dive_categories
            .iter()
            .map(|&category| deep_dive(records, category, deep_dive_top))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(product: &str, category: Category, value: f64, quantity: f64) -> NormalizedRecord {
        NormalizedRecord {
            product: product.to_string(),
            establishment: category.to_string(),
            product_key: product.to_uppercase(),
            establishment_key: category.to_string().to_uppercase(),
            category,
            value,
            quantity,
            source_url: format!("http://example.com/{product}"),
        }
    }

    #[test]
    fn test_group_by_product_sums_and_counts() {
        let records = vec![
            record("leite", Category::Market, 4.5, 1.0),
            record("LEITE", Category::Market, 4.5, 2.0),
            record("pao", Category::Market, 1.0, 3.0),
        ];
        let mut rows = group_by_product(&records);
        rows.sort_by(|a, b| a.key.cmp(&b.key));

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].key, "LEITE");
        assert_eq!(rows[0].count, 2);
        assert_eq!(rows[0].value, 9.0);
        assert_eq!(rows[0].quantity, 3.0);
    }

    #[test]
    fn test_unnamed_products_only_count_in_totals() {
        let records = vec![
            record("", Category::Other, 5.0, 1.0),
            record("arroz", Category::Market, 10.0, 1.0),
        ];

        assert_eq!(group_by_product(&records).len(), 1);
        assert_eq!(summarize(&records).total_spend, 15.0);
        let categories = category_breakdown(&records);
        assert_eq!(categories.iter().map(|c| c.count).sum::<usize>(), 2);
    }

    #[test]
    fn test_frequency_ranking_truncates_to_top_n() {
        let mut records = Vec::new();
        for i in 0..30 {
            for _ in 0..=(i % 7) {
                records.push(record(&format!("product {i:02}"), Category::Market, 1.0, 1.0));
            }
        }
        let products = group_by_product(&records);
        assert_eq!(products.len(), 30);

        let top = top_by_frequency(&products, 20);
        assert_eq!(top.len(), 20);
        assert!(top.windows(2).all(|w| w[0].count >= w[1].count));
        assert_eq!(top[0].count, 7);
    }

    #[test]
    fn test_ties_break_alphabetically() {
        let records = vec![
            record("banana", Category::Market, 2.0, 1.0),
            record("abacaxi", Category::Market, 2.0, 1.0),
            record("caju", Category::Market, 2.0, 1.0),
        ];
        let products = group_by_product(&records);

        let keys: Vec<_> = top_by_frequency(&products, 20).into_iter().map(|r| r.key).collect();
        assert_eq!(keys, vec!["ABACAXI", "BANANA", "CAJU"]);
        let keys: Vec<_> = top_by_spend(&products, 20).into_iter().map(|r| r.key).collect();
        assert_eq!(keys, vec!["ABACAXI", "BANANA", "CAJU"]);
    }

    #[test]
    fn test_spend_ranking_orders_by_value() {
        let records = vec![
            record("cheap", Category::Market, 1.0, 1.0),
            record("cheap", Category::Market, 1.0, 1.0),
            record("pricey", Category::Pharmacy, 50.0, 1.0),
        ];
        let products = group_by_product(&records);

        let top = top_by_spend(&products, 1);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].key, "PRICEY");
        assert_eq!(top_by_frequency(&products, 1)[0].key, "CHEAP");
    }

    #[test]
    fn test_category_spend_is_conserved() {
        let records = vec![
            record("a", Category::Market, 10.1, 1.0),
            record("b", Category::Pharmacy, 20.2, 1.0),
            record("c", Category::Fuel, 150.35, 1.0),
            record("d", Category::Food, 33.3, 1.0),
            record("e", Category::Other, 0.05, 1.0),
            record("f", Category::Market, 7.77, 1.0),
        ];
        let categories = category_breakdown(&records);
        let category_total: f64 = categories.iter().map(|c| c.value).sum();

        assert_eq!(categories.len(), 5);
        assert!((category_total - summarize(&records).total_spend).abs() < 1e-9);
        assert_eq!(categories[0].key, "Fuel");
        assert!(categories.windows(2).all(|w| w[0].value >= w[1].value));
    }

    #[test]
    fn test_deep_dive_filters_by_category() {
        let records = vec![
            record("leite", Category::Market, 4.5, 1.0),
            record("dipirona", Category::Pharmacy, 10.0, 2.0),
        ];

        let market = deep_dive(&records, Category::Market, 10);
        assert_eq!(market.rows.len(), 1);
        assert_eq!(market.rows[0].key, "LEITE");

        let fuel = deep_dive(&records, Category::Fuel, 10);
        assert!(fuel.rows.is_empty());
    }

    #[test]
    fn test_deep_dive_keeps_top_n_by_frequency() {
        let mut records = Vec::new();
        for i in 0..15 {
            for _ in 0..=i {
                records.push(record(&format!("item {i:02}"), Category::Market, 1.0, 1.0));
            }
        }
        // A busier product in another category stays out of the Market list
        for _ in 0..40 {
            records.push(record("gasolina", Category::Fuel, 5.0, 1.0));
        }

        let market = deep_dive(&records, Category::Market, 10);

        assert_eq!(market.rows.len(), 10);
        let counts: Vec<usize> = market.rows.iter().map(|r| r.count).collect();
        assert_eq!(counts, (6..=15).rev().collect::<Vec<_>>());
        assert_eq!(market.rows[0].key, "ITEM 14");
        assert_eq!(market.rows[9].key, "ITEM 05");
        assert!(market.rows.iter().all(|r| r.key != "GASOLINA"));
    }

    #[test]
    fn test_aggregate_builds_every_section() {
        let records = vec![
            record("leite", Category::Market, 4.5, 1.0),
            record("dipirona", Category::Pharmacy, 10.0, 2.0),
        ];
        let aggregates = aggregate(&records, 20, 10, &[Category::Market, Category::Pharmacy]);

        assert_eq!(aggregates.summary.rows, 2);
        assert_eq!(aggregates.top_by_frequency.len(), 2);
        assert_eq!(aggregates.top_by_spend[0].key, "DIPIRONA");
        assert_eq!(aggregates.categories.len(), 2);
        assert_eq!(aggregates.deep_dives.len(), 2);
        assert_eq!(aggregates.deep_dives[0].category, Category::Market);
    }
}
