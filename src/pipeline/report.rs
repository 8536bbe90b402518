use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tracing::info;

use super::aggregate::{Aggregates, DeepDive};
use crate::config::ReportConfig;
use crate::error::Result;
use crate::types::AggregateRow;

/// Format a number with two decimals and comma thousands separators,
/// e.g. `1234567.891` becomes `1,234,567.89`.
pub fn format_thousands(value: f64) -> String {
    // Normalization never yields these, but the renderer takes any aggregate
    if !value.is_finite() {
        return value.to_string();
    }
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}

fn money(prefix: &str, value: f64) -> String {
    format!("{prefix} {value:.2}")
}

/// Product names go into table cells verbatim apart from the column separator
fn cell(text: &str) -> String {
    text.replace('|', "\\|")
}

/// Render the aggregates as a markdown document
pub fn render(aggregates: &Aggregates, settings: &ReportConfig) -> String {
    let prefix = settings.currency_prefix.as_str();
    let summary = &aggregates.summary;
    let mut out = String::new();

    // Writing to a String cannot fail
    let _ = writeln!(out, "# Purchase Report\n");
    let _ = writeln!(out, "**Total Spend**: {prefix} {}\n", format_thousands(summary.total_spend));
    let _ = writeln!(out, "**Total Items**: {}\n", format_thousands(summary.total_quantity));

    let _ = writeln!(out, "## Top {} Most Frequent Products (Frequency)\n", settings.top_n);
    let _ = writeln!(out, "| Product | Frequency | Total Qty | Total Spend |");
    let _ = writeln!(out, "|---|---|---|---|");
    for row in &aggregates.top_by_frequency {
        let _ = writeln!(
            out,
            "| {} | {} | {:.2} | {} |",
            cell(&row.key),
            row.count,
            row.quantity,
            money(prefix, row.value)
        );
    }

    let _ = writeln!(out, "\n## Top {} Products by Spend\n", settings.top_n);
    let _ = writeln!(out, "| Product | Total Spend | Frequency | Total Qty |");
    let _ = writeln!(out, "|---|---|---|---|");
    for row in &aggregates.top_by_spend {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {:.2} |",
            cell(&row.key),
            money(prefix, row.value),
            row.count,
            row.quantity
        );
    }

    let _ = writeln!(out, "\n## Spend by Establishment Category (Estimated)\n");
    let _ = writeln!(out, "| Category | Total Spend | Items Purchased |");
    let _ = writeln!(out, "|---|---|---|");
    for row in &aggregates.categories {
        let _ = writeln!(out, "| {} | {} | {} |", row.key, money(prefix, row.value), row.count);
    }

    for dive in &aggregates.deep_dives {
        render_deep_dive(&mut out, dive, settings);
    }

    out
}

fn render_deep_dive(out: &mut String, dive: &DeepDive, settings: &ReportConfig) {
    let _ = writeln!(out, "\n### Top {} Items in {}\n", settings.deep_dive_top, dive.category);
    if dive.rows.is_empty() {
        let _ = writeln!(out, "_No data found for {}._", dive.category);
        return;
    }
    let _ = writeln!(out, "| Product | Frequency | Total Spend |");
    let _ = writeln!(out, "|---|---|---|");
    for AggregateRow { key, value, count, .. } in &dive.rows {
        let _ = writeln!(
            out,
            "| {} | {} | {} |",
            cell(key),
            count,
            money(&settings.currency_prefix, *value)
        );
    }
}

/// Write the report, replacing any previous one at `path`
pub fn write_report(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, contents)?;
    info!("Report written to {}", path.display());
    Ok(())
}
