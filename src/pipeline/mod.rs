// Report pipeline: load → normalize → aggregate → render

pub mod aggregate;
pub mod categorize;
pub mod loader;
pub mod normalize;
pub mod report;

use serde::Serialize;
use std::time::Instant;
use tracing::{info, instrument};

use crate::config::Config;
use crate::error::Result;
use crate::types::NormalizedRecord;
use self::aggregate::Aggregates;
use self::normalize::NormalizationStats;

/// Result of a complete pipeline run
#[derive(Debug, Clone, Serialize)]
pub struct PipelineResult {
    pub input_file: String,
    pub output_file: String,
    pub rows: usize,
    pub distinct_products: usize,
    pub total_spend: f64,
    pub total_quantity: f64,
    pub normalization: NormalizationStats,
    pub duration_ms: u128,
}

pub struct Pipeline;

impl Pipeline {
    /// Run every stage and write the report to `config.output`.
    ///
    /// Returns `ReportError::InputNotFound` without touching the output path
    /// when the input file does not exist.
    #[instrument(skip(config), fields(input = %config.input.display(), output = %config.output.display()))]
    pub fn run(config: &Config) -> Result<PipelineResult> {
        let started = Instant::now();

        // Step 1: Load
        info!("📥 Loading line items...");
        let records = loader::load_records(&config.input, &config.columns, config.delimiter_byte()?)?;

        // Step 2: Normalize
        info!("🔧 Normalizing {} line items...", records.len());
        let (normalized, stats) = normalize::normalize_all(&records, &config.currency_marker);

        // Step 3: Aggregate
        info!("📊 Aggregating...");
        let aggregates = Self::aggregate(&normalized, config);
        let distinct_products = aggregate::group_by_product(&normalized).len();

        // Step 4: Report
        let contents = report::render(&aggregates, &config.report);
        report::write_report(&config.output, &contents)?;

        let result = PipelineResult {
            input_file: config.input.display().to_string(),
            output_file: config.output.display().to_string(),
            rows: aggregates.summary.rows,
            distinct_products,
            total_spend: aggregates.summary.total_spend,
            total_quantity: aggregates.summary.total_quantity,
            normalization: stats,
            duration_ms: started.elapsed().as_millis(),
        };
        info!("✅ Pipeline finished in {} ms", result.duration_ms);
        Ok(result)
    }

    fn aggregate(records: &[NormalizedRecord], config: &Config) -> Aggregates {
        aggregate::aggregate(
            records,
            config.report.top_n,
            config.report.deep_dive_top,
            &config.report.deep_dive_categories,
        )
    }
}
