use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

use receipt_report::config::{Config, ConfigOverrides};
use receipt_report::error::ReportError;
use receipt_report::logging;
use receipt_report::pipeline::categorize::categorize;
use receipt_report::pipeline::normalize::normalize_text;
use receipt_report::pipeline::{Pipeline, PipelineResult};
use receipt_report::types::Category;

/// Exit status when the input file does not exist
const EXIT_INPUT_NOT_FOUND: u8 = 2;

#[derive(Parser)]
#[command(name = "receipt_report")]
#[command(about = "Summarize receipt line items into a markdown spending report")]
#[command(version)]
struct Cli {
    /// Log at debug level (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the line items and write the report
    Report {
        /// Input table (defaults to notas_parana_completo.csv)
        #[arg(short, long)]
        input: Option<PathBuf>,
        /// Report destination (defaults to analise_compras.md)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// TOML configuration file (defaults to report.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Number of products in the frequency and spend rankings
        #[arg(long)]
        top: Option<usize>,
        /// Number of products in each category deep-dive
        #[arg(long)]
        deep_dive_top: Option<usize>,
        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the category each establishment name falls into
    Categorize {
        /// Establishment names
        #[arg(required = true)]
        names: Vec<String>,
    },
    /// List categories and the keywords that select them
    Categories,
}

fn run_report(config_path: Option<PathBuf>, overrides: ConfigOverrides) -> Result<PipelineResult, ReportError> {
    let config = Config::load(config_path.as_deref())?.with_overrides(overrides);
    config.validate()?;

    Pipeline::run(&config)
}

fn print_result(result: &PipelineResult, json: bool) -> anyhow::Result<()> {
    if json {
        let out = serde_json::to_string_pretty(result).context("Failed to serialize run summary")?;
        println!("{out}");
        return Ok(());
    }
    println!("\n📊 Report results:");
    println!("   Line items: {}", result.rows);
    println!("   Distinct products: {}", result.distinct_products);
    println!("   Total spend: {:.2}", result.total_spend);
    println!("   Total quantity: {:.2}", result.total_quantity);
    println!("   Output file: {}", result.output_file);
    Ok(())
}

fn main() -> anyhow::Result<ExitCode> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    let _guard = logging::init_logging(cli.verbose);

    match cli.command {
        Commands::Report {
            input,
            output,
            config,
            top,
            deep_dive_top,
            json,
        } => {
            let overrides = ConfigOverrides {
                input,
                output,
                top_n: top,
                deep_dive_top,
            };
            match run_report(config, overrides) {
                Ok(result) => print_result(&result, json)?,
                Err(ReportError::InputNotFound(path)) => {
                    println!("Input file {} not found.", path.display());
                    return Ok(ExitCode::from(EXIT_INPUT_NOT_FOUND));
                }
                Err(e) => {
                    error!("Report run failed: {}", e);
                    return Err(e).context("Report run failed");
                }
            }
        }
        Commands::Categorize { names } => {
            for name in names {
                println!("{}\t{}", categorize(&normalize_text(&name)), name);
            }
        }
        Commands::Categories => {
            for category in Category::all() {
                let keywords = category.keywords();
                if keywords.is_empty() {
                    println!("{category}: (anything else)");
                } else {
                    println!("{category}: {}", keywords.join(", "));
                }
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
