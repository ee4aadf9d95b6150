//! Epireshape - weekly epidemiological record reshaper
//!
//! A CLI tool that reshapes a flat JSON array of per-country weekly
//! records into a nested per-country time-series document with a
//! synthesized "WORLD" aggregate entry.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (read, parse, or write failure)
//!   2 - World-total consistency check failed (--check)

mod aggregate;
mod cli;
mod config;
mod error;
mod input;
mod models;
mod report;

use anyhow::{Context, Result};
use cli::Args;
use config::Config;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("Epireshape v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    // Run the reshape
    match run_reshape(args) {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Reshape failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .epireshape.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(".epireshape.toml");

    if path.exists() {
        eprintln!("⚠️  .epireshape.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .epireshape.toml")?;

    println!("✅ Created .epireshape.toml with default settings.");
    println!("   Edit it to customize the output path and indentation.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete reshape workflow. Returns exit code (0 or 2).
fn run_reshape(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let input_path = args.input_path().to_path_buf();
    let output_path = PathBuf::from(&config.general.output);

    // Step 1: Read and parse the input records
    println!("📥 Reading records: {}", input_path.display());
    let records = input::read_records(&input_path)?;
    info!("Parsed {} records", records.len());

    // Step 2: Single-pass aggregation
    println!("🔄 Reshaping {} records...", records.len());
    let (document, summary) = aggregate::reshape(&records);

    // Step 3: Optional post-hoc consistency check
    if args.check {
        println!("🔍 Checking world totals...");
        let problems = aggregate::verify_world_totals(&document);

        if !problems.is_empty() {
            for problem in &problems {
                warn!("world total mismatch: {}", problem);
                eprintln!("   ⚠️  {}", problem);
            }
            eprintln!("\n⛔ World totals disagree with the per-country data (exit code 2).");
            return Ok(2);
        }
        println!("   World totals are consistent.");
    }

    let duration = start_time.elapsed().as_secs_f64();

    // Print summary
    println!("\n📊 Reshape Summary:");
    println!("   Records processed: {}", summary.records);
    println!(
        "   - Cases: {} | Deaths: {} | Skipped: {}",
        summary.cases_records, summary.deaths_records, summary.skipped_records
    );
    println!("   Countries: {}", summary.countries);
    println!("   Periods: {}", summary.periods);
    if let Some(world) = document.get(aggregate::WORLD_CODE) {
        println!("   World population: {}", world.properties().population);
    }
    println!("   Duration: {:.1}s", duration);

    // Handle --dry-run: stop before writing
    if args.dry_run {
        println!("\n✅ Dry run complete. No output was written.");
        return Ok(0);
    }

    // Step 4: Write the output document. This is the final step: nothing
    // is written when any earlier step fails.
    report::write_document(&document, &output_path, config.report.indent)?;

    println!(
        "\n✅ Data successfully transformed and saved to: {}",
        output_path.display()
    );

    Ok(0)
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .epireshape.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
