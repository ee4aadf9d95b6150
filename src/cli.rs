//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use clap::Parser;
use std::path::{Path, PathBuf};

/// Epireshape - weekly epidemiological record reshaper
///
/// Reshape a flat JSON array of per-country weekly records into a nested
/// per-country time-series document with a synthesized world aggregate.
///
/// Examples:
///   epireshape --input data.json
///   epireshape --input data.json --output pandemicData.json
///   epireshape --input data.json --check
///   epireshape --input data.json --dry-run
///   epireshape --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Input JSON file: a flat array of weekly records
    ///
    /// Not required when using --init-config.
    #[arg(
        short,
        long,
        value_name = "FILE",
        required_unless_present = "init_config"
    )]
    pub input: Option<PathBuf>,

    /// Output file path for the reshaped document
    ///
    /// Overrides the config file setting; the effective default is
    /// pandemicData.json.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .epireshape.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Re-derive world totals from the per-country entries and fail on
    /// any discrepancy
    ///
    /// Useful for CI pipelines. Exit code 2 when the totals disagree,
    /// which happens when the input carried duplicate rows for the same
    /// (country, period, indicator) triple.
    #[arg(long)]
    pub check: bool,

    /// Dry run: read and aggregate without writing the output file
    ///
    /// Prints the run summary and exits.
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .epireshape.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the input path, empty if not set (should be validated first).
    pub fn input_path(&self) -> &Path {
        self.input.as_deref().unwrap_or_else(|| Path::new(""))
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        let Some(ref input) = self.input else {
            return Err("An input file is required".to_string());
        };

        if !input.exists() {
            return Err(format!("Input file does not exist: {}", input.display()));
        }

        if input.is_dir() {
            return Err(format!("Input path is a directory: {}", input.display()));
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn make_args() -> Args {
        Args {
            input: None,
            output: None,
            config: None,
            verbose: false,
            quiet: false,
            check: false,
            dry_run: false,
            init_config: false,
        }
    }

    fn existing_input() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"[]").unwrap();
        file
    }

    #[test]
    fn test_validation_requires_input() {
        let args = make_args();
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_missing_input_file() {
        let mut args = make_args();
        args.input = Some(PathBuf::from("/nonexistent/weekly.json"));
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_validation_accepts_existing_input() {
        let file = existing_input();
        let mut args = make_args();
        args.input = Some(file.path().to_path_buf());
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_validation_conflicting_options() {
        let file = existing_input();
        let mut args = make_args();
        args.input = Some(file.path().to_path_buf());
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_init_config_skips_validation() {
        let mut args = make_args();
        args.init_config = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }
}
