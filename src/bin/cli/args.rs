//! CLI Argument Structures
//!
//! This module contains all CLI argument definitions, command structures,
//! and output enums used by the `nps` binary.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use nps_stats::ReportFormat;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Net Promoter Score statistics and slicer segmentation
#[derive(Parser)]
#[command(name = "nps")]
#[command(version = VERSION)]
#[command(about = "Net Promoter Score statistics and slicer segmentation")]
#[command(long_about = "
Score survey responses and find the slicers that perform differently from
the population as a whole.

Common Usage:

  # Segment a CSV of per-slicer counts and print a table
  nps segment survey.csv --format table

  # Use 99% control limits and write JSON to a file
  nps segment survey.csv --confidence 0.99 --output report.json

  # Score raw ratings
  nps score 10 9 7 3 0

  # Score any JSON input (ratings, records or tallies) from stdin
  cat responses.json | nps score --json -
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Segment per-slicer survey counts against their population
    Segment(SegmentArgs),

    /// Score raw ratings or JSON responses
    Score(ScoreArgs),

    /// Print default configuration in YAML format
    #[command(name = "print-default-config")]
    PrintDefaultConfig,

    /// Validate an nps configuration file
    #[command(name = "validate-config")]
    ValidateConfig(ValidateConfigArgs),
}

#[derive(Args)]
pub struct SegmentArgs {
    /// CSV file with one row per slicer
    #[arg(value_name = "CSV")]
    pub csv: PathBuf,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub limits: ControlLimitArgs,
}

/// Control-limit overrides
#[derive(Args, Debug, Clone, Default)]
pub struct ControlLimitArgs {
    /// Confidence level for the control limits (e.g. 0.95)
    #[arg(long, conflicts_with = "z")]
    pub confidence: Option<f64>,

    /// Explicit z value for the control limits
    #[arg(long)]
    pub z: Option<f64>,
}

#[derive(Args)]
pub struct ScoreArgs {
    /// Integer ratings from 0 to 10
    #[arg(value_name = "RATINGS", conflicts_with = "json", allow_negative_numbers = true)]
    pub ratings: Vec<f64>,

    /// JSON input file; `-` reads stdin
    #[arg(long, value_name = "FILE")]
    pub json: Option<PathBuf>,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[derive(Args)]
pub struct ValidateConfigArgs {
    /// Path to configuration file to validate
    #[arg(value_name = "FILE")]
    pub config: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// JSON format output
    Json,
    /// YAML format output
    Yaml,
    /// Human-readable table
    Table,
}

impl From<OutputFormat> for ReportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => ReportFormat::Json,
            OutputFormat::Yaml => ReportFormat::Yaml,
            OutputFormat::Table => ReportFormat::Table,
        }
    }
}
