//! CLI argument parsing for funnelscope

use crate::break_detection::BreakSeverity;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for the diagnosis report
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
    /// CSV format for spreadsheet analysis
    Csv,
}

/// Minimum break severity to report
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SeverityFilter {
    Warning,
    Significant,
    Critical,
}

impl From<SeverityFilter> for BreakSeverity {
    fn from(filter: SeverityFilter) -> Self {
        match filter {
            SeverityFilter::Warning => BreakSeverity::Warning,
            SeverityFilter::Significant => BreakSeverity::Significant,
            SeverityFilter::Critical => BreakSeverity::Critical,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "funnelscope")]
#[command(version)]
#[command(
    about = "Detect conversion-rate breaks in marketing funnels and attribute them to recorded changes",
    long_about = None
)]
pub struct Cli {
    /// Funnel events file (CSV, or JSON when the extension is .json)
    #[arg(short, long, value_name = "PATH")]
    pub events: PathBuf,

    /// Change log file (CSV, or JSON when the extension is .json)
    #[arg(short, long, value_name = "PATH")]
    pub changes: Option<PathBuf>,

    /// TOML file overriding detector and analyzer settings
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Only analyze this funnel
    #[arg(long, value_name = "ID")]
    pub funnel: Option<String>,

    /// Hide breaks below this severity
    #[arg(long = "min-severity", value_enum, value_name = "LEVEL")]
    pub min_severity: Option<SeverityFilter>,

    /// Enable debug logging to stderr
    #[arg(long)]
    pub debug: bool,
}
