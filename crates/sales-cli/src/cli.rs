//! CLI argument definitions for the sales dashboard.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "sales-dashboard",
    version,
    about = "Sales dashboard aggregation core - filter a sales table and compute its views",
    long_about = "Load a denormalized sales CSV, apply filter selections, and compute\n\
                  the dashboard's aggregate views. Rendering and transport are left to\n\
                  external collaborators; this binary prints tables and JSON payloads."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Load a sales CSV, apply selections, and render every view.
    Show(ShowArgs),

    /// List the distinct values of each filterable column.
    Columns(ColumnsArgs),

    /// Process selection events from stdin, one JSON object per line.
    Events(EventsArgs),
}

#[derive(Parser)]
pub struct ShowArgs {
    /// Path to the sales CSV file.
    #[arg(value_name = "DATA_FILE")]
    pub data: PathBuf,

    /// State selection shaping the city options.
    #[arg(long = "state", value_name = "STATE")]
    pub state: Option<String>,

    /// City multi-selection filtering the shared views (repeatable).
    #[arg(long = "city", value_name = "CITY")]
    pub cities: Vec<String>,

    /// Product for the product-and-month pivot view.
    #[arg(long = "product", value_name = "PRODUCT")]
    pub product: Option<String>,

    /// State half of the detail view's state/city pair.
    #[arg(long = "detail-state", value_name = "STATE")]
    pub detail_state: Option<String>,

    /// City half of the detail view's state/city pair.
    #[arg(long = "detail-city", value_name = "CITY")]
    pub detail_city: Option<String>,
}

#[derive(Parser)]
pub struct ColumnsArgs {
    /// Path to the sales CSV file.
    #[arg(value_name = "DATA_FILE")]
    pub data: PathBuf,
}

#[derive(Parser)]
pub struct EventsArgs {
    /// Path to the sales CSV file.
    #[arg(value_name = "DATA_FILE")]
    pub data: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
