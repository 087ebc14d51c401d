//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Typed Dispatch - validate and persist polymorphic records
#[derive(Parser, Debug)]
#[command(
    name = "typed-dispatch",
    author,
    version,
    about = "Polymorphic record dispatcher driven by a variant manifest",
    long_about = "Loads a dispatcher manifest describing a family of record variants,\n\
                  validates wire records against the variant named by their\n\
                  discriminator field, and optionally persists them in memory."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "TYPED_DISPATCH_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "TYPED_DISPATCH_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    /// Prometheus metrics port (disabled when absent)
    #[arg(long, global = true, env = "TYPED_DISPATCH_METRICS_PORT")]
    pub metrics_port: Option<u16>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate (and optionally save) records against a manifest
    Run(RunArgs),

    /// Validate a manifest and construct its dispatcher
    Validate(ValidateArgs),

    /// Display manifest information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to manifest file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "dispatcher.toml",
        env = "TYPED_DISPATCH_CONFIG"
    )]
    pub config: PathBuf,

    /// Path to a JSON file with one record, or a list with --many
    #[arg(short, long)]
    pub input: PathBuf,

    /// Treat the input as a batch
    #[arg(long)]
    pub many: bool,

    /// Persist valid input into an in-memory store and print it back
    #[arg(long)]
    pub save: bool,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to manifest file to validate
    #[arg(
        short,
        long,
        default_value = "dispatcher.toml",
        env = "TYPED_DISPATCH_CONFIG"
    )]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to manifest file
    #[arg(
        short,
        long,
        default_value = "dispatcher.toml",
        env = "TYPED_DISPATCH_CONFIG"
    )]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show declared fields of each variant
    #[arg(long)]
    pub fields: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
