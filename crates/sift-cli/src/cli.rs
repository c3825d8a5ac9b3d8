//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Sift - a star-schema ETL and data-quality pipeline
#[derive(Parser, Debug)]
#[command(name = "sift")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Override the database path
    #[arg(short, long, global = true)]
    pub target: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scaffold a sift.yml in the project directory
    Init(InitArgs),

    /// Load the raw input files into the staging tables
    Ingest(IngestArgs),

    /// Build the cleaned star schema from staging
    Transform(TransformArgs),

    /// Compute data-quality diagnostics and write the quality report
    Validate(ValidateArgs),

    /// Run the full pipeline: ingest, validate, transform, validate
    Run(RunArgs),
}

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing sift.yml
    #[arg(long)]
    pub force: bool,
}

/// Arguments for the ingest command
#[derive(Args, Debug)]
pub struct IngestArgs {
    /// Source names to load (comma-separated, default: all)
    #[arg(short, long)]
    pub sources: Option<String>,
}

/// Arguments for the transform command
#[derive(Args, Debug)]
pub struct TransformArgs {
    /// Drop and recreate all target tables first
    #[arg(long)]
    pub full_refresh: bool,
}

/// Validation stages
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageArg {
    /// Staging tables only
    Raw,
    /// Cleaned tables only
    Transformed,
    /// Both halves
    Both,
}

/// Arguments for the validate command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Which stage to validate
    #[arg(short, long, value_enum, default_value = "both")]
    pub stage: StageArg,
}

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Drop and recreate all target tables before transforming
    #[arg(long)]
    pub full_refresh: bool,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
