//! CLI argument parsing
//!
//! Defines command-line interface using clap.

use clap::{Parser, Subcommand};

/// Concurrent story result aggregation into a single JUnit-style report
#[derive(Parser, Debug)]
#[command(name = "story-report")]
#[command(version)]
#[command(about = "Aggregate concurrent story results into one XML report")]
#[command(long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (YAML or JSON)
    #[arg(short, long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Replay recorded stories concurrently and emit the report
    Replay(ReplayArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

/// Arguments for replay command
#[derive(Parser, Debug)]
pub struct ReplayArgs {
    /// Story file (JSON or YAML list of stories)
    pub input: String,

    /// Report destination: a file path, or "console"
    #[arg(short, long)]
    pub output: Option<String>,

    /// Generation mode (reset, accumulate)
    #[arg(short, long)]
    pub mode: Option<String>,

    /// Number of stories running at once
    #[arg(short = 'n', long)]
    pub concurrent: Option<usize>,

    /// Summary format printed after the run (table, json, json-pretty, summary)
    #[arg(short, long)]
    pub format: Option<String>,
}

/// Arguments for config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write an example configuration file
    Init {
        /// Output path
        #[arg(default_value = "story-report.yaml")]
        output: String,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show the effective configuration
    Show {
        /// Show environment overrides instead
        #[arg(long)]
        env: bool,

        /// Output format (yaml, json)
        #[arg(short, long, default_value = "yaml")]
        format: String,
    },
}
