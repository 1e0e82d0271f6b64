//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// dbt Cloud connector CLI
#[derive(Parser, Debug)]
#[command(name = "dbtcloud-connector")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (JSON)
    #[arg(short = 'C', long, global = true)]
    pub config: Option<PathBuf>,

    /// Inline config JSON (takes precedence over --config)
    #[arg(long, global = true)]
    pub config_json: Option<String>,

    /// State file (JSON); omitted means in-memory state for this run
    #[arg(short, long, global = true)]
    pub state: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Test connection to the API
    Check,

    /// Print the entity catalog with schemas
    Discover,

    /// Extract data from entities
    Read {
        /// Entities to extract (comma-separated, empty = all)
        #[arg(long)]
        entities: Option<String>,

        /// Output file for NDJSON records (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Ignore checkpointed tokens and start from the beginning
        #[arg(long)]
        full_refresh: bool,
    },

    /// List entity names
    Entities,

    /// Validate configuration and catalog without touching the API
    Validate,
}
