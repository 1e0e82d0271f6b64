//! CLI module
//!
//! Command-line interface for running the connector.
//!
//! # Commands
//!
//! - `check` - Test connection to the API
//! - `discover` - Print the entity catalog with schemas
//! - `read` - Extract data from entities
//! - `entities` - List entity names (lightweight)
//! - `validate` - Validate configuration and catalog without touching the API

mod commands;
mod runner;

pub use commands::{Cli, Commands};
pub use runner::Runner;
