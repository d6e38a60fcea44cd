//! Command-line interface for daybook.

mod commands;

use clap::{Parser, Subcommand};

/// Daybook - a personal journal served over a REST API
#[derive(Parser)]
#[command(name = "daybook")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server (default)
    #[command(alias = "web")]
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Load and validate the configuration, then print a summary
    #[command(alias = "check")]
    CheckConfig,
}

pub use commands::*;
