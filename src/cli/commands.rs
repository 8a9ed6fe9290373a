//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Paged FHIR fetcher with streaming delivery
#[derive(Parser, Debug)]
#[command(name = "fhir-stream")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server mode
    Serve {
        /// Interface to bind (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Fetch records from the upstream and print them
    Fetch {
        /// Delivery mode
        #[arg(short, long, default_value = "all")]
        mode: FetchMode,

        /// Records per upstream page
        #[arg(long)]
        page_size: Option<u32>,

        /// Drop the recent-date filter
        #[arg(long)]
        all_dates: bool,

        /// Stop after this many pages
        #[arg(long)]
        max_pages: Option<u32>,
    },

    /// Read a streaming route and reassemble its records
    Load {
        /// Route to read
        #[arg(long, default_value = "http://localhost:3000/patients/stream")]
        url: String,
    },
}

/// Fetch delivery mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FetchMode {
    /// Collect every page, print one array
    All,
    /// Collect the first page only
    One,
    /// Print each page as it arrives
    Stream,
}
