//! CLI module
//!
//! Command-line interface for the fetch pipeline.
//!
//! # Commands
//!
//! - `serve` - Start HTTP server mode
//! - `fetch` - Fetch records and print them (collect or streaming)
//! - `load` - Read a streaming route back into a record list

mod commands;
mod runner;
mod server;

pub use commands::{Cli, Commands, FetchMode};
pub use runner::Runner;
pub use server::{router, serve, AppState};
