// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # fhir-stream
//!
//! Paged fetching of FHIR resources with incremental delivery.
//!
//! The upstream is walked with offset/limit paging. Records are either
//! collected into one list or streamed to the caller page by page, each page
//! written as its own JSON array over a long-lived HTTP response. A client
//! side reassembler reads such a response back into a single record list.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use fhir_stream::{AppConfig, FetchOverrides, FetchService};
//!
//! #[tokio::main]
//! async fn main() -> fhir_stream::Result<()> {
//!     let config = AppConfig::load("fhir-stream.yaml")?;
//!     let service = FetchService::from_config(&config)?;
//!
//!     match service.fetch_all(&FetchOverrides::default()).await.into_result() {
//!         Ok(records) => println!("{} records", records.len()),
//!         Err(failure) => eprintln!("{}", failure.message),
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐  page   ┌──────────────────┐  page   ┌─────────────────┐
//! │ PageFetcher  │────────▶│ PaginationDriver │────────▶│ StreamTransport │
//! │ (HTTP+decode)│◀────────│ (offset/limit)   │         │ (JSON chunks)   │
//! └──────────────┘ request └──────────────────┘         └────────┬────────┘
//!                                   │ collect                     │ bytes
//!                                   ▼                             ▼
//!                            Vec<Record>                ┌───────────────────┐
//!                                                       │ ClientReassembler │
//!                                                       └───────────────────┘
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
#[allow(missing_docs)]
pub mod error;

/// Common types and type aliases
pub mod types;

/// Application configuration
pub mod config;

/// HTTP client with rate limiting
pub mod http;

/// Response body decoders
pub mod decode;

/// Offset/limit pagination and the page fetcher
pub mod pagination;

/// The fetch loop
pub mod engine;

/// Chunked response transport
pub mod stream;

/// Client-side reassembly of streamed responses
pub mod reassembly;

/// Fetch service with per-request overrides
pub mod service;

/// Command-line interface and HTTP server
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::AppConfig;
pub use engine::{FetchFailure, FetchOutcome, FetchReport, PageConsumer, PaginationDriver};
pub use error::{Error, Result};
pub use pagination::{FetchConfig, PageFetcher, PageSource};
pub use reassembly::{ClientReassembler, LoadState};
pub use service::{FetchOverrides, FetchService};
pub use stream::{StreamSession, StreamTransport};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
