//! Execution engine module
//!
//! The fetch loop.
//!
//! # Overview
//!
//! The engine module provides:
//! - `PaginationDriver` - walks the upstream page by page
//! - `PageConsumer` - receives pages in streaming mode
//! - `FetchOutcome` - the terminal value of one fetch
//!
//! Pages are fetched strictly one after another: the next request is only
//! issued once the previous page has been delivered. In collect mode pages
//! are appended to an accumulator; in streaming mode each page goes to the
//! consumer as soon as it arrives and is never retracted, even when a later
//! page fails.

mod types;

pub use types::{FetchFailure, FetchOutcome, FetchReport};

use crate::error::{Error, Result};
use crate::pagination::{FetchConfig, Page, PageSource, PaginationState, StopReason};
use crate::types::Record;
use async_trait::async_trait;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Receives each page's records in streaming mode
#[async_trait]
pub trait PageConsumer: Send {
    /// Deliver one page. Returning `Error::TransportClosed` ends the fetch
    /// quietly; any other error fails it.
    async fn consume(&mut self, page: Page) -> Result<()>;

    /// Whether the downstream side is already gone
    fn is_closed(&self) -> bool {
        false
    }
}

/// Drives the offset/limit fetch loop over a page source
pub struct PaginationDriver<S> {
    source: S,
}

impl<S: PageSource> PaginationDriver<S> {
    /// Create a driver over a page source
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Get the page source
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch every page and return the records together
    pub async fn collect(&self, config: &FetchConfig) -> FetchOutcome {
        self.run(config, None).await
    }

    /// Fetch every page, handing each to `consumer` as it arrives
    pub async fn stream(
        &self,
        config: &FetchConfig,
        consumer: &mut dyn PageConsumer,
    ) -> FetchOutcome {
        self.run(config, Some(consumer)).await
    }

    /// Run one fetch operation
    ///
    /// With a sink this is streaming mode, otherwise collect mode.
    pub async fn run(
        &self,
        config: &FetchConfig,
        sink: Option<&mut dyn PageConsumer>,
    ) -> FetchOutcome {
        let start = Instant::now();
        let streaming = sink.is_some();
        let mut accumulator = Vec::new();

        match self.drive(config, sink, &mut accumulator).await {
            Ok(mut report) => {
                report.duration_ms = start.elapsed().as_millis() as u64;
                info!(
                    pages = report.pages_fetched,
                    records = report.records_delivered,
                    stop = ?report.stop,
                    duration_ms = report.duration_ms,
                    "Fetch completed"
                );
                if streaming {
                    FetchOutcome::Streamed(report)
                } else {
                    FetchOutcome::Collected {
                        records: accumulator,
                        report,
                    }
                }
            }
            Err(e) => {
                error!("Fetch failed: {e}");
                FetchOutcome::Failed(FetchFailure::from_error(&e))
            }
        }
    }

    async fn drive(
        &self,
        config: &FetchConfig,
        mut sink: Option<&mut dyn PageConsumer>,
        accumulator: &mut Vec<Record>,
    ) -> Result<FetchReport> {
        config.validate()?;

        let mut state = PaginationState::new();

        let stop = loop {
            if sink.as_ref().is_some_and(|consumer| consumer.is_closed()) {
                warn!("Consumer closed, not fetching offset {}", state.offset);
                break StopReason::Disconnected;
            }

            let request = state.request(config);
            let Some(page) = self.source.fetch_page(&request).await? else {
                debug!("No record list at offset {}, end of data", request.offset);
                break StopReason::EndOfData;
            };

            state.receive_page();
            let received = page.len();
            let short = page.is_short();
            info!(
                page = state.pages_received,
                offset = page.offset,
                records = received,
                "Page received"
            );

            match sink.as_mut() {
                Some(consumer) => match consumer.consume(page).await {
                    Ok(()) => {}
                    Err(Error::TransportClosed) => {
                        warn!(
                            "Consumer disconnected before page {} was delivered",
                            state.pages_received
                        );
                        break StopReason::Disconnected;
                    }
                    Err(e) => return Err(e),
                },
                None => accumulator.extend(page.records),
            }
            state.add_delivered(received);

            if short {
                break StopReason::ShortPage;
            }
            if config.cap_reached(state.pages_received) {
                break StopReason::PageCap;
            }

            state.advance(config.page_size);
        };

        Ok(FetchReport {
            pages_fetched: state.pages_received,
            records_delivered: state.records_delivered,
            stop,
            duration_ms: 0,
        })
    }
}

impl<S: std::fmt::Debug> std::fmt::Debug for PaginationDriver<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaginationDriver")
            .field("source", &self.source)
            .finish()
    }
}
