//! Pagination module
//!
//! # Overview
//!
//! Offset/limit pagination against one upstream endpoint. `PageFetcher`
//! turns a `PageRequest` into exactly one HTTP GET and decodes the page;
//! the engine's driver decides which request comes next.

mod fetcher;
mod types;

pub use fetcher::{PageFetcher, PageSource};
pub use types::{
    FetchConfig, Page, PageRequest, PaginationState, StopReason, DEFAULT_PAGE_SIZE,
};
