//! Pagination types
//!
//! Offset/limit paging: a fetch walks the upstream in fixed-size pages
//! starting at offset zero.

use crate::error::{Error, Result};
use crate::types::Record;
use serde::{Deserialize, Serialize};

/// Default number of records requested per page
pub const DEFAULT_PAGE_SIZE: u32 = 500;

/// Immutable configuration for one fetch operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Records requested per upstream page
    pub page_size: u32,
    /// Add the fixed recent-date filter to every request
    pub limit_to_recent: bool,
    /// Hard cap on pages received (None = unbounded)
    pub max_pages: Option<u32>,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            limit_to_recent: true,
            max_pages: None,
        }
    }
}

impl FetchConfig {
    /// Create a new fetch config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set page size
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Enable or disable the recent-date filter
    #[must_use]
    pub fn with_limit_to_recent(mut self, limit_to_recent: bool) -> Self {
        self.limit_to_recent = limit_to_recent;
        self
    }

    /// Cap the number of pages
    #[must_use]
    pub fn with_max_pages(mut self, max_pages: Option<u32>) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Reject zero page sizes and zero page caps
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::invalid_value("page_size", "must be a positive integer"));
        }
        if self.max_pages == Some(0) {
            return Err(Error::invalid_value("max_pages", "must be a positive integer"));
        }
        Ok(())
    }

    /// Whether `pages_received` pages already reach the cap
    pub fn cap_reached(&self, pages_received: u32) -> bool {
        self.max_pages.is_some_and(|max| pages_received >= max)
    }
}

/// Parameters of one upstream page request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Number of records to skip
    pub offset: u64,
    /// Number of records requested
    pub limit: u32,
    /// Add the recent-date filter
    pub limit_to_recent: bool,
}

impl PageRequest {
    /// Create a page request
    pub fn new(offset: u64, limit: u32, limit_to_recent: bool) -> Self {
        Self {
            offset,
            limit,
            limit_to_recent,
        }
    }
}

/// One batch of records returned by a single upstream request
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    /// Offset that produced this page
    pub offset: u64,
    /// Limit that produced this page
    pub limit: u32,
    /// Records in upstream order
    pub records: Vec<Record>,
}

impl Page {
    /// Create a page
    pub fn new(offset: u64, limit: u32, records: Vec<Record>) -> Self {
        Self {
            offset,
            limit,
            records,
        }
    }

    /// Number of records in the page
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the page holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// A page shorter than its limit is the last one upstream has
    pub fn is_short(&self) -> bool {
        self.records.len() < self.limit as usize
    }
}

/// Why a fetch loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Upstream answered without a record list
    EndOfData,
    /// Last page was shorter than the page size
    ShortPage,
    /// `max_pages` reached
    PageCap,
    /// Downstream client went away
    Disconnected,
}

/// Tracks progress through the upstream during one fetch
#[derive(Debug, Clone, Default)]
pub struct PaginationState {
    /// Offset of the next request
    pub offset: u64,
    /// Pages received so far
    pub pages_received: u32,
    /// Records delivered so far
    pub records_delivered: u64,
}

impl PaginationState {
    /// Create a new pagination state
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the request for the current position
    pub fn request(&self, config: &FetchConfig) -> PageRequest {
        PageRequest::new(self.offset, config.page_size, config.limit_to_recent)
    }

    /// Count a received page
    pub fn receive_page(&mut self) {
        self.pages_received += 1;
    }

    /// Count delivered records
    pub fn add_delivered(&mut self, count: usize) {
        self.records_delivered += count as u64;
    }

    /// Move past a full page
    pub fn advance(&mut self, page_size: u32) {
        self.offset += u64::from(page_size);
    }
}
