//! Fetch service
//!
//! Binds a pagination driver to the configured defaults and resolves
//! per-request overrides. Server handlers and the CLI both go through here.

use crate::config::AppConfig;
use crate::engine::{FetchOutcome, PageConsumer, PaginationDriver};
use crate::error::Result;
use crate::pagination::{FetchConfig, PageFetcher, PageSource};
use serde::Deserialize;
use tracing::debug;

/// Optional per-request changes to the default fetch config
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FetchOverrides {
    /// Records per page
    pub page_size: Option<u32>,
    /// Recent-date filter on or off
    pub limit_to_recent: Option<bool>,
    /// Page cap
    pub max_pages: Option<u32>,
}

impl FetchOverrides {
    /// Apply these overrides on top of `defaults`
    pub fn apply(&self, defaults: &FetchConfig) -> FetchConfig {
        FetchConfig {
            page_size: self.page_size.unwrap_or(defaults.page_size),
            limit_to_recent: self.limit_to_recent.unwrap_or(defaults.limit_to_recent),
            max_pages: self.max_pages.or(defaults.max_pages),
        }
    }
}

/// Runs fetch operations with a fixed set of defaults
pub struct FetchService<S = PageFetcher> {
    driver: PaginationDriver<S>,
    defaults: FetchConfig,
}

impl FetchService<PageFetcher> {
    /// Build a service against the configured upstream
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let fetcher = PageFetcher::from_config(&config.upstream)?;
        Ok(Self::new(fetcher, config.fetch.clone()))
    }
}

impl<S: PageSource> FetchService<S> {
    /// Create a service over any page source
    pub fn new(source: S, defaults: FetchConfig) -> Self {
        Self {
            driver: PaginationDriver::new(source),
            defaults,
        }
    }

    /// Default fetch config
    pub fn defaults(&self) -> &FetchConfig {
        &self.defaults
    }

    /// Underlying driver
    pub fn driver(&self) -> &PaginationDriver<S> {
        &self.driver
    }

    /// Merge overrides into the defaults
    pub fn resolve(&self, overrides: &FetchOverrides) -> FetchConfig {
        let config = overrides.apply(&self.defaults);
        debug!(?config, "Resolved fetch config");
        config
    }

    /// Collect every page
    pub async fn fetch_all(&self, overrides: &FetchOverrides) -> FetchOutcome {
        self.driver.collect(&self.resolve(overrides)).await
    }

    /// Collect only the first page
    pub async fn fetch_one_page(&self, overrides: &FetchOverrides) -> FetchOutcome {
        let config = self.resolve(overrides).with_max_pages(Some(1));
        self.driver.collect(&config).await
    }

    /// Stream every page to `consumer`
    pub async fn fetch_streaming(
        &self,
        overrides: &FetchOverrides,
        consumer: &mut dyn PageConsumer,
    ) -> FetchOutcome {
        self.driver
            .stream(&self.resolve(overrides), consumer)
            .await
    }
}

impl<S: std::fmt::Debug> std::fmt::Debug for FetchService<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchService")
            .field("driver", &self.driver)
            .field("defaults", &self.defaults)
            .finish()
    }
}
