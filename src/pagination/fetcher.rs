//! Page fetcher
//!
//! Issues exactly one upstream GET per page and decodes its record list.

use super::types::{Page, PageRequest};
use crate::config::UpstreamConfig;
use crate::decode::{EntryDecoder, RecordDecoder};
use crate::error::Result;
use crate::http::{HttpClient, RequestConfig};
use async_trait::async_trait;
use tracing::debug;

/// Source of upstream pages
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch one page. `Ok(None)` means upstream has no more data.
    async fn fetch_page(&self, request: &PageRequest) -> Result<Option<Page>>;
}

/// Fetches pages from an offset/limit paged REST endpoint
pub struct PageFetcher {
    client: HttpClient,
    endpoint: String,
    date_filter_param: String,
    date_filter_value: String,
    decoder: Box<dyn RecordDecoder>,
}

impl PageFetcher {
    /// Build a fetcher, and the HTTP client it owns, from upstream settings
    pub fn from_config(config: &UpstreamConfig) -> Result<Self> {
        let client = HttpClient::with_config(config.http_config())?;
        Ok(Self {
            client,
            endpoint: config.endpoint()?.to_string(),
            date_filter_param: config.date_filter_param.clone(),
            date_filter_value: config.date_filter_value(),
            decoder: Box::new(EntryDecoder::new(&config.records_field)),
        })
    }

    /// Replace the page body decoder
    #[must_use]
    pub fn with_decoder(mut self, decoder: Box<dyn RecordDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    /// Endpoint every page request goes to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Query parameters for one page request
    pub fn build_request(&self, request: &PageRequest) -> RequestConfig {
        let config = RequestConfig::new()
            .query("_count", request.limit)
            .query("_offset", request.offset)
            .query("_format", "json");

        if request.limit_to_recent {
            config.query(&self.date_filter_param, &self.date_filter_value)
        } else {
            config
        }
    }
}

#[async_trait]
impl PageSource for PageFetcher {
    async fn fetch_page(&self, request: &PageRequest) -> Result<Option<Page>> {
        let body = self
            .client
            .get_text(&self.endpoint, self.build_request(request))
            .await?;

        let records = self.decoder.decode(&body)?;
        debug!(
            offset = request.offset,
            limit = request.limit,
            records = records.as_ref().map(Vec::len),
            "Decoded upstream page"
        );

        Ok(records.map(|records| Page::new(request.offset, request.limit, records)))
    }
}

impl std::fmt::Debug for PageFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageFetcher")
            .field("client", &self.client)
            .field("endpoint", &self.endpoint)
            .field("date_filter_param", &self.date_filter_param)
            .field("date_filter_value", &self.date_filter_value)
            .finish_non_exhaustive()
    }
}
