//! Application configuration
//!
//! All settings live in one YAML document. Every field is optional and
//! falls back to the defaults below.
//!
//! ```yaml
//! upstream:
//!   base_url: https://hapi.fhir.org/baseR4
//!   resource: Patient
//!   recent_cutoff: 1950-12-31
//! fetch:
//!   page_size: 500
//!   limit_to_recent: true
//! server:
//!   port: 3000
//! ```

use crate::decode::DEFAULT_RECORDS_FIELD;
use crate::error::{Error, Result, ResultExt};
use crate::http::{default_user_agent, HttpClientConfig, RateLimiterConfig};
use crate::pagination::FetchConfig;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use url::Url;

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Upstream API settings
    pub upstream: UpstreamConfig,
    /// Default fetch parameters
    pub fetch: FetchConfig,
    /// HTTP server settings
    pub server: ServerSettings,
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&content)
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        self.upstream.endpoint()?;
        self.fetch.validate()?;
        if self.server.chunk_buffer == 0 {
            return Err(Error::invalid_value(
                "server.chunk_buffer",
                "must be a positive integer",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Upstream
// ============================================================================

/// Upstream paged REST API settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the API
    pub base_url: String,
    /// Resource path appended to the base URL
    pub resource: String,
    /// List field holding one page's records
    pub records_field: String,
    /// Query parameter carrying the recent-date filter
    pub date_filter_param: String,
    /// Only records strictly after this date pass the filter
    pub recent_cutoff: NaiveDate,
    /// Transport timeout in seconds
    pub timeout_secs: u64,
    /// User agent override
    pub user_agent: Option<String>,
    /// Optional request pacing
    pub rate_limit: Option<RateLimiterConfig>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://hapi.fhir.org/baseR4".to_string(),
            resource: "Patient".to_string(),
            records_field: DEFAULT_RECORDS_FIELD.to_string(),
            date_filter_param: "birthdate".to_string(),
            recent_cutoff: NaiveDate::from_ymd_opt(1950, 12, 31).unwrap_or_default(),
            timeout_secs: 30,
            user_agent: None,
            rate_limit: None,
        }
    }
}

impl UpstreamConfig {
    /// Full URL of the paged resource
    pub fn endpoint(&self) -> Result<Url> {
        let base = format!("{}/", self.base_url.trim_end_matches('/'));
        let url = Url::parse(&base)?.join(self.resource.trim_start_matches('/'))?;
        Ok(url)
    }

    /// HTTP client settings derived from this config
    pub fn http_config(&self) -> HttpClientConfig {
        let mut builder = HttpClientConfig::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .user_agent(
                self.user_agent
                    .clone()
                    .unwrap_or_else(default_user_agent),
            )
            .header("Accept", "application/json");
        if let Some(rate_limit) = &self.rate_limit {
            builder = builder.rate_limit(rate_limit.clone());
        }
        builder.build()
    }

    /// Value sent for the date filter parameter
    pub fn date_filter_value(&self) -> String {
        format!("gt{}", self.recent_cutoff.format("%Y-%m-%d"))
    }
}

// ============================================================================
// Server
// ============================================================================

/// HTTP server settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Interface to bind
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Chunks buffered per stream session before a write suspends
    pub chunk_buffer: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            chunk_buffer: 1,
        }
    }
}
