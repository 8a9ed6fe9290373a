//! HTTP client module
//!
//! Provides the upstream HTTP client used by the page fetcher.
//!
//! # Features
//!
//! - **Single-shot requests**: one request per call, failures surface immediately
//! - **Rate Limiting**: Token bucket rate limiter using governor

mod client;
mod rate_limit;

pub use client::{default_user_agent, HttpClient, HttpClientConfig, RequestConfig};
pub use rate_limit::{RateLimiter, RateLimiterConfig};
