//! Error types for fhir-stream
//!
//! This module defines the error hierarchy for the whole pipeline.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for fhir-stream
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Upstream Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Upstream error {status}: {detail}")]
    Upstream { status: u16, detail: String },

    // ============================================================================
    // Data Processing Errors
    // ============================================================================
    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    // ============================================================================
    // Transport Errors
    // ============================================================================
    #[error("Client disconnected, stream transport closed")]
    TransportClosed,

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

/// Status used when the upstream could not be reached or answered garbage
pub const BAD_GATEWAY: u16 = 502;

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an upstream error
    pub fn upstream(status: u16, detail: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            detail: detail.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// HTTP status reported for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Upstream { status, .. } => *status,
            Error::Http(e) => e.status().map_or(BAD_GATEWAY, |s| s.as_u16()),
            Error::Decode { .. } => BAD_GATEWAY,
            Error::Config { .. }
            | Error::InvalidConfigValue { .. }
            | Error::YamlParse(_)
            | Error::InvalidUrl(_) => 400,
            Error::TransportClosed => 499,
            Error::JsonParse(_) | Error::Io(_) | Error::Other(_) => 500,
        }
    }

    /// Stable machine-readable error code
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Upstream { .. } | Error::Http(_) => "upstream_error",
            Error::Decode { .. } => "decode_error",
            Error::Config { .. }
            | Error::InvalidConfigValue { .. }
            | Error::YamlParse(_)
            | Error::InvalidUrl(_) => "invalid_config",
            Error::TransportClosed => "transport_closed",
            Error::JsonParse(_) | Error::Io(_) | Error::Other(_) => "internal_error",
        }
    }

    /// Whether this error only means the downstream client went away
    pub fn is_transport_closed(&self) -> bool {
        matches!(self, Error::TransportClosed)
    }
}

/// Result type alias for fhir-stream
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
