//! Engine types
//!
//! Outcome and report types for one fetch operation.

use crate::error::Error;
use crate::pagination::StopReason;
use crate::types::Record;
use serde::Serialize;

/// Summary of a fetch loop that ended without failing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchReport {
    /// Pages received from upstream
    pub pages_fetched: u32,
    /// Records handed to the consumer or accumulator
    pub records_delivered: u64,
    /// Why the loop stopped
    pub stop: StopReason,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

/// Structured error payload of a failed fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FetchFailure {
    /// Stable error code (e.g. `upstream_error`)
    pub error: String,
    /// Short human-readable message
    pub message: String,
    /// Upstream status code, or the status chosen for a local failure
    pub code: u16,
    /// Diagnostic detail
    pub details: String,
}

impl FetchFailure {
    /// Build the payload for an error
    pub fn from_error(error: &Error) -> Self {
        let code = error.status_code();
        Self {
            error: error.error_code().to_string(),
            message: format!("Error status {code}"),
            code,
            details: error.to_string(),
        }
    }
}

impl From<Error> for FetchFailure {
    fn from(error: Error) -> Self {
        Self::from_error(&error)
    }
}

/// Terminal value of one fetch operation
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// Collect mode: every record across all pages, in order
    Collected {
        /// Accumulated records
        records: Vec<Record>,
        /// Loop summary
        report: FetchReport,
    },
    /// Streaming mode: pages went to the consumer as they arrived
    Streamed(FetchReport),
    /// The fetch aborted
    Failed(FetchFailure),
}

impl FetchOutcome {
    /// Check if the fetch succeeded
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }

    /// Loop summary, if the fetch succeeded
    pub fn report(&self) -> Option<&FetchReport> {
        match self {
            Self::Collected { report, .. } | Self::Streamed(report) => Some(report),
            Self::Failed(_) => None,
        }
    }

    /// Failure payload, if the fetch failed
    pub fn failure(&self) -> Option<&FetchFailure> {
        match self {
            Self::Failed(failure) => Some(failure),
            _ => None,
        }
    }

    /// Collected records, if this was a successful collect-mode fetch
    pub fn records(&self) -> Option<&[Record]> {
        match self {
            Self::Collected { records, .. } => Some(records),
            _ => None,
        }
    }

    /// Take the collected records, or the failure payload
    ///
    /// A streaming outcome yields an empty list: its records already left
    /// through the consumer.
    pub fn into_result(self) -> std::result::Result<Vec<Record>, FetchFailure> {
        match self {
            Self::Collected { records, .. } => Ok(records),
            Self::Streamed(_) => Ok(Vec::new()),
            Self::Failed(failure) => Err(failure),
        }
    }
}
