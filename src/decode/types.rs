//! Decoder types and traits

use crate::error::Result;
use crate::types::Record;

/// Trait for decoding one upstream page body into records
pub trait RecordDecoder: Send + Sync {
    /// Decode the response body into this page's records
    ///
    /// `Ok(None)` means the body carries no record list at all, which the
    /// pagination driver treats as "no more data".
    fn decode(&self, body: &str) -> Result<Option<Vec<Record>>>;
}
