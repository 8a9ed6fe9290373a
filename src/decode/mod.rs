//! Response decoder module
//!
//! # Overview
//!
//! Decodes JSON at both ends of the pipeline:
//! - `EntryDecoder` pulls one page's records out of an upstream body
//! - `decode_concatenated` turns the bytes a client reassembled into records

mod decoders;
mod types;

pub use decoders::{decode_concatenated, EntryDecoder, DEFAULT_RECORDS_FIELD};
pub use types::RecordDecoder;
