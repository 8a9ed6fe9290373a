//! Stream transport module
//!
//! Writes pages to a long-lived HTTP response as discrete JSON-array chunks.
//! The concatenated chunks carry no delimiter; readers buffer until the
//! stream ends.

mod transport;

pub use transport::{ChunkStream, StreamSession, StreamTransport};

#[cfg(test)]
mod tests;
