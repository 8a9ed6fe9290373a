//! Client-side reassembly of a streamed response
//!
//! Bytes are buffered as they arrive and parsed once, after the stream
//! ends. Parse failures are logged and leave an empty result; the load
//! state always reaches `Complete`.

use crate::decode::decode_concatenated;
use crate::error::Result;
use crate::types::Record;
use futures::{Stream, StreamExt};
use serde::Serialize;
use std::fmt::Display;
use std::pin::pin;
use tracing::{debug, info, warn};

/// Consuming-side load state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum LoadState {
    /// Nothing requested yet
    #[default]
    Initial,
    /// A stream is being read
    Loading,
    /// The stream ended (successfully or not)
    Complete,
}

/// Progress of the read in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReassemblyProgress {
    /// Network reads so far
    pub reads: usize,
    /// Bytes buffered so far
    pub bytes: usize,
}

/// Growing byte buffer scoped to one stream session
///
/// Consumed by `into_records`, so it cannot be reused across sessions.
#[derive(Debug, Default)]
pub struct ReassemblyBuffer {
    bytes: Vec<u8>,
    reads: usize,
}

impl ReassemblyBuffer {
    /// Create an empty buffer
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one read's bytes
    pub fn push(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
        self.reads += 1;
    }

    /// Bytes buffered so far
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether nothing has been buffered
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Current progress
    pub fn progress(&self) -> ReassemblyProgress {
        ReassemblyProgress {
            reads: self.reads,
            bytes: self.bytes.len(),
        }
    }

    /// Parse the whole payload
    pub fn into_records(self) -> Result<Vec<Record>> {
        decode_concatenated(&self.bytes)
    }
}

/// Reads a streamed record payload and tracks the load state
#[derive(Debug, Default)]
pub struct ClientReassembler {
    state: LoadState,
    results: Vec<Record>,
    progress: ReassemblyProgress,
    last_error: Option<String>,
}

impl ClientReassembler {
    /// Create a reassembler in the `Initial` state
    pub fn new() -> Self {
        Self::default()
    }

    /// Current load state
    pub fn state(&self) -> LoadState {
        self.state
    }

    /// Records gathered so far
    pub fn results(&self) -> &[Record] {
        &self.results
    }

    /// Progress of the most recent read
    pub fn progress(&self) -> ReassemblyProgress {
        self.progress
    }

    /// Why the most recent load produced no records, if it failed
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// The finished record list, available once `Complete`
    pub fn finished(&self) -> Option<&[Record]> {
        (self.state == LoadState::Complete).then_some(self.results.as_slice())
    }

    /// Take the finished record list, available once `Complete`
    pub fn into_finished(self) -> Option<Vec<Record>> {
        (self.state == LoadState::Complete).then_some(self.results)
    }

    /// Begin a fresh load, clearing prior results
    ///
    /// Returns `false` if a load is already in progress.
    pub fn start(&mut self) -> bool {
        if self.state == LoadState::Loading {
            warn!("Load already in progress, ignoring start");
            return false;
        }
        self.state = LoadState::Loading;
        self.results.clear();
        self.progress = ReassemblyProgress::default();
        self.last_error = None;
        true
    }

    /// Read `stream` to its end and parse the payload
    pub async fn read_stream<S, B, E>(&mut self, stream: S) -> &[Record]
    where
        S: Stream<Item = std::result::Result<B, E>>,
        B: AsRef<[u8]>,
        E: Display,
    {
        self.read_stream_with_progress(stream, |_| {}).await
    }

    /// Read `stream` to its end, reporting progress after every read
    ///
    /// A read error ends the stream early; whatever arrived before it is
    /// still parsed.
    pub async fn read_stream_with_progress<S, B, E, F>(
        &mut self,
        stream: S,
        mut on_progress: F,
    ) -> &[Record]
    where
        S: Stream<Item = std::result::Result<B, E>>,
        B: AsRef<[u8]>,
        E: Display,
        F: FnMut(ReassemblyProgress),
    {
        if self.state != LoadState::Loading {
            self.start();
        }

        let mut buffer = ReassemblyBuffer::new();
        let mut stream = pin!(stream);

        while let Some(item) = stream.next().await {
            match item {
                Ok(bytes) => {
                    buffer.push(bytes.as_ref());
                    self.progress = buffer.progress();
                    debug!(
                        reads = self.progress.reads,
                        bytes = self.progress.bytes,
                        "Received a chunk"
                    );
                    on_progress(self.progress);
                }
                Err(e) => {
                    warn!("Stream ended early: {e}");
                    break;
                }
            }
        }

        debug!("Stream complete");
        self.finish(buffer);
        &self.results
    }

    /// Fetch `url` and reassemble its body
    pub async fn fetch(&mut self, client: &reqwest::Client, url: &str) -> &[Record] {
        if self.state != LoadState::Loading {
            self.start();
        }

        match client.get(url).send().await {
            Ok(response) => {
                if !response.status().is_success() {
                    warn!("Server answered {} for {url}", response.status());
                }
                self.read_stream(response.bytes_stream()).await
            }
            Err(e) => {
                warn!("Request to {url} failed: {e}");
                self.fail(e.to_string());
                &self.results
            }
        }
    }

    fn finish(&mut self, buffer: ReassemblyBuffer) {
        match buffer.into_records() {
            Ok(records) => {
                self.results.extend(records);
                self.state = LoadState::Complete;
                info!(records = self.results.len(), "Load complete");
            }
            Err(e) => {
                warn!("Invalid JSON received as response: {e}");
                self.fail(e.to_string());
            }
        }
    }

    fn fail(&mut self, reason: String) {
        self.results.clear();
        self.last_error = Some(reason);
        self.state = LoadState::Complete;
    }
}
