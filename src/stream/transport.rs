//! Outbound chunk transport
//!
//! A session is the write half of a bounded channel; the read half is the
//! byte stream handed to the HTTP response. Each chunk is serialized in full
//! before it is sent, so a client never sees half a chunk.

use crate::engine::PageConsumer;
use crate::error::{Error, Result};
use crate::pagination::Page;
use crate::types::Record;
use async_trait::async_trait;
use bytes::Bytes;
use std::convert::Infallible;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, warn};

/// Byte stream carrying the chunks of one session
pub type ChunkStream = ReceiverStream<std::result::Result<Bytes, Infallible>>;

static NEXT_SESSION_ID: AtomicU64 = AtomicU64::new(1);

/// Opens stream sessions
#[derive(Debug, Clone)]
pub struct StreamTransport {
    buffer: usize,
}

impl Default for StreamTransport {
    fn default() -> Self {
        Self::new(1)
    }
}

impl StreamTransport {
    /// Create a transport buffering up to `buffer` chunks per session
    pub fn new(buffer: usize) -> Self {
        Self {
            buffer: buffer.max(1),
        }
    }

    /// Chunks buffered per session before a write suspends
    pub fn buffer(&self) -> usize {
        self.buffer
    }

    /// Open a session and the byte stream it feeds
    pub fn open(&self) -> (StreamSession, ChunkStream) {
        let (sender, receiver) = mpsc::channel(self.buffer);
        let id = NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed);
        debug!(session = id, "Stream session opened");
        let session = StreamSession {
            id,
            sender: Some(sender),
            chunks_written: 0,
            records_written: 0,
        };
        (session, ReceiverStream::new(receiver))
    }
}

/// Live outbound channel bound to one client request
///
/// Closed exactly once: by `close()` or, failing that, on drop.
#[derive(Debug)]
pub struct StreamSession {
    id: u64,
    sender: Option<mpsc::Sender<std::result::Result<Bytes, Infallible>>>,
    chunks_written: usize,
    records_written: usize,
}

impl StreamSession {
    /// Session identifier used in logs
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Chunks written so far
    pub fn chunks_written(&self) -> usize {
        self.chunks_written
    }

    /// Records written so far
    pub fn records_written(&self) -> usize {
        self.records_written
    }

    /// Serialize `records` as one JSON array and send it
    ///
    /// Suspends while the channel is full. Fails with
    /// `Error::TransportClosed` once the session is closed or the reading
    /// side has gone away; the session is closed in the latter case.
    pub async fn write_chunk(&mut self, records: &[Record]) -> Result<()> {
        let Some(sender) = self.sender.as_ref() else {
            return Err(Error::TransportClosed);
        };

        let payload = Bytes::from(serde_json::to_vec(records)?);
        let size = payload.len();

        if sender.send(Ok(payload)).await.is_err() {
            warn!(
                session = self.id,
                chunks = self.chunks_written,
                "Client disconnected, stopping stream"
            );
            self.close();
            return Err(Error::TransportClosed);
        }

        self.chunks_written += 1;
        self.records_written += records.len();
        debug!(
            session = self.id,
            chunk = self.chunks_written,
            records = records.len(),
            bytes = size,
            "Chunk written"
        );
        Ok(())
    }

    /// Close the session, ending the byte stream
    ///
    /// Returns `true` only for the call that actually closed it.
    pub fn close(&mut self) -> bool {
        match self.sender.take() {
            Some(_) => {
                debug!(
                    session = self.id,
                    chunks = self.chunks_written,
                    records = self.records_written,
                    "Stream session closed"
                );
                true
            }
            None => false,
        }
    }

    /// Whether the session is closed or its reader is gone
    pub fn is_closed(&self) -> bool {
        self.sender.as_ref().map_or(true, mpsc::Sender::is_closed)
    }
}

impl Drop for StreamSession {
    fn drop(&mut self) {
        self.close();
    }
}

#[async_trait]
impl PageConsumer for StreamSession {
    async fn consume(&mut self, page: Page) -> Result<()> {
        self.write_chunk(&page.records).await
    }

    fn is_closed(&self) -> bool {
        StreamSession::is_closed(self)
    }
}
