//! Destinations for encoded export chunks.

use std::io;

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;
use tokio::sync::mpsc;

/// The receiving side of a sink went away (client disconnected).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("export sink closed")]
pub struct SinkClosed;

/// Receives encoded output in order, one chunk at a time.
#[async_trait]
pub trait ChunkSink: Send {
    /// Delivers one chunk. An error means nobody is reading any more.
    async fn send_chunk(&mut self, chunk: Bytes) -> Result<(), SinkClosed>;

    /// Signals that the output is incomplete. The default does nothing.
    async fn abort(&mut self, _reason: String) {}
}

/// Sink feeding an HTTP response body through a bounded channel.
///
/// An aborted sink pushes an `io::Error` into the body stream, which makes
/// the server cut the response instead of ending it cleanly.
pub struct ChannelSink {
    tx: mpsc::Sender<Result<Bytes, io::Error>>,
}

impl ChannelSink {
    /// Wraps the sending half of a body channel.
    pub fn new(tx: mpsc::Sender<Result<Bytes, io::Error>>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl ChunkSink for ChannelSink {
    async fn send_chunk(&mut self, chunk: Bytes) -> Result<(), SinkClosed> {
        self.tx.send(Ok(chunk)).await.map_err(|_| SinkClosed)
    }

    async fn abort(&mut self, reason: String) {
        // Receiver may already be gone; nothing left to tell it then
        let _ = self.tx.send(Err(io::Error::other(reason))).await;
    }
}

#[async_trait]
impl ChunkSink for Vec<u8> {
    async fn send_chunk(&mut self, chunk: Bytes) -> Result<(), SinkClosed> {
        self.extend_from_slice(&chunk);
        Ok(())
    }
}
