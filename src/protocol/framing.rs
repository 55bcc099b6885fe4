//! Reading logical units off a client stream
//!
//! The wire carries raw bytes with no framing: one receive call is taken to be
//! one message. Under real network conditions messages can be split across
//! receives or merged into one, and that behaviour is kept as is. The
//! lifecycle handler only talks to [`FrameReader`], so a framed protocol can be
//! dropped in without touching it.

use std::future::Future;
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt};

/// One logical unit read from a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// A non-empty payload, at most the requested length.
    Data(Vec<u8>),
    /// The peer closed its side of the connection.
    Closed,
}

/// Source of logical units for a single connection.
pub trait FrameReader: Send {
    /// Reads the next unit, never returning more than `max_len` bytes.
    fn read_frame(&mut self, max_len: usize) -> impl Future<Output = io::Result<Frame>> + Send;
}

/// Treats each successful receive as one message.
pub struct RawChunkReader<R> {
    inner: R,
    buf: Vec<u8>,
}

impl<R> RawChunkReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: Vec::new(),
        }
    }
}

impl<R: AsyncRead + Unpin + Send> FrameReader for RawChunkReader<R> {
    async fn read_frame(&mut self, max_len: usize) -> io::Result<Frame> {
        if self.buf.len() < max_len {
            self.buf.resize(max_len, 0);
        }

        let n = self.inner.read(&mut self.buf[..max_len]).await?;
        if n == 0 {
            return Ok(Frame::Closed);
        }
        Ok(Frame::Data(self.buf[..n].to_vec()))
    }
}
