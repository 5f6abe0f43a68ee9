//! A prebuffering wrapper for sniffing the start of a stream.
//!
//! [`PeekStream`] accumulates bytes from the underlying socket so the
//! dispatcher can inspect the request head before deciding how to handle
//! the connection. Reads drain the buffer first and then fall through to
//! the inner stream; writes pass straight through.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::BytesMut;
use tokio::io::{self, AsyncRead, AsyncReadExt, AsyncWrite, ReadBuf};

const INITIAL_CAPACITY: usize = 4 * 1024;

/// A stream wrapper with an inspectable read-ahead buffer.
pub struct PeekStream<S> {
    inner: S,
    buf: BytesMut,
    max_len: usize,
}

impl<S> PeekStream<S> {
    /// Wraps `inner`, allowing up to `max_len` bytes of read-ahead.
    pub fn new(inner: S, max_len: usize) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_CAPACITY),
            max_len,
        }
    }

    /// Returns the unconsumed buffered bytes.
    pub fn buffered(&self) -> &[u8] {
        &self.buf[..]
    }

    /// Whether the read-ahead buffer has hit its limit.
    pub fn is_full(&self) -> bool {
        self.buf.len() == self.max_len
    }

    /// Discards `n` bytes from the front of the buffer.
    pub fn discard(&mut self, n: usize) {
        let _ = self.buf.split_to(n);
    }
}

impl<S: AsyncRead + Unpin> PeekStream<S> {
    /// Reads more data from the inner stream into the buffer.
    ///
    /// Returns the number of bytes added; zero on EOF or a full buffer.
    pub async fn fill(&mut self) -> io::Result<usize> {
        let max = self.max_len.saturating_sub(self.buf.len());
        let n = (&mut self.inner)
            .take(max as u64)
            .read_buf(&mut self.buf)
            .await?;
        Ok(n)
    }
}

impl<S: AsyncRead + Unpin> AsyncRead for PeekStream<S> {
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        out: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        if out.remaining() == 0 {
            Poll::Ready(Ok(()))
        } else if !self.buf.is_empty() {
            let n = self.buf.len().min(out.remaining());
            let chunk = self.buf.split_to(n);
            out.put_slice(&chunk);
            Poll::Ready(Ok(()))
        } else {
            Pin::new(&mut self.inner).poll_read(cx, out)
        }
    }
}

impl<S: AsyncWrite + Unpin> AsyncWrite for PeekStream<S> {
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        data: &[u8],
    ) -> Poll<io::Result<usize>> {
        Pin::new(&mut self.inner).poll_write(cx, data)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_flush(cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.inner).poll_shutdown(cx)
    }
}
