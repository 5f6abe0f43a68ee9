//! Request-head sniffing.
//!
//! The dispatcher only needs the request line to route a connection:
//! `CONNECT` goes to the tunnel relay with the raw socket, everything else
//! is served by hyper. The head is parsed off a [`PeekStream`] without
//! consuming it, so hyper sees the bytes again.

use std::io;

use tokio::io::AsyncRead;

use crate::net::peek::PeekStream;

/// How much data to read for the head before the request is invalid.
pub const MAX_HEAD_LENGTH: usize = 8192;

const MAX_HEADERS: usize = 64;

/// Method, target, and version from an HTTP/1.x request line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHead {
    pub method: String,
    pub target: String,
    pub version_minor: u8,
}

impl RequestHead {
    pub fn is_connect(&self) -> bool {
        self.method == "CONNECT"
    }

    /// Parses a head from a buffer; `None` when more bytes are needed.
    ///
    /// Returns the head-section length (through the final CRLF CRLF) and
    /// the parsed head.
    pub fn parse(buf: &[u8]) -> io::Result<Option<(usize, Self)>> {
        let mut headers = [httparse::EMPTY_HEADER; MAX_HEADERS];
        let mut request = httparse::Request::new(&mut headers);
        match request.parse(buf) {
            Ok(httparse::Status::Complete(head_len)) => {
                let method = request
                    .method
                    .ok_or_else(|| invalid("missing HTTP method"))?;
                let target = request
                    .path
                    .ok_or_else(|| invalid("missing request target"))?;
                Ok(Some((
                    head_len,
                    Self {
                        method: method.to_string(),
                        target: target.to_string(),
                        version_minor: request.version.unwrap_or(1),
                    },
                )))
            }
            Ok(httparse::Status::Partial) => Ok(None),
            Err(err) => Err(io::Error::new(io::ErrorKind::InvalidData, err)),
        }
    }

    /// Reads from the stream until the head section is complete, without
    /// consuming it. Returns the head-section length and the parsed head.
    pub async fn peek<S: AsyncRead + Unpin>(
        stream: &mut PeekStream<S>,
    ) -> io::Result<(usize, Self)> {
        loop {
            if let Some(found) = Self::parse(stream.buffered())? {
                return Ok(found);
            }
            if stream.is_full() {
                return Err(invalid("request head exceeds buffer limit"));
            }
            if stream.fill().await? == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "connection closed before request head",
                ));
            }
        }
    }
}

fn invalid(message: &'static str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message)
}
