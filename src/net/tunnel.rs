//! CONNECT tunnel relay.
//!
//! One relay per CONNECT session. The relay opens a TCP connection to the
//! fixed upstream proxy (never to the CONNECT target), writes a minimal
//! `CONNECT <target> HTTP/<ver>\r\n\r\n` line, and splices bytes in both
//! directions with no inspection. The upstream's own reply to the CONNECT
//! travels back to the client through the splice.
//!
//! Teardown is symmetric: whichever side finishes first, both sockets are
//! shut down before the session ends. Tunnel establishment is never
//! retried.

use std::io;

use thiserror::Error;
use tokio::io::{copy, AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::config::UpstreamConfig;

/// Lifecycle of one tunnel session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TunnelState {
    Accepted,
    Connecting,
    Relaying,
    Failed,
    Closed,
}

/// Error type for tunnel establishment.
#[derive(Debug, Error)]
pub enum TunnelError {
    #[error("failed to connect to upstream: {0}")]
    Connect(#[source] io::Error),
    #[error("failed to write CONNECT handshake: {0}")]
    Handshake(#[source] io::Error),
}

/// Relays one CONNECT session through the upstream proxy.
pub struct TunnelRelay {
    upstream_addr: String,
    target: String,
    version_minor: u8,
    state: TunnelState,
}

impl TunnelRelay {
    /// Creates a relay for one accepted CONNECT request.
    ///
    /// `target` is the client's CONNECT request target (`host:port`);
    /// `version_minor` is the HTTP/1.x minor version from its request line.
    pub fn new(upstream: &UpstreamConfig, target: String, version_minor: u8) -> Self {
        Self {
            upstream_addr: upstream.addr(),
            target,
            version_minor,
            state: TunnelState::Accepted,
        }
    }

    /// Current session state, visible for the duration of `run`'s setup.
    pub fn state(&self) -> TunnelState {
        self.state
    }

    /// Drives the session to completion.
    ///
    /// Consumes the client stream; on return both sides have been shut
    /// down, whatever path the session took.
    pub async fn run<S>(mut self, client: S)
    where
        S: AsyncRead + AsyncWrite + Send + Unpin,
    {
        tracing::info!(target = %self.target, "CONNECT accepted");

        self.state = TunnelState::Connecting;
        let upstream = match self.connect_upstream().await {
            Ok(upstream) => upstream,
            Err(err) => {
                self.state = TunnelState::Failed;
                tracing::warn!(target = %self.target, error = %err, "CONNECT failed");
                self.close(client).await;
                return;
            }
        };

        self.state = TunnelState::Relaying;
        tracing::debug!(target = %self.target, upstream = %self.upstream_addr, "CONNECT relaying");
        self.splice(client, upstream).await;
    }

    async fn connect_upstream(&self) -> Result<TcpStream, TunnelError> {
        let mut upstream = TcpStream::connect(&self.upstream_addr)
            .await
            .map_err(TunnelError::Connect)?;

        // Intentionally minimal handshake: no headers, no body. The
        // upstream's response is spliced through to the client untouched.
        let line = format!(
            "CONNECT {} HTTP/1.{}\r\n\r\n",
            self.target, self.version_minor
        );
        upstream
            .write_all(line.as_bytes())
            .await
            .map_err(TunnelError::Handshake)?;

        Ok(upstream)
    }

    async fn splice<S>(mut self, client: S, upstream: TcpStream)
    where
        S: AsyncRead + AsyncWrite + Send + Unpin,
    {
        let (mut client_read, mut client_write) = tokio::io::split(client);
        let (mut upstream_read, mut upstream_write) = upstream.into_split();

        // Either direction ending (EOF or error) ends the session; the
        // other direction's copy is dropped and both sides are closed.
        tokio::select! {
            res = copy(&mut client_read, &mut upstream_write) => {
                tracing::debug!(target = %self.target, result = ?res, "client-to-upstream finished");
            }
            res = copy(&mut upstream_read, &mut client_write) => {
                tracing::debug!(target = %self.target, result = ?res, "upstream-to-client finished");
            }
        }

        upstream_write.shutdown().await.ok();
        self.state = TunnelState::Closed;
        client_write.shutdown().await.ok();
        tracing::debug!(target = %self.target, "CONNECT closed");
    }

    /// Teardown path for sessions that never reached the splice.
    async fn close<S>(&mut self, mut client: S)
    where
        S: AsyncWrite + Send + Unpin,
    {
        client.shutdown().await.ok();
        self.state = TunnelState::Closed;
        tracing::debug!(target = %self.target, "CONNECT closed");
    }
}
