//! Proxy frontend: accept loop and per-connection dispatch.
//!
//! Each accepted connection has its request head sniffed off the socket.
//! CONNECT sessions take the raw stream into the tunnel relay; anything
//! else is served as HTTP/1.x by hyper, with the forwarder as the
//! service. Per-connection failures are logged and end only that session.

use std::convert::Infallible;
use std::io;
use std::sync::Arc;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;

use crate::config::ProxyConfig;
use crate::http::forward::{Forwarder, ForwarderError};
use crate::http::parse::{RequestHead, MAX_HEAD_LENGTH};
use crate::net::listener::{Listener, ListenerError};
use crate::net::peek::PeekStream;
use crate::net::tunnel::TunnelRelay;

/// The forwarding proxy server.
pub struct ProxyServer {
    config: Arc<ProxyConfig>,
    forwarder: Arc<Forwarder>,
}

impl ProxyServer {
    /// Create a server (and its shared upstream client) from config.
    pub fn new(config: ProxyConfig) -> Result<Self, ForwarderError> {
        let forwarder = Arc::new(Forwarder::new(&config)?);
        Ok(Self {
            config: Arc::new(config),
            forwarder,
        })
    }

    /// Run the accept loop on the given listener.
    pub async fn run(self, listener: Listener) -> Result<(), ListenerError> {
        loop {
            let (stream, peer, permit) = listener.accept().await?;
            let config = Arc::clone(&self.config);
            let forwarder = Arc::clone(&self.forwarder);

            tokio::spawn(async move {
                let _permit = permit;
                if let Err(err) = handle_connection(stream, config, forwarder).await {
                    tracing::debug!(peer = %peer, error = %err, "connection ended with error");
                }
            });
        }
    }
}

async fn handle_connection(
    stream: TcpStream,
    config: Arc<ProxyConfig>,
    forwarder: Arc<Forwarder>,
) -> io::Result<()> {
    let mut stream = PeekStream::new(stream, MAX_HEAD_LENGTH);
    let (head_len, head) = RequestHead::peek(&mut stream).await?;

    if head.is_connect() {
        // The relay speaks raw TCP from here; drop the head the client
        // sent us (the minimal handshake replaces it) but keep any bytes
        // it pipelined afterwards — they replay into the splice.
        stream.discard(head_len);
        let relay = TunnelRelay::new(&config.upstream, head.target, head.version_minor);
        relay.run(stream).await;
        return Ok(());
    }

    let service = service_fn(move |request| {
        let forwarder = Arc::clone(&forwarder);
        async move { Ok::<_, Infallible>(forwarder.handle(request).await) }
    });

    http1::Builder::new()
        .serve_connection(TokioIo::new(stream), service)
        .await
        .map_err(io::Error::other)
}
