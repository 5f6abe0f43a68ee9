//! Local forwarding proxy with retry.
//!
//! Sits between a client and a single fixed upstream proxy. Plain HTTP
//! requests are relayed through the upstream with transparent retry on
//! transient network failure or 503; CONNECT requests become raw TCP
//! tunnels through the upstream, spliced until either side closes.

pub mod config;
pub mod http;
pub mod net;
pub mod observability;
pub mod resilience;

pub use config::ProxyConfig;
pub use http::ProxyServer;
