//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (sniff request head, dispatch)
//!     → CONNECT: net::tunnel (raw splice through the upstream)
//!     → plain: hyper http1 connection
//!         → forward.rs (buffer body, retry loop via the upstream proxy)
//!         → headers.rs (strip reserved keys both directions)
//!     → response to client
//! ```

pub mod forward;
pub mod headers;
pub mod parse;
pub mod server;
pub mod token;

pub use server::ProxyServer;
