//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (accept loop, connection limits)
//!     → peek.rs (sniff the request head without consuming it)
//!     → plain request: hand the replayed stream to the HTTP layer
//!     → CONNECT: tunnel.rs (raw splice through the upstream proxy)
//!
//! Tunnel states:
//!     Accepted → Connecting → Relaying → Closed
//!                          ↘ Failed  → Closed
//! ```

pub mod listener;
pub mod peek;
pub mod tunnel;
