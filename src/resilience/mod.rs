//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Forwarder attempt:
//!     → retries.rs (drive attempts, unconditional delay after failures)
//!     → classify.rs (decide which transport errors retry silently)
//! ```
//!
//! # Design Decisions
//! - Every attempt carries its own deadline; timeouts are just another
//!   transient transport error
//! - A 503 is retryable but its response is kept as the fallback result
//! - Unexpected errors are retried too, but surfaced to the error log

pub mod classify;
pub mod retries;
