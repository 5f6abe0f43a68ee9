//! Observability subsystem.
//!
//! Structured logging via `tracing`; every request-path log line carries
//! the request token so one inbound request's attempts correlate.

pub mod logging;
