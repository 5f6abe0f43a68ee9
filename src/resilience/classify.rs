//! Transport-error classification.
//!
//! Transient network failures (resets, refused connections, timeouts,
//! unreachable hosts, DNS trouble) are expected while the upstream churns
//! and are retried without an error-level log. Everything else is still
//! retried but reported as unexpected.

use std::error::Error as StdError;
use std::io;

/// io error kinds retried without surfacing to the error log.
const SILENT_KINDS: &[io::ErrorKind] = &[
    io::ErrorKind::ConnectionReset,
    io::ErrorKind::ConnectionRefused,
    io::ErrorKind::ConnectionAborted,
    io::ErrorKind::BrokenPipe,
    io::ErrorKind::TimedOut,
    io::ErrorKind::HostUnreachable,
    io::ErrorKind::NetworkUnreachable,
];

/// Whether an upstream attempt error should retry silently.
///
/// Timeouts and connect failures (which is where DNS resolution errors
/// surface) are always silent; otherwise the error's source chain is
/// searched for a known-transient io error kind.
pub fn is_silent_transient(err: &reqwest::Error) -> bool {
    if err.is_timeout() || err.is_connect() {
        return true;
    }
    match source_io_kind(err) {
        Some(kind) => is_silent_kind(kind),
        None => false,
    }
}

pub(crate) fn is_silent_kind(kind: io::ErrorKind) -> bool {
    SILENT_KINDS.contains(&kind)
}

/// Finds the first io error kind in an error's source chain.
pub(crate) fn source_io_kind(err: &(dyn StdError + 'static)) -> Option<io::ErrorKind> {
    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            return Some(io_err.kind());
        }
        source = cause.source();
    }
    None
}
