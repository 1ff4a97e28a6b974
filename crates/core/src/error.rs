//! Error taxonomy for the reservation store
//!
//! Every layer reports failures through this one enum. We use `thiserror`
//! for automatic `Display` and `Error` trait implementations.
//!
//! # Propagation policy
//!
//! Per-operation failures (`AlreadyExists`, `NotFound`, `Invalid`,
//! `Conflict`) are reported to the caller as a status and never abort a
//! worker or a session. `AllocFailure` and `Io` on a control path (lock
//! setup, channel setup) are fatal for the affected worker since no safe
//! continuation is defined.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::EventId;

/// Result type alias for reservation-store operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the store, the engine and both front-ends.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum Error {
    /// Create was called with an identifier that is already live
    #[error("event already exists: {0}")]
    AlreadyExists(EventId),

    /// Operation on an unknown event identifier
    #[error("event not found: {0}")]
    NotFound(EventId),

    /// Malformed request: empty reservation list, duplicate seat,
    /// out-of-range coordinate or malformed command
    #[error("invalid request: {0}")]
    Invalid(String),

    /// Seat already held by another reservation
    #[error("seat ({row},{col}) already reserved")]
    Conflict {
        /// 1-based row of the contended seat
        row: u64,
        /// 1-based column of the contended seat
        col: u64,
    },

    /// Resource exhaustion while building an event
    #[error("allocation failure: {0}")]
    AllocFailure(String),

    /// Channel read/write failure on a session path
    #[error("i/o failure: {0}")]
    Io(String),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_identifiers() {
        let err = Error::AlreadyExists(EventId(7));
        assert!(err.to_string().contains('7'));

        let err = Error::Conflict { row: 2, col: 3 };
        assert!(err.to_string().contains("(2,3)"));
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
