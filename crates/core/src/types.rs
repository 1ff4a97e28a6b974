//! Typed identifiers and coordinates
//!
//! Identifiers are fixed-width integers assigned by the caller (events) or
//! by the engine (reservations). Seat coordinates are 1-indexed pairs.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Caller-assigned identifier of an event.
///
/// Unique within a store; never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventId(pub u32);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Engine-assigned identifier of a reservation.
///
/// Strictly positive and strictly increasing per event. Ids consumed by
/// failed reservation attempts are never reused, so issued ids may be
/// sparse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ReservationId(pub u32);

impl fmt::Display for ReservationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A 1-indexed (row, column) seat coordinate.
pub type SeatCoord = (u64, u64);
