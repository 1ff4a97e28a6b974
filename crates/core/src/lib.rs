//! Core types for the reserva reservation store
//!
//! This crate defines the foundational pieces shared by every layer:
//! - Typed identifiers ([`EventId`], [`ReservationId`]) and seat coordinates
//! - The error taxonomy ([`Error`]) and [`Result`] alias
//! - Frozen protocol limits ([`limits`])

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod limits;
pub mod types;

pub use error::{Error, Result};
pub use types::{EventId, ReservationId, SeatCoord};
