//! Frozen protocol limits
//!
//! These limits are enforced by the engine and by wire decoding. They are
//! part of the wire contract: the fixed-size RESERVE frame and the
//! fixed-width channel-name fields are both derived from them, so changing
//! either value is a protocol break.

/// Maximum number of seats in a single reservation request.
///
/// The RESERVE wire frame always carries this many (row, col) slots; the
/// leading count says how many are meaningful.
pub const MAX_RESERVATION_SIZE: usize = 256;

/// Fixed width, in bytes, of a channel-name field in the session handshake.
///
/// Names are NUL-padded; longer names are rejected before encoding.
pub const CHANNEL_NAME_LEN: usize = 40;

/// Maximum number of seats (rows×cols) in one event grid.
///
/// Enforced at create time and again when decoding SHOW responses, so a
/// malformed frame can never drive an unbounded allocation.
pub const MAX_GRID_SEATS: usize = 1 << 20;

/// Maximum number of events a store will hold.
///
/// Enforced at create time and again when decoding LIST responses.
pub const MAX_EVENTS: usize = 1 << 20;
