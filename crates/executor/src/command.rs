//! The executor's instruction set
//!
//! Commands are self-contained, serializable and pure data, produced by the
//! (external) job-file parser or built programmatically.

use serde::{Deserialize, Serialize};

use reserva_core::{EventId, SeatCoord};

/// One opcoded command from the shared stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    /// Create a new event with a rows×cols grid.
    Create {
        /// Caller-assigned event identifier.
        event_id: EventId,
        /// Number of rows.
        rows: u64,
        /// Number of columns.
        cols: u64,
    },
    /// Reserve a group of seats on an event under one reservation id.
    Reserve {
        /// Target event.
        event_id: EventId,
        /// 1-indexed (row, col) pairs.
        seats: Vec<SeatCoord>,
    },
    /// Render an event's grid to the output sink.
    Show {
        /// Target event.
        event_id: EventId,
    },
    /// Render the event listing to the output sink.
    List,
    /// Delay a worker.
    ///
    /// Without a target the calling worker sleeps immediately; with a
    /// 1-based target the targeted worker sleeps the next time it reaches
    /// the top of its loop.
    Wait {
        /// Delay in milliseconds.
        delay_ms: u64,
        /// 1-based worker id, or `None` for the calling worker.
        target: Option<usize>,
    },
    /// Pool-wide synchronization checkpoint.
    Barrier,
    /// Print usage help. Informational, never fatal.
    Help,
    /// Blank line in the source file. Ignored.
    Empty,
    /// Malformed command reported by the parser. Reported, not fatal.
    Invalid,
}
