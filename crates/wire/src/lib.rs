//! Wire protocol for the session (IPC) mode
//!
//! A fixed-layout little-endian binary protocol shared by client and
//! server: one opcode byte followed by an opcode-specific fixed-size
//! payload, so the reader always knows how many bytes follow from the
//! opcode alone. All decoding validates lengths and counts before
//! allocating.
//!
//! The physical transport is out of scope: channels are opaque byte-stream
//! endpoints behind the [`Transport`] trait (open/read/write/close), with
//! an in-memory pipe implementation ([`MemTransport`]) for tests and
//! embedding.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod mem;
pub mod transport;

pub use codec::{
    read_request, read_list_response, read_session_id, read_setup, read_show_response,
    read_status, write_list_response, write_request, write_session_id, write_setup,
    write_show_response, write_status, GridFrame, Opcode, Request, SetupRequest, Status,
    WireError, WireResult,
};
pub use mem::MemTransport;
pub use transport::Transport;
