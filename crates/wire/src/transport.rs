//! Opaque byte-stream channel abstraction
//!
//! The protocol never cares what carries its bytes: all it needs is named
//! endpoints with open/read/write/close semantics. A real deployment backs
//! this with FIFOs; tests and embedders use
//! [`MemTransport`](crate::mem::MemTransport).

use std::io::{self, Read, Write};

/// Named byte-stream channels.
///
/// A channel is created once (the `mkfifo` analogue), then opened any
/// number of times for reading or writing. `close` hangs up the channel:
/// blocked and future readers observe end-of-stream.
///
/// Writes are atomic per call, the PIPE_BUF guarantee of POSIX pipes:
/// bytes from one `write` are never interleaved with another writer's.
/// Nothing is guaranteed across calls, so writers sharing a channel must
/// emit each frame with a single write.
pub trait Transport: Send + Sync {
    /// Read end of a channel.
    type Reader: Read + Send + 'static;
    /// Write end of a channel.
    type Writer: Write + Send + 'static;

    /// Create a channel, replacing any existing channel of the same name.
    fn create(&self, name: &str) -> io::Result<()>;

    /// Open the read end of a channel.
    fn open_reader(&self, name: &str) -> io::Result<Self::Reader>;

    /// Open the write end of a channel.
    fn open_writer(&self, name: &str) -> io::Result<Self::Writer>;

    /// Hang up a channel: readers drain buffered bytes, then see EOF.
    fn close(&self, name: &str) -> io::Result<()>;
}
