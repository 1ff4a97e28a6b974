//! In-memory pipe transport
//!
//! FIFO-like channels backed by a byte queue under a mutex + condvar.
//! Readers block until bytes arrive or the channel is hung up; writers
//! never block (the queue is unbounded). Used by tests and by embedders
//! that run client and server in one process.

use std::collections::{HashMap, VecDeque};
use std::io::{self, Read, Write};
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use crate::transport::Transport;

#[derive(Default)]
struct PipeState {
    buf: VecDeque<u8>,
    closed: bool,
}

#[derive(Default)]
struct PipeInner {
    state: Mutex<PipeState>,
    readable: Condvar,
}

type Pipe = Arc<PipeInner>;

/// A registry of named in-memory pipes.
///
/// Cloning is cheap and shares the registry, so client and server sides
/// hold the same channel namespace.
#[derive(Clone, Default)]
pub struct MemTransport {
    pipes: Arc<Mutex<HashMap<String, Pipe>>>,
}

impl MemTransport {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    fn pipe(&self, name: &str) -> io::Result<Pipe> {
        self.pipes.lock().get(name).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no such channel: {name}"))
        })
    }
}

impl Transport for MemTransport {
    type Reader = PipeReader;
    type Writer = PipeWriter;

    fn create(&self, name: &str) -> io::Result<()> {
        let mut pipes = self.pipes.lock();
        // Replace semantics: unlink-then-mkfifo. Hang up the old channel so
        // stale readers do not wait forever.
        if let Some(old) = pipes.insert(name.to_string(), Pipe::default()) {
            old.state.lock().closed = true;
            old.readable.notify_all();
        }
        Ok(())
    }

    fn open_reader(&self, name: &str) -> io::Result<PipeReader> {
        Ok(PipeReader(self.pipe(name)?))
    }

    fn open_writer(&self, name: &str) -> io::Result<PipeWriter> {
        Ok(PipeWriter(self.pipe(name)?))
    }

    fn close(&self, name: &str) -> io::Result<()> {
        let pipe = self.pipe(name)?;
        pipe.state.lock().closed = true;
        pipe.readable.notify_all();
        Ok(())
    }
}

/// Read end of an in-memory pipe.
pub struct PipeReader(Pipe);

impl Read for PipeReader {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if out.is_empty() {
            return Ok(0);
        }
        let mut state = self.0.state.lock();
        loop {
            if !state.buf.is_empty() {
                let n = out.len().min(state.buf.len());
                for slot in out.iter_mut().take(n) {
                    *slot = state.buf.pop_front().unwrap_or_default();
                }
                return Ok(n);
            }
            if state.closed {
                return Ok(0);
            }
            self.0.readable.wait(&mut state);
        }
    }
}

/// Write end of an in-memory pipe.
pub struct PipeWriter(Pipe);

impl Write for PipeWriter {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        let mut state = self.0.state.lock();
        if state.closed {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "channel hung up",
            ));
        }
        state.buf.extend(bytes);
        self.0.readable.notify_all();
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read as _, Write as _};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn bytes_flow_reader_to_writer() {
        let transport = MemTransport::new();
        transport.create("ch").unwrap();

        let mut w = transport.open_writer("ch").unwrap();
        let mut r = transport.open_reader("ch").unwrap();

        w.write_all(b"hello").unwrap();
        let mut buf = [0u8; 5];
        r.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"hello");
    }

    #[test]
    fn reader_blocks_until_data_arrives() {
        let transport = MemTransport::new();
        transport.create("ch").unwrap();
        let mut r = transport.open_reader("ch").unwrap();

        let writer_side = transport.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            let mut w = writer_side.open_writer("ch").unwrap();
            w.write_all(&[42]).unwrap();
        });

        let mut buf = [0u8; 1];
        r.read_exact(&mut buf).unwrap();
        assert_eq!(buf[0], 42);
        handle.join().unwrap();
    }

    #[test]
    fn close_drains_then_signals_eof() {
        let transport = MemTransport::new();
        transport.create("ch").unwrap();
        let mut w = transport.open_writer("ch").unwrap();
        w.write_all(&[1, 2]).unwrap();
        transport.close("ch").unwrap();

        let mut r = transport.open_reader("ch").unwrap();
        let mut buf = Vec::new();
        r.read_to_end(&mut buf).unwrap();
        assert_eq!(buf, vec![1, 2]);

        assert!(matches!(
            w.write_all(&[3]),
            Err(e) if e.kind() == io::ErrorKind::BrokenPipe
        ));
    }

    #[test]
    fn opening_a_missing_channel_fails() {
        let transport = MemTransport::new();
        assert!(transport.open_reader("nope").is_err());
        assert!(transport.open_writer("nope").is_err());
    }

    #[test]
    fn create_replaces_and_hangs_up_the_old_channel() {
        let transport = MemTransport::new();
        transport.create("ch").unwrap();
        let mut old_reader = transport.open_reader("ch").unwrap();
        transport.create("ch").unwrap();

        // The stale reader sees EOF rather than waiting forever.
        let mut buf = Vec::new();
        old_reader.read_to_end(&mut buf).unwrap();
        assert!(buf.is_empty());
    }
}
