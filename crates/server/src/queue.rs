//! Pending-session queue
//!
//! An ordered FIFO of sessions awaiting a worker, under its own dedicated
//! mutex + condition variable (decoupled from every other lock in the
//! system). Entries are removed exactly once, in arrival order, by exactly
//! one worker.

use std::collections::VecDeque;

use parking_lot::{Condvar, Mutex};

/// One client's pending session: the channel names from its Setup frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// Channel the client writes requests to.
    pub request_channel: String,
    /// Channel the client reads responses from.
    pub response_channel: String,
}

struct QueueState {
    pending: VecDeque<Session>,
    shutdown: bool,
}

/// FIFO of sessions awaiting a worker.
pub struct SessionQueue {
    state: Mutex<QueueState>,
    available: Condvar,
}

impl SessionQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(QueueState {
                pending: VecDeque::new(),
                shutdown: false,
            }),
            available: Condvar::new(),
        }
    }

    /// Enqueue a session and wake one waiting worker.
    pub fn push(&self, session: Session) {
        self.state.lock().pending.push_back(session);
        self.available.notify_one();
    }

    /// Dequeue the head session, blocking while the queue is empty.
    ///
    /// Returns `None` once the queue is shut down and drained.
    pub fn pop(&self) -> Option<Session> {
        let mut state = self.state.lock();
        loop {
            if let Some(session) = state.pending.pop_front() {
                return Some(session);
            }
            if state.shutdown {
                return None;
            }
            self.available.wait(&mut state);
        }
    }

    /// Stop the queue: pending sessions are still handed out, then every
    /// waiting and future `pop` returns `None`.
    pub fn shutdown(&self) {
        self.state.lock().shutdown = true;
        self.available.notify_all();
    }
}

impl Default for SessionQueue {
    fn default() -> Self {
        Self::new()
    }
}
