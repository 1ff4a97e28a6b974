//! Acceptor loop, session worker pool and server lifecycle

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use reserva_core::{Error, Result};
use reserva_engine::EventStore;
use reserva_wire::{read_setup, Transport, WireError};
use tracing::{info, warn};

use crate::queue::{Session, SessionQueue};
use crate::session;

/// Server configuration, supplied by the (excluded) CLI layer.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Number of session worker threads.
    pub workers: usize,
    /// Name of the well-known rendezvous channel.
    pub rendezvous: String,
}

/// The session server. [`start`](Self::start) spawns the acceptor and the
/// worker pool and hands back a [`ServerHandle`] for orderly shutdown.
pub struct Server;

impl Server {
    /// Create the rendezvous channel and start accepting sessions.
    pub fn start<T: Transport + 'static>(
        store: Arc<EventStore>,
        transport: Arc<T>,
        config: ServerConfig,
    ) -> Result<ServerHandle> {
        if config.workers == 0 {
            return Err(Error::Invalid("worker pool size must be at least 1".into()));
        }

        transport.create(&config.rendezvous)?;
        let rendezvous = transport.open_reader(&config.rendezvous)?;
        let queue = Arc::new(SessionQueue::new());

        let acceptor = {
            let queue = Arc::clone(&queue);
            thread::Builder::new()
                .name("reserva-acceptor".into())
                .spawn(move || accept_loop(rendezvous, &queue))?
        };

        let mut workers = Vec::with_capacity(config.workers);
        for index in 0..config.workers {
            let store = Arc::clone(&store);
            let transport = Arc::clone(&transport);
            let queue = Arc::clone(&queue);
            let handle = thread::Builder::new()
                .name(format!("reserva-session-{index}"))
                .spawn(move || worker_loop(index as u32, &store, transport.as_ref(), &queue))?;
            workers.push(handle);
        }

        info!(
            rendezvous = %config.rendezvous,
            workers = config.workers,
            "session server started"
        );
        let close_rendezvous = {
            let name = config.rendezvous.clone();
            move || {
                if let Err(err) = transport.close(&name) {
                    warn!(error = %err, "failed to close rendezvous channel");
                }
            }
        };
        Ok(ServerHandle {
            queue,
            acceptor: Some(acceptor),
            workers,
            close_rendezvous: Box::new(close_rendezvous),
        })
    }
}

/// Running-server handle.
///
/// `shutdown` closes the rendezvous channel, lets queued sessions drain and
/// joins every thread. Sessions still Active are served to their disconnect
/// first.
pub struct ServerHandle {
    queue: Arc<SessionQueue>,
    acceptor: Option<JoinHandle<()>>,
    workers: Vec<JoinHandle<()>>,
    close_rendezvous: Box<dyn FnOnce() + Send>,
}

impl ServerHandle {
    /// Stop accepting, drain the queue and join all threads.
    pub fn shutdown(mut self) {
        (self.close_rendezvous)();
        if let Some(acceptor) = self.acceptor.take() {
            let _ = acceptor.join();
        }
        self.queue.shutdown();
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
        info!("session server stopped");
    }
}

fn accept_loop<R: std::io::Read>(mut rendezvous: R, queue: &SessionQueue) {
    loop {
        match read_setup(&mut rendezvous) {
            Ok(setup) => {
                info!(
                    request = %setup.request_channel,
                    response = %setup.response_channel,
                    "session request accepted"
                );
                queue.push(Session {
                    request_channel: setup.request_channel,
                    response_channel: setup.response_channel,
                });
            }
            // EOF: the rendezvous channel was hung up, stop accepting.
            Err(WireError::Io(err)) if err.kind() == std::io::ErrorKind::UnexpectedEof => {
                return;
            }
            Err(err) => {
                // A garbled handshake leaves the stream unframed; there is
                // no safe way to resynchronize, so stop accepting.
                warn!(error = %err, "malformed handshake, acceptor stopping");
                return;
            }
        }
    }
}

fn worker_loop<T: Transport>(
    worker_index: u32,
    store: &EventStore,
    transport: &T,
    queue: &SessionQueue,
) {
    while let Some(session) = queue.pop() {
        let mut requests = match transport.open_reader(&session.request_channel) {
            Ok(r) => r,
            Err(err) => {
                warn!(worker = worker_index, error = %err, "cannot open request channel");
                continue;
            }
        };
        let mut responses = match transport.open_writer(&session.response_channel) {
            Ok(w) => w,
            Err(err) => {
                warn!(worker = worker_index, error = %err, "cannot open response channel");
                continue;
            }
        };

        info!(worker = worker_index, request = %session.request_channel, "session opened");
        if let Err(err) = session::serve(store, worker_index, &mut requests, &mut responses) {
            warn!(worker = worker_index, error = %err, "session aborted");
        }
        // Dropping the endpoints closes this worker's ends; the worker is
        // reusable for the next queued session.
    }
}
