//! Fixed worker pool with dispatch mutex and barrier checkpoints
//!
//! Workers share one dispatch mutex guarding the command stream, the
//! per-worker wait flags and the barrier flag. A worker holds the mutex
//! only while reading the next command; the (possibly slow) store operation
//! runs with the mutex released so long-running reservations never block
//! peers from dispatching.
//!
//! A round ends for a worker when it reads BARRIER (setting the shared
//! flag), observes the flag at the top of its loop, or exhausts the stream.
//! Rounds are separated by a two-phase rendezvous on one
//! `std::sync::Barrier` sized to the pool: the leader clears the barrier
//! flag and decides whether to resume (some worker saw BARRIER) or stop
//! (everyone was done). No worker reads commands past a BARRIER until all
//! peers have reached it.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use reserva_core::{Error, Result};
use reserva_engine::render::render_listing;
use reserva_engine::EventStore;
use tracing::{debug, info, warn};

use crate::command::Command;
use crate::stream::CommandStream;

const HELP: &str = "Available commands:\n\
  CREATE <event_id> <num_rows> <num_columns>\n\
  RESERVE <event_id> [(<x1>,<y1>) (<x2>,<y2>) ...]\n\
  SHOW <event_id>\n\
  LIST\n\
  WAIT <delay_ms> [thread_id]\n\
  BARRIER\n\
  HELP";

/// Executor configuration, supplied by the (excluded) CLI layer.
#[derive(Debug, Clone, Copy)]
pub struct ExecutorConfig {
    /// Number of worker threads in the pool.
    pub workers: usize,
}

/// How a worker's round ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RoundEnd {
    /// End-of-stream reached.
    Done,
    /// A barrier checkpoint was read or observed.
    Barrier,
}

/// State guarded by the coarse dispatch mutex.
struct Dispatch {
    stream: Box<dyn CommandStream>,
    /// Pending sleep per worker, 1-indexed (slot 0 unused).
    wait_flags: Vec<Option<Duration>>,
    barrier: bool,
}

struct Shared<W: Write + Send> {
    store: Arc<EventStore>,
    dispatch: Mutex<Dispatch>,
    sink: Arc<Mutex<W>>,
    checkpoint: Barrier,
    barrier_seen: AtomicBool,
    resume: AtomicBool,
    workers: usize,
}

/// The in-process command executor.
///
/// Stateless apart from the store handle; each [`run`](Self::run) drives one
/// command stream to completion with a fresh pool.
pub struct CommandExecutor {
    store: Arc<EventStore>,
}

impl CommandExecutor {
    /// Create an executor over a store.
    pub fn new(store: Arc<EventStore>) -> Self {
        Self { store }
    }

    /// Consume the whole stream with `config.workers` threads, writing
    /// SHOW/LIST output to `sink`.
    ///
    /// Per-operation failures are reported and skipped. A failed thread
    /// spawn or a worker panic aborts the run.
    pub fn run<S, W>(&self, config: ExecutorConfig, stream: S, sink: Arc<Mutex<W>>) -> Result<()>
    where
        S: CommandStream + 'static,
        W: Write + Send + 'static,
    {
        if config.workers == 0 {
            return Err(Error::Invalid("worker pool size must be at least 1".into()));
        }

        let shared = Arc::new(Shared {
            store: Arc::clone(&self.store),
            dispatch: Mutex::new(Dispatch {
                stream: Box::new(stream),
                wait_flags: vec![None; config.workers + 1],
                barrier: false,
            }),
            sink,
            checkpoint: Barrier::new(config.workers),
            barrier_seen: AtomicBool::new(false),
            resume: AtomicBool::new(false),
            workers: config.workers,
        });

        let mut handles = Vec::with_capacity(config.workers);
        for id in 1..=config.workers {
            let shared = Arc::clone(&shared);
            let handle = thread::Builder::new()
                .name(format!("reserva-worker-{id}"))
                .spawn(move || worker_loop(&shared, id))?;
            handles.push(handle);
        }
        for handle in handles {
            handle
                .join()
                .map_err(|_| Error::AllocFailure("worker thread panicked".into()))?;
        }
        Ok(())
    }
}

fn worker_loop<W: Write + Send>(shared: &Shared<W>, id: usize) {
    loop {
        if run_round(shared, id) == RoundEnd::Barrier {
            shared.barrier_seen.store(true, Ordering::SeqCst);
        }

        // Two-phase rendezvous: the leader resets the barrier flag and
        // publishes the resume decision, the second wait makes it visible
        // to everyone before the next round starts.
        if shared.checkpoint.wait().is_leader() {
            let resume = shared.barrier_seen.swap(false, Ordering::SeqCst);
            shared.dispatch.lock().barrier = false;
            shared.resume.store(resume, Ordering::SeqCst);
            if resume {
                debug!("barrier checkpoint reached, pool resuming");
            }
        }
        shared.checkpoint.wait();

        if !shared.resume.load(Ordering::SeqCst) {
            return;
        }
    }
}

fn run_round<W: Write + Send>(shared: &Shared<W>, id: usize) -> RoundEnd {
    loop {
        let mut dispatch = shared.dispatch.lock();

        // A peer may have flagged this worker via WAIT: sleep with the
        // mutex released, then clear the flag.
        if let Some(delay) = dispatch.wait_flags[id] {
            drop(dispatch);
            debug!(worker = id, delay_ms = delay.as_millis() as u64, "waiting");
            thread::sleep(delay);
            dispatch = shared.dispatch.lock();
            dispatch.wait_flags[id] = None;
        }

        if dispatch.barrier {
            return RoundEnd::Barrier;
        }

        let Some(command) = dispatch.stream.next_command() else {
            return RoundEnd::Done;
        };

        match command {
            Command::Barrier => {
                dispatch.barrier = true;
                return RoundEnd::Barrier;
            }
            Command::Wait {
                delay_ms,
                target: None,
            } => {
                drop(dispatch);
                thread::sleep(Duration::from_millis(delay_ms));
            }
            Command::Wait {
                delay_ms,
                target: Some(target),
            } => {
                if (1..=shared.workers).contains(&target) {
                    dispatch.wait_flags[target] = Some(Duration::from_millis(delay_ms));
                } else {
                    warn!(target, "WAIT target out of range, ignored");
                }
            }
            other => {
                drop(dispatch);
                execute(shared, other);
            }
        }
    }
}

/// Run one store command with the dispatch mutex released.
fn execute<W: Write + Send>(shared: &Shared<W>, command: Command) {
    match command {
        Command::Create {
            event_id,
            rows,
            cols,
        } => {
            if let Err(err) = shared.store.create(event_id, rows, cols) {
                warn!(event = %event_id, error = %err, "failed to create event");
            }
        }
        Command::Reserve { event_id, seats } => {
            if let Err(err) = shared.store.reserve(event_id, &seats) {
                warn!(event = %event_id, error = %err, "failed to reserve seats");
            }
        }
        Command::Show { event_id } => match shared.store.show(event_id) {
            Ok(grid) => write_output(shared, &grid.render()),
            Err(err) => warn!(event = %event_id, error = %err, "failed to show event"),
        },
        Command::List => {
            let listing = render_listing(&shared.store.list());
            write_output(shared, &listing);
        }
        Command::Help => info!("{HELP}"),
        Command::Empty => {}
        Command::Invalid => warn!("invalid command, see HELP for usage"),
        Command::Wait { .. } | Command::Barrier => {
            unreachable!("dispatched inside the round loop")
        }
    }
}

fn write_output<W: Write + Send>(shared: &Shared<W>, text: &str) {
    let mut sink = shared.sink.lock();
    if let Err(err) = sink.write_all(text.as_bytes()) {
        warn!(error = %err, "failed to write output");
    }
}
