//! Pool-wide BARRIER and WAIT checkpoint tests
//!
//! The contract under test: no worker reads commands past a BARRIER until
//! every worker in the pool has returned from the segment preceding it.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use reserva_core::EventId;
use reserva_engine::{EventStore, StoreConfig};
use reserva_executor::{Command, CommandExecutor, CommandStream, ExecutorConfig};

/// A stream that records when each command was handed to a worker.
struct TimedStream {
    commands: std::vec::IntoIter<Command>,
    log: Arc<Mutex<Vec<(Command, Instant)>>>,
}

impl TimedStream {
    fn new(commands: Vec<Command>) -> (Self, Arc<Mutex<Vec<(Command, Instant)>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                commands: commands.into_iter(),
                log: Arc::clone(&log),
            },
            log,
        )
    }
}

impl CommandStream for TimedStream {
    fn next_command(&mut self) -> Option<Command> {
        let command = self.commands.next()?;
        self.log.lock().push((command.clone(), Instant::now()));
        Some(command)
    }
}

fn run(workers: usize, store: &Arc<EventStore>, stream: TimedStream) -> String {
    let executor = CommandExecutor::new(Arc::clone(store));
    let sink = Arc::new(Mutex::new(Vec::new()));
    executor
        .run(ExecutorConfig { workers }, stream, Arc::clone(&sink))
        .unwrap();
    let bytes = sink.lock().clone();
    String::from_utf8(bytes).unwrap()
}

#[test]
fn reserve_after_barrier_always_sees_the_created_event() {
    // CREATE is slow (per-access delay); without the checkpoint a second
    // worker could race ahead and RESERVE against a not-yet-created event.
    let store = Arc::new(EventStore::new(StoreConfig {
        access_delay: Duration::from_millis(2),
    }));
    let (stream, _log) = TimedStream::new(vec![
        Command::Create {
            event_id: EventId(1),
            rows: 2,
            cols: 2,
        },
        Command::Barrier,
        Command::Reserve {
            event_id: EventId(1),
            seats: vec![(1, 1)],
        },
    ]);

    run(4, &store, stream);

    assert_eq!(store.show(EventId(1)).unwrap().seat(1, 1), 1);
}

#[test]
fn no_command_is_dispatched_past_a_barrier_before_all_workers_arrive() {
    let store = Arc::new(EventStore::new(StoreConfig::default()));
    let (stream, log) = TimedStream::new(vec![
        Command::Wait {
            delay_ms: 150,
            target: None,
        },
        Command::Barrier,
        Command::Create {
            event_id: EventId(1),
            rows: 1,
            cols: 1,
        },
    ]);

    run(2, &store, stream);

    let log = log.lock();
    let wait_at = log
        .iter()
        .find(|(c, _)| matches!(c, Command::Wait { .. }))
        .map(|(_, t)| *t)
        .unwrap();
    let create_at = log
        .iter()
        .find(|(c, _)| matches!(c, Command::Create { .. }))
        .map(|(_, t)| *t)
        .unwrap();

    // The waiting worker holds the whole pool at the checkpoint: CREATE is
    // only dispatched once its 150ms sleep has elapsed.
    assert!(create_at.duration_since(wait_at) >= Duration::from_millis(150));
    assert_eq!(store.list(), vec![EventId(1)]);
}

#[test]
fn rounds_separated_by_barriers_produce_deterministic_output() {
    let store = Arc::new(EventStore::new(StoreConfig::default()));
    let (stream, _log) = TimedStream::new(vec![
        Command::Create {
            event_id: EventId(1),
            rows: 2,
            cols: 2,
        },
        Command::Barrier,
        Command::Reserve {
            event_id: EventId(1),
            seats: vec![(1, 1), (1, 2)],
        },
        Command::Barrier,
        Command::Show {
            event_id: EventId(1),
        },
        Command::Barrier,
        Command::List,
    ]);

    let output = run(3, &store, stream);
    assert_eq!(output, "1 1\n0 0\n\nEvent: 1\n");
}

#[test]
fn trailing_barrier_terminates_cleanly() {
    let store = Arc::new(EventStore::new(StoreConfig::default()));
    let (stream, _log) = TimedStream::new(vec![Command::Barrier]);
    // One resumed round in which every worker hits end-of-stream.
    run(3, &store, stream);
    assert!(store.list().is_empty());
}
