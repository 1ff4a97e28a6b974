//! Reserva - concurrent seat reservation store for events
//!
//! Reserva keeps a set of events, each with a fixed rows×cols seat grid,
//! and reserves groups of seats atomically under fine-grained locking.
//! Two front-ends drive the shared engine:
//!
//! - an in-process executor: a fixed worker pool consuming a stream of
//!   commands with explicit WAIT/BARRIER synchronization
//! - a session server: clients connect over named byte channels, a fixed
//!   pool of session workers services them in arrival order
//!
//! # Quick Start
//!
//! ```ignore
//! use reserva::{EventId, EventStore, StoreConfig};
//! use std::sync::Arc;
//!
//! let store = Arc::new(EventStore::new(StoreConfig::default()));
//! store.create(EventId(1), 10, 20)?;
//! store.reserve(EventId(1), &[(1, 1), (1, 2)])?;
//! let grid = store.show(EventId(1))?;
//! ```
//!
//! # Architecture
//!
//! The engine ([`EventStore`]) owns all seat state; the executor and the
//! client/server pair are thin layers over it. The wire protocol and its
//! transport abstraction live in [`reserva_wire`] and are re-exported here
//! for embedders.

// Re-export the public API of each layer
pub use reserva_core::{limits, Error, EventId, ReservationId, Result, SeatCoord};
pub use reserva_engine::{render, Event, EventStore, Grid, StoreConfig};
pub use reserva_executor::{Command, CommandExecutor, CommandStream, ExecutorConfig, VecStream};
pub use reserva_wire::{GridFrame, MemTransport, Status, Transport};
pub use reserva_server::{DumpHandle, Server, ServerConfig, ServerHandle};
pub use reserva_client::{Client, ClientError, ClientResult};
