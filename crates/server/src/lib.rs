//! Session server (IPC mode)
//!
//! A single acceptor thread blocks on the well-known rendezvous channel,
//! decoding Setup frames and enqueuing sessions onto the pending-session
//! queue. A fixed pool of session workers dequeues sessions exactly once,
//! in arrival order, and services each session's request stream until
//! disconnect. All workers share one [`EventStore`](reserva_engine::EventStore).
//!
//! A side facility, the [`dump`] listener, renders the full event/seat
//! listing on an operator trigger; it is not part of the client-visible
//! protocol.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod dump;
pub mod queue;
mod server;
mod session;

pub use dump::DumpHandle;
pub use queue::{Session, SessionQueue};
pub use server::{Server, ServerConfig, ServerHandle};
