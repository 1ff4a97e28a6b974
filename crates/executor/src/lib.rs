//! In-process command executor
//!
//! A fixed pool of worker threads pulls opcoded commands from one shared
//! [`CommandStream`] and executes them against the event store. Workers
//! cooperate through a coarse dispatch mutex plus explicit WAIT and BARRIER
//! synchronization: WAIT delays a worker (itself or a targeted peer at the
//! top of its loop), BARRIER is a pool-wide checkpoint no worker may read
//! past until every peer has reached it.
//!
//! The textual job-file parser is an external collaborator: streams yield
//! already-tokenized [`Command`] values.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod command;
mod pool;
mod stream;

pub use command::Command;
pub use pool::{CommandExecutor, ExecutorConfig};
pub use stream::{CommandStream, VecStream};
