//! Reservation engine for reserva
//!
//! This crate owns all seat state. It implements:
//! - [`EventStore`]: insertion-ordered event membership behind one
//!   store-wide `RwLock` (create / lookup / list)
//! - [`Event`]: the per-event seat grid with its layered locking protocol
//!   (event `RwLock` + one claim mutex per seat + an atomic reservation
//!   counter)
//! - [`render`]: the textual renderings of grids and event listings
//!
//! # Locking discipline
//!
//! The store lock protects membership only. Seat-level work happens on an
//! `Arc<Event>` obtained from `lookup` with the store lock released, so
//! concurrent creates and seat operations on different events never contend
//! on the same lock. Within one event, reservations take the event lock for
//! reading (disjoint seat sets proceed in parallel) and `show` takes it for
//! writing (a stable whole-grid snapshot). Deadlock between overlapping
//! reservations is prevented by claiming seat mutexes in one global total
//! order: sorted by (row, col).
//!
//! Every event lookup and every seat access sleeps for a configurable
//! artificial delay, modelling a costly backing store. The delay is part of
//! the component contract and must not be optimized away.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod event;
pub mod render;
pub mod store;

pub use event::{Event, Grid};
pub use store::{EventStore, StoreConfig};
