//! Event store: insertion-ordered membership under one store-wide lock
//!
//! The store lock protects create / lookup / list only. All seat-level work
//! happens on the `Arc<Event>` returned by [`EventStore::lookup`] with the
//! store lock released.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use reserva_core::limits::{MAX_EVENTS, MAX_GRID_SEATS};
use reserva_core::{Error, EventId, ReservationId, Result, SeatCoord};
use tracing::debug;

use crate::event::{Event, Grid};

/// Store configuration, supplied by the (excluded) CLI layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct StoreConfig {
    /// Artificial delay applied to every event lookup and seat access,
    /// simulating a costly backing store. Millisecond-scale for the
    /// in-process mode, microsecond-scale for the server mode.
    pub access_delay: Duration,
}

struct Membership {
    /// Events in creation order, for `list`.
    order: Vec<Arc<Event>>,
    /// Id index, for `lookup`.
    index: HashMap<EventId, Arc<Event>>,
}

/// The single owner of all events.
///
/// One instance is created explicitly and shared by handle with every
/// front-end; there is no process-global store.
pub struct EventStore {
    membership: RwLock<Membership>,
    access_delay: Duration,
}

impl EventStore {
    /// Create an empty store.
    pub fn new(config: StoreConfig) -> Self {
        Self {
            membership: RwLock::new(Membership {
                order: Vec::new(),
                index: HashMap::new(),
            }),
            access_delay: config.access_delay,
        }
    }

    /// Create a new event with an all-free rows×cols grid.
    ///
    /// The existence check and the insertion are atomic with respect to the
    /// store lock, and the event is fully initialized before publication,
    /// so a concurrent `lookup` never observes a half-built event.
    pub fn create(&self, id: EventId, rows: u64, cols: u64) -> Result<()> {
        let mut membership = self.membership.write();
        self.simulate_access();

        if membership.index.contains_key(&id) {
            return Err(Error::AlreadyExists(id));
        }
        if rows == 0 || cols == 0 {
            return Err(Error::Invalid(format!("degenerate grid {rows}x{cols}")));
        }
        let seat_count = rows
            .checked_mul(cols)
            .and_then(|n| usize::try_from(n).ok())
            .filter(|&n| n <= MAX_GRID_SEATS)
            .ok_or_else(|| Error::AllocFailure(format!("grid {rows}x{cols} too large")))?;
        if membership.order.len() >= MAX_EVENTS {
            return Err(Error::AllocFailure("event capacity exhausted".into()));
        }

        let event = Arc::new(Event::new(id, rows, cols, seat_count, self.access_delay));
        membership.order.push(Arc::clone(&event));
        membership.index.insert(id, event);
        debug!(event = %id, rows, cols, "event created");
        Ok(())
    }

    /// Look up an event by id.
    ///
    /// Returns a transient reference; callers must not hold it across
    /// unrelated operations.
    pub fn lookup(&self, id: EventId) -> Result<Arc<Event>> {
        let membership = self.membership.read();
        self.simulate_access();
        membership
            .index
            .get(&id)
            .cloned()
            .ok_or(Error::NotFound(id))
    }

    /// Ids of all events in creation order. Empty means "no events".
    pub fn list(&self) -> Vec<EventId> {
        let membership = self.membership.read();
        self.simulate_access();
        membership.order.iter().map(|event| event.id()).collect()
    }

    /// Reserve seats on an event: lookup plus [`Event::reserve`].
    pub fn reserve(&self, id: EventId, seats: &[SeatCoord]) -> Result<ReservationId> {
        self.lookup(id)?.reserve(seats)
    }

    /// Snapshot an event's grid: lookup plus [`Event::snapshot`].
    pub fn show(&self, id: EventId) -> Result<Grid> {
        Ok(self.lookup(id)?.snapshot())
    }

    fn simulate_access(&self) {
        if !self.access_delay.is_zero() {
            std::thread::sleep(self.access_delay);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> EventStore {
        EventStore::new(StoreConfig::default())
    }

    #[test]
    fn create_then_show_yields_all_free_grid() {
        let store = store();
        store.create(EventId(1), 3, 2).unwrap();
        let grid = store.show(EventId(1)).unwrap();
        assert_eq!((grid.rows, grid.cols), (3, 2));
        assert!(grid.seats.iter().all(|&s| s == 0));
    }

    #[test]
    fn duplicate_create_fails_and_leaves_existing_event_untouched() {
        let store = store();
        store.create(EventId(1), 2, 2).unwrap();
        store.reserve(EventId(1), &[(1, 1)]).unwrap();

        let err = store.create(EventId(1), 5, 5).unwrap_err();
        assert_eq!(err, Error::AlreadyExists(EventId(1)));

        let grid = store.show(EventId(1)).unwrap();
        assert_eq!((grid.rows, grid.cols), (2, 2));
        assert_eq!(grid.seat(1, 1), 1);
    }

    #[test]
    fn degenerate_grids_are_rejected() {
        let store = store();
        assert!(matches!(
            store.create(EventId(1), 0, 4),
            Err(Error::Invalid(_))
        ));
        assert!(matches!(
            store.create(EventId(1), 4, 0),
            Err(Error::Invalid(_))
        ));
        assert!(store.list().is_empty());
    }

    #[test]
    fn oversized_grid_is_alloc_failure() {
        let store = store();
        assert!(matches!(
            store.create(EventId(1), u64::MAX, 2),
            Err(Error::AllocFailure(_))
        ));
    }

    #[test]
    fn unknown_event_is_not_found() {
        let store = store();
        // matches! rather than unwrap_err: Arc<Event> carries no Debug.
        assert!(matches!(
            store.lookup(EventId(9)),
            Err(Error::NotFound(EventId(9)))
        ));
        assert_eq!(
            store.reserve(EventId(9), &[(1, 1)]).unwrap_err(),
            Error::NotFound(EventId(9))
        );
        assert_eq!(store.show(EventId(9)).unwrap_err(), Error::NotFound(EventId(9)));
    }

    #[test]
    fn list_preserves_creation_order() {
        let store = store();
        for id in [7u32, 3, 5] {
            store.create(EventId(id), 1, 1).unwrap();
        }
        assert_eq!(store.list(), vec![EventId(7), EventId(3), EventId(5)]);
    }
}
