//! Property tests for the reservation algorithm
//!
//! Checks the sort/rollback invariants over randomized requests: a
//! successful reservation stamps exactly its seats with one fresh id, and a
//! failed one leaves the grid untouched.

use proptest::prelude::*;
use reserva_core::{Error, EventId};
use reserva_engine::{EventStore, StoreConfig};

const ROWS: u64 = 5;
const COLS: u64 = 5;

fn seat() -> impl Strategy<Value = (u64, u64)> {
    (1..=ROWS, 1..=COLS)
}

fn fresh_store() -> EventStore {
    let store = EventStore::new(StoreConfig::default());
    store.create(EventId(1), ROWS, COLS).unwrap();
    store
}

proptest! {
    #[test]
    fn distinct_in_range_requests_always_succeed(
        seats in proptest::collection::hash_set(seat(), 1..12)
    ) {
        let store = fresh_store();
        let request: Vec<(u64, u64)> = seats.into_iter().collect();

        let id = store.reserve(EventId(1), &request).unwrap();
        let grid = store.show(EventId(1)).unwrap();

        for row in 1..=ROWS {
            for col in 1..=COLS {
                let expected = if request.contains(&(row, col)) { id.0 } else { 0 };
                prop_assert_eq!(grid.seat(row, col), expected);
            }
        }
    }

    #[test]
    fn duplicated_seats_never_mutate_the_grid(
        seats in proptest::collection::vec(seat(), 2..10),
        dup_index in 0usize..10
    ) {
        let store = fresh_store();
        let mut request = seats.clone();
        // Force a duplicate somewhere in the request.
        let dup = request[dup_index % request.len()];
        request.push(dup);

        let err = store.reserve(EventId(1), &request).unwrap_err();
        prop_assert!(matches!(err, Error::Invalid(_)));
        prop_assert!(store.show(EventId(1)).unwrap().seats.iter().all(|&s| s == 0));
    }

    #[test]
    fn conflicting_requests_roll_back_fully(
        first in proptest::collection::hash_set(seat(), 1..8),
        second in proptest::collection::hash_set(seat(), 1..8)
    ) {
        let first: Vec<(u64, u64)> = first.into_iter().collect();
        let second: Vec<(u64, u64)> = second.into_iter().collect();
        let overlaps = second.iter().any(|s| first.contains(s));

        let store = fresh_store();
        let id = store.reserve(EventId(1), &first).unwrap();

        match store.reserve(EventId(1), &second) {
            Ok(second_id) => {
                prop_assert!(!overlaps);
                prop_assert!(second_id > id);
            }
            Err(Error::Conflict { row, col }) => {
                prop_assert!(first.contains(&(row, col)));
                // Every seat outside the first reservation is back to free.
                let grid = store.show(EventId(1)).unwrap();
                for r in 1..=ROWS {
                    for c in 1..=COLS {
                        let expected = if first.contains(&(r, c)) { id.0 } else { 0 };
                        prop_assert_eq!(grid.seat(r, c), expected);
                    }
                }
            }
            Err(other) => prop_assert!(false, "unexpected error: {other}"),
        }
    }

    #[test]
    fn failed_attempts_still_burn_ids(
        occupied in seat(),
    ) {
        let store = fresh_store();
        store.reserve(EventId(1), &[occupied]).unwrap();

        let _ = store.reserve(EventId(1), &[occupied]).unwrap_err();

        // Id 2 was consumed by the failed attempt.
        let free = (1..=ROWS)
            .flat_map(|r| (1..=COLS).map(move |c| (r, c)))
            .find(|s| *s != occupied)
            .unwrap();
        let next = store.reserve(EventId(1), &[free]).unwrap();
        prop_assert_eq!(next.0, 3);
    }
}
