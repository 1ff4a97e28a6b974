//! Per-event seat grid and the reservation algorithm
//!
//! An [`Event`] owns a rows×cols grid where each cell is either `0` (free)
//! or the id of the reservation holding it. Reservations claim seats under
//! per-seat mutexes while holding the event lock for reading; `show` takes
//! the event lock for writing to read a stable snapshot.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use parking_lot::{Mutex, MutexGuard, RwLock};
use reserva_core::limits::MAX_RESERVATION_SIZE;
use reserva_core::{Error, EventId, ReservationId, Result, SeatCoord};
use tracing::debug;

/// One cell of the grid: a claim mutex plus the held value.
///
/// The value is only written while the claim mutex is held; `show` reads it
/// without the mutex, which is safe because `show` holds the event lock
/// exclusively while every reservation holds it shared.
struct Seat {
    claim: Mutex<()>,
    value: AtomicU32,
}

/// A reservable grid of seats identified by a numeric id.
///
/// Geometry is fixed at creation. The reservation counter never decreases;
/// ids consumed by failed attempts are not reused.
pub struct Event {
    id: EventId,
    rows: u64,
    cols: u64,
    grid_lock: RwLock<()>,
    seats: Vec<Seat>,
    counter: AtomicU32,
    access_delay: Duration,
}

impl Event {
    /// Build a fully initialized event with an all-free grid.
    ///
    /// `seat_count` is rows×cols, already validated by the store.
    pub(crate) fn new(
        id: EventId,
        rows: u64,
        cols: u64,
        seat_count: usize,
        access_delay: Duration,
    ) -> Self {
        let mut seats = Vec::with_capacity(seat_count);
        seats.resize_with(seat_count, || Seat {
            claim: Mutex::new(()),
            value: AtomicU32::new(0),
        });
        Self {
            id,
            rows,
            cols,
            grid_lock: RwLock::new(()),
            seats,
            counter: AtomicU32::new(0),
            access_delay,
        }
    }

    /// The caller-assigned identifier.
    pub fn id(&self) -> EventId {
        self.id
    }

    /// Number of rows in the grid.
    pub fn rows(&self) -> u64 {
        self.rows
    }

    /// Number of columns in the grid.
    pub fn cols(&self) -> u64 {
        self.cols
    }

    /// Highest reservation id issued so far (including burned ids).
    pub fn last_reservation_id(&self) -> u32 {
        self.counter.load(Ordering::SeqCst)
    }

    /// Atomically claim every listed seat under a fresh reservation id.
    ///
    /// Seats are sorted by (row, col) before locking so every request
    /// acquires seat mutexes in the same global total order; a duplicate
    /// pair surfacing after the sort is `Invalid`. The new id is allocated
    /// before the claim loop and is consumed even when the reservation
    /// fails.
    ///
    /// On any failure every seat claimed within this call is rolled back to
    /// free before the error is returned.
    pub fn reserve(&self, seats: &[SeatCoord]) -> Result<ReservationId> {
        if seats.is_empty() {
            return Err(Error::Invalid("empty reservation request".into()));
        }
        if seats.len() > MAX_RESERVATION_SIZE {
            return Err(Error::Invalid(format!(
                "reservation of {} seats exceeds the maximum of {MAX_RESERVATION_SIZE}",
                seats.len()
            )));
        }

        let mut sorted = seats.to_vec();
        sorted.sort_unstable();
        if sorted.windows(2).any(|pair| pair[0] == pair[1]) {
            return Err(Error::Invalid("duplicate seat in request".into()));
        }

        // Shared: disjoint reservations proceed in parallel, show excluded.
        let _grid = self.grid_lock.read();

        let id = self.counter.fetch_add(1, Ordering::SeqCst) + 1;

        let mut claimed: Vec<(usize, MutexGuard<'_, ()>)> = Vec::with_capacity(sorted.len());
        let mut failure = None;
        for &(row, col) in &sorted {
            if row < 1 || row > self.rows || col < 1 || col > self.cols {
                failure = Some(Error::Invalid(format!("seat ({row},{col}) out of range")));
                break;
            }
            let index = self.seat_index(row, col);
            let seat = &self.seats[index];
            let guard = seat.claim.lock();
            self.simulate_access();
            if seat.value.load(Ordering::SeqCst) != 0 {
                drop(guard);
                failure = Some(Error::Conflict { row, col });
                break;
            }
            self.simulate_access();
            seat.value.store(id, Ordering::SeqCst);
            claimed.push((index, guard));
        }

        if let Some(err) = failure {
            for (index, guard) in claimed.into_iter().rev() {
                self.simulate_access();
                self.seats[index].value.store(0, Ordering::SeqCst);
                drop(guard);
            }
            debug!(event = %self.id, reservation = id, error = %err, "reservation rolled back");
            return Err(err);
        }

        debug!(event = %self.id, reservation = id, seats = sorted.len(), "seats reserved");
        Ok(ReservationId(id))
    }

    /// Read a stable snapshot of the whole grid in row-major order.
    ///
    /// Takes the event lock exclusively so no reservation is mid-flight
    /// while the grid is read. Never mutates.
    pub fn snapshot(&self) -> Grid {
        let _grid = self.grid_lock.write();
        let mut seats = Vec::with_capacity(self.seats.len());
        for seat in &self.seats {
            self.simulate_access();
            seats.push(seat.value.load(Ordering::SeqCst));
        }
        Grid {
            rows: self.rows,
            cols: self.cols,
            seats,
        }
    }

    fn seat_index(&self, row: u64, col: u64) -> usize {
        ((row - 1) * self.cols + (col - 1)) as usize
    }

    // Models a costly backing store; applied on every seat access.
    fn simulate_access(&self) {
        if !self.access_delay.is_zero() {
            std::thread::sleep(self.access_delay);
        }
    }
}

/// A point-in-time copy of an event's grid, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    /// Number of rows.
    pub rows: u64,
    /// Number of columns.
    pub cols: u64,
    /// rows×cols seat values: `0` free, otherwise the holding reservation id.
    pub seats: Vec<u32>,
}

impl Grid {
    /// Seat value at a 1-based (row, col) coordinate.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate lies outside the grid.
    pub fn seat(&self, row: u64, col: u64) -> u32 {
        debug_assert!(
            (1..=self.rows).contains(&row) && (1..=self.cols).contains(&col),
            "seat ({row},{col}) outside {}x{} grid",
            self.rows,
            self.cols
        );
        self.seats[((row - 1) * self.cols + (col - 1)) as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(rows: u64, cols: u64) -> Event {
        Event::new(EventId(1), rows, cols, (rows * cols) as usize, Duration::ZERO)
    }

    #[test]
    fn fresh_event_is_all_free() {
        let ev = event(2, 3);
        let grid = ev.snapshot();
        assert_eq!(grid.rows, 2);
        assert_eq!(grid.cols, 3);
        assert!(grid.seats.iter().all(|&s| s == 0));
    }

    #[test]
    fn reserve_stamps_every_seat_with_one_fresh_id() {
        let ev = event(2, 2);
        let id = ev.reserve(&[(1, 1), (1, 2)]).unwrap();
        assert_eq!(id, ReservationId(1));
        let grid = ev.snapshot();
        assert_eq!(grid.seat(1, 1), 1);
        assert_eq!(grid.seat(1, 2), 1);
        assert_eq!(grid.seat(2, 1), 0);

        let next = ev.reserve(&[(2, 1)]).unwrap();
        assert!(next > id);
    }

    #[test]
    fn empty_request_is_invalid() {
        let ev = event(1, 1);
        assert!(matches!(ev.reserve(&[]), Err(Error::Invalid(_))));
    }

    #[test]
    fn duplicate_seat_is_invalid_even_unsorted() {
        let ev = event(3, 3);
        let err = ev.reserve(&[(2, 1), (1, 1), (2, 1)]).unwrap_err();
        assert!(matches!(err, Error::Invalid(_)));
        assert!(ev.snapshot().seats.iter().all(|&s| s == 0));
    }

    #[test]
    fn out_of_range_seat_rolls_back_earlier_claims() {
        let ev = event(2, 2);
        let err = ev.reserve(&[(1, 1), (3, 1)]).unwrap_err();
        assert!(matches!(err, Error::Invalid(_)));
        // (1,1) was claimed before the bounds failure and must be free again.
        assert_eq!(ev.snapshot().seat(1, 1), 0);
    }

    #[test]
    fn conflict_rolls_back_and_burns_the_id() {
        let ev = event(2, 2);
        ev.reserve(&[(2, 2)]).unwrap();

        let err = ev.reserve(&[(1, 1), (2, 2)]).unwrap_err();
        assert!(matches!(err, Error::Conflict { row: 2, col: 2 }));
        let grid = ev.snapshot();
        assert_eq!(grid.seat(1, 1), 0);
        assert_eq!(grid.seat(2, 2), 1);

        // The failed attempt consumed id 2; the next success gets 3.
        assert_eq!(ev.reserve(&[(1, 1)]).unwrap(), ReservationId(3));
    }

    #[test]
    #[should_panic(expected = "outside")]
    fn seat_lookup_outside_the_grid_panics() {
        let ev = event(2, 2);
        let _ = ev.snapshot().seat(3, 1);
    }

    #[test]
    fn zero_coordinates_are_invalid() {
        let ev = event(2, 2);
        assert!(matches!(ev.reserve(&[(0, 1)]), Err(Error::Invalid(_))));
        assert!(matches!(ev.reserve(&[(1, 0)]), Err(Error::Invalid(_))));
    }
}
