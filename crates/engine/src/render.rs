//! Textual renderings of grids and event listings
//!
//! These are the exact output formats of the SHOW and LIST operations:
//! a grid is rendered as one line of space-separated seat values per row
//! followed by one blank line; a listing is one `Event: <id>` line per
//! event, or the literal `No events` line when the store is empty.

use std::fmt::Write as _;

use reserva_core::EventId;

use crate::event::Grid;
use crate::store::EventStore;

impl Grid {
    /// Render the grid: rows of space-separated values, then a blank line.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for row in 0..self.rows {
            for col in 0..self.cols {
                if col > 0 {
                    out.push(' ');
                }
                let _ = write!(out, "{}", self.seats[(row * self.cols + col) as usize]);
            }
            out.push('\n');
        }
        out.push('\n');
        out
    }
}

/// Render an event listing in creation order.
pub fn render_listing(ids: &[EventId]) -> String {
    if ids.is_empty() {
        return "No events\n".to_string();
    }
    let mut out = String::new();
    for id in ids {
        let _ = writeln!(out, "Event: {id}");
    }
    out
}

/// Render the full diagnostic dump: every event's id followed by its grid.
///
/// Used by the operator-triggered dump facility; not part of the
/// client-visible protocol.
pub fn render_dump(store: &EventStore) -> String {
    let ids = store.list();
    if ids.is_empty() {
        return "No events\n".to_string();
    }
    let mut out = String::new();
    for id in ids {
        let _ = writeln!(out, "Event: {id}");
        // The event cannot disappear (no deletion), so lookup must succeed.
        if let Ok(event) = store.lookup(id) {
            out.push_str(&event.snapshot().render());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::StoreConfig;

    #[test]
    fn grid_rendering_matches_fixed_format() {
        let store = EventStore::new(StoreConfig::default());
        store.create(EventId(1), 2, 2).unwrap();
        store.reserve(EventId(1), &[(1, 1), (1, 2)]).unwrap();
        let grid = store.show(EventId(1)).unwrap();
        assert_eq!(grid.render(), "1 1\n0 0\n\n");
    }

    #[test]
    fn empty_listing_is_no_events() {
        assert_eq!(render_listing(&[]), "No events\n");
    }

    #[test]
    fn listing_is_one_line_per_event() {
        let ids = [EventId(1), EventId(4)];
        assert_eq!(render_listing(&ids), "Event: 1\nEvent: 4\n");
    }

    #[test]
    fn dump_combines_listing_and_grids() {
        let store = EventStore::new(StoreConfig::default());
        assert_eq!(render_dump(&store), "No events\n");

        store.create(EventId(2), 1, 2).unwrap();
        assert_eq!(render_dump(&store), "Event: 2\n0 0\n\n");
    }
}
