//! Operator-triggered diagnostic dump
//!
//! A dedicated listener thread blocks on a notification channel; each
//! trigger renders the full event/seat listing to the sink. The trigger is
//! an explicit, cancellable notification rather than a polled flag: an
//! external signal handler only has to call [`DumpHandle::trigger`]. Not
//! part of the client-visible protocol.

use std::io::Write;
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;
use reserva_core::Result;
use reserva_engine::render::render_dump;
use reserva_engine::EventStore;
use tracing::warn;

/// Handle to a running dump listener.
///
/// Dropping the handle (or calling [`stop`](Self::stop)) cancels the
/// listener.
pub struct DumpHandle {
    trigger: Option<Sender<()>>,
    listener: Option<JoinHandle<()>>,
}

/// Spawn the dump listener over a store, writing to `sink`.
pub fn spawn<W: Write + Send + 'static>(
    store: Arc<EventStore>,
    sink: Arc<Mutex<W>>,
) -> Result<DumpHandle> {
    let (trigger, notifications) = mpsc::channel::<()>();
    let listener = thread::Builder::new()
        .name("reserva-dump".into())
        .spawn(move || {
            while notifications.recv().is_ok() {
                let listing = render_dump(&store);
                let mut sink = sink.lock();
                if let Err(err) = sink.write_all(listing.as_bytes()) {
                    warn!(error = %err, "failed to write diagnostic dump");
                }
            }
        })?;
    Ok(DumpHandle {
        trigger: Some(trigger),
        listener: Some(listener),
    })
}

impl DumpHandle {
    /// Request one dump. Returns false if the listener is gone.
    pub fn trigger(&self) -> bool {
        self.trigger
            .as_ref()
            .map(|t| t.send(()).is_ok())
            .unwrap_or(false)
    }

    /// Cancel the listener and wait for it to finish.
    pub fn stop(mut self) {
        self.cancel();
    }

    fn cancel(&mut self) {
        // Disconnecting the channel ends the listener's recv loop.
        drop(self.trigger.take());
        if let Some(listener) = self.listener.take() {
            let _ = listener.join();
        }
    }
}

impl Drop for DumpHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}
