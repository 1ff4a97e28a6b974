//! Typed client for the session protocol
//!
//! A [`Client`] owns one session: it creates its two channels, sends the
//! Setup frame on the rendezvous channel, reads back the server-assigned
//! session id and then issues requests one at a time, each followed by its
//! fixed-size response. Server-side rejections surface as
//! [`ClientError::Remote`] carrying the status code.

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::io;

use reserva_core::{EventId, SeatCoord};
use reserva_wire::{
    read_list_response, read_session_id, read_show_response, read_status, write_request,
    write_setup, GridFrame, Request, SetupRequest, Status, Transport, WireError,
};
use tracing::{debug, info};

/// Errors surfaced to client callers.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Channel setup failure.
    #[error("i/o failure: {0}")]
    Io(#[from] io::Error),

    /// Encode/decode or channel failure mid-session.
    #[error("wire failure: {0}")]
    Wire(#[from] WireError),

    /// The server rejected the operation with this status.
    #[error("server rejected the operation: {0:?}")]
    Remote(Status),
}

/// Result alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// One client session over a [`Transport`].
pub struct Client<T: Transport> {
    requests: T::Writer,
    responses: T::Reader,
    session_id: u32,
    quit_sent: bool,
}

impl<T: Transport> Client<T> {
    /// Open a session: create both channels, hand their names to the
    /// server on the rendezvous channel and read the session id.
    pub fn connect(
        transport: &T,
        rendezvous: &str,
        request_channel: &str,
        response_channel: &str,
    ) -> ClientResult<Self> {
        transport.create(request_channel)?;
        transport.create(response_channel)?;

        let mut handshake = transport.open_writer(rendezvous)?;
        write_setup(
            &mut handshake,
            &SetupRequest {
                request_channel: request_channel.to_string(),
                response_channel: response_channel.to_string(),
            },
        )?;
        drop(handshake);

        let requests = transport.open_writer(request_channel)?;
        let mut responses = transport.open_reader(response_channel)?;
        let session_id = read_session_id(&mut responses)?;
        info!(session = session_id, "session established");

        Ok(Self {
            requests,
            responses,
            session_id,
            quit_sent: false,
        })
    }

    /// The server-assigned session id (the servicing worker's index).
    pub fn session_id(&self) -> u32 {
        self.session_id
    }

    /// Create an event with a rows×cols grid.
    pub fn create(&mut self, event_id: EventId, rows: u64, cols: u64) -> ClientResult<()> {
        write_request(
            &mut self.requests,
            &Request::Create {
                event_id,
                rows,
                cols,
            },
        )?;
        self.expect_ok()
    }

    /// Reserve a group of seats under one reservation id.
    pub fn reserve(&mut self, event_id: EventId, seats: &[SeatCoord]) -> ClientResult<()> {
        write_request(
            &mut self.requests,
            &Request::Reserve {
                event_id,
                seats: seats.to_vec(),
            },
        )?;
        self.expect_ok()
    }

    /// Fetch a snapshot of an event's grid.
    pub fn show(&mut self, event_id: EventId) -> ClientResult<GridFrame> {
        write_request(&mut self.requests, &Request::Show { event_id })?;
        match read_show_response(&mut self.responses)? {
            Ok(grid) => Ok(grid),
            Err(status) => Err(ClientError::Remote(status)),
        }
    }

    /// Fetch all event ids in creation order.
    pub fn list(&mut self) -> ClientResult<Vec<EventId>> {
        write_request(&mut self.requests, &Request::List)?;
        match read_list_response(&mut self.responses)? {
            Ok(ids) => Ok(ids),
            Err(status) => Err(ClientError::Remote(status)),
        }
    }

    /// Close the session. The server observes the disconnect at its next
    /// opcode read.
    pub fn disconnect(mut self) -> ClientResult<()> {
        write_request(&mut self.requests, &Request::Quit)?;
        self.quit_sent = true;
        debug!(session = self.session_id, "disconnect sent");
        Ok(())
    }

    fn expect_ok(&mut self) -> ClientResult<()> {
        let status = read_status(&mut self.responses)?;
        if status.is_ok() {
            Ok(())
        } else {
            Err(ClientError::Remote(status))
        }
    }
}

impl<T: Transport> Drop for Client<T> {
    fn drop(&mut self) {
        // A session abandoned without disconnect would otherwise pin its
        // worker in the request read forever.
        if !self.quit_sent {
            let _ = write_request(&mut self.requests, &Request::Quit);
        }
    }
}
