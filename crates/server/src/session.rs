//! Active-session request loop
//!
//! One worker drives one session at a time: write the session id, then
//! read opcode + fixed payload, dispatch to the store, write the fixed
//! response, until the disconnect opcode. Per-operation store failures
//! become status responses and the session continues; a channel failure is
//! fatal for the session only.

use std::io::{Read, Write};

use reserva_engine::EventStore;
use reserva_wire::{
    read_request, write_list_response, write_session_id, write_show_response, write_status,
    GridFrame, Request, Status, WireResult,
};
use tracing::{debug, info};

pub(crate) fn serve<R: Read, W: Write>(
    store: &EventStore,
    session_id: u32,
    requests: &mut R,
    responses: &mut W,
) -> WireResult<()> {
    write_session_id(responses, session_id)?;

    loop {
        match read_request(requests)? {
            Request::Quit => {
                info!(session = session_id, "session disconnected");
                return Ok(());
            }
            Request::Create {
                event_id,
                rows,
                cols,
            } => {
                let status = match store.create(event_id, rows, cols) {
                    Ok(()) => Status::Ok,
                    Err(err) => {
                        debug!(session = session_id, error = %err, "create failed");
                        Status::from(&err)
                    }
                };
                write_status(responses, status)?;
            }
            Request::Reserve { event_id, seats } => {
                let status = match store.reserve(event_id, &seats) {
                    Ok(_) => Status::Ok,
                    Err(err) => {
                        debug!(session = session_id, error = %err, "reserve failed");
                        Status::from(&err)
                    }
                };
                write_status(responses, status)?;
            }
            Request::Show { event_id } => match store.show(event_id) {
                Ok(grid) => {
                    let frame = GridFrame {
                        rows: grid.rows,
                        cols: grid.cols,
                        seats: grid.seats,
                    };
                    write_show_response(responses, Ok(&frame))?;
                }
                Err(err) => {
                    debug!(session = session_id, error = %err, "show failed");
                    write_show_response(responses, Err(Status::from(&err)))?;
                }
            },
            Request::List => {
                let ids = store.list();
                write_list_response(responses, Ok(&ids))?;
            }
        }
    }
}
