//! Typed encode/decode of the fixed-layout session protocol
//!
//! Replaces raw byte-copy marshalling with a typed request/response layer:
//! every frame is an opcode byte plus fixed-width little-endian fields, and
//! every decode validates lengths and counts before allocating, so a
//! malformed frame can never drive an out-of-bounds copy.
//!
//! Responses carry no opcode: the reader knows the expected shape from the
//! request it sent, so each response shape has its own read/write pair.

use std::io::{self, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use reserva_core::limits::{CHANNEL_NAME_LEN, MAX_EVENTS, MAX_GRID_SEATS, MAX_RESERVATION_SIZE};
use reserva_core::{Error as CoreError, EventId, SeatCoord};

/// Result alias for codec operations.
pub type WireResult<T> = std::result::Result<T, WireError>;

/// Errors produced while encoding or decoding frames.
#[derive(Debug, thiserror::Error)]
pub enum WireError {
    /// Underlying channel read/write failure.
    #[error("i/o failure: {0}")]
    Io(#[from] io::Error),

    /// The opcode byte does not name any operation.
    #[error("unknown opcode {0}")]
    UnknownOpcode(u8),

    /// A structurally valid opcode arrived on the wrong channel
    /// (e.g. a Setup frame on an established session).
    #[error("unexpected opcode {0:?}")]
    UnexpectedOpcode(Opcode),

    /// The status field does not name any status.
    #[error("unknown status code {0}")]
    UnknownStatus(i32),

    /// A field violates the protocol limits.
    #[error("invalid frame: {0}")]
    InvalidFrame(String),
}

/// Wire opcodes, one byte on the channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    /// Open a session: two channel-name fields follow.
    Setup = 1,
    /// Close the session. No payload.
    Quit = 2,
    /// Create an event.
    Create = 3,
    /// Reserve seats.
    Reserve = 4,
    /// Snapshot an event's grid.
    Show = 5,
    /// List all event ids.
    List = 6,
}

impl Opcode {
    fn from_u8(byte: u8) -> WireResult<Self> {
        match byte {
            1 => Ok(Opcode::Setup),
            2 => Ok(Opcode::Quit),
            3 => Ok(Opcode::Create),
            4 => Ok(Opcode::Reserve),
            5 => Ok(Opcode::Show),
            6 => Ok(Opcode::List),
            other => Err(WireError::UnknownOpcode(other)),
        }
    }
}

/// Response status, one code per error-taxonomy variant.
///
/// Clients treat any non-zero value as failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Status {
    /// Operation succeeded.
    Ok = 0,
    /// Create on a live id.
    AlreadyExists = 1,
    /// Unknown event id.
    NotFound = 2,
    /// Malformed request.
    Invalid = 3,
    /// Seat already held.
    Conflict = 4,
    /// Resource exhaustion.
    AllocFailure = 5,
    /// Channel failure reported by the server.
    Io = 6,
}

impl Status {
    /// Whether this status signals success.
    pub fn is_ok(self) -> bool {
        self == Status::Ok
    }

    fn from_i32(code: i32) -> WireResult<Self> {
        match code {
            0 => Ok(Status::Ok),
            1 => Ok(Status::AlreadyExists),
            2 => Ok(Status::NotFound),
            3 => Ok(Status::Invalid),
            4 => Ok(Status::Conflict),
            5 => Ok(Status::AllocFailure),
            6 => Ok(Status::Io),
            other => Err(WireError::UnknownStatus(other)),
        }
    }
}

impl From<&CoreError> for Status {
    fn from(err: &CoreError) -> Self {
        match err {
            CoreError::AlreadyExists(_) => Status::AlreadyExists,
            CoreError::NotFound(_) => Status::NotFound,
            CoreError::Invalid(_) => Status::Invalid,
            CoreError::Conflict { .. } => Status::Conflict,
            CoreError::AllocFailure(_) => Status::AllocFailure,
            CoreError::Io(_) => Status::Io,
        }
    }
}

/// Session handshake read from the rendezvous channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SetupRequest {
    /// Name of the channel the client will write requests to.
    pub request_channel: String,
    /// Name of the channel the client will read responses from.
    pub response_channel: String,
}

/// One request on an established session channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Close the session.
    Quit,
    /// Create an event.
    Create {
        /// Caller-assigned event id.
        event_id: EventId,
        /// Number of rows.
        rows: u64,
        /// Number of columns.
        cols: u64,
    },
    /// Reserve seats on an event.
    Reserve {
        /// Target event.
        event_id: EventId,
        /// 1-indexed (row, col) pairs; at most `MAX_RESERVATION_SIZE`.
        seats: Vec<SeatCoord>,
    },
    /// Snapshot an event's grid.
    Show {
        /// Target event.
        event_id: EventId,
    },
    /// List all event ids.
    List,
}

/// A grid carried in a successful SHOW response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridFrame {
    /// Number of rows.
    pub rows: u64,
    /// Number of columns.
    pub cols: u64,
    /// rows×cols seat values, row-major.
    pub seats: Vec<u32>,
}

// ---------------------------------------------------------------------------
// Handshake
// ---------------------------------------------------------------------------

/// Encode a Setup frame onto the rendezvous channel.
///
/// The rendezvous channel is shared by every connecting client, so the
/// whole frame is staged locally and handed to the transport in a single
/// write: per-call atomicity (see [`Transport`](crate::transport::Transport))
/// keeps concurrent handshakes from interleaving.
pub fn write_setup(w: &mut impl Write, setup: &SetupRequest) -> WireResult<()> {
    let mut frame = Vec::with_capacity(1 + 2 * CHANNEL_NAME_LEN);
    frame.push(Opcode::Setup as u8);
    write_name_field(&mut frame, &setup.request_channel)?;
    write_name_field(&mut frame, &setup.response_channel)?;
    w.write_all(&frame)?;
    w.flush()?;
    Ok(())
}

/// Decode the next Setup frame from the rendezvous channel.
pub fn read_setup(r: &mut impl Read) -> WireResult<SetupRequest> {
    let opcode = Opcode::from_u8(r.read_u8()?)?;
    if opcode != Opcode::Setup {
        return Err(WireError::UnexpectedOpcode(opcode));
    }
    Ok(SetupRequest {
        request_channel: read_name_field(r)?,
        response_channel: read_name_field(r)?,
    })
}

/// Session id written by the server right after opening the session.
pub fn write_session_id(w: &mut impl Write, session_id: u32) -> WireResult<()> {
    w.write_u32::<LittleEndian>(session_id)?;
    w.flush()?;
    Ok(())
}

/// Read the server-assigned session id.
pub fn read_session_id(r: &mut impl Read) -> WireResult<u32> {
    Ok(r.read_u32::<LittleEndian>()?)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Encode a request onto a session channel.
pub fn write_request(w: &mut impl Write, request: &Request) -> WireResult<()> {
    match request {
        Request::Quit => {
            w.write_u8(Opcode::Quit as u8)?;
        }
        Request::Create {
            event_id,
            rows,
            cols,
        } => {
            w.write_u8(Opcode::Create as u8)?;
            w.write_u32::<LittleEndian>(event_id.0)?;
            w.write_u64::<LittleEndian>(*rows)?;
            w.write_u64::<LittleEndian>(*cols)?;
        }
        Request::Reserve { event_id, seats } => {
            if seats.len() > MAX_RESERVATION_SIZE {
                return Err(WireError::InvalidFrame(format!(
                    "{} seats exceed the reservation maximum",
                    seats.len()
                )));
            }
            w.write_u8(Opcode::Reserve as u8)?;
            w.write_u32::<LittleEndian>(event_id.0)?;
            w.write_u64::<LittleEndian>(seats.len() as u64)?;
            // Fixed-size frame: the full seat array is always transmitted.
            for &(row, col) in seats {
                w.write_u64::<LittleEndian>(row)?;
                w.write_u64::<LittleEndian>(col)?;
            }
            for _ in seats.len()..MAX_RESERVATION_SIZE {
                w.write_u64::<LittleEndian>(0)?;
                w.write_u64::<LittleEndian>(0)?;
            }
        }
        Request::Show { event_id } => {
            w.write_u8(Opcode::Show as u8)?;
            w.write_u32::<LittleEndian>(event_id.0)?;
        }
        Request::List => {
            w.write_u8(Opcode::List as u8)?;
        }
    }
    w.flush()?;
    Ok(())
}

/// Decode the next request from a session channel.
pub fn read_request(r: &mut impl Read) -> WireResult<Request> {
    let opcode = Opcode::from_u8(r.read_u8()?)?;
    match opcode {
        Opcode::Setup => Err(WireError::UnexpectedOpcode(opcode)),
        Opcode::Quit => Ok(Request::Quit),
        Opcode::Create => Ok(Request::Create {
            event_id: EventId(r.read_u32::<LittleEndian>()?),
            rows: r.read_u64::<LittleEndian>()?,
            cols: r.read_u64::<LittleEndian>()?,
        }),
        Opcode::Reserve => {
            let event_id = EventId(r.read_u32::<LittleEndian>()?);
            let count = r.read_u64::<LittleEndian>()?;
            if count > MAX_RESERVATION_SIZE as u64 {
                return Err(WireError::InvalidFrame(format!(
                    "seat count {count} exceeds the reservation maximum"
                )));
            }
            let mut seats = Vec::with_capacity(count as usize);
            for slot in 0..MAX_RESERVATION_SIZE as u64 {
                let row = r.read_u64::<LittleEndian>()?;
                let col = r.read_u64::<LittleEndian>()?;
                if slot < count {
                    seats.push((row, col));
                }
            }
            Ok(Request::Reserve { event_id, seats })
        }
        Opcode::Show => Ok(Request::Show {
            event_id: EventId(r.read_u32::<LittleEndian>()?),
        }),
        Opcode::List => Ok(Request::List),
    }
}

// ---------------------------------------------------------------------------
// Responses
// ---------------------------------------------------------------------------

/// Encode a bare status response (CREATE, RESERVE).
pub fn write_status(w: &mut impl Write, status: Status) -> WireResult<()> {
    w.write_i32::<LittleEndian>(status as i32)?;
    w.flush()?;
    Ok(())
}

/// Decode a bare status response.
pub fn read_status(r: &mut impl Read) -> WireResult<Status> {
    Status::from_i32(r.read_i32::<LittleEndian>()?)
}

/// Encode a SHOW response: status, then the grid on success.
pub fn write_show_response(
    w: &mut impl Write,
    response: Result<&GridFrame, Status>,
) -> WireResult<()> {
    match response {
        Ok(grid) => {
            let expected = grid
                .rows
                .checked_mul(grid.cols)
                .and_then(|n| usize::try_from(n).ok())
                .filter(|&n| n <= MAX_GRID_SEATS)
                .ok_or_else(|| {
                    WireError::InvalidFrame(format!("grid {}x{} too large", grid.rows, grid.cols))
                })?;
            if grid.seats.len() != expected {
                return Err(WireError::InvalidFrame(format!(
                    "grid carries {} seats, geometry says {expected}",
                    grid.seats.len()
                )));
            }
            w.write_i32::<LittleEndian>(Status::Ok as i32)?;
            w.write_u64::<LittleEndian>(grid.rows)?;
            w.write_u64::<LittleEndian>(grid.cols)?;
            for &seat in &grid.seats {
                w.write_u32::<LittleEndian>(seat)?;
            }
        }
        Err(status) => {
            if status.is_ok() {
                return Err(WireError::InvalidFrame(
                    "failure response with Ok status".into(),
                ));
            }
            w.write_i32::<LittleEndian>(status as i32)?;
        }
    }
    w.flush()?;
    Ok(())
}

/// Decode a SHOW response.
pub fn read_show_response(r: &mut impl Read) -> WireResult<Result<GridFrame, Status>> {
    let status = read_status(r)?;
    if !status.is_ok() {
        return Ok(Err(status));
    }
    let rows = r.read_u64::<LittleEndian>()?;
    let cols = r.read_u64::<LittleEndian>()?;
    let seat_count = rows
        .checked_mul(cols)
        .and_then(|n| usize::try_from(n).ok())
        .filter(|&n| n <= MAX_GRID_SEATS)
        .ok_or_else(|| WireError::InvalidFrame(format!("grid {rows}x{cols} too large")))?;
    let mut seats = Vec::with_capacity(seat_count);
    for _ in 0..seat_count {
        seats.push(r.read_u32::<LittleEndian>()?);
    }
    Ok(Ok(GridFrame { rows, cols, seats }))
}

/// Encode a LIST response: status, count, then the ids.
pub fn write_list_response(
    w: &mut impl Write,
    response: Result<&[EventId], Status>,
) -> WireResult<()> {
    match response {
        Ok(ids) => {
            w.write_i32::<LittleEndian>(Status::Ok as i32)?;
            w.write_u64::<LittleEndian>(ids.len() as u64)?;
            for id in ids {
                w.write_u32::<LittleEndian>(id.0)?;
            }
        }
        Err(status) => {
            if status.is_ok() {
                return Err(WireError::InvalidFrame(
                    "failure response with Ok status".into(),
                ));
            }
            w.write_i32::<LittleEndian>(status as i32)?;
        }
    }
    w.flush()?;
    Ok(())
}

/// Decode a LIST response.
pub fn read_list_response(r: &mut impl Read) -> WireResult<Result<Vec<EventId>, Status>> {
    let status = read_status(r)?;
    if !status.is_ok() {
        return Ok(Err(status));
    }
    let count = r.read_u64::<LittleEndian>()?;
    if count > MAX_EVENTS as u64 {
        return Err(WireError::InvalidFrame(format!(
            "event count {count} exceeds the store capacity"
        )));
    }
    let mut ids = Vec::with_capacity(count as usize);
    for _ in 0..count {
        ids.push(EventId(r.read_u32::<LittleEndian>()?));
    }
    Ok(Ok(ids))
}

// ---------------------------------------------------------------------------
// Fixed-width name fields
// ---------------------------------------------------------------------------

fn write_name_field(w: &mut impl Write, name: &str) -> WireResult<()> {
    if name.len() > CHANNEL_NAME_LEN {
        return Err(WireError::InvalidFrame(format!(
            "channel name longer than {CHANNEL_NAME_LEN} bytes"
        )));
    }
    if name.as_bytes().contains(&0) {
        return Err(WireError::InvalidFrame("channel name contains NUL".into()));
    }
    let mut field = [0u8; CHANNEL_NAME_LEN];
    field[..name.len()].copy_from_slice(name.as_bytes());
    w.write_all(&field)?;
    Ok(())
}

fn read_name_field(r: &mut impl Read) -> WireResult<String> {
    let mut field = [0u8; CHANNEL_NAME_LEN];
    r.read_exact(&mut field)?;
    let end = field.iter().position(|&b| b == 0).unwrap_or(CHANNEL_NAME_LEN);
    String::from_utf8(field[..end].to_vec())
        .map_err(|_| WireError::InvalidFrame("channel name is not valid UTF-8".into()))
}
