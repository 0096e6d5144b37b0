//! Room lifecycle: creation, joining, voluntary exit, and disconnects.

use tracing::info;
use uuid::Uuid;

use crate::{
    dto::{
        room::RoomSnapshot,
        ws::ServerMessage,
    },
    error::GameError,
    services::{reaper, ws_events},
    state::{
        SharedState,
        session::{ParticipantInfo, Slot},
    },
};

/// A connection's seat in a room, tracked per socket by the transport layer.
#[derive(Debug, Clone)]
pub struct Seat {
    /// Code of the room the connection sits in.
    pub code: String,
    /// Slot the connection occupies.
    pub slot: Slot,
}

/// Open a new room with the requesting connection seated in Slot One.
pub async fn create_room(
    state: &SharedState,
    conn: Uuid,
    name: Option<String>,
    avatar: Option<String>,
) -> Seat {
    let creator = ParticipantInfo::from_request(Slot::One, name, avatar);
    let (code, session) = state
        .rooms()
        .create(state.config().code_length(), conn, creator);

    {
        let session = session.lock().await;
        ws_events::send_to_connection(
            state,
            conn,
            &ServerMessage::RoomCreated {
                slot: Slot::One.into(),
                room: RoomSnapshot::from(&*session),
            },
        );
    }

    info!(code = %code, conn = %conn, "room created");
    Seat {
        code,
        slot: Slot::One,
    }
}

/// Seat the requesting connection in Slot Two of an existing room.
pub async fn join_room(
    state: &SharedState,
    conn: Uuid,
    code: &str,
    name: Option<String>,
    avatar: Option<String>,
) -> Result<Seat, GameError> {
    let code = code.trim().to_uppercase();
    let session = state
        .rooms()
        .get(&code)
        .ok_or_else(|| GameError::RoomNotFound(code.clone()))?;

    let mut session = session.lock().await;
    let info = ParticipantInfo::from_request(Slot::Two, name, avatar);
    session.join(conn, info)?;

    ws_events::send_to_connection(
        state,
        conn,
        &ServerMessage::RoomJoined {
            slot: Slot::Two.into(),
            room: RoomSnapshot::from(&*session),
        },
    );
    ws_events::send_to_slot(
        state,
        &session,
        Slot::One,
        &ServerMessage::PlayerJoined {
            slot: Slot::Two.into(),
            participants: session.participants().into(),
        },
    );

    info!(code = %code, conn = %conn, "player joined room");
    Ok(Seat {
        code,
        slot: Slot::Two,
    })
}

/// Voluntary exit: vacate the seat, tell the opponent, and delete the room
/// immediately once both seats are empty.
pub async fn exit_room(state: &SharedState, seat: Seat) {
    let Some(session) = state.rooms().get(&seat.code) else {
        return;
    };

    let empty = {
        let mut session = session.lock().await;
        let empty = session.detach(seat.slot);
        ws_events::send_to_slot(
            state,
            &session,
            seat.slot.other(),
            &ServerMessage::PlayerDisconnected {
                slot: seat.slot.into(),
            },
        );
        if empty {
            session.cancel_all_cleanup();
        }
        empty
    };

    if empty {
        state.rooms().remove(&seat.code);
        info!(code = %seat.code, "room deleted (all players left)");
    }
}

/// Transport-originated drop: keep the seat, tell the opponent, and arm the
/// reaper for the grace period.
pub async fn handle_disconnect(state: &SharedState, seat: Seat) {
    let Some(session) = state.rooms().get(&seat.code) else {
        return;
    };

    let mut session = session.lock().await;
    session.clear_connection(seat.slot);
    ws_events::send_to_slot(
        state,
        &session,
        seat.slot.other(),
        &ServerMessage::PlayerDisconnected {
            slot: seat.slot.into(),
        },
    );

    let handle = reaper::schedule_room_cleanup(state, seat.code.clone(), seat.slot);
    session.set_cleanup(seat.slot, handle);

    info!(code = %seat.code, slot = ?seat.slot, "player disconnected; cleanup scheduled");
}
