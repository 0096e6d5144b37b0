//! Outbound WebSocket event delivery.
//!
//! All sends are fire-and-forget pushes onto a connection's writer channel;
//! a closed or missing connection is logged and skipped, never an error for
//! the caller.

use axum::extract::ws::Message;
use tokio::sync::mpsc;
use tracing::warn;
use uuid::Uuid;

use crate::{
    dto::ws::ServerMessage,
    error::GameError,
    state::{
        SharedState,
        session::{Session, Slot},
    },
};

/// Serialize a payload and push it onto the provided writer channel.
///
/// Serialization failure is a bug in the message types; it is logged and the
/// frame dropped rather than tearing the connection down.
pub fn send_to_tx(tx: &mpsc::UnboundedSender<Message>, message: &ServerMessage) {
    let payload = match serde_json::to_string(message) {
        Ok(payload) => payload,
        Err(err) => {
            warn!(error = %err, "failed to serialize message `{message:?}`");
            return;
        }
    };

    // A closed writer means the socket is going away; the disconnect path
    // will clean up.
    let _ = tx.send(Message::Text(payload.into()));
}

/// Send a message to a connection by its identifier, if still registered.
pub fn send_to_connection(state: &SharedState, conn: Uuid, message: &ServerMessage) {
    let Some(connection) = state.connections().get(&conn) else {
        warn!(conn = %conn, "cannot deliver message: connection is gone");
        return;
    };

    let tx = connection.tx.clone();
    drop(connection);

    send_to_tx(&tx, message);
}

/// Send a message to the connection currently occupying `slot`, if any.
pub fn send_to_slot(state: &SharedState, session: &Session, slot: Slot, message: &ServerMessage) {
    if let Some(conn) = session.connection(slot) {
        send_to_connection(state, conn, message);
    }
}

/// Send a message to every connected slot of the room.
pub fn broadcast_room(state: &SharedState, session: &Session, message: &ServerMessage) {
    send_to_slot(state, session, Slot::One, message);
    send_to_slot(state, session, Slot::Two, message);
}

/// Deliver a failure to the offending connection only.
pub fn send_error(state: &SharedState, conn: Uuid, error: &GameError) {
    send_to_connection(
        state,
        conn,
        &ServerMessage::RoomError {
            reason: error.reason().to_string(),
            message: error.to_string(),
        },
    );
}
