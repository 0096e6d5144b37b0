//! WebSocket connection lifecycle and inbound message dispatch.

use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dto::ws::ClientMessage,
    error::GameError,
    services::{game_service, room_service, room_service::Seat, ws_events},
    state::{PlayerConnection, SharedState},
};

/// Handle the full lifecycle for an individual player WebSocket connection.
pub async fn handle_socket(state: SharedState, socket: WebSocket) {
    let (mut sender, mut receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<Message>();

    // Dedicated writer task keeps outbound messages flowing even while we
    // await inbound frames.
    let writer_task = tokio::spawn(async move {
        while let Some(message) = outbound_rx.recv().await {
            if sender.send(message).await.is_err() {
                break;
            }
        }
    });

    let conn = Uuid::new_v4();
    state.connections().insert(
        conn,
        PlayerConnection {
            id: conn,
            tx: outbound_tx.clone(),
        },
    );
    info!(conn = %conn, "player connected");

    // The seat is transport-local: it is set by create/join, cleared by
    // exit, and drives the disconnect path when the socket goes away.
    let mut seat: Option<Seat> = None;

    while let Some(message) = receiver.next().await {
        match message {
            Ok(Message::Text(text)) => match ClientMessage::from_json_str(&text) {
                Ok(message) => dispatch(&state, conn, &mut seat, message).await,
                Err(err) => {
                    warn!(conn = %conn, error = %err, "failed to parse or validate message");
                    ws_events::send_error(
                        &state,
                        conn,
                        &GameError::InvalidInput(err.to_string()),
                    );
                }
            },
            Ok(Message::Ping(payload)) => {
                let _ = outbound_tx.send(Message::Pong(payload));
            }
            Ok(Message::Close(frame)) => {
                info!(conn = %conn, "player closed");
                let _ = outbound_tx.send(Message::Close(frame));
                break;
            }
            Ok(Message::Binary(_)) => {}
            Ok(Message::Pong(_)) => {}
            Err(err) => {
                warn!(conn = %conn, error = %err, "websocket error");
                break;
            }
        }
    }

    state.connections().remove(&conn);
    if let Some(seat) = seat.take() {
        room_service::handle_disconnect(&state, seat).await;
    }
    info!(conn = %conn, "player disconnected");

    finalize(writer_task, outbound_tx).await;
}

/// Route one validated inbound message to the matching service operation.
///
/// Failures are delivered back to the sending connection only; they never
/// touch session state or the opponent.
async fn dispatch(state: &SharedState, conn: Uuid, seat: &mut Option<Seat>, message: ClientMessage) {
    match message {
        ClientMessage::CreateRoom { name, avatar } => {
            if seat.is_some() {
                already_seated(state, conn);
                return;
            }
            *seat = Some(room_service::create_room(state, conn, name, avatar).await);
        }
        ClientMessage::JoinRoom { code, name, avatar } => {
            if seat.is_some() {
                already_seated(state, conn);
                return;
            }
            match room_service::join_room(state, conn, &code, name, avatar).await {
                Ok(taken) => *seat = Some(taken),
                Err(err) => ws_events::send_error(state, conn, &err),
            }
        }
        ClientMessage::SetSecret { secret } => {
            let Some(seat) = seat.as_ref() else {
                not_seated(state, conn);
                return;
            };
            if let Err(err) = game_service::set_secret(state, seat, &secret).await {
                ws_events::send_error(state, conn, &err);
            }
        }
        ClientMessage::SubmitGuess { guess } => {
            let Some(seat) = seat.as_ref() else {
                not_seated(state, conn);
                return;
            };
            if let Err(err) = game_service::submit_guess(state, seat, &guess).await {
                ws_events::send_error(state, conn, &err);
            }
        }
        ClientMessage::PlayAgain => {
            let Some(seat) = seat.as_ref() else {
                not_seated(state, conn);
                return;
            };
            if let Err(err) = game_service::play_again(state, seat).await {
                ws_events::send_error(state, conn, &err);
            }
        }
        ClientMessage::ExitRoom => {
            if let Some(seat) = seat.take() {
                room_service::exit_room(state, seat).await;
            }
        }
        ClientMessage::Unknown => {
            warn!(conn = %conn, "ignoring unknown message type");
        }
    }
}

fn already_seated(state: &SharedState, conn: Uuid) {
    ws_events::send_error(
        state,
        conn,
        &GameError::InvalidState("already in a room".into()),
    );
}

fn not_seated(state: &SharedState, conn: Uuid) {
    ws_events::send_error(
        state,
        conn,
        &GameError::InvalidState("join a room first".into()),
    );
}

/// Ensure the writer task winds down before we return from the socket handler.
async fn finalize(writer_task: JoinHandle<()>, outbound_tx: mpsc::UnboundedSender<Message>) {
    drop(outbound_tx);
    let _ = writer_task.await;
}
