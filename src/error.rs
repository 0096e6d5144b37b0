//! Error types for the game domain and the HTTP surface.

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use thiserror::Error;

use crate::state::evaluator::LengthMismatch;

/// Errors produced by session operations.
///
/// Every variant is recoverable by the caller: it is delivered as a directed
/// `room-error` message to the offending connection only, never broadcast,
/// and never leaves the session state mutated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// No live session is registered under the given code.
    #[error("room `{0}` not found")]
    RoomNotFound(String),
    /// Both slots of the room are already taken.
    #[error("room is full, maximum 2 players allowed")]
    RoomFull,
    /// The room has moved past matchmaking.
    #[error("game already in progress")]
    GameInProgress,
    /// A guess was submitted out of turn.
    #[error("it is not your turn")]
    NotYourTurn,
    /// A guess was submitted after the round finished.
    #[error("the round is already over")]
    GameOver,
    /// A secret or guess has the wrong number of digits.
    #[error(transparent)]
    LengthMismatch(#[from] LengthMismatch),
    /// Invalid input provided by the client.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Operation cannot be performed in the current phase.
    #[error("invalid state: {0}")]
    InvalidState(String),
}

impl GameError {
    /// Stable kebab-case discriminant carried on `room-error` messages.
    pub fn reason(&self) -> &'static str {
        match self {
            GameError::RoomNotFound(_) => "room-not-found",
            GameError::RoomFull => "room-full",
            GameError::GameInProgress => "game-in-progress",
            GameError::NotYourTurn => "not-your-turn",
            GameError::GameOver => "game-over",
            GameError::LengthMismatch(_) => "length-mismatch",
            GameError::InvalidInput(_) => "invalid-input",
            GameError::InvalidState(_) => "invalid-state",
        }
    }
}

/// Application-level errors that are converted to HTTP responses.
#[derive(Debug, Error)]
pub enum AppError {
    /// Bad request with invalid input.
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Requested resource not found.
    #[error("not found: {0}")]
    NotFound(String),
}

#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
        };

        let payload = Json(ErrorBody {
            message: self.to_string(),
        });

        (status, payload).into_response()
    }
}
