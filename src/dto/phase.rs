use serde::Serialize;
use utoipa::ToSchema;

use crate::state::session::RoomPhase;

/// Publicly visible room phase exposed to clients.
#[derive(Debug, Serialize, ToSchema, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum VisibleRoomPhase {
    /// Waiting for an opponent to join.
    Matchmaking,
    /// Both participants are committing their secrets.
    SecretSetup,
    /// Turn-taking guesses are in progress.
    Playing,
    /// The round has been decided.
    Finished,
}

impl From<RoomPhase> for VisibleRoomPhase {
    fn from(value: RoomPhase) -> Self {
        match value {
            RoomPhase::Matchmaking => VisibleRoomPhase::Matchmaking,
            RoomPhase::SecretSetup => VisibleRoomPhase::SecretSetup,
            RoomPhase::Playing => VisibleRoomPhase::Playing,
            RoomPhase::Finished => VisibleRoomPhase::Finished,
        }
    }
}
