//! WebSocket message types exchanged with game clients.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::dto::{
    phase::VisibleRoomPhase,
    room::{
        AttemptCounts, FeedbackSnapshot, ParticipantPair, RevealedSecrets, RoomSnapshot,
        SeriesScore, SlotId,
    },
    validation::{validate_avatar, validate_code_digits, validate_display_name,
        validate_room_code},
};

/// Messages accepted from player WebSocket clients.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Open a new room and take Slot One.
    #[serde(rename = "create-room")]
    CreateRoom {
        /// Display name; defaults per slot when blank or absent.
        name: Option<String>,
        /// Avatar glyph; defaults when absent.
        avatar: Option<String>,
    },
    /// Join an existing room as Slot Two.
    #[serde(rename = "join-room")]
    JoinRoom {
        /// Room code (normalized to uppercase before lookup).
        code: String,
        /// Display name; defaults per slot when blank or absent.
        name: Option<String>,
        /// Avatar glyph; defaults when absent.
        avatar: Option<String>,
    },
    /// Commit this round's secret.
    #[serde(rename = "set-secret")]
    SetSecret {
        /// The secret digit string.
        secret: String,
    },
    /// Submit a guess against the opponent's secret.
    #[serde(rename = "submit-guess")]
    SubmitGuess {
        /// The guessed digit string.
        guess: String,
    },
    /// Vote for a rematch after a finished round.
    #[serde(rename = "play-again")]
    PlayAgain,
    /// Voluntarily leave the room.
    #[serde(rename = "exit-room")]
    ExitRoom,
    /// Any unrecognized message type.
    #[serde(other)]
    Unknown,
}

/// Error raised when an inbound frame cannot be turned into a valid message.
#[derive(Debug, Error)]
pub enum MessageParseError {
    /// The frame was not valid JSON for any known message.
    #[error("malformed message: {0}")]
    Json(#[from] serde_json::Error),
    /// The message parsed but one of its fields is invalid.
    #[error("invalid message: {0}")]
    Validation(#[from] ValidationErrors),
}

impl ClientMessage {
    /// Parse and validate a raw text frame.
    pub fn from_json_str(payload: &str) -> Result<Self, MessageParseError> {
        let message: Self = serde_json::from_str(payload)?;
        message.validate()?;
        Ok(message)
    }
}

impl Validate for ClientMessage {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        match self {
            ClientMessage::CreateRoom { name, avatar } => {
                validate_identity(&mut errors, name.as_deref(), avatar.as_deref());
            }
            ClientMessage::JoinRoom { code, name, avatar } => {
                if let Err(e) = validate_room_code(code) {
                    errors.add("code", e);
                }
                validate_identity(&mut errors, name.as_deref(), avatar.as_deref());
            }
            ClientMessage::SetSecret { secret } => {
                if let Err(e) = validate_code_digits(secret) {
                    errors.add("secret", e);
                }
            }
            ClientMessage::SubmitGuess { guess } => {
                if let Err(e) = validate_code_digits(guess) {
                    errors.add("guess", e);
                }
            }
            ClientMessage::PlayAgain | ClientMessage::ExitRoom | ClientMessage::Unknown => {}
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

fn validate_identity(errors: &mut ValidationErrors, name: Option<&str>, avatar: Option<&str>) {
    if let Some(name) = name {
        if let Err(e) = validate_display_name(name) {
            errors.add("name", e);
        }
    }
    if let Some(avatar) = avatar {
        if let Err(e) = validate_avatar(avatar) {
            errors.add("avatar", e);
        }
    }
}

/// Messages pushed to player WebSocket clients.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(tag = "type")]
pub enum ServerMessage {
    /// The room was opened and the creator seated in Slot One.
    #[serde(rename = "room-created")]
    RoomCreated {
        /// Slot assigned to the recipient.
        slot: SlotId,
        /// Full room snapshot.
        #[serde(flatten)]
        room: RoomSnapshot,
    },
    /// The recipient joined an existing room as Slot Two.
    #[serde(rename = "room-joined")]
    RoomJoined {
        /// Slot assigned to the recipient.
        slot: SlotId,
        /// Full room snapshot.
        #[serde(flatten)]
        room: RoomSnapshot,
    },
    /// The opponent took Slot Two.
    #[serde(rename = "player-joined")]
    PlayerJoined {
        /// Slot that joined.
        slot: SlotId,
        /// Updated participant details.
        participants: ParticipantPair,
    },
    /// The recipient's secret was stored.
    #[serde(rename = "secret-set")]
    SecretSet {
        /// Slot whose secret was stored.
        slot: SlotId,
        /// True while the opponent's secret is still missing.
        waiting_for_opponent: bool,
    },
    /// The opponent committed their secret.
    #[serde(rename = "opponent-secret-set")]
    OpponentSecretSet {
        /// Slot that committed.
        slot: SlotId,
    },
    /// Both secrets are in; the round has started.
    #[serde(rename = "game-start")]
    GameStart {
        /// Slot to move first (always Slot One).
        current_turn: SlotId,
        /// Participant details for display.
        participants: ParticipantPair,
    },
    /// A guess was recorded, with its feedback.
    #[serde(rename = "guess-submitted")]
    GuessSubmitted {
        /// Slot that guessed.
        slot: SlotId,
        /// The submitted digits.
        guess: String,
        /// Positional feedback.
        feedback: FeedbackSnapshot,
        /// Guesser's attempt count after this guess.
        attempts: u32,
        /// Whether the guess matched the secret exactly.
        full_match: bool,
    },
    /// Slot One matched; Slot Two gets one final guess before the round is
    /// decided.
    #[serde(rename = "player1-final-chance")]
    FinalChance {
        /// Slot granted the final guess.
        current_turn: SlotId,
        /// Attempt counts so far.
        attempts: AttemptCounts,
    },
    /// The round is over.
    #[serde(rename = "game-over")]
    GameOver {
        /// Winning slot, absent on a tie.
        winner: Option<SlotId>,
        /// True when both matched within the fair-play window.
        tie: bool,
        /// Final attempt counts.
        attempts: AttemptCounts,
        /// Both secrets, revealed.
        secrets: RevealedSecrets,
        /// Updated series score.
        series_score: SeriesScore,
    },
    /// Turn passed to the other slot.
    #[serde(rename = "turn-changed")]
    TurnChanged {
        /// Slot to move next.
        current_turn: SlotId,
        /// Attempt counts so far.
        attempts: AttemptCounts,
    },
    /// The recipient's rematch vote was registered; opponent pending.
    #[serde(rename = "waiting-for-rematch")]
    WaitingForRematch,
    /// The opponent voted for a rematch.
    #[serde(rename = "opponent-wants-rematch")]
    OpponentWantsRematch {
        /// Slot that voted.
        slot: SlotId,
    },
    /// Rematch consensus reached; round state was reset.
    #[serde(rename = "game-reset")]
    GameReset {
        /// Series score preserved across the reset.
        series_score: SeriesScore,
        /// Phase after the reset (secret setup).
        phase: VisibleRoomPhase,
    },
    /// The opponent left or lost their connection.
    #[serde(rename = "player-disconnected")]
    PlayerDisconnected {
        /// Slot that went away.
        slot: SlotId,
    },
    /// A request failed; sent only to the offending connection.
    #[serde(rename = "room-error")]
    RoomError {
        /// Stable kebab-case error discriminant.
        reason: String,
        /// Human-readable description.
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_room_parses_with_optional_fields() {
        let message =
            ClientMessage::from_json_str(r#"{"type":"create-room","name":"Alice"}"#).unwrap();
        assert!(matches!(
            message,
            ClientMessage::CreateRoom { name: Some(_), avatar: None }
        ));
    }

    #[test]
    fn join_room_requires_a_plausible_code() {
        let err = ClientMessage::from_json_str(r#"{"type":"join-room","code":"***"}"#);
        assert!(matches!(err, Err(MessageParseError::Validation(_))));

        assert!(
            ClientMessage::from_json_str(r#"{"type":"join-room","code":"abc123"}"#).is_ok()
        );
    }

    #[test]
    fn guesses_must_be_digits() {
        let err = ClientMessage::from_json_str(r#"{"type":"submit-guess","guess":"12a4"}"#);
        assert!(matches!(err, Err(MessageParseError::Validation(_))));
    }

    #[test]
    fn unknown_types_parse_to_unknown() {
        let message = ClientMessage::from_json_str(r#"{"type":"dance"}"#).unwrap();
        assert!(matches!(message, ClientMessage::Unknown));
    }

    #[test]
    fn garbage_is_a_json_error() {
        let err = ClientMessage::from_json_str("not json");
        assert!(matches!(err, Err(MessageParseError::Json(_))));
    }

    #[test]
    fn server_messages_carry_their_type_tag() {
        let payload = serde_json::to_value(ServerMessage::WaitingForRematch).unwrap();
        assert_eq!(payload["type"], "waiting-for-rematch");

        let payload = serde_json::to_value(ServerMessage::PlayerDisconnected {
            slot: SlotId::Two,
        })
        .unwrap();
        assert_eq!(payload["type"], "player-disconnected");
        assert_eq!(payload["slot"], "two");
    }
}
