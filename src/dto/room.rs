//! Wire snapshots of session state.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    dto::{format_system_time, phase::VisibleRoomPhase},
    state::{
        evaluator::{DigitStatus, Feedback},
        session::{ParticipantInfo, Session, Slot, SlotPair},
    },
};

/// Wire representation of a participant slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SlotId {
    /// The room creator.
    One,
    /// The joining participant.
    Two,
}

impl From<Slot> for SlotId {
    fn from(value: Slot) -> Self {
        match value {
            Slot::One => SlotId::One,
            Slot::Two => SlotId::Two,
        }
    }
}

impl From<SlotId> for Slot {
    fn from(value: SlotId) -> Self {
        match value {
            SlotId::One => Slot::One,
            SlotId::Two => Slot::Two,
        }
    }
}

/// Wire representation of one participant's display details.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ParticipantSnapshot {
    /// Display name.
    pub name: String,
    /// Avatar glyph.
    pub avatar: String,
}

impl From<&ParticipantInfo> for ParticipantSnapshot {
    fn from(value: &ParticipantInfo) -> Self {
        Self {
            name: value.name.clone(),
            avatar: value.avatar.clone(),
        }
    }
}

/// Both participants' display details.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ParticipantPair {
    /// Slot One's details.
    pub one: ParticipantSnapshot,
    /// Slot Two's details (placeholder values until the slot joins).
    pub two: ParticipantSnapshot,
}

impl From<&SlotPair<ParticipantInfo>> for ParticipantPair {
    fn from(value: &SlotPair<ParticipantInfo>) -> Self {
        Self {
            one: (&value.one).into(),
            two: (&value.two).into(),
        }
    }
}

/// Per-slot guess counts for the current round.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct AttemptCounts {
    /// Slot One's guess count.
    pub one: u32,
    /// Slot Two's guess count.
    pub two: u32,
}

impl From<&SlotPair<u32>> for AttemptCounts {
    fn from(value: &SlotPair<u32>) -> Self {
        Self {
            one: value.one,
            two: value.two,
        }
    }
}

/// Per-slot cumulative win counts for the session.
#[derive(Debug, Clone, Copy, Serialize, ToSchema)]
pub struct SeriesScore {
    /// Rounds won by Slot One.
    pub one: u32,
    /// Rounds won by Slot Two.
    pub two: u32,
}

impl From<&SlotPair<u32>> for SeriesScore {
    fn from(value: &SlotPair<u32>) -> Self {
        Self {
            one: value.one,
            two: value.two,
        }
    }
}

/// Both secrets, revealed when the round is over.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RevealedSecrets {
    /// Slot One's secret.
    pub one: String,
    /// Slot Two's secret.
    pub two: String,
}

impl RevealedSecrets {
    /// Snapshot the committed secrets of a finished round.
    pub fn from_session(session: &Session) -> Self {
        Self {
            one: session.secret(Slot::One).unwrap_or_default().to_string(),
            two: session.secret(Slot::Two).unwrap_or_default().to_string(),
        }
    }
}

/// Wire representation of a per-position digit classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DigitStatusSnapshot {
    /// Right digit, right position.
    Correct,
    /// Digit occurs elsewhere in the secret.
    Present,
    /// Digit not found.
    Absent,
}

impl From<DigitStatus> for DigitStatusSnapshot {
    fn from(value: DigitStatus) -> Self {
        match value {
            DigitStatus::Correct => DigitStatusSnapshot::Correct,
            DigitStatus::Present => DigitStatusSnapshot::Present,
            DigitStatus::Absent => DigitStatusSnapshot::Absent,
        }
    }
}

/// Wire representation of the feedback earned by one guess.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FeedbackSnapshot {
    /// One status per guess position.
    pub statuses: Vec<DigitStatusSnapshot>,
    /// Digits in the right position.
    pub correct_place: usize,
    /// Digits credited at all.
    pub correct_digits: usize,
}

impl From<&Feedback> for FeedbackSnapshot {
    fn from(value: &Feedback) -> Self {
        Self {
            statuses: value.statuses.iter().copied().map(Into::into).collect(),
            correct_place: value.correct_place,
            correct_digits: value.correct_digits,
        }
    }
}

/// Full room snapshot sent to a participant entering a room.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RoomSnapshot {
    /// The room code to share with the opponent.
    pub code: String,
    /// Number of digits in every secret and guess for this room.
    pub code_length: usize,
    /// Current lifecycle phase.
    pub phase: VisibleRoomPhase,
    /// Both participants' display details.
    pub participants: ParticipantPair,
    /// Series score carried across rematches.
    pub series_score: SeriesScore,
    /// When the room was opened (RFC 3339).
    pub created_at: String,
}

impl From<&Session> for RoomSnapshot {
    fn from(session: &Session) -> Self {
        Self {
            code: session.code().to_string(),
            code_length: session.code_length(),
            phase: session.phase().into(),
            participants: session.participants().into(),
            series_score: session.series_score().into(),
            created_at: format_system_time(session.created_at()),
        }
    }
}
