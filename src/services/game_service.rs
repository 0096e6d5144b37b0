//! Gameplay operations: secret commitment, guesses, and rematch votes.

use tracing::info;

use crate::{
    dto::{
        phase::VisibleRoomPhase,
        room::{AttemptCounts, RevealedSecrets, SeriesScore, SlotId},
        ws::ServerMessage,
    },
    error::GameError,
    services::{room_service::Seat, ws_events},
    state::{
        SharedSession, SharedState,
        session::{RematchOutcome, RoundOutcome, RoundProgress, SecretOutcome, Slot},
    },
};

/// Commit the seat's secret for the current round.
pub async fn set_secret(state: &SharedState, seat: &Seat, secret: &str) -> Result<(), GameError> {
    let session = lookup(state, &seat.code)?;
    let mut session = session.lock().await;

    match session.commit_secret(seat.slot, secret)? {
        SecretOutcome::Started => {
            ws_events::broadcast_room(
                state,
                &session,
                &ServerMessage::GameStart {
                    current_turn: session.current_turn().into(),
                    participants: session.participants().into(),
                },
            );
            info!(code = %seat.code, "both secrets committed; round started");
        }
        SecretOutcome::Waiting => {
            ws_events::send_to_slot(
                state,
                &session,
                seat.slot,
                &ServerMessage::SecretSet {
                    slot: seat.slot.into(),
                    waiting_for_opponent: true,
                },
            );
            ws_events::send_to_slot(
                state,
                &session,
                seat.slot.other(),
                &ServerMessage::OpponentSecretSet {
                    slot: seat.slot.into(),
                },
            );
        }
    }

    Ok(())
}

/// Evaluate the seat's guess and advance the round.
pub async fn submit_guess(state: &SharedState, seat: &Seat, guess: &str) -> Result<(), GameError> {
    let session = lookup(state, &seat.code)?;
    let mut session = session.lock().await;

    let outcome = session.submit_guess(seat.slot, guess)?;

    ws_events::broadcast_room(
        state,
        &session,
        &ServerMessage::GuessSubmitted {
            slot: seat.slot.into(),
            guess: outcome.record.guess.clone(),
            feedback: (&outcome.record.feedback).into(),
            attempts: outcome.attempts,
            full_match: outcome.record.feedback.is_full_match(),
        },
    );

    let attempts = AttemptCounts::from(session.attempts());
    match outcome.progress {
        RoundProgress::FinalChance => {
            ws_events::broadcast_room(
                state,
                &session,
                &ServerMessage::FinalChance {
                    current_turn: Slot::Two.into(),
                    attempts,
                },
            );
            info!(code = %seat.code, "slot one matched; slot two gets a final chance");
        }
        RoundProgress::Finished(result) => {
            let (winner, tie) = match result {
                RoundOutcome::Win(slot) => (Some(SlotId::from(slot)), false),
                RoundOutcome::Tie => (None, true),
            };
            ws_events::broadcast_room(
                state,
                &session,
                &ServerMessage::GameOver {
                    winner,
                    tie,
                    attempts,
                    secrets: RevealedSecrets::from_session(&session),
                    series_score: session.series_score().into(),
                },
            );
            info!(code = %seat.code, winner = ?winner, tie, "round finished");
        }
        RoundProgress::NextTurn(next) => {
            ws_events::broadcast_room(
                state,
                &session,
                &ServerMessage::TurnChanged {
                    current_turn: next.into(),
                    attempts,
                },
            );
        }
    }

    Ok(())
}

/// Register the seat's rematch vote; resets the round on consensus.
pub async fn play_again(state: &SharedState, seat: &Seat) -> Result<(), GameError> {
    let session = lookup(state, &seat.code)?;
    let mut session = session.lock().await;

    match session.vote_rematch(seat.slot)? {
        RematchOutcome::Reset => {
            ws_events::broadcast_room(
                state,
                &session,
                &ServerMessage::GameReset {
                    series_score: SeriesScore::from(session.series_score()),
                    phase: VisibleRoomPhase::SecretSetup,
                },
            );
            info!(
                code = %seat.code,
                one = session.series_score().one,
                two = session.series_score().two,
                "rematch agreed; round reset"
            );
        }
        RematchOutcome::Waiting => {
            ws_events::send_to_slot(
                state,
                &session,
                seat.slot,
                &ServerMessage::WaitingForRematch,
            );
            ws_events::send_to_slot(
                state,
                &session,
                seat.slot.other(),
                &ServerMessage::OpponentWantsRematch {
                    slot: seat.slot.into(),
                },
            );
        }
    }

    Ok(())
}

fn lookup(state: &SharedState, code: &str) -> Result<SharedSession, GameError> {
    state
        .rooms()
        .get(code)
        .ok_or_else(|| GameError::RoomNotFound(code.to_string()))
}
