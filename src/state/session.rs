//! Per-match session state: the two slots, the phase machine, and the
//! fair-play final-turn rule.

use std::ops::{Index, IndexMut};
use std::time::SystemTime;

use tokio::task::AbortHandle;
use uuid::Uuid;

use crate::{
    error::GameError,
    state::evaluator::{self, Feedback, LengthMismatch},
};

/// One of the two fixed participant identities within a session.
///
/// Slots are assigned in join order and never reassigned for the lifetime of
/// the session; the transport connection occupying a slot may come and go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    /// The room creator, always the first to move.
    One,
    /// The joining participant.
    Two,
}

impl Slot {
    /// The opposing slot.
    pub fn other(self) -> Slot {
        match self {
            Slot::One => Slot::Two,
            Slot::Two => Slot::One,
        }
    }
}

/// Fixed two-element structure indexed by [`Slot`].
///
/// Modelling the pair explicitly (rather than as a map) makes the
/// "exactly two participants" invariant representable in the type itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotPair<T> {
    /// Value held for [`Slot::One`].
    pub one: T,
    /// Value held for [`Slot::Two`].
    pub two: T,
}

impl<T> SlotPair<T> {
    /// Build a pair from both values.
    pub fn new(one: T, two: T) -> Self {
        Self { one, two }
    }
}

impl<T> Index<Slot> for SlotPair<T> {
    type Output = T;

    fn index(&self, slot: Slot) -> &T {
        match slot {
            Slot::One => &self.one,
            Slot::Two => &self.two,
        }
    }
}

impl<T> IndexMut<Slot> for SlotPair<T> {
    fn index_mut(&mut self, slot: Slot) -> &mut T {
        match slot {
            Slot::One => &mut self.one,
            Slot::Two => &mut self.two,
        }
    }
}

/// Display details for one participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParticipantInfo {
    /// Display name shown to the opponent.
    pub name: String,
    /// Avatar glyph chosen by the participant.
    pub avatar: String,
}

impl ParticipantInfo {
    /// Default info used for a slot before its participant joins, and as a
    /// fallback when a join request omits the optional fields.
    pub fn placeholder(slot: Slot) -> Self {
        let name = match slot {
            Slot::One => "Player 1",
            Slot::Two => "Player 2",
        };
        Self {
            name: name.into(),
            avatar: "🐨".into(),
        }
    }

    /// Build info from optional client-supplied fields, falling back to the
    /// slot's placeholder values.
    pub fn from_request(slot: Slot, name: Option<String>, avatar: Option<String>) -> Self {
        let placeholder = Self::placeholder(slot);
        Self {
            name: name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())
                .unwrap_or(placeholder.name),
            avatar: avatar.filter(|a| !a.is_empty()).unwrap_or(placeholder.avatar),
        }
    }
}

/// Phase of a session's round lifecycle.
///
/// Advances `Matchmaking → SecretSetup → Playing → Finished`, with a single
/// backward edge `Finished → SecretSetup` taken on rematch consensus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomPhase {
    /// Slot One is waiting for an opponent.
    Matchmaking,
    /// Both slots are present; secrets are being committed.
    SecretSetup,
    /// Turn-taking guesses are in progress.
    Playing,
    /// The round has been decided.
    Finished,
}

/// One guess and the feedback it earned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuessRecord {
    /// The submitted digit string.
    pub guess: String,
    /// Per-position feedback computed against the opponent's secret.
    pub feedback: Feedback,
}

/// How a finished round was decided.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundOutcome {
    /// The given slot matched the opponent's secret.
    Win(Slot),
    /// Both slots matched at the same attempt depth within the fair-play
    /// window.
    Tie,
}

/// Fair-play bookkeeping between Slot One's full match and the round's
/// resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FairPlay {
    /// True while Slot Two is owed one final guess.
    pub pending_final_turn: bool,
    /// Slot that wins if the final guess fails.
    pub provisional_winner: Option<Slot>,
}

/// Result of committing a secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretOutcome {
    /// The opponent's secret is still missing.
    Waiting,
    /// Both secrets are in; the round has started with Slot One to move.
    Started,
}

/// Where the round stands after a guess has been recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundProgress {
    /// Slot One matched; Slot Two is granted one final guess at the same
    /// attempt depth before the round is decided.
    FinalChance,
    /// The round has been decided.
    Finished(RoundOutcome),
    /// Play continues with the given slot to move.
    NextTurn(Slot),
}

/// Result of a successfully recorded guess.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuessOutcome {
    /// The guess and its feedback, as appended to the log.
    pub record: GuessRecord,
    /// The guesser's attempt count after this guess.
    pub attempts: u32,
    /// How the round proceeds.
    pub progress: RoundProgress,
}

/// Result of a rematch vote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RematchOutcome {
    /// The other slot has not voted yet.
    Waiting,
    /// Both slots voted; the round state has been reset for a new round.
    Reset,
}

/// The full state of one ongoing match between two slots.
///
/// A session is owned by the registry and only ever touched behind its own
/// lock, so the methods here are plain synchronous state transitions. Every
/// operation either succeeds and mutates, or fails with a [`GameError`] and
/// leaves the state untouched.
#[derive(Debug)]
pub struct Session {
    code: String,
    code_length: usize,
    created_at: SystemTime,
    connections: SlotPair<Option<Uuid>>,
    present: SlotPair<bool>,
    participants: SlotPair<ParticipantInfo>,
    secrets: SlotPair<Option<String>>,
    phase: RoomPhase,
    current_turn: Slot,
    attempts: SlotPair<u32>,
    guess_log: SlotPair<Vec<GuessRecord>>,
    outcome: Option<RoundOutcome>,
    series_score: SlotPair<u32>,
    fair_play: FairPlay,
    rematch_votes: SlotPair<bool>,
    cleanup: SlotPair<Option<AbortHandle>>,
}

impl Session {
    /// Open a new session with the creator seated in Slot One.
    pub fn new(code: String, code_length: usize, conn: Uuid, creator: ParticipantInfo) -> Self {
        Self {
            code,
            code_length,
            created_at: SystemTime::now(),
            connections: SlotPair::new(Some(conn), None),
            present: SlotPair::new(true, false),
            participants: SlotPair::new(creator, ParticipantInfo::placeholder(Slot::Two)),
            secrets: SlotPair::default(),
            phase: RoomPhase::Matchmaking,
            current_turn: Slot::One,
            attempts: SlotPair::default(),
            guess_log: SlotPair::default(),
            outcome: None,
            series_score: SlotPair::default(),
            fair_play: FairPlay::default(),
            rematch_votes: SlotPair::default(),
            cleanup: SlotPair::default(),
        }
    }

    /// Room code this session is registered under.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Fixed secret/guess length for this session.
    pub fn code_length(&self) -> usize {
        self.code_length
    }

    /// When the room was opened.
    pub fn created_at(&self) -> SystemTime {
        self.created_at
    }

    /// Current phase of the round lifecycle.
    pub fn phase(&self) -> RoomPhase {
        self.phase
    }

    /// Slot expected to guess next; meaningful only while playing.
    pub fn current_turn(&self) -> Slot {
        self.current_turn
    }

    /// Connection currently occupying the slot, if any.
    pub fn connection(&self, slot: Slot) -> Option<Uuid> {
        self.connections[slot]
    }

    /// Participant details for both slots.
    pub fn participants(&self) -> &SlotPair<ParticipantInfo> {
        &self.participants
    }

    /// Guess counts for the current round.
    pub fn attempts(&self) -> &SlotPair<u32> {
        &self.attempts
    }

    /// Ordered guess history for the current round.
    pub fn guess_log(&self) -> &SlotPair<Vec<GuessRecord>> {
        &self.guess_log
    }

    /// Cumulative win counts across rounds of this session.
    pub fn series_score(&self) -> &SlotPair<u32> {
        &self.series_score
    }

    /// How the round was decided, once finished.
    pub fn outcome(&self) -> Option<RoundOutcome> {
        self.outcome
    }

    /// Committed secret for the slot, present only after commitment.
    pub fn secret(&self, slot: Slot) -> Option<&str> {
        self.secrets[slot].as_deref()
    }

    /// Fair-play bookkeeping for the current round.
    pub fn fair_play(&self) -> FairPlay {
        self.fair_play
    }

    /// Seat the joining participant in Slot Two and move to secret setup.
    pub fn join(&mut self, conn: Uuid, info: ParticipantInfo) -> Result<(), GameError> {
        if self.present.one && self.present.two {
            return Err(GameError::RoomFull);
        }
        if self.phase != RoomPhase::Matchmaking {
            return Err(GameError::GameInProgress);
        }

        self.present.two = true;
        self.participants.two = info;
        self.attach_connection(Slot::Two, conn);
        self.phase = RoomPhase::SecretSetup;
        Ok(())
    }

    /// Store the slot's secret; starts the round once both are committed.
    ///
    /// Re-committing while still in setup overwrites the previous secret.
    pub fn commit_secret(&mut self, slot: Slot, secret: &str) -> Result<SecretOutcome, GameError> {
        if self.phase != RoomPhase::SecretSetup {
            return Err(GameError::InvalidState(
                "secrets can only be set while the room is in setup".into(),
            ));
        }

        let got = secret.chars().count();
        if got != self.code_length {
            return Err(LengthMismatch {
                expected: self.code_length,
                got,
            }
            .into());
        }

        self.secrets[slot] = Some(secret.to_string());

        if self.secrets.one.is_some() && self.secrets.two.is_some() {
            self.phase = RoomPhase::Playing;
            self.current_turn = Slot::One;
            Ok(SecretOutcome::Started)
        } else {
            Ok(SecretOutcome::Waiting)
        }
    }

    /// Evaluate the slot's guess against the opponent's secret and advance
    /// the round, applying the fair-play final-turn rule.
    pub fn submit_guess(&mut self, slot: Slot, guess: &str) -> Result<GuessOutcome, GameError> {
        if self.phase == RoomPhase::Finished {
            return Err(GameError::GameOver);
        }
        if self.phase != RoomPhase::Playing {
            return Err(GameError::InvalidState(
                "guesses can only be submitted while the round is in play".into(),
            ));
        }
        if slot != self.current_turn {
            return Err(GameError::NotYourTurn);
        }

        let secret = self.secrets[slot.other()]
            .as_deref()
            .ok_or_else(|| GameError::InvalidState("opponent has no committed secret".into()))?;
        let feedback = evaluator::evaluate(secret, guess)?;

        let record = GuessRecord {
            guess: guess.to_string(),
            feedback,
        };
        self.attempts[slot] += 1;
        self.guess_log[slot].push(record.clone());

        let progress = if record.feedback.is_full_match() {
            if slot == Slot::One && !self.fair_play.pending_final_turn {
                // Slot One always moves first, so Slot Two is owed one guess
                // at the same attempt depth before the round is decided.
                self.fair_play.pending_final_turn = true;
                self.fair_play.provisional_winner = Some(Slot::One);
                self.current_turn = Slot::Two;
                RoundProgress::FinalChance
            } else {
                let outcome = if self.fair_play.pending_final_turn && slot == Slot::Two {
                    RoundOutcome::Tie
                } else {
                    self.series_score[slot] += 1;
                    RoundOutcome::Win(slot)
                };
                self.finish_round(outcome);
                RoundProgress::Finished(outcome)
            }
        } else if self.fair_play.pending_final_turn && slot == Slot::Two {
            // The final-chance guess failed; the provisional winner stands.
            let winner = self.fair_play.provisional_winner.unwrap_or(Slot::One);
            self.series_score[winner] += 1;
            let outcome = RoundOutcome::Win(winner);
            self.finish_round(outcome);
            RoundProgress::Finished(outcome)
        } else {
            self.current_turn = slot.other();
            RoundProgress::NextTurn(self.current_turn)
        };

        Ok(GuessOutcome {
            attempts: self.attempts[slot],
            record,
            progress,
        })
    }

    /// Register the slot's rematch vote; resets the round on consensus.
    ///
    /// Idempotent per slot: re-voting has no additional effect beyond the
    /// repeated waiting notification.
    pub fn vote_rematch(&mut self, slot: Slot) -> Result<RematchOutcome, GameError> {
        if self.phase != RoomPhase::Finished {
            return Err(GameError::InvalidState(
                "a rematch can only be requested once the round is over".into(),
            ));
        }

        self.fair_play = FairPlay::default();
        self.rematch_votes[slot] = true;

        if self.rematch_votes.one && self.rematch_votes.two {
            self.reset_round();
            Ok(RematchOutcome::Reset)
        } else {
            Ok(RematchOutcome::Waiting)
        }
    }

    /// Voluntary exit: drop the slot's connection association and vacate the
    /// seat. Returns true when both seats are now empty and the session
    /// should be deleted immediately.
    pub fn detach(&mut self, slot: Slot) -> bool {
        self.connections[slot] = None;
        self.present[slot] = false;
        self.cancel_cleanup(slot);
        !self.present.one && !self.present.two
    }

    /// Transport-originated drop: the slot keeps its seat but loses its
    /// connection until the reaper's grace period expires.
    pub fn clear_connection(&mut self, slot: Slot) {
        self.connections[slot] = None;
    }

    /// Associate a connection with a slot, cancelling any pending cleanup
    /// scheduled while the slot was disconnected.
    pub fn attach_connection(&mut self, slot: Slot, conn: Uuid) {
        self.connections[slot] = Some(conn);
        self.cancel_cleanup(slot);
    }

    /// Store the abort handle of a scheduled cleanup task for the slot,
    /// replacing (and aborting) any previous one.
    pub fn set_cleanup(&mut self, slot: Slot, handle: AbortHandle) {
        if let Some(previous) = self.cleanup[slot].replace(handle) {
            previous.abort();
        }
    }

    /// Abort a pending cleanup task for the slot, if any.
    pub fn cancel_cleanup(&mut self, slot: Slot) {
        if let Some(handle) = self.cleanup[slot].take() {
            handle.abort();
        }
    }

    /// Abort every pending cleanup task; called when the session is removed
    /// from the registry.
    pub fn cancel_all_cleanup(&mut self) {
        self.cancel_cleanup(Slot::One);
        self.cancel_cleanup(Slot::Two);
    }

    fn finish_round(&mut self, outcome: RoundOutcome) {
        self.phase = RoomPhase::Finished;
        self.outcome = Some(outcome);
        self.fair_play = FairPlay::default();
    }

    /// Clear round-scoped state for a rematch, keeping seats, participants,
    /// and the series score.
    fn reset_round(&mut self) {
        self.secrets = SlotPair::default();
        self.guess_log = SlotPair::default();
        self.attempts = SlotPair::default();
        self.outcome = None;
        self.rematch_votes = SlotPair::default();
        self.fair_play = FairPlay::default();
        self.current_turn = Slot::One;
        self.phase = RoomPhase::SecretSetup;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session::new(
            "ABC123".into(),
            4,
            Uuid::new_v4(),
            ParticipantInfo::from_request(Slot::One, Some("Alice".into()), None),
        )
    }

    fn playing_session() -> Session {
        let mut session = session();
        session
            .join(
                Uuid::new_v4(),
                ParticipantInfo::from_request(Slot::Two, Some("Bob".into()), Some("🦊".into())),
            )
            .unwrap();
        // Slot One must crack "4321", Slot Two must crack "1234".
        assert_eq!(
            session.commit_secret(Slot::One, "1234").unwrap(),
            SecretOutcome::Waiting
        );
        assert_eq!(
            session.commit_secret(Slot::Two, "4321").unwrap(),
            SecretOutcome::Started
        );
        session
    }

    #[test]
    fn join_moves_matchmaking_to_setup() {
        let mut session = session();
        assert_eq!(session.phase(), RoomPhase::Matchmaking);

        session
            .join(Uuid::new_v4(), ParticipantInfo::placeholder(Slot::Two))
            .unwrap();
        assert_eq!(session.phase(), RoomPhase::SecretSetup);
        assert_eq!(session.participants().two.name, "Player 2");
    }

    #[test]
    fn join_rejects_full_room() {
        let mut session = playing_session();
        assert_eq!(
            session.join(Uuid::new_v4(), ParticipantInfo::placeholder(Slot::Two)),
            Err(GameError::RoomFull)
        );
    }

    #[test]
    fn join_rejects_started_game_with_a_free_seat() {
        let mut session = playing_session();
        session.detach(Slot::Two);
        assert_eq!(
            session.join(Uuid::new_v4(), ParticipantInfo::placeholder(Slot::Two)),
            Err(GameError::GameInProgress)
        );
    }

    #[test]
    fn commit_rejected_outside_setup() {
        let mut session = session();
        assert!(matches!(
            session.commit_secret(Slot::One, "1234"),
            Err(GameError::InvalidState(_))
        ));
    }

    #[test]
    fn commit_rejects_wrong_length() {
        let mut session = session();
        session
            .join(Uuid::new_v4(), ParticipantInfo::placeholder(Slot::Two))
            .unwrap();
        assert_eq!(
            session.commit_secret(Slot::One, "123"),
            Err(GameError::LengthMismatch(LengthMismatch {
                expected: 4,
                got: 3
            }))
        );
        // Failure must not have stored anything.
        assert_eq!(session.secret(Slot::One), None);
    }

    #[test]
    fn recommit_overwrites_before_round_start() {
        let mut session = session();
        session
            .join(Uuid::new_v4(), ParticipantInfo::placeholder(Slot::Two))
            .unwrap();
        session.commit_secret(Slot::One, "1111").unwrap();
        session.commit_secret(Slot::One, "2222").unwrap();
        assert_eq!(session.secret(Slot::One), Some("2222"));
        assert_eq!(session.phase(), RoomPhase::SecretSetup);
    }

    #[test]
    fn turns_alternate_between_misses() {
        let mut session = playing_session();
        assert_eq!(session.current_turn(), Slot::One);

        let outcome = session.submit_guess(Slot::One, "9999").unwrap();
        assert_eq!(outcome.progress, RoundProgress::NextTurn(Slot::Two));
        assert_eq!(outcome.attempts, 1);

        let outcome = session.submit_guess(Slot::Two, "8888").unwrap();
        assert_eq!(outcome.progress, RoundProgress::NextTurn(Slot::One));
        assert_eq!(session.guess_log().one.len(), 1);
        assert_eq!(session.guess_log().two.len(), 1);
    }

    #[test]
    fn guess_out_of_turn_is_rejected_without_mutation() {
        let mut session = playing_session();
        assert_eq!(
            session.submit_guess(Slot::Two, "1234"),
            Err(GameError::NotYourTurn)
        );
        assert_eq!(session.attempts().two, 0);
        assert!(session.guess_log().two.is_empty());
    }

    #[test]
    fn slot_one_full_match_opens_final_chance() {
        let mut session = playing_session();
        let outcome = session.submit_guess(Slot::One, "4321").unwrap();

        assert_eq!(outcome.progress, RoundProgress::FinalChance);
        assert_eq!(session.phase(), RoomPhase::Playing);
        assert_eq!(session.current_turn(), Slot::Two);
        assert_eq!(session.outcome(), None);
        assert!(session.fair_play().pending_final_turn);
        assert_eq!(session.fair_play().provisional_winner, Some(Slot::One));
    }

    #[test]
    fn final_chance_match_ends_in_tie() {
        let mut session = playing_session();
        session.submit_guess(Slot::One, "4321").unwrap();

        let outcome = session.submit_guess(Slot::Two, "1234").unwrap();
        assert_eq!(
            outcome.progress,
            RoundProgress::Finished(RoundOutcome::Tie)
        );
        assert_eq!(session.phase(), RoomPhase::Finished);
        assert_eq!(session.outcome(), Some(RoundOutcome::Tie));
        // A tie leaves the series score untouched.
        assert_eq!(session.series_score().one, 0);
        assert_eq!(session.series_score().two, 0);
    }

    #[test]
    fn final_chance_miss_awards_provisional_winner() {
        let mut session = playing_session();
        session.submit_guess(Slot::One, "4321").unwrap();

        let outcome = session.submit_guess(Slot::Two, "9999").unwrap();
        assert_eq!(
            outcome.progress,
            RoundProgress::Finished(RoundOutcome::Win(Slot::One))
        );
        assert_eq!(session.series_score().one, 1);
        assert_eq!(session.series_score().two, 0);
    }

    #[test]
    fn slot_two_full_match_wins_immediately() {
        let mut session = playing_session();
        session.submit_guess(Slot::One, "9999").unwrap();

        // No symmetric extra turn for Slot One: Slot Two is never ahead in
        // turn order within a round.
        let outcome = session.submit_guess(Slot::Two, "1234").unwrap();
        assert_eq!(
            outcome.progress,
            RoundProgress::Finished(RoundOutcome::Win(Slot::Two))
        );
        assert_eq!(session.phase(), RoomPhase::Finished);
        assert_eq!(session.series_score().two, 1);
    }

    #[test]
    fn guess_after_finish_is_game_over() {
        let mut session = playing_session();
        session.submit_guess(Slot::One, "9999").unwrap();
        session.submit_guess(Slot::Two, "1234").unwrap();

        assert_eq!(
            session.submit_guess(Slot::One, "1234"),
            Err(GameError::GameOver)
        );
    }

    #[test]
    fn rematch_requires_consensus_and_preserves_series() {
        let mut session = playing_session();
        session.submit_guess(Slot::One, "9999").unwrap();
        session.submit_guess(Slot::Two, "1234").unwrap();
        assert_eq!(session.series_score().two, 1);

        assert_eq!(
            session.vote_rematch(Slot::One).unwrap(),
            RematchOutcome::Waiting
        );
        // Re-voting changes nothing.
        assert_eq!(
            session.vote_rematch(Slot::One).unwrap(),
            RematchOutcome::Waiting
        );
        assert_eq!(
            session.vote_rematch(Slot::Two).unwrap(),
            RematchOutcome::Reset
        );

        assert_eq!(session.phase(), RoomPhase::SecretSetup);
        assert_eq!(session.secret(Slot::One), None);
        assert_eq!(session.secret(Slot::Two), None);
        assert_eq!(session.attempts(), &SlotPair::new(0, 0));
        assert!(session.guess_log().one.is_empty());
        assert_eq!(session.outcome(), None);
        assert_eq!(session.series_score().two, 1);
        assert_eq!(session.current_turn(), Slot::One);
    }

    #[test]
    fn rematch_rejected_mid_round() {
        let mut session = playing_session();
        assert!(matches!(
            session.vote_rematch(Slot::One),
            Err(GameError::InvalidState(_))
        ));
    }

    #[test]
    fn rematch_round_is_playable_again() {
        let mut session = playing_session();
        session.submit_guess(Slot::One, "4321").unwrap();
        session.submit_guess(Slot::Two, "9999").unwrap();
        session.vote_rematch(Slot::Two).unwrap();
        session.vote_rematch(Slot::One).unwrap();

        session.commit_secret(Slot::One, "5678").unwrap();
        assert_eq!(
            session.commit_secret(Slot::Two, "8765").unwrap(),
            SecretOutcome::Started
        );
        // The fair-play window from the previous round must not leak.
        let outcome = session.submit_guess(Slot::One, "8765").unwrap();
        assert_eq!(outcome.progress, RoundProgress::FinalChance);
    }

    #[test]
    fn detach_reports_when_room_empties() {
        let mut session = playing_session();
        assert!(!session.detach(Slot::Two));
        assert!(session.detach(Slot::One));
    }

    #[test]
    fn disconnect_keeps_the_seat() {
        let mut session = playing_session();
        session.clear_connection(Slot::Two);
        assert_eq!(session.connection(Slot::Two), None);
        // The seat is still taken, so a newcomer cannot claim it.
        assert_eq!(
            session.join(Uuid::new_v4(), ParticipantInfo::placeholder(Slot::Two)),
            Err(GameError::RoomFull)
        );
    }
}
