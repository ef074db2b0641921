//! Session state transitions
//!
//! ```text
//! Playing --guess--> Playing | Won | Lost
//! Lost --extra try--> Playing   (last guess hidden, one attempt returned)
//! Lost --finish--> Closed
//! Won --acknowledge--> Closed
//! ```
//!
//! Every transition is a named method on [`Session`]; callers persist the
//! mutated session afterwards.

use super::types::{GameResult, Hint, Puzzle, PuzzleMode, Session, SessionStatus};
use crate::config::{GameRules, HINT_LIMIT};
use crate::core::{FeedbackLine, GuessLine, Word, evaluate, hard_mode};
use crate::error::{ConflictReason, GameError, Result, ValidationError};
use crate::ledger::{EntitlementLedger, Product};
use crate::wordlists::Dictionary;
use chrono::{DateTime, Utc};
use rand::Rng;
use rand::seq::IndexedRandom;
use tracing::debug;

/// Result of an accepted guess
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuessOutcome {
    pub attempts_used: u32,
    pub max_attempts: u32,
    pub status: SessionStatus,
    pub feedback: FeedbackLine,
}

/// Result of a hint request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HintOutcome {
    pub hints: Vec<Hint>,
    /// `None` when the request was a no-op at the ceiling
    pub revealed: Option<Hint>,
}

impl Session {
    /// Score a guess and advance the session
    ///
    /// Checks run in order: session in play, attempts left, word shape and
    /// length, dictionary, duplicate, hard mode.
    ///
    /// # Errors
    /// - `Conflict` if the session is not in play or out of attempts
    /// - `Validation` for malformed, unknown or repeated words
    /// - `HardMode` if the guess ignores revealed letters
    pub fn submit_guess(
        &mut self,
        puzzle: &Puzzle,
        raw_guess: &str,
        dictionary: &dyn Dictionary,
        rules: &GameRules,
        now: DateTime<Utc>,
    ) -> Result<GuessOutcome> {
        if !self.is_playing() {
            return Err(ConflictReason::NotPlaying.into());
        }

        let max_attempts = puzzle.max_attempts(rules.daily_attempts());
        if self.attempts_used >= max_attempts {
            return Err(ConflictReason::AttemptsExhausted.into());
        }

        let word = Word::normalized(raw_guess, rules.collapse_yo)?;
        if word.len() != puzzle.letter_count() {
            return Err(ValidationError::Length(crate::core::LengthMismatch {
                guess: word.len(),
                solution: puzzle.letter_count(),
            })
            .into());
        }

        if !dictionary.is_allowed_guess(&word, &puzzle.theme) {
            return Err(ValidationError::NotInDictionary(word.text().to_string()).into());
        }

        if self.lines.iter().any(|line| line.text_norm == word.text()) {
            return Err(ValidationError::DuplicateGuess(word.text().to_string()).into());
        }

        if self.hard_mode {
            hard_mode::validate(&self.lines, &word)?;
        }

        let feedback = evaluate(&word, &puzzle.solution)?;

        self.attempts_used += 1;
        self.lines.push(GuessLine {
            guess_index: self.attempts_used,
            text_input: raw_guess.to_string(),
            text_norm: word.text().to_string(),
            feedback: feedback.clone(),
            created_at: now,
        });

        if feedback.is_solved() {
            self.status = SessionStatus::Won;
            self.result = Some(GameResult::Win);
            self.ended_at = Some(now);
        } else if self.attempts_used == max_attempts {
            self.status = SessionStatus::Lost;
            self.result = Some(GameResult::Lose);
        }

        debug!(
            session = %self.id,
            attempt = self.attempts_used,
            status = ?self.status,
            "guess accepted"
        );

        Ok(GuessOutcome {
            attempts_used: self.attempts_used,
            max_attempts,
            status: self.status,
            feedback,
        })
    }

    /// Reveal one random unrevealed letter of the solution
    ///
    /// At the hint ceiling, or once every position is revealed, this returns
    /// the current hints without consuming anything.
    ///
    /// # Errors
    /// - `Conflict` outside arcade mode or when the session is not in play
    /// - `Exhausted` when the profile owns no hints
    pub fn use_hint<R: Rng + ?Sized>(
        &mut self,
        puzzle: &Puzzle,
        ledger: &dyn EntitlementLedger,
        rng: &mut R,
        max_hints: usize,
    ) -> Result<HintOutcome> {
        if self.mode != PuzzleMode::Arcade {
            return Err(ConflictReason::ArcadeOnly.into());
        }
        if !self.is_playing() {
            return Err(ConflictReason::NotPlaying.into());
        }

        let ceiling = max_hints.min(HINT_LIMIT);
        let unrevealed: Vec<usize> = (0..puzzle.letter_count())
            .filter(|&p| self.hints_used.iter().all(|h| h.position != p))
            .collect();

        let position = match unrevealed.choose(rng) {
            Some(&position) if self.hints_used.len() < ceiling => position,
            _ => {
                return Ok(HintOutcome {
                    hints: self.hints_used.clone(),
                    revealed: None,
                });
            }
        };

        ledger.consume(self.profile_id, Product::ArcadeHint)?;

        let hint = Hint {
            letter: puzzle.solution.letter_at(position),
            position,
        };
        self.hints_used.push(hint);
        debug!(session = %self.id, position, "hint revealed");

        Ok(HintOutcome {
            hints: self.hints_used.clone(),
            revealed: Some(hint),
        })
    }

    /// Reopen a lost arcade session by undoing its final guess
    ///
    /// The undone guess moves to `hidden_attempts` and its attempt is returned.
    ///
    /// # Errors
    /// - `Conflict` outside arcade mode or unless the session is lost
    /// - `Exhausted` when the profile owns no extra tries
    pub fn resume_with_extra_try(&mut self, ledger: &dyn EntitlementLedger) -> Result<()> {
        if self.mode != PuzzleMode::Arcade {
            return Err(ConflictReason::ArcadeOnly.into());
        }
        if self.status != SessionStatus::Lost {
            return Err(ConflictReason::NotLost.into());
        }

        ledger.consume(self.profile_id, Product::ArcadeExtraTry)?;

        if let Some(last) = self.lines.pop() {
            self.hidden_attempts.push(last);
        }
        self.attempts_used = self.attempts_used.saturating_sub(1);
        self.result = None;
        self.status = SessionStatus::Playing;
        self.ended_at = None;

        debug!(
            session = %self.id,
            attempts = self.attempts_used,
            hidden = self.hidden_attempts.len(),
            "session resumed with extra try"
        );
        Ok(())
    }

    /// Accept a loss for good
    ///
    /// # Errors
    /// Returns `Conflict` unless the session is lost.
    pub fn finish(&mut self, now: DateTime<Utc>) -> Result<()> {
        if self.status != SessionStatus::Lost {
            return Err(ConflictReason::NotLost.into());
        }
        self.status = SessionStatus::Closed;
        self.result = Some(GameResult::Lose);
        self.ended_at = Some(now);
        Ok(())
    }

    /// Close a won session once the player has seen the result
    ///
    /// # Errors
    /// Returns `Conflict` unless the session is won.
    pub fn acknowledge_win(&mut self, now: DateTime<Utc>) -> Result<()> {
        if self.status != SessionStatus::Won {
            return Err(GameError::Conflict(ConflictReason::NotWon));
        }
        self.status = SessionStatus::Closed;
        self.ended_at.get_or_insert(now);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Tile;
    use crate::error::ErrorKind;
    use crate::ledger::MemoryLedger;
    use crate::profile::ProfileId;
    use crate::wordlists::WordBank;
    use chrono::NaiveDate;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    const PLAYER: ProfileId = ProfileId(42);

    fn bank() -> WordBank {
        let words = |list: &[&str]| -> Vec<Word> { list.iter().map(|w| Word::new(w).unwrap()).collect() };
        WordBank::from_words(
            words(&["кран", "слово", "сосна"]),
            words(&[
                "сила", "вода", "рука", "нога", "гора", "луна", "стол", "кора", "крот", "ааббв",
                "абваб",
            ]),
        )
    }

    fn arcade(solution: &str) -> Puzzle {
        Puzzle::arcade(Word::new(solution).unwrap(), 7, "common")
    }

    fn daily(solution: &str) -> Puzzle {
        Puzzle::daily(
            NaiveDate::from_ymd_opt(2026, 5, 1).unwrap(),
            Word::new(solution).unwrap(),
            7,
            "common",
        )
    }

    fn rules() -> GameRules {
        GameRules::default()
    }

    fn guess(session: &mut Session, puzzle: &Puzzle, word: &str) -> Result<GuessOutcome> {
        session.submit_guess(puzzle, word, &bank(), &rules(), Utc::now())
    }

    /// Arcade "кран" session lost after five wrong guesses
    fn lost_arcade() -> (Puzzle, Session) {
        let puzzle = arcade("кран");
        let mut session = Session::new(PLAYER, &puzzle, false, Utc::now());
        for word in ["сила", "вода", "рука", "нога", "гора"] {
            guess(&mut session, &puzzle, word).unwrap();
        }
        assert_eq!(session.status, SessionStatus::Lost);
        (puzzle, session)
    }

    #[test]
    fn winning_guess_closes_play() {
        let puzzle = arcade("слово");
        let mut session = Session::new(PLAYER, &puzzle, false, Utc::now());

        let first = guess(&mut session, &puzzle, "сосна").unwrap();
        assert_eq!(first.status, SessionStatus::Playing);
        assert_eq!(first.attempts_used, 1);

        let second = guess(&mut session, &puzzle, "СЛОВО").unwrap();
        assert_eq!(second.status, SessionStatus::Won);
        assert!(second.feedback.is_solved());
        assert_eq!(session.result, Some(GameResult::Win));
        assert!(session.ended_at.is_some());
        assert_eq!(session.lines[1].text_input, "СЛОВО");
        assert_eq!(session.lines[1].text_norm, "слово");
    }

    #[test]
    fn max_wrong_guesses_lose_and_further_guesses_conflict() {
        let (puzzle, mut session) = lost_arcade();
        assert_eq!(session.attempts_used, puzzle.max_attempts(6));
        assert_eq!(session.result, Some(GameResult::Lose));

        let err = guess(&mut session, &puzzle, "луна").unwrap_err();
        assert_eq!(err, GameError::Conflict(ConflictReason::NotPlaying));
    }

    #[test]
    fn daily_puzzle_allows_six_attempts() {
        let puzzle = daily("кран");
        let mut session = Session::new(PLAYER, &puzzle, false, Utc::now());
        for word in ["сила", "вода", "рука", "нога", "гора"] {
            assert_eq!(
                guess(&mut session, &puzzle, word).unwrap().status,
                SessionStatus::Playing
            );
        }
        let last = guess(&mut session, &puzzle, "луна").unwrap();
        assert_eq!(last.status, SessionStatus::Lost);
        assert_eq!(last.max_attempts, 6);
    }

    #[test]
    fn attempts_exhausted_is_enforced_even_if_status_says_playing() {
        let puzzle = arcade("кран");
        let mut session = Session::new(PLAYER, &puzzle, false, Utc::now());
        session.attempts_used = 5;

        let err = guess(&mut session, &puzzle, "сила").unwrap_err();
        assert_eq!(err, GameError::Conflict(ConflictReason::AttemptsExhausted));
    }

    #[test]
    fn invalid_guesses_are_rejected_without_using_attempts() {
        let puzzle = arcade("слово");
        let mut session = Session::new(PLAYER, &puzzle, false, Utc::now());

        let wrong_length = guess(&mut session, &puzzle, "кран").unwrap_err();
        assert!(matches!(
            wrong_length,
            GameError::Validation(ValidationError::Length(_))
        ));

        let malformed = guess(&mut session, &puzzle, "hello").unwrap_err();
        assert_eq!(malformed.kind(), ErrorKind::Validation);

        let unknown = guess(&mut session, &puzzle, "ккккк").unwrap_err();
        assert_eq!(
            unknown,
            GameError::Validation(ValidationError::NotInDictionary("ккккк".into()))
        );

        guess(&mut session, &puzzle, "сосна").unwrap();
        let duplicate = guess(&mut session, &puzzle, "Сосна").unwrap_err();
        assert_eq!(
            duplicate,
            GameError::Validation(ValidationError::DuplicateGuess("сосна".into()))
        );

        assert_eq!(session.attempts_used, 1);
    }

    #[test]
    fn hard_mode_rejects_ignoring_revealed_letters() {
        let puzzle = arcade("кран");
        let mut session = Session::new(PLAYER, &puzzle, true, Utc::now());

        // кора vs кран: к correct, о absent, р and а present
        let first = guess(&mut session, &puzzle, "кора").unwrap();
        assert_eq!(first.feedback.tiles()[0], Tile::Correct);

        let err = guess(&mut session, &puzzle, "сила").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::HardMode);

        let err = guess(&mut session, &puzzle, "крот").unwrap_err();
        assert_eq!(
            err,
            GameError::HardMode(crate::core::HardModeViolation::MissingPresent { letter: 'а' })
        );
        assert_eq!(session.attempts_used, 1);

        let outcome = guess(&mut session, &puzzle, "кран").unwrap();
        assert_eq!(outcome.status, SessionStatus::Won);
    }

    #[test]
    fn duplicate_letters_scored_through_session() {
        let puzzle = arcade("ааббв");
        let mut session = Session::new(PLAYER, &puzzle, false, Utc::now());
        let outcome = guess(&mut session, &puzzle, "абваб").unwrap();
        assert_eq!(
            outcome.feedback.tiles(),
            &[Tile::Correct, Tile::Present, Tile::Present, Tile::Present, Tile::Present]
        );
    }

    #[test]
    fn extra_try_undoes_last_guess() {
        let (puzzle, mut session) = lost_arcade();
        let ledger = MemoryLedger::new();
        ledger.grant(PLAYER, Product::ArcadeExtraTry, 1);

        session.resume_with_extra_try(&ledger).unwrap();

        assert_eq!(session.status, SessionStatus::Playing);
        assert_eq!(session.result, None);
        assert_eq!(session.attempts_used, 4);
        assert_eq!(session.lines.len(), 4);
        assert_eq!(session.hidden_attempts.len(), 1);
        assert_eq!(session.hidden_attempts[0].text_norm, "гора");
        assert_eq!(ledger.available(PLAYER, Product::ArcadeExtraTry), 0);

        // one more guess is allowed, then the session is lost again
        let outcome = guess(&mut session, &puzzle, "луна").unwrap();
        assert_eq!(outcome.status, SessionStatus::Lost);

        assert_eq!(
            session.resume_with_extra_try(&ledger),
            Err(GameError::Exhausted(Product::ArcadeExtraTry))
        );
        assert_eq!(session.status, SessionStatus::Lost);
    }

    #[test]
    fn extra_try_only_from_lost() {
        let puzzle = arcade("кран");
        let mut session = Session::new(PLAYER, &puzzle, false, Utc::now());
        let ledger = MemoryLedger::new();
        ledger.grant(PLAYER, Product::ArcadeExtraTry, 1);

        assert_eq!(
            session.resume_with_extra_try(&ledger),
            Err(GameError::Conflict(ConflictReason::NotLost))
        );
        assert_eq!(ledger.available(PLAYER, Product::ArcadeExtraTry), 1);
    }

    #[test]
    fn extra_try_not_offered_in_daily_mode() {
        let puzzle = daily("кран");
        let mut session = Session::new(PLAYER, &puzzle, false, Utc::now());
        session.status = SessionStatus::Lost;
        let ledger = MemoryLedger::new();
        ledger.grant(PLAYER, Product::ArcadeExtraTry, 1);

        assert_eq!(
            session.resume_with_extra_try(&ledger),
            Err(GameError::Conflict(ConflictReason::ArcadeOnly))
        );
    }

    #[test]
    fn finish_closes_lost_session() {
        let (_, mut session) = lost_arcade();
        session.finish(Utc::now()).unwrap();

        assert_eq!(session.status, SessionStatus::Closed);
        assert_eq!(session.status_label(), "lost");
        assert!(session.ended_at.is_some());

        let ledger = MemoryLedger::new();
        ledger.grant(PLAYER, Product::ArcadeExtraTry, 1);
        assert!(session.resume_with_extra_try(&ledger).is_err());
        assert!(session.finish(Utc::now()).is_err());
    }

    #[test]
    fn acknowledge_win_closes_won_session() {
        let puzzle = arcade("слово");
        let mut session = Session::new(PLAYER, &puzzle, false, Utc::now());
        assert!(session.acknowledge_win(Utc::now()).is_err());

        guess(&mut session, &puzzle, "слово").unwrap();
        session.acknowledge_win(Utc::now()).unwrap();
        assert_eq!(session.status, SessionStatus::Closed);
        assert_eq!(session.status_label(), "won");
        assert!(session.finish(Utc::now()).is_err());
    }

    #[test]
    fn hints_reveal_distinct_positions_up_to_ceiling() {
        let puzzle = arcade("пароход");
        let mut session = Session::new(PLAYER, &puzzle, false, Utc::now());
        let ledger = MemoryLedger::new();
        ledger.grant(PLAYER, Product::ArcadeHint, 10);
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..5 {
            let outcome = session.use_hint(&puzzle, &ledger, &mut rng, 5).unwrap();
            let hint = outcome.revealed.unwrap();
            assert_eq!(hint.letter, puzzle.solution.letter_at(hint.position));
        }

        let mut positions: Vec<usize> = session.hints_used.iter().map(|h| h.position).collect();
        positions.sort_unstable();
        positions.dedup();
        assert_eq!(positions.len(), 5);

        // ceiling: no-op, nothing consumed
        let outcome = session.use_hint(&puzzle, &ledger, &mut rng, 5).unwrap();
        assert_eq!(outcome.revealed, None);
        assert_eq!(outcome.hints.len(), 5);
        assert_eq!(ledger.available(PLAYER, Product::ArcadeHint), 5);
    }

    #[test]
    fn hints_stop_when_every_position_is_revealed() {
        let puzzle = arcade("кран");
        let mut session = Session::new(PLAYER, &puzzle, false, Utc::now());
        let ledger = MemoryLedger::new();
        ledger.grant(PLAYER, Product::ArcadeHint, 10);
        let mut rng = StdRng::seed_from_u64(3);

        for _ in 0..6 {
            session.use_hint(&puzzle, &ledger, &mut rng, 5).unwrap();
        }
        assert_eq!(session.hints_used.len(), 4);
        assert_eq!(ledger.available(PLAYER, Product::ArcadeHint), 6);
    }

    #[test]
    fn hint_requires_entitlement_and_play() {
        let puzzle = arcade("слово");
        let mut session = Session::new(PLAYER, &puzzle, false, Utc::now());
        let ledger = MemoryLedger::new();
        let mut rng = StdRng::seed_from_u64(1);

        assert_eq!(
            session.use_hint(&puzzle, &ledger, &mut rng, 5),
            Err(GameError::Exhausted(Product::ArcadeHint))
        );
        assert!(session.hints_used.is_empty());

        session.status = SessionStatus::Won;
        ledger.grant(PLAYER, Product::ArcadeHint, 1);
        assert_eq!(
            session.use_hint(&puzzle, &ledger, &mut rng, 5),
            Err(GameError::Conflict(ConflictReason::NotPlaying))
        );
    }
}
