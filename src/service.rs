//! Request-side orchestration
//!
//! [`GameService`] is what a request handler calls with a verified profile id.
//! Each operation loads the session, checks ownership, applies one transition
//! from [`crate::session`] and commits it with a version check. A lost race is
//! retried once; entitlements consumed by an attempt that failed to commit are
//! granted back.

use crate::config::EngineConfig;
use crate::core::{FeedbackLine, GuessLine, MAX_LETTERS, MIN_LETTERS};
use crate::error::{ConflictReason, GameError, NotFoundTarget, Result, ValidationError};
use crate::ledger::{EntitlementLedger, Product};
use crate::profile::{Profile, ProfileId};
use crate::rate_limit::RateLimiter;
use crate::session::{Hint, Puzzle, PuzzleMode, Session, SessionStatus};
use crate::storage::Store;
use crate::wordlists::WordBank;
use chrono::{NaiveDate, Utc};
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Internal retries after a lost commit before `RaceLost` is surfaced
const RACE_RETRIES: u32 = 1;

/// What a caller sees after every operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub mode: PuzzleMode,
    pub letter_count: usize,
    pub attempts_used: u32,
    pub max_attempts: u32,
    /// `playing`, `won` or `lost`
    pub status: &'static str,
    pub closed: bool,
    /// Feedback for the guess just submitted
    pub feedback: Option<FeedbackLine>,
    pub lines: Vec<GuessLine>,
    pub hints: Vec<Hint>,
    pub balances: Vec<(Product, u32)>,
    /// Shown once the session can no longer continue
    pub solution: Option<String>,
}

/// A transition's return value plus the entitlement it spent, if any
struct Applied<T> {
    value: T,
    spent: Option<Product>,
}

impl<T> Applied<T> {
    const fn free(value: T) -> Self {
        Self { value, spent: None }
    }
}

pub struct GameService<S: Store, L: EntitlementLedger, R: RateLimiter> {
    store: S,
    ledger: L,
    limiter: R,
    bank: WordBank,
    config: EngineConfig,
}

impl<S: Store, L: EntitlementLedger, R: RateLimiter> GameService<S, L, R> {
    #[must_use]
    pub const fn new(store: S, ledger: L, limiter: R, bank: WordBank, config: EngineConfig) -> Self {
        Self {
            store,
            ledger,
            limiter,
            bank,
            config,
        }
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub const fn ledger(&self) -> &L {
        &self.ledger
    }

    pub const fn limiter(&self) -> &R {
        &self.limiter
    }

    pub const fn bank(&self) -> &WordBank {
        &self.bank
    }

    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn into_parts(self) -> (S, L) {
        (self.store, self.ledger)
    }

    /// Profile record, created on first sight
    pub fn profile(&self, profile: ProfileId) -> Profile {
        self.store
            .ensure_profile(profile, self.config.credits.cap())
    }

    /// Join the daily puzzle for `date`
    ///
    /// A profile has at most one session per daily puzzle; calling this again
    /// returns the existing one unchanged.
    ///
    /// # Errors
    /// Returns `Conflict` when no puzzle is published for the date.
    pub fn start_daily(&self, profile: ProfileId, date: NaiveDate, hard_mode: bool) -> Result<SessionView> {
        let puzzle = self
            .store
            .daily_puzzle(date)
            .ok_or(ConflictReason::NoDailyPuzzle(date))?;
        self.profile(profile);

        let session = self
            .store
            .insert_session(Session::new(profile, &puzzle, hard_mode, Utc::now()));
        info!(%profile, session = %session.id, %date, "daily session joined");

        Ok(self.view(&session, &puzzle, None))
    }

    /// Start a new arcade game of `letters` letters
    ///
    /// Paid for with one daily arcade credit, or an `arcade_new_game`
    /// entitlement once credits run out.
    ///
    /// # Errors
    /// - `Validation` for a length outside the supported range
    /// - `Exhausted` when the profile has neither credits nor entitlements
    pub fn start_arcade<G: Rng + ?Sized>(
        &self,
        profile: ProfileId,
        letters: usize,
        hard_mode: bool,
        rng: &mut G,
    ) -> Result<SessionView> {
        let unsupported = || ValidationError::UnsupportedLetterCount {
            got: letters,
            min: MIN_LETTERS,
            max: MAX_LETTERS,
        };
        if !(MIN_LETTERS..=MAX_LETTERS).contains(&letters) {
            return Err(unsupported().into());
        }
        let solution = self
            .bank
            .solutions_of_length(letters)
            .choose(rng)
            .map(|&w| w.clone())
            .ok_or_else(unsupported)?;

        let payment = self.pay_for_arcade(profile)?;

        let puzzle = Puzzle::arcade(solution, rng.random(), self.config.game.theme.clone());
        if let Err(err) = self.store.insert_puzzle(puzzle.clone()) {
            self.refund(profile, payment);
            return Err(err.into());
        }

        let session = self
            .store
            .insert_session(Session::new(profile, &puzzle, hard_mode, Utc::now()));
        info!(%profile, session = %session.id, letters, ?payment, "arcade session started");

        Ok(self.view(&session, &puzzle, None))
    }

    /// Current state of a session owned by `profile`
    ///
    /// # Errors
    /// Returns `NotFound` for unknown sessions and sessions of other profiles.
    pub fn session_view(&self, profile: ProfileId, session_id: Uuid) -> Result<SessionView> {
        let session = self.owned_session(profile, session_id)?;
        let puzzle = self.store.puzzle(session.puzzle_id)?;
        Ok(self.view(&session, &puzzle, None))
    }

    /// Submit one guess
    ///
    /// # Errors
    /// - `Conflict(RateLimited)` when the profile is over its request budget
    /// - everything [`Session::submit_guess`] can return
    /// - `NotFound` / `RaceLost` from loading and committing
    pub fn submit_guess(&self, profile: ProfileId, session_id: Uuid, guess: &str) -> Result<SessionView> {
        if !self.limiter.admit("guess", &profile.to_string()) {
            warn!(%profile, "guess rate limited");
            return Err(ConflictReason::RateLimited.into());
        }

        let (session, puzzle, outcome) = self.transition(profile, session_id, |session, puzzle| {
            session
                .submit_guess(puzzle, guess, &self.bank, &self.config.game, Utc::now())
                .map(Applied::free)
        })?;

        if outcome.status == SessionStatus::Won
            && let (PuzzleMode::Daily, Some(date)) = (puzzle.mode, puzzle.calendar_date)
        {
            self.record_daily_win(profile, date)?;
        }

        Ok(self.view(&session, &puzzle, Some(outcome.feedback)))
    }

    /// Reveal one letter of an arcade solution
    ///
    /// # Errors
    /// See [`Session::use_hint`].
    pub fn use_hint<G: Rng + ?Sized>(&self, profile: ProfileId, session_id: Uuid, rng: &mut G) -> Result<SessionView> {
        let max_hints = self.config.game.hint_ceiling();
        let (session, puzzle, _) = self.transition(profile, session_id, |session, puzzle| {
            let outcome = session.use_hint(puzzle, &self.ledger, rng, max_hints)?;
            Ok(Applied {
                spent: outcome.revealed.map(|_| Product::ArcadeHint),
                value: outcome,
            })
        })?;
        Ok(self.view(&session, &puzzle, None))
    }

    /// Continue a lost arcade session with one more attempt
    ///
    /// # Errors
    /// See [`Session::resume_with_extra_try`].
    pub fn resume_with_extra_try(&self, profile: ProfileId, session_id: Uuid) -> Result<SessionView> {
        let (session, puzzle, ()) = self.transition(profile, session_id, |session, _| {
            session.resume_with_extra_try(&self.ledger)?;
            Ok(Applied {
                value: (),
                spent: Some(Product::ArcadeExtraTry),
            })
        })?;
        Ok(self.view(&session, &puzzle, None))
    }

    /// Accept a loss
    ///
    /// # Errors
    /// See [`Session::finish`].
    pub fn finish(&self, profile: ProfileId, session_id: Uuid) -> Result<SessionView> {
        let (session, puzzle, ()) = self.transition(profile, session_id, |session, _| {
            session.finish(Utc::now()).map(Applied::free)
        })?;
        Ok(self.view(&session, &puzzle, None))
    }

    /// Close a won session
    ///
    /// # Errors
    /// See [`Session::acknowledge_win`].
    pub fn acknowledge_win(&self, profile: ProfileId, session_id: Uuid) -> Result<SessionView> {
        let (session, puzzle, ()) = self.transition(profile, session_id, |session, _| {
            session.acknowledge_win(Utc::now()).map(Applied::free)
        })?;
        Ok(self.view(&session, &puzzle, None))
    }

    /// Purchase completion: credit `n` units of `product`
    pub fn grant_purchase(&self, profile: ProfileId, product: Product, n: u32) -> Vec<(Product, u32)> {
        self.profile(profile);
        self.ledger.grant(profile, product, n);
        self.ledger.balances(profile)
    }

    fn owned_session(&self, profile: ProfileId, session_id: Uuid) -> Result<Session> {
        let session = self.store.session(session_id)?;
        if session.profile_id != profile {
            debug!(%profile, session = %session_id, "session belongs to another profile");
            return Err(GameError::NotFound(NotFoundTarget::Session(session_id)));
        }
        Ok(session)
    }

    /// Load, apply, commit; retry on a lost race
    fn transition<T>(
        &self,
        profile: ProfileId,
        session_id: Uuid,
        mut apply: impl FnMut(&mut Session, &Puzzle) -> Result<Applied<T>>,
    ) -> Result<(Session, Puzzle, T)> {
        let mut retries = 0;
        loop {
            let mut session = self.owned_session(profile, session_id)?;
            let puzzle = self.store.puzzle(session.puzzle_id)?;
            let applied = apply(&mut session, &puzzle)?;

            match self.store.commit_session(&session) {
                Ok(version) => {
                    session.version = version;
                    return Ok((session, puzzle, applied.value));
                }
                Err(err) => {
                    if let Some(product) = applied.spent {
                        self.ledger.grant(profile, product, 1);
                    }
                    if err == GameError::RaceLost && retries < RACE_RETRIES {
                        retries += 1;
                        warn!(session = %session_id, retries, "commit lost a race, retrying");
                        continue;
                    }
                    return Err(err);
                }
            }
        }
    }

    fn pay_for_arcade(&self, profile: ProfileId) -> Result<ArcadePayment> {
        self.profile(profile);
        let mut paid = false;
        self.store.update_profile(profile, &mut |p| {
            if p.arcade_credits > 0 {
                p.arcade_credits -= 1;
                paid = true;
            }
        })?;
        if paid {
            return Ok(ArcadePayment::Credit);
        }

        self.ledger
            .consume(profile, Product::ArcadeNewGame)
            .map(|()| ArcadePayment::Entitlement)
    }

    fn refund(&self, profile: ProfileId, payment: ArcadePayment) {
        let cap = self.config.credits.cap();
        match payment {
            ArcadePayment::Credit => {
                let refunded = self.store.update_profile(profile, &mut |p| {
                    p.arcade_credits = p.arcade_credits.saturating_add(1).min(cap);
                });
                if let Err(err) = refunded {
                    warn!(%profile, %err, "arcade credit refund failed");
                }
            }
            ArcadePayment::Entitlement => self.ledger.grant(profile, Product::ArcadeNewGame, 1),
        }
    }

    fn record_daily_win(&self, profile: ProfileId, date: NaiveDate) -> Result<()> {
        let mut counted = false;
        let updated = self.store.update_profile(profile, &mut |p| {
            counted = p.record_daily_win(date);
        })?;
        if counted {
            info!(%profile, streak = updated.streak_current, "daily streak extended");
        }
        Ok(())
    }

    fn view(&self, session: &Session, puzzle: &Puzzle, feedback: Option<FeedbackLine>) -> SessionView {
        let over = matches!(session.status, SessionStatus::Won | SessionStatus::Closed);
        SessionView {
            session_id: session.id,
            mode: session.mode,
            letter_count: puzzle.letter_count(),
            attempts_used: session.attempts_used,
            max_attempts: puzzle.max_attempts(self.config.game.daily_attempts()),
            status: session.status_label(),
            closed: session.status == SessionStatus::Closed,
            feedback,
            lines: session.lines.clone(),
            hints: session.hints_used.clone(),
            balances: self.ledger.balances(session.profile_id),
            solution: over.then(|| puzzle.solution.text().to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ArcadePayment {
    Credit,
    Entitlement,
}
