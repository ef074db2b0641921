//! Durable state behind the engine
//!
//! The engine only talks to storage through [`Store`]. Session writes are
//! compare-and-increment on `Session::version`, so two requests that loaded the
//! same version cannot both commit.

mod memory;
mod state_file;

pub use memory::{MemoryStore, StoreSnapshot};
pub use state_file::{StateFile, StateFileError};

use crate::Result;
use crate::profile::{Profile, ProfileId};
use crate::session::{Puzzle, Session};
use chrono::NaiveDate;
use rustc_hash::FxHashSet;
use uuid::Uuid;

/// A second daily puzzle for the same date was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("a daily puzzle for {0} already exists")]
pub struct DuplicateDaily(pub NaiveDate);

pub trait Store: Send + Sync {
    /// Persist a puzzle; daily puzzles are unique per calendar date
    ///
    /// # Errors
    /// Returns `DuplicateDaily` if a daily puzzle for the date exists.
    fn insert_puzzle(&self, puzzle: Puzzle) -> std::result::Result<(), DuplicateDaily>;

    /// # Errors
    /// Returns `NotFound` for an unknown id.
    fn puzzle(&self, id: Uuid) -> Result<Puzzle>;

    fn daily_puzzle(&self, date: NaiveDate) -> Option<Puzzle>;

    /// Delete daily puzzles dated before `date`, with their sessions
    ///
    /// Returns the number of puzzles removed.
    fn purge_daily_before(&self, date: NaiveDate) -> usize;

    /// Persist a new session
    ///
    /// For daily puzzles an existing session of the same profile wins and is
    /// returned instead, keeping one daily session per (profile, puzzle).
    fn insert_session(&self, session: Session) -> Session;

    /// # Errors
    /// Returns `NotFound` for an unknown id.
    fn session(&self, id: Uuid) -> Result<Session>;

    /// Write `session` if the stored version still equals `session.version`
    ///
    /// Returns the new version.
    ///
    /// # Errors
    /// - `RaceLost` if another writer committed first
    /// - `NotFound` if the session no longer exists
    fn commit_session(&self, session: &Session) -> Result<u64>;

    fn daily_session(&self, profile: ProfileId, puzzle: Uuid) -> Option<Session>;

    /// Profiles whose session on `puzzle` was won
    fn winners(&self, puzzle: Uuid) -> FxHashSet<ProfileId>;

    /// Fetch a profile, creating it with `credit_cap` credits if new
    fn ensure_profile(&self, id: ProfileId, credit_cap: u8) -> Profile;

    /// Apply `update` to a profile atomically
    ///
    /// # Errors
    /// Returns `NotFound` for an unknown profile.
    fn update_profile(&self, id: ProfileId, update: &mut dyn FnMut(&mut Profile)) -> Result<Profile>;

    /// Set every profile's arcade credits to `cap`; returns profiles changed
    fn replenish_credits(&self, cap: u8) -> usize;

    /// Zero positive streaks of everyone not in `keep`; returns profiles changed
    fn reset_streaks_except(&self, keep: &FxHashSet<ProfileId>) -> usize;

    /// Solutions already used in the current rotation cycle
    fn used_solutions(&self) -> Vec<String>;

    fn set_used_solutions(&self, used: Vec<String>);
}
