//! In-memory store
//!
//! All tables sit behind one `RwLock`, which makes every trait method atomic.

use super::{DuplicateDaily, Store};
use crate::error::{GameError, NotFoundTarget, Result};
use crate::profile::{Profile, ProfileId};
use crate::session::{GameResult, Puzzle, PuzzleMode, Session};
use chrono::NaiveDate;
use parking_lot::RwLock;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

/// Serializable contents of a [`MemoryStore`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    puzzles: HashMap<Uuid, Puzzle>,
    daily_index: BTreeMap<NaiveDate, Uuid>,
    sessions: HashMap<Uuid, Session>,
    profiles: BTreeMap<ProfileId, Profile>,
    used_solutions: Vec<String>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<StoreSnapshot>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        Self {
            tables: RwLock::new(snapshot),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> StoreSnapshot {
        self.tables.read().clone()
    }

    /// Sessions belonging to `profile`, newest first
    #[must_use]
    pub fn sessions_of(&self, profile: ProfileId) -> Vec<Session> {
        let tables = self.tables.read();
        let mut sessions: Vec<Session> = tables
            .sessions
            .values()
            .filter(|s| s.profile_id == profile)
            .cloned()
            .collect();
        sessions.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        sessions
    }
}

impl Store for MemoryStore {
    fn insert_puzzle(&self, puzzle: Puzzle) -> std::result::Result<(), DuplicateDaily> {
        let mut tables = self.tables.write();
        if let (PuzzleMode::Daily, Some(date)) = (puzzle.mode, puzzle.calendar_date) {
            if tables.daily_index.contains_key(&date) {
                return Err(DuplicateDaily(date));
            }
            tables.daily_index.insert(date, puzzle.id);
        }
        tables.puzzles.insert(puzzle.id, puzzle);
        Ok(())
    }

    fn puzzle(&self, id: Uuid) -> Result<Puzzle> {
        self.tables
            .read()
            .puzzles
            .get(&id)
            .cloned()
            .ok_or(GameError::NotFound(NotFoundTarget::Puzzle(id)))
    }

    fn daily_puzzle(&self, date: NaiveDate) -> Option<Puzzle> {
        let tables = self.tables.read();
        let id = tables.daily_index.get(&date)?;
        tables.puzzles.get(id).cloned()
    }

    fn purge_daily_before(&self, date: NaiveDate) -> usize {
        let mut tables = self.tables.write();
        let stale: Vec<(NaiveDate, Uuid)> = tables
            .daily_index
            .range(..date)
            .map(|(&d, &id)| (d, id))
            .collect();

        for (day, id) in &stale {
            tables.daily_index.remove(day);
            tables.puzzles.remove(id);
            tables.sessions.retain(|_, s| s.puzzle_id != *id);
        }
        stale.len()
    }

    fn insert_session(&self, session: Session) -> Session {
        let mut tables = self.tables.write();
        if session.mode == PuzzleMode::Daily
            && let Some(existing) = tables.sessions.values().find(|s| {
                s.mode == PuzzleMode::Daily
                    && s.profile_id == session.profile_id
                    && s.puzzle_id == session.puzzle_id
            })
        {
            return existing.clone();
        }
        tables.sessions.insert(session.id, session.clone());
        session
    }

    fn session(&self, id: Uuid) -> Result<Session> {
        self.tables
            .read()
            .sessions
            .get(&id)
            .cloned()
            .ok_or(GameError::NotFound(NotFoundTarget::Session(id)))
    }

    fn commit_session(&self, session: &Session) -> Result<u64> {
        let mut tables = self.tables.write();
        let stored = tables
            .sessions
            .get_mut(&session.id)
            .ok_or(GameError::NotFound(NotFoundTarget::Session(session.id)))?;

        if stored.version != session.version {
            return Err(GameError::RaceLost);
        }

        let mut next = session.clone();
        next.version = session.version + 1;
        *stored = next;
        Ok(session.version + 1)
    }

    fn daily_session(&self, profile: ProfileId, puzzle: Uuid) -> Option<Session> {
        self.tables
            .read()
            .sessions
            .values()
            .find(|s| s.mode == PuzzleMode::Daily && s.profile_id == profile && s.puzzle_id == puzzle)
            .cloned()
    }

    fn winners(&self, puzzle: Uuid) -> FxHashSet<ProfileId> {
        self.tables
            .read()
            .sessions
            .values()
            .filter(|s| s.puzzle_id == puzzle && s.result == Some(GameResult::Win))
            .map(|s| s.profile_id)
            .collect()
    }

    fn ensure_profile(&self, id: ProfileId, credit_cap: u8) -> Profile {
        self.tables
            .write()
            .profiles
            .entry(id)
            .or_insert_with(|| Profile::new(id, credit_cap))
            .clone()
    }

    fn update_profile(&self, id: ProfileId, update: &mut dyn FnMut(&mut Profile)) -> Result<Profile> {
        let mut tables = self.tables.write();
        let profile = tables
            .profiles
            .get_mut(&id)
            .ok_or(GameError::NotFound(NotFoundTarget::Profile(id.0)))?;
        update(profile);
        Ok(profile.clone())
    }

    fn replenish_credits(&self, cap: u8) -> usize {
        let mut tables = self.tables.write();
        let mut changed = 0;
        for profile in tables.profiles.values_mut() {
            if profile.arcade_credits != cap {
                profile.arcade_credits = cap;
                changed += 1;
            }
        }
        changed
    }

    fn reset_streaks_except(&self, keep: &FxHashSet<ProfileId>) -> usize {
        let mut tables = self.tables.write();
        let mut changed = 0;
        for profile in tables.profiles.values_mut() {
            if profile.streak_current > 0 && !keep.contains(&profile.id) {
                profile.streak_current = 0;
                changed += 1;
            }
        }
        changed
    }

    fn used_solutions(&self) -> Vec<String> {
        self.tables.read().used_solutions.clone()
    }

    fn set_used_solutions(&self, used: Vec<String>) {
        self.tables.write().used_solutions = used;
    }
}
