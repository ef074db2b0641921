//! Puzzle and session records

use crate::core::{GuessLine, Word};
use crate::profile::ProfileId;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PuzzleMode {
    Daily,
    Arcade,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PuzzleStatus {
    Draft,
    Published,
    Retired,
}

/// A word to be guessed; immutable once published
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Puzzle {
    pub id: Uuid,
    pub mode: PuzzleMode,
    pub calendar_date: Option<NaiveDate>,
    pub solution: Word,
    pub status: PuzzleStatus,
    pub seed: u64,
    pub theme: String,
}

impl Puzzle {
    /// Published daily puzzle for `date`
    #[must_use]
    pub fn daily(date: NaiveDate, solution: Word, seed: u64, theme: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            mode: PuzzleMode::Daily,
            calendar_date: Some(date),
            solution,
            status: PuzzleStatus::Published,
            seed,
            theme: theme.into(),
        }
    }

    /// Published arcade puzzle
    #[must_use]
    pub fn arcade(solution: Word, seed: u64, theme: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            mode: PuzzleMode::Arcade,
            calendar_date: None,
            solution,
            status: PuzzleStatus::Published,
            seed,
            theme: theme.into(),
        }
    }

    #[inline]
    #[must_use]
    pub fn letter_count(&self) -> usize {
        self.solution.len()
    }

    /// Attempt limit: fixed for daily puzzles, one more than the length in arcade
    #[must_use]
    pub fn max_attempts(&self, daily_max_attempts: u32) -> u32 {
        match self.mode {
            PuzzleMode::Daily => daily_max_attempts,
            PuzzleMode::Arcade => self.letter_count() as u32 + 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameResult {
    Win,
    Lose,
}

/// Life-cycle position of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Playing,
    Won,
    Lost,
    /// Terminal; no transition leaves this state
    Closed,
}

/// A letter revealed by a hint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hint {
    pub letter: char,
    /// 0-based
    pub position: usize,
}

/// One player's attempt at one puzzle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub profile_id: ProfileId,
    pub puzzle_id: Uuid,
    pub mode: PuzzleMode,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub attempts_used: u32,
    pub result: Option<GameResult>,
    pub status: SessionStatus,
    pub hard_mode: bool,
    pub hints_used: Vec<Hint>,
    pub lines: Vec<GuessLine>,
    /// Guesses undone by extra tries; kept for statistics, not displayed
    pub hidden_attempts: Vec<GuessLine>,
    /// Bumped by storage on every committed transition
    pub version: u64,
}

impl Session {
    /// Fresh session in play with no attempts
    #[must_use]
    pub fn new(profile_id: ProfileId, puzzle: &Puzzle, hard_mode: bool, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            profile_id,
            puzzle_id: puzzle.id,
            mode: puzzle.mode,
            started_at: now,
            ended_at: None,
            attempts_used: 0,
            result: None,
            status: SessionStatus::Playing,
            hard_mode,
            hints_used: Vec::new(),
            lines: Vec::new(),
            hidden_attempts: Vec::new(),
            version: 0,
        }
    }

    /// Status as shown to clients: `playing`, `won` or `lost`
    #[must_use]
    pub const fn status_label(&self) -> &'static str {
        match (self.status, self.result) {
            (SessionStatus::Playing, _) => "playing",
            (SessionStatus::Won, _) | (SessionStatus::Closed, Some(GameResult::Win)) => "won",
            (SessionStatus::Lost | SessionStatus::Closed, _) => "lost",
        }
    }

    #[must_use]
    pub const fn is_playing(&self) -> bool {
        matches!(self.status, SessionStatus::Playing)
    }
}
