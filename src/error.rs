//! Error kinds surfaced by engine operations
//!
//! Every error is scoped to the single operation that raised it.

use crate::core::{HardModeViolation, LengthMismatch, WordError};
use crate::ledger::Product;
use crate::storage::DuplicateDaily;
use thiserror::Error;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, GameError>;

/// Flat discriminant for mapping errors onto a transport
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Conflict,
    Exhausted,
    HardMode,
    NotFound,
    RaceLost,
}

/// Bad input; surfaced verbatim to the caller
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0}")]
    Word(#[from] WordError),
    #[error(transparent)]
    Length(#[from] LengthMismatch),
    #[error("word '{0}' is not in the dictionary")]
    NotInDictionary(String),
    #[error("word '{0}' was already guessed")]
    DuplicateGuess(String),
    #[error("arcade puzzles use {min} to {max} letters, got {got}")]
    UnsupportedLetterCount { got: usize, min: usize, max: usize },
}

/// Operation is not allowed in the current state
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConflictReason {
    #[error("session is not in play")]
    NotPlaying,
    #[error("attempts exhausted")]
    AttemptsExhausted,
    #[error("session can only be resumed after a loss")]
    NotLost,
    #[error("session can only be acknowledged after a win")]
    NotWon,
    #[error("extra tries and hints are only available in arcade mode")]
    ArcadeOnly,
    #[error("too many requests, slow down")]
    RateLimited,
    #[error("no puzzle is published for {0}")]
    NoDailyPuzzle(chrono::NaiveDate),
    #[error("a daily puzzle for {0} already exists")]
    DailyExists(chrono::NaiveDate),
}

/// What could not be found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotFoundTarget {
    Session(Uuid),
    Puzzle(Uuid),
    Profile(i64),
}

impl std::fmt::Display for NotFoundTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Session(id) => write!(f, "session {id}"),
            Self::Puzzle(id) => write!(f, "puzzle {id}"),
            Self::Profile(id) => write!(f, "profile {id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("conflict: {0}")]
    Conflict(#[from] ConflictReason),
    #[error("no {0} left")]
    Exhausted(Product),
    #[error("hard mode: {0}")]
    HardMode(#[from] HardModeViolation),
    #[error("{0} not found")]
    NotFound(NotFoundTarget),
    #[error("concurrent update detected, try again")]
    RaceLost,
}

impl GameError {
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Exhausted(_) => ErrorKind::Exhausted,
            Self::HardMode(_) => ErrorKind::HardMode,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::RaceLost => ErrorKind::RaceLost,
        }
    }
}

impl From<WordError> for GameError {
    fn from(value: WordError) -> Self {
        ValidationError::from(value).into()
    }
}

impl From<DuplicateDaily> for GameError {
    fn from(DuplicateDaily(date): DuplicateDaily) -> Self {
        ConflictReason::DailyExists(date).into()
    }
}

impl From<LengthMismatch> for GameError {
    fn from(value: LengthMismatch) -> Self {
        ValidationError::from(value).into()
    }
}
