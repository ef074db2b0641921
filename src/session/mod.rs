//! Puzzle sessions
//!
//! Records for puzzles and sessions, and the state machine that moves a
//! session through play.

mod machine;
mod types;

pub use machine::{GuessOutcome, HintOutcome};
pub use types::{GameResult, Hint, Puzzle, PuzzleMode, PuzzleStatus, Session, SessionStatus};
