//! Core domain types for the puzzle
//!
//! Words, feedback scoring and hard mode rules. Everything here is pure and
//! independent of storage, sessions and entitlements.

mod feedback;
mod guess_line;
pub mod hard_mode;
mod word;

pub use feedback::{FeedbackLine, LengthMismatch, Tile, evaluate, evaluate_letters};
pub use guess_line::GuessLine;
pub use hard_mode::HardModeViolation;
pub use word::{MAX_LETTERS, MIN_LETTERS, Word, WordError, is_russian_letter};
