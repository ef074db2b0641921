//! Word lists for puzzles and guesses
//!
//! Provides embedded word lists compiled into the binary and the dictionary
//! lookup built on them.

mod dictionary;
mod embedded;
pub mod loader;

pub use dictionary::{COMMON_THEME, Dictionary, WordBank};
pub use embedded::{ALLOWED, ALLOWED_COUNT, SOLUTIONS, SOLUTIONS_COUNT};
