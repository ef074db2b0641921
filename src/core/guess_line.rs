//! A recorded guess with its feedback

use super::FeedbackLine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One submitted guess inside a session, in submission order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessLine {
    /// 1-based index within the session
    pub guess_index: u32,
    /// Text exactly as the player typed it
    pub text_input: String,
    /// Normalized text that was scored
    pub text_norm: String,
    pub feedback: FeedbackLine,
    pub created_at: DateTime<Utc>,
}

impl GuessLine {
    /// Letters of the normalized guess
    pub fn letters(&self) -> impl Iterator<Item = char> + '_ {
        self.text_norm.chars()
    }
}
