//! Evaluate command
//!
//! Scores one guess against a solution without a session.

use crate::core::{FeedbackLine, Tile, Word, evaluate};
use crate::error::Result;
use serde::Serialize;

/// Result of scoring a guess
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EvaluationResult {
    pub guess: String,
    pub solution: String,
    pub feedback: FeedbackLine,
    pub correct: usize,
    pub present: usize,
}

/// Score `guess` against `solution`
///
/// Both words are normalized the same way a session would normalize them.
///
/// # Errors
///
/// Returns a validation error if either word is malformed or the lengths differ.
pub fn evaluate_words(guess: &str, solution: &str, collapse_yo: bool) -> Result<EvaluationResult> {
    let guess = Word::normalized(guess, collapse_yo)?;
    let solution = Word::normalized(solution, collapse_yo)?;
    let feedback = evaluate(&guess, &solution)?;

    Ok(EvaluationResult {
        guess: guess.text().to_string(),
        solution: solution.text().to_string(),
        correct: feedback.count(Tile::Correct),
        present: feedback.count(Tile::Present),
        feedback,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn evaluates_normalized_words() {
        let result = evaluate_words("ЁЛКА", "елка", true).unwrap();
        assert_eq!(result.guess, "елка");
        assert!(result.feedback.is_solved());
        assert_eq!(result.correct, 4);
    }

    #[test]
    fn counts_tiles() {
        let result = evaluate_words("абваб", "ааббв", true).unwrap();
        assert_eq!(result.correct, 1);
        assert_eq!(result.present, 4);
    }

    #[test]
    fn rejects_bad_input() {
        let err = evaluate_words("слово", "кран", true).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        let err = evaluate_words("word", "слово", true).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}
