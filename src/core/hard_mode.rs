//! Hard mode constraint checking
//!
//! In hard mode every revealed hint must be reused: letters scored correct stay
//! in place and letters scored present appear somewhere in the next guess.

use super::{GuessLine, Tile, Word};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Why a guess breaks hard mode
///
/// Positions are 1-based in messages, 0-based in the fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum HardModeViolation {
    #[error("letter '{}' must stay in position {}", .letter, .position + 1)]
    MissingCorrect { letter: char, position: usize },
    #[error("guess must contain letter '{letter}'")]
    MissingPresent { letter: char },
}

/// Letters revealed by previous guesses
#[derive(Debug, Default)]
struct Revealed {
    pinned: FxHashMap<usize, char>,
    must_appear: Vec<char>,
}

impl Revealed {
    fn collect(previous: &[GuessLine]) -> Self {
        let mut revealed = Self::default();
        for line in previous {
            for (position, (letter, &tile)) in line.letters().zip(line.feedback.tiles()).enumerate()
            {
                match tile {
                    Tile::Correct => {
                        revealed.pinned.insert(position, letter);
                    }
                    Tile::Present if !revealed.must_appear.contains(&letter) => {
                        revealed.must_appear.push(letter);
                    }
                    Tile::Present | Tile::Absent => {}
                }
            }
        }
        revealed
    }
}

/// Check `next` against everything revealed by `previous`
///
/// The first guess of a session is never constrained.
///
/// # Errors
/// Returns the first violated requirement: pinned positions are checked in
/// position order, then must-appear letters in the order they were revealed.
///
/// # Examples
/// ```
/// use chrono::Utc;
/// use slovo_arcade::core::{hard_mode, FeedbackLine, GuessLine, Word};
///
/// let first = GuessLine {
///     guess_index: 1,
///     text_input: "кран".into(),
///     text_norm: "кран".into(),
///     feedback: FeedbackLine::parse("G-Y-").unwrap(),
///     created_at: Utc::now(),
/// };
///
/// assert!(hard_mode::validate(&[first.clone()], &Word::new("каша").unwrap()).is_ok());
/// assert!(hard_mode::validate(&[first], &Word::new("луна").unwrap()).is_err());
/// ```
pub fn validate(previous: &[GuessLine], next: &Word) -> Result<(), HardModeViolation> {
    if previous.is_empty() {
        return Ok(());
    }

    let revealed = Revealed::collect(previous);

    let mut pinned: Vec<(usize, char)> = revealed.pinned.iter().map(|(&p, &l)| (p, l)).collect();
    pinned.sort_unstable();

    for &(position, letter) in &pinned {
        if next.letters().get(position) != Some(&letter) {
            return Err(HardModeViolation::MissingCorrect { letter, position });
        }
    }

    for &letter in &revealed.must_appear {
        let satisfied = next.letters().iter().enumerate().any(|(i, &ch)| {
            ch == letter
                && revealed
                    .pinned
                    .get(&i)
                    .is_none_or(|&required| required == letter)
        });
        if !satisfied {
            return Err(HardModeViolation::MissingPresent { letter });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::FeedbackLine;
    use chrono::Utc;

    fn line(index: u32, text: &str, feedback: &str) -> GuessLine {
        GuessLine {
            guess_index: index,
            text_input: text.to_string(),
            text_norm: text.to_string(),
            feedback: FeedbackLine::parse(feedback).unwrap(),
            created_at: Utc::now(),
        }
    }

    fn word(text: &str) -> Word {
        Word::new(text).unwrap()
    }

    #[test]
    fn first_guess_is_unconstrained() {
        assert!(validate(&[], &word("книга")).is_ok());
    }

    #[test]
    fn correct_letter_must_stay_in_place() {
        // к correct at index 0, р present
        let previous = [line(1, "кран", "GY--")];

        assert!(validate(&previous, &word("кора")).is_ok());
        assert_eq!(
            validate(&previous, &word("сора")),
            Err(HardModeViolation::MissingCorrect {
                letter: 'к',
                position: 0
            })
        );
    }

    #[test]
    fn present_letter_must_appear_somewhere() {
        let previous = [line(1, "кран", "GY--")];

        let err = validate(&previous, &word("кило")).unwrap_err();
        assert_eq!(err, HardModeViolation::MissingPresent { letter: 'р' });
        assert_eq!(err.to_string(), "guess must contain letter 'р'");
    }

    #[test]
    fn requirements_accumulate_across_lines() {
        let previous = [line(1, "кран", "G---"), line(2, "кото", "GY--")];

        // needs к at 0 and an о somewhere
        assert!(validate(&previous, &word("кино")).is_ok());
        assert_eq!(
            validate(&previous, &word("кила")),
            Err(HardModeViolation::MissingPresent { letter: 'о' })
        );
    }

    #[test]
    fn letter_both_correct_and_present_needs_each_satisfied_once() {
        // о correct at index 1 in one guess, present in another
        let previous = [line(1, "сова", "-G--"), line(2, "окно", "Y---")];

        assert!(validate(&previous, &word("роща")).is_ok());
        assert_eq!(
            validate(&previous, &word("рыба")),
            Err(HardModeViolation::MissingCorrect {
                letter: 'о',
                position: 1
            })
        );
    }

    #[test]
    fn violation_message_uses_one_based_position() {
        let violation = HardModeViolation::MissingCorrect {
            letter: 'к',
            position: 0,
        };
        assert_eq!(violation.to_string(), "letter 'к' must stay in position 1");
    }
}
