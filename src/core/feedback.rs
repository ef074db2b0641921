//! Guess feedback calculation and representation
//!
//! Each guessed letter is scored as one of:
//! - Correct (right letter, right position)
//! - Present (letter is in the solution, elsewhere)
//! - Absent (letter is not in the solution, or all its occurrences are used up)

use super::Word;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Score of a single tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tile {
    Correct,
    Present,
    Absent,
}

impl Tile {
    /// Emoji used in shared results and the CLI
    #[must_use]
    pub const fn emoji(self) -> char {
        match self {
            Self::Correct => '🟩',
            Self::Present => '🟨',
            Self::Absent => '⬜',
        }
    }
}

/// Feedback for one guess, one tile per letter
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeedbackLine(Vec<Tile>);

/// Guess and solution differ in length
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("guess has {guess} letters but the solution has {solution}")]
pub struct LengthMismatch {
    pub guess: usize,
    pub solution: usize,
}

impl FeedbackLine {
    /// Wrap raw tiles
    #[must_use]
    pub const fn new(tiles: Vec<Tile>) -> Self {
        Self(tiles)
    }

    /// All tiles correct for a word of `len` letters
    #[must_use]
    pub fn solved(len: usize) -> Self {
        Self(vec![Tile::Correct; len])
    }

    #[inline]
    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.0
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check if every tile is correct
    #[must_use]
    pub fn is_solved(&self) -> bool {
        !self.0.is_empty() && self.0.iter().all(|&t| t == Tile::Correct)
    }

    /// Count tiles of the given kind
    #[must_use]
    pub fn count(&self, tile: Tile) -> usize {
        self.0.iter().filter(|&&t| t == tile).count()
    }

    /// Convert feedback to emoji string like "🟩🟨⬜🟩🟨"
    #[must_use]
    pub fn to_emoji(&self) -> String {
        self.0.iter().map(|t| t.emoji()).collect()
    }

    /// Parse feedback from a string like "GY-GY" or "🟩🟨⬜🟩🟨"
    ///
    /// Accepts:
    /// - 'G'/'g'/🟩 for correct
    /// - 'Y'/'y'/🟨 for present
    /// - '-'/'_'/⬜ for absent
    ///
    /// # Examples
    /// ```
    /// use slovo_arcade::core::FeedbackLine;
    ///
    /// let a = FeedbackLine::parse("GY-GY").unwrap();
    /// let b = FeedbackLine::parse("🟩🟨⬜🟩🟨").unwrap();
    /// assert_eq!(a, b);
    /// ```
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let tiles = s
            .chars()
            .map(|ch| match ch {
                'G' | 'g' | '🟩' => Some(Tile::Correct),
                'Y' | 'y' | '🟨' => Some(Tile::Present),
                '-' | '_' | '⬜' => Some(Tile::Absent),
                _ => None,
            })
            .collect::<Option<Vec<_>>>()?;

        (!tiles.is_empty()).then_some(Self(tiles))
    }
}

impl fmt::Display for FeedbackLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_emoji())
    }
}

/// Score `guess` against `solution`
///
/// Implements exact duplicate-letter rules: each letter is credited at most as
/// many times as it occurs in the solution.
///
/// # Algorithm
/// 1. Count the letters of the solution
/// 2. First pass: mark exact matches correct and remove them from the pool
/// 3. Second pass: mark remaining letters present while the pool has them
///
/// # Errors
/// Returns `LengthMismatch` if the words differ in length.
///
/// # Examples
/// ```
/// use slovo_arcade::core::{evaluate, Tile, Word};
///
/// let guess = Word::new("слово").unwrap();
/// let solution = Word::new("сосна").unwrap();
/// let feedback = evaluate(&guess, &solution).unwrap();
///
/// assert_eq!(feedback.tiles()[0], Tile::Correct);
/// assert_eq!(feedback.count(Tile::Present), 1);
/// ```
pub fn evaluate(guess: &Word, solution: &Word) -> Result<FeedbackLine, LengthMismatch> {
    evaluate_letters(guess.letters(), solution.letters())
}

/// Letter-slice form of [`evaluate`]
///
/// # Errors
/// Returns `LengthMismatch` if the slices differ in length.
pub fn evaluate_letters(guess: &[char], solution: &[char]) -> Result<FeedbackLine, LengthMismatch> {
    if guess.len() != solution.len() {
        return Err(LengthMismatch {
            guess: guess.len(),
            solution: solution.len(),
        });
    }

    let mut remaining = rustc_hash::FxHashMap::<char, u8>::default();
    for &ch in solution {
        *remaining.entry(ch).or_insert(0) += 1;
    }

    let mut result: Vec<Option<Tile>> = vec![None; guess.len()];

    // First pass: exact position matches
    for (i, (&g, &s)) in guess.iter().zip(solution).enumerate() {
        if g == s {
            result[i] = Some(Tile::Correct);
            if let Some(count) = remaining.get_mut(&g) {
                *count = count.saturating_sub(1);
            }
        }
    }

    // Second pass: wrong position, but letters still available
    for (i, &g) in guess.iter().enumerate() {
        if result[i].is_some() {
            continue;
        }
        let tile = match remaining.get_mut(&g) {
            Some(count) if *count > 0 => {
                *count -= 1;
                Tile::Present
            }
            _ => Tile::Absent,
        };
        result[i] = Some(tile);
    }

    Ok(FeedbackLine(
        result.into_iter().map(|t| t.unwrap_or(Tile::Absent)).collect(),
    ))
}
