//! Normalized puzzle word
//!
//! A Word stores a 4 to 7 letter Russian word, lower-cased and optionally with
//! `ё` folded into `е`, together with its letters for tile-by-tile comparison.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Shortest word a puzzle may use
pub const MIN_LETTERS: usize = 4;
/// Longest word a puzzle may use
pub const MAX_LETTERS: usize = 7;

/// A normalized Russian word with letter tracking
///
/// Serializes as its text; deserializing re-validates without folding `ё`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Word {
    text: String,
    letters: Vec<char>,
}

/// Error type for invalid words
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WordError {
    #[error("word must be {MIN_LETTERS} to {MAX_LETTERS} letters, got {0}")]
    InvalidLength(usize),
    #[error("word may contain only Russian letters, found '{0}'")]
    InvalidCharacters(char),
}

/// Check whether a lower-case char belongs to the Russian alphabet
#[inline]
#[must_use]
pub fn is_russian_letter(ch: char) -> bool {
    ('а'..='я').contains(&ch) || ch == 'ё'
}

impl Word {
    /// Create a new Word, folding `ё` into `е`
    ///
    /// # Errors
    /// Returns `WordError` if the length is outside 4..=7 letters or the text
    /// contains anything other than Russian letters.
    ///
    /// # Examples
    /// ```
    /// use slovo_arcade::core::Word;
    ///
    /// let word = Word::new("Ёлка").unwrap();
    /// assert_eq!(word.text(), "елка");
    ///
    /// assert!(Word::new("кот").is_err());
    /// assert!(Word::new("crane").is_err());
    /// ```
    pub fn new(text: impl AsRef<str>) -> Result<Self, WordError> {
        Self::normalized(text, true)
    }

    /// Create a new Word with explicit control over `ё` folding
    ///
    /// # Errors
    /// Same as [`Word::new`].
    pub fn normalized(text: impl AsRef<str>, collapse_yo: bool) -> Result<Self, WordError> {
        let mut text = text.as_ref().trim().to_lowercase();
        if collapse_yo {
            text = text.replace('ё', "е");
        }

        let letters: Vec<char> = text.chars().collect();

        if !(MIN_LETTERS..=MAX_LETTERS).contains(&letters.len()) {
            return Err(WordError::InvalidLength(letters.len()));
        }

        if let Some(&bad) = letters.iter().find(|&&ch| !is_russian_letter(ch)) {
            return Err(WordError::InvalidCharacters(bad));
        }

        Ok(Self { text, letters })
    }

    /// Get the word as a string slice
    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Get the letters of the word
    #[inline]
    #[must_use]
    pub fn letters(&self) -> &[char] {
        &self.letters
    }

    /// Number of letters (not bytes)
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.letters.len()
    }

    /// Always false; a valid word has at least four letters
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }

    /// Get the letter at a specific position
    ///
    /// # Panics
    /// Panics if position >= `len()`
    #[inline]
    #[must_use]
    pub fn letter_at(&self, position: usize) -> char {
        self.letters[position]
    }

    /// Check if the word contains a specific letter
    #[inline]
    #[must_use]
    pub fn has_letter(&self, letter: char) -> bool {
        self.letters.contains(&letter)
    }

    /// Get the count of each letter in the word
    ///
    /// Used for feedback calculation with duplicate letters.
    #[must_use]
    pub fn letter_counts(&self) -> FxHashMap<char, u8> {
        let mut counts = FxHashMap::default();
        for &ch in &self.letters {
            *counts.entry(ch).or_insert(0) += 1;
        }
        counts
    }
}

impl TryFrom<String> for Word {
    type Error = WordError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::normalized(value, false)
    }
}

impl From<Word> for String {
    fn from(word: Word) -> Self {
        word.text
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn word_creation_valid() {
        let word = Word::new("слово").unwrap();
        assert_eq!(word.text(), "слово");
        assert_eq!(word.len(), 5);
        assert_eq!(word.letters(), &['с', 'л', 'о', 'в', 'о']);
    }

    #[test]
    fn word_creation_uppercase_normalized() {
        let word = Word::new("СЛОВО").unwrap();
        assert_eq!(word.text(), "слово");

        let word2 = Word::new("  СлОвО ").unwrap();
        assert_eq!(word2.text(), "слово");
    }

    #[test]
    fn word_yo_folding_is_optional() {
        assert_eq!(Word::new("ёжик").unwrap().text(), "ежик");
        assert_eq!(Word::normalized("ёжик", false).unwrap().text(), "ёжик");
    }

    #[test]
    fn word_length_counts_letters_not_bytes() {
        // Cyrillic letters are two bytes each in UTF-8
        let word = Word::new("пароход").unwrap();
        assert_eq!(word.len(), 7);
        assert_eq!(word.text().len(), 14);
    }

    #[test]
    fn word_creation_invalid_length() {
        assert_eq!(Word::new("кот"), Err(WordError::InvalidLength(3)));
        assert_eq!(Word::new("праздник"), Err(WordError::InvalidLength(8)));
        assert_eq!(Word::new(""), Err(WordError::InvalidLength(0)));
    }

    #[test]
    fn word_creation_invalid_characters() {
        assert_eq!(Word::new("crane"), Err(WordError::InvalidCharacters('c')));
        assert!(Word::new("сло3о").is_err());
        assert!(Word::new("сл во").is_err());
    }

    #[test]
    fn word_letter_at_and_has_letter() {
        let word = Word::new("книга").unwrap();
        assert_eq!(word.letter_at(0), 'к');
        assert_eq!(word.letter_at(4), 'а');
        assert!(word.has_letter('г'));
        assert!(!word.has_letter('я'));
    }

    #[test]
    fn word_letter_counts_duplicates() {
        let word = Word::new("молоко").unwrap();
        let counts = word.letter_counts();
        assert_eq!(counts.get(&'о'), Some(&3));
        assert_eq!(counts.get(&'м'), Some(&1));
        assert_eq!(counts.get(&'л'), Some(&1));
        assert_eq!(counts.get(&'к'), Some(&1));
    }

    #[test]
    fn word_serializes_as_text() {
        let word = Word::new("книга").unwrap();
        let json = serde_json::to_string(&word).unwrap();
        assert_eq!(json, "\"книга\"");
        assert_eq!(serde_json::from_str::<Word>(&json).unwrap(), word);
        assert!(serde_json::from_str::<Word>("\"кот\"").is_err());
    }

    #[test]
    fn word_display() {
        let word = Word::new("книга").unwrap();
        assert_eq!(format!("{word}"), "книга");
    }
}
