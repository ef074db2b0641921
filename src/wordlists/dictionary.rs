//! Guess dictionary
//!
//! Membership checks only; sourcing the lists is someone else's job.

use super::loader::words_from_slice;
use super::{ALLOWED, SOLUTIONS};
use crate::core::Word;
use rustc_hash::{FxHashMap, FxHashSet};

/// Theme every bank carries
pub const COMMON_THEME: &str = "common";

/// Lookup used before a guess is scored
pub trait Dictionary: Send + Sync {
    fn is_allowed_guess(&self, word: &Word, theme: &str) -> bool;
}

/// Themed word sets plus the solution pool
#[derive(Debug, Clone, Default)]
pub struct WordBank {
    themes: FxHashMap<String, FxHashSet<String>>,
    solutions: Vec<Word>,
}

impl WordBank {
    /// Bank built from the embedded lists
    ///
    /// # Examples
    /// ```
    /// use slovo_arcade::core::Word;
    /// use slovo_arcade::wordlists::{Dictionary, WordBank};
    ///
    /// let bank = WordBank::embedded();
    /// assert!(bank.is_allowed_guess(&Word::new("слово").unwrap(), "common"));
    /// assert!(!bank.is_allowed_guess(&Word::new("ааааа").unwrap(), "common"));
    /// ```
    #[must_use]
    pub fn embedded() -> Self {
        Self::from_words(words_from_slice(SOLUTIONS), words_from_slice(ALLOWED))
    }

    /// Bank from explicit lists; solutions are always guessable
    #[must_use]
    pub fn from_words(solutions: Vec<Word>, guess_only: Vec<Word>) -> Self {
        let common: FxHashSet<String> = solutions
            .iter()
            .chain(&guess_only)
            .map(|w| w.text().to_string())
            .collect();

        let mut themes = FxHashMap::default();
        themes.insert(COMMON_THEME.to_string(), common);

        Self { themes, solutions }
    }

    /// Register (or extend) a named theme
    pub fn add_theme(&mut self, name: impl Into<String>, words: impl IntoIterator<Item = Word>) {
        self.themes
            .entry(name.into())
            .or_default()
            .extend(words.into_iter().map(|w| w.text().to_string()));
    }

    /// Every solution word
    #[must_use]
    pub fn solutions(&self) -> &[Word] {
        &self.solutions
    }

    /// Solution words with exactly `letters` letters
    #[must_use]
    pub fn solutions_of_length(&self, letters: usize) -> Vec<&Word> {
        self.solutions.iter().filter(|w| w.len() == letters).collect()
    }
}

impl Dictionary for WordBank {
    /// Unknown themes fall back to the common list. A guess kept with `ё`
    /// also matches its folded spelling.
    fn is_allowed_guess(&self, word: &Word, theme: &str) -> bool {
        let set = self
            .themes
            .get(theme)
            .or_else(|| self.themes.get(COMMON_THEME));
        set.is_some_and(|words| {
            words.contains(word.text())
                || (word.has_letter('ё') && words.contains(&word.text().replace('ё', "е")))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str) -> Word {
        Word::new(text).unwrap()
    }

    #[test]
    fn embedded_bank_accepts_solutions_and_guess_only_words() {
        let bank = WordBank::embedded();
        assert!(bank.is_allowed_guess(&word("пароход"), COMMON_THEME));
        assert!(bank.is_allowed_guess(&word("кошка"), COMMON_THEME));
        assert!(!bank.is_allowed_guess(&word("ккккк"), COMMON_THEME));
    }

    #[test]
    fn unfolded_yo_guess_matches_folded_list() {
        let bank = WordBank::from_words(words_from_slice(&["ёлка"]), vec![]);
        let kept = Word::normalized("ёлка", false).unwrap();

        assert_eq!(kept.text(), "ёлка");
        assert!(bank.is_allowed_guess(&kept, COMMON_THEME));
        assert!(bank.is_allowed_guess(&word("елка"), COMMON_THEME));
        assert!(!bank.is_allowed_guess(&Word::normalized("ёжик", false).unwrap(), COMMON_THEME));
    }

    #[test]
    fn guess_only_words_are_not_solutions() {
        let bank = WordBank::embedded();
        assert!(bank.solutions().iter().all(|w| w.text() != "кошка"));
    }

    #[test]
    fn solutions_of_length_filters() {
        let bank = WordBank::from_words(
            vec![word("кран"), word("слово"), word("книга")],
            vec![],
        );
        let five: Vec<&str> = bank.solutions_of_length(5).iter().map(|w| w.text()).collect();
        assert_eq!(five, vec!["слово", "книга"]);
        assert!(bank.solutions_of_length(7).is_empty());
    }

    #[test]
    fn themes_extend_and_fall_back() {
        let mut bank = WordBank::from_words(vec![word("слово")], vec![]);
        bank.add_theme("animals", [word("волк"), word("сова")]);

        assert!(bank.is_allowed_guess(&word("волк"), "animals"));
        assert!(!bank.is_allowed_guess(&word("слово"), "animals"));
        assert!(bank.is_allowed_guess(&word("слово"), "space"));
        assert!(!bank.is_allowed_guess(&word("волк"), "space"));
    }
}
