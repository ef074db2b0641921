//! Word list loading utilities
//!
//! Provides functions to load word lists from files or use embedded constants.

use crate::core::Word;
use std::fs;
use std::io;
use std::path::Path;

/// Load words from a file, one per line
///
/// Blank lines and lines starting with `#` are skipped, as are entries that do
/// not normalize to a valid word.
///
/// # Errors
///
/// Returns an I/O error if the file cannot be read or opened.
///
/// # Examples
/// ```no_run
/// use slovo_arcade::wordlists::loader::load_from_file;
///
/// let words = load_from_file("data/animals.txt", true).unwrap();
/// println!("Loaded {} words", words.len());
/// ```
pub fn load_from_file<P: AsRef<Path>>(path: P, collapse_yo: bool) -> io::Result<Vec<Word>> {
    let content = fs::read_to_string(path)?;
    Ok(words_from_lines(content.lines(), collapse_yo))
}

/// Convert embedded string slice to Word vector
///
/// # Examples
/// ```
/// use slovo_arcade::wordlists::loader::words_from_slice;
/// use slovo_arcade::wordlists::SOLUTIONS;
///
/// let words = words_from_slice(SOLUTIONS);
/// assert_eq!(words.len(), SOLUTIONS.len());
/// ```
#[must_use]
pub fn words_from_slice(slice: &[&str]) -> Vec<Word> {
    words_from_lines(slice.iter().copied(), true)
}

fn words_from_lines<'a>(lines: impl Iterator<Item = &'a str>, collapse_yo: bool) -> Vec<Word> {
    lines
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| Word::normalized(line, collapse_yo).ok())
        .collect()
}
