//! Formatting utilities for terminal output

use crate::core::{FeedbackLine, Tile};
use crate::ledger::Product;
use crate::session::Hint;
use colored::Colorize;

/// Guess letters colored by their tiles, followed by the emoji row
#[must_use]
pub fn feedback_row(guess: &str, feedback: &FeedbackLine) -> String {
    let letters: Vec<String> = guess
        .chars()
        .zip(feedback.tiles())
        .map(|(ch, tile)| {
            let cell = format!(" {} ", ch.to_uppercase());
            match tile {
                Tile::Correct => cell.black().on_green().to_string(),
                Tile::Present => cell.black().on_yellow().to_string(),
                Tile::Absent => cell.white().on_bright_black().to_string(),
            }
        })
        .collect();

    format!("{}  {}", letters.concat(), feedback.to_emoji())
}

/// Known letters by position, `_` for the rest
#[must_use]
pub fn hint_mask(letter_count: usize, hints: &[Hint]) -> String {
    (0..letter_count)
        .map(|pos| {
            hints
                .iter()
                .find(|h| h.position == pos)
                .map_or_else(|| "_".to_string(), |h| h.letter.to_uppercase().to_string())
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// `arcade_hint: 2, arcade_extra_try: 0, ...`
#[must_use]
pub fn balances_line(balances: &[(Product, u32)]) -> String {
    balances
        .iter()
        .map(|(product, n)| format!("{product}: {n}"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Create a progress bar string
#[must_use]
pub fn create_progress_bar(value: f64, max: f64, width: usize) -> String {
    if max <= 0.0 {
        return "░".repeat(width);
    }
    // Cast is safe: values are clamped to [0, width]
    let filled = ((value / max) * width as f64) as usize;
    let filled = filled.min(width);

    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feedback_row_ends_with_emoji() {
        let feedback = FeedbackLine::parse("G-Y").unwrap();
        let row = feedback_row("кот", &feedback);
        assert!(row.ends_with("🟩⬜🟨"));
        assert!(row.contains('К'));
    }

    #[test]
    fn hint_mask_shows_revealed_letters() {
        let hints = [
            Hint {
                letter: 'л',
                position: 1,
            },
            Hint {
                letter: 'о',
                position: 4,
            },
        ];
        assert_eq!(hint_mask(5, &hints), "_ Л _ _ О");
        assert_eq!(hint_mask(4, &[]), "_ _ _ _");
    }

    #[test]
    fn balances_are_listed_in_order() {
        let line = balances_line(&[(Product::ArcadeHint, 2), (Product::ArcadeExtraTry, 0)]);
        assert_eq!(line, "arcade_hint: 2, arcade_extra_try: 0");
    }

    #[test]
    fn progress_bar_empty() {
        let bar = create_progress_bar(0.0, 100.0, 10);
        assert_eq!(bar, "░░░░░░░░░░");
    }

    #[test]
    fn progress_bar_half() {
        let bar = create_progress_bar(50.0, 100.0, 10);
        assert_eq!(bar, "█████░░░░░");
    }

    #[test]
    fn progress_bar_zero_max() {
        assert_eq!(create_progress_bar(3.0, 0.0, 4), "░░░░");
    }
}
