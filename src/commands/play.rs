//! Interactive text mode
//!
//! Plays daily or arcade sessions through [`GameService`] on a line-based
//! terminal. Reads commands from any `BufRead` and writes to any `Write`.

use crate::error::{ErrorKind, GameError};
use crate::ledger::EntitlementLedger;
use crate::output::formatters::{balances_line, feedback_row, hint_mask};
use crate::profile::ProfileId;
use crate::rate_limit::RateLimiter;
use crate::service::{GameService, SessionView};
use crate::session::PuzzleMode;
use crate::storage::Store;
use chrono::NaiveDate;
use colored::Colorize;
use rand::Rng;
use std::io::{self, BufRead, Write};

/// Which puzzle to play
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayMode {
    Daily(NaiveDate),
    Arcade { letters: usize },
}

/// Counts reported when the loop ends
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaySummary {
    pub sessions: usize,
    pub won: usize,
    pub lost: usize,
}

/// What the player asked for on one line
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Guess(String),
    Hint,
    ExtraTry,
    Finish,
    New,
    Help,
    Quit,
    Empty,
}

impl Command {
    fn parse(line: &str) -> Self {
        let line = line.trim();
        match line.to_lowercase().as_str() {
            "" => Self::Empty,
            "quit" | "q" | "exit" | "выход" => Self::Quit,
            "hint" | "h" | "подсказка" => Self::Hint,
            "extra" | "e" | "ещё" | "еще" => Self::ExtraTry,
            "finish" | "f" | "сдаюсь" => Self::Finish,
            "new" | "n" | "новая" => Self::New,
            "help" | "?" => Self::Help,
            _ => Self::Guess(line.to_string()),
        }
    }
}

/// Run the interactive loop until the player quits or input ends
///
/// # Errors
///
/// Returns an error only for I/O failures; game errors are shown to the player.
#[allow(clippy::too_many_lines)] // Interactive game loop requires detailed handling
pub fn run_play<S, L, R, G>(
    service: &GameService<S, L, R>,
    profile: ProfileId,
    mode: PlayMode,
    hard_mode: bool,
    rng: &mut G,
    input: &mut impl BufRead,
    out: &mut impl Write,
) -> io::Result<PlaySummary>
where
    S: Store,
    L: EntitlementLedger,
    R: RateLimiter,
    G: Rng + ?Sized,
{
    writeln!(out, "\n╔══════════════════════════════════════════════════════════════╗")?;
    writeln!(out, "║                    Slovo - Interactive Mode                  ║")?;
    writeln!(out, "╚══════════════════════════════════════════════════════════════╝\n")?;
    write_help(out)?;

    let mut summary = PlaySummary::default();
    let Some(mut view) = start(service, profile, mode, hard_mode, rng, out)? else {
        return Ok(summary);
    };
    summary.sessions += 1;
    write_board(out, &view)?;
    if view.status != "playing" {
        writeln!(out, "This puzzle is already over for you. Come back tomorrow!")?;
        return Ok(summary);
    }

    loop {
        let Some(line) = read_line(input, out, "Guess")? else {
            writeln!(out, "\n👋 До встречи!")?;
            return Ok(summary);
        };

        let result = match Command::parse(&line) {
            Command::Empty => continue,
            Command::Quit => {
                writeln!(out, "\n👋 До встречи!")?;
                return Ok(summary);
            }
            Command::Help => {
                write_help(out)?;
                continue;
            }
            Command::New => {
                if matches!(mode, PlayMode::Daily(_)) {
                    writeln!(out, "There is one daily puzzle per day; try arcade mode.")?;
                    continue;
                }
                if view.status == "playing" {
                    writeln!(out, "Finish the current game first.")?;
                    continue;
                }
                if let Some(next) = start(service, profile, mode, hard_mode, rng, out)? {
                    summary.sessions += 1;
                    view = next;
                    write_board(out, &view)?;
                }
                continue;
            }
            Command::Hint => service.use_hint(profile, view.session_id, rng),
            Command::ExtraTry => service.resume_with_extra_try(profile, view.session_id),
            Command::Finish => service.finish(profile, view.session_id),
            Command::Guess(word) => service.submit_guess(profile, view.session_id, &word),
        };

        let next = match result {
            Ok(next) => next,
            Err(err) => {
                write_error(out, &err)?;
                continue;
            }
        };
        let was_playing = view.status == "playing";
        view = next;
        write_board(out, &view)?;

        match view.status {
            "won" if !view.closed => {
                summary.won += 1;
                write_victory(out, &view)?;
                if let Ok(closed) = service.acknowledge_win(profile, view.session_id) {
                    view = closed;
                }
                if matches!(mode, PlayMode::Daily(_)) {
                    let streak = service.profile(profile).streak_current;
                    writeln!(out, "  Streak: {}\n", streak.to_string().bright_cyan().bold())?;
                    return Ok(summary);
                }
                writeln!(out, "Type 'new' for another game or 'quit' to leave.")?;
            }
            "lost" if view.closed => {
                summary.lost += 1;
                write_reveal(out, &view)?;
                if matches!(mode, PlayMode::Daily(_)) {
                    return Ok(summary);
                }
                writeln!(out, "Type 'new' for another game or 'quit' to leave.")?;
            }
            "lost" if was_playing => match view.mode {
                PuzzleMode::Daily => {
                    if let Ok(closed) = service.finish(profile, view.session_id) {
                        view = closed;
                    }
                    summary.lost += 1;
                    write_reveal(out, &view)?;
                    return Ok(summary);
                }
                PuzzleMode::Arcade => {
                    writeln!(
                        out,
                        "{}",
                        "Out of attempts. 'extra' buys one more try, 'finish' ends the game."
                            .yellow()
                    )?;
                }
            },
            _ => {}
        }
    }
}

fn start<S, L, R, G>(
    service: &GameService<S, L, R>,
    profile: ProfileId,
    mode: PlayMode,
    hard_mode: bool,
    rng: &mut G,
    out: &mut impl Write,
) -> io::Result<Option<SessionView>>
where
    S: Store,
    L: EntitlementLedger,
    R: RateLimiter,
    G: Rng + ?Sized,
{
    let started = match mode {
        PlayMode::Daily(date) => service.start_daily(profile, date, hard_mode),
        PlayMode::Arcade { letters } => service.start_arcade(profile, letters, hard_mode, rng),
    };
    match started {
        Ok(view) => {
            let label = match mode {
                PlayMode::Daily(date) => format!("Daily puzzle {date}"),
                PlayMode::Arcade { letters } => format!("Arcade, {letters} letters"),
            };
            writeln!(out, "{}", label.bright_cyan().bold())?;
            if hard_mode {
                writeln!(out, "{}", "Hard mode: revealed letters must be reused".bright_black())?;
            }
            Ok(Some(view))
        }
        Err(err) => {
            write_error(out, &err)?;
            Ok(None)
        }
    }
}

fn write_help(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "Type a word to guess it. Commands:")?;
    writeln!(out, "  hint    reveal one letter (arcade, uses arcade_hint)")?;
    writeln!(out, "  extra   one more try after a loss (arcade, uses arcade_extra_try)")?;
    writeln!(out, "  finish  accept a loss")?;
    writeln!(out, "  new     start another arcade game")?;
    writeln!(out, "  quit    leave\n")
}

/// Print the session board
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_board(out: &mut impl Write, view: &SessionView) -> io::Result<()> {
    writeln!(out, "────────────────────────────────────────────────────────────")?;
    for line in &view.lines {
        writeln!(out, "  {}", feedback_row(&line.text_norm, &line.feedback))?;
    }
    if !view.hints.is_empty() {
        writeln!(out, "  Hints: {}", hint_mask(view.letter_count, &view.hints))?;
    }
    writeln!(
        out,
        "  Attempt {}/{} | {}",
        view.attempts_used, view.max_attempts, view.status
    )?;
    if view.mode == PuzzleMode::Arcade {
        writeln!(out, "  {}", balances_line(&view.balances).bright_black())?;
    }
    writeln!(out, "────────────────────────────────────────────────────────────")
}

fn write_victory(out: &mut impl Write, view: &SessionView) -> io::Result<()> {
    writeln!(out, "\n{}", "═".repeat(60).bright_cyan())?;
    writeln!(out, "{}", "    🎉  П О Б Е Д А !  🎉".bright_green().bold())?;
    writeln!(out, "{}", "═".repeat(60).bright_cyan())?;
    writeln!(
        out,
        "\n  Solved in {} {}",
        view.attempts_used.to_string().bright_cyan().bold(),
        if view.attempts_used == 1 { "guess" } else { "guesses" }
    )?;
    for line in &view.lines {
        writeln!(out, "    {}", line.feedback.to_emoji())?;
    }
    writeln!(out)
}

fn write_reveal(out: &mut impl Write, view: &SessionView) -> io::Result<()> {
    let solution = view.solution.as_deref().unwrap_or("?");
    writeln!(
        out,
        "\n❌ The word was {}",
        solution.to_uppercase().bright_yellow().bold()
    )
}

fn write_error(out: &mut impl Write, err: &GameError) -> io::Result<()> {
    writeln!(out, "{} {err}", "❌".red())?;
    match err.kind() {
        ErrorKind::Exhausted => writeln!(out, "   Buy more with the 'grant' command."),
        ErrorKind::RaceLost => writeln!(out, "   Please try again."),
        _ => Ok(()),
    }
}

/// Prompt and read one line; `None` at end of input
fn read_line(input: &mut impl BufRead, out: &mut impl Write, prompt: &str) -> io::Result<Option<String>> {
    write!(out, "{prompt}: ")?;
    out.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}
