//! Simulate command
//!
//! Plays many arcade games in parallel against one shared service, then checks
//! that every entitlement granted is either still owned or was spent by a game.

use crate::core::{FeedbackLine, MAX_LETTERS, MIN_LETTERS, Word, evaluate};
use crate::ledger::{EntitlementLedger, Product};
use crate::profile::ProfileId;
use crate::rate_limit::RateLimiter;
use crate::service::{GameService, SessionView};
use crate::storage::Store;
use indicatif::{ProgressBar, ProgressStyle};
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::debug;

/// Simulated players get ids from here up
const FIRST_PLAYER_ID: i64 = 1_000_000;

#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub games: usize,
    /// Games are spread over this many profiles, so ledger counters are contended
    pub players: usize,
    /// Fixed word length; random per game when `None`
    pub letters: Option<usize>,
    pub hard_mode: bool,
    pub seed: u64,
    pub hints_per_player: u32,
    pub extra_tries_per_player: u32,
    pub show_progress: bool,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            games: 200,
            players: 8,
            letters: None,
            hard_mode: false,
            seed: 0,
            hints_per_player: 10,
            extra_tries_per_player: 5,
            show_progress: true,
        }
    }
}

/// Result from one simulated game
#[derive(Debug, Clone, Default)]
struct GameRecord {
    player: usize,
    started: bool,
    won: bool,
    attempts: u32,
    hints: u32,
    extra_tries: u32,
    errors: usize,
}

/// Aggregate over all games
#[derive(Debug)]
pub struct SimulationResult {
    pub games: usize,
    pub started: usize,
    pub won: usize,
    pub lost: usize,
    /// Attempts used by won games
    pub distribution: BTreeMap<u32, usize>,
    pub hints_used: u32,
    pub extra_tries_used: u32,
    /// Operations rejected for reasons other than running out of entitlements
    pub errors: usize,
    /// Profiles whose grants do not add up to spent plus remaining
    pub ledger_mismatches: Vec<ProfileId>,
    pub duration: Duration,
    pub games_per_second: f64,
}

impl SimulationResult {
    #[must_use]
    pub fn win_rate(&self) -> f64 {
        if self.started == 0 {
            return 0.0;
        }
        self.won as f64 / self.started as f64
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct Holdings {
    hints: u32,
    extra_tries: u32,
    new_games: u32,
    credits: u8,
}

fn holdings<S: Store, L: EntitlementLedger, R: RateLimiter>(
    service: &GameService<S, L, R>,
    profile: ProfileId,
) -> Holdings {
    let ledger = service.ledger();
    Holdings {
        hints: ledger.available(profile, Product::ArcadeHint),
        extra_tries: ledger.available(profile, Product::ArcadeExtraTry),
        new_games: ledger.available(profile, Product::ArcadeNewGame),
        credits: service.profile(profile).arcade_credits,
    }
}

const fn player_id(player: usize) -> ProfileId {
    ProfileId(FIRST_PLAYER_ID + player as i64)
}

/// Play `config.games` arcade games in parallel
#[allow(clippy::cast_precision_loss)]
pub fn run_simulation<S: Store, L: EntitlementLedger, R: RateLimiter>(
    service: &GameService<S, L, R>,
    config: &SimulationConfig,
) -> SimulationResult {
    let players = config.players.max(1);
    let games_per_player = u32::try_from(config.games.div_ceil(players)).unwrap_or(u32::MAX);

    let mut before = Vec::with_capacity(players);
    for player in 0..players {
        let profile = player_id(player);
        let held = holdings(service, profile);
        service.grant_purchase(profile, Product::ArcadeHint, config.hints_per_player);
        service.grant_purchase(profile, Product::ArcadeExtraTry, config.extra_tries_per_player);
        service.grant_purchase(profile, Product::ArcadeNewGame, games_per_player);
        before.push(held);
    }

    let pb = if config.show_progress {
        ProgressBar::new(config.games as u64)
    } else {
        ProgressBar::hidden()
    };
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) | {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓▒░"),
    );

    let start = Instant::now();
    let records: Vec<GameRecord> = (0..config.games)
        .into_par_iter()
        .map(|game| {
            let record = play_one(service, config, game % players, game);
            pb.inc(1);
            record
        })
        .collect();
    pb.finish_with_message("Complete!");
    let duration = start.elapsed();

    let mut spent: FxHashMap<usize, (u32, u32, u32)> = FxHashMap::default();
    for record in records.iter().filter(|r| r.started) {
        let entry = spent.entry(record.player).or_default();
        entry.0 += record.hints;
        entry.1 += record.extra_tries;
        entry.2 += 1;
    }

    let ledger_mismatches = (0..players)
        .filter(|&player| {
            let profile = player_id(player);
            let start = before[player];
            let end = holdings(service, profile);
            let (hints, extra_tries, games) = spent.get(&player).copied().unwrap_or_default();
            let paid_by_credit = u32::from(start.credits.saturating_sub(end.credits));

            start.hints + config.hints_per_player != hints + end.hints
                || start.extra_tries + config.extra_tries_per_player != extra_tries + end.extra_tries
                || start.new_games + games_per_player != games.saturating_sub(paid_by_credit) + end.new_games
        })
        .map(player_id)
        .collect();

    let mut distribution = BTreeMap::new();
    for record in records.iter().filter(|r| r.won) {
        *distribution.entry(record.attempts).or_insert(0) += 1;
    }

    let started = records.iter().filter(|r| r.started).count();
    let won = records.iter().filter(|r| r.won).count();

    SimulationResult {
        games: config.games,
        started,
        won,
        lost: started - won,
        distribution,
        hints_used: records.iter().map(|r| r.hints).sum(),
        extra_tries_used: records.iter().map(|r| r.extra_tries).sum(),
        errors: records.iter().map(|r| r.errors).sum(),
        ledger_mismatches,
        duration,
        games_per_second: config.games as f64 / duration.as_secs_f64().max(f64::EPSILON),
    }
}

/// Play a single game as a player who only guesses words consistent with
/// everything seen so far
fn play_one<S: Store, L: EntitlementLedger, R: RateLimiter>(
    service: &GameService<S, L, R>,
    config: &SimulationConfig,
    player: usize,
    game: usize,
) -> GameRecord {
    let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(game as u64));
    let profile = player_id(player);
    let mut record = GameRecord {
        player,
        ..GameRecord::default()
    };

    let letters = config
        .letters
        .unwrap_or_else(|| rng.random_range(MIN_LETTERS..=MAX_LETTERS));
    let Ok(view) = service.start_arcade(profile, letters, config.hard_mode, &mut rng) else {
        return record;
    };
    record.started = true;
    let session_id = view.session_id;

    let pool = service.bank().solutions_of_length(letters);
    let mut seen: Vec<(Word, FeedbackLine)> = Vec::new();
    let mut view: SessionView = view;

    loop {
        if view.hints.is_empty() && rng.random_bool(0.25) {
            match service.use_hint(profile, session_id, &mut rng) {
                Ok(next) => view = next,
                Err(err) => debug!(%err, "simulated hint rejected"),
            }
        }

        let candidates: Vec<&&Word> = pool
            .iter()
            .filter(|word| is_consistent(word, &seen, &view))
            .collect();
        let Some(&&guess) = candidates.choose(&mut rng) else {
            record.errors += 1;
            break;
        };

        view = match service.submit_guess(profile, session_id, guess.text()) {
            Ok(next) => next,
            Err(err) => {
                debug!(%err, "simulated guess rejected");
                record.errors += 1;
                break;
            }
        };
        if let Some(feedback) = view.feedback.clone() {
            seen.push((guess.clone(), feedback));
        }

        match view.status {
            "won" => {
                record.won = true;
                record.attempts = view.attempts_used;
                if service.acknowledge_win(profile, session_id).is_err() {
                    record.errors += 1;
                }
                break;
            }
            "lost" => {
                if let Ok(next) = service.resume_with_extra_try(profile, session_id) {
                    record.extra_tries += 1;
                    view = next;
                    continue;
                }
                if service.finish(profile, session_id).is_err() {
                    record.errors += 1;
                }
                break;
            }
            _ => {}
        }
    }

    record.hints = u32::try_from(view.hints.len()).unwrap_or(u32::MAX);
    record
}

/// A candidate could still be the solution given past feedback and hints
fn is_consistent(candidate: &Word, seen: &[(Word, FeedbackLine)], view: &SessionView) -> bool {
    let hints_match = view
        .hints
        .iter()
        .all(|h| candidate.letter_at(h.position) == h.letter);

    hints_match
        && seen.iter().all(|(guess, feedback)| {
            guess != candidate && evaluate(guess, candidate).is_ok_and(|f| &f == feedback)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::ledger::MemoryLedger;
    use crate::rate_limit::Unlimited;
    use crate::storage::MemoryStore;
    use crate::wordlists::WordBank;

    fn service() -> GameService<MemoryStore, MemoryLedger, Unlimited> {
        GameService::new(
            MemoryStore::new(),
            MemoryLedger::new(),
            Unlimited,
            WordBank::embedded(),
            EngineConfig::default(),
        )
    }

    fn quiet(games: usize) -> SimulationConfig {
        SimulationConfig {
            games,
            players: 3,
            show_progress: false,
            seed: 42,
            ..SimulationConfig::default()
        }
    }

    #[test]
    fn every_game_ends_and_ledger_balances() {
        let service = service();
        let result = run_simulation(&service, &quiet(60));

        assert_eq!(result.games, 60);
        assert_eq!(result.started, 60);
        assert_eq!(result.won + result.lost, result.started);
        assert!(result.ledger_mismatches.is_empty(), "{:?}", result.ledger_mismatches);
        assert_eq!(result.errors, 0);
    }

    #[test]
    fn consistent_player_wins_most_games() {
        let service = service();
        let config = SimulationConfig {
            letters: Some(5),
            ..quiet(40)
        };
        let result = run_simulation(&service, &config);

        assert!(result.win_rate() > 0.5, "win rate {}", result.win_rate());
        let total: usize = result.distribution.values().sum();
        assert_eq!(total, result.won);
        assert!(result.distribution.keys().all(|&attempts| (1..=6).contains(&attempts)));
    }

    #[test]
    fn hard_mode_games_never_break_the_rules() {
        let service = service();
        let config = SimulationConfig {
            hard_mode: true,
            ..quiet(30)
        };
        let result = run_simulation(&service, &config);
        assert_eq!(result.errors, 0);
    }

    #[test]
    fn hint_spending_stays_within_grants() {
        let service = service();
        let config = SimulationConfig {
            hints_per_player: 1,
            players: 1,
            ..quiet(20)
        };
        let result = run_simulation(&service, &config);

        assert!(result.hints_used <= 1);
        assert!(result.ledger_mismatches.is_empty());
    }
}
