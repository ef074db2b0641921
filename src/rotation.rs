//! Daily rollover
//!
//! Publishes tomorrow's puzzle without repeating a solution until the whole
//! list has been used, then performs end-of-day maintenance. Every step is
//! idempotent for a given date and runs even when an earlier one failed.

use crate::config::EngineConfig;
use crate::core::Word;
use crate::session::{Puzzle, PuzzleStatus};
use crate::storage::{DuplicateDaily, Store};
use chrono::{Days, NaiveDate};
use rand::Rng;
use rand::seq::IndexedRandom;
use serde::Serialize;
use tracing::{info, warn};

/// A chosen solution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub word: Word,
    /// The used set covered the whole pool and was started over
    pub cycle_reset: bool,
}

/// Pick uniformly from `pool` minus `used`, wrapping around when nothing is left
///
/// Returns `None` only for an empty pool.
///
/// # Examples
/// ```
/// use rand::SeedableRng;
/// use slovo_arcade::core::Word;
/// use slovo_arcade::rotation::select_solution;
///
/// let pool = vec![Word::new("слово").unwrap(), Word::new("книга").unwrap()];
/// let mut rng = rand::rngs::StdRng::seed_from_u64(1);
///
/// let pick = select_solution(&pool, &["слово".to_string()], &mut rng).unwrap();
/// assert_eq!(pick.word.text(), "книга");
/// assert!(!pick.cycle_reset);
/// ```
pub fn select_solution<R: Rng + ?Sized>(
    pool: &[Word],
    used: &[String],
    rng: &mut R,
) -> Option<Selection> {
    let fresh: Vec<&Word> = pool
        .iter()
        .filter(|w| !used.iter().any(|u| u == w.text()))
        .collect();

    if let Some(&word) = fresh.choose(rng) {
        return Some(Selection {
            word: word.clone(),
            cycle_reset: false,
        });
    }

    pool.choose(rng).map(|word| Selection {
        word: word.clone(),
        cycle_reset: true,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RolloverStep {
    PublishPuzzle,
    ReplenishCredits,
    ResetStreaks,
    PurgeStale,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum StepStatus {
    Done(String),
    Skipped(String),
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepOutcome {
    pub step: RolloverStep,
    #[serde(flatten)]
    pub status: StepStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RolloverReport {
    pub today: NaiveDate,
    pub published: Option<String>,
    pub cycle_reset: bool,
    pub steps: Vec<StepOutcome>,
}

impl RolloverReport {
    #[must_use]
    pub fn status_of(&self, step: RolloverStep) -> Option<&StepStatus> {
        self.steps.iter().find(|o| o.step == step).map(|o| &o.status)
    }

    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.steps
            .iter()
            .any(|o| matches!(o.status, StepStatus::Failed(_)))
    }
}

/// Nightly job over a store and a solution pool
pub struct RotationScheduler<'a, S: Store> {
    store: &'a S,
    pool: Vec<Word>,
    config: &'a EngineConfig,
}

impl<'a, S: Store> RotationScheduler<'a, S> {
    /// `solutions` is filtered to the configured daily word length
    #[must_use]
    pub fn new(store: &'a S, solutions: &[Word], config: &'a EngineConfig) -> Self {
        let pool = solutions
            .iter()
            .filter(|w| w.len() == config.game.daily_letter_count)
            .cloned()
            .collect();
        Self {
            store,
            pool,
            config,
        }
    }

    /// Run every rollover step for the day `today`
    pub fn run<R: Rng + ?Sized>(&self, today: NaiveDate, rng: &mut R) -> RolloverReport {
        let mut report = RolloverReport {
            today,
            published: None,
            cycle_reset: false,
            steps: Vec::with_capacity(4),
        };

        let publish = self.publish_tomorrow(today, rng, &mut report);
        let steps = [
            (RolloverStep::PublishPuzzle, publish),
            (RolloverStep::ReplenishCredits, self.replenish_credits()),
            (RolloverStep::ResetStreaks, self.reset_streaks(today)),
            (RolloverStep::PurgeStale, self.purge_stale(today)),
        ];

        for (step, status) in steps {
            match &status {
                StepStatus::Done(detail) => info!(?step, detail = %detail, "rollover step done"),
                StepStatus::Skipped(detail) => warn!(?step, detail = %detail, "rollover step skipped"),
                StepStatus::Failed(detail) => warn!(?step, detail = %detail, "rollover step failed"),
            }
            report.steps.push(StepOutcome { step, status });
        }

        report
    }

    fn publish_tomorrow<R: Rng + ?Sized>(
        &self,
        today: NaiveDate,
        rng: &mut R,
        report: &mut RolloverReport,
    ) -> StepStatus {
        let Some(tomorrow) = today.checked_add_days(Days::new(1)) else {
            return StepStatus::Failed(format!("no date after {today}"));
        };
        let (status, selection) = self.publish_for(tomorrow, rng);
        if let Some(selection) = selection {
            report.published = Some(selection.word.text().to_string());
            report.cycle_reset = selection.cycle_reset;
        }
        status
    }

    /// Publish the daily puzzle for `date` unless one exists
    ///
    /// Returns the step status and, when a puzzle was created, its selection.
    pub fn publish_for<R: Rng + ?Sized>(
        &self,
        date: NaiveDate,
        rng: &mut R,
    ) -> (StepStatus, Option<Selection>) {
        if let Some(existing) = self.store.daily_puzzle(date) {
            let status = match existing.status {
                PuzzleStatus::Published => {
                    StepStatus::Skipped(format!("puzzle for {date} already published"))
                }
                status => {
                    StepStatus::Failed(format!("puzzle for {date} exists with status {status:?}"))
                }
            };
            return (status, None);
        }

        let used = self.store.used_solutions();
        let Some(selection) = select_solution(&self.pool, &used, rng) else {
            let status = StepStatus::Failed(format!(
                "no {}-letter solutions available",
                self.config.game.daily_letter_count
            ));
            return (status, None);
        };

        let puzzle = Puzzle::daily(
            date,
            selection.word.clone(),
            rng.random(),
            self.config.game.theme.clone(),
        );
        if let Err(DuplicateDaily(date)) = self.store.insert_puzzle(puzzle) {
            let status = StepStatus::Skipped(format!("puzzle for {date} was published concurrently"));
            return (status, None);
        }

        let text = selection.word.text().to_string();
        let next_used = if selection.cycle_reset {
            vec![text]
        } else {
            let mut used = used;
            used.push(text);
            used
        };
        self.store.set_used_solutions(next_used);

        let status = StepStatus::Done(if selection.cycle_reset {
            format!("published for {date}; rotation cycle restarted")
        } else {
            format!("published for {date}")
        });
        (status, Some(selection))
    }

    fn replenish_credits(&self) -> StepStatus {
        let cap = self.config.credits.cap();
        let changed = self.store.replenish_credits(cap);
        StepStatus::Done(format!("{changed} profiles refilled to {cap} credits"))
    }

    fn reset_streaks(&self, today: NaiveDate) -> StepStatus {
        let Some(yesterday) = today.checked_sub_days(Days::new(1)) else {
            return StepStatus::Failed(format!("no date before {today}"));
        };
        let Some(puzzle) = self.store.daily_puzzle(yesterday) else {
            return StepStatus::Skipped(format!(
                "no puzzle found for {yesterday}; streaks left unchanged"
            ));
        };

        let winners = self.store.winners(puzzle.id);
        let reset = self.store.reset_streaks_except(&winners);
        StepStatus::Done(format!(
            "{reset} streaks reset, {} winners kept",
            winners.len()
        ))
    }

    fn purge_stale(&self, today: NaiveDate) -> StepStatus {
        let keep_back = u64::from(self.config.rollover.retain_days.saturating_sub(1));
        let Some(cutoff) = today.checked_sub_days(Days::new(keep_back)) else {
            return StepStatus::Failed(format!("cannot compute purge cutoff from {today}"));
        };
        let purged = self.store.purge_daily_before(cutoff);
        StepStatus::Done(format!("{purged} puzzles before {cutoff} purged"))
    }
}
