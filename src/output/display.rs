//! Display functions for command results

use super::formatters::{balances_line, create_progress_bar, feedback_row};
use crate::commands::{EvaluationResult, SimulationResult};
use crate::ledger::Product;
use crate::profile::Profile;
use crate::rotation::{RolloverReport, StepStatus};
use colored::Colorize;

/// Print a scored guess
pub fn print_evaluation(result: &EvaluationResult) {
    println!("\n{}", "─".repeat(60).cyan());
    println!(
        "{} → {}",
        result.guess.to_uppercase().bright_white().bold(),
        result.solution.to_uppercase().bright_yellow().bold()
    );
    println!("{}", "─".repeat(60).cyan());
    println!("\n  {}", feedback_row(&result.guess, &result.feedback));
    println!(
        "\n  Correct: {}   Present: {}",
        result.correct.to_string().green(),
        result.present.to_string().yellow()
    );
}

/// Print one line per rollover step
pub fn print_rollover_report(report: &RolloverReport) {
    println!("\n{}", "═".repeat(60).cyan());
    println!(
        " {} {} ",
        "ROLLOVER".bright_cyan().bold(),
        report.today.to_string().bright_yellow()
    );
    println!("{}", "═".repeat(60).cyan());

    for outcome in &report.steps {
        let name = format!("{:?}", outcome.step);
        let line = match &outcome.status {
            StepStatus::Done(detail) => format!("  {} {name:<18} {detail}", "✓".green()),
            StepStatus::Skipped(detail) => format!("  {} {name:<18} {detail}", "–".yellow()),
            StepStatus::Failed(detail) => format!("  {} {name:<18} {}", "✗".red(), detail.red()),
        };
        println!("{line}");
    }

    if let Some(word) = &report.published {
        println!("\n  Next solution: {}", word.to_uppercase().bright_white().bold());
        if report.cycle_reset {
            println!("  {}", "Every solution has been used; a new cycle began.".bright_black());
        }
    }
}

/// Print simulation statistics
#[allow(clippy::cast_precision_loss)]
pub fn print_simulation_result(result: &SimulationResult) {
    println!("\n{}", "═".repeat(60).cyan());
    println!(" {} ", "SIMULATION RESULTS".bright_cyan().bold());
    println!("{}", "═".repeat(60).cyan());

    println!("\n📊 {}", "Games:".bright_cyan().bold());
    println!("   Requested:        {}", result.games);
    println!("   Started:          {}", result.started);
    println!(
        "   Won:              {} ({})",
        result.won.to_string().green(),
        format!("{:.1}%", result.win_rate() * 100.0).bright_yellow().bold()
    );
    println!("   Lost:             {}", result.lost.to_string().yellow());
    println!("   Hints used:       {}", result.hints_used);
    println!("   Extra tries used: {}", result.extra_tries_used);
    println!("   Rejected ops:     {}", result.errors);
    println!("   Time taken:       {:.2}s", result.duration.as_secs_f64());
    println!("   Games/second:     {:.1}", result.games_per_second);

    if result.won > 0 {
        println!("\n📈 {}", "Winning attempt:".bright_cyan().bold());
        for (&attempts, &count) in &result.distribution {
            let pct = count as f64 / result.won as f64 * 100.0;
            let bar = create_progress_bar(pct, 100.0, 40);
            println!("   {attempts}: {} {count:4} ({pct:5.1}%)", bar.green());
        }
    }

    println!();
    if result.ledger_mismatches.is_empty() {
        println!("{}", "✅ Ledger balances add up for every player".green().bold());
    } else {
        let ids: Vec<String> = result.ledger_mismatches.iter().map(ToString::to_string).collect();
        println!(
            "{}",
            format!("❌ Ledger mismatch for profiles {}", ids.join(", "))
                .red()
                .bold()
        );
    }
}

/// Print a profile with its entitlement balances
pub fn print_profile(profile: &Profile, balances: &[(Product, u32)]) {
    println!("\n{}", "─".repeat(60).cyan());
    println!(" Profile {}", profile.id.to_string().bright_yellow().bold());
    println!("{}", "─".repeat(60).cyan());
    println!("   Streak:          {}", profile.streak_current.to_string().bright_cyan());
    println!("   Arcade credits:  {}", profile.arcade_credits);
    if let Some(date) = profile.last_daily_played_at {
        println!("   Last daily win:  {date}");
    }
    println!("   Entitlements:    {}", balances_line(balances));
}
