//! Slovo Arcade - CLI
//!
//! Plays, administers and stress-tests the puzzle engine against a JSON state
//! file.

use anyhow::{Context, Result};
use chrono::{Days, Local, NaiveDate};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use slovo_arcade::{
    commands::{PlayMode, SimulationConfig, evaluate_words, run_play, run_simulation},
    config::EngineConfig,
    ledger::{EntitlementLedger, MemoryLedger, Product},
    output::{print_evaluation, print_profile, print_rollover_report, print_simulation_result},
    profile::ProfileId,
    rate_limit::{FixedWindowLimiter, Unlimited},
    rotation::{RotationScheduler, StepStatus},
    service::GameService,
    storage::{MemoryStore, StateFile, Store},
    wordlists::WordBank,
};
use std::path::{Path, PathBuf};
use tracing::info;

type CliService = GameService<MemoryStore, MemoryLedger, FixedWindowLimiter>;

#[derive(Parser)]
#[command(
    name = "slovo_arcade",
    about = "Russian word puzzle: daily puzzle, arcade mode and rollover tools",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Engine configuration (TOML); defaults apply when missing
    #[arg(short, long, global = true, default_value = "slovo.toml")]
    config: PathBuf,

    /// State file holding puzzles, sessions, profiles and entitlements
    #[arg(short, long, global = true, default_value = "slovo-state.json")]
    state: PathBuf,

    /// Acting profile id
    #[arg(short, long, global = true, default_value = "1")]
    profile: i64,

    /// Override the dictionary theme
    #[arg(long, global = true)]
    theme: Option<String>,

    /// Override the daily arcade credit cap
    #[arg(long, global = true)]
    credit_cap: Option<u8>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Daily,
    Arcade,
}

#[derive(Subcommand)]
enum Commands {
    /// Play interactively (default)
    Play {
        #[arg(value_enum, default_value = "daily")]
        mode: ModeArg,

        /// Arcade word length (4-7)
        #[arg(short, long, default_value = "5")]
        letters: usize,

        /// Require reuse of revealed letters
        #[arg(long)]
        hard: bool,

        /// Daily puzzle date (default: today)
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Run the nightly rollover for a date
    Rollover {
        /// Day being closed (default: today); publishes the next day's puzzle
        #[arg(short, long)]
        date: Option<NaiveDate>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Credit purchased consumables to the profile
    Grant {
        /// arcade_hint, arcade_extra_try or arcade_new_game
        product: Product,

        #[arg(short = 'n', long, default_value = "1")]
        count: u32,
    },

    /// Show profile, streak and balances
    Status,

    /// Score a guess against a solution
    Evaluate {
        guess: String,
        solution: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Play many arcade games in parallel on a throwaway store
    Simulate {
        /// Number of games
        #[arg(short = 'n', long, default_value = "200")]
        count: usize,

        /// Profiles sharing the games
        #[arg(long, default_value = "8")]
        players: usize,

        /// Fixed word length (default: random 4-7)
        #[arg(short, long)]
        letters: Option<usize>,

        #[arg(long)]
        hard: bool,

        #[arg(long)]
        seed: Option<u64>,
    },
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "warn,slovo_arcade=info",
        _ => "info,slovo_arcade=debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(cli: &Cli) -> Result<EngineConfig> {
    let mut config = EngineConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if let Some(theme) = &cli.theme {
        config.game.theme.clone_from(theme);
    }
    if let Some(cap) = cli.credit_cap {
        config.credits.arcade_credit_cap = cap;
    }
    config.validate().context("checking command-line overrides")?;
    Ok(config)
}

fn load_service(state: &Path, config: EngineConfig) -> Result<CliService> {
    let (store, ledger) = StateFile::load(state)
        .with_context(|| format!("loading {}", state.display()))?
        .into_parts();
    let limiter = FixedWindowLimiter::from_config(&config.rate_limit);
    Ok(GameService::new(store, ledger, limiter, WordBank::embedded(), config))
}

fn save_service(service: CliService, state: &Path) -> Result<()> {
    let (store, ledger) = service.into_parts();
    StateFile::capture(&store, &ledger)
        .save(state)
        .with_context(|| format!("saving {}", state.display()))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(&cli)?;
    let profile = ProfileId(cli.profile);
    let today = Local::now().date_naive();

    // Default to Play mode if no command given
    let command = cli.command.unwrap_or(Commands::Play {
        mode: ModeArg::Daily,
        letters: 5,
        hard: false,
        date: None,
    });

    match command {
        Commands::Play {
            mode,
            letters,
            hard,
            date,
        } => {
            let service = load_service(&cli.state, config)?;
            let mode = match mode {
                ModeArg::Daily => {
                    let date = date.unwrap_or(today);
                    ensure_daily_puzzle(&service, date);
                    PlayMode::Daily(date)
                }
                ModeArg::Arcade => PlayMode::Arcade { letters },
            };
            run_play_command(&service, profile, mode, hard)?;
            save_service(service, &cli.state)
        }
        Commands::Rollover { date, json } => {
            let service = load_service(&cli.state, config)?;
            run_rollover_command(&service, date.unwrap_or(today), json)?;
            save_service(service, &cli.state)
        }
        Commands::Grant { product, count } => {
            let service = load_service(&cli.state, config)?;
            let balances = service.grant_purchase(profile, product, count);
            print_profile(&service.profile(profile), &balances);
            save_service(service, &cli.state)
        }
        Commands::Status => {
            let service = load_service(&cli.state, config)?;
            print_profile(&service.profile(profile), &service.ledger().balances(profile));
            Ok(())
        }
        Commands::Evaluate {
            guess,
            solution,
            json,
        } => run_evaluate_command(&guess, &solution, json, &config),
        Commands::Simulate {
            count,
            players,
            letters,
            hard,
            seed,
        } => {
            let simulation = SimulationConfig {
                games: count,
                players,
                letters,
                hard_mode: hard,
                seed: seed.unwrap_or_else(rand::random),
                show_progress: true,
                ..SimulationConfig::default()
            };
            run_simulate_command(config, &simulation);
            Ok(())
        }
    }
}

/// Publish the puzzle for `date` on a fresh state so `play daily` works out of the box
fn ensure_daily_puzzle(service: &CliService, date: NaiveDate) {
    if service.store().daily_puzzle(date).is_some() {
        return;
    }
    let scheduler = RotationScheduler::new(service.store(), service.bank().solutions(), service.config());
    let (status, _) = scheduler.publish_for(date, &mut rand::rng());
    if let StepStatus::Done(detail) = status {
        info!(%date, detail = %detail, "daily puzzle bootstrapped");
    }
}

fn run_play_command(service: &CliService, profile: ProfileId, mode: PlayMode, hard: bool) -> Result<()> {
    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut out = std::io::stdout();
    let summary = run_play(service, profile, mode, hard, &mut rand::rng(), &mut input, &mut out)?;
    info!(sessions = summary.sessions, won = summary.won, lost = summary.lost, "play finished");
    Ok(())
}

fn run_rollover_command(service: &CliService, date: NaiveDate, json: bool) -> Result<()> {
    let scheduler = RotationScheduler::new(service.store(), service.bank().solutions(), service.config());
    let report = scheduler.run(date, &mut rand::rng());

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_rollover_report(&report);
        if let Some(tomorrow) = date.checked_add_days(Days::new(1)) {
            println!("\n  Players can now play the {tomorrow} puzzle.");
        }
    }
    Ok(())
}

fn run_evaluate_command(guess: &str, solution: &str, json: bool, config: &EngineConfig) -> Result<()> {
    let result = evaluate_words(guess, solution, config.game.collapse_yo)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_evaluation(&result);
    }
    Ok(())
}

fn run_simulate_command(config: EngineConfig, simulation: &SimulationConfig) {
    println!(
        "Simulating {} arcade games across {} players (seed {})...",
        simulation.games, simulation.players, simulation.seed
    );
    let service = GameService::new(
        MemoryStore::new(),
        MemoryLedger::new(),
        Unlimited,
        WordBank::embedded(),
        config,
    );
    let result = run_simulation(&service, simulation);
    print_simulation_result(&result);
}
