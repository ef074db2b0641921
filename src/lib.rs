//! Slovo Arcade
//!
//! Session engine for a Russian-alphabet word-guessing game with a shared
//! daily puzzle and a paid arcade mode.
//!
//! # Quick Start
//!
//! ```rust
//! use slovo_arcade::core::{FeedbackLine, Word, evaluate};
//!
//! let guess = Word::new("абваб").unwrap();
//! let solution = Word::new("ааббв").unwrap();
//!
//! let feedback = evaluate(&guess, &solution).unwrap();
//! assert_eq!(feedback, FeedbackLine::parse("GYYYY").unwrap());
//! assert_eq!(feedback.to_string(), "🟩🟨🟨🟨🟨");
//! ```

// Core domain types
pub mod core;

// Engine configuration
pub mod config;

// Error kinds
pub mod error;

// Consumable entitlements
pub mod ledger;

// Player profiles
pub mod profile;

// Admission control
pub mod rate_limit;

// Daily rollover
pub mod rotation;

// Request-side orchestration
pub mod service;

// Puzzle and session state machine
pub mod session;

// Persistence
pub mod storage;

// Word lists
pub mod wordlists;

// Command implementations
pub mod commands;

// Terminal output formatting
pub mod output;

pub use error::{GameError, Result};
