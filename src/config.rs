//! Engine configuration
//!
//! Loaded from a TOML file; every field has a default so a partial (or absent)
//! file is valid.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Most attempts a daily puzzle may allow
pub const DAILY_ATTEMPTS_LIMIT: u32 = 6;
/// Most hints a session may reveal
pub const HINT_LIMIT: usize = 5;
/// Most free arcade credits a profile may hold
pub const CREDIT_CAP_LIMIT: u8 = 3;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub game: GameRules,
    #[serde(default)]
    pub credits: CreditConfig,
    #[serde(default)]
    pub rollover: RolloverConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

/// Rules applied to every session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRules {
    /// Attempts in a daily puzzle regardless of length
    #[serde(default = "default_daily_max_attempts")]
    pub daily_max_attempts: u32,

    /// Hint ceiling per session
    #[serde(default = "default_max_hints")]
    pub max_hints: usize,

    /// Fold `ё` into `е` before scoring
    ///
    /// Word lists are stored folded and lookups fold the guess, so either
    /// spelling is accepted as a dictionary word whatever this is set to.
    #[serde(default = "default_true")]
    pub collapse_yo: bool,

    /// Word length of the daily puzzle
    #[serde(default = "default_daily_letter_count")]
    pub daily_letter_count: usize,

    /// Dictionary theme used for guess lookups
    #[serde(default = "default_theme")]
    pub theme: String,
}

impl GameRules {
    /// Daily attempt limit, kept within `1..=DAILY_ATTEMPTS_LIMIT`
    #[must_use]
    pub fn daily_attempts(&self) -> u32 {
        self.daily_max_attempts.clamp(1, DAILY_ATTEMPTS_LIMIT)
    }

    /// Hint ceiling, never above [`HINT_LIMIT`]
    #[must_use]
    pub fn hint_ceiling(&self) -> usize {
        self.max_hints.min(HINT_LIMIT)
    }
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            daily_max_attempts: default_daily_max_attempts(),
            max_hints: default_max_hints(),
            collapse_yo: true,
            daily_letter_count: default_daily_letter_count(),
            theme: default_theme(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditConfig {
    /// Free arcade games restored every rollover
    #[serde(default = "default_credit_cap")]
    pub arcade_credit_cap: u8,
}

impl CreditConfig {
    /// Credit cap, never above [`CREDIT_CAP_LIMIT`]
    #[must_use]
    pub fn cap(&self) -> u8 {
        self.arcade_credit_cap.min(CREDIT_CAP_LIMIT)
    }
}

impl Default for CreditConfig {
    fn default() -> Self {
        Self {
            arcade_credit_cap: default_credit_cap(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolloverConfig {
    /// Daily puzzles this many days older than today are purged
    #[serde(default = "default_retain_days")]
    pub retain_days: u32,
}

impl Default for RolloverConfig {
    fn default() -> Self {
        Self {
            retain_days: default_retain_days(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Requests admitted per window
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    /// Window length in milliseconds
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_ms: default_window_ms(),
        }
    }
}

fn default_true() -> bool { true }
fn default_daily_max_attempts() -> u32 { 6 }
fn default_max_hints() -> usize { 5 }
fn default_daily_letter_count() -> usize { 5 }
fn default_theme() -> String { "common".to_string() }
fn default_credit_cap() -> u8 { 3 }
fn default_retain_days() -> u32 { 2 }
fn default_max_requests() -> u32 { 30 }
fn default_window_ms() -> u64 { 60_000 }

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {field} = {value} (allowed {allowed})")]
    Invalid {
        field: &'static str,
        value: String,
        allowed: &'static str,
    },
}

fn check<T: PartialOrd + ToString>(
    field: &'static str,
    value: T,
    range: std::ops::RangeInclusive<T>,
    allowed: &'static str,
) -> Result<(), ConfigError> {
    if range.contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            field,
            value: value.to_string(),
            allowed,
        })
    }
}

impl EngineConfig {
    /// Parse configuration from TOML text
    ///
    /// # Errors
    /// Returns `ConfigError::Parse` for malformed TOML or mistyped fields and
    /// `ConfigError::Invalid` for values out of range.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every bounded value
    ///
    /// # Errors
    /// Returns `ConfigError::Invalid` naming the first field out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check("game.daily_max_attempts", self.game.daily_max_attempts, 1..=DAILY_ATTEMPTS_LIMIT, "1..=6")?;
        check("game.max_hints", self.game.max_hints, 0..=HINT_LIMIT, "0..=5")?;
        check(
            "game.daily_letter_count",
            self.game.daily_letter_count,
            crate::core::MIN_LETTERS..=crate::core::MAX_LETTERS,
            "4..=7",
        )?;
        check("credits.arcade_credit_cap", self.credits.arcade_credit_cap, 0..=CREDIT_CAP_LIMIT, "0..=3")?;
        check("rollover.retain_days", self.rollover.retain_days, 1..=u32::MAX, "at least 1")?;
        check("rate_limit.window_ms", self.rate_limit.window_ms, 1..=u64::MAX, "at least 1")
    }

    /// Load configuration from `path`, falling back to defaults if it does not exist
    ///
    /// # Errors
    /// Returns `ConfigError` if the file exists but cannot be read or parsed.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}
