//! Player profile fields the engine reads and updates

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Verified identity of the acting player
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProfileId(pub i64);

impl fmt::Display for ProfileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: ProfileId,
    pub streak_current: u32,
    /// Free arcade games left today, within `0..=cap`
    pub arcade_credits: u8,
    pub last_daily_played_at: Option<NaiveDate>,
}

impl Profile {
    /// A fresh profile starts with a full set of arcade credits
    #[must_use]
    pub const fn new(id: ProfileId, credit_cap: u8) -> Self {
        Self {
            id,
            streak_current: 0,
            arcade_credits: credit_cap,
            last_daily_played_at: None,
        }
    }

    /// Record a daily win on `date`; a second win on the same date is ignored
    pub fn record_daily_win(&mut self, date: NaiveDate) -> bool {
        if self.last_daily_played_at == Some(date) {
            return false;
        }
        self.streak_current = self.streak_current.saturating_add(1);
        self.last_daily_played_at = Some(date);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn daily_win_counts_once_per_date() {
        let mut profile = Profile::new(ProfileId(7), 3);
        let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();

        assert!(profile.record_daily_win(date));
        assert!(!profile.record_daily_win(date));
        assert_eq!(profile.streak_current, 1);

        assert!(profile.record_daily_win(date.succ_opt().unwrap()));
        assert_eq!(profile.streak_current, 2);
    }
}
