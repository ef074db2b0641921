//! JSON persistence for the CLI
//!
//! The in-memory store and ledger are written to one file between invocations.

use super::{MemoryStore, StoreSnapshot};
use crate::ledger::{LedgerSnapshot, MemoryLedger};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StateFileError {
    #[error("state file io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("state file is corrupt: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StateFile {
    pub store: StoreSnapshot,
    pub ledger: LedgerSnapshot,
}

impl StateFile {
    #[must_use]
    pub fn capture(store: &MemoryStore, ledger: &MemoryLedger) -> Self {
        Self {
            store: store.snapshot(),
            ledger: ledger.snapshot(),
        }
    }

    /// Read a state file; a missing file is an empty state
    ///
    /// # Errors
    /// Returns `StateFileError` if the file exists but cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StateFileError> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Write the state atomically by renaming a temporary sibling file
    ///
    /// # Errors
    /// Returns `StateFileError` on serialization or filesystem failure.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), StateFileError> {
        let path = path.as_ref();
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(self)?)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    #[must_use]
    pub fn into_parts(self) -> (MemoryStore, MemoryLedger) {
        (
            MemoryStore::from_snapshot(self.store),
            MemoryLedger::from_snapshot(self.ledger),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{EntitlementLedger, Product};
    use crate::profile::ProfileId;
    use crate::storage::Store;

    #[test]
    fn missing_file_is_empty_state() {
        let state = StateFile::load("/nonexistent/slovo-state.json").unwrap();
        assert!(state.ledger.entries.is_empty());
    }

    #[test]
    fn save_and_load_preserve_profiles_and_balances() {
        let store = MemoryStore::new();
        let ledger = MemoryLedger::new();
        store.ensure_profile(ProfileId(5), 3);
        store.set_used_solutions(vec!["слово".into()]);
        ledger.grant(ProfileId(5), Product::ArcadeHint, 2);

        let path = std::env::temp_dir().join(format!("slovo-state-{}.json", std::process::id()));
        StateFile::capture(&store, &ledger).save(&path).unwrap();
        let (store, ledger) = StateFile::load(&path).unwrap().into_parts();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(store.ensure_profile(ProfileId(5), 0).arcade_credits, 3);
        assert_eq!(store.used_solutions(), vec!["слово".to_string()]);
        assert_eq!(ledger.available(ProfileId(5), Product::ArcadeHint), 2);
    }
}
