//! In-process ledger backed by a sharded map

use super::{EntitlementLedger, Product};
use crate::error::{GameError, Result};
use crate::profile::ProfileId;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Counter-per-key ledger
///
/// `consume` checks and decrements while holding the entry's shard lock, so no
/// second caller can observe the same unit.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    counts: DashMap<(ProfileId, Product), u32>,
}

/// Serializable ledger contents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub entries: Vec<(ProfileId, Product, u32)>,
}

impl MemoryLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn snapshot(&self) -> LedgerSnapshot {
        let mut entries: Vec<_> = self
            .counts
            .iter()
            .filter(|entry| *entry.value() > 0)
            .map(|entry| (entry.key().0, entry.key().1, *entry.value()))
            .collect();
        entries.sort_unstable();
        LedgerSnapshot { entries }
    }

    #[must_use]
    pub fn from_snapshot(snapshot: LedgerSnapshot) -> Self {
        let counts = snapshot
            .entries
            .into_iter()
            .map(|(profile, product, n)| ((profile, product), n))
            .collect();
        Self { counts }
    }
}

impl EntitlementLedger for MemoryLedger {
    fn available(&self, profile: ProfileId, product: Product) -> u32 {
        self.counts
            .get(&(profile, product))
            .map_or(0, |count| *count)
    }

    fn consume(&self, profile: ProfileId, product: Product) -> Result<()> {
        // get_mut holds the shard write lock for the whole check-and-decrement
        let Some(mut count) = self.counts.get_mut(&(profile, product)) else {
            return Err(GameError::Exhausted(product));
        };
        if *count == 0 {
            return Err(GameError::Exhausted(product));
        }
        *count -= 1;
        debug!(%profile, %product, remaining = *count, "entitlement consumed");
        Ok(())
    }

    fn grant(&self, profile: ProfileId, product: Product, n: u32) {
        if n == 0 {
            return;
        }
        let mut count = self.counts.entry((profile, product)).or_insert(0);
        *count = count.saturating_add(n);
        info!(%profile, %product, granted = n, total = *count, "entitlement granted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::sync::Barrier;

    const ALICE: ProfileId = ProfileId(1);
    const BOB: ProfileId = ProfileId(2);

    #[test]
    fn empty_ledger_is_exhausted() {
        let ledger = MemoryLedger::new();
        assert_eq!(ledger.available(ALICE, Product::ArcadeHint), 0);
        assert_eq!(
            ledger.consume(ALICE, Product::ArcadeHint),
            Err(GameError::Exhausted(Product::ArcadeHint))
        );
    }

    #[test]
    fn grant_then_consume() {
        let ledger = MemoryLedger::new();
        ledger.grant(ALICE, Product::ArcadeExtraTry, 2);

        assert_eq!(ledger.available(ALICE, Product::ArcadeExtraTry), 2);
        assert!(ledger.consume(ALICE, Product::ArcadeExtraTry).is_ok());
        assert!(ledger.consume(ALICE, Product::ArcadeExtraTry).is_ok());
        assert_eq!(
            ledger.consume(ALICE, Product::ArcadeExtraTry).unwrap_err().kind(),
            ErrorKind::Exhausted
        );
        assert_eq!(ledger.available(ALICE, Product::ArcadeExtraTry), 0);
    }

    #[test]
    fn counts_are_per_profile_and_product() {
        let ledger = MemoryLedger::new();
        ledger.grant(ALICE, Product::ArcadeHint, 1);

        assert_eq!(ledger.available(BOB, Product::ArcadeHint), 0);
        assert_eq!(ledger.available(ALICE, Product::ArcadeNewGame), 0);
        assert!(ledger.consume(BOB, Product::ArcadeHint).is_err());
        assert_eq!(
            ledger.balances(ALICE),
            vec![
                (Product::ArcadeHint, 1),
                (Product::ArcadeExtraTry, 0),
                (Product::ArcadeNewGame, 0),
            ]
        );
    }

    #[test]
    fn grant_saturates() {
        let ledger = MemoryLedger::new();
        ledger.grant(ALICE, Product::ArcadeHint, u32::MAX);
        ledger.grant(ALICE, Product::ArcadeHint, 5);
        assert_eq!(ledger.available(ALICE, Product::ArcadeHint), u32::MAX);
    }

    #[test]
    fn concurrent_consume_of_last_unit_succeeds_once() {
        for _ in 0..200 {
            let ledger = MemoryLedger::new();
            ledger.grant(ALICE, Product::ArcadeExtraTry, 1);
            let barrier = Barrier::new(2);

            let results: Vec<Result<()>> = std::thread::scope(|scope| {
                let handles: Vec<_> = (0..2)
                    .map(|_| {
                        scope.spawn(|| {
                            barrier.wait();
                            ledger.consume(ALICE, Product::ArcadeExtraTry)
                        })
                    })
                    .collect();
                handles.into_iter().map(|h| h.join().unwrap()).collect()
            });

            assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
            assert!(results.contains(&Err(GameError::Exhausted(Product::ArcadeExtraTry))));
            assert_eq!(ledger.available(ALICE, Product::ArcadeExtraTry), 0);
        }
    }

    #[test]
    fn many_consumers_never_overspend() {
        let ledger = MemoryLedger::new();
        ledger.grant(ALICE, Product::ArcadeHint, 50);

        let successes: usize = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    scope.spawn(|| {
                        (0..20)
                            .filter(|_| ledger.consume(ALICE, Product::ArcadeHint).is_ok())
                            .count()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).sum()
        });

        assert_eq!(successes, 50);
        assert_eq!(ledger.available(ALICE, Product::ArcadeHint), 0);
    }

    #[test]
    fn snapshot_keeps_positive_counts() {
        let ledger = MemoryLedger::new();
        ledger.grant(ALICE, Product::ArcadeHint, 2);
        ledger.grant(BOB, Product::ArcadeNewGame, 1);
        ledger.consume(BOB, Product::ArcadeNewGame).unwrap();

        let restored = MemoryLedger::from_snapshot(ledger.snapshot());
        assert_eq!(restored.available(ALICE, Product::ArcadeHint), 2);
        assert_eq!(restored.snapshot().entries.len(), 1);
    }
}
