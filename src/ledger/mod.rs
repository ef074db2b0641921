//! Consumable entitlements
//!
//! Purchased consumables are fungible counts per (profile, product). Granting
//! adds to the count; consuming takes exactly one unit or fails.

mod memory;
mod product;

pub use memory::{LedgerSnapshot, MemoryLedger};
pub use product::{Product, UnknownProduct};

use crate::Result;
use crate::profile::ProfileId;

/// Per-profile consumable accounting
///
/// Implementations must make [`consume`](EntitlementLedger::consume) an atomic
/// conditional decrement: with one unit left, concurrent callers see exactly
/// one success.
pub trait EntitlementLedger: Send + Sync {
    /// Units currently owned
    fn available(&self, profile: ProfileId, product: Product) -> u32;

    /// Take one unit
    ///
    /// # Errors
    /// Returns `GameError::Exhausted` when the count is zero.
    fn consume(&self, profile: ProfileId, product: Product) -> Result<()>;

    /// Add `n` units
    fn grant(&self, profile: ProfileId, product: Product, n: u32);

    /// Counts for every product, in [`Product::ALL`] order
    fn balances(&self, profile: ProfileId) -> Vec<(Product, u32)> {
        Product::ALL
            .iter()
            .map(|&product| (product, self.available(profile, product)))
            .collect()
    }
}
