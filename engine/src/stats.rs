//! Operation counters.

use serde::{Deserialize, Serialize};

/// Counts of engine operations since the engine was constructed or loaded,
/// as read from [`ChefMetrics`](crate::metrics::ChefMetrics).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChefStats {
    pub pools_added: u64,
    pub weight_changes: u64,
    pub deposits: u64,
    pub withdrawals: u64,
    /// Deposits and withdrawals that paid a non-zero reward.
    pub harvests: u64,
    pub emergency_withdrawals: u64,
    pub vault_fundings: u64,
    pub vault_drains: u64,
}

impl ChefStats {
    /// Total stake-mutating operations.
    pub fn stake_operations(&self) -> u64 {
        self.deposits + self.withdrawals + self.emergency_withdrawals
    }
}
