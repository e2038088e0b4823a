//! Prometheus metrics for the reward engine.
//!
//! [`ChefMetrics`] owns a dedicated [`Registry`] holding operation counters
//! and gauges for the pool set and the reward vault. Hosts can encode it in
//! the Prometheus text exposition format with [`ChefMetrics::encode_text`].
//! Counters start from zero whenever an engine is constructed or loaded;
//! gauges are refreshed from engine state on every commit.

use crate::error::ChefError;
use crate::stats::ChefStats;
use crate::vault::RewardVault;
use prometheus::{
    register_gauge_with_registry, register_int_counter_with_registry,
    register_int_gauge_with_registry, Encoder, Gauge, IntCounter, IntGauge, Opts, Registry,
    TextEncoder,
};

pub struct ChefMetrics {
    /// The registry that owns every metric below.
    pub registry: Registry,

    // ── Counters ────────────────────────────────────────────────────────
    pub pools_added: IntCounter,
    pub weight_changes: IntCounter,
    pub deposits: IntCounter,
    pub withdrawals: IntCounter,
    /// Deposits and withdrawals that paid a non-zero reward.
    pub harvests: IntCounter,
    pub emergency_withdrawals: IntCounter,
    pub vault_fundings: IntCounter,
    pub vault_drains: IntCounter,

    // ── Gauges ──────────────────────────────────────────────────────────
    pub pool_count: IntGauge,
    pub total_weight: IntGauge,
    /// Reward amounts are raw `u128` units, so these are `f64` gauges.
    pub vault_balance: Gauge,
    pub vault_deficit: Gauge,
    pub reward_paid: Gauge,
}

impl ChefMetrics {
    /// Create a fresh set of metrics, all registered under a new [`Registry`].
    ///
    /// Registration only fails on duplicate or malformed names, and every
    /// name here is a distinct constant.
    pub fn new() -> Self {
        let registry = Registry::new();

        let counter = |name: &str, help: &str| {
            register_int_counter_with_registry!(Opts::new(name, help), registry)
                .expect("failed to register chef counter")
        };
        let pools_added = counter("chef_pools_added_total", "Pools registered");
        let weight_changes = counter("chef_weight_changes_total", "Pool weight changes");
        let deposits = counter("chef_deposits_total", "Deposits, including harvests");
        let withdrawals = counter("chef_withdrawals_total", "Withdrawals");
        let harvests = counter(
            "chef_harvests_total",
            "Deposits and withdrawals that paid reward",
        );
        let emergency_withdrawals = counter(
            "chef_emergency_withdrawals_total",
            "Emergency withdrawals that forfeited reward",
        );
        let vault_fundings = counter("chef_vault_fundings_total", "Reward vault fundings");
        let vault_drains = counter("chef_vault_drains_total", "Owner drains of the vault");

        let pool_count = register_int_gauge_with_registry!(
            Opts::new("chef_pool_count", "Number of pools"),
            registry
        )
        .expect("failed to register pool_count gauge");
        let total_weight = register_int_gauge_with_registry!(
            Opts::new("chef_total_weight", "Sum of pool allocation weights"),
            registry
        )
        .expect("failed to register total_weight gauge");

        let gauge = |name: &str, help: &str| {
            register_gauge_with_registry!(Opts::new(name, help), registry)
                .expect("failed to register chef gauge")
        };
        let vault_balance = gauge("chef_vault_balance", "Reward tokens held by the vault");
        let vault_deficit = gauge(
            "chef_vault_deficit",
            "Reward owed to depositors but not yet paid",
        );
        let reward_paid = gauge("chef_reward_paid", "Reward paid out over the engine's life");

        Self {
            registry,
            pools_added,
            weight_changes,
            deposits,
            withdrawals,
            harvests,
            emergency_withdrawals,
            vault_fundings,
            vault_drains,
            pool_count,
            total_weight,
            vault_balance,
            vault_deficit,
            reward_paid,
        }
    }

    pub(crate) fn record_payout(&self, paid: u128) {
        if paid > 0 {
            self.harvests.inc();
        }
    }

    pub(crate) fn observe_pools(&self, pool_count: usize, total_weight: u64) {
        self.pool_count
            .set(i64::try_from(pool_count).unwrap_or(i64::MAX));
        self.total_weight
            .set(i64::try_from(total_weight).unwrap_or(i64::MAX));
    }

    pub(crate) fn observe_vault(&self, vault: &RewardVault) {
        self.vault_balance.set(vault.balance() as f64);
        self.vault_deficit.set(vault.deficit() as f64);
        self.reward_paid.set(vault.total_paid() as f64);
    }

    /// Point-in-time copy of the operation counters.
    pub fn snapshot(&self) -> ChefStats {
        ChefStats {
            pools_added: self.pools_added.get(),
            weight_changes: self.weight_changes.get(),
            deposits: self.deposits.get(),
            withdrawals: self.withdrawals.get(),
            harvests: self.harvests.get(),
            emergency_withdrawals: self.emergency_withdrawals.get(),
            vault_fundings: self.vault_fundings.get(),
            vault_drains: self.vault_drains.get(),
        }
    }

    /// Encode every metric in the Prometheus text exposition format.
    pub fn encode_text(&self) -> Result<String, ChefError> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&self.registry.gather(), &mut buffer)
            .map_err(|e| ChefError::Serialization(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| ChefError::Serialization(e.to_string()))
    }
}

impl Default for ChefMetrics {
    fn default() -> Self {
        Self::new()
    }
}
