//! The Chef engine: pool administration, staking and reward payout.

use crate::accrual;
use crate::config::ChefConfig;
use crate::error::ChefError;
use crate::metrics::ChefMetrics;
use crate::pool::{Pool, PoolRegistry};
use crate::position::{Position, PositionLedger};
use crate::receipt::{DepositReceipt, EmergencyWithdrawReceipt, WithdrawReceipt};
use crate::schedule::EmissionSchedule;
use crate::stats::ChefStats;
use crate::vault::{Payout, RewardVault};
use chef_store::{ChefBatch, ChefStore, StoreError, META_ENGINE, META_SCHEMA_VERSION};
use chef_types::{AccountId, Clock, PoolId, SystemClock, Timestamp, TokenId};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Version of the persisted layout written by [`Chef::save_to_store`].
pub const SCHEMA_VERSION: u32 = 1;

/// The reward engine.
///
/// Every mutating operation reads the clock once, works on copies of the
/// affected pool, position and vault, and commits them together only when
/// every check has passed. A returned error means nothing changed.
pub struct Chef<C: Clock = SystemClock> {
    clock: C,
    owner: AccountId,
    migrator: Option<AccountId>,
    reward_token: TokenId,
    schedule: EmissionSchedule,
    registry: PoolRegistry,
    ledger: PositionLedger,
    vault: RewardVault,
    always_mass_update: bool,
    metrics: ChefMetrics,
}

/// Engine-wide state persisted under [`META_ENGINE`].
#[derive(Serialize, Deserialize)]
struct EngineHeader {
    owner: AccountId,
    migrator: Option<AccountId>,
    reward_token: TokenId,
    schedule: EmissionSchedule,
    vault: RewardVault,
    always_mass_update: bool,
}

impl<C: Clock> Chef<C> {
    pub fn new(
        owner: AccountId,
        reward_token: TokenId,
        schedule: EmissionSchedule,
        clock: C,
    ) -> Self {
        Self {
            clock,
            owner,
            migrator: None,
            reward_token,
            schedule,
            registry: PoolRegistry::new(),
            ledger: PositionLedger::new(),
            vault: RewardVault::new(),
            always_mass_update: true,
            metrics: ChefMetrics::new(),
        }
    }

    pub fn from_config(config: &ChefConfig, clock: C) -> Result<Self, ChefError> {
        config.validate()?;
        Ok(Self::new(
            config.owner.clone(),
            config.reward_token.clone(),
            config.schedule(),
            clock,
        )
        .with_always_mass_update(config.always_mass_update))
    }

    /// Whether `add_pool`/`set_weight` settle every pool regardless of their flag.
    pub fn with_always_mass_update(mut self, enabled: bool) -> Self {
        self.always_mass_update = enabled;
        self
    }

    fn ensure_owner(&self, caller: &AccountId) -> Result<(), ChefError> {
        if *caller != self.owner {
            return Err(ChefError::Unauthorized {
                caller: caller.clone(),
            });
        }
        Ok(())
    }

    // ── Pool administration ─────────────────────────────────────────────

    /// Register a new pool for `stake_token`. Owner only.
    pub fn add_pool(
        &mut self,
        caller: &AccountId,
        weight: u64,
        stake_token: TokenId,
        settle_all: bool,
    ) -> Result<PoolId, ChefError> {
        self.ensure_owner(caller)?;
        if weight == 0 {
            return Err(ChefError::InvalidWeight);
        }
        let now = self.clock.now();
        let mut registry = self.registry.clone();
        if settle_all || self.always_mass_update {
            registry.settle_all(&self.schedule, now)?;
        }
        let checkpoint = now.max(self.schedule.start);
        let pool_id = registry.push(Pool::new(stake_token.clone(), weight, checkpoint))?;

        self.registry = registry;
        self.metrics.pools_added.inc();
        self.observe_pools();
        tracing::info!(
            pool_id,
            %stake_token,
            weight,
            total_weight = self.registry.total_weight(),
            "pool added"
        );
        Ok(pool_id)
    }

    /// Change a pool's allocation weight. Owner only. Zero pauses the pool.
    pub fn set_weight(
        &mut self,
        caller: &AccountId,
        pool_id: PoolId,
        weight: u64,
        settle_all: bool,
    ) -> Result<(), ChefError> {
        self.ensure_owner(caller)?;
        let now = self.clock.now();
        let mut registry = self.registry.clone();
        if settle_all || self.always_mass_update {
            registry.settle_all(&self.schedule, now)?;
        } else {
            registry.settle(pool_id, &self.schedule, now)?;
        }
        let old_weight = registry.set_weight(pool_id, weight)?;

        self.registry = registry;
        self.metrics.weight_changes.inc();
        self.observe_pools();
        tracing::info!(
            pool_id,
            old_weight,
            weight,
            total_weight = self.registry.total_weight(),
            "pool weight changed"
        );
        Ok(())
    }

    /// Number of pools ever added.
    pub fn pool_length(&self) -> usize {
        self.registry.len()
    }

    /// Settle one pool's accumulator up to now.
    pub fn update_pool(&mut self, pool_id: PoolId) -> Result<(), ChefError> {
        let now = self.clock.now();
        let pool = self.settled(pool_id, now)?;
        tracing::debug!(
            pool_id,
            acc_reward_per_share = pool.acc_reward_per_share,
            "pool settled"
        );
        self.registry.replace(pool_id, pool)
    }

    /// Settle every pool up to now, all or nothing.
    pub fn mass_update_pools(&mut self) -> Result<(), ChefError> {
        let now = self.clock.now();
        let mut registry = self.registry.clone();
        registry.settle_all(&self.schedule, now)?;
        self.registry = registry;
        tracing::debug!(pools = self.registry.len(), %now, "all pools settled");
        Ok(())
    }

    fn settled(&self, pool_id: PoolId, now: Timestamp) -> Result<Pool, ChefError> {
        accrual::settle_pool(
            self.registry.get(pool_id)?,
            &self.schedule,
            self.registry.total_weight(),
            now,
        )
    }

    // ── Staking ─────────────────────────────────────────────────────────

    /// Reward `account` would receive if it harvested now.
    pub fn pending_reward(
        &self,
        pool_id: PoolId,
        account: &AccountId,
    ) -> Result<u128, ChefError> {
        let pool = self.settled(pool_id, self.clock.now())?;
        match self.ledger.get(pool_id, account) {
            Some(position) => position.pending(pool.acc_reward_per_share),
            None => Ok(0),
        }
    }

    /// Stake `amount` into a pool, first paying out pending reward.
    ///
    /// Depositing zero only harvests.
    pub fn deposit(
        &mut self,
        account: &AccountId,
        pool_id: PoolId,
        amount: u128,
    ) -> Result<DepositReceipt, ChefError> {
        let now = self.clock.now();
        let mut pool = self.settled(pool_id, now)?;
        let mut position = self
            .ledger
            .get(pool_id, account)
            .cloned()
            .unwrap_or_default();
        let mut vault = self.vault.clone();

        let payout = position.harvest(&pool, &mut vault)?;
        position.amount = position
            .amount
            .checked_add(amount)
            .ok_or(ChefError::Overflow)?;
        pool.total_staked = pool
            .total_staked
            .checked_add(amount)
            .ok_or(ChefError::Overflow)?;
        position.sync_debt(&pool)?;

        let staked = position.amount;
        self.registry.replace(pool_id, pool)?;
        self.ledger.insert(pool_id, account.clone(), position);
        self.vault = vault;
        self.metrics.deposits.inc();
        self.metrics.record_payout(payout.paid);
        self.metrics.observe_vault(&self.vault);

        tracing::info!(pool_id, %account, amount, reward = payout.paid, staked, "deposit");
        self.warn_on_shortfall(pool_id, account, &payout);
        Ok(DepositReceipt {
            pool_id,
            account: account.clone(),
            deposited: amount,
            reward_paid: payout.paid,
            reward_unpaid: payout.unpaid,
            staked,
        })
    }

    /// Unstake `amount` from a pool, paying out pending reward.
    pub fn withdraw(
        &mut self,
        account: &AccountId,
        pool_id: PoolId,
        amount: u128,
    ) -> Result<WithdrawReceipt, ChefError> {
        let now = self.clock.now();
        let mut pool = self.settled(pool_id, now)?;
        let existing = self.ledger.get(pool_id, account).cloned();
        let staked = existing.as_ref().map_or(0, |position| position.amount);
        if amount > staked {
            return Err(ChefError::InsufficientStake {
                requested: amount,
                staked,
            });
        }
        let is_new = existing.is_none();
        let mut position = existing.unwrap_or_default();
        let mut vault = self.vault.clone();

        let payout = position.harvest(&pool, &mut vault)?;
        position.amount -= amount;
        pool.total_staked = pool
            .total_staked
            .checked_sub(amount)
            .ok_or(ChefError::Overflow)?;
        position.sync_debt(&pool)?;

        let staked = position.amount;
        self.registry.replace(pool_id, pool)?;
        if !is_new {
            self.ledger.insert(pool_id, account.clone(), position);
        }
        self.vault = vault;
        self.metrics.withdrawals.inc();
        self.metrics.record_payout(payout.paid);
        self.metrics.observe_vault(&self.vault);

        tracing::info!(pool_id, %account, amount, reward = payout.paid, staked, "withdraw");
        self.warn_on_shortfall(pool_id, account, &payout);
        Ok(WithdrawReceipt {
            pool_id,
            account: account.clone(),
            withdrawn: amount,
            reward_paid: payout.paid,
            reward_unpaid: payout.unpaid,
            staked,
        })
    }

    /// Return the whole stake without touching rewards. Pending and unpaid
    /// reward are forfeited.
    pub fn emergency_withdraw(
        &mut self,
        account: &AccountId,
        pool_id: PoolId,
    ) -> Result<EmergencyWithdrawReceipt, ChefError> {
        let current = self.registry.get(pool_id)?;
        let Some(position) = self.ledger.get(pool_id, account).cloned() else {
            return Ok(EmergencyWithdrawReceipt {
                pool_id,
                account: account.clone(),
                withdrawn: 0,
                reward_forfeited: 0,
            });
        };
        // The interval up to now belongs to the stake that was in the pool
        // during it. If accrual overflows the stake is still returned, from
        // the unsettled pool.
        let settled = self.settled(pool_id, self.clock.now()).ok();
        let reward_forfeited = settled
            .as_ref()
            .and_then(|pool| position.pending(pool.acc_reward_per_share).ok())
            .unwrap_or(position.unpaid);
        let mut pool = settled.unwrap_or_else(|| current.clone());
        pool.total_staked = pool
            .total_staked
            .checked_sub(position.amount)
            .ok_or(ChefError::Overflow)?;

        self.registry.replace(pool_id, pool)?;
        self.ledger.remove(pool_id, account);
        self.vault.forfeit(position.unpaid);
        self.metrics.emergency_withdrawals.inc();
        self.metrics.observe_vault(&self.vault);

        tracing::warn!(
            pool_id,
            %account,
            amount = position.amount,
            reward_forfeited,
            "emergency withdraw"
        );
        Ok(EmergencyWithdrawReceipt {
            pool_id,
            account: account.clone(),
            withdrawn: position.amount,
            reward_forfeited,
        })
    }

    fn warn_on_shortfall(&self, pool_id: PoolId, account: &AccountId, payout: &Payout) {
        if payout.unpaid > 0 {
            tracing::warn!(
                pool_id,
                %account,
                unpaid = payout.unpaid,
                deficit = self.vault.deficit(),
                "reward vault short, payout deferred"
            );
        }
    }

    fn observe_pools(&self) {
        self.metrics
            .observe_pools(self.registry.len(), self.registry.total_weight());
    }

    // ── Vault ───────────────────────────────────────────────────────────

    /// Credit reward tokens to the vault. Anyone may fund. Returns the new balance.
    pub fn fund_vault(&mut self, funder: &AccountId, amount: u128) -> Result<u128, ChefError> {
        let balance = self.vault.fund(amount)?;
        self.metrics.vault_fundings.inc();
        self.metrics.observe_vault(&self.vault);
        tracing::info!(%funder, amount, balance, "vault funded");
        Ok(balance)
    }

    /// Move `amount` reward tokens out of the vault to the owner. Owner only.
    /// Returns the new balance.
    pub fn drain_vault(&mut self, caller: &AccountId, amount: u128) -> Result<u128, ChefError> {
        self.ensure_owner(caller)?;
        let balance = self.vault.drain(amount)?;
        self.metrics.vault_drains.inc();
        self.metrics.observe_vault(&self.vault);
        tracing::warn!(%caller, amount, balance, "vault drained");
        Ok(balance)
    }

    // ── Admin slots ─────────────────────────────────────────────────────

    pub fn set_migrator(
        &mut self,
        caller: &AccountId,
        migrator: AccountId,
    ) -> Result<(), ChefError> {
        self.ensure_owner(caller)?;
        tracing::info!(%migrator, "migrator set");
        self.migrator = Some(migrator);
        Ok(())
    }

    pub fn migrator(&self) -> Option<&AccountId> {
        self.migrator.as_ref()
    }

    pub fn transfer_ownership(
        &mut self,
        caller: &AccountId,
        new_owner: AccountId,
    ) -> Result<(), ChefError> {
        self.ensure_owner(caller)?;
        tracing::info!(old_owner = %self.owner, new_owner = %new_owner, "ownership transferred");
        self.owner = new_owner;
        Ok(())
    }

    // ── Accessors ───────────────────────────────────────────────────────

    pub fn owner(&self) -> &AccountId {
        &self.owner
    }

    pub fn reward_token(&self) -> &TokenId {
        &self.reward_token
    }

    pub fn schedule(&self) -> &EmissionSchedule {
        &self.schedule
    }

    pub fn total_weight(&self) -> u64 {
        self.registry.total_weight()
    }

    /// Pool state as of its last checkpoint.
    pub fn pool(&self, pool_id: PoolId) -> Result<&Pool, ChefError> {
        self.registry.get(pool_id)
    }

    pub fn pools(&self) -> impl Iterator<Item = (PoolId, &Pool)> {
        self.registry.iter()
    }

    pub fn position(&self, pool_id: PoolId, account: &AccountId) -> Option<&Position> {
        self.ledger.get(pool_id, account)
    }

    pub fn positions(&self) -> impl Iterator<Item = (PoolId, &AccountId, &Position)> {
        self.ledger.iter()
    }

    pub fn vault(&self) -> &RewardVault {
        &self.vault
    }

    /// Operation counters since construction or load.
    pub fn stats(&self) -> ChefStats {
        self.metrics.snapshot()
    }

    pub fn metrics(&self) -> &ChefMetrics {
        &self.metrics
    }

    pub fn always_mass_update(&self) -> bool {
        self.always_mass_update
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }
}

impl<C: Clock> Chef<C> {
    /// Persist the whole engine as one atomic snapshot.
    pub fn save_to_store(&self, store: &dyn ChefStore) -> Result<(), ChefError> {
        let mut batch = ChefBatch::snapshot();
        batch.put_meta(META_SCHEMA_VERSION, SCHEMA_VERSION.to_be_bytes().to_vec());
        let header = EngineHeader {
            owner: self.owner.clone(),
            migrator: self.migrator.clone(),
            reward_token: self.reward_token.clone(),
            schedule: self.schedule.clone(),
            vault: self.vault.clone(),
            always_mass_update: self.always_mass_update,
        };
        batch.put_meta(META_ENGINE, encode(&header)?);
        for (pool_id, pool) in self.registry.iter() {
            batch.put_pool(pool_id, encode(pool)?);
        }
        for (pool_id, account, position) in self.ledger.iter() {
            batch.put_position(pool_id, account.clone(), encode(position)?);
        }
        store.write_batch(batch)?;
        tracing::debug!(
            pools = self.registry.len(),
            positions = self.ledger.len(),
            "engine saved"
        );
        Ok(())
    }

    /// Restore an engine saved by [`Chef::save_to_store`].
    ///
    /// Rejects snapshots whose positions disagree with their pools' totals or
    /// whose carried unpaid reward disagrees with the vault deficit.
    pub fn load_from_store(store: &dyn ChefStore, clock: C) -> Result<Self, ChefError> {
        let version = store
            .get_meta(META_SCHEMA_VERSION)?
            .ok_or_else(|| StoreError::NotFound("schema_version".to_string()))?;
        let version = <[u8; 4]>::try_from(version.as_slice())
            .map(u32::from_be_bytes)
            .map_err(|_| corruption("schema version is not 4 bytes"))?;
        if version != SCHEMA_VERSION {
            return Err(corruption(format!(
                "unsupported schema version {version}, expected {SCHEMA_VERSION}"
            )));
        }

        let header_bytes = store
            .get_meta(META_ENGINE)?
            .ok_or_else(|| StoreError::NotFound("engine".to_string()))?;
        let header: EngineHeader = decode(&header_bytes)?;

        let mut pools = Vec::new();
        for (expected, (pool_id, bytes)) in (0..).zip(store.iter_pools()?) {
            if pool_id != expected {
                return Err(corruption(format!("pool {expected} missing")));
            }
            pools.push(decode::<Pool>(&bytes)?);
        }
        let registry = PoolRegistry::from_pools(pools)?;

        let mut ledger = PositionLedger::new();
        for (pool_id, account, bytes) in store.iter_positions()? {
            if registry.get(pool_id).is_err() {
                return Err(corruption(format!("position for unknown pool {pool_id}")));
            }
            ledger.insert(pool_id, account, decode::<Position>(&bytes)?);
        }
        for (pool_id, pool) in registry.iter() {
            if ledger.staked_in(pool_id) != Some(pool.total_staked) {
                return Err(corruption(format!(
                    "positions in pool {pool_id} do not sum to its total stake"
                )));
            }
        }
        if ledger.total_unpaid() != Some(header.vault.deficit()) {
            return Err(corruption("unpaid rewards do not match the vault deficit"));
        }

        tracing::info!(
            pools = registry.len(),
            positions = ledger.len(),
            "engine loaded"
        );
        let chef = Self {
            clock,
            owner: header.owner,
            migrator: header.migrator,
            reward_token: header.reward_token,
            schedule: header.schedule,
            registry,
            ledger,
            vault: header.vault,
            always_mass_update: header.always_mass_update,
            metrics: ChefMetrics::new(),
        };
        chef.observe_pools();
        chef.metrics.observe_vault(&chef.vault);
        Ok(chef)
    }
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, ChefError> {
    bincode::serialize(value).map_err(|e| ChefError::Serialization(e.to_string()))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, ChefError> {
    bincode::deserialize(bytes).map_err(|e| ChefError::Serialization(e.to_string()))
}

fn corruption(message: impl Into<String>) -> ChefError {
    ChefError::Store(StoreError::Corruption(message.into()))
}
