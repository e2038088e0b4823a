//! Pool registry: the ordered, append-only list of reward-bearing pools.

use crate::accrual;
use crate::error::ChefError;
use crate::schedule::EmissionSchedule;
use chef_types::{PoolId, Timestamp, TokenId};
use serde::{Deserialize, Serialize};

/// One reward-bearing pool, keyed by its stake token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    /// Token depositors stake into this pool. Fixed at creation.
    pub stake_token: TokenId,
    /// Share of the global rate is `weight / total_weight`. Zero pauses accrual.
    pub weight: u64,
    /// Accrual checkpoint.
    pub last_reward_at: Timestamp,
    /// Reward per staked unit, scaled by [`accrual::ACC_REWARD_PRECISION`].
    pub acc_reward_per_share: u128,
    pub total_staked: u128,
}

impl Pool {
    pub fn new(stake_token: TokenId, weight: u64, last_reward_at: Timestamp) -> Self {
        Self {
            stake_token,
            weight,
            last_reward_at,
            acc_reward_per_share: 0,
            total_staked: 0,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.weight == 0
    }
}

/// Pools in insertion order plus the cached sum of their weights.
///
/// A pool's [`PoolId`] is its index; pools are never removed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PoolRegistry {
    pools: Vec<Pool>,
    total_weight: u64,
}

impl PoolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a registry from pools in id order, recomputing the total weight.
    pub fn from_pools(pools: Vec<Pool>) -> Result<Self, ChefError> {
        let total_weight = pools
            .iter()
            .try_fold(0u64, |acc, pool| acc.checked_add(pool.weight))
            .ok_or(ChefError::Overflow)?;
        Ok(Self {
            pools,
            total_weight,
        })
    }

    pub fn len(&self) -> usize {
        self.pools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pools.is_empty()
    }

    pub fn total_weight(&self) -> u64 {
        self.total_weight
    }

    pub fn get(&self, pool_id: PoolId) -> Result<&Pool, ChefError> {
        self.pools
            .get(pool_id as usize)
            .ok_or(ChefError::InvalidPoolId {
                pool_id,
                pool_count: self.pools.len(),
            })
    }

    pub fn iter(&self) -> impl Iterator<Item = (PoolId, &Pool)> {
        // `push` refuses to grow past `PoolId::MAX`, so the cast is lossless.
        self.pools
            .iter()
            .enumerate()
            .map(|(index, pool)| (index as PoolId, pool))
    }

    /// Append a pool, returning its id.
    pub fn push(&mut self, pool: Pool) -> Result<PoolId, ChefError> {
        let pool_id = PoolId::try_from(self.pools.len()).map_err(|_| ChefError::Overflow)?;
        let total_weight = self
            .total_weight
            .checked_add(pool.weight)
            .ok_or(ChefError::Overflow)?;
        self.pools.push(pool);
        self.total_weight = total_weight;
        Ok(pool_id)
    }

    /// Replace a pool's weight, returning the old one.
    pub fn set_weight(&mut self, pool_id: PoolId, weight: u64) -> Result<u64, ChefError> {
        let old = self.get(pool_id)?.weight;
        let total_weight = self
            .total_weight
            .checked_sub(old)
            .and_then(|rest| rest.checked_add(weight))
            .ok_or(ChefError::Overflow)?;
        if let Some(pool) = self.pools.get_mut(pool_id as usize) {
            pool.weight = weight;
        }
        self.total_weight = total_weight;
        Ok(old)
    }

    /// Overwrite a pool's state with a settled or updated copy.
    ///
    /// The weight must not change; use [`PoolRegistry::set_weight`] for that.
    pub fn replace(&mut self, pool_id: PoolId, pool: Pool) -> Result<(), ChefError> {
        let pool_count = self.pools.len();
        let slot = self
            .pools
            .get_mut(pool_id as usize)
            .ok_or(ChefError::InvalidPoolId {
                pool_id,
                pool_count,
            })?;
        debug_assert_eq!(slot.weight, pool.weight);
        *slot = pool;
        Ok(())
    }

    /// Settle a single pool up to `now`.
    pub fn settle(
        &mut self,
        pool_id: PoolId,
        schedule: &EmissionSchedule,
        now: Timestamp,
    ) -> Result<(), ChefError> {
        let settled = accrual::settle_pool(self.get(pool_id)?, schedule, self.total_weight, now)?;
        self.replace(pool_id, settled)
    }

    /// Settle every pool up to `now`.
    ///
    /// On error some pools may already be settled; callers run this on a
    /// clone and discard it on failure.
    pub fn settle_all(
        &mut self,
        schedule: &EmissionSchedule,
        now: Timestamp,
    ) -> Result<(), ChefError> {
        let total_weight = self.total_weight;
        for pool in &mut self.pools {
            *pool = accrual::settle_pool(pool, schedule, total_weight, now)?;
        }
        Ok(())
    }
}
