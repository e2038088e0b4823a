//! Position ledger: per (pool, account) stake and reward-debt snapshots.

use crate::accrual;
use crate::error::ChefError;
use crate::pool::Pool;
use crate::vault::{Payout, RewardVault};
use chef_types::{AccountId, PoolId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One account's stake in one pool.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub amount: u128,
    /// `amount * acc_reward_per_share / PRECISION` at the last settlement.
    pub reward_debt: u128,
    /// Reward owed at an earlier harvest that the vault could not cover.
    pub unpaid: u128,
}

impl Position {
    /// Reward owed against `acc_reward_per_share`, including carried unpaid.
    ///
    /// `acc_reward_per_share` must come from a freshly settled pool.
    pub fn pending(&self, acc_reward_per_share: u128) -> Result<u128, ChefError> {
        accrual::pending(self.amount, acc_reward_per_share, self.reward_debt)?
            .checked_add(self.unpaid)
            .ok_or(ChefError::Overflow)
    }

    /// Pay everything owed against settled `pool` from `vault`.
    ///
    /// Leaves `reward_debt` stale; the caller adjusts `amount` and then
    /// calls [`Position::sync_debt`].
    pub fn harvest(&mut self, pool: &Pool, vault: &mut RewardVault) -> Result<Payout, ChefError> {
        let owed = self.pending(pool.acc_reward_per_share)?;
        let payout = vault.pay(owed, self.unpaid);
        self.unpaid = payout.unpaid;
        Ok(payout)
    }

    /// Snapshot the accumulator so pending starts again from zero.
    pub fn sync_debt(&mut self, pool: &Pool) -> Result<(), ChefError> {
        self.reward_debt = accrual::accumulated(self.amount, pool.acc_reward_per_share)?;
        Ok(())
    }
}

/// All positions, ordered by pool then account.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PositionLedger {
    positions: BTreeMap<(PoolId, AccountId), Position>,
}

impl PositionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, pool_id: PoolId, account: &AccountId) -> Option<&Position> {
        self.positions.get(&(pool_id, account.clone()))
    }

    pub fn insert(&mut self, pool_id: PoolId, account: AccountId, position: Position) {
        self.positions.insert((pool_id, account), position);
    }

    pub fn remove(&mut self, pool_id: PoolId, account: &AccountId) -> Option<Position> {
        self.positions.remove(&(pool_id, account.clone()))
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (PoolId, &AccountId, &Position)> {
        self.positions
            .iter()
            .map(|((pool_id, account), position)| (*pool_id, account, position))
    }

    /// Positions in one pool, ordered by account.
    pub fn in_pool(&self, pool_id: PoolId) -> impl Iterator<Item = (&AccountId, &Position)> {
        self.positions
            .iter()
            .filter(move |((id, _), _)| *id == pool_id)
            .map(|((_, account), position)| (account, position))
    }

    /// Sum of stake in one pool, `None` on overflow.
    pub fn staked_in(&self, pool_id: PoolId) -> Option<u128> {
        self.in_pool(pool_id)
            .try_fold(0u128, |acc, (_, position)| acc.checked_add(position.amount))
    }

    /// Sum of every position's carried unpaid reward, `None` on overflow.
    pub fn total_unpaid(&self) -> Option<u128> {
        self.positions
            .values()
            .try_fold(0u128, |acc, position| acc.checked_add(position.unpaid))
    }
}
