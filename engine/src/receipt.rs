//! Receipts returned by stake mutations.

use chef_types::{AccountId, PoolId};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositReceipt {
    pub pool_id: PoolId,
    pub account: AccountId,
    pub deposited: u128,
    pub reward_paid: u128,
    /// Reward still owed because the vault ran short.
    pub reward_unpaid: u128,
    /// Stake after the deposit.
    pub staked: u128,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawReceipt {
    pub pool_id: PoolId,
    pub account: AccountId,
    pub withdrawn: u128,
    pub reward_paid: u128,
    pub reward_unpaid: u128,
    /// Stake left after the withdrawal.
    pub staked: u128,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyWithdrawReceipt {
    pub pool_id: PoolId,
    pub account: AccountId,
    pub withdrawn: u128,
    /// Reward given up, as it stood at the time of the call.
    pub reward_forfeited: u128,
}
