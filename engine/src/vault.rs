//! Reward vault: reward tokens the engine holds and pays out from.

use crate::error::{AmountErrorReason, ChefError};
use serde::{Deserialize, Serialize};

/// Reward-token balance held by the engine.
///
/// Payout never exceeds the balance. What could not be paid is carried on
/// the position as `unpaid` and summed here in `deficit` until the vault is
/// funded again.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardVault {
    balance: u128,
    deficit: u128,
    total_funded: u128,
    total_paid: u128,
    total_drained: u128,
}

/// Outcome of one harvest against the vault.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Payout {
    pub owed: u128,
    pub paid: u128,
    /// Part of `owed` the vault could not cover.
    pub unpaid: u128,
}

impl RewardVault {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance(&self) -> u128 {
        self.balance
    }

    /// Reward owed to depositors that the vault could not pay yet.
    pub fn deficit(&self) -> u128 {
        self.deficit
    }

    pub fn is_solvent(&self) -> bool {
        self.deficit == 0
    }

    pub fn total_funded(&self) -> u128 {
        self.total_funded
    }

    pub fn total_paid(&self) -> u128 {
        self.total_paid
    }

    pub fn total_drained(&self) -> u128 {
        self.total_drained
    }

    /// Credit `amount` reward tokens. Returns the new balance.
    pub(crate) fn fund(&mut self, amount: u128) -> Result<u128, ChefError> {
        if amount == 0 {
            return Err(ChefError::InvalidAmount {
                amount,
                reason: AmountErrorReason::Zero,
            });
        }
        let balance = self
            .balance
            .checked_add(amount)
            .ok_or(ChefError::Overflow)?;
        self.balance = balance;
        self.total_funded = self.total_funded.saturating_add(amount);
        Ok(balance)
    }

    /// Pay out `owed`, of which `carried` was already counted in the deficit.
    ///
    /// Never fails: payout saturates at the balance.
    pub(crate) fn pay(&mut self, owed: u128, carried: u128) -> Payout {
        let paid = owed.min(self.balance);
        let unpaid = owed - paid;
        self.balance -= paid;
        self.total_paid = self.total_paid.saturating_add(paid);
        self.deficit = self.deficit.saturating_sub(carried).saturating_add(unpaid);
        Payout { owed, paid, unpaid }
    }

    /// Drop an unpaid claim without paying it.
    pub(crate) fn forfeit(&mut self, unpaid: u128) {
        self.deficit = self.deficit.saturating_sub(unpaid);
    }

    /// Remove `amount` for the owner. Returns the new balance.
    pub(crate) fn drain(&mut self, amount: u128) -> Result<u128, ChefError> {
        if amount == 0 {
            return Err(ChefError::InvalidAmount {
                amount,
                reason: AmountErrorReason::Zero,
            });
        }
        if amount > self.balance {
            return Err(ChefError::InvalidAmount {
                amount,
                reason: AmountErrorReason::ExceedsBalance {
                    balance: self.balance,
                },
            });
        }
        self.balance -= amount;
        self.total_drained = self.total_drained.saturating_add(amount);
        Ok(self.balance)
    }
}
