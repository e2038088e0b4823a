//! Engine errors.
//!
//! Every error rejects the whole operation: nothing is mutated when an
//! operation returns `Err`.

use chef_store::StoreError;
use chef_types::{AccountId, PoolId};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ChefError {
    #[error("pool weight must be non-zero")]
    InvalidWeight,

    #[error("pool {pool_id} does not exist ({pool_count} pools registered)")]
    InvalidPoolId { pool_id: PoolId, pool_count: usize },

    #[error("insufficient stake: requested {requested}, staked {staked}")]
    InsufficientStake { requested: u128, staked: u128 },

    #[error("invalid amount {amount}: {reason}")]
    InvalidAmount {
        amount: u128,
        reason: AmountErrorReason,
    },

    #[error("{caller} is not authorized for this operation")]
    Unauthorized { caller: AccountId },

    #[error("arithmetic overflow in reward computation")]
    Overflow,

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Why an amount was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountErrorReason {
    Zero,
    ExceedsBalance { balance: u128 },
}

impl fmt::Display for AmountErrorReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zero => write!(f, "amount must be greater than zero"),
            Self::ExceedsBalance { balance } => write!(f, "exceeds vault balance {balance}"),
        }
    }
}

impl ChefError {
    /// Stable error code for hosts and logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidWeight => "E001_INVALID_WEIGHT",
            Self::InvalidPoolId { .. } => "E002_INVALID_POOL_ID",
            Self::InsufficientStake { .. } => "E003_INSUFFICIENT_STAKE",
            Self::InvalidAmount { .. } => "E004_INVALID_AMOUNT",
            Self::Unauthorized { .. } => "E005_UNAUTHORIZED",
            Self::Overflow => "E010_OVERFLOW",
            Self::Store(_) => "E020_STORE",
            Self::Serialization(_) => "E021_SERIALIZATION",
            Self::Config(_) => "E030_CONFIG",
        }
    }
}
