//! Chef reward engine.
//!
//! Distributes a reward token to depositors of several stake tokens. Each pool
//! gets a share of a global per-second emission proportional to its weight,
//! and each depositor a share of the pool's reward proportional to their stake.
//!
//! - [`pool`]: append-only pool registry
//! - [`accrual`]: the reward-per-share accumulator
//! - [`position`]: per (pool, account) stake and reward debt
//! - [`vault`]: reward balance and payout
//! - [`metrics`]: Prometheus counters and gauges
//! - [`engine`]: the [`Chef`] tying them together

pub mod accrual;
pub mod config;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod pool;
pub mod position;
pub mod receipt;
pub mod schedule;
pub mod stats;
pub mod vault;

pub use accrual::ACC_REWARD_PRECISION;
pub use config::ChefConfig;
pub use engine::{Chef, SCHEMA_VERSION};
pub use error::{AmountErrorReason, ChefError};
pub use metrics::ChefMetrics;
pub use pool::{Pool, PoolRegistry};
pub use position::{Position, PositionLedger};
pub use receipt::{DepositReceipt, EmergencyWithdrawReceipt, WithdrawReceipt};
pub use schedule::EmissionSchedule;
pub use stats::ChefStats;
pub use vault::{Payout, RewardVault};
