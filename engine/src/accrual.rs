//! Accrual math: the per-pool reward-per-share accumulator.
//!
//! Everything here is a pure function of (pool, schedule, total weight, now).
//! The engine calls [`settle_pool`] on a copy of a pool and commits the result
//! only once the whole operation has succeeded.
//!
//! All divisions truncate toward zero, so rounding dust stays in the vault and
//! the sum of all payouts never exceeds what the schedule emitted.

use crate::error::ChefError;
use crate::pool::Pool;
use crate::schedule::EmissionSchedule;
use chef_types::Timestamp;

/// Fixed-point scale of `acc_reward_per_share`.
pub const ACC_REWARD_PRECISION: u128 = 1_000_000_000_000;

/// `floor(a * b / d)`, or `None` if the quotient does not fit or `d == 0`.
///
/// Falls back to splitting `a` (then `b`) by `d` when the plain product
/// overflows, so large stakes against a large accumulator still resolve.
pub fn mul_div(a: u128, b: u128, d: u128) -> Option<u128> {
    if d == 0 {
        return None;
    }
    if let Some(product) = a.checked_mul(b) {
        return Some(product / d);
    }
    // a = q*d + r, so a*b/d = q*b + r*b/d exactly.
    let (q, r) = (a / d, a % d);
    let whole = q.checked_mul(b)?;
    let frac = match r.checked_mul(b) {
        Some(product) => product / d,
        None => {
            let (q2, r2) = (b / d, b % d);
            r.checked_mul(q2)?.checked_add(r.checked_mul(r2)? / d)?
        }
    };
    whole.checked_add(frac)
}

/// Reward emitted to `pool` between its checkpoint and `now`.
pub fn pool_reward(
    pool: &Pool,
    schedule: &EmissionSchedule,
    total_weight: u64,
    now: Timestamp,
) -> Result<u128, ChefError> {
    if pool.weight == 0 || total_weight == 0 {
        return Ok(0);
    }
    let emitted = schedule
        .emitted_between(pool.last_reward_at, now)
        .ok_or(ChefError::Overflow)?;
    mul_div(emitted, u128::from(pool.weight), u128::from(total_weight)).ok_or(ChefError::Overflow)
}

/// Bring `pool`'s accumulator up to `now`, returning the settled copy.
///
/// - `now <= last_reward_at`: unchanged.
/// - nothing staked, or weight 0: checkpoint moves to `now`, accumulator
///   untouched (that interval's emission is never distributed).
/// - otherwise the pool's share of the emission is spread over its stake.
pub fn settle_pool(
    pool: &Pool,
    schedule: &EmissionSchedule,
    total_weight: u64,
    now: Timestamp,
) -> Result<Pool, ChefError> {
    let mut settled = pool.clone();
    if now <= pool.last_reward_at {
        return Ok(settled);
    }
    if pool.total_staked == 0 || pool.weight == 0 {
        settled.last_reward_at = now;
        return Ok(settled);
    }
    let reward = pool_reward(pool, schedule, total_weight, now)?;
    let delta =
        mul_div(reward, ACC_REWARD_PRECISION, pool.total_staked).ok_or(ChefError::Overflow)?;
    settled.acc_reward_per_share = pool
        .acc_reward_per_share
        .checked_add(delta)
        .ok_or(ChefError::Overflow)?;
    settled.last_reward_at = now;
    Ok(settled)
}

/// `amount * acc / PRECISION`: reward a stake of `amount` has earned since
/// the accumulator was zero.
pub fn accumulated(amount: u128, acc_reward_per_share: u128) -> Result<u128, ChefError> {
    mul_div(amount, acc_reward_per_share, ACC_REWARD_PRECISION).ok_or(ChefError::Overflow)
}

/// Reward earned since the last settlement, clamped at zero.
pub fn pending(
    amount: u128,
    acc_reward_per_share: u128,
    reward_debt: u128,
) -> Result<u128, ChefError> {
    Ok(accumulated(amount, acc_reward_per_share)?.saturating_sub(reward_debt))
}
