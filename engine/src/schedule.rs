//! Emission schedule: the global reward rate and the window it applies to.

use chef_types::Timestamp;
use serde::{Deserialize, Serialize};

/// Global reward emission parameters.
///
/// Rewards accrue at `reward_per_second` across all pools combined, only
/// inside `[start, end]`. An open-ended schedule (`end == None`) emits until
/// the owner pauses every pool.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmissionSchedule {
    /// Raw reward units emitted per second across all pools.
    pub reward_per_second: u128,
    /// No reward accrues before this instant.
    pub start: Timestamp,
    /// No reward accrues after this instant.
    pub end: Option<Timestamp>,
}

impl EmissionSchedule {
    /// An open-ended schedule starting at `start`.
    pub fn new(reward_per_second: u128, start: Timestamp) -> Self {
        Self {
            reward_per_second,
            start,
            end: None,
        }
    }

    /// A schedule emitting for `duration_secs` after `start`.
    pub fn with_duration(reward_per_second: u128, start: Timestamp, duration_secs: u64) -> Self {
        Self {
            reward_per_second,
            start,
            end: Some(start.plus_secs(duration_secs)),
        }
    }

    /// Seconds of `[from, to]` that fall inside the emission window.
    pub fn elapsed(&self, from: Timestamp, to: Timestamp) -> u64 {
        let lo = from.max(self.start);
        let hi = match self.end {
            Some(end) => to.min(end),
            None => to,
        };
        lo.elapsed_since(hi)
    }

    /// Whether rewards accrue at `now`.
    pub fn is_active(&self, now: Timestamp) -> bool {
        now >= self.start && self.end.map_or(true, |end| now < end)
    }

    /// Reward emitted across all pools over `[from, to]`, `None` on overflow.
    pub fn emitted_between(&self, from: Timestamp, to: Timestamp) -> Option<u128> {
        u128::from(self.elapsed(from, to)).checked_mul(self.reward_per_second)
    }

    /// Total reward the window can ever emit. `None` for an open-ended window.
    pub fn total_emission(&self) -> Option<u128> {
        let end = self.end?;
        self.emitted_between(self.start, end)
    }
}
