//! Multi-day reward scenarios driven by a deterministic clock.
//!
//! The schedule emits 20000 reward tokens (18 decimals) over a 91-day window,
//! so one full day is worth ~219.78 tokens split across all pools.

use chef_engine::{Chef, ChefError, EmissionSchedule};
use chef_nullables::{NullChefStore, NullClock};
use chef_store_lmdb::LmdbChefStore;
use chef_types::{AccountId, Clock, Timestamp, TokenId, SECONDS_PER_DAY};
use std::sync::Arc;

const UNIT: u128 = 1_000_000_000_000_000_000;
const WINDOW_SECS: u64 = 91 * SECONDS_PER_DAY;
const T0: u64 = 1_000_000;
/// Emission starts two seconds after the first pool is added.
const START: u64 = T0 + 2;

type TestChef = Chef<Arc<NullClock>>;

fn owner() -> AccountId {
    AccountId::new("0x4d338614fc25afe6edf3994f331b4bad32fb3c6a")
}

fn bob() -> AccountId {
    AccountId::new("0xb0b")
}

fn carol() -> AccountId {
    AccountId::new("0xca201")
}

/// An engine emitting `total_tokens` over the window, with the vault funded
/// for all of it and one pool per entry of `weights`.
fn farm(total_tokens: u128, weights: &[u64]) -> (Arc<NullClock>, TestChef) {
    let clock = Arc::new(NullClock::new(T0));
    let rate = total_tokens * UNIT / u128::from(WINDOW_SECS);
    let schedule = EmissionSchedule::with_duration(rate, Timestamp::new(START), WINDOW_SECS);
    let mut chef = Chef::new(owner(), TokenId::new("FAST"), schedule, clock.clone());
    for (i, weight) in weights.iter().enumerate() {
        let stake_token = TokenId::new(format!("FAST/BNB-{i}"));
        chef.add_pool(&owner(), *weight, stake_token, true).unwrap();
    }
    chef.fund_vault(&owner(), total_tokens * UNIT).unwrap();
    (clock, chef)
}

/// Assert `lo < raw / UNIT < hi` without losing the fractional part.
fn assert_tokens_between(raw: u128, lo: u128, hi: u128) {
    assert!(
        raw > lo * UNIT && raw < hi * UNIT,
        "expected between {lo} and {hi} tokens, got {}.{:018}",
        raw / UNIT,
        raw % UNIT
    );
}

#[test]
fn single_depositor_follows_daily_curve() {
    let (clock, mut chef) = farm(20_000, &[1]);
    chef.deposit(&bob(), 0, 91 * UNIT).unwrap();

    clock.advance_days(1);
    assert_tokens_between(chef.pending_reward(0, &bob()).unwrap(), 217, 221);
    clock.advance_days(2);
    assert_tokens_between(chef.pending_reward(0, &bob()).unwrap(), 657, 661);
    clock.advance_days(7);
    assert_tokens_between(chef.pending_reward(0, &bob()).unwrap(), 2195, 2199);
}

#[test]
fn emission_stops_at_window_end() {
    let (clock, mut chef) = farm(20_000, &[1]);
    chef.deposit(&bob(), 0, 91 * UNIT).unwrap();

    clock.advance_days(91);
    let at_end = chef.pending_reward(0, &bob()).unwrap();
    assert!(at_end > 19_999 * UNIT && at_end <= 20_000 * UNIT);

    clock.advance_days(91);
    let long_after = chef.pending_reward(0, &bob()).unwrap();
    assert!(long_after >= at_end);
    assert!(long_after > 19_999 * UNIT && long_after <= 20_000 * UNIT);

    let receipt = chef.withdraw(&bob(), 0, 91 * UNIT).unwrap();
    assert_eq!(receipt.reward_paid, long_after);
    assert_eq!(receipt.reward_unpaid, 0);
    assert!(chef.vault().is_solvent());
    assert_eq!(chef.vault().balance(), 20_000 * UNIT - long_after);
}

#[test]
fn late_depositor_misses_first_day() {
    let (clock, mut chef) = farm(20_000, &[1]);
    clock.advance_days(1);
    chef.deposit(&bob(), 0, 91 * UNIT).unwrap();
    clock.advance_days(90);
    assert_tokens_between(chef.pending_reward(0, &bob()).unwrap(), 19_779, 19_781);
}

#[test]
fn redeposit_harvests_and_restarts_accrual() {
    let (clock, mut chef) = farm(20_000, &[1]);
    chef.deposit(&bob(), 0, UNIT).unwrap();
    clock.advance_days(10);
    assert_tokens_between(chef.pending_reward(0, &bob()).unwrap(), 2195, 2199);

    let receipt = chef.deposit(&bob(), 0, UNIT).unwrap();
    assert_tokens_between(receipt.reward_paid, 2195, 2199);
    assert_eq!(receipt.staked, 2 * UNIT);
    assert_eq!(chef.pending_reward(0, &bob()).unwrap(), 0);

    clock.advance_days(81);
    assert_tokens_between(chef.pending_reward(0, &bob()).unwrap(), 17_800, 17_804);
}

#[test]
fn pausing_a_pool_redirects_emission() {
    let (clock, mut chef) = farm(40_000, &[100, 100]);
    chef.set_weight(&owner(), 1, 0, true).unwrap();
    assert_eq!(chef.total_weight(), 100);
    chef.deposit(&bob(), 0, 10 * UNIT).unwrap();
    clock.advance_days(1);
    let receipt = chef.deposit(&bob(), 0, 0).unwrap();
    assert_tokens_between(receipt.reward_paid, 437, 441);

    // A paused pool still accepts stake but earns nothing.
    chef.deposit(&carol(), 1, 10 * UNIT).unwrap();
    clock.advance_days(1);
    assert_eq!(chef.pending_reward(1, &carol()).unwrap(), 0);
}

#[test]
fn equal_deposits_share_equally() {
    let (clock, mut chef) = farm(20_000, &[1]);
    chef.deposit(&bob(), 0, 100 * UNIT).unwrap();
    chef.deposit(&carol(), 0, 100 * UNIT).unwrap();
    clock.advance_days(1);

    let bob_receipt = chef.withdraw(&bob(), 0, 0).unwrap();
    let carol_receipt = chef.withdraw(&carol(), 0, 0).unwrap();
    assert_tokens_between(bob_receipt.reward_paid, 107, 111);
    assert_eq!(bob_receipt.reward_paid, carol_receipt.reward_paid);
}

#[test]
fn staggered_deposits_split_from_second_day() {
    let (clock, mut chef) = farm(20_000, &[1]);
    chef.deposit(&bob(), 0, 100 * UNIT).unwrap();
    clock.advance_days(1);
    assert_tokens_between(chef.pending_reward(0, &bob()).unwrap(), 217, 221);

    chef.deposit(&carol(), 0, 100 * UNIT).unwrap();
    clock.advance_days(1);
    assert_tokens_between(chef.pending_reward(0, &bob()).unwrap(), 327, 331);
    assert_tokens_between(chef.pending_reward(0, &carol()).unwrap(), 107, 111);
}

#[test]
fn equal_weight_pools_share_the_rate() {
    let (clock, mut chef) = farm(40_000, &[1, 1]);
    chef.deposit(&bob(), 0, 5 * UNIT).unwrap();
    chef.deposit(&carol(), 1, 500 * UNIT).unwrap();
    clock.advance_days(1);
    assert_tokens_between(chef.pending_reward(0, &bob()).unwrap(), 217, 221);
    assert_tokens_between(chef.pending_reward(1, &carol()).unwrap(), 217, 221);
}

#[test]
fn empty_withdraw_and_oversized_withdraw() {
    let (_, mut chef) = farm(20_000, &[1]);
    let receipt = chef.withdraw(&bob(), 0, 0).unwrap();
    assert_eq!((receipt.withdrawn, receipt.reward_paid), (0, 0));

    chef.deposit(&bob(), 0, UNIT).unwrap();
    assert!(matches!(
        chef.withdraw(&bob(), 0, UNIT + 1),
        Err(ChefError::InsufficientStake { .. })
    ));
    assert_eq!(chef.pool(0).unwrap().total_staked, UNIT);
}

#[test]
fn emergency_withdraw_then_redeposit() {
    let (clock, mut chef) = farm(20_000, &[1]);
    chef.deposit(&bob(), 0, 91 * UNIT).unwrap();
    clock.advance_days(3);
    let receipt = chef.emergency_withdraw(&bob(), 0).unwrap();
    assert_eq!(receipt.withdrawn, 91 * UNIT);
    assert_tokens_between(receipt.reward_forfeited, 657, 661);
    assert_eq!(chef.vault().balance(), 20_000 * UNIT);

    chef.deposit(&bob(), 0, 91 * UNIT).unwrap();
    assert_eq!(chef.pending_reward(0, &bob()).unwrap(), 0);
    clock.advance_days(1);
    assert_tokens_between(chef.pending_reward(0, &bob()).unwrap(), 217, 221);
}

#[test]
fn owner_drain_is_gated() {
    let (_, mut chef) = farm(20_000, &[1]);
    assert!(matches!(
        chef.drain_vault(&bob(), UNIT),
        Err(ChefError::Unauthorized { .. })
    ));
    assert!(matches!(
        chef.drain_vault(&owner(), 0),
        Err(ChefError::InvalidAmount { .. })
    ));
    assert_eq!(chef.drain_vault(&owner(), 20_000 * UNIT).unwrap(), 0);
}

#[test]
fn drained_vault_defers_until_refunded() {
    let (clock, mut chef) = farm(20_000, &[1]);
    chef.deposit(&bob(), 0, 91 * UNIT).unwrap();
    clock.advance_days(1);
    chef.drain_vault(&owner(), 20_000 * UNIT).unwrap();

    let receipt = chef.deposit(&bob(), 0, 0).unwrap();
    assert_eq!(receipt.reward_paid, 0);
    assert_tokens_between(receipt.reward_unpaid, 217, 221);
    assert_eq!(chef.vault().deficit(), receipt.reward_unpaid);

    chef.fund_vault(&carol(), 1_000 * UNIT).unwrap();
    let receipt = chef.withdraw(&bob(), 0, 0).unwrap();
    assert_eq!(receipt.reward_unpaid, 0);
    assert!(chef.vault().is_solvent());
}

#[test]
fn snapshot_survives_lmdb_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let (clock, mut chef) = farm(20_000, &[1, 3]);
    chef.deposit(&bob(), 0, 10 * UNIT).unwrap();
    chef.deposit(&carol(), 1, 30 * UNIT).unwrap();
    clock.advance_days(2);
    chef.deposit(&bob(), 0, 0).unwrap();
    {
        let store = LmdbChefStore::open(dir.path()).unwrap();
        chef.save_to_store(&store).unwrap();
    }

    let store = LmdbChefStore::open(dir.path()).unwrap();
    let restored: TestChef = Chef::load_from_store(&store, clock.clone()).unwrap();
    assert_eq!(restored.pool_length(), 2);
    assert_eq!(restored.vault(), chef.vault());
    clock.advance_days(1);
    assert_eq!(
        restored.pending_reward(1, &carol()).unwrap(),
        chef.pending_reward(1, &carol()).unwrap()
    );
    assert_eq!(restored.clock().now(), clock.now());
}

#[test]
fn snapshot_round_trips_through_null_store() {
    let (clock, mut chef) = farm(20_000, &[1]);
    chef.set_migrator(&owner(), carol()).unwrap();
    chef.deposit(&bob(), 0, UNIT).unwrap();
    clock.advance_days(1);

    let store = NullChefStore::new();
    chef.save_to_store(&store).unwrap();
    let mut restored: TestChef = Chef::load_from_store(&store, clock.clone()).unwrap();
    assert_eq!(restored.migrator(), Some(&carol()));
    let original = chef.withdraw(&bob(), 0, UNIT).unwrap();
    let replayed = restored.withdraw(&bob(), 0, UNIT).unwrap();
    assert_eq!(original, replayed);
}
