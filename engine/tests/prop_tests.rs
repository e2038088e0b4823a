use proptest::prelude::*;

use chef_engine::{Chef, ChefError, EmissionSchedule};
use chef_nullables::NullClock;
use chef_types::{AccountId, Timestamp, TokenId};
use std::sync::Arc;

const START: u64 = 1_000;

fn owner() -> AccountId {
    AccountId::new("owner")
}

fn account(n: u8) -> AccountId {
    AccountId::new(format!("acct{n}"))
}

fn make_chef(rate: u128, weights: &[u64]) -> (Arc<NullClock>, Chef<Arc<NullClock>>) {
    let clock = Arc::new(NullClock::new(START));
    let schedule = EmissionSchedule::new(rate, Timestamp::new(START));
    let mut chef = Chef::new(owner(), TokenId::new("FAST"), schedule, clock.clone());
    for (i, weight) in weights.iter().enumerate() {
        let stake_token = TokenId::new(format!("LP{i}"));
        chef.add_pool(&owner(), *weight, stake_token, true).unwrap();
    }
    chef.fund_vault(&owner(), u128::from(u64::MAX)).unwrap();
    (clock, chef)
}

#[derive(Clone, Debug)]
enum Op {
    Deposit { who: u8, pool: u32, amount: u128 },
    Withdraw { who: u8, pool: u32, amount: u128 },
    Emergency { who: u8, pool: u32 },
    Advance(u64),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..3, 0u32..2, 0u128..1_000_000).prop_map(|(who, pool, amount)| Op::Deposit {
            who,
            pool,
            amount
        }),
        (0u8..3, 0u32..2, 0u128..1_000_000).prop_map(|(who, pool, amount)| Op::Withdraw {
            who,
            pool,
            amount
        }),
        (0u8..3, 0u32..2).prop_map(|(who, pool)| Op::Emergency { who, pool }),
        (1u64..10_000).prop_map(Op::Advance),
    ]
}

proptest! {
    /// With constant weight and stake, pending reward never decreases.
    #[test]
    fn pending_monotonic_in_time(
        rate in 1u128..1_000_000,
        stake in 1u128..1_000_000_000,
        steps in prop::collection::vec(1u64..50_000, 1..20),
    ) {
        let (clock, mut chef) = make_chef(rate, &[1]);
        chef.deposit(&account(0), 0, stake).unwrap();
        let mut last = 0;
        for step in steps {
            clock.advance(step);
            let pending = chef.pending_reward(0, &account(0)).unwrap();
            prop_assert!(pending >= last, "pending went from {} to {}", last, pending);
            last = pending;
        }
    }

    /// A lone depositor earns the pool's emission up to truncation dust.
    #[test]
    fn lone_depositor_earns_pool_share(
        rate in 1u128..1_000_000,
        stake in 1u128..1_000_000,
        weight in 1u64..100,
        other_weight in 1u64..100,
        elapsed in 1u64..1_000_000,
    ) {
        let (clock, mut chef) = make_chef(rate, &[weight, other_weight]);
        chef.deposit(&account(0), 0, stake).unwrap();
        clock.advance(elapsed);
        let emitted = u128::from(elapsed) * rate * u128::from(weight)
            / u128::from(weight + other_weight);
        let pending = chef.pending_reward(0, &account(0)).unwrap();
        prop_assert!(pending <= emitted);
        // Dust is below one unit per staked unit, plus the final rounding.
        prop_assert!(emitted - pending <= stake + 1, "emitted {} pending {}", emitted, pending);
    }

    /// Equal simultaneous deposits accrue equally whatever the call order.
    #[test]
    fn order_independent_for_equal_deposits(
        rate in 1u128..1_000_000,
        stake in 1u128..1_000_000_000,
        elapsed in 1u64..1_000_000,
        reversed in any::<bool>(),
    ) {
        let (clock, mut chef) = make_chef(rate, &[1]);
        let (first, second) = if reversed { (1, 0) } else { (0, 1) };
        chef.deposit(&account(first), 0, stake).unwrap();
        chef.deposit(&account(second), 0, stake).unwrap();
        clock.advance(elapsed);
        prop_assert_eq!(
            chef.pending_reward(0, &account(0)).unwrap(),
            chef.pending_reward(0, &account(1)).unwrap()
        );
    }

    /// Paid plus still-pending reward never exceeds what was emitted.
    #[test]
    fn never_pays_more_than_emitted(
        rate in 1u128..1_000,
        ops in prop::collection::vec(op_strategy(), 1..60),
    ) {
        let (clock, mut chef) = make_chef(rate, &[1, 2]);
        let mut elapsed = 0u64;
        for op in ops {
            match op {
                Op::Deposit { who, pool, amount } => {
                    chef.deposit(&account(who), pool, amount).unwrap();
                }
                Op::Withdraw { who, pool, amount } => {
                    let staked = chef.position(pool, &account(who)).map_or(0, |p| p.amount);
                    let result = chef.withdraw(&account(who), pool, amount);
                    prop_assert_eq!(result.is_ok(), amount <= staked);
                }
                Op::Emergency { who, pool } => {
                    chef.emergency_withdraw(&account(who), pool).unwrap();
                }
                Op::Advance(secs) => {
                    clock.advance(secs);
                    elapsed += secs;
                }
            }
        }
        let mut owed = chef.vault().total_paid();
        for pool in 0..2 {
            for who in 0..3 {
                owed += chef.pending_reward(pool, &account(who)).unwrap();
            }
        }
        let emitted = u128::from(elapsed) * rate;
        prop_assert!(owed <= emitted, "owed {} > emitted {}", owed, emitted);
    }

    /// A rejected withdrawal leaves every observable value unchanged.
    #[test]
    fn failed_withdraw_is_atomic(
        stake in 0u128..1_000_000,
        excess in 1u128..1_000,
        elapsed in 0u64..100_000,
    ) {
        let (clock, mut chef) = make_chef(7, &[1]);
        chef.deposit(&account(0), 0, stake).unwrap();
        clock.advance(elapsed);
        let pool_before = chef.pool(0).unwrap().clone();
        let pending_before = chef.pending_reward(0, &account(0)).unwrap();
        let vault_before = chef.vault().clone();

        let result = chef.withdraw(&account(0), 0, stake + excess);
        let is_insufficient = matches!(result, Err(ChefError::InsufficientStake { .. }));
        prop_assert!(is_insufficient);
        prop_assert_eq!(chef.pool(0).unwrap(), &pool_before);
        prop_assert_eq!(chef.pending_reward(0, &account(0)).unwrap(), pending_before);
        prop_assert_eq!(chef.vault(), &vault_before);
    }

    /// Depositing then withdrawing at the same instant is a round trip.
    #[test]
    fn deposit_withdraw_same_instant(
        amount in 0u128..u128::from(u64::MAX),
        warmup in 0u64..100_000,
    ) {
        let (clock, mut chef) = make_chef(1_000, &[1]);
        clock.advance(warmup);
        chef.deposit(&account(0), 0, amount).unwrap();
        let receipt = chef.withdraw(&account(0), 0, amount).unwrap();
        prop_assert_eq!(receipt.withdrawn, amount);
        prop_assert_eq!(receipt.reward_paid, 0);
        prop_assert_eq!(chef.pool(0).unwrap().total_staked, 0);
    }
}
