use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use chef_engine::accrual::settle_pool;
use chef_engine::{Chef, EmissionSchedule, Pool};
use chef_types::{AccountId, SystemClock, Timestamp, TokenId};

const RATE: u128 = 2_543_752_543_752_543;

fn owner() -> AccountId {
    AccountId::new("owner")
}

/// An engine whose emission started long ago, with `pools` staked pools.
fn make_chef(pools: usize) -> Chef {
    let schedule = EmissionSchedule::new(RATE, Timestamp::new(0));
    let mut chef = Chef::new(owner(), TokenId::new("FAST"), schedule, SystemClock);
    for i in 0..pools {
        let stake_token = TokenId::new(format!("LP{i}"));
        let pool_id = chef.add_pool(&owner(), 1 + i as u64, stake_token, false).unwrap();
        let depositor = AccountId::new(format!("acct{i}"));
        chef.deposit(&depositor, pool_id, 1_000_000_000_000_000_000).unwrap();
    }
    chef.fund_vault(&owner(), u128::MAX / 2).unwrap();
    chef
}

fn bench_settle_pool(c: &mut Criterion) {
    let schedule = EmissionSchedule::new(RATE, Timestamp::new(0));
    let mut pool = Pool::new(TokenId::new("LP"), 3, Timestamp::new(1_000));
    pool.total_staked = 91_000_000_000_000_000_000;
    let now = Timestamp::new(1_000 + 86_400);

    c.bench_function("settle_pool", |b| {
        b.iter(|| black_box(settle_pool(black_box(&pool), &schedule, 10, black_box(now))));
    });
}

fn bench_pending_reward(c: &mut Criterion) {
    let chef = make_chef(1);
    let depositor = AccountId::new("acct0");
    c.bench_function("pending_reward", |b| {
        b.iter(|| black_box(chef.pending_reward(0, black_box(&depositor))));
    });
}

fn bench_harvest(c: &mut Criterion) {
    let mut chef = make_chef(1);
    let depositor = AccountId::new("acct0");
    c.bench_function("deposit_zero_harvest", |b| {
        b.iter(|| black_box(chef.deposit(&depositor, 0, 0)));
    });
}

fn bench_mass_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("mass_update_pools");
    for pool_count in [1, 10, 100, 1000] {
        let mut chef = make_chef(pool_count);
        group.bench_with_input(
            BenchmarkId::new("pools", pool_count),
            &pool_count,
            |b, _| {
                b.iter(|| black_box(chef.mass_update_pools()));
            },
        );
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_settle_pool,
    bench_pending_reward,
    bench_harvest,
    bench_mass_update
);
criterion_main!(benches);
