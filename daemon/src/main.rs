//! Chef daemon: hosts the reward engine on an LMDB store.
//!
//! Every invocation loads the engine from the data directory, applies one
//! operation using the system clock, and persists the result as a single
//! atomic snapshot. Results are printed as JSON on stdout.

use anyhow::{bail, Context};
use chef_engine::{Chef, ChefConfig, ChefStats};
use chef_store::{ChefStore, META_SCHEMA_VERSION};
use chef_store_lmdb::LmdbChefStore;
use chef_types::{AccountId, PoolId, SystemClock, Timestamp, TokenId};
use chef_utils::{format_window, init_logging, LogFormat};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "chef-daemon", about = "Chef reward engine host")]
struct Cli {
    /// Data directory for the LMDB store. Overrides the config file.
    #[arg(long, env = "CHEF_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Path to a TOML configuration file. Required fields of `init` and the
    /// logging settings are read from it; CLI flags and env vars override.
    #[arg(long, env = "CHEF_CONFIG")]
    config: Option<PathBuf>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, env = "CHEF_LOG_LEVEL")]
    log_level: Option<String>,

    /// Emit logs as JSON lines.
    #[arg(long, env = "CHEF_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Create a new engine in the data directory.
    Init(InitArgs),
    /// Register a pool for a stake token (owner only).
    AddPool {
        #[arg(long)]
        caller: AccountId,
        #[arg(long)]
        weight: u64,
        #[arg(long)]
        stake_token: TokenId,
        /// Settle every pool first.
        #[arg(long)]
        settle_all: bool,
    },
    /// Change a pool's allocation weight (owner only). Zero pauses it.
    SetWeight {
        #[arg(long)]
        caller: AccountId,
        #[arg(long)]
        pool_id: PoolId,
        #[arg(long)]
        weight: u64,
        #[arg(long)]
        settle_all: bool,
    },
    /// Credit reward tokens to the vault.
    Fund {
        #[arg(long)]
        funder: AccountId,
        #[arg(long)]
        amount: u128,
    },
    /// Stake into a pool. An amount of 0 harvests.
    Deposit {
        #[arg(long)]
        account: AccountId,
        #[arg(long)]
        pool_id: PoolId,
        #[arg(long)]
        amount: u128,
    },
    /// Unstake from a pool, harvesting pending reward.
    Withdraw {
        #[arg(long)]
        account: AccountId,
        #[arg(long)]
        pool_id: PoolId,
        #[arg(long)]
        amount: u128,
    },
    /// Return the whole stake, forfeiting reward.
    EmergencyWithdraw {
        #[arg(long)]
        account: AccountId,
        #[arg(long)]
        pool_id: PoolId,
    },
    /// Show an account's pending reward.
    Pending {
        #[arg(long)]
        account: AccountId,
        #[arg(long)]
        pool_id: PoolId,
    },
    /// List all pools.
    Pools,
    /// Move reward tokens out of the vault to the owner (owner only).
    Drain {
        #[arg(long)]
        caller: AccountId,
        #[arg(long)]
        amount: u128,
    },
    /// Record the migration collaborator (owner only).
    SetMigrator {
        #[arg(long)]
        caller: AccountId,
        #[arg(long)]
        migrator: AccountId,
    },
    /// Show engine-wide state.
    Status {
        /// Print the metrics registry in Prometheus text format instead.
        #[arg(long)]
        prometheus: bool,
    },
}

#[derive(clap::Args)]
struct InitArgs {
    #[arg(long)]
    owner: Option<AccountId>,
    #[arg(long)]
    reward_token: Option<TokenId>,
    /// Raw reward units emitted per second across all pools.
    #[arg(long)]
    reward_per_second: Option<u128>,
    /// Unix seconds at which emission starts. Defaults to now.
    #[arg(long)]
    start_time: Option<u64>,
    /// Length of the emission window in seconds. Unset means open-ended.
    #[arg(long)]
    duration_secs: Option<u64>,
    /// Honour each call's settle-all flag instead of always settling every pool.
    #[arg(long)]
    legacy_mass_update: bool,
}

#[derive(Serialize)]
struct PoolView<'a> {
    pool_id: PoolId,
    stake_token: &'a TokenId,
    weight: u64,
    total_staked: u128,
    acc_reward_per_share: u128,
    last_reward_at: u64,
}

#[derive(Serialize)]
struct PendingView<'a> {
    pool_id: PoolId,
    account: &'a AccountId,
    pending: u128,
}

#[derive(Serialize)]
struct VaultView {
    vault_balance: u128,
}

#[derive(Serialize)]
struct StatusView<'a> {
    owner: &'a AccountId,
    migrator: Option<&'a AccountId>,
    reward_token: &'a TokenId,
    reward_per_second: u128,
    emission_window: String,
    always_mass_update: bool,
    pool_count: usize,
    total_weight: u64,
    vault_balance: u128,
    vault_deficit: u128,
    total_funded: u128,
    total_paid: u128,
    stats: ChefStats,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let file_config = cli
        .config
        .as_deref()
        .map(ChefConfig::from_toml_file)
        .transpose()
        .context("failed to load config file")?;

    let log_format = if cli.log_json {
        LogFormat::Json
    } else {
        file_config
            .as_ref()
            .map_or(LogFormat::Human, |config| config.log_format)
    };
    let log_level = cli
        .log_level
        .clone()
        .or_else(|| file_config.as_ref().map(|config| config.log_level.clone()))
        .unwrap_or_else(|| "info".to_string());
    init_logging(log_format, &log_level);

    let data_dir = cli
        .data_dir
        .clone()
        .or_else(|| file_config.as_ref().map(|config| config.data_dir.clone()))
        .unwrap_or_else(|| PathBuf::from("./chef_data"));
    let store = LmdbChefStore::open(&data_dir)
        .with_context(|| format!("failed to open store at {}", data_dir.display()))?;

    if let Command::Init(args) = cli.command {
        if store.get_meta(META_SCHEMA_VERSION)?.is_some() {
            bail!("an engine already exists in {}", data_dir.display());
        }
        let config = init_config(file_config, args)?;
        let chef = Chef::from_config(&config, SystemClock)?;
        chef.save_to_store(&store)?;
        tracing::info!(data_dir = %data_dir.display(), owner = %config.owner, "engine initialised");
        print_json(&status(&chef))?;
        return Ok(());
    }

    let mut chef = Chef::load_from_store(&store, SystemClock).with_context(|| {
        format!(
            "no engine in {}; run `chef-daemon init` first",
            data_dir.display()
        )
    })?;
    let mutated = execute(&mut chef, cli.command)?;
    if mutated {
        chef.save_to_store(&store)?;
    }
    tracing::debug!(stats = ?chef.stats(), mutated, "operation complete");
    Ok(())
}

/// Run one non-init command, printing its result. Returns whether the engine
/// changed and must be saved.
fn execute(chef: &mut Chef, command: Command) -> anyhow::Result<bool> {
    match command {
        Command::Init(_) => bail!("init is handled before the engine is loaded"),
        Command::AddPool {
            caller,
            weight,
            stake_token,
            settle_all,
        } => {
            let pool_id = chef.add_pool(&caller, weight, stake_token, settle_all)?;
            print_json(&pool_view(chef, pool_id)?)?;
        }
        Command::SetWeight {
            caller,
            pool_id,
            weight,
            settle_all,
        } => {
            chef.set_weight(&caller, pool_id, weight, settle_all)?;
            print_json(&pool_view(chef, pool_id)?)?;
        }
        Command::Fund { funder, amount } => {
            let vault_balance = chef.fund_vault(&funder, amount)?;
            print_json(&VaultView { vault_balance })?;
        }
        Command::Deposit {
            account,
            pool_id,
            amount,
        } => print_json(&chef.deposit(&account, pool_id, amount)?)?,
        Command::Withdraw {
            account,
            pool_id,
            amount,
        } => print_json(&chef.withdraw(&account, pool_id, amount)?)?,
        Command::EmergencyWithdraw { account, pool_id } => {
            print_json(&chef.emergency_withdraw(&account, pool_id)?)?
        }
        Command::Pending { account, pool_id } => {
            let pending = chef.pending_reward(pool_id, &account)?;
            print_json(&PendingView {
                pool_id,
                account: &account,
                pending,
            })?;
            return Ok(false);
        }
        Command::Pools => {
            let pools = (0..chef.pool_length())
                .map(|index| {
                    let pool_id = PoolId::try_from(index).context("pool id out of range")?;
                    pool_view(chef, pool_id)
                })
                .collect::<anyhow::Result<Vec<_>>>()?;
            print_json(&pools)?;
            return Ok(false);
        }
        Command::Drain { caller, amount } => {
            let vault_balance = chef.drain_vault(&caller, amount)?;
            print_json(&VaultView { vault_balance })?;
        }
        Command::SetMigrator { caller, migrator } => {
            chef.set_migrator(&caller, migrator)?;
            print_json(&status(chef))?;
        }
        Command::Status { prometheus } => {
            if prometheus {
                print!("{}", chef.metrics().encode_text()?);
            } else {
                print_json(&status(chef))?;
            }
            return Ok(false);
        }
    }
    Ok(true)
}

fn init_config(file_config: Option<ChefConfig>, args: InitArgs) -> anyhow::Result<ChefConfig> {
    let mut config = match file_config {
        Some(config) => config,
        None => {
            let (Some(owner), Some(reward_token), Some(reward_per_second)) = (
                args.owner.clone(),
                args.reward_token.clone(),
                args.reward_per_second,
            ) else {
                bail!("init needs --owner, --reward-token and --reward-per-second, or --config");
            };
            let start_time = args.start_time.unwrap_or_else(|| Timestamp::now().as_secs());
            ChefConfig::new(owner, reward_token, reward_per_second, start_time)
        }
    };
    if let Some(owner) = args.owner {
        config.owner = owner;
    }
    if let Some(reward_token) = args.reward_token {
        config.reward_token = reward_token;
    }
    if let Some(reward_per_second) = args.reward_per_second {
        config.reward_per_second = reward_per_second;
    }
    if let Some(start_time) = args.start_time {
        config.start_time = start_time;
    }
    if args.duration_secs.is_some() {
        config.emission_duration_secs = args.duration_secs;
    }
    if args.legacy_mass_update {
        config.always_mass_update = false;
    }
    config.validate()?;
    Ok(config)
}

fn pool_view(chef: &Chef, pool_id: PoolId) -> anyhow::Result<PoolView<'_>> {
    let pool = chef.pool(pool_id)?;
    Ok(PoolView {
        pool_id,
        stake_token: &pool.stake_token,
        weight: pool.weight,
        total_staked: pool.total_staked,
        acc_reward_per_share: pool.acc_reward_per_share,
        last_reward_at: pool.last_reward_at.as_secs(),
    })
}

fn status(chef: &Chef) -> StatusView<'_> {
    let schedule = chef.schedule();
    let vault = chef.vault();
    StatusView {
        owner: chef.owner(),
        migrator: chef.migrator(),
        reward_token: chef.reward_token(),
        reward_per_second: schedule.reward_per_second,
        emission_window: format_window(
            schedule.start.as_secs(),
            schedule.end.map(|end| end.as_secs()),
        ),
        always_mass_update: chef.always_mass_update(),
        pool_count: chef.pool_length(),
        total_weight: chef.total_weight(),
        vault_balance: vault.balance(),
        vault_deficit: vault.deficit(),
        total_funded: vault.total_funded(),
        total_paid: vault.total_paid(),
        stats: chef.stats(),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
