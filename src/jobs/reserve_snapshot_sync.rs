//! Reserve Snapshot Sync Job
//!
//! Follows the chain head and snapshots every Aave V3 reserve at each
//! eligible block (`SNAPSHOT_START_BLOCK + k * SNAPSHOT_BLOCK_INTERVAL`).
//! Supports graceful shutdown via SIGINT.

use alloy::primitives::Address;
use sea_orm::DatabaseConnection;
use std::env;
use std::str::FromStr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration as TokioDuration};
use tracing::{error, info, warn};

use crate::models::reserve::BlockEvent;
use crate::services::block_trigger::{BlockSchedule, BlockTrigger, ChainHead};
use crate::services::reserve_fetcher::ReserveFetcher;
use crate::services::reserve_snapshot::ReserveSnapshotService;
use crate::services::snapshot_store::DbSnapshotStore;
use crate::services::ui_pool_data_provider::{
    DEFAULT_CHAIN_ID, DEFAULT_POOL_ADDRESSES_PROVIDER, DEFAULT_UI_POOL_DATA_PROVIDER_ADDRESS,
    UiPoolDataProvider,
};

/// Base mainnet public endpoint
const DEFAULT_RPC_URL: &str = "https://mainnet.base.org";

const DEFAULT_START_BLOCK: u64 = 28_539_000;

const DEFAULT_BLOCK_INTERVAL: u64 = 10;

/// Roughly one Base block
const DEFAULT_POLL_INTERVAL_SECS: u64 = 2;

const ENV_RPC_URL: &str = "RPC_URL";
const ENV_CHAIN_ID: &str = "CHAIN_ID";
const ENV_UI_POOL_DATA_PROVIDER: &str = "UI_POOL_DATA_PROVIDER_ADDRESS";
const ENV_POOL_ADDRESSES_PROVIDER: &str = "POOL_ADDRESSES_PROVIDER";
const ENV_START_BLOCK: &str = "SNAPSHOT_START_BLOCK";
const ENV_BLOCK_INTERVAL: &str = "SNAPSHOT_BLOCK_INTERVAL";
const ENV_POLL_INTERVAL: &str = "SNAPSHOT_POLL_INTERVAL_SECS";
const ENV_DRY_RUN: &str = "SNAPSHOT_DRY_RUN";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} is invalid: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotJobConfig {
    pub rpc_url: String,
    pub chain_id: u64,
    pub ui_pool_data_provider: String,
    pub pool_addresses_provider: String,
    pub start_block: u64,
    pub block_interval: u64,
    pub poll_interval_secs: u64,
    pub dry_run: bool,
}

impl SnapshotJobConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the config from any key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let rpc_url = lookup(ENV_RPC_URL).unwrap_or_else(|| DEFAULT_RPC_URL.to_string());
        if !(rpc_url.starts_with("http://") || rpc_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                key: ENV_RPC_URL,
                reason: format!("expected an http(s) URL, got {}", rpc_url),
            });
        }

        let ui_pool_data_provider = address_var(
            &lookup,
            ENV_UI_POOL_DATA_PROVIDER,
            DEFAULT_UI_POOL_DATA_PROVIDER_ADDRESS,
        )?;
        let pool_addresses_provider = address_var(
            &lookup,
            ENV_POOL_ADDRESSES_PROVIDER,
            DEFAULT_POOL_ADDRESSES_PROVIDER,
        )?;

        let block_interval = numeric_var(&lookup, ENV_BLOCK_INTERVAL, DEFAULT_BLOCK_INTERVAL);
        if block_interval == 0 {
            return Err(ConfigError::InvalidValue {
                key: ENV_BLOCK_INTERVAL,
                reason: "must be greater than zero".to_string(),
            });
        }

        let dry_run = lookup(ENV_DRY_RUN)
            .map(|v| v.to_lowercase() == "true")
            .unwrap_or(false);

        Ok(Self {
            rpc_url,
            chain_id: numeric_var(&lookup, ENV_CHAIN_ID, DEFAULT_CHAIN_ID),
            ui_pool_data_provider,
            pool_addresses_provider,
            start_block: numeric_var(&lookup, ENV_START_BLOCK, DEFAULT_START_BLOCK),
            block_interval,
            poll_interval_secs: numeric_var(&lookup, ENV_POLL_INTERVAL, DEFAULT_POLL_INTERVAL_SECS)
                .max(1),
            dry_run,
        })
    }

    pub fn schedule(&self) -> BlockSchedule {
        BlockSchedule::new(self.start_block, self.block_interval)
    }
}

fn numeric_var<F>(lookup: &F, key: &'static str, default: u64) -> u64
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!(key, value = %raw, default, "Unparsable value, using default");
            default
        }),
    }
}

fn address_var<F>(lookup: &F, key: &'static str, default: &str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let value = lookup(key).unwrap_or_else(|| default.to_string());
    Address::from_str(&value).map_err(|e| ConfigError::InvalidValue {
        key,
        reason: e.to_string(),
    })?;
    Ok(value)
}

/// Handle every block that is due right now
///
/// Blocks are handled in ascending order. A failed timestamp lookup stops
/// the pass; the block stays due and is retried on the next poll.
pub async fn process_due_blocks(
    trigger: &mut BlockTrigger,
    chain: &dyn ChainHead,
    service: &ReserveSnapshotService,
) -> usize {
    let due = match trigger.due_blocks(chain).await {
        Ok(due) => due,
        Err(e) => {
            warn!(error = %e, "Failed to read chain head, retrying next tick");
            return 0;
        }
    };

    let mut handled = 0;
    for block_number in due {
        let block_timestamp = match chain.block_timestamp(block_number).await {
            Ok(ts) => ts,
            Err(e) => {
                warn!(block_number, error = %e, "Failed to read block timestamp, retrying next tick");
                break;
            }
        };

        service
            .handle_block(BlockEvent {
                block_number,
                block_timestamp,
            })
            .await;

        trigger.mark_fired(block_number);
        handled += 1;
    }

    handled
}

/// Start the reserve snapshot sync job
///
/// Spawns a background task that:
/// 1. Connects to the RPC node and checks the chain id
/// 2. Polls the chain head every `SNAPSHOT_POLL_INTERVAL_SECS`
/// 3. Snapshots every reserve at each eligible block into market_parameters
///
/// # Environment Variables
///
/// * `RPC_URL` - JSON-RPC endpoint (default: https://mainnet.base.org)
/// * `CHAIN_ID` - expected chain id (default: 8453)
/// * `UI_POOL_DATA_PROVIDER_ADDRESS` / `POOL_ADDRESSES_PROVIDER` - Aave contracts
/// * `SNAPSHOT_START_BLOCK` - first eligible block (default: 28539000)
/// * `SNAPSHOT_BLOCK_INTERVAL` - blocks between snapshots (default: 10)
/// * `SNAPSHOT_DRY_RUN` - Set to "true" for logging only mode
pub fn start_reserve_snapshot_job(
    db: DatabaseConnection,
    config: SnapshotJobConfig,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            rpc_url = %config.rpc_url,
            chain_id = config.chain_id,
            start_block = config.start_block,
            block_interval = config.block_interval,
            poll_interval_secs = config.poll_interval_secs,
            dry_run = config.dry_run,
            "Initializing reserve snapshot job"
        );

        let provider = match UiPoolDataProvider::new(
            &config.rpc_url,
            &config.ui_pool_data_provider,
            &config.pool_addresses_provider,
            config.chain_id,
        )
        .await
        {
            Ok(provider) => Arc::new(provider),
            Err(e) => {
                error!(error = %e, "Failed to initialize UiPoolDataProvider");
                return;
            }
        };

        let service = ReserveSnapshotService::new(
            ReserveFetcher::new(provider.clone()),
            Arc::new(DbSnapshotStore::new(db)),
        )
        .with_dry_run(config.dry_run);

        let mut trigger = BlockTrigger::new(config.schedule());

        info!("Reserve snapshot job started successfully");

        let mut interval = interval(TokioDuration::from_secs(config.poll_interval_secs));

        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received, stopping reserve snapshot job gracefully");
                    break;
                }
                _ = interval.tick() => {
                    process_due_blocks(&mut trigger, provider.as_ref(), &service).await;
                }
            }
        }

        info!("Reserve snapshot job stopped");
    })
}
