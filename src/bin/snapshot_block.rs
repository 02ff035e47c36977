use sea_orm::Database;
use std::env;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use reserve_snapshot_indexer::jobs::reserve_snapshot_sync::SnapshotJobConfig;
use reserve_snapshot_indexer::models::reserve::BlockEvent;
use reserve_snapshot_indexer::services::block_trigger::ChainHead;
use reserve_snapshot_indexer::services::reserve_fetcher::ReserveFetcher;
use reserve_snapshot_indexer::services::reserve_snapshot::{BlockOutcome, ReserveSnapshotService};
use reserve_snapshot_indexer::services::snapshot_store::DbSnapshotStore;
use reserve_snapshot_indexer::services::ui_pool_data_provider::UiPoolDataProvider;

/// Snapshot every reserve at one block, then exit
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,reserve_snapshot_indexer=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: cargo run --bin snapshot_block <block_number>");
        eprintln!("Example: cargo run --bin snapshot_block 28539010");
        std::process::exit(1);
    }

    let block_number: u64 = match args[1].parse() {
        Ok(n) => n,
        Err(_) => {
            eprintln!("Invalid block_number. Must be a non-negative integer.");
            std::process::exit(1);
        }
    };

    let config = SnapshotJobConfig::from_env()?;

    let database_url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?;
    tracing::info!("Connecting to database...");
    let db = Database::connect(&database_url).await?;

    let provider = Arc::new(
        UiPoolDataProvider::new(
            &config.rpc_url,
            &config.ui_pool_data_provider,
            &config.pool_addresses_provider,
            config.chain_id,
        )
        .await?,
    );

    let block_timestamp = provider.block_timestamp(block_number).await?;

    let service = ReserveSnapshotService::new(
        ReserveFetcher::new(provider.clone()),
        Arc::new(DbSnapshotStore::new(db)),
    )
    .with_dry_run(config.dry_run);

    tracing::info!(block_number, dry_run = config.dry_run, "Snapshotting block");

    match service
        .handle_block(BlockEvent {
            block_number,
            block_timestamp,
        })
        .await
    {
        BlockOutcome::Done(summary) => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(())
        }
        BlockOutcome::FetchFailed { error, .. } => Err(error.into()),
    }
}
