//! Reserve Snapshot Service
//!
//! Handles one block-interval event: fetch every reserve in a single batched
//! call, then compute, log and persist each reserve in order. A fetch that
//! exhausts its retries ends the invocation with nothing written; a failed
//! insert only affects its own row.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::models::reserve::BlockEvent;
use crate::models::snapshot::BlockSummary;
use crate::services::metrics_report::{
    render_base_currency, render_block_footer, render_block_header, render_reserve_report,
};
use crate::services::reserve_fetcher::ReserveFetcher;
use crate::services::reserve_metrics::{ScaleFactors, compute_reserve_metrics};
use crate::services::snapshot_store::{PersistenceError, SnapshotStore};

/// How one invocation ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockOutcome {
    Done(BlockSummary),
    FetchFailed { block_number: u64, error: String },
}

impl BlockOutcome {
    pub fn summary(&self) -> Option<&BlockSummary> {
        match self {
            BlockOutcome::Done(summary) => Some(summary),
            BlockOutcome::FetchFailed { .. } => None,
        }
    }
}

pub struct ReserveSnapshotService {
    fetcher: ReserveFetcher,
    store: Arc<dyn SnapshotStore>,
    scales: ScaleFactors,
    dry_run: bool,
}

impl ReserveSnapshotService {
    pub fn new(fetcher: ReserveFetcher, store: Arc<dyn SnapshotStore>) -> Self {
        Self {
            fetcher,
            store,
            scales: ScaleFactors::default(),
            dry_run: false,
        }
    }

    /// Compute and log only; nothing is written
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_scales(mut self, scales: ScaleFactors) -> Self {
        self.scales = scales;
        self
    }

    /// Snapshot every reserve at `event.block_number`
    pub async fn handle_block(&self, event: BlockEvent) -> BlockOutcome {
        let block_number = event.block_number;
        info!("{}", render_block_header(block_number));
        info!(
            block_number,
            block_time = %block_time(event.block_timestamp),
            "Snapshotting reserves"
        );

        let batch = match self.fetcher.fetch_all(block_number).await {
            Ok(batch) => batch,
            Err(e) => {
                error!(
                    block_number,
                    attempts = e.attempts,
                    error = %e,
                    "Failed to fetch reserves data, no snapshot for this block"
                );
                return BlockOutcome::FetchFailed {
                    block_number,
                    error: e.to_string(),
                };
            }
        };

        info!("{}", render_base_currency(&batch.base_currency));

        let mut summary = BlockSummary {
            block_number,
            total: batch.len(),
            ..Default::default()
        };

        for reserve in &batch.reserves {
            let metrics = compute_reserve_metrics(reserve, &self.scales);
            info!("{}", render_reserve_report(&metrics));

            if self.dry_run {
                summary.skipped += 1;
                continue;
            }

            let snapshot = metrics.to_snapshot(&event);
            match self.store.insert(&snapshot).await {
                Ok(()) => summary.persisted += 1,
                Err(e @ PersistenceError::DuplicateKey { .. }) => {
                    summary.duplicates += 1;
                    warn!(
                        block_number,
                        asset = %snapshot.address_key(),
                        symbol = %reserve.symbol,
                        error = %e,
                        "Snapshot already stored, skipping"
                    );
                }
                Err(e) => {
                    summary.failed += 1;
                    error!(
                        block_number,
                        asset = %snapshot.address_key(),
                        symbol = %reserve.symbol,
                        error = %e,
                        "Failed to insert market parameters"
                    );
                }
            }
        }

        info!("{}", render_block_footer(block_number));
        info!(
            block_number,
            total = summary.total,
            persisted = summary.persisted,
            duplicates = summary.duplicates,
            failed = summary.failed,
            skipped = summary.skipped,
            dry_run = self.dry_run,
            "Reserve snapshot completed"
        );

        BlockOutcome::Done(summary)
    }
}

fn block_time(timestamp: u64) -> String {
    i64::try_from(timestamp)
        .ok()
        .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| timestamp.to_string())
}
