//! Reserve fetcher
//!
//! Obtains the full reserve list for one block through a `ReserveDataSource`,
//! retrying transient failures with the configured `RetryPolicy`.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info};

use crate::models::reserve::ReserveBatch;
use crate::services::retry::{RetryExhausted, RetryPolicy, Sleeper, TokioSleeper, retry_with_backoff};

/// Transient failure of a single remote query
#[derive(Debug, Clone, thiserror::Error)]
pub enum ReserveFetchError {
    #[error("rpc error: {0}")]
    Rpc(String),
    #[error("decode error: {0}")]
    Decode(String),
}

/// Retry bound exceeded for one block's fetch
pub type FetchExhausted = RetryExhausted<ReserveFetchError>;

/// Read-only source of batched reserve data.
///
/// One call is one remote query, regardless of how many reserves it returns.
#[async_trait]
pub trait ReserveDataSource: Send + Sync {
    async fn get_reserves_data(&self, block_number: u64) -> Result<ReserveBatch, ReserveFetchError>;
}

pub struct ReserveFetcher {
    source: Arc<dyn ReserveDataSource>,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl ReserveFetcher {
    /// Fetcher with the default policy and the tokio clock
    pub fn new(source: Arc<dyn ReserveDataSource>) -> Self {
        Self::with_policy(source, RetryPolicy::default(), Arc::new(TokioSleeper))
    }

    pub fn with_policy(
        source: Arc<dyn ReserveDataSource>,
        policy: RetryPolicy,
        sleeper: Arc<dyn Sleeper>,
    ) -> Self {
        Self {
            source,
            policy,
            sleeper,
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Fetch every reserve at `block_number`, all or nothing
    pub async fn fetch_all(&self, block_number: u64) -> Result<ReserveBatch, FetchExhausted> {
        debug!(block_number, "Fetching reserves data");

        let batch = retry_with_backoff(
            &self.policy,
            self.sleeper.as_ref(),
            "getReservesData",
            || self.source.get_reserves_data(block_number),
        )
        .await?;

        info!(
            block_number,
            reserve_count = batch.len(),
            "Fetched reserves data"
        );

        Ok(batch)
    }
}
