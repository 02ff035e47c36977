// src/lib.rs

pub mod entities {
    pub mod prelude;
    pub mod market_parameters;
    pub mod user_positions;
    pub mod user_transactions;
}

pub mod models {
    pub mod reserve;
    pub mod snapshot;
}

pub mod services {
    pub mod block_trigger;
    pub mod metrics_report;
    pub mod reserve_fetcher;
    pub mod reserve_metrics;
    pub mod reserve_snapshot;
    pub mod retry;
    pub mod snapshot_store;
    pub mod ui_pool_data_provider;
}

pub mod jobs {
    pub mod reserve_snapshot_sync;
}

#[cfg(test)]
pub(crate) mod test_support;
