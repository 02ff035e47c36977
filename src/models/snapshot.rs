use alloy::primitives::Address;
use num_bigint::BigUint;
use serde::Serialize;

/// One persisted row in `market_parameters`, keyed by (asset, block).
#[derive(Debug, Clone, PartialEq)]
pub struct ReserveSnapshot {
    pub m_token_address: Address,
    pub block_number: u64,
    pub price: BigUint,
    pub total_borrows: BigUint,
    /// Percentage, 0-100
    pub utilization: f64,
    pub collateral_factor: BigUint,
    /// No source value in the provider response; always zero
    pub reserves: BigUint,
    pub reserve_factor: BigUint,
    pub supply_cap: BigUint,
    pub borrow_cap: BigUint,
    pub liquidation_incentive: BigUint,
    pub borrow_enabled: bool,
    pub block_timestamp: u64,
}

impl ReserveSnapshot {
    /// Storage form of the key's address: lowercase, 0x-prefixed
    pub fn address_key(&self) -> String {
        format!("{:#x}", self.m_token_address)
    }
}

/// Per-block counters reported once an invocation completes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BlockSummary {
    pub block_number: u64,
    pub total: usize,
    pub persisted: usize,
    /// Rows rejected because the (asset, block) key already exists
    pub duplicates: usize,
    pub failed: usize,
    /// Dry-run only
    pub skipped: usize,
}
