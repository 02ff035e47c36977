//! Raw reserve data as returned by the pool data provider, plus the block
//! event that triggers a snapshot.

use alloy::primitives::Address;
use num_bigint::{BigInt, BigUint};

/// Block-interval trigger payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockEvent {
    pub block_number: u64,
    /// Unix seconds
    pub block_timestamp: u64,
}

/// One reserve (asset market) at a given block.
///
/// Every on-chain integer is kept at full precision; nothing here is scaled.
#[derive(Debug, Clone, PartialEq)]
pub struct RawReserve {
    pub underlying_asset: Address,
    pub name: String,
    pub symbol: String,
    pub decimals: u32,
    /// Oracle price, 8-decimal USD fixed point
    pub price_in_market_reference_currency: BigUint,
    pub available_liquidity: BigUint,
    pub total_scaled_variable_debt: BigUint,
    /// Ray (1e27)
    pub liquidity_rate: BigUint,
    /// Ray (1e27)
    pub variable_borrow_rate: BigUint,
    /// Basis points
    pub reserve_factor: BigUint,
    /// Basis points
    pub base_ltv_as_collateral: BigUint,
    /// Basis points
    pub reserve_liquidation_threshold: BigUint,
    /// Basis points
    pub reserve_liquidation_bonus: BigUint,
    pub borrowing_enabled: bool,
    pub usage_as_collateral_enabled: bool,
    pub is_active: bool,
    pub is_frozen: bool,
    pub is_paused: bool,
    /// Whole tokens
    pub supply_cap: BigUint,
    /// Whole tokens
    pub borrow_cap: BigUint,
}

/// Market reference currency context returned alongside the reserves.
/// Display only.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseCurrencyInfo {
    pub market_reference_currency_unit: BigUint,
    pub market_reference_currency_price_in_usd: BigInt,
    pub network_base_token_price_in_usd: BigInt,
    pub network_base_token_price_decimals: u8,
}

/// Result of one batched `getReservesData` call
#[derive(Debug, Clone, PartialEq)]
pub struct ReserveBatch {
    /// In the order the provider returned them
    pub reserves: Vec<RawReserve>,
    pub base_currency: BaseCurrencyInfo,
}

impl ReserveBatch {
    pub fn len(&self) -> usize {
        self.reserves.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reserves.is_empty()
    }
}
