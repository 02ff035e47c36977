//! Fakes shared by the unit tests

use alloy::primitives::Address;
use async_trait::async_trait;
use num_bigint::{BigInt, BigUint};
use std::sync::Mutex;
use std::time::Duration;

use crate::models::reserve::{BaseCurrencyInfo, RawReserve, ReserveBatch};
use crate::models::snapshot::ReserveSnapshot;
use crate::services::reserve_fetcher::{ReserveDataSource, ReserveFetchError};
use crate::services::retry::Sleeper;
use crate::services::snapshot_store::{PersistenceError, SnapshotStore};

pub struct NoSleep;

#[async_trait]
impl Sleeper for NoSleep {
    async fn sleep(&self, _duration: Duration) {}
}

/// Records requested delays without waiting
#[derive(Default)]
pub struct RecordingSleeper {
    slept: Mutex<Vec<Duration>>,
}

impl RecordingSleeper {
    pub fn delays(&self) -> Vec<Duration> {
        self.slept.lock().unwrap().clone()
    }
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.slept.lock().unwrap().push(duration);
    }
}

/// Returns the same response for every block
pub struct StaticSource(pub Result<ReserveBatch, ReserveFetchError>);

#[async_trait]
impl ReserveDataSource for StaticSource {
    async fn get_reserves_data(&self, _block: u64) -> Result<ReserveBatch, ReserveFetchError> {
        self.0.clone()
    }
}

/// In-memory store keyed by (asset, block); rows for `reject` fail
#[derive(Default)]
pub struct MemoryStore {
    pub rows: Mutex<Vec<ReserveSnapshot>>,
    pub reject: Vec<Address>,
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn insert(&self, snapshot: &ReserveSnapshot) -> Result<(), PersistenceError> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|r| {
            r.m_token_address == snapshot.m_token_address && r.block_number == snapshot.block_number
        }) {
            return Err(PersistenceError::DuplicateKey {
                address: snapshot.address_key(),
                block_number: snapshot.block_number,
            });
        }
        if self.reject.contains(&snapshot.m_token_address) {
            return Err(PersistenceError::Database("disk full".to_string()));
        }
        rows.push(snapshot.clone());
        Ok(())
    }
}

/// Address whose last byte is `index`
pub fn asset(index: u8) -> Address {
    let mut bytes = [0u8; 20];
    bytes[19] = index;
    Address::from(bytes)
}

/// 18-decimal reserve at $1 with half its liquidity borrowed
pub fn reserve(index: u8) -> RawReserve {
    RawReserve {
        underlying_asset: asset(index),
        name: format!("Token {}", index),
        symbol: format!("TK{}", index),
        decimals: 18,
        price_in_market_reference_currency: BigUint::from(100_000_000u64),
        available_liquidity: BigUint::from(500u32),
        total_scaled_variable_debt: BigUint::from(500u32),
        liquidity_rate: BigUint::from(0u32),
        variable_borrow_rate: BigUint::from(0u32),
        reserve_factor: BigUint::from(1000u32),
        base_ltv_as_collateral: BigUint::from(7500u32),
        reserve_liquidation_threshold: BigUint::from(8000u32),
        reserve_liquidation_bonus: BigUint::from(10500u32),
        borrowing_enabled: true,
        usage_as_collateral_enabled: true,
        is_active: true,
        is_frozen: false,
        is_paused: false,
        supply_cap: BigUint::from(0u32),
        borrow_cap: BigUint::from(0u32),
    }
}

pub fn base_currency() -> BaseCurrencyInfo {
    BaseCurrencyInfo {
        market_reference_currency_unit: BigUint::from(100_000_000u64),
        market_reference_currency_price_in_usd: BigInt::from(100_000_000i64),
        network_base_token_price_in_usd: BigInt::from(250_000_000_000i64),
        network_base_token_price_decimals: 8,
    }
}

/// Batch of `n` reserves, indexed from 0
pub fn batch(n: u8) -> ReserveBatch {
    ReserveBatch {
        reserves: (0..n).map(reserve).collect(),
        base_currency: base_currency(),
    }
}
