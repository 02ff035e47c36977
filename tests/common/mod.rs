#![allow(dead_code)]

use alloy::primitives::Address;
use async_trait::async_trait;
use num_bigint::{BigInt, BigUint};
use sea_orm::{Database, DatabaseConnection, DbErr};
use std::collections::VecDeque;
use std::env;
use std::sync::Mutex;
use std::time::Duration;

use reserve_snapshot_indexer::models::reserve::{BaseCurrencyInfo, RawReserve, ReserveBatch};
use reserve_snapshot_indexer::models::snapshot::ReserveSnapshot;
use reserve_snapshot_indexer::services::reserve_fetcher::{ReserveDataSource, ReserveFetchError};
use reserve_snapshot_indexer::services::retry::Sleeper;
use reserve_snapshot_indexer::services::snapshot_store::{PersistenceError, SnapshotStore};

/// Set up test database connection
/// Uses TEST_DATABASE_URL environment variable or falls back to default
pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let database_url = env::var("TEST_DATABASE_URL").unwrap_or_else(|_| {
        "postgresql://postgres@localhost:5432/reserve_snapshot_test".to_string()
    });

    Database::connect(&database_url).await
}

/// Records requested delays without waiting
#[derive(Default)]
pub struct RecordingSleeper {
    pub delays: Mutex<Vec<Duration>>,
}

#[async_trait]
impl Sleeper for RecordingSleeper {
    async fn sleep(&self, duration: Duration) {
        self.delays.lock().unwrap().push(duration);
    }
}

/// Replays scripted responses, one per call; the last one repeats
pub struct ScriptedSource {
    responses: Mutex<VecDeque<Result<ReserveBatch, ReserveFetchError>>>,
    pub calls: Mutex<Vec<u64>>,
}

impl ScriptedSource {
    pub fn new(responses: Vec<Result<ReserveBatch, ReserveFetchError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl ReserveDataSource for ScriptedSource {
    async fn get_reserves_data(&self, block_number: u64) -> Result<ReserveBatch, ReserveFetchError> {
        self.calls.lock().unwrap().push(block_number);
        let mut responses = self.responses.lock().unwrap();
        if responses.len() > 1 {
            responses.pop_front().unwrap()
        } else {
            responses.front().cloned().unwrap()
        }
    }
}

/// In-memory store keyed by (asset, block)
#[derive(Default)]
pub struct MemoryStore {
    pub rows: Mutex<Vec<ReserveSnapshot>>,
    pub reject: Vec<Address>,
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn insert(&self, snapshot: &ReserveSnapshot) -> Result<(), PersistenceError> {
        if self.reject.contains(&snapshot.m_token_address) {
            return Err(PersistenceError::Database("value out of range".to_string()));
        }
        let mut rows = self.rows.lock().unwrap();
        if rows
            .iter()
            .any(|r| r.m_token_address == snapshot.m_token_address && r.block_number == snapshot.block_number)
        {
            return Err(PersistenceError::DuplicateKey {
                address: snapshot.address_key(),
                block_number: snapshot.block_number,
            });
        }
        rows.push(snapshot.clone());
        Ok(())
    }
}

pub fn asset(index: u8) -> Address {
    let mut bytes = [0u8; 20];
    bytes[0] = 0xaa;
    bytes[19] = index;
    Address::from(bytes)
}

/// A USDC-like reserve: 6 decimals, $1.00
pub fn stable_reserve(index: u8) -> RawReserve {
    RawReserve {
        underlying_asset: asset(index),
        name: format!("Stable {}", index),
        symbol: format!("USD{}", index),
        decimals: 6,
        price_in_market_reference_currency: BigUint::from(100_000_000u64),
        available_liquidity: BigUint::from(75_000_000u64),
        total_scaled_variable_debt: BigUint::from(25_000_000u64),
        liquidity_rate: BigUint::from(10u32).pow(25) * 3u32,
        variable_borrow_rate: BigUint::from(10u32).pow(25) * 5u32,
        reserve_factor: BigUint::from(1000u32),
        base_ltv_as_collateral: BigUint::from(7500u32),
        reserve_liquidation_threshold: BigUint::from(7800u32),
        reserve_liquidation_bonus: BigUint::from(10500u32),
        borrowing_enabled: true,
        usage_as_collateral_enabled: true,
        is_active: true,
        is_frozen: false,
        is_paused: false,
        supply_cap: BigUint::from(100u32),
        borrow_cap: BigUint::from(90u32),
    }
}

pub fn batch_of(reserves: Vec<RawReserve>) -> ReserveBatch {
    ReserveBatch {
        reserves,
        base_currency: BaseCurrencyInfo {
            market_reference_currency_unit: BigUint::from(100_000_000u64),
            market_reference_currency_price_in_usd: BigInt::from(100_000_000i64),
            network_base_token_price_in_usd: BigInt::from(250_000_000_000i64),
            network_base_token_price_decimals: 8,
        },
    }
}
