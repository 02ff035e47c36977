//! Snapshot persistence
//!
//! Insert-only: a row for an (asset, block) key is written once. A second
//! write for the same key is reported as `PersistenceError::DuplicateKey`.

use async_trait::async_trait;
use num_bigint::{BigInt, BigUint};
use sea_orm::entity::prelude::BigDecimal;
use sea_orm::{DatabaseConnection, DbErr, EntityTrait, Set, SqlErr};
use tracing::debug;

use crate::entities::market_parameters;
use crate::models::snapshot::ReserveSnapshot;

#[derive(Debug, Clone, thiserror::Error)]
pub enum PersistenceError {
    #[error("snapshot already stored for {address} at block {block_number}")]
    DuplicateKey { address: String, block_number: u64 },
    #[error("database error: {0}")]
    Database(String),
}

/// Keyed, write-once snapshot storage
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn insert(&self, snapshot: &ReserveSnapshot) -> Result<(), PersistenceError>;
}

/// `SnapshotStore` over the `market_parameters` table
pub struct DbSnapshotStore {
    db: DatabaseConnection,
}

impl DbSnapshotStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn into_inner(self) -> DatabaseConnection {
        self.db
    }
}

fn to_decimal(value: &BigUint) -> BigDecimal {
    BigDecimal::new(BigInt::from(value.clone()), 0)
}

/// Build the row for a snapshot
pub fn to_active_model(snapshot: &ReserveSnapshot) -> market_parameters::ActiveModel {
    market_parameters::ActiveModel {
        m_token_address: Set(snapshot.address_key()),
        block_number: Set(snapshot.block_number as i64),
        price: Set(Some(to_decimal(&snapshot.price))),
        total_borrows: Set(Some(to_decimal(&snapshot.total_borrows))),
        utilization: Set(Some(snapshot.utilization)),
        collateral_factor: Set(Some(to_decimal(&snapshot.collateral_factor))),
        reserves: Set(Some(to_decimal(&snapshot.reserves))),
        reserve_factor: Set(Some(to_decimal(&snapshot.reserve_factor))),
        supply_cap: Set(Some(to_decimal(&snapshot.supply_cap))),
        borrow_cap: Set(Some(to_decimal(&snapshot.borrow_cap))),
        liquidation_incentive: Set(Some(to_decimal(&snapshot.liquidation_incentive))),
        borrow_enabled: Set(snapshot.borrow_enabled),
        block_timestamp: Set(Some(snapshot.block_timestamp as i64)),
    }
}

fn classify_db_error(snapshot: &ReserveSnapshot, err: DbErr) -> PersistenceError {
    classify_sql_err(snapshot, err.sql_err(), err.to_string())
}

fn classify_sql_err(
    snapshot: &ReserveSnapshot,
    sql_err: Option<SqlErr>,
    message: String,
) -> PersistenceError {
    match sql_err {
        Some(SqlErr::UniqueConstraintViolation(_)) => PersistenceError::DuplicateKey {
            address: snapshot.address_key(),
            block_number: snapshot.block_number,
        },
        _ => PersistenceError::Database(message),
    }
}

#[async_trait]
impl SnapshotStore for DbSnapshotStore {
    async fn insert(&self, snapshot: &ReserveSnapshot) -> Result<(), PersistenceError> {
        market_parameters::Entity::insert(to_active_model(snapshot))
            .exec_without_returning(&self.db)
            .await
            .map_err(|e| classify_db_error(snapshot, e))?;

        debug!(
            asset = %snapshot.address_key(),
            block_number = snapshot.block_number,
            "Snapshot row inserted"
        );

        Ok(())
    }
}
