//! SeaORM Entity for per-user market positions
//!
//! Part of the schema; the snapshot pipeline does not write it.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "user_positions")]
pub struct Model {
    /// user address + market address
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_address: String,
    pub m_token_address: String,
    #[sea_orm(column_type = "Decimal(Some((78, 0)))", nullable)]
    pub borrow_balance: Option<BigDecimal>,
    #[sea_orm(column_type = "Decimal(Some((78, 0)))", nullable)]
    pub supply_balance: Option<BigDecimal>,
    pub last_updated_block: i64,
    pub last_updated_timestamp: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
