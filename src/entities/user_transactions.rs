//! SeaORM Entity for user transaction history
//!
//! Part of the schema; the snapshot pipeline does not write it.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "user_transactions")]
pub struct Model {
    /// tx hash + log index
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub user_address: String,
    pub m_token_address: String,
    /// BORROW, REPAY, SUPPLY, WITHDRAW, LIQUIDATE, LIQUIDATED
    pub transaction_type: String,
    #[sea_orm(column_type = "Decimal(Some((78, 0)))")]
    pub amount: BigDecimal,
    #[sea_orm(column_type = "Decimal(Some((78, 0)))", nullable)]
    pub token_amount: Option<BigDecimal>,
    pub related_address: Option<String>,
    pub block_number: i64,
    pub block_timestamp: i64,
    pub transaction_hash: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
