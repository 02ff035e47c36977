//! SeaORM Entity for per-block reserve snapshots

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "market_parameters")]
pub struct Model {
    /// Underlying asset address, lowercase 0x format
    #[sea_orm(primary_key, auto_increment = false)]
    pub m_token_address: String,
    #[sea_orm(primary_key, auto_increment = false)]
    pub block_number: i64,
    /// Oracle price, 8-decimal USD fixed point
    #[sea_orm(column_type = "Decimal(Some((78, 0)))", nullable)]
    pub price: Option<BigDecimal>,
    #[sea_orm(column_type = "Decimal(Some((78, 0)))", nullable)]
    pub total_borrows: Option<BigDecimal>,
    /// Percent, 0-100
    #[sea_orm(column_type = "Double", nullable)]
    pub utilization: Option<f64>,
    /// LTV in basis points
    #[sea_orm(column_type = "Decimal(Some((78, 0)))", nullable)]
    pub collateral_factor: Option<BigDecimal>,
    #[sea_orm(column_type = "Decimal(Some((78, 0)))", nullable)]
    pub reserves: Option<BigDecimal>,
    #[sea_orm(column_type = "Decimal(Some((78, 0)))", nullable)]
    pub reserve_factor: Option<BigDecimal>,
    #[sea_orm(column_type = "Decimal(Some((78, 0)))", nullable)]
    pub supply_cap: Option<BigDecimal>,
    #[sea_orm(column_type = "Decimal(Some((78, 0)))", nullable)]
    pub borrow_cap: Option<BigDecimal>,
    /// Liquidation bonus in basis points
    #[sea_orm(column_type = "Decimal(Some((78, 0)))", nullable)]
    pub liquidation_incentive: Option<BigDecimal>,
    pub borrow_enabled: bool,
    pub block_timestamp: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
