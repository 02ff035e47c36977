use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // One row per (reserve, block); written once, never updated
        manager
            .create_table(
                Table::create()
                    .table(MarketParameters::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MarketParameters::MTokenAddress)
                            .string_len(42)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MarketParameters::BlockNumber)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(MarketParameters::Price).decimal_len(78, 0))
                    .col(ColumnDef::new(MarketParameters::TotalBorrows).decimal_len(78, 0))
                    .col(ColumnDef::new(MarketParameters::Utilization).double())
                    .col(ColumnDef::new(MarketParameters::CollateralFactor).decimal_len(78, 0))
                    .col(ColumnDef::new(MarketParameters::Reserves).decimal_len(78, 0))
                    .col(ColumnDef::new(MarketParameters::ReserveFactor).decimal_len(78, 0))
                    .col(ColumnDef::new(MarketParameters::SupplyCap).decimal_len(78, 0))
                    .col(ColumnDef::new(MarketParameters::BorrowCap).decimal_len(78, 0))
                    .col(
                        ColumnDef::new(MarketParameters::LiquidationIncentive)
                            .decimal_len(78, 0),
                    )
                    .col(
                        ColumnDef::new(MarketParameters::BorrowEnabled)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(MarketParameters::BlockTimestamp).big_integer())
                    .primary_key(
                        Index::create()
                            .col(MarketParameters::MTokenAddress)
                            .col(MarketParameters::BlockNumber),
                    )
                    .to_owned(),
            )
            .await?;

        // Cross-reserve queries for a single block
        manager
            .create_index(
                Index::create()
                    .name("idx_market_parameters_block_number")
                    .table(MarketParameters::Table)
                    .col(MarketParameters::BlockNumber)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MarketParameters::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum MarketParameters {
    Table,
    MTokenAddress,
    BlockNumber,
    Price,
    TotalBorrows,
    Utilization,
    CollateralFactor,
    Reserves,
    ReserveFactor,
    SupplyCap,
    BorrowCap,
    LiquidationIncentive,
    BorrowEnabled,
    BlockTimestamp,
}
