use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserPositions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserPositions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(UserPositions::UserAddress)
                            .string_len(42)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserPositions::MTokenAddress)
                            .string_len(42)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserPositions::BorrowBalance)
                            .decimal_len(78, 0)
                            .default("0"),
                    )
                    .col(
                        ColumnDef::new(UserPositions::SupplyBalance)
                            .decimal_len(78, 0)
                            .default("0"),
                    )
                    .col(
                        ColumnDef::new(UserPositions::LastUpdatedBlock)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserPositions::LastUpdatedTimestamp)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_positions_user_address")
                    .table(UserPositions::Table)
                    .col(UserPositions::UserAddress)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_positions_m_token_address")
                    .table(UserPositions::Table)
                    .col(UserPositions::MTokenAddress)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserPositions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum UserPositions {
    Table,
    Id,
    UserAddress,
    MTokenAddress,
    BorrowBalance,
    SupplyBalance,
    LastUpdatedBlock,
    LastUpdatedTimestamp,
}
