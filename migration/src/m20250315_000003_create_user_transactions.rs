use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(UserTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(UserTransactions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(UserTransactions::UserAddress)
                            .string_len(42)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserTransactions::MTokenAddress)
                            .string_len(42)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserTransactions::TransactionType)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserTransactions::Amount)
                            .decimal_len(78, 0)
                            .not_null(),
                    )
                    .col(ColumnDef::new(UserTransactions::TokenAmount).decimal_len(78, 0))
                    .col(ColumnDef::new(UserTransactions::RelatedAddress).string_len(42))
                    .col(
                        ColumnDef::new(UserTransactions::BlockNumber)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserTransactions::BlockTimestamp)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserTransactions::TransactionHash)
                            .string_len(66)
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, column) in [
            ("idx_user_transactions_user_address", UserTransactions::UserAddress),
            ("idx_user_transactions_m_token_address", UserTransactions::MTokenAddress),
            ("idx_user_transactions_transaction_type", UserTransactions::TransactionType),
            ("idx_user_transactions_block_number", UserTransactions::BlockNumber),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(UserTransactions::Table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserTransactions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum UserTransactions {
    Table,
    Id,
    UserAddress,
    MTokenAddress,
    /// BORROW, REPAY, SUPPLY, WITHDRAW, LIQUIDATE, LIQUIDATED
    TransactionType,
    Amount,
    TokenAmount,
    RelatedAddress,
    BlockNumber,
    BlockTimestamp,
    TransactionHash,
}
