pub use sea_orm_migration::prelude::*;

mod m20250315_000001_create_market_parameters;
mod m20250315_000002_create_user_positions;
mod m20250315_000003_create_user_transactions;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250315_000001_create_market_parameters::Migration),
            Box::new(m20250315_000002_create_user_positions::Migration),
            Box::new(m20250315_000003_create_user_transactions::Migration),
        ]
    }
}
