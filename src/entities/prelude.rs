pub use super::market_parameters::Entity as MarketParameters;
pub use super::user_positions::Entity as UserPositions;
pub use super::user_transactions::Entity as UserTransactions;
