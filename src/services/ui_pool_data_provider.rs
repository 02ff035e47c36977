//! Aave V3 UiPoolDataProvider client
//!
//! Reads every reserve of a pool in one `getReservesData` call, pinned to the
//! block being snapshotted.

use alloy::{
    eips::BlockId,
    primitives::{Address, I256, U256},
    providers::{Provider, ProviderBuilder, RootProvider},
    sol,
    transports::http::{Client, Http},
};
use async_trait::async_trait;
use num_bigint::{BigInt, BigUint, Sign};
use std::str::FromStr;
use tracing::{debug, error, info, warn};

use crate::models::reserve::{BaseCurrencyInfo, RawReserve, ReserveBatch};
use crate::services::block_trigger::ChainHead;
use crate::services::reserve_fetcher::{ReserveDataSource, ReserveFetchError};

/// UiPoolDataProviderV3 on Base
pub const DEFAULT_UI_POOL_DATA_PROVIDER_ADDRESS: &str =
    "0x68100bD5345eA474D93577127C11F39FF8463e93";

/// PoolAddressesProvider on Base
pub const DEFAULT_POOL_ADDRESSES_PROVIDER: &str = "0xe20fCBdBfFC4Dd138cE8b2E6FBb6CB49777ad64D";

/// Base mainnet
pub const DEFAULT_CHAIN_ID: u64 = 8453;

// Aave V3.3 periphery interface (only the call we need)
sol! {
    #[sol(rpc)]
    interface IUiPoolDataProviderV3 {
        struct AggregatedReserveData {
            address underlyingAsset;
            string name;
            string symbol;
            uint256 decimals;
            uint256 baseLTVasCollateral;
            uint256 reserveLiquidationThreshold;
            uint256 reserveLiquidationBonus;
            uint256 reserveFactor;
            bool usageAsCollateralEnabled;
            bool borrowingEnabled;
            bool isActive;
            bool isFrozen;
            uint128 liquidityIndex;
            uint128 variableBorrowIndex;
            uint128 liquidityRate;
            uint128 variableBorrowRate;
            uint40 lastUpdateTimestamp;
            address aTokenAddress;
            address variableDebtTokenAddress;
            address interestRateStrategyAddress;
            uint256 availableLiquidity;
            uint256 totalScaledVariableDebt;
            uint256 priceInMarketReferenceCurrency;
            address priceOracle;
            uint256 variableRateSlope1;
            uint256 variableRateSlope2;
            uint256 baseVariableBorrowRate;
            uint256 optimalUsageRatio;
            bool isPaused;
            bool isSiloedBorrowing;
            uint128 accruedToTreasury;
            uint128 unbacked;
            uint128 isolationModeTotalDebt;
            bool flashLoanEnabled;
            uint256 debtCeiling;
            uint256 debtCeilingDecimals;
            uint256 borrowCap;
            uint256 supplyCap;
            bool borrowableInIsolation;
            bool virtualAccActive;
            uint128 virtualUnderlyingBalance;
        }

        struct BaseCurrencyInfo {
            uint256 marketReferenceCurrencyUnit;
            int256 marketReferenceCurrencyPriceInUsd;
            int256 networkBaseTokenPriceInUsd;
            uint8 networkBaseTokenPriceDecimals;
        }

        function getReservesData(address provider)
            external
            view
            returns (AggregatedReserveData[] memory, BaseCurrencyInfo memory);
    }
}

/// Error building the provider client
#[derive(Debug, thiserror::Error)]
pub enum ProviderSetupError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("provider error: {0}")]
    Provider(String),
}

/// `ReserveDataSource` backed by a JSON-RPC node
pub struct UiPoolDataProvider {
    provider: RootProvider<Http<Client>>,
    data_provider_address: Address,
    pool_addresses_provider: Address,
}

impl UiPoolDataProvider {
    /// Create a new client and verify the node is reachable
    ///
    /// # Arguments
    ///
    /// * `rpc_url` - JSON-RPC endpoint
    /// * `data_provider_address` - UiPoolDataProviderV3 contract
    /// * `pool_addresses_provider` - argument passed to `getReservesData`
    /// * `expected_chain_id` - a mismatch is logged, not rejected
    pub async fn new(
        rpc_url: &str,
        data_provider_address: &str,
        pool_addresses_provider: &str,
        expected_chain_id: u64,
    ) -> Result<Self, ProviderSetupError> {
        info!(
            rpc_url = %rpc_url,
            data_provider = %data_provider_address,
            pool_addresses_provider = %pool_addresses_provider,
            "Initializing UiPoolDataProvider"
        );

        let provider = ProviderBuilder::new().on_http(rpc_url.parse().map_err(|e| {
            ProviderSetupError::InvalidConfig(format!("Invalid RPC URL: {}", e))
        })?);

        let data_provider_address = Address::from_str(data_provider_address).map_err(|e| {
            ProviderSetupError::InvalidConfig(format!("Invalid UiPoolDataProvider address: {}", e))
        })?;

        let pool_addresses_provider = Address::from_str(pool_addresses_provider).map_err(|e| {
            ProviderSetupError::InvalidConfig(format!(
                "Invalid PoolAddressesProvider address: {}",
                e
            ))
        })?;

        let chain_id = provider.get_chain_id().await.map_err(|e| {
            error!(error = %e, "Failed to connect to RPC");
            ProviderSetupError::Provider(format!("Connection failed: {}", e))
        })?;

        if chain_id != expected_chain_id {
            warn!(
                expected = expected_chain_id,
                actual = chain_id,
                "Chain ID mismatch"
            );
        }

        info!(chain_id, "UiPoolDataProvider initialized");

        Ok(Self {
            provider,
            data_provider_address,
            pool_addresses_provider,
        })
    }

    pub fn provider(&self) -> &RootProvider<Http<Client>> {
        &self.provider
    }
}

#[async_trait]
impl ReserveDataSource for UiPoolDataProvider {
    async fn get_reserves_data(&self, block_number: u64) -> Result<ReserveBatch, ReserveFetchError> {
        let contract = IUiPoolDataProviderV3::new(self.data_provider_address, &self.provider);

        let result = contract
            .getReservesData(self.pool_addresses_provider)
            .block(BlockId::number(block_number))
            .call()
            .await
            .map_err(|e| ReserveFetchError::Rpc(format!("getReservesData failed: {}", e)))?;

        let reserves = result
            ._0
            .into_iter()
            .map(raw_reserve_from_abi)
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            block_number,
            reserve_count = reserves.len(),
            "Decoded getReservesData response"
        );

        Ok(ReserveBatch {
            reserves,
            base_currency: base_currency_from_abi(result._1),
        })
    }
}

#[async_trait]
impl ChainHead for UiPoolDataProvider {
    async fn latest_block_number(&self) -> Result<u64, ReserveFetchError> {
        self.provider
            .get_block_number()
            .await
            .map_err(|e| ReserveFetchError::Rpc(format!("eth_blockNumber failed: {}", e)))
    }

    async fn block_timestamp(&self, block_number: u64) -> Result<u64, ReserveFetchError> {
        let params = serde_json::json!([format!("0x{:x}", block_number), false]);
        let block: serde_json::Value = self
            .provider
            .client()
            .request("eth_getBlockByNumber", params)
            .await
            .map_err(|e| ReserveFetchError::Rpc(format!("eth_getBlockByNumber failed: {}", e)))?;

        block["timestamp"]
            .as_str()
            .and_then(|ts| u64::from_str_radix(ts.trim_start_matches("0x"), 16).ok())
            .ok_or_else(|| {
                ReserveFetchError::Decode(format!("block {} has no timestamp", block_number))
            })
    }
}

pub(crate) fn u256_to_biguint(value: U256) -> BigUint {
    BigUint::from_bytes_be(&value.to_be_bytes::<32>())
}

pub(crate) fn i256_to_bigint(value: I256) -> BigInt {
    let (sign, magnitude) = value.into_sign_and_abs();
    let magnitude = u256_to_biguint(magnitude);
    if sign.is_negative() {
        BigInt::from_biguint(Sign::Minus, magnitude)
    } else {
        BigInt::from_biguint(Sign::Plus, magnitude)
    }
}

fn raw_reserve_from_abi(
    data: IUiPoolDataProviderV3::AggregatedReserveData,
) -> Result<RawReserve, ReserveFetchError> {
    // ERC-20 decimals are a uint8
    let decimals = u8::try_from(data.decimals).map(u32::from).map_err(|_| {
        ReserveFetchError::Decode(format!(
            "decimals out of range for {}: {}",
            data.symbol, data.decimals
        ))
    })?;

    Ok(RawReserve {
        underlying_asset: data.underlyingAsset,
        name: data.name,
        symbol: data.symbol,
        decimals,
        price_in_market_reference_currency: u256_to_biguint(data.priceInMarketReferenceCurrency),
        available_liquidity: u256_to_biguint(data.availableLiquidity),
        total_scaled_variable_debt: u256_to_biguint(data.totalScaledVariableDebt),
        liquidity_rate: BigUint::from(data.liquidityRate),
        variable_borrow_rate: BigUint::from(data.variableBorrowRate),
        reserve_factor: u256_to_biguint(data.reserveFactor),
        base_ltv_as_collateral: u256_to_biguint(data.baseLTVasCollateral),
        reserve_liquidation_threshold: u256_to_biguint(data.reserveLiquidationThreshold),
        reserve_liquidation_bonus: u256_to_biguint(data.reserveLiquidationBonus),
        borrowing_enabled: data.borrowingEnabled,
        usage_as_collateral_enabled: data.usageAsCollateralEnabled,
        is_active: data.isActive,
        is_frozen: data.isFrozen,
        is_paused: data.isPaused,
        supply_cap: u256_to_biguint(data.supplyCap),
        borrow_cap: u256_to_biguint(data.borrowCap),
    })
}

fn base_currency_from_abi(info: IUiPoolDataProviderV3::BaseCurrencyInfo) -> BaseCurrencyInfo {
    BaseCurrencyInfo {
        market_reference_currency_unit: u256_to_biguint(info.marketReferenceCurrencyUnit),
        market_reference_currency_price_in_usd: i256_to_bigint(
            info.marketReferenceCurrencyPriceInUsd,
        ),
        network_base_token_price_in_usd: i256_to_bigint(info.networkBaseTokenPriceInUsd),
        network_base_token_price_decimals: info.networkBaseTokenPriceDecimals,
    }
}
