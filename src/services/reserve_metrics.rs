//! Reserve metric computation
//!
//! Pure conversions from raw on-chain fixed-point integers to human-scaled
//! values. Arithmetic stays in arbitrary-precision integers; a value becomes
//! a decimal string only in `format_fixed`, which rounds half up.

use alloy::primitives::Address;
use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{ToPrimitive, Zero};
use rust_decimal::Decimal;

use crate::models::reserve::{BlockEvent, RawReserve};
use crate::models::snapshot::ReserveSnapshot;

/// Interest rates are ray (1e27) fixed point
pub const RAY_DECIMALS: u32 = 27;

/// Oracle prices are USD with 8 decimals
pub const USD_PRICE_DECIMALS: u32 = 8;

/// Protocol convention: caps are multiplied by 10^6 before token scaling
pub const CAP_EXPONENT: u32 = 6;

/// Basis points to percent
const BASIS_POINT_DECIMALS: u32 = 2;

/// Places used for percentages and USD values
const DISPLAY_PLACES: u32 = 2;

/// Token amounts with more decimals than this are shown with 4 places
const MAX_NATIVE_PLACES: u32 = 6;
const LONG_TOKEN_PLACES: u32 = 4;

/// Scale factors used by `compute_reserve_metrics`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScaleFactors {
    pub ray_decimals: u32,
    pub usd_decimals: u32,
    pub cap_exponent: u32,
}

impl Default for ScaleFactors {
    fn default() -> Self {
        Self {
            ray_decimals: RAY_DECIMALS,
            usd_decimals: USD_PRICE_DECIMALS,
            cap_exponent: CAP_EXPONENT,
        }
    }
}

/// Derived metrics for one reserve.
///
/// Display fields are already rendered; the raw fields are what gets
/// persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct ReserveMetrics {
    pub asset: Address,
    pub name: String,
    pub symbol: String,
    pub decimals: u32,

    pub price_usd: String,
    pub available_liquidity: String,
    pub available_liquidity_usd: String,
    pub total_variable_debt: String,
    pub total_variable_debt_usd: String,
    /// Percent, two decimal places
    pub utilization: Decimal,
    pub supply_apy: String,
    pub borrow_apy: String,
    pub reserve_factor_pct: String,
    pub ltv_pct: String,
    pub liquidation_threshold_pct: String,
    pub liquidation_bonus_pct: String,
    pub borrowing_enabled: bool,
    pub usage_as_collateral_enabled: bool,
    pub is_active: bool,
    pub is_frozen: bool,
    pub is_paused: bool,
    pub supply_cap: String,
    pub supply_cap_usd: String,
    pub borrow_cap: String,
    pub borrow_cap_usd: String,

    pub price: BigUint,
    pub total_borrows: BigUint,
    pub collateral_factor: BigUint,
    pub reserve_factor: BigUint,
    pub raw_supply_cap: BigUint,
    pub raw_borrow_cap: BigUint,
    pub liquidation_incentive: BigUint,
}

impl ReserveMetrics {
    /// Row for `market_parameters` at the triggering block
    pub fn to_snapshot(&self, event: &BlockEvent) -> ReserveSnapshot {
        ReserveSnapshot {
            m_token_address: self.asset,
            block_number: event.block_number,
            price: self.price.clone(),
            total_borrows: self.total_borrows.clone(),
            utilization: self.utilization.to_f64().unwrap_or_default(),
            collateral_factor: self.collateral_factor.clone(),
            reserves: BigUint::zero(),
            reserve_factor: self.reserve_factor.clone(),
            supply_cap: self.raw_supply_cap.clone(),
            borrow_cap: self.raw_borrow_cap.clone(),
            liquidation_incentive: self.liquidation_incentive.clone(),
            borrow_enabled: self.borrowing_enabled,
            block_timestamp: event.block_timestamp,
        }
    }
}

/// Render `value / 10^scale` with exactly `places` fractional digits
pub fn format_fixed(value: &BigUint, scale: u32, places: u32) -> String {
    let digits = if places >= scale {
        value * pow10(places - scale)
    } else if u64::from(scale - places) > value.bits() {
        // value * 2 < 10^(scale - places): rounds to zero
        BigUint::zero()
    } else {
        let divisor = pow10(scale - places);
        let quotient = value / &divisor;
        let remainder = value % &divisor;
        if remainder * 2u32 >= divisor {
            quotient + 1u32
        } else {
            quotient
        }
    };

    insert_decimal_point(digits.to_str_radix(10), places as usize)
}

/// Signed variant of `format_fixed`
pub fn format_signed_fixed(value: &BigInt, scale: u32, places: u32) -> String {
    let formatted = format_fixed(value.magnitude(), scale, places);
    let is_zero = formatted.chars().all(|c| c == '0' || c == '.');
    if value.sign() == Sign::Minus && !is_zero {
        format!("-{}", formatted)
    } else {
        formatted
    }
}

fn pow10(exp: u32) -> BigUint {
    BigUint::from(10u32).pow(exp)
}

fn insert_decimal_point(digits: String, places: usize) -> String {
    if places == 0 {
        return digits;
    }
    let padded = if digits.len() <= places {
        format!("{}{}", "0".repeat(places + 1 - digits.len()), digits)
    } else {
        digits
    };
    let split = padded.len() - places;
    format!("{}.{}", &padded[..split], &padded[split..])
}

/// Basis points to percent (1000 -> "10.00")
pub fn format_basis_points(basis_points: &BigUint) -> String {
    format_fixed(basis_points, BASIS_POINT_DECIMALS, DISPLAY_PLACES)
}

/// Ray rate to percent (5e25 with 27 decimals -> "5.00")
pub fn ray_to_percent(ray: &BigUint, ray_decimals: u32) -> String {
    format_fixed(
        ray,
        ray_decimals.saturating_sub(BASIS_POINT_DECIMALS),
        DISPLAY_PLACES,
    )
}

/// Oracle price to dollars
pub fn price_to_usd(price: &BigUint, usd_decimals: u32) -> String {
    format_fixed(price, usd_decimals, DISPLAY_PLACES)
}

/// Places shown for a native token amount
pub fn token_display_places(decimals: u32) -> u32 {
    if decimals > MAX_NATIVE_PLACES {
        LONG_TOKEN_PLACES
    } else {
        decimals
    }
}

/// Raw token units to whole tokens
pub fn token_amount(amount: &BigUint, decimals: u32) -> String {
    format_fixed(amount, decimals, token_display_places(decimals))
}

/// Raw token units valued in dollars
pub fn amount_in_usd(amount: &BigUint, price: &BigUint, decimals: u32, usd_decimals: u32) -> String {
    match decimals.checked_add(usd_decimals) {
        Some(scale) => format_fixed(&(amount * price), scale, DISPLAY_PLACES),
        // beyond any representable scale the dollar value is zero
        None => format_fixed(&BigUint::zero(), 0, DISPLAY_PLACES),
    }
}

/// Cap valued in dollars; the cap is scaled by `10^cap_exponent` first
pub fn cap_in_usd(
    cap: &BigUint,
    price: &BigUint,
    decimals: u32,
    usd_decimals: u32,
    cap_exponent: u32,
) -> String {
    amount_in_usd(&(cap * pow10(cap_exponent)), price, decimals, usd_decimals)
}

/// Borrowed share of total supplied liquidity, in percent
///
/// Floors to whole basis points before the final division, so the result
/// always has at most two decimal places and lies in [0, 100].
pub fn utilization(available_liquidity: &BigUint, total_debt: &BigUint) -> Decimal {
    let total_supply = available_liquidity + total_debt;
    if total_supply.is_zero() {
        return Decimal::ZERO;
    }
    let basis_points = total_debt * 10_000u32 / total_supply;
    Decimal::new(basis_points.to_i64().unwrap_or(10_000), 2)
}

/// Compute every derived metric for one reserve
pub fn compute_reserve_metrics(reserve: &RawReserve, scales: &ScaleFactors) -> ReserveMetrics {
    let price = &reserve.price_in_market_reference_currency;
    let decimals = reserve.decimals;
    let usd = scales.usd_decimals;

    ReserveMetrics {
        asset: reserve.underlying_asset,
        name: reserve.name.clone(),
        symbol: reserve.symbol.clone(),
        decimals,

        price_usd: price_to_usd(price, usd),
        available_liquidity: token_amount(&reserve.available_liquidity, decimals),
        available_liquidity_usd: amount_in_usd(&reserve.available_liquidity, price, decimals, usd),
        total_variable_debt: token_amount(&reserve.total_scaled_variable_debt, decimals),
        total_variable_debt_usd: amount_in_usd(
            &reserve.total_scaled_variable_debt,
            price,
            decimals,
            usd,
        ),
        utilization: utilization(
            &reserve.available_liquidity,
            &reserve.total_scaled_variable_debt,
        ),
        supply_apy: ray_to_percent(&reserve.liquidity_rate, scales.ray_decimals),
        borrow_apy: ray_to_percent(&reserve.variable_borrow_rate, scales.ray_decimals),
        reserve_factor_pct: format_basis_points(&reserve.reserve_factor),
        ltv_pct: format_basis_points(&reserve.base_ltv_as_collateral),
        liquidation_threshold_pct: format_basis_points(&reserve.reserve_liquidation_threshold),
        liquidation_bonus_pct: format_basis_points(&reserve.reserve_liquidation_bonus),
        borrowing_enabled: reserve.borrowing_enabled,
        usage_as_collateral_enabled: reserve.usage_as_collateral_enabled,
        is_active: reserve.is_active,
        is_frozen: reserve.is_frozen,
        is_paused: reserve.is_paused,
        supply_cap: token_amount(&reserve.supply_cap, decimals),
        supply_cap_usd: cap_in_usd(&reserve.supply_cap, price, decimals, usd, scales.cap_exponent),
        borrow_cap: token_amount(&reserve.borrow_cap, decimals),
        borrow_cap_usd: cap_in_usd(&reserve.borrow_cap, price, decimals, usd, scales.cap_exponent),

        price: price.clone(),
        total_borrows: reserve.total_scaled_variable_debt.clone(),
        collateral_factor: reserve.base_ltv_as_collateral.clone(),
        reserve_factor: reserve.reserve_factor.clone(),
        raw_supply_cap: reserve.supply_cap.clone(),
        raw_borrow_cap: reserve.borrow_cap.clone(),
        liquidation_incentive: reserve.reserve_liquidation_bonus.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    fn big(v: u128) -> BigUint {
        BigUint::from(v)
    }

    fn reserve(available: u128, debt: u128) -> RawReserve {
        RawReserve {
            underlying_asset: Address::from_str("0x4200000000000000000000000000000000000006")
                .unwrap(),
            name: "Wrapped Ether".to_string(),
            symbol: "WETH".to_string(),
            decimals: 18,
            price_in_market_reference_currency: big(250_000_000_000),
            available_liquidity: big(available),
            total_scaled_variable_debt: big(debt),
            liquidity_rate: big(21_000_000_000_000_000_000_000_000),
            variable_borrow_rate: big(35_500_000_000_000_000_000_000_000),
            reserve_factor: big(1500),
            base_ltv_as_collateral: big(8000),
            reserve_liquidation_threshold: big(8300),
            reserve_liquidation_bonus: big(10500),
            borrowing_enabled: true,
            usage_as_collateral_enabled: true,
            is_active: true,
            is_frozen: false,
            is_paused: false,
            supply_cap: big(150_000),
            borrow_cap: big(140_000),
        }
    }

    #[test]
    fn test_huge_scales_round_to_zero_without_overflow() {
        assert_eq!(amount_in_usd(&big(1), &big(1), u32::MAX, USD_PRICE_DECIMALS), "0.00");
        assert_eq!(cap_in_usd(&big(1), &big(1), u32::MAX, USD_PRICE_DECIMALS, CAP_EXPONENT), "0.00");
        assert_eq!(token_amount(&big(u128::MAX), 4_000_000_000), "0.0000");
        assert_eq!(format_fixed(&big(u128::MAX), u32::MAX, 2), "0.00");
    }

    #[test]
    fn test_zero_shortcut_keeps_half_up_rounding() {
        // 5 / 10 rounds up, 4 / 10 rounds down
        assert_eq!(format_fixed(&big(5), 3, 2), "0.01");
        assert_eq!(format_fixed(&big(4), 3, 2), "0.00");
        assert_eq!(format_fixed(&big(1), 4, 2), "0.00");
    }

    #[test]
    fn test_format_basis_points() {
        assert_eq!(format_basis_points(&big(1000)), "10.00");
        assert_eq!(format_basis_points(&big(10500)), "105.00");
        assert_eq!(format_basis_points(&big(5)), "0.05");
        assert_eq!(format_basis_points(&big(0)), "0.00");
    }

    #[test]
    fn test_ray_to_percent() {
        let five_percent = big(5) * pow10(25);
        assert_eq!(ray_to_percent(&five_percent, RAY_DECIMALS), "5.00");
        assert_eq!(
            ray_to_percent(&big(35_500_000_000_000_000_000_000_000), RAY_DECIMALS),
            "3.55"
        );
    }

    #[test]
    fn test_price_to_usd() {
        assert_eq!(price_to_usd(&big(100_000_000), USD_PRICE_DECIMALS), "1.00");
        assert_eq!(price_to_usd(&big(250_012_345_678), USD_PRICE_DECIMALS), "2500.12");
        assert_eq!(price_to_usd(&big(99_999_999), USD_PRICE_DECIMALS), "1.00");
    }

    #[test]
    fn test_token_amount_places() {
        // 6 decimals keeps all six places
        assert_eq!(token_amount(&big(1_234_567), 6), "1.234567");
        // 18 decimals is shown with four
        assert_eq!(token_amount(&big(1_500_000_000_000_000_000), 18), "1.5000");
        // zero decimals has no fractional part
        assert_eq!(token_amount(&big(42), 0), "42");
        assert_eq!(token_amount(&big(1), 8), "0.0000");
    }

    #[test]
    fn test_format_fixed_rounds_half_up() {
        assert_eq!(format_fixed(&big(12_345), 3, 2), "12.35");
        assert_eq!(format_fixed(&big(12_344), 3, 2), "12.34");
        assert_eq!(format_fixed(&big(5), 3, 2), "0.01");
        assert_eq!(format_fixed(&big(4), 3, 2), "0.00");
    }

    #[test]
    fn test_format_fixed_does_not_lose_precision_on_large_values() {
        // 10^30 wei-scale units, far beyond f64's exact range
        let huge = pow10(30) + big(1);
        assert_eq!(format_fixed(&huge, 0, 2), "1000000000000000000000000000001.00");
    }

    #[test]
    fn test_format_signed_fixed() {
        assert_eq!(format_signed_fixed(&BigInt::from(-150_000_000i64), 8, 2), "-1.50");
        assert_eq!(format_signed_fixed(&BigInt::from(-1i64), 8, 2), "0.00");
        assert_eq!(format_signed_fixed(&BigInt::from(99_990_000i64), 8, 2), "1.00");
    }

    #[test]
    fn test_amount_in_usd() {
        // 2 WETH at $2500
        let two_eth = big(2) * pow10(18);
        assert_eq!(
            amount_in_usd(&two_eth, &big(250_000_000_000), 18, USD_PRICE_DECIMALS),
            "5000.00"
        );
    }

    #[test]
    fn test_cap_in_usd() {
        let one_dollar = big(100_000_000);
        assert_eq!(
            cap_in_usd(&big(100), &one_dollar, 6, USD_PRICE_DECIMALS, CAP_EXPONENT),
            "100.00"
        );
        // with no token decimals the result is cap * 10^6 * price
        assert_eq!(
            cap_in_usd(&big(100), &one_dollar, 0, USD_PRICE_DECIMALS, CAP_EXPONENT),
            "100000000.00"
        );
    }

    #[test]
    fn test_utilization_half() {
        assert_eq!(utilization(&big(500), &big(500)), dec!(50.00));
    }

    #[test]
    fn test_utilization_empty_reserve_is_zero() {
        assert_eq!(utilization(&big(0), &big(0)), Decimal::ZERO);
    }

    #[test]
    fn test_utilization_fully_borrowed() {
        assert_eq!(utilization(&big(0), &big(1_000)), dec!(100));
    }

    #[test]
    fn test_utilization_floors_to_basis_points() {
        // 1/3 = 33.333...% -> 3333 bps -> 33.33
        assert_eq!(utilization(&big(2), &big(1)), dec!(33.33));
    }

    #[test]
    fn test_utilization_stays_in_range() {
        let cases = [
            (0u128, 1u128),
            (1, 0),
            (7, 3),
            (1, 999_999_999_999),
            (u128::MAX, u128::MAX),
            (123_456_789, 987_654_321),
        ];
        for (available, debt) in cases {
            let u = utilization(&big(available), &big(debt));
            assert!(u >= Decimal::ZERO && u <= dec!(100), "{} / {} -> {}", available, debt, u);
            assert!(u.scale() <= 2);
        }
    }

    #[test]
    fn test_compute_reserve_metrics() {
        let one_eth = pow10(18);
        let mut r = reserve(0, 0);
        r.available_liquidity = &one_eth * 3u32;
        r.total_scaled_variable_debt = one_eth.clone();

        let m = compute_reserve_metrics(&r, &ScaleFactors::default());

        assert_eq!(m.symbol, "WETH");
        assert_eq!(m.price_usd, "2500.00");
        assert_eq!(m.available_liquidity, "3.0000");
        assert_eq!(m.available_liquidity_usd, "7500.00");
        assert_eq!(m.total_variable_debt, "1.0000");
        assert_eq!(m.total_variable_debt_usd, "2500.00");
        assert_eq!(m.utilization, dec!(25.00));
        assert_eq!(m.supply_apy, "2.10");
        assert_eq!(m.borrow_apy, "3.55");
        assert_eq!(m.reserve_factor_pct, "15.00");
        assert_eq!(m.ltv_pct, "80.00");
        assert_eq!(m.liquidation_threshold_pct, "83.00");
        assert_eq!(m.liquidation_bonus_pct, "105.00");
        assert_eq!(m.supply_cap, "0.0000");
        assert!(m.borrowing_enabled);
    }

    #[test]
    fn test_to_snapshot_maps_fields() {
        let r = reserve(500, 500);
        let m = compute_reserve_metrics(&r, &ScaleFactors::default());
        let event = BlockEvent {
            block_number: 28_539_010,
            block_timestamp: 1_743_000_000,
        };

        let s = m.to_snapshot(&event);

        assert_eq!(s.m_token_address, r.underlying_asset);
        assert_eq!(s.block_number, 28_539_010);
        assert_eq!(s.block_timestamp, 1_743_000_000);
        assert_eq!(s.price, big(250_000_000_000));
        assert_eq!(s.total_borrows, big(500));
        assert_eq!(s.utilization, 50.0);
        assert_eq!(s.collateral_factor, big(8000));
        assert_eq!(s.reserves, BigUint::zero());
        assert_eq!(s.reserve_factor, big(1500));
        assert_eq!(s.supply_cap, big(150_000));
        assert_eq!(s.borrow_cap, big(140_000));
        assert_eq!(s.liquidation_incentive, big(10500));
        assert!(s.borrow_enabled);
    }
}
