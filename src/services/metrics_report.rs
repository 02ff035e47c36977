//! Text rendering of computed reserve metrics for the log stream

use crate::models::reserve::BaseCurrencyInfo;
use crate::services::reserve_metrics::{ReserveMetrics, USD_PRICE_DECIMALS, format_signed_fixed};

pub fn render_block_header(block_number: u64) -> String {
    format!("========== AAVE V3 METRICS (Block {}) ==========", block_number)
}

pub fn render_block_footer(block_number: u64) -> String {
    format!("========== END OF METRICS (Block {}) ==========", block_number)
}

pub fn render_base_currency(info: &BaseCurrencyInfo) -> String {
    let reference_price = format_signed_fixed(
        &info.market_reference_currency_price_in_usd,
        USD_PRICE_DECIMALS,
        2,
    );
    let network_price = format_signed_fixed(
        &info.network_base_token_price_in_usd,
        u32::from(info.network_base_token_price_decimals),
        2,
    );

    format!(
        "--- Base Currency Info ---\n\
         Market Reference Currency Price: ${} USD\n\
         Network Base Token Price: ${} USD",
        reference_price, network_price
    )
}

/// One block of lines per reserve
pub fn render_reserve_report(m: &ReserveMetrics) -> String {
    let sym = &m.symbol;

    let mut lines = vec![
        format!("--- {} METRICS ---", sym),
        format!("Address: {}", m.asset),
        format!("Price: ${}", m.price_usd),
        format!(
            "Available Liquidity: {} {} (${})",
            m.available_liquidity, sym, m.available_liquidity_usd
        ),
        format!(
            "Total Variable Debt: {} {} (${})",
            m.total_variable_debt, sym, m.total_variable_debt_usd
        ),
        format!("Utilization: {:.2}%", m.utilization),
        format!("Supply APY: {}%", m.supply_apy),
        format!("Borrow APY: {}%", m.borrow_apy),
        format!("Reserve Factor: {}%", m.reserve_factor_pct),
        format!("LTV: {}%", m.ltv_pct),
        format!("Liquidation Threshold: {}%", m.liquidation_threshold_pct),
        format!("Liquidation Bonus: {}%", m.liquidation_bonus_pct),
        format!("Borrowing Enabled: {}", m.borrowing_enabled),
    ];

    if !m.is_active || m.is_frozen || m.is_paused {
        lines.push(format!(
            "Status: active={} frozen={} paused={}",
            m.is_active, m.is_frozen, m.is_paused
        ));
    }

    lines.push(format!(
        "Supply Cap: {} {} (${})",
        m.supply_cap, sym, m.supply_cap_usd
    ));
    lines.push(format!(
        "Borrow Cap: {} {} (${})",
        m.borrow_cap, sym, m.borrow_cap_usd
    ));

    lines.join("\n")
}
