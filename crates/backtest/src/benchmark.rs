//! Buy-and-hold benchmark: all capital invested at the first close.

use quantbt_core::error::ensure_positive;
use quantbt_core::{PortfolioRow, PortfolioState, PriceSeries, Result};

/// Fractional shares bought with `initial_capital` at the first close, marked
/// to market on every bar.
///
/// # Errors
///
/// Returns `BacktestError::Config` if `initial_capital` is not positive.
pub fn buy_and_hold(prices: &PriceSeries, initial_capital: f64) -> Result<PortfolioState> {
    ensure_positive("initial_capital", initial_capital)?;
    let shares = initial_capital / prices.close(0);

    let rows = prices
        .bars()
        .iter()
        .map(|bar| PortfolioRow {
            date: bar.date,
            cash: 0.0,
            holdings: shares * bar.close,
            position: shares,
        })
        .collect();
    PortfolioState::new(rows)
}
