//! The Wheel: sell cash-secured puts until assigned, then sell covered calls
//! against the assigned stock until it is called away.

use quantbt_core::error::{ensure_nonzero, ensure_unit_interval};
use quantbt_core::{
    BacktestError, OptionChainSnapshot, OptionSide, PortfolioRow, PortfolioState, PriceSeries,
    Result,
};
use serde::{Deserialize, Serialize};

use super::blocks::expiry_index;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WheelParams {
    /// Put strike target below the current close, as a fraction.
    pub put_offset: f64,
    /// Call strike target above the cost basis, as a fraction.
    pub call_offset: f64,
    /// Bars until an option written today settles.
    pub holding_period: usize,
    /// Shares per contract.
    pub shares: u32,
}

impl Default for WheelParams {
    fn default() -> Self {
        Self {
            put_offset: 0.05,
            call_offset: 0.05,
            holding_period: 5,
            shares: 100,
        }
    }
}

impl WheelParams {
    /// # Errors
    ///
    /// Returns `BacktestError::Config` for offsets outside (0, 1), a zero
    /// holding period or zero shares.
    pub fn validate(&self) -> Result<()> {
        ensure_unit_interval("put_offset", self.put_offset)?;
        ensure_unit_interval("call_offset", self.call_offset)?;
        ensure_nonzero("holding_period", self.holding_period)?;
        if self.shares == 0 {
            return Err(BacktestError::config("shares must be > 0"));
        }
        Ok(())
    }
}

/// Wheel position state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum WheelState {
    NoStock,
    StockOwned { cost_basis: f64 },
}

impl WheelState {
    #[must_use]
    pub const fn owns_stock(&self) -> bool {
        matches!(self, Self::StockOwned { .. })
    }
}

/// Steps the Wheel over every bar, writing one option per bar.
///
/// # Errors
///
/// Returns `BacktestError::Simulation` if the snapshot lacks puts or calls.
pub fn simulate(
    params: &WheelParams,
    prices: &PriceSeries,
    chain: &OptionChainSnapshot,
    initial_capital: f64,
) -> Result<PortfolioState> {
    let puts = chain.require(OptionSide::Put)?;
    let calls = chain.require(OptionSide::Call)?;
    let shares = f64::from(params.shares);
    let len = prices.len();

    let mut cash = initial_capital;
    let mut state = WheelState::NoStock;
    let mut assignments = 0usize;
    let mut rows = Vec::with_capacity(len);

    for (i, bar) in prices.bars().iter().enumerate() {
        let price = bar.close;
        let expiry_price = prices.close(expiry_index(i, params.holding_period, len));

        state = match state {
            WheelState::NoStock => {
                let put = puts.nearest(price * (1.0 - params.put_offset))?;
                cash += put.premium * shares;
                let cost = put.strike * shares;
                if expiry_price < put.strike && cash >= cost {
                    cash -= cost;
                    assignments += 1;
                    tracing::trace!(date = %bar.date, strike = put.strike, "Put assigned");
                    WheelState::StockOwned {
                        cost_basis: put.strike,
                    }
                } else {
                    WheelState::NoStock
                }
            }
            WheelState::StockOwned { cost_basis } => {
                let call = calls.nearest(cost_basis * (1.0 + params.call_offset))?;
                cash += call.premium * shares;
                if expiry_price > call.strike {
                    cash += call.strike * shares;
                    tracing::trace!(date = %bar.date, strike = call.strike, "Call assigned");
                    WheelState::NoStock
                } else {
                    state
                }
            }
        };

        let position = if state.owns_stock() { shares } else { 0.0 };
        rows.push(PortfolioRow {
            date: bar.date,
            cash,
            holdings: position * price,
            position,
        });
    }

    let portfolio = PortfolioState::new(rows)?;
    tracing::debug!(
        strategy = "wheel",
        bars = portfolio.len(),
        assignments,
        final_total = portfolio.last_total(),
        "Options portfolio simulated"
    );
    Ok(portfolio)
}
