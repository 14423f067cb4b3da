//! Put credit spreads written once per holding block.

use quantbt_core::error::{ensure_nonzero, ensure_positive, ensure_unit_interval};
use quantbt_core::{
    OptionChainSnapshot, OptionQuote, OptionSide, PortfolioRow, PortfolioState, PriceSeries,
    Result,
};
use serde::{Deserialize, Serialize};

use super::blocks::BlockIter;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreditSpreadParams {
    /// Distance between the short and long strikes; caps the loss per spread.
    pub spread_width: f64,
    /// Short put strike target below the current close, as a fraction.
    pub spread_offset: f64,
    pub holding_period: usize,
}

impl Default for CreditSpreadParams {
    fn default() -> Self {
        Self {
            spread_width: 5.0,
            spread_offset: 0.05,
            holding_period: 5,
        }
    }
}

impl CreditSpreadParams {
    /// # Errors
    ///
    /// Returns `BacktestError::Config` for a non-positive width, an offset
    /// outside (0, 1) or a zero holding period.
    pub fn validate(&self) -> Result<()> {
        ensure_positive("spread_width", self.spread_width)?;
        ensure_unit_interval("spread_offset", self.spread_offset)?;
        ensure_nonzero("holding_period", self.holding_period)
    }

    /// Profit of one spread whose short put settles at `expiry_price`.
    #[must_use]
    pub fn settle(&self, put: &OptionQuote, expiry_price: f64) -> f64 {
        if expiry_price > put.strike {
            put.premium
        } else {
            -(self.spread_width - put.premium)
        }
    }
}

/// Writes one spread per block and holds the block's cash flat.
///
/// # Errors
///
/// Returns `BacktestError::Simulation` if the snapshot has no puts.
pub fn simulate(
    params: &CreditSpreadParams,
    prices: &PriceSeries,
    chain: &OptionChainSnapshot,
    initial_capital: f64,
) -> Result<PortfolioState> {
    let puts = chain.require(OptionSide::Put)?;
    let mut cash = initial_capital;
    let mut rows = Vec::with_capacity(prices.len());
    let mut losing = 0usize;

    for block in BlockIter::new(prices.len(), params.holding_period) {
        let price = prices.close(block.start);
        let put = puts.nearest(price * (1.0 - params.spread_offset))?;
        let pnl = params.settle(put, prices.close(block.expiry));
        if pnl < 0.0 {
            losing += 1;
        }
        cash += pnl;

        rows.extend(prices.bars()[block.start..block.end].iter().map(|bar| PortfolioRow {
            date: bar.date,
            cash,
            holdings: 0.0,
            position: 0.0,
        }));
    }

    let portfolio = PortfolioState::new(rows)?;
    tracing::debug!(
        strategy = "credit_spread",
        bars = portfolio.len(),
        losing_blocks = losing,
        final_total = portfolio.last_total(),
        "Options portfolio simulated"
    );
    Ok(portfolio)
}
