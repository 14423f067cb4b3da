//! Iron condors: short inner put and call, with losses measured against the
//! outer (wing) targets.

use quantbt_core::error::{ensure_nonzero, ensure_unit_interval};
use quantbt_core::{
    OptionChainSnapshot, OptionQuote, OptionSide, PortfolioRow, PortfolioState, PriceSeries,
    Result,
};
use serde::{Deserialize, Serialize};

use super::blocks::BlockIter;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IronCondorParams {
    pub lower_put_offset: f64,
    pub upper_call_offset: f64,
    pub inner_put_offset: f64,
    pub inner_call_offset: f64,
    pub holding_period: usize,
}

impl Default for IronCondorParams {
    fn default() -> Self {
        Self {
            lower_put_offset: 0.05,
            upper_call_offset: 0.05,
            inner_put_offset: 0.02,
            inner_call_offset: 0.02,
            holding_period: 5,
        }
    }
}

/// Strikes and targets for one condor written at a given close.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CondorLegs {
    pub put: OptionQuote,
    pub call: OptionQuote,
    pub outer_put_target: f64,
    pub outer_call_target: f64,
}

impl CondorLegs {
    #[must_use]
    pub fn premium(&self) -> f64 {
        self.put.premium + self.call.premium
    }

    /// Profit when the underlying settles at `expiry_price`.
    ///
    /// Inside `[put.strike, call.strike]` the full premium is kept. Below the
    /// put strike the loss is `put.strike - outer_put_target`; above the call
    /// strike it is `outer_call_target - call.strike`.
    #[must_use]
    pub fn settle(&self, expiry_price: f64) -> f64 {
        let premium = self.premium();
        if expiry_price >= self.put.strike && expiry_price <= self.call.strike {
            return premium;
        }
        let put_loss = if expiry_price < self.put.strike {
            self.put.strike - self.outer_put_target
        } else {
            0.0
        };
        let call_loss = if expiry_price > self.call.strike {
            self.outer_call_target - self.call.strike
        } else {
            0.0
        };
        premium - (put_loss + call_loss)
    }
}

impl IronCondorParams {
    /// # Errors
    ///
    /// Returns `BacktestError::Config` for offsets outside (0, 1) or a zero
    /// holding period.
    pub fn validate(&self) -> Result<()> {
        ensure_unit_interval("lower_put_offset", self.lower_put_offset)?;
        ensure_unit_interval("upper_call_offset", self.upper_call_offset)?;
        ensure_unit_interval("inner_put_offset", self.inner_put_offset)?;
        ensure_unit_interval("inner_call_offset", self.inner_call_offset)?;
        ensure_nonzero("holding_period", self.holding_period)
    }

    /// Picks the inner legs nearest to the targets around `price`.
    ///
    /// # Errors
    ///
    /// Returns `BacktestError::Simulation` if either table is empty.
    pub fn legs(&self, chain: &OptionChainSnapshot, price: f64) -> Result<CondorLegs> {
        let put = *chain.require(OptionSide::Put)?.nearest(price * (1.0 - self.inner_put_offset))?;
        let call = *chain
            .require(OptionSide::Call)?
            .nearest(price * (1.0 + self.inner_call_offset))?;
        Ok(CondorLegs {
            put,
            call,
            outer_put_target: price * (1.0 - self.lower_put_offset),
            outer_call_target: price * (1.0 + self.upper_call_offset),
        })
    }
}

/// Writes one condor per block and holds the block's cash flat.
///
/// # Errors
///
/// Returns `BacktestError::Simulation` if the snapshot lacks puts or calls.
pub fn simulate(
    params: &IronCondorParams,
    prices: &PriceSeries,
    chain: &OptionChainSnapshot,
    initial_capital: f64,
) -> Result<PortfolioState> {
    chain.require(OptionSide::Put)?;
    chain.require(OptionSide::Call)?;

    let mut cash = initial_capital;
    let mut rows = Vec::with_capacity(prices.len());

    for block in BlockIter::new(prices.len(), params.holding_period) {
        let legs = params.legs(chain, prices.close(block.start))?;
        cash += legs.settle(prices.close(block.expiry));

        rows.extend(prices.bars()[block.start..block.end].iter().map(|bar| PortfolioRow {
            date: bar.date,
            cash,
            holdings: 0.0,
            position: 0.0,
        }));
    }

    let portfolio = PortfolioState::new(rows)?;
    tracing::debug!(
        strategy = "iron_condor",
        bars = portfolio.len(),
        final_total = portfolio.last_total(),
        "Options portfolio simulated"
    );
    Ok(portfolio)
}
