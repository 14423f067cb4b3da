//! Stock portfolio simulation driven by a signal series.
//!
//! Two modes are available:
//! - **continuous**: the position always equals `shares * signal`, marked to
//!   market on every bar.
//! - **threshold exits**: a per-bar state machine that enters on a long
//!   signal and exits on a profit target, a stop loss, or a flat signal.
//!
//! Fills happen at the bar's close with no slippage or commission.

use quantbt_core::error::ensure_positive;
use quantbt_core::{
    BacktestError, PortfolioRow, PortfolioState, PriceSeries, Result, Signal, SignalSeries,
};
use serde::{Deserialize, Serialize};

/// Profit-target and stop-loss fractions for threshold-exit mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExitRules {
    /// Exit once the close is at least `profit_target` above entry.
    pub profit_target: f64,
    /// Exit once the close is at least `stop_loss` below entry.
    pub stop_loss: f64,
}

impl Default for ExitRules {
    fn default() -> Self {
        Self {
            profit_target: 0.10,
            stop_loss: 0.05,
        }
    }
}

impl ExitRules {
    /// # Errors
    ///
    /// Returns `BacktestError::Config` unless both fractions are positive.
    pub fn validate(&self) -> Result<()> {
        ensure_positive("profit_target", self.profit_target)?;
        ensure_positive("stop_loss", self.stop_loss)
    }

    /// Returns the reason to leave a long position opened at `entry`, if any.
    ///
    /// Thresholds are checked on the return since entry, so a close of exactly
    /// `entry * (1 + profit_target)` exits.
    #[must_use]
    pub fn exit_reason(&self, entry: f64, price: f64, signal: Signal) -> Option<ExitReason> {
        // Compared as a return, not as `price >= entry * (1 + target)`: the
        // product form misses the exact target price in floating point.
        let change = price / entry - 1.0;
        if change >= self.profit_target {
            Some(ExitReason::ProfitTarget)
        } else if change <= -self.stop_loss {
            Some(ExitReason::StopLoss)
        } else if signal == Signal::Flat {
            Some(ExitReason::SignalFlat)
        } else {
            None
        }
    }
}

/// Why a threshold-mode position was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitReason {
    ProfitTarget,
    StopLoss,
    SignalFlat,
}

impl std::fmt::Display for ExitReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ProfitTarget => write!(f, "profit_target"),
            Self::StopLoss => write!(f, "stop_loss"),
            Self::SignalFlat => write!(f, "signal_flat"),
        }
    }
}

/// Position state for threshold-exit mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TradeState {
    Flat,
    Long { entry_price: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PortfolioSimulator {
    initial_capital: f64,
    shares: f64,
}

impl PortfolioSimulator {
    /// # Errors
    ///
    /// Returns `BacktestError::Config` unless capital and share count are positive.
    pub fn new(initial_capital: f64, shares: u32) -> Result<Self> {
        ensure_positive("initial_capital", initial_capital)?;
        if shares == 0 {
            return Err(BacktestError::config("shares must be > 0"));
        }
        Ok(Self {
            initial_capital,
            shares: f64::from(shares),
        })
    }

    #[must_use]
    pub const fn initial_capital(&self) -> f64 {
        self.initial_capital
    }

    /// Mark-to-market simulation where the position tracks the signal.
    ///
    /// `cash[t] = initial_capital - sum(shares * delta[k] * price[k], k <= t)`
    /// and `holdings[t] = shares * signal[t] * price[t]`.
    ///
    /// # Errors
    ///
    /// Returns `BacktestError::Data` if prices and signals are not aligned.
    pub fn run_continuous(
        &self,
        prices: &PriceSeries,
        signals: &SignalSeries,
    ) -> Result<PortfolioState> {
        ensure_aligned(prices, signals)?;

        let mut cash = self.initial_capital;
        let mut rows = Vec::with_capacity(prices.len());

        for (bar, point) in prices.bars().iter().zip(signals.points()) {
            cash -= self.shares * f64::from(point.position_delta) * bar.close;
            let position = self.shares * point.signal.as_f64();
            rows.push(PortfolioRow {
                date: bar.date,
                cash,
                holdings: position * bar.close,
                position,
            });
        }

        let state = PortfolioState::new(rows)?;
        tracing::debug!(
            mode = "continuous",
            bars = state.len(),
            final_total = state.last_total(),
            "Portfolio simulated"
        );
        Ok(state)
    }

    /// Simulation with explicit entries and threshold exits.
    ///
    /// # Errors
    ///
    /// Returns `BacktestError::Config` for invalid exit rules and
    /// `BacktestError::Data` if prices and signals are not aligned.
    pub fn run_with_exits(
        &self,
        prices: &PriceSeries,
        signals: &SignalSeries,
        rules: ExitRules,
    ) -> Result<PortfolioState> {
        rules.validate()?;
        ensure_aligned(prices, signals)?;

        let mut state = TradeState::Flat;
        let mut cash = self.initial_capital;
        let mut rows = Vec::with_capacity(prices.len());
        let mut trades = 0usize;

        for (bar, point) in prices.bars().iter().zip(signals.points()) {
            let price = bar.close;
            state = match state {
                TradeState::Flat if point.signal.is_long() => {
                    cash -= price * self.shares;
                    trades += 1;
                    TradeState::Long { entry_price: price }
                }
                TradeState::Flat => TradeState::Flat,
                TradeState::Long { entry_price } => {
                    match rules.exit_reason(entry_price, price, point.signal) {
                        Some(reason) => {
                            cash += price * self.shares;
                            tracing::trace!(date = %bar.date, entry_price, price, %reason, "Exit");
                            TradeState::Flat
                        }
                        None => state,
                    }
                }
            };

            let position = match state {
                TradeState::Flat => 0.0,
                TradeState::Long { .. } => self.shares,
            };
            rows.push(PortfolioRow {
                date: bar.date,
                cash,
                holdings: position * price,
                position,
            });
        }

        let portfolio = PortfolioState::new(rows)?;
        tracing::debug!(
            mode = "threshold_exit",
            bars = portfolio.len(),
            trades,
            final_total = portfolio.last_total(),
            "Portfolio simulated"
        );
        Ok(portfolio)
    }
}

fn ensure_aligned(prices: &PriceSeries, signals: &SignalSeries) -> Result<()> {
    if prices.len() != signals.len() {
        return Err(BacktestError::data(format!(
            "{} price bars but {} signals",
            prices.len(),
            signals.len()
        )));
    }
    for (bar, point) in prices.bars().iter().zip(signals.points()) {
        if bar.date != point.date {
            return Err(BacktestError::data(format!(
                "signal dated {} does not match price bar {}",
                point.date, bar.date
            )));
        }
    }
    Ok(())
}
