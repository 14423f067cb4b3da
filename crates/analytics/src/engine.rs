//! Runs every analytic over a finished portfolio and assembles the report.

use quantbt_core::constants::DEFAULT_ACF_LAGS;
use quantbt_core::error::ensure_positive;
use quantbt_core::{BacktestError, PortfolioState, Result, ReturnSeries};
use serde::{Deserialize, Serialize};

use crate::beta::{beta, HedgeSuggestion};
use crate::drawdown::DrawdownAnalysis;
use crate::hypothesis::StatisticalTests;
use crate::monte_carlo::{MonteCarloConfig, MonteCarloResults, MonteCarloSimulator};
use crate::ratios::{annualized_return, calmar_ratio, sharpe_ratio, sortino_ratio, total_return};
use crate::report::{RiskMetric, RiskReport};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskConfig {
    /// Annual risk-free rate subtracted from daily returns.
    pub risk_free_rate: f64,
    pub acf_lags: usize,
    pub monte_carlo: MonteCarloConfig,
}

impl Default for RiskConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.0,
            acf_lags: DEFAULT_ACF_LAGS,
            monte_carlo: MonteCarloConfig::default(),
        }
    }
}

impl RiskConfig {
    /// # Errors
    ///
    /// Returns `BacktestError::Config` for a non-finite rate or an invalid
    /// Monte Carlo section.
    pub fn validate(&self) -> Result<()> {
        if !self.risk_free_rate.is_finite() {
            return Err(BacktestError::config(format!(
                "risk_free_rate must be finite, got {}",
                self.risk_free_rate
            )));
        }
        self.monte_carlo.validate()
    }
}

/// Everything computed for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAnalysis {
    pub report: RiskReport,
    pub drawdown: DrawdownAnalysis,
    pub monte_carlo: MonteCarloResults,
    pub beta: f64,
    pub hedge: Option<HedgeSuggestion>,
    pub tests: StatisticalTests,
}

#[derive(Debug, Clone)]
pub struct RiskEngine {
    config: RiskConfig,
    simulator: MonteCarloSimulator,
}

impl RiskEngine {
    /// # Errors
    ///
    /// Returns `BacktestError::Config` if the configuration is invalid.
    pub fn new(config: RiskConfig) -> Result<Self> {
        config.validate()?;
        let simulator = MonteCarloSimulator::new(config.monte_carlo.clone())?;
        Ok(Self { config, simulator })
    }

    #[must_use]
    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    /// Analyzes `portfolio` against optional market returns.
    ///
    /// Monte Carlo paths start from the final portfolio value; the blowup
    /// probability is the share of paths ending below `initial_capital`.
    /// Beta and the t-test are skipped without market returns.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `BacktestError::Config` if `initial_capital` is not positive
    /// - `BacktestError::Data` if the portfolio has no finite returns
    pub fn analyze(
        &self,
        portfolio: &PortfolioState,
        market: Option<&ReturnSeries>,
        initial_capital: f64,
    ) -> Result<RiskAnalysis> {
        ensure_positive("initial_capital", initial_capital)?;
        let strategy_returns = portfolio.returns();
        let returns = strategy_returns.finite_values();
        let rf = self.config.risk_free_rate;

        let total = total_return(portfolio);
        let annualized = annualized_return(total, portfolio.span_days());
        let drawdown = DrawdownAnalysis::from_portfolio(portfolio);
        let sharpe = sharpe_ratio(&returns, rf);
        let sortino = sortino_ratio(&returns, rf);
        let calmar = calmar_ratio(annualized, drawdown.max_drawdown);

        let portfolio_beta = market.map_or(f64::NAN, |m| beta(&strategy_returns, m));
        let hedge = HedgeSuggestion::from_beta(portfolio_beta);

        let monte_carlo = self.simulator.simulate(&returns, portfolio.last_total())?;
        let blowup = monte_carlo.prob_below(initial_capital);

        let market_values = market.map(ReturnSeries::finite_values);
        let tests = StatisticalTests::run(&returns, market_values.as_deref(), self.config.acf_lags);

        let report = RiskReport::new([
            (RiskMetric::TotalReturnPct, total * 100.0),
            (RiskMetric::AnnualizedReturnPct, annualized * 100.0),
            (RiskMetric::SharpeRatio, sharpe),
            (RiskMetric::SortinoRatio, sortino),
            (RiskMetric::CalmarRatio, calmar),
            (RiskMetric::MaxDrawdownPct, drawdown.max_drawdown * 100.0),
            (RiskMetric::AvgDrawdownPct, drawdown.avg_drawdown * 100.0),
            (RiskMetric::AvgRecoveryDays, drawdown.avg_recovery_days),
            (RiskMetric::PortfolioBeta, portfolio_beta),
            (RiskMetric::ValueAtRisk, monte_carlo.var),
            (RiskMetric::ConditionalValueAtRisk, monte_carlo.cvar),
            (RiskMetric::BlowupProbabilityPct, blowup * 100.0),
        ]);

        tracing::info!(
            total_return_pct = total * 100.0,
            sharpe,
            max_drawdown_pct = drawdown.max_drawdown * 100.0,
            beta = portfolio_beta,
            "Risk analysis complete"
        );

        Ok(RiskAnalysis {
            report,
            drawdown,
            monte_carlo,
            beta: portfolio_beta,
            hedge,
            tests,
        })
    }
}
