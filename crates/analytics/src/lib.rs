//! Risk and performance analytics for backtested portfolios.

pub mod beta;
pub mod drawdown;
pub mod engine;
pub mod greeks;
pub mod hypothesis;
pub mod monte_carlo;
pub mod ratios;
pub mod report;
pub mod stats;

pub use beta::{beta, HedgeSuggestion};
pub use drawdown::DrawdownAnalysis;
pub use engine::{RiskAnalysis, RiskConfig, RiskEngine};
pub use greeks::{BlackScholes, Greeks};
pub use hypothesis::{
    acf, adf_test, welch_t_test, AdfResult, CriticalValues, StatisticalTests, WelchTTest,
};
pub use monte_carlo::{
    DistributionSummary, MonteCarloConfig, MonteCarloResults, MonteCarloSimulator,
};
pub use ratios::{annualized_return, calmar_ratio, sharpe_ratio, sortino_ratio, total_return};
pub use report::{RiskMetric, RiskReport};
