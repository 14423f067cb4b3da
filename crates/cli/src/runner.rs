//! Runs one configured backtest and exports its report.

use std::io::Write;
use std::path::Path;

use anyhow::{bail, Context, Result};
use quantbt_analytics::{RiskAnalysis, RiskEngine, RiskReport};
use quantbt_backtest::{buy_and_hold, PortfolioSimulator};
use quantbt_core::{OptionChainProvider, PortfolioState, PriceSeries, ReturnSeries};
use quantbt_strategy::SignalGenerator;

use crate::config::{AppConfig, StrategyPlan};

/// Everything produced by one run.
#[derive(Debug, Clone)]
pub struct BacktestOutcome {
    pub strategy: &'static str,
    pub portfolio: PortfolioState,
    /// Buy-and-hold of the same prices with the same capital.
    pub benchmark: PortfolioState,
    pub analysis: RiskAnalysis,
}

/// Simulates the configured strategy over `prices` and analyzes the result.
///
/// # Errors
///
/// Returns an error if an options strategy is configured without a chain, or
/// if signal generation, simulation or analysis fails.
pub fn run_backtest(
    config: &AppConfig,
    prices: &PriceSeries,
    market: Option<&ReturnSeries>,
    chain: Option<&dyn OptionChainProvider>,
) -> Result<BacktestOutcome> {
    let capital = config.backtest.initial_capital;

    let (strategy, portfolio) = match config.strategy.plan() {
        StrategyPlan::Stock(strategy_config) => {
            let generator = SignalGenerator::from_config(&strategy_config)?;
            let signals = generator.generate(prices)?;
            let simulator = PortfolioSimulator::new(capital, config.backtest.shares)?;
            let portfolio = match config.exits {
                Some(rules) => simulator.run_with_exits(prices, &signals, rules)?,
                None => simulator.run_continuous(prices, &signals)?,
            };
            (generator.name(), portfolio)
        }
        StrategyPlan::Options(options) => {
            let Some(chain) = chain else {
                bail!("{} needs an option chain (--chain)", options.name());
            };
            if config.exits.is_some() {
                tracing::warn!(strategy = options.name(), "Exit rules ignored for options strategies");
            }
            (options.name(), options.simulate(prices, chain, capital)?)
        }
    };

    let benchmark = buy_and_hold(prices, capital)?;
    let engine = RiskEngine::new(config.risk.clone())?;
    let analysis = engine.analyze(&portfolio, market, capital)?;

    tracing::info!(
        strategy,
        bars = portfolio.len(),
        final_value = portfolio.last_total(),
        benchmark_value = benchmark.last_total(),
        "Backtest complete"
    );

    Ok(BacktestOutcome {
        strategy,
        portfolio,
        benchmark,
        analysis,
    })
}

/// Writes the report as a header row and one value row.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_report_to<W: Write>(writer: W, report: &RiskReport) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(report.headers())?;
    csv_writer.write_record(report.values())?;
    csv_writer.flush()?;
    Ok(())
}

/// # Errors
///
/// Returns an error if the file cannot be created or written.
pub fn write_report(path: impl AsRef<Path>, report: &RiskReport) -> Result<()> {
    let path = path.as_ref();
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create report file: {}", path.display()))?;
    write_report_to(file, report)?;
    tracing::info!(path = %path.display(), "Wrote risk report");
    Ok(())
}
