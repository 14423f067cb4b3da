//! Property checks of the risk engine over generated portfolios.

use chrono::{Duration, NaiveDate};
use quantbt_analytics::{MonteCarloConfig, RiskConfig, RiskEngine, RiskMetric};
use quantbt_core::{PortfolioRow, PortfolioState};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

// =============================================================================
// Helper Functions
// =============================================================================

/// Random-walk portfolio of `days` bars starting at `start_value`.
fn random_portfolio(days: usize, start_value: f64, seed: u64) -> PortfolioState {
    let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut value = start_value;
    let rows = (0..days)
        .map(|i| {
            if i > 0 {
                value *= 1.0 + rng.gen_range(-0.02..0.021);
            }
            PortfolioRow {
                date: start + Duration::days(i as i64),
                cash: value * 0.25,
                holdings: value * 0.75,
                position: 10.0,
            }
        })
        .collect();
    PortfolioState::new(rows).unwrap()
}

fn engine(seed: u64) -> RiskEngine {
    RiskEngine::new(RiskConfig {
        monte_carlo: MonteCarloConfig::default()
            .with_simulations(300)
            .with_horizon(60)
            .with_seed(seed),
        ..RiskConfig::default()
    })
    .unwrap()
}

// =============================================================================
// Properties
// =============================================================================

#[test]
fn drawdowns_never_positive() {
    for seed in 0..5 {
        let p = random_portfolio(120, 10_000.0, seed);
        let analysis = engine(seed).analyze(&p, None, 10_000.0).unwrap();
        assert!(analysis.drawdown.drawdowns.iter().all(|d| *d <= 0.0));
        assert!(analysis.drawdown.max_drawdown <= 0.0);
        assert_eq!(analysis.drawdown.drawdowns.len(), p.len());
    }
}

#[test]
fn cvar_never_exceeds_var() {
    for seed in 0..5 {
        let p = random_portfolio(90, 5_000.0, seed);
        let analysis = engine(seed).analyze(&p, None, 5_000.0).unwrap();
        let mc = &analysis.monte_carlo;
        assert_eq!(mc.terminal_values.len(), 300);
        assert!(mc.cvar <= mc.var);
        assert!(mc.distribution.min <= mc.var);
        let blowup = analysis.report.get(RiskMetric::BlowupProbabilityPct).unwrap();
        assert!((0.0..=100.0).contains(&blowup));
    }
}

#[test]
fn seeded_runs_are_reproducible() {
    let p = random_portfolio(60, 1_000.0, 11);
    let a = engine(99).analyze(&p, None, 1_000.0).unwrap();
    let b = engine(99).analyze(&p, None, 1_000.0).unwrap();
    assert_eq!(a.monte_carlo.terminal_values, b.monte_carlo.terminal_values);
    assert_eq!(a.report.get(RiskMetric::ValueAtRisk), b.report.get(RiskMetric::ValueAtRisk));
}

#[test]
fn doubling_the_portfolio_leaves_ratios_unchanged() {
    let p = random_portfolio(100, 2_000.0, 3);
    let a = engine(5).analyze(&p, None, 2_000.0).unwrap();
    let b = engine(5).analyze(&p.scaled(2.0), None, 4_000.0).unwrap();
    for metric in [
        RiskMetric::TotalReturnPct,
        RiskMetric::SharpeRatio,
        RiskMetric::SortinoRatio,
        RiskMetric::MaxDrawdownPct,
    ] {
        let (x, y) = (a.report.get(metric).unwrap(), b.report.get(metric).unwrap());
        assert!((x - y).abs() < 1e-9, "{metric}: {x} vs {y}");
    }
}

#[test]
fn strategy_against_own_returns_has_unit_beta() {
    let p = random_portfolio(50, 1_000.0, 8);
    let market = p.returns();
    let analysis = engine(1).analyze(&p, Some(&market), 1_000.0).unwrap();
    assert!((analysis.beta - 1.0).abs() < 1e-12);
    let welch = analysis.tests.welch.unwrap();
    assert!(welch.t_statistic.abs() < 1e-12);
}
