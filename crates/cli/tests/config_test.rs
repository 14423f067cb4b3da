//! Layered configuration loading from files on disk.

use std::path::{Path, PathBuf};

use quantbt_analytics::RiskConfig;
use quantbt_backtest::{ExitRules, WheelParams};
use quantbt_cli::{AppConfig, ConfigLoader, StrategyPlan, StrategySection};
use quantbt_strategy::{RsiParams, StrategyConfig};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn write(dir: &Path, file: &str, contents: &str) -> PathBuf {
    let path = dir.join(file);
    std::fs::write(&path, contents).unwrap();
    path
}

// =============================================================================
// Tests
// =============================================================================

#[test]
fn missing_file_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let config = ConfigLoader::load(dir.path().join("Config.toml")).unwrap();
    assert_eq!(config, AppConfig::default());
}

#[test]
fn toml_sections_override_defaults() {
    let dir = TempDir::new().unwrap();
    let path = write(
        dir.path(),
        "Config.toml",
        r#"
[backtest]
initial_capital = 50000.0

[strategy]
kind = "rsi"
period = 10
oversold = 25.0

[exits]
profit_target = 0.2
stop_loss = 0.1

[risk]
risk_free_rate = 0.02

[risk.monte_carlo]
num_simulations = 500
seed = 42
"#,
    );

    let config = ConfigLoader::load(&path).unwrap();
    assert_eq!(config.backtest.initial_capital, 50_000.0);
    assert_eq!(config.backtest.shares, 100);
    assert_eq!(
        config.strategy.plan(),
        StrategyPlan::Stock(StrategyConfig::Rsi(RsiParams {
            period: 10,
            oversold: 25.0,
            overbought: 70.0,
        }))
    );
    assert_eq!(
        config.exits,
        Some(ExitRules {
            profit_target: 0.2,
            stop_loss: 0.1,
        })
    );
    assert_eq!(config.risk.risk_free_rate, 0.02);
    assert_eq!(config.risk.monte_carlo.num_simulations, 500);
    assert_eq!(config.risk.monte_carlo.horizon, 252);
    assert_eq!(config.risk.monte_carlo.seed, Some(42));
    assert_eq!(config.risk.acf_lags, RiskConfig::default().acf_lags);
}

#[test]
fn profile_overlay_wins_over_base_file() {
    let dir = TempDir::new().unwrap();
    let path = write(
        dir.path(),
        "Config.toml",
        r#"
[backtest]
initial_capital = 20000.0
shares = 10

[strategy]
kind = "sma_crossover"
short_window = 5
long_window = 20
"#,
    );
    write(
        dir.path(),
        "Config.options.toml",
        r#"
[strategy]
kind = "wheel"
put_offset = 0.1
"#,
    );

    let config = ConfigLoader::load_with_profile(&path, "options").unwrap();
    assert_eq!(config.backtest.shares, 10);
    assert_eq!(
        config.strategy,
        StrategySection::Wheel(WheelParams {
            put_offset: 0.1,
            ..WheelParams::default()
        })
    );
    assert!(config.strategy.needs_option_chain());
}

#[test]
fn out_of_range_values_fail_validation() {
    let dir = TempDir::new().unwrap();
    let path = write(
        dir.path(),
        "Config.toml",
        r#"
[risk.monte_carlo]
confidence_level = 1.5
"#,
    );
    let err = ConfigLoader::load(&path).unwrap_err();
    assert!(format!("{err:#}").contains("confidence_level"));
}

#[test]
fn unknown_strategy_kind_is_a_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = write(
        dir.path(),
        "Config.toml",
        r#"
[strategy]
kind = "martingale"
"#,
    );
    assert!(ConfigLoader::load(&path).is_err());
}
