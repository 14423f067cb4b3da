//! Environment overrides; kept in their own test binary so the variables
//! never leak into other config tests.

use quantbt_cli::{ConfigLoader, StrategySection};
use quantbt_strategy::SmaCrossoverParams;
use tempfile::TempDir;

#[test]
fn prefixed_env_vars_override_file_values() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("Config.toml");
    std::fs::write(
        &path,
        "[backtest]\nshares = 10\n\n[strategy]\nkind = \"sma_crossover\"\nshort_window = 5\nlong_window = 20\n",
    )
    .unwrap();

    std::env::set_var("QUANTBT_BACKTEST__SHARES", "25");
    std::env::set_var("QUANTBT_STRATEGY__LONG_WINDOW", "30");
    let config = ConfigLoader::load(&path);
    std::env::remove_var("QUANTBT_BACKTEST__SHARES");
    std::env::remove_var("QUANTBT_STRATEGY__LONG_WINDOW");

    let config = config.unwrap();
    assert_eq!(config.backtest.shares, 25);
    assert_eq!(
        config.strategy,
        StrategySection::SmaCrossover(SmaCrossoverParams {
            short_window: 5,
            long_window: 30,
        })
    );
}
