//! Configuration and run orchestration behind the `quantbt` binary.

pub mod config;
pub mod config_loader;
pub mod runner;

pub use config::{AppConfig, BacktestSection, StrategyPlan, StrategySection};
pub use config_loader::{ConfigLoader, ENV_PREFIX};
pub use runner::{run_backtest, write_report, write_report_to, BacktestOutcome};
