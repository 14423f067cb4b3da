//! Application configuration sections.

use quantbt_analytics::RiskConfig;
use quantbt_backtest::{CreditSpreadParams, ExitRules, IronCondorParams, OptionsStrategy, WheelParams};
use quantbt_core::error::ensure_positive;
use quantbt_core::{BacktestError, Result};
use quantbt_strategy::{
    BollingerParams, RsiParams, SecondDerivativeParams, SignalGenerator, SmaCrossoverParams,
    StrategyConfig,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backtest: BacktestSection,
    pub strategy: StrategySection,
    /// Switches stock strategies to threshold-exit mode when present.
    pub exits: Option<ExitRules>,
    pub risk: RiskConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestSection {
    pub initial_capital: f64,
    /// Shares per stock position or per Wheel contract.
    pub shares: u32,
}

impl Default for BacktestSection {
    fn default() -> Self {
        Self {
            initial_capital: 100_000.0,
            shares: 100,
        }
    }
}

/// Every runnable strategy, tagged by `kind`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StrategySection {
    SmaCrossover(SmaCrossoverParams),
    Rsi(RsiParams),
    BollingerBands(BollingerParams),
    SecondDerivativeMa(SecondDerivativeParams),
    Wheel(WheelParams),
    CreditSpread(CreditSpreadParams),
    IronCondor(IronCondorParams),
}

impl Default for StrategySection {
    fn default() -> Self {
        Self::SmaCrossover(SmaCrossoverParams::default())
    }
}

/// Which simulator a strategy section runs on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StrategyPlan {
    Stock(StrategyConfig),
    Options(OptionsStrategy),
}

impl StrategySection {
    #[must_use]
    pub const fn plan(&self) -> StrategyPlan {
        match *self {
            Self::SmaCrossover(p) => StrategyPlan::Stock(StrategyConfig::SmaCrossover(p)),
            Self::Rsi(p) => StrategyPlan::Stock(StrategyConfig::Rsi(p)),
            Self::BollingerBands(p) => StrategyPlan::Stock(StrategyConfig::BollingerBands(p)),
            Self::SecondDerivativeMa(p) => {
                StrategyPlan::Stock(StrategyConfig::SecondDerivativeMa(p))
            }
            Self::Wheel(p) => StrategyPlan::Options(OptionsStrategy::Wheel(p)),
            Self::CreditSpread(p) => StrategyPlan::Options(OptionsStrategy::CreditSpread(p)),
            Self::IronCondor(p) => StrategyPlan::Options(OptionsStrategy::IronCondor(p)),
        }
    }

    #[must_use]
    pub const fn needs_option_chain(&self) -> bool {
        matches!(self.plan(), StrategyPlan::Options(_))
    }
}

impl AppConfig {
    /// Checks every section without running anything.
    ///
    /// # Errors
    ///
    /// Returns `BacktestError::Config` naming the first invalid field.
    pub fn validate(&self) -> Result<()> {
        ensure_positive("backtest.initial_capital", self.backtest.initial_capital)?;
        if self.backtest.shares == 0 {
            return Err(BacktestError::config("backtest.shares must be > 0"));
        }
        match self.strategy.plan() {
            StrategyPlan::Stock(config) => {
                SignalGenerator::from_config(&config)?;
            }
            StrategyPlan::Options(strategy) => strategy.validate()?,
        }
        if let Some(exits) = &self.exits {
            exits.validate()?;
        }
        self.risk.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = AppConfig::default();
        assert_eq!(config.backtest.initial_capital, 100_000.0);
        assert_eq!(config.backtest.shares, 100);
        assert_eq!(
            config.strategy,
            StrategySection::SmaCrossover(SmaCrossoverParams {
                short_window: 50,
                long_window: 200,
            })
        );
        assert!(config.exits.is_none());
        assert_eq!(config.risk.monte_carlo.num_simulations, 1_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn options_kinds_need_a_chain() {
        assert!(StrategySection::Wheel(WheelParams::default()).needs_option_chain());
        assert!(StrategySection::IronCondor(IronCondorParams::default()).needs_option_chain());
        assert!(!StrategySection::Rsi(RsiParams::default()).needs_option_chain());
    }

    #[test]
    fn kind_tag_round_trips_through_json() {
        let section = StrategySection::CreditSpread(CreditSpreadParams::default());
        let json = serde_json::to_string(&section).unwrap();
        assert!(json.contains(r#""kind":"credit_spread""#));
        let back: StrategySection = serde_json::from_str(&json).unwrap();
        assert_eq!(back, section);
    }

    #[test]
    fn invalid_sections_are_rejected() {
        let mut config = AppConfig::default();
        config.backtest.shares = 0;
        assert!(config.validate().is_err());

        let config = AppConfig {
            strategy: StrategySection::SmaCrossover(SmaCrossoverParams {
                short_window: 20,
                long_window: 10,
            }),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());

        let config = AppConfig {
            exits: Some(ExitRules {
                profit_target: -0.1,
                stop_loss: 0.05,
            }),
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
