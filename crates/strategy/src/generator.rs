use quantbt_core::{PriceSeries, Result, SignalSeries};
use serde::{Deserialize, Serialize};

use crate::bollinger::{BollingerBands, BollingerParams};
use crate::rsi::{Rsi, RsiParams};
use crate::second_derivative::{SecondDerivativeMa, SecondDerivativeParams};
use crate::sma_crossover::{SmaCrossover, SmaCrossoverParams};

/// Serializable strategy selection, tagged by `kind`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StrategyConfig {
    SmaCrossover(SmaCrossoverParams),
    Rsi(RsiParams),
    BollingerBands(BollingerParams),
    SecondDerivativeMa(SecondDerivativeParams),
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self::SmaCrossover(SmaCrossoverParams::default())
    }
}

/// The closed set of stock signal generators.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SignalGenerator {
    SmaCrossover(SmaCrossover),
    Rsi(Rsi),
    BollingerBands(BollingerBands),
    SecondDerivativeMa(SecondDerivativeMa),
}

impl SignalGenerator {
    /// Validates the parameters and builds the matching generator.
    ///
    /// # Errors
    ///
    /// Returns `BacktestError::Config` if the parameters are out of range.
    pub fn from_config(config: &StrategyConfig) -> Result<Self> {
        Ok(match *config {
            StrategyConfig::SmaCrossover(p) => Self::SmaCrossover(SmaCrossover::new(p)?),
            StrategyConfig::Rsi(p) => Self::Rsi(Rsi::new(p)?),
            StrategyConfig::BollingerBands(p) => Self::BollingerBands(BollingerBands::new(p)?),
            StrategyConfig::SecondDerivativeMa(p) => {
                Self::SecondDerivativeMa(SecondDerivativeMa::new(p)?)
            }
        })
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SmaCrossover(_) => "SMA Crossover",
            Self::Rsi(_) => "RSI Trading",
            Self::BollingerBands(_) => "Bollinger Bands",
            Self::SecondDerivativeMa(_) => "Second Derivative MA",
        }
    }

    /// Turns a price series into a time-aligned signal series.
    ///
    /// # Errors
    ///
    /// Only fails if a generator produces misaligned columns.
    pub fn generate(&self, prices: &PriceSeries) -> Result<SignalSeries> {
        let signals = match self {
            Self::SmaCrossover(s) => s.generate(prices)?,
            Self::Rsi(s) => s.generate(prices)?,
            Self::BollingerBands(s) => s.generate(prices)?,
            Self::SecondDerivativeMa(s) => s.generate(prices)?,
        };

        tracing::debug!(
            strategy = self.name(),
            bars = signals.len(),
            entries = signals.entry_count(),
            "Generated signals"
        );

        Ok(signals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::prices;
    use quantbt_core::BacktestError;

    #[test]
    fn config_deserializes_from_tagged_json() {
        let json = r#"{"kind":"rsi","period":10,"oversold":25.0,"overbought":75.0}"#;
        let config: StrategyConfig = serde_json::from_str(json).unwrap();
        assert_eq!(
            config,
            StrategyConfig::Rsi(RsiParams {
                period: 10,
                oversold: 25.0,
                overbought: 75.0,
            })
        );
    }

    #[test]
    fn default_config_is_fifty_two_hundred_crossover() {
        let generator = SignalGenerator::from_config(&StrategyConfig::default()).unwrap();
        match generator {
            SignalGenerator::SmaCrossover(s) => {
                assert_eq!(s.short_window(), 50);
                assert_eq!(s.long_window(), 200);
            }
            other => panic!("unexpected generator {other:?}"),
        }
    }

    #[test]
    fn invalid_config_is_rejected_at_construction() {
        let config = StrategyConfig::BollingerBands(BollingerParams {
            window: 0,
            std_multiplier: 2.0,
        });
        assert!(matches!(
            SignalGenerator::from_config(&config),
            Err(BacktestError::Config(_))
        ));
    }

    #[test]
    fn every_variant_produces_aligned_first_differences() {
        let series = prices(&[
            100.0, 98.0, 97.0, 99.0, 103.0, 104.0, 101.0, 96.0, 95.0, 99.0, 105.0, 107.0,
        ]);
        let configs = [
            StrategyConfig::SmaCrossover(SmaCrossoverParams {
                short_window: 2,
                long_window: 5,
            }),
            StrategyConfig::Rsi(RsiParams {
                period: 3,
                oversold: 40.0,
                overbought: 70.0,
            }),
            StrategyConfig::BollingerBands(BollingerParams {
                window: 4,
                std_multiplier: 1.0,
            }),
            StrategyConfig::SecondDerivativeMa(SecondDerivativeParams {
                window: 2,
                threshold: 0.5,
            }),
        ];

        for config in &configs {
            let generator = SignalGenerator::from_config(config).unwrap();
            let signals = generator.generate(&series).unwrap();
            assert_eq!(signals.len(), series.len(), "{}", generator.name());
            assert_eq!(signals.dates(), series.dates());

            let bits = signals.signals();
            let mut running = 0i8;
            for (t, delta) in signals.deltas().into_iter().enumerate() {
                running += delta;
                assert_eq!(running, bits[t].as_i8() - bits[0].as_i8());
            }
        }
    }
}
