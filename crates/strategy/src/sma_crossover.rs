use quantbt_core::error::ensure_nonzero;
use quantbt_core::{BacktestError, PriceSeries, Result, Signal, SignalSeries};
use serde::{Deserialize, Serialize};

use crate::indicators::{fill, rolling_mean};

/// Parameters for the moving-average crossover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmaCrossoverParams {
    pub short_window: usize,
    pub long_window: usize,
}

impl Default for SmaCrossoverParams {
    fn default() -> Self {
        Self {
            short_window: 50,
            long_window: 200,
        }
    }
}

/// Long while the short moving average is above the long one.
///
/// Both averages are min-period-aware: before a window fills, the average of
/// the points seen so far is used, so the series has a signal from bar 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmaCrossover {
    short_window: usize,
    long_window: usize,
}

impl SmaCrossover {
    /// # Errors
    ///
    /// Returns `BacktestError::Config` unless `0 < short_window < long_window`.
    pub fn new(params: SmaCrossoverParams) -> Result<Self> {
        ensure_nonzero("short_window", params.short_window)?;
        if params.long_window <= params.short_window {
            return Err(BacktestError::config(format!(
                "long_window ({}) must exceed short_window ({})",
                params.long_window, params.short_window
            )));
        }
        Ok(Self {
            short_window: params.short_window,
            long_window: params.long_window,
        })
    }

    #[must_use]
    pub const fn short_window(&self) -> usize {
        self.short_window
    }

    #[must_use]
    pub const fn long_window(&self) -> usize {
        self.long_window
    }

    /// # Errors
    ///
    /// Only fails if the internal columns end up misaligned, which a valid
    /// `PriceSeries` cannot produce.
    pub fn generate(&self, prices: &PriceSeries) -> Result<SignalSeries> {
        let closes = prices.closes();
        let short = fill(&rolling_mean(&closes, self.short_window, 1), f64::NAN);
        let long = fill(&rolling_mean(&closes, self.long_window, 1), f64::NAN);

        let signals: Vec<Signal> = short
            .iter()
            .zip(&long)
            .map(|(s, l)| Signal::from_bool(s > l))
            .collect();

        SignalSeries::from_signals(&prices.dates(), &signals)?
            .with_indicator("short_mavg", short)?
            .with_indicator("long_mavg", long)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::prices;

    #[test]
    fn rejects_long_window_not_above_short() {
        let err = SmaCrossover::new(SmaCrossoverParams {
            short_window: 10,
            long_window: 10,
        })
        .unwrap_err();
        assert!(matches!(err, BacktestError::Config(_)));
    }

    #[test]
    fn rejects_zero_short_window() {
        assert!(SmaCrossover::new(SmaCrossoverParams {
            short_window: 0,
            long_window: 5,
        })
        .is_err());
    }

    #[test]
    fn ten_bar_scenario_matches_hand_computation() {
        let series = prices(&[
            100.0, 101.0, 102.0, 101.0, 100.0, 99.0, 98.0, 99.0, 100.0, 101.0,
        ]);
        let strategy = SmaCrossover::new(SmaCrossoverParams {
            short_window: 2,
            long_window: 4,
        })
        .unwrap();

        let signals = strategy.generate(&series).unwrap();

        let bits: Vec<i8> = signals.signals().iter().map(|s| s.as_i8()).collect();
        assert_eq!(bits, vec![0, 0, 1, 1, 0, 0, 0, 0, 1, 1]);
        assert_eq!(signals.deltas(), vec![0, 0, 1, 0, -1, 0, 0, 0, 1, 0]);

        let long = signals.indicator("long_mavg").unwrap();
        assert_eq!(long[3], 101.0);
        assert_eq!(long[9], 99.5);
    }

    #[test]
    fn invariant_to_positive_price_scaling() {
        let closes = [
            50.0, 52.5, 51.0, 53.25, 55.0, 54.0, 52.0, 50.5, 49.0, 51.5, 53.0, 56.0,
        ];
        let scaled: Vec<f64> = closes.iter().map(|c| c * 4.0).collect();
        let strategy = SmaCrossover::new(SmaCrossoverParams {
            short_window: 3,
            long_window: 5,
        })
        .unwrap();

        let base = strategy.generate(&prices(&closes)).unwrap();
        let other = strategy.generate(&prices(&scaled)).unwrap();

        assert_eq!(base.signals(), other.signals());
    }

    #[test]
    fn equal_averages_stay_flat() {
        let series = prices(&[10.0, 10.0, 10.0, 10.0]);
        let strategy = SmaCrossover::new(SmaCrossoverParams {
            short_window: 1,
            long_window: 3,
        })
        .unwrap();
        let signals = strategy.generate(&series).unwrap();
        assert!(signals.signals().iter().all(|s| *s == Signal::Flat));
    }
}
