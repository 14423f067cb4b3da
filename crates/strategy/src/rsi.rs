use quantbt_core::constants::{EPSILON, RSI_NEUTRAL};
use quantbt_core::error::ensure_nonzero;
use quantbt_core::{BacktestError, PriceSeries, Result, Signal, SignalSeries};
use serde::{Deserialize, Serialize};

use crate::indicators::rolling_mean;

/// Parameters for the RSI mean-reversion entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RsiParams {
    pub period: usize,
    pub oversold: f64,
    /// Validated but does not gate signals; only `oversold` drives entries.
    pub overbought: f64,
}

impl Default for RsiParams {
    fn default() -> Self {
        Self {
            period: 14,
            oversold: 30.0,
            overbought: 70.0,
        }
    }
}

/// Long while RSI is below the oversold threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rsi {
    period: usize,
    oversold: f64,
    overbought: f64,
}

impl Rsi {
    /// # Errors
    ///
    /// Returns `BacktestError::Config` unless `period > 0` and
    /// `0 < oversold < overbought < 100`.
    pub fn new(params: RsiParams) -> Result<Self> {
        ensure_nonzero("period", params.period)?;
        let in_range = |v: f64| v.is_finite() && v > 0.0 && v < 100.0;
        if !in_range(params.oversold) || !in_range(params.overbought) {
            return Err(BacktestError::config(format!(
                "oversold ({}) and overbought ({}) must lie in (0, 100)",
                params.oversold, params.overbought
            )));
        }
        if params.oversold >= params.overbought {
            return Err(BacktestError::config(format!(
                "oversold ({}) must be below overbought ({})",
                params.oversold, params.overbought
            )));
        }
        Ok(Self {
            period: params.period,
            oversold: params.oversold,
            overbought: params.overbought,
        })
    }

    #[must_use]
    pub const fn overbought(&self) -> f64 {
        self.overbought
    }

    /// RSI per bar, with the neutral value until `period` deltas have accumulated.
    ///
    /// The first bar has no prior close and contributes a zero gain and loss.
    #[must_use]
    pub fn compute(&self, closes: &[f64]) -> Vec<f64> {
        let deltas: Vec<f64> = (0..closes.len())
            .map(|t| if t == 0 { 0.0 } else { closes[t] - closes[t - 1] })
            .collect();
        let gains: Vec<f64> = deltas.iter().map(|d| d.max(0.0)).collect();
        let losses: Vec<f64> = deltas.iter().map(|d| (-d).max(0.0)).collect();

        let avg_gain = rolling_mean(&gains, self.period, self.period);
        let avg_loss = rolling_mean(&losses, self.period, self.period);

        avg_gain
            .iter()
            .zip(&avg_loss)
            .map(|(g, l)| match (g, l) {
                (Some(g), Some(l)) => {
                    let rs = g / (l + EPSILON);
                    100.0 - 100.0 / (1.0 + rs)
                }
                _ => RSI_NEUTRAL,
            })
            .collect()
    }

    /// # Errors
    ///
    /// Only fails if the internal columns end up misaligned.
    pub fn generate(&self, prices: &PriceSeries) -> Result<SignalSeries> {
        let rsi = self.compute(&prices.closes());
        let signals: Vec<Signal> = rsi
            .iter()
            .map(|r| Signal::from_bool(*r < self.oversold))
            .collect();

        SignalSeries::from_signals(&prices.dates(), &signals)?.with_indicator("rsi", rsi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::prices;

    fn rsi(period: usize) -> Rsi {
        Rsi::new(RsiParams {
            period,
            ..RsiParams::default()
        })
        .unwrap()
    }

    #[test]
    fn rejects_inverted_thresholds() {
        let result = Rsi::new(RsiParams {
            period: 14,
            oversold: 70.0,
            overbought: 30.0,
        });
        assert!(matches!(result, Err(BacktestError::Config(_))));
    }

    #[test]
    fn rejects_thresholds_outside_percent_range() {
        let result = Rsi::new(RsiParams {
            period: 14,
            oversold: 0.0,
            overbought: 70.0,
        });
        assert!(result.is_err());
    }

    #[test]
    fn neutral_until_window_fills() {
        let values = rsi(3).compute(&[10.0, 11.0, 12.0, 13.0]);
        assert_eq!(values[0], RSI_NEUTRAL);
        assert_eq!(values[1], RSI_NEUTRAL);
        assert!(values[2] > 99.0);
    }

    #[test]
    fn falling_prices_drive_rsi_to_zero_and_enter() {
        let series = prices(&[20.0, 19.0, 18.0, 17.0, 16.0, 15.0]);
        let signals = rsi(3).generate(&series).unwrap();
        let values = signals.indicator("rsi").unwrap();
        assert!(values[5] < 1e-6);
        assert_eq!(signals.signals()[0], Signal::Flat);
        assert_eq!(signals.signals()[5], Signal::Long);
    }

    #[test]
    fn mixed_moves_match_closed_form() {
        // deltas: 0, +2, -1, +1 -> window of 3 at t=3: gains 2,0,1 losses 0,1,0
        let values = rsi(3).compute(&[10.0, 12.0, 11.0, 12.0]);
        let rs = 1.0 / (1.0 / 3.0 + EPSILON);
        let expected = 100.0 - 100.0 / (1.0 + rs);
        assert!((values[3] - expected).abs() < 1e-9);
    }

    #[test]
    fn overbought_is_carried_but_unused() {
        let strategy = rsi(3);
        assert_eq!(strategy.overbought(), 70.0);
        let series = prices(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let signals = strategy.generate(&series).unwrap();
        assert!(signals.signals().iter().all(|s| *s == Signal::Flat));
    }
}
