use quantbt_core::error::ensure_nonzero;
use quantbt_core::{BacktestError, PriceSeries, Result, Signal, SignalSeries};
use serde::{Deserialize, Serialize};

use crate::hysteresis::{HysteresisMachine, Trigger};
use crate::indicators::{diff, fill, rolling_mean};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecondDerivativeParams {
    pub window: usize,
    pub threshold: f64,
}

impl Default for SecondDerivativeParams {
    fn default() -> Self {
        Self {
            window: 50,
            threshold: 0.1,
        }
    }
}

/// Trades the curvature of a moving average.
///
/// Long when the second difference of the average exceeds `threshold`, flat
/// when it drops below `-threshold`, otherwise unchanged. The first two bars
/// have no second difference and keep the starting flat state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SecondDerivativeMa {
    window: usize,
    threshold: f64,
}

impl SecondDerivativeMa {
    /// # Errors
    ///
    /// Returns `BacktestError::Config` unless `window > 0` and `threshold` is
    /// finite and non-negative.
    pub fn new(params: SecondDerivativeParams) -> Result<Self> {
        ensure_nonzero("window", params.window)?;
        if !(params.threshold.is_finite() && params.threshold >= 0.0) {
            return Err(BacktestError::config(format!(
                "threshold must be finite and >= 0, got {}",
                params.threshold
            )));
        }
        Ok(Self {
            window: params.window,
            threshold: params.threshold,
        })
    }

    #[must_use]
    pub fn trigger(&self, second_derivative: Option<f64>) -> Trigger {
        match second_derivative {
            Some(d) => Trigger::from_conditions(d > self.threshold, d < -self.threshold),
            None => Trigger::Hold,
        }
    }

    /// # Errors
    ///
    /// Only fails if the internal columns end up misaligned.
    pub fn generate(&self, prices: &PriceSeries) -> Result<SignalSeries> {
        let ma = rolling_mean(&prices.closes(), self.window, 1);
        let second = diff(&diff(&ma));

        let mut machine = HysteresisMachine::new();
        let signals: Vec<Signal> = second
            .iter()
            .map(|d| machine.step(self.trigger(*d)))
            .collect();

        SignalSeries::from_signals(&prices.dates(), &signals)?
            .with_indicator("ma", fill(&ma, f64::NAN))?
            .with_indicator("second_derivative", fill(&second, f64::NAN))
    }
}
