use quantbt_core::error::{ensure_nonzero, ensure_positive};
use quantbt_core::{PriceSeries, Result, Signal, SignalSeries};
use serde::{Deserialize, Serialize};

use crate::hysteresis::{HysteresisMachine, Trigger};
use crate::indicators::{fill, rolling_mean, rolling_std};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BollingerParams {
    pub window: usize,
    pub std_multiplier: f64,
}

impl Default for BollingerParams {
    fn default() -> Self {
        Self {
            window: 20,
            std_multiplier: 2.0,
        }
    }
}

/// Band-reversion strategy with hysteresis.
///
/// Goes long when the close drops below the lower band and flat when it rises
/// above the upper band. Inside the bands, or while the bands are undefined on
/// the first bar, the previous state is kept.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BollingerBands {
    window: usize,
    std_multiplier: f64,
}

impl BollingerBands {
    /// # Errors
    ///
    /// Returns `BacktestError::Config` unless `window > 0` and `std_multiplier > 0`.
    pub fn new(params: BollingerParams) -> Result<Self> {
        ensure_nonzero("window", params.window)?;
        ensure_positive("std_multiplier", params.std_multiplier)?;
        Ok(Self {
            window: params.window,
            std_multiplier: params.std_multiplier,
        })
    }

    /// Trigger for one bar given its close and the bands around it.
    #[must_use]
    pub fn trigger(price: f64, lower: Option<f64>, upper: Option<f64>) -> Trigger {
        match (lower, upper) {
            (Some(lower), Some(upper)) => Trigger::from_conditions(price < lower, price > upper),
            _ => Trigger::Hold,
        }
    }

    /// # Errors
    ///
    /// Only fails if the internal columns end up misaligned.
    pub fn generate(&self, prices: &PriceSeries) -> Result<SignalSeries> {
        let closes = prices.closes();
        let mean = rolling_mean(&closes, self.window, 1);
        let std = rolling_std(&closes, self.window, 1);

        let bands: Vec<(Option<f64>, Option<f64>)> = mean
            .iter()
            .zip(&std)
            .map(|(m, s)| match (m, s) {
                (Some(m), Some(s)) => (
                    Some(m - self.std_multiplier * s),
                    Some(m + self.std_multiplier * s),
                ),
                _ => (None, None),
            })
            .collect();

        let mut machine = HysteresisMachine::new();
        let signals: Vec<Signal> = closes
            .iter()
            .zip(&bands)
            .map(|(&price, &(lower, upper))| machine.step(Self::trigger(price, lower, upper)))
            .collect();

        let lower: Vec<Option<f64>> = bands.iter().map(|b| b.0).collect();
        let upper: Vec<Option<f64>> = bands.iter().map(|b| b.1).collect();

        SignalSeries::from_signals(&prices.dates(), &signals)?
            .with_indicator("rolling_mean", fill(&mean, f64::NAN))?
            .with_indicator("lower_band", fill(&lower, f64::NAN))?
            .with_indicator("upper_band", fill(&upper, f64::NAN))
    }
}
