//! Signal series produced by the strategy generators.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{BacktestError, Result};

/// Binary position indicator for a bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Signal {
    #[default]
    Flat,
    Long,
}

impl Signal {
    /// 0 for flat, 1 for long.
    #[must_use]
    pub const fn as_i8(self) -> i8 {
        match self {
            Self::Flat => 0,
            Self::Long => 1,
        }
    }

    #[must_use]
    pub const fn as_f64(self) -> f64 {
        match self {
            Self::Flat => 0.0,
            Self::Long => 1.0,
        }
    }

    #[must_use]
    pub const fn is_long(self) -> bool {
        matches!(self, Self::Long)
    }

    #[must_use]
    pub const fn from_bool(long: bool) -> Self {
        if long {
            Self::Long
        } else {
            Self::Flat
        }
    }
}

/// One bar of a signal series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalPoint {
    pub date: NaiveDate,
    pub signal: Signal,
    /// `signal[t] - signal[t-1]`; 0 on the first bar.
    pub position_delta: i8,
}

/// Signals time-aligned with a price series, plus optional indicator columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalSeries {
    points: Vec<SignalPoint>,
    indicators: BTreeMap<String, Vec<f64>>,
}

impl SignalSeries {
    /// Builds the series, deriving `position_delta` as the first difference.
    ///
    /// # Errors
    ///
    /// Returns `BacktestError::Data` if `dates` and `signals` differ in length.
    pub fn from_signals(dates: &[NaiveDate], signals: &[Signal]) -> Result<Self> {
        if dates.len() != signals.len() {
            return Err(BacktestError::data(format!(
                "{} dates but {} signals",
                dates.len(),
                signals.len()
            )));
        }

        let points = dates
            .iter()
            .zip(signals)
            .enumerate()
            .map(|(t, (&date, &signal))| {
                let position_delta = if t == 0 {
                    0
                } else {
                    signal.as_i8() - signals[t - 1].as_i8()
                };
                SignalPoint {
                    date,
                    signal,
                    position_delta,
                }
            })
            .collect();

        Ok(Self {
            points,
            indicators: BTreeMap::new(),
        })
    }

    /// Attaches a named indicator column (moving average, RSI, band, ...).
    ///
    /// # Errors
    ///
    /// Returns `BacktestError::Data` if the column length differs from the series.
    pub fn with_indicator(mut self, name: &str, values: Vec<f64>) -> Result<Self> {
        if values.len() != self.points.len() {
            return Err(BacktestError::data(format!(
                "indicator {name} has {} values for {} bars",
                values.len(),
                self.points.len()
            )));
        }
        self.indicators.insert(name.to_string(), values);
        Ok(self)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub fn points(&self) -> &[SignalPoint] {
        &self.points
    }

    #[must_use]
    pub fn signals(&self) -> Vec<Signal> {
        self.points.iter().map(|p| p.signal).collect()
    }

    #[must_use]
    pub fn deltas(&self) -> Vec<i8> {
        self.points.iter().map(|p| p.position_delta).collect()
    }

    #[must_use]
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    #[must_use]
    pub fn indicator(&self, name: &str) -> Option<&[f64]> {
        self.indicators.get(name).map(Vec::as_slice)
    }

    pub fn indicator_names(&self) -> impl Iterator<Item = &str> {
        self.indicators.keys().map(String::as_str)
    }

    /// Number of flat-to-long transitions.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.points.iter().filter(|p| p.position_delta > 0).count()
    }
}
