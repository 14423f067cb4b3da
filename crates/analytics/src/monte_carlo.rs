//! Monte Carlo Value-at-Risk by bootstrap resampling of daily returns.
//!
//! Each path draws `horizon` returns with replacement from the historical
//! sample and compounds them from the starting value. Paths run on the rayon
//! pool; every path owns a ChaCha stream derived from one base seed and its
//! path index, so a seeded run gives identical results however the paths are
//! scheduled.
//!
//! # Example
//!
//! ```
//! use quantbt_analytics::monte_carlo::{MonteCarloConfig, MonteCarloSimulator};
//!
//! let config = MonteCarloConfig::default().with_simulations(200).with_seed(7);
//! let simulator = MonteCarloSimulator::new(config).unwrap();
//! let results = simulator.simulate(&[0.01, -0.005, 0.002], 10_000.0).unwrap();
//! assert!(results.cvar <= results.var);
//! ```

use quantbt_core::error::{ensure_nonzero, ensure_unit_interval};
use quantbt_core::{BacktestError, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::stats::{mean, percentile_sorted, variance};

/// Configuration for Monte Carlo simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonteCarloConfig {
    /// Number of simulated paths.
    pub num_simulations: usize,
    /// Trading days per path.
    pub horizon: usize,
    /// VaR confidence, e.g. 0.95 reports the 5th percentile.
    pub confidence_level: f64,
    /// Optional seed for reproducible results.
    pub seed: Option<u64>,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            num_simulations: 1_000,
            horizon: 252,
            confidence_level: 0.95,
            seed: None,
        }
    }
}

impl MonteCarloConfig {
    #[must_use]
    pub fn with_simulations(mut self, num_simulations: usize) -> Self {
        self.num_simulations = num_simulations;
        self
    }

    #[must_use]
    pub fn with_horizon(mut self, horizon: usize) -> Self {
        self.horizon = horizon;
        self
    }

    #[must_use]
    pub fn with_confidence(mut self, confidence_level: f64) -> Self {
        self.confidence_level = confidence_level;
        self
    }

    /// Sets a seed for reproducible simulations.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// # Errors
    ///
    /// Returns `BacktestError::Config` for zero paths or horizon, or a
    /// confidence level outside (0, 1).
    pub fn validate(&self) -> Result<()> {
        ensure_nonzero("num_simulations", self.num_simulations)?;
        ensure_nonzero("horizon", self.horizon)?;
        ensure_unit_interval("confidence_level", self.confidence_level)
    }
}

/// Summary statistics for a distribution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionSummary {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    /// Key percentiles (5th, 10th, 25th, 50th, 75th, 90th, 95th).
    pub percentiles: Vec<(f64, f64)>,
}

impl DistributionSummary {
    /// Creates a summary from a slice of values; all fields are `NaN` when
    /// `values` is empty.
    #[must_use]
    pub fn from_values(values: &[f64]) -> Self {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let percentiles = [0.05, 0.10, 0.25, 0.50, 0.75, 0.90, 0.95]
            .iter()
            .map(|&q| (q, percentile_sorted(&sorted, q)))
            .collect();

        Self {
            min: sorted.first().copied().unwrap_or(f64::NAN),
            max: sorted.last().copied().unwrap_or(f64::NAN),
            mean: mean(&sorted),
            median: percentile_sorted(&sorted, 0.5),
            std_dev: variance(&sorted, 0).sqrt(),
            percentiles,
        }
    }
}

/// Results from Monte Carlo simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloResults {
    /// Terminal value of each path, in path order.
    pub terminal_values: Vec<f64>,
    pub initial_value: f64,
    pub confidence_level: f64,
    /// The `(1 - confidence)` percentile of terminal values.
    pub var: f64,
    /// Mean of terminal values at or below `var`.
    pub cvar: f64,
    pub distribution: DistributionSummary,
}

impl MonteCarloResults {
    /// Share of paths ending strictly below `threshold`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn prob_below(&self, threshold: f64) -> f64 {
        let below = self.terminal_values.iter().filter(|v| **v < threshold).count();
        below as f64 / self.terminal_values.len() as f64
    }
}

/// `(VaR, CVaR)` of `values` at `confidence_level`.
///
/// `NaN` for both when `values` is empty.
#[must_use]
pub fn var_cvar(values: &[f64], confidence_level: f64) -> (f64, f64) {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let var = percentile_sorted(&sorted, 1.0 - confidence_level);
    let tail: Vec<f64> = sorted.iter().copied().take_while(|v| *v <= var).collect();
    (var, mean(&tail))
}

/// Monte Carlo simulator over a historical return sample.
#[derive(Debug, Clone)]
pub struct MonteCarloSimulator {
    config: MonteCarloConfig,
}

impl MonteCarloSimulator {
    /// # Errors
    ///
    /// Returns `BacktestError::Config` if the configuration is out of range.
    pub fn new(config: MonteCarloConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    #[must_use]
    pub fn config(&self) -> &MonteCarloConfig {
        &self.config
    }

    /// Compounds one resampled path from `initial_value`.
    pub fn simulate_path(&self, sample: &[f64], initial_value: f64, rng: &mut ChaCha8Rng) -> f64 {
        let growth = (0..self.config.horizon).fold(1.0, |acc, _| {
            acc * (1.0 + sample[rng.gen_range(0..sample.len())])
        });
        initial_value * growth
    }

    /// Runs every path and summarizes terminal values.
    ///
    /// Non-finite returns are dropped from the sample. `initial_value` may be
    /// zero or negative: a portfolio that lost everything is still analyzed.
    ///
    /// # Errors
    ///
    /// Returns `BacktestError::Data` if no finite returns remain or
    /// `initial_value` is NaN or infinite.
    pub fn simulate(&self, returns: &[f64], initial_value: f64) -> Result<MonteCarloResults> {
        if !initial_value.is_finite() {
            return Err(BacktestError::data(format!(
                "initial_value must be finite, got {initial_value}"
            )));
        }
        let sample: Vec<f64> = returns.iter().copied().filter(|r| r.is_finite()).collect();
        if sample.is_empty() {
            return Err(BacktestError::data(
                "Monte Carlo needs at least one finite historical return",
            ));
        }

        let base_seed = self
            .config
            .seed
            .unwrap_or_else(|| ChaCha8Rng::from_entropy().gen());

        let terminal_values: Vec<f64> = (0..self.config.num_simulations)
            .into_par_iter()
            .map(|path| {
                let mut rng = ChaCha8Rng::seed_from_u64(base_seed);
                rng.set_stream(path as u64);
                self.simulate_path(&sample, initial_value, &mut rng)
            })
            .collect();

        let (var, cvar) = var_cvar(&terminal_values, self.config.confidence_level);
        let distribution = DistributionSummary::from_values(&terminal_values);

        tracing::debug!(
            paths = self.config.num_simulations,
            horizon = self.config.horizon,
            sample = sample.len(),
            var,
            cvar,
            "Monte Carlo simulation complete"
        );

        Ok(MonteCarloResults {
            terminal_values,
            initial_value,
            confidence_level: self.config.confidence_level,
            var,
            cvar,
            distribution,
        })
    }
}
