//! Market beta and the hedge suggestion derived from it.

use quantbt_core::ReturnSeries;
use serde::{Deserialize, Serialize};

use crate::stats::sample_covariance;

/// `cov(strategy, market) / var(market)` over the dates both series share.
///
/// Numerator and denominator use the same (n − 1) normalization, so a series
/// against itself has a beta of exactly 1. `NaN` with fewer than two common
/// dates or a constant market.
#[must_use]
pub fn beta(strategy: &ReturnSeries, market: &ReturnSeries) -> f64 {
    let pairs = strategy.align(market);
    if pairs.len() < 2 {
        return f64::NAN;
    }
    let market_pairs: Vec<(f64, f64)> = pairs.iter().map(|&(_, m)| (m, m)).collect();
    let variance = sample_covariance(&market_pairs);
    if variance == 0.0 {
        return f64::NAN;
    }
    sample_covariance(&pairs) / variance
}

/// How the portfolio moves relative to the benchmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HedgeSuggestion {
    /// Beta above 1: more volatile than the market.
    HedgeWithIndexPuts,
    /// Beta below 1.
    LessVolatileThanMarket,
    /// Beta of exactly 1.
    MarketLike,
}

impl HedgeSuggestion {
    /// `None` when beta is undefined.
    #[must_use]
    pub fn from_beta(beta: f64) -> Option<Self> {
        if beta.is_nan() {
            None
        } else if beta > 1.0 {
            Some(Self::HedgeWithIndexPuts)
        } else if beta < 1.0 {
            Some(Self::LessVolatileThanMarket)
        } else {
            Some(Self::MarketLike)
        }
    }

    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::HedgeWithIndexPuts => {
                "The portfolio is more volatile than the market. Consider hedging with index put options or other risk reduction strategies."
            }
            Self::LessVolatileThanMarket => "The portfolio is less volatile than the market.",
            Self::MarketLike => "The portfolio beta is around 1, similar to the market.",
        }
    }
}

impl std::fmt::Display for HedgeSuggestion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}
