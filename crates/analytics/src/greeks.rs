//! Black-Scholes pricing and Greeks for European options.

use quantbt_core::constants::CALENDAR_DAYS_PER_YEAR;
use quantbt_core::error::ensure_positive;
use quantbt_core::{BacktestError, OptionSide, Result};
use serde::{Deserialize, Serialize};
use statrs::function::erf::erfc;

/// Standard normal CDF.
#[must_use]
pub fn normal_cdf(x: f64) -> f64 {
    0.5 * erfc(-x / std::f64::consts::SQRT_2)
}

/// Standard normal density.
#[must_use]
pub fn normal_pdf(x: f64) -> f64 {
    (-0.5 * x * x).exp() / (2.0 * std::f64::consts::PI).sqrt()
}

/// Scalar pricing inputs; time in years, rate and volatility annualized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlackScholes {
    pub spot: f64,
    pub strike: f64,
    pub time: f64,
    pub rate: f64,
    pub volatility: f64,
}

/// Sensitivities of the option price.
///
/// Theta is per calendar day and vega per one volatility point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Greeks {
    pub delta: f64,
    pub gamma: f64,
    pub theta: f64,
    pub vega: f64,
}

impl BlackScholes {
    /// # Errors
    ///
    /// Returns `BacktestError::Config` unless spot, strike, time and
    /// volatility are positive and the rate is finite.
    pub fn new(spot: f64, strike: f64, time: f64, rate: f64, volatility: f64) -> Result<Self> {
        ensure_positive("spot", spot)?;
        ensure_positive("strike", strike)?;
        ensure_positive("time", time)?;
        ensure_positive("volatility", volatility)?;
        if !rate.is_finite() {
            return Err(BacktestError::config(format!("rate must be finite, got {rate}")));
        }
        Ok(Self {
            spot,
            strike,
            time,
            rate,
            volatility,
        })
    }

    fn vol_sqrt_t(&self) -> f64 {
        self.volatility * self.time.sqrt()
    }

    #[must_use]
    pub fn d1(&self) -> f64 {
        ((self.spot / self.strike).ln()
            + (self.rate + 0.5 * self.volatility.powi(2)) * self.time)
            / self.vol_sqrt_t()
    }

    #[must_use]
    pub fn d2(&self) -> f64 {
        self.d1() - self.vol_sqrt_t()
    }

    fn discounted_strike(&self) -> f64 {
        self.strike * (-self.rate * self.time).exp()
    }

    /// Theoretical option value.
    #[must_use]
    pub fn price(&self, side: OptionSide) -> f64 {
        let (d1, d2) = (self.d1(), self.d2());
        match side {
            OptionSide::Call => {
                self.spot * normal_cdf(d1) - self.discounted_strike() * normal_cdf(d2)
            }
            OptionSide::Put => {
                self.discounted_strike() * normal_cdf(-d2) - self.spot * normal_cdf(-d1)
            }
        }
    }

    #[must_use]
    pub fn greeks(&self, side: OptionSide) -> Greeks {
        let (d1, d2) = (self.d1(), self.d2());
        let pdf = normal_pdf(d1);
        let sqrt_t = self.time.sqrt();
        let decay = -self.spot * pdf * self.volatility / (2.0 * sqrt_t);
        let carry = self.rate * self.discounted_strike();

        let (delta, theta) = match side {
            OptionSide::Call => (normal_cdf(d1), decay - carry * normal_cdf(d2)),
            OptionSide::Put => (normal_cdf(d1) - 1.0, decay + carry * normal_cdf(-d2)),
        };

        Greeks {
            delta,
            gamma: pdf / (self.spot * self.volatility * sqrt_t),
            theta: theta / CALENDAR_DAYS_PER_YEAR,
            vega: self.spot * pdf * sqrt_t / 100.0,
        }
    }
}
