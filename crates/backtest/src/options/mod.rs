//! Option-writing portfolio simulations.
//!
//! Every variant matches quotes by nearest strike against the nearest
//! expiration offered by an [`OptionChainProvider`]. Settlement looks
//! `holding_period` bars ahead, falling back to the writing bar's close when
//! that runs past the series.
//!
//! The Wheel steps every bar. Credit spreads and iron condors step in
//! [`Block`]s of `holding_period` bars and record the block's cash on every
//! bar it covers.

pub mod blocks;
pub mod credit_spread;
pub mod iron_condor;
pub mod wheel;

pub use blocks::{expiry_index, Block, BlockIter};
pub use credit_spread::CreditSpreadParams;
pub use iron_condor::{CondorLegs, IronCondorParams};
pub use wheel::{WheelParams, WheelState};

use quantbt_core::error::ensure_positive;
use quantbt_core::{
    BacktestError, OptionChainProvider, OptionChainSnapshot, PortfolioState, PriceSeries, Result,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OptionsStrategy {
    Wheel(WheelParams),
    CreditSpread(CreditSpreadParams),
    IronCondor(IronCondorParams),
}

impl OptionsStrategy {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Wheel(_) => "Wheel Strategy",
            Self::CreditSpread(_) => "Credit Spreads",
            Self::IronCondor(_) => "Iron Condors",
        }
    }

    /// # Errors
    ///
    /// Returns `BacktestError::Config` if the variant's parameters are out of range.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Wheel(p) => p.validate(),
            Self::CreditSpread(p) => p.validate(),
            Self::IronCondor(p) => p.validate(),
        }
    }

    /// Runs the strategy against the nearest expiration in `chain`.
    ///
    /// # Errors
    ///
    /// Returns:
    /// - `BacktestError::Config` for invalid parameters or capital
    /// - `BacktestError::Simulation` if the provider has no expirations or a
    ///   required quote table is empty
    pub fn simulate(
        &self,
        prices: &PriceSeries,
        chain: &dyn OptionChainProvider,
        initial_capital: f64,
    ) -> Result<PortfolioState> {
        self.validate()?;
        ensure_positive("initial_capital", initial_capital)?;
        let snapshot = nearest_snapshot(chain)?;

        tracing::info!(
            strategy = self.name(),
            expiration = %snapshot.expiration,
            puts = snapshot.puts.len(),
            calls = snapshot.calls.len(),
            "Running options simulation"
        );

        match self {
            Self::Wheel(p) => wheel::simulate(p, prices, &snapshot, initial_capital),
            Self::CreditSpread(p) => credit_spread::simulate(p, prices, &snapshot, initial_capital),
            Self::IronCondor(p) => iron_condor::simulate(p, prices, &snapshot, initial_capital),
        }
    }
}

/// Snapshot for the first expiration the provider lists.
///
/// # Errors
///
/// Returns `BacktestError::Simulation` if no expirations are available.
pub fn nearest_snapshot(chain: &dyn OptionChainProvider) -> Result<OptionChainSnapshot> {
    let expiration = chain
        .expirations()
        .first()
        .copied()
        .ok_or_else(|| BacktestError::simulation("no option expirations available"))?;
    chain.snapshot(expiration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_provider::StaticOptionChain;
    use crate::test_support::{chain, prices};

    #[test]
    fn no_expirations_is_a_simulation_error() {
        let empty = StaticOptionChain::default();
        let p = prices(&[100.0, 101.0]);
        for strategy in [
            OptionsStrategy::Wheel(WheelParams::default()),
            OptionsStrategy::CreditSpread(CreditSpreadParams::default()),
            OptionsStrategy::IronCondor(IronCondorParams::default()),
        ] {
            assert!(matches!(
                strategy.simulate(&p, &empty, 10_000.0),
                Err(BacktestError::Simulation(_))
            ));
        }
    }

    #[test]
    fn empty_table_is_a_simulation_error() {
        let provider = chain(&[], &[(105.0, 1.0)]);
        let p = prices(&[100.0, 101.0]);
        let strategy = OptionsStrategy::CreditSpread(CreditSpreadParams::default());
        assert!(matches!(
            strategy.simulate(&p, &provider, 10_000.0),
            Err(BacktestError::Simulation(_))
        ));
    }

    #[test]
    fn invalid_parameters_fail_before_lookup() {
        let empty = StaticOptionChain::default();
        let p = prices(&[100.0]);
        let strategy = OptionsStrategy::IronCondor(IronCondorParams {
            holding_period: 0,
            ..IronCondorParams::default()
        });
        assert!(matches!(
            strategy.simulate(&p, &empty, 10_000.0),
            Err(BacktestError::Config(_))
        ));
    }

    #[test]
    fn every_variant_covers_every_bar() {
        let provider = chain(&[(95.0, 1.0), (90.0, 0.5)], &[(105.0, 1.0), (110.0, 0.5)]);
        let p = prices(&[100.0, 102.0, 97.0, 99.0, 104.0, 101.0, 100.0, 98.0]);
        for strategy in [
            OptionsStrategy::Wheel(WheelParams::default()),
            OptionsStrategy::CreditSpread(CreditSpreadParams {
                holding_period: 3,
                ..CreditSpreadParams::default()
            }),
            OptionsStrategy::IronCondor(IronCondorParams::default()),
        ] {
            let state = strategy.simulate(&p, &provider, 50_000.0).unwrap();
            assert_eq!(state.dates(), p.dates(), "{}", strategy.name());
        }
    }

    #[test]
    fn deserializes_tagged_config() {
        let json = r#"{"kind":"iron_condor","holding_period":10}"#;
        let strategy: OptionsStrategy = serde_json::from_str(json).unwrap();
        match strategy {
            OptionsStrategy::IronCondor(p) => {
                assert_eq!(p.holding_period, 10);
                assert_eq!(p.inner_put_offset, 0.02);
            }
            other => panic!("unexpected variant {other:?}"),
        }
    }
}
