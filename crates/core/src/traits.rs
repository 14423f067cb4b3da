use chrono::NaiveDate;

use crate::error::Result;
use crate::options::OptionChainSnapshot;
use crate::series::PriceSeries;

/// Source of historical daily prices.
pub trait PriceProvider {
    /// # Errors
    ///
    /// Returns `BacktestError::Data` if no usable bars are available.
    fn fetch(&self) -> Result<PriceSeries>;
}

/// Source of option-chain snapshots.
pub trait OptionChainProvider {
    /// Available expirations, nearest first.
    fn expirations(&self) -> Vec<NaiveDate>;

    /// # Errors
    ///
    /// Returns `BacktestError::Simulation` if `expiration` is not available.
    fn snapshot(&self, expiration: NaiveDate) -> Result<OptionChainSnapshot>;
}
