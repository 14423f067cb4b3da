//! Portfolio simulation for stock and option strategies.

pub mod benchmark;
pub mod data_provider;
pub mod options;
pub mod portfolio;

#[cfg(test)]
mod test_support;

pub use benchmark::buy_and_hold;
pub use data_provider::{CsvOptionChain, CsvPriceProvider, StaticOptionChain};
pub use options::{
    Block, BlockIter, CreditSpreadParams, IronCondorParams, OptionsStrategy, WheelParams,
    WheelState,
};
pub use portfolio::{ExitReason, ExitRules, PortfolioSimulator, TradeState};
