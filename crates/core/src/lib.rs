pub mod constants;
pub mod error;
pub mod options;
pub mod portfolio;
pub mod series;
pub mod signal;
pub mod traits;

pub use error::{BacktestError, Result};
pub use options::{OptionChainSnapshot, OptionQuote, OptionSide, OptionTable};
pub use portfolio::{PortfolioRow, PortfolioState};
pub use series::{Bar, PriceSeries, ReturnSeries};
pub use signal::{Signal, SignalPoint, SignalSeries};
pub use traits::{OptionChainProvider, PriceProvider};
