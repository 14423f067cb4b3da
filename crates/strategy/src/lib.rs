pub mod bollinger;
pub mod generator;
pub mod hysteresis;
pub mod indicators;
pub mod rsi;
pub mod second_derivative;
pub mod sma_crossover;

#[cfg(test)]
mod test_support;

pub use bollinger::{BollingerBands, BollingerParams};
pub use generator::{SignalGenerator, StrategyConfig};
pub use hysteresis::{HysteresisMachine, Trigger};
pub use rsi::{Rsi, RsiParams};
pub use second_derivative::{SecondDerivativeMa, SecondDerivativeParams};
pub use sma_crossover::{SmaCrossover, SmaCrossoverParams};
