pub mod backtest;
pub mod error;
pub mod models;
pub mod stats;
pub mod strategies;
pub mod uniformity;

pub use error::{DrawError, Result};
pub use models::{Category, DrawSequence};
pub use stats::{Recency, SequenceStats, StatsAccumulator};
