use thiserror::Error;

use crate::models::Category;

/// Failures reported by the statistics, uniformity and backtest routines.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DrawError {
    #[error("Division by zero: statistics need at least one draw")]
    DivisionByZero,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid distribution: {0}")]
    InvalidDistribution(String),

    #[error("Invalid range: start index {start} (gap {gap}) outside 1..={max} for {len} draws")]
    InvalidRange {
        start: usize,
        gap: usize,
        max: isize,
        len: usize,
    },

    #[error("Undefined statistic: category {0} never drawn in this history")]
    UndefinedStatistic(Category),
}

pub type Result<T> = std::result::Result<T, DrawError>;
