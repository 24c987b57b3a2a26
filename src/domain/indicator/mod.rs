//! Moving-average indicators over a closing-price series.
//!
//! - `IndicatorPoint`: one point of a series, `valid` is false during warmup
//! - `IndicatorType`: indicator identity + window length
//! - `IndicatorSeries`: a series aligned index-for-index with the input closes
//! - `IndicatorSet`: the fast, slow and long-context averages the engine reads

pub mod sma;

use std::fmt;

/// Fixed window of the long-context average used to confirm crossovers.
pub const LONG_CONTEXT_WINDOW: usize = 120;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorPoint {
    pub valid: bool,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
}

#[derive(Debug, Clone)]
pub struct IndicatorSeries {
    pub indicator_type: IndicatorType,
    pub values: Vec<IndicatorPoint>,
}

impl IndicatorSeries {
    /// Value at `idx`, or `None` when out of range or still warming up.
    pub fn value_at(&self, idx: usize) -> Option<f64> {
        self.values
            .get(idx)
            .filter(|p| p.valid)
            .map(|p| p.value)
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
        }
    }
}

/// The three averages the crossover detector needs.
#[derive(Debug, Clone)]
pub struct IndicatorSet {
    pub fast: IndicatorSeries,
    pub slow: IndicatorSeries,
    pub long: IndicatorSeries,
}

/// Number of closes required before a decision can be made: the widest
/// window plus one extra bar for the previous-bar comparison.
pub fn required_history(ma_fast: usize, ma_slow: usize) -> usize {
    ma_fast.max(ma_slow).max(LONG_CONTEXT_WINDOW) + 1
}

pub fn compute_indicators(closes: &[f64], ma_fast: usize, ma_slow: usize) -> IndicatorSet {
    IndicatorSet {
        fast: sma::calculate_sma(closes, ma_fast),
        slow: sma::calculate_sma(closes, ma_slow),
        long: sma::calculate_sma(closes, LONG_CONTEXT_WINDOW),
    }
}
