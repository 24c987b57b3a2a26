//! Crossover signal detection on the two most recent bars.
//!
//! A bullish crossover requires the close to move from below both moving
//! averages on the previous bar to above both on the current bar, while
//! also sitting above the long-context average. Bearish is the mirror.

use crate::domain::indicator::IndicatorSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Bullish,
    Bearish,
}

/// Closes and averages at the previous and current bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrossoverWindow {
    pub price: f64,
    pub prev_price: f64,
    pub fast_now: f64,
    pub fast_prev: f64,
    pub slow_now: f64,
    pub slow_prev: f64,
    pub long_now: f64,
}

impl CrossoverWindow {
    /// Read the window ending at the last close. Returns `None` if the
    /// series is too short or any required average is still warming up.
    pub fn from_series(closes: &[f64], indicators: &IndicatorSet) -> Option<Self> {
        if closes.len() < 2 {
            return None;
        }
        let idx = closes.len() - 1;
        Some(CrossoverWindow {
            price: closes[idx],
            prev_price: closes[idx - 1],
            fast_now: indicators.fast.value_at(idx)?,
            fast_prev: indicators.fast.value_at(idx - 1)?,
            slow_now: indicators.slow.value_at(idx)?,
            slow_prev: indicators.slow.value_at(idx - 1)?,
            long_now: indicators.long.value_at(idx)?,
        })
    }

    pub fn is_bullish(&self) -> bool {
        self.price > 0.0
            && self.prev_price < self.fast_prev
            && self.price > self.fast_now
            && self.prev_price < self.slow_prev
            && self.price > self.slow_now
            && self.price > self.long_now
    }

    pub fn is_bearish(&self) -> bool {
        self.price > 0.0
            && self.prev_price > self.fast_prev
            && self.price < self.fast_now
            && self.prev_price > self.slow_prev
            && self.price < self.slow_now
            && self.price < self.long_now
    }

    /// Bullish takes priority when both would hold.
    pub fn detect(&self) -> Option<Signal> {
        if self.is_bullish() {
            Some(Signal::Bullish)
        } else if self.is_bearish() {
            Some(Signal::Bearish)
        } else {
            None
        }
    }
}
