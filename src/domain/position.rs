//! Open position lots and their per-side profit arithmetic.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Tolerance applied to threshold comparisons on fractional PnL, so that a
/// move of exactly `tp2_pct` is not missed because `114.0 / 100.0 - 1.0`
/// lands a few ulps under `0.14`.
pub const PCT_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Long,
    Short,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Long => write!(f, "long"),
            Side::Short => write!(f, "short"),
        }
    }
}

/// One open lot of a directional position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Entry fill price.
    pub price: f64,
    /// Remaining base-asset quantity.
    pub size: f64,
    pub tp1_done: bool,
}

impl Entry {
    pub fn new(price: f64, size: f64) -> Self {
        Entry {
            price,
            size,
            tp1_done: false,
        }
    }

    /// Fractional PnL at `price`: `price / entry - 1` for longs,
    /// `entry / price - 1` for shorts.
    pub fn pnl_pct(&self, side: Side, price: f64) -> f64 {
        match side {
            Side::Long => price / self.price - 1.0,
            Side::Short => self.price / price - 1.0,
        }
    }

    pub fn should_take_profit_1(&self, side: Side, price: f64, tp1_pct: f64) -> bool {
        !self.tp1_done && reaches(self.pnl_pct(side, price), tp1_pct)
    }

    pub fn should_stop_loss(&self, side: Side, price: f64, sl_pct: f64) -> bool {
        should_stop_loss(self.price, price, side, sl_pct)
    }

    pub fn should_take_profit_2(&self, side: Side, price: f64, tp2_pct: f64) -> bool {
        self.tp1_done && reaches(self.pnl_pct(side, price), tp2_pct)
    }

    /// Close `prop` of the remaining size, flag tier-1 as done and return
    /// the closed quantity.
    pub fn take_partial(&mut self, prop: f64) -> f64 {
        let closed = self.size * prop;
        self.tp1_done = true;
        self.size -= closed;
        closed
    }

    pub fn is_open(&self) -> bool {
        self.size > 0.0
    }
}

/// Stop-loss check using the same per-side PnL as the take-profit tiers.
/// A non-positive `sl_pct` disables the stop.
pub fn should_stop_loss(entry_price: f64, current_price: f64, side: Side, sl_pct: f64) -> bool {
    if sl_pct <= 0.0 {
        return false;
    }
    let pnl_pct = match side {
        Side::Long => current_price / entry_price - 1.0,
        Side::Short => entry_price / current_price - 1.0,
    };
    pnl_pct <= -sl_pct + PCT_EPSILON
}

fn reaches(pnl_pct: f64, threshold: f64) -> bool {
    pnl_pct >= threshold - PCT_EPSILON
}
