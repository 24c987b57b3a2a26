//! Per-bar decision engine.
//!
//! One call = one trading tick = at most one action. Entry signals are
//! evaluated first (bullish, then bearish); only when no entry opens are
//! the existing entries managed.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::domain::action::TradeAction;
use crate::domain::error::CrosstraderError;
use crate::domain::indicator::{compute_indicators, required_history};
use crate::domain::ledger::PositionLedger;
use crate::domain::ohlcv::{OhlcvBar, closes};
use crate::domain::params::StrategyParams;
use crate::domain::position::{Entry, Side};
use crate::domain::signal::{CrossoverWindow, Signal};

/// Strategy parameters plus the position ledger. Serializes to a flat
/// record: `params`, `long_entries`, `short_entries`,
/// `completed_long_trades`, `completed_short_trades`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyState {
    pub params: StrategyParams,
    #[serde(flatten)]
    pub ledger: PositionLedger,
}

/// Outcome of one tick: the action emitted (if any) and the state after it.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub action: Option<TradeAction>,
    pub state: StrategyState,
}

impl StrategyState {
    /// Build a flat state after validating the parameters.
    pub fn new(params: StrategyParams) -> Result<Self, CrosstraderError> {
        params.validate()?;
        Ok(StrategyState {
            params,
            ledger: PositionLedger::new(),
        })
    }

    /// Consume the state, decide on the latest bar and hand back the
    /// updated state alongside the action.
    pub fn decide(mut self, bars: &[OhlcvBar], account_equity: f64, cash: f64) -> Decision {
        let action = self.process_bar(bars, account_equity, cash);
        Decision {
            action,
            state: self,
        }
    }

    /// Only the trailing `required_history` bars are read, so a bad close
    /// further back does not block the tick.
    pub fn process_bar(
        &mut self,
        bars: &[OhlcvBar],
        account_equity: f64,
        cash: f64,
    ) -> Option<TradeAction> {
        let tail = &bars[bars.len().saturating_sub(self.required_history())..];
        if let Some(bad) = tail.iter().find(|b| !b.has_valid_close()) {
            warn!(timestamp = %bad.timestamp, "non-finite close in decision window");
            return None;
        }
        self.process_closes(&closes(tail), account_equity, cash)
    }

    /// Decide on the last close of `closes`, mutating the ledger to match
    /// the returned action.
    pub fn process_closes(
        &mut self,
        closes: &[f64],
        account_equity: f64,
        cash: f64,
    ) -> Option<TradeAction> {
        let needed = self.required_history();
        if closes.len() < needed {
            debug!(bars = closes.len(), needed, "insufficient history");
            return None;
        }

        let tail = &closes[closes.len() - needed..];
        if let Some(pos) = tail.iter().position(|c| !c.is_finite()) {
            warn!(index = closes.len() - needed + pos, "non-finite close in decision window");
            return None;
        }

        let price = tail[tail.len() - 1];
        if price <= 0.0 {
            warn!(price, "non-positive close");
            return None;
        }

        let indicators = compute_indicators(tail, self.params.ma_fast, self.params.ma_slow);
        let window = CrossoverWindow::from_series(tail, &indicators)?;
        debug!(
            fast = %indicators.fast.indicator_type,
            slow = %indicators.slow.indicator_type,
            fast_now = window.fast_now,
            slow_now = window.slow_now,
            long_now = window.long_now,
            "averages"
        );

        let notional = account_equity * self.params.buy_pct;
        match window.detect() {
            Some(Signal::Bullish) if notional > 0.0 && cash >= notional => {
                return Some(self.open_entry(Side::Long, price, notional));
            }
            Some(Signal::Bullish) => {
                debug!(buy_amount = notional, cash, "bullish crossover skipped: insufficient cash");
            }
            // Shorts are not gated on available cash.
            Some(Signal::Bearish) if notional > 0.0 => {
                return Some(self.open_entry(Side::Short, price, notional));
            }
            Some(Signal::Bearish) => {
                debug!(account_equity, "bearish crossover skipped: no equity");
            }
            None => {}
        }

        let action = self.ledger.manage(price, &self.params);
        match &action {
            Some(a) => info!(op = a.op(), size = a.size(), price, "exit triggered"),
            None => debug!(price, "no action"),
        }
        action
    }

    fn required_history(&self) -> usize {
        required_history(self.params.ma_fast, self.params.ma_slow)
    }

    fn open_entry(&mut self, side: Side, price: f64, notional: f64) -> TradeAction {
        let size = notional / price;
        self.ledger.open(side, Entry::new(price, size));
        info!(%side, size, price, notional, "opening entry");
        TradeAction::open(side, size, price, notional)
    }
}
