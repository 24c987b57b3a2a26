//! Position ledger: open long/short entries and completed-trade counters.
//!
//! Management scans run newest-entry-first over longs, then shorts, and stop
//! at the first triggered rule so that at most one exit is emitted per bar.

use serde::{Deserialize, Serialize};

use crate::domain::action::TradeAction;
use crate::domain::params::StrategyParams;
use crate::domain::position::{Entry, Side};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionLedger {
    #[serde(default)]
    pub long_entries: Vec<Entry>,
    #[serde(default)]
    pub short_entries: Vec<Entry>,
    #[serde(default)]
    pub completed_long_trades: u64,
    #[serde(default)]
    pub completed_short_trades: u64,
}

impl PositionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self, side: Side) -> &[Entry] {
        match side {
            Side::Long => &self.long_entries,
            Side::Short => &self.short_entries,
        }
    }

    pub fn completed_trades(&self, side: Side) -> u64 {
        match side {
            Side::Long => self.completed_long_trades,
            Side::Short => self.completed_short_trades,
        }
    }

    /// Total remaining base-asset quantity on one side.
    pub fn open_size(&self, side: Side) -> f64 {
        self.entries(side).iter().map(|e| e.size).sum()
    }

    pub fn is_flat(&self) -> bool {
        self.long_entries.is_empty() && self.short_entries.is_empty()
    }

    /// Append a new entry; it becomes the first one managed on later bars.
    pub fn open(&mut self, side: Side, entry: Entry) {
        match side {
            Side::Long => self.long_entries.push(entry),
            Side::Short => self.short_entries.push(entry),
        }
    }

    /// Replace one side's entries, keeping the completed-trade counters.
    pub fn replace_entries(&mut self, side: Side, entries: Vec<Entry>) {
        match side {
            Side::Long => self.long_entries = entries,
            Side::Short => self.short_entries = entries,
        }
    }

    /// Apply the take-profit and stop-loss rules at `price`, longs first.
    /// Returns the first triggered action, mutating only the entry it touched.
    pub fn manage(&mut self, price: f64, params: &StrategyParams) -> Option<TradeAction> {
        self.manage_side(Side::Long, price, params)
            .or_else(|| self.manage_side(Side::Short, price, params))
    }

    fn manage_side(
        &mut self,
        side: Side,
        price: f64,
        params: &StrategyParams,
    ) -> Option<TradeAction> {
        let (entries, completed) = match side {
            Side::Long => (&mut self.long_entries, &mut self.completed_long_trades),
            Side::Short => (&mut self.short_entries, &mut self.completed_short_trades),
        };

        for i in (0..entries.len()).rev() {
            let entry = &mut entries[i];

            if entry.should_take_profit_1(side, price, params.tp1_pct) {
                let closed = entry.take_partial(params.tp1_sell_prop);
                if !entry.is_open() {
                    entries.remove(i);
                }
                return Some(TradeAction::tp1(side, closed, price));
            }

            if entry.should_stop_loss(side, price, params.sl_pct) {
                let removed = entries.remove(i);
                return Some(TradeAction::stop_loss(side, removed.size, price));
            }

            if entry.should_take_profit_2(side, price, params.tp2_pct) {
                let removed = entries.remove(i);
                *completed += 1;
                return Some(TradeAction::tp2(side, removed.size, price));
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn params() -> StrategyParams {
        StrategyParams::default()
    }

    fn entry(price: f64, size: f64, tp1_done: bool) -> Entry {
        Entry {
            price,
            size,
            tp1_done,
        }
    }

    #[test]
    fn empty_ledger_does_nothing() {
        let mut ledger = PositionLedger::new();
        assert_eq!(ledger.manage(100.0, &params()), None);
        assert!(ledger.is_flat());
    }

    #[test]
    fn tp1_partial_close() {
        let mut ledger = PositionLedger::new();
        ledger.open(Side::Long, entry(100.0, 1.0, false));

        let action = ledger.manage(108.0, &params()).unwrap();
        assert_eq!(action.op(), "tp1_long");
        assert_relative_eq!(action.size(), 0.9, epsilon = 1e-12);
        assert_relative_eq!(ledger.long_entries[0].size, 0.1, epsilon = 1e-12);
        assert!(ledger.long_entries[0].tp1_done);
        assert_eq!(ledger.completed_long_trades, 0);
    }

    #[test]
    fn tp1_with_full_proportion_removes_entry() {
        let mut ledger = PositionLedger::new();
        ledger.open(Side::Long, entry(100.0, 1.0, false));
        let p = StrategyParams {
            tp1_sell_prop: 1.0,
            ..params()
        };

        let action = ledger.manage(110.0, &p).unwrap();
        assert_eq!(action.op(), "tp1_long");
        assert_relative_eq!(action.size(), 1.0);
        assert!(ledger.long_entries.is_empty());
        assert_eq!(ledger.completed_long_trades, 0);
    }

    #[test]
    fn stop_loss_removes_without_counting() {
        let mut ledger = PositionLedger::new();
        ledger.open(Side::Long, entry(100.0, 0.4, true));

        let action = ledger.manage(82.0, &params()).unwrap();
        assert_eq!(action, TradeAction::SlLong { size: 0.4, price: 82.0 });
        assert!(ledger.long_entries.is_empty());
        assert_eq!(ledger.completed_long_trades, 0);
    }

    #[test]
    fn tp2_removes_and_counts() {
        let mut ledger = PositionLedger::new();
        ledger.open(Side::Long, entry(100.0, 0.1, true));

        let action = ledger.manage(114.0, &params()).unwrap();
        assert_eq!(action, TradeAction::Tp2Long { size: 0.1, price: 114.0 });
        assert!(ledger.long_entries.is_empty());
        assert_eq!(ledger.completed_long_trades, 1);
        assert_eq!(ledger.completed_short_trades, 0);
    }

    #[test]
    fn newest_entry_managed_first() {
        let mut ledger = PositionLedger::new();
        ledger.open(Side::Long, entry(90.0, 1.0, false));
        ledger.open(Side::Long, entry(100.0, 2.0, false));

        // both entries are past tier-1 at 110, only the newest is touched
        let action = ledger.manage(110.0, &params()).unwrap();
        assert_relative_eq!(action.size(), 1.8, epsilon = 1e-12);
        assert!(!ledger.long_entries[0].tp1_done);
        assert!(ledger.long_entries[1].tp1_done);

        // next bar reaches the older one
        let action = ledger.manage(110.0, &params()).unwrap();
        assert_relative_eq!(action.size(), 0.9, epsilon = 1e-12);
        assert!(ledger.long_entries[0].tp1_done);
    }

    #[test]
    fn older_entry_managed_when_newest_is_quiet() {
        let mut ledger = PositionLedger::new();
        ledger.open(Side::Long, entry(50.0, 1.0, true));
        ledger.open(Side::Long, entry(100.0, 1.0, false));

        // 105: newest has 5% (nothing), oldest has 110% with tp1 done
        let action = ledger.manage(105.0, &params()).unwrap();
        assert_eq!(action.op(), "tp2_long");
        assert_eq!(ledger.long_entries.len(), 1);
        assert_relative_eq!(ledger.long_entries[0].price, 100.0);
    }

    #[test]
    fn one_exit_per_call() {
        let mut ledger = PositionLedger::new();
        ledger.open(Side::Long, entry(100.0, 1.0, false));
        ledger.open(Side::Long, entry(101.0, 1.0, false));

        // both entries are below their stop, only the newest closes
        let action = ledger.manage(70.0, &params()).unwrap();
        assert_eq!(action.op(), "sl_long");
        assert_eq!(ledger.long_entries.len(), 1);
        assert_relative_eq!(ledger.long_entries[0].price, 100.0);
    }

    #[test]
    fn longs_scanned_before_shorts() {
        let mut ledger = PositionLedger::new();
        ledger.open(Side::Long, entry(80.0, 1.0, false));
        ledger.open(Side::Short, entry(120.0, 1.0, false));

        // long +25% and short +20%: the long wins this bar
        let action = ledger.manage(100.0, &params()).unwrap();
        assert_eq!(action.op(), "tp1_long");
        assert!(!ledger.short_entries[0].tp1_done);

        // the long is now past tier-2 and still has priority
        let action = ledger.manage(100.0, &params()).unwrap();
        assert_eq!(action.op(), "tp2_long");
        assert_eq!(ledger.completed_long_trades, 1);

        let action = ledger.manage(100.0, &params()).unwrap();
        assert_eq!(action.op(), "tp1_short");
        assert_eq!(action.order_side(), crate::domain::action::OrderSide::Buy);
    }

    #[test]
    fn short_stop_loss_and_tp2() {
        let mut ledger = PositionLedger::new();
        ledger.open(Side::Short, entry(100.0, 1.0, true));
        ledger.open(Side::Short, entry(50.0, 1.0, false));

        // at 80: newest short is -37.5% -> stopped out
        let action = ledger.manage(80.0, &params()).unwrap();
        assert_eq!(action.op(), "sl_short");
        assert_eq!(ledger.short_entries.len(), 1);
        assert_eq!(ledger.completed_short_trades, 0);

        // remaining short at +25% with tier-1 done -> tier-2
        let action = ledger.manage(80.0, &params()).unwrap();
        assert_eq!(action.op(), "tp2_short");
        assert!(ledger.short_entries.is_empty());
        assert_eq!(ledger.completed_short_trades, 1);
    }

    #[test]
    fn open_size_and_replace() {
        let mut ledger = PositionLedger::new();
        ledger.open(Side::Long, entry(100.0, 1.0, false));
        ledger.open(Side::Long, entry(110.0, 0.5, false));
        ledger.completed_long_trades = 3;
        assert_relative_eq!(ledger.open_size(Side::Long), 1.5);

        ledger.replace_entries(Side::Long, vec![entry(105.0, 1.5, true)]);
        assert_eq!(ledger.entries(Side::Long).len(), 1);
        assert_eq!(ledger.completed_trades(Side::Long), 3);
    }
}
