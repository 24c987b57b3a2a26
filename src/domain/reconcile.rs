//! Rebuild the position ledger from what the venue reports.
//!
//! The venue only knows aggregate positions, so each side collapses to at
//! most one entry. Whether that entry already took its tier-1 profit is
//! inferred from the fill history: any reduction since the position last
//! went from flat to open means tier-1 has happened.

use tracing::{debug, info};

use crate::domain::action::OrderSide;
use crate::domain::ledger::PositionLedger;
use crate::domain::order::MarketSpec;
use crate::domain::position::{Entry, Side};

/// Net quantities within this distance of zero count as flat.
const FLAT_EPSILON: f64 = 1e-12;

/// A position as reported by the venue, in contracts.
#[derive(Debug, Clone, PartialEq)]
pub struct ExchangePosition {
    pub side: Side,
    pub contracts: f64,
    pub entry_price: Option<f64>,
    pub average_price: Option<f64>,
}

impl ExchangePosition {
    /// Entry price, falling back to the average price.
    pub fn cost_basis(&self) -> Option<f64> {
        self.entry_price
            .filter(|p| *p > 0.0)
            .or(self.average_price.filter(|p| *p > 0.0))
    }
}

/// One of our own fills, in contracts.
#[derive(Debug, Clone, PartialEq)]
pub struct Fill {
    pub timestamp: Option<i64>,
    pub side: OrderSide,
    pub pos_side: Option<Side>,
    pub amount: f64,
}

/// Replay fills for `pos_side` oldest first and report whether the
/// position was reduced after it last opened from flat.
pub fn infer_tp1_done(fills: &[Fill], contract_size: f64, pos_side: Side) -> bool {
    let mut relevant: Vec<&Fill> = fills
        .iter()
        .filter(|f| f.pos_side == Some(pos_side) && f.timestamp.is_some())
        .collect();
    relevant.sort_by_key(|f| f.timestamp);

    let mut net = 0.0;
    let mut reduced_since_open = false;

    for fill in relevant {
        let base = fill.amount * contract_size;
        if base <= 0.0 {
            continue;
        }

        let delta = match (pos_side, fill.side) {
            (Side::Long, OrderSide::Buy) | (Side::Short, OrderSide::Sell) => base,
            (Side::Long, OrderSide::Sell) | (Side::Short, OrderSide::Buy) => -base,
        };

        let prev_net = net;
        net += delta;

        if prev_net <= FLAT_EPSILON && net > FLAT_EPSILON {
            reduced_since_open = false;
            continue;
        }
        if prev_net > FLAT_EPSILON && delta < 0.0 {
            reduced_since_open = true;
        }
        if net <= FLAT_EPSILON {
            reduced_since_open = false;
        }
    }

    reduced_since_open
}

/// Replace the ledger's entries with the venue's positions. Completed-trade
/// counters are kept. Positions without size or cost basis are ignored.
pub fn reconcile_ledger(
    ledger: &mut PositionLedger,
    positions: &[ExchangePosition],
    fills: &[Fill],
    market: &MarketSpec,
) {
    let mut long_entry: Option<Entry> = None;
    let mut short_entry: Option<Entry> = None;

    for position in positions {
        if position.contracts <= 0.0 {
            continue;
        }
        let Some(price) = position.cost_basis() else {
            debug!(side = %position.side, "position without cost basis ignored");
            continue;
        };

        let tp1_done = market.hedge_mode
            && infer_tp1_done(fills, market.contract_size, position.side);
        let entry = Entry {
            price,
            size: market.to_base(position.contracts),
            tp1_done,
        };

        match position.side {
            Side::Long => long_entry = Some(entry),
            Side::Short => short_entry = Some(entry),
        }
    }

    info!(
        long = long_entry.is_some(),
        short = short_entry.is_some(),
        "ledger reconciled with venue positions"
    );
    ledger.replace_entries(Side::Long, long_entry.into_iter().collect());
    ledger.replace_entries(Side::Short, short_entry.into_iter().collect());
}
