//! Translation of trade actions into venue order intents.
//!
//! Sizes leave the engine in base-asset units; the venue trades contracts
//! of `contract_size` base units, truncated to its amount step.

use serde::Serialize;

use crate::domain::action::{OrderSide, TradeAction};
use crate::domain::position::Side;

/// Venue-side description of the traded instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketSpec {
    pub symbol: String,
    pub timeframe: String,
    /// Base-asset quantity per contract.
    pub contract_size: f64,
    /// Contract amount precision; zero disables rounding.
    pub amount_step: f64,
    pub hedge_mode: bool,
    pub td_mode: String,
    pub client_id_prefix: String,
}

impl Default for MarketSpec {
    fn default() -> Self {
        MarketSpec {
            symbol: "BTC/USDT:USDT".to_string(),
            timeframe: "4h".to_string(),
            contract_size: 1.0,
            amount_step: 0.0,
            hedge_mode: true,
            td_mode: "cross".to_string(),
            client_id_prefix: "ct".to_string(),
        }
    }
}

impl MarketSpec {
    /// Convert a base-asset quantity into whole amount steps of contracts.
    pub fn to_contracts(&self, base_size: f64) -> f64 {
        if self.contract_size <= 0.0 {
            return 0.0;
        }
        let contracts = base_size / self.contract_size;
        truncate_to_step(contracts, self.amount_step)
    }

    pub fn to_base(&self, contracts: f64) -> f64 {
        contracts * self.contract_size
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderIntent {
    pub symbol: String,
    pub op: String,
    pub side: OrderSide,
    /// Only set in hedge mode.
    pub pos_side: Option<Side>,
    pub contracts: f64,
    pub base_size: f64,
    pub price: f64,
    pub reduce_only: bool,
    pub td_mode: String,
    pub client_order_id: String,
}

/// Build the market order for `action`. Returns `None` when the size
/// truncates to zero contracts.
pub fn build_order(action: &TradeAction, market: &MarketSpec, unix_secs: i64) -> Option<OrderIntent> {
    if action.size() <= 0.0 {
        return None;
    }
    let contracts = market.to_contracts(action.size());
    if contracts <= 0.0 {
        return None;
    }

    Some(OrderIntent {
        symbol: market.symbol.clone(),
        op: action.op().to_string(),
        side: action.order_side(),
        pos_side: market.hedge_mode.then(|| action.position_side()),
        contracts,
        base_size: action.size(),
        price: action.price(),
        reduce_only: action.is_reduce_only(),
        td_mode: market.td_mode.clone(),
        client_order_id: client_order_id(&market.client_id_prefix, action.op(), unix_secs),
    })
}

/// `{prefix}_{op}_{unix_secs}` with the op tag cut to ten characters.
pub fn client_order_id(prefix: &str, op: &str, unix_secs: i64) -> String {
    let op: String = op.chars().take(10).collect();
    format!("{prefix}_{op}_{unix_secs}")
}

fn truncate_to_step(value: f64, step: f64) -> f64 {
    if step <= 0.0 {
        return value;
    }
    // nudge by a relative epsilon so 0.3 / 0.1 does not truncate to 2
    let steps = (value / step * (1.0 + 1e-12)).floor();
    steps * step
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn market() -> MarketSpec {
        MarketSpec {
            contract_size: 0.01,
            amount_step: 0.01,
            ..MarketSpec::default()
        }
    }

    #[test]
    fn contracts_truncate_to_step() {
        let m = market();
        // 0.123456 BTC = 12.3456 contracts -> 12.34
        assert_relative_eq!(m.to_contracts(0.123456), 12.34, epsilon = 1e-9);
        assert_relative_eq!(m.to_contracts(0.003), 0.3, epsilon = 1e-9);
        assert_eq!(m.to_contracts(0.00001), 0.0);
    }

    #[test]
    fn contracts_without_step() {
        let m = MarketSpec {
            contract_size: 0.5,
            amount_step: 0.0,
            ..MarketSpec::default()
        };
        assert_relative_eq!(m.to_contracts(0.3), 0.6);
        assert_relative_eq!(m.to_base(0.6), 0.3);
    }

    #[test]
    fn open_order_is_not_reduce_only() {
        let action = TradeAction::open(Side::Long, 0.05, 40_000.0, 2_000.0);
        let order = build_order(&action, &market(), 1_700_000_000).unwrap();

        assert_eq!(order.side, OrderSide::Buy);
        assert_eq!(order.pos_side, Some(Side::Long));
        assert!(!order.reduce_only);
        assert_relative_eq!(order.contracts, 5.0, epsilon = 1e-9);
        assert_eq!(order.client_order_id, "ct_open_long_1700000000");
        assert_eq!(order.td_mode, "cross");
    }

    #[test]
    fn exit_orders_reduce_only() {
        let action = TradeAction::tp1(Side::Short, 0.02, 38_000.0);
        let order = build_order(&action, &market(), 1).unwrap();
        assert_eq!(order.side, OrderSide::Buy);
        assert_eq!(order.pos_side, Some(Side::Short));
        assert!(order.reduce_only);
    }

    #[test]
    fn one_way_mode_omits_position_side() {
        let m = MarketSpec {
            hedge_mode: false,
            ..market()
        };
        let action = TradeAction::stop_loss(Side::Long, 0.02, 30_000.0);
        let order = build_order(&action, &m, 1).unwrap();
        assert_eq!(order.pos_side, None);
        assert_eq!(order.side, OrderSide::Sell);
    }

    #[test]
    fn dust_is_skipped() {
        let action = TradeAction::tp2(Side::Long, 0.00001, 30_000.0);
        assert!(build_order(&action, &market(), 1).is_none());

        let action = TradeAction::tp2(Side::Long, 0.0, 30_000.0);
        assert!(build_order(&action, &market(), 1).is_none());
    }

    #[test]
    fn client_id_truncates_op() {
        assert_eq!(client_order_id("btc", "open_short", 7), "btc_open_short_7");
        assert_eq!(client_order_id("btc", "averylongoperation", 7), "btc_averylongo_7");
    }
}
