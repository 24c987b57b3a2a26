//! Trade intents emitted by the decision engine.
//!
//! Each variant carries only the fields meaningful for that operation; the
//! flat `ActionRecord` is the wire shape handed to the execution layer.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::position::Side;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "buy"),
            OrderSide::Sell => write!(f, "sell"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TradeAction {
    OpenLong { size: f64, price: f64, notional: f64 },
    OpenShort { size: f64, price: f64, notional: f64 },
    Tp1Long { size: f64, price: f64 },
    Tp1Short { size: f64, price: f64 },
    SlLong { size: f64, price: f64 },
    SlShort { size: f64, price: f64 },
    Tp2Long { size: f64, price: f64 },
    Tp2Short { size: f64, price: f64 },
}

impl TradeAction {
    pub fn open(side: Side, size: f64, price: f64, notional: f64) -> Self {
        match side {
            Side::Long => TradeAction::OpenLong {
                size,
                price,
                notional,
            },
            Side::Short => TradeAction::OpenShort {
                size,
                price,
                notional,
            },
        }
    }

    pub fn tp1(side: Side, size: f64, price: f64) -> Self {
        match side {
            Side::Long => TradeAction::Tp1Long { size, price },
            Side::Short => TradeAction::Tp1Short { size, price },
        }
    }

    pub fn stop_loss(side: Side, size: f64, price: f64) -> Self {
        match side {
            Side::Long => TradeAction::SlLong { size, price },
            Side::Short => TradeAction::SlShort { size, price },
        }
    }

    pub fn tp2(side: Side, size: f64, price: f64) -> Self {
        match side {
            Side::Long => TradeAction::Tp2Long { size, price },
            Side::Short => TradeAction::Tp2Short { size, price },
        }
    }

    /// Operation tag, e.g. `open_long` or `tp1_short`.
    pub fn op(&self) -> &'static str {
        match self {
            TradeAction::OpenLong { .. } => "open_long",
            TradeAction::OpenShort { .. } => "open_short",
            TradeAction::Tp1Long { .. } => "tp1_long",
            TradeAction::Tp1Short { .. } => "tp1_short",
            TradeAction::SlLong { .. } => "sl_long",
            TradeAction::SlShort { .. } => "sl_short",
            TradeAction::Tp2Long { .. } => "tp2_long",
            TradeAction::Tp2Short { .. } => "tp2_short",
        }
    }

    /// The position side the action opens or reduces.
    pub fn position_side(&self) -> Side {
        match self {
            TradeAction::OpenLong { .. }
            | TradeAction::Tp1Long { .. }
            | TradeAction::SlLong { .. }
            | TradeAction::Tp2Long { .. } => Side::Long,
            TradeAction::OpenShort { .. }
            | TradeAction::Tp1Short { .. }
            | TradeAction::SlShort { .. }
            | TradeAction::Tp2Short { .. } => Side::Short,
        }
    }

    /// Buying opens longs and reduces shorts; selling does the reverse.
    pub fn order_side(&self) -> OrderSide {
        match (self.is_open(), self.position_side()) {
            (true, Side::Long) | (false, Side::Short) => OrderSide::Buy,
            (true, Side::Short) | (false, Side::Long) => OrderSide::Sell,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(
            self,
            TradeAction::OpenLong { .. } | TradeAction::OpenShort { .. }
        )
    }

    /// Exits only ever shrink an existing position.
    pub fn is_reduce_only(&self) -> bool {
        !self.is_open()
    }

    pub fn size(&self) -> f64 {
        match *self {
            TradeAction::OpenLong { size, .. }
            | TradeAction::OpenShort { size, .. }
            | TradeAction::Tp1Long { size, .. }
            | TradeAction::Tp1Short { size, .. }
            | TradeAction::SlLong { size, .. }
            | TradeAction::SlShort { size, .. }
            | TradeAction::Tp2Long { size, .. }
            | TradeAction::Tp2Short { size, .. } => size,
        }
    }

    pub fn price(&self) -> f64 {
        match *self {
            TradeAction::OpenLong { price, .. }
            | TradeAction::OpenShort { price, .. }
            | TradeAction::Tp1Long { price, .. }
            | TradeAction::Tp1Short { price, .. }
            | TradeAction::SlLong { price, .. }
            | TradeAction::SlShort { price, .. }
            | TradeAction::Tp2Long { price, .. }
            | TradeAction::Tp2Short { price, .. } => price,
        }
    }

    pub fn notional(&self) -> Option<f64> {
        match *self {
            TradeAction::OpenLong { notional, .. } | TradeAction::OpenShort { notional, .. } => {
                Some(notional)
            }
            _ => None,
        }
    }

    pub fn to_record(&self) -> ActionRecord {
        ActionRecord {
            op: self.op().to_string(),
            side: self.order_side(),
            size: self.size(),
            price: self.price(),
            notional: self.notional(),
        }
    }
}

impl fmt::Display for TradeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | side: {} | size: {:.6} | price: {:.2}",
            self.op(),
            self.order_side(),
            self.size(),
            self.price()
        )
    }
}

/// Flat action record for the execution collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub op: String,
    pub side: OrderSide,
    pub size: f64,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notional: Option<f64>,
}
