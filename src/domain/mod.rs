//! Core domain types and logic.

pub mod ohlcv;
pub mod params;
pub mod indicator;
pub mod signal;
pub mod position;
pub mod ledger;
pub mod action;
pub mod engine;
pub mod snapshot;
pub mod account;
pub mod order;
pub mod reconcile;
pub mod config_validation;
pub mod error;
