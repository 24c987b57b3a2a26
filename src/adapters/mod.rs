//! Concrete adapter implementations for ports.

pub mod csv_account_adapter;
pub mod csv_adapter;
pub mod file_config_adapter;
pub mod json_state_adapter;
pub mod order_journal_adapter;
