//! Port traits at the I/O seams of the engine.

pub mod account_port;
pub mod config_port;
pub mod data_port;
pub mod execution_port;
pub mod state_port;
