//! Venue account port trait: positions and our own fill history.

use crate::domain::error::CrosstraderError;
use crate::domain::reconcile::{ExchangePosition, Fill};

pub trait AccountPort {
    fn fetch_positions(&self, symbol: &str) -> Result<Vec<ExchangePosition>, CrosstraderError>;

    fn fetch_fills(&self, symbol: &str, limit: usize) -> Result<Vec<Fill>, CrosstraderError>;
}
