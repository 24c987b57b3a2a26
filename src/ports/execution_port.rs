//! Order execution port trait.

use crate::domain::error::CrosstraderError;
use crate::domain::order::OrderIntent;

pub trait ExecutionPort {
    /// Submit one order and return the venue's order id.
    fn submit(&mut self, order: &OrderIntent) -> Result<String, CrosstraderError>;
}
