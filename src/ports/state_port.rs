//! Strategy state persistence port trait.

use crate::domain::engine::StrategyState;
use crate::domain::error::CrosstraderError;

pub trait StatePort {
    /// `Ok(None)` when no state has been saved yet. A snapshot that exists
    /// but cannot be restored is an error.
    fn load(&self) -> Result<Option<StrategyState>, CrosstraderError>;

    fn save(&self, state: &StrategyState) -> Result<(), CrosstraderError>;
}
