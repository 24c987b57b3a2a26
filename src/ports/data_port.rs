//! Market-data port trait.

use crate::domain::error::CrosstraderError;
use crate::domain::ohlcv::OhlcvBar;

pub trait DataPort {
    /// The most recent `limit` bars for `symbol` at `timeframe`, oldest
    /// first, strictly increasing in time.
    fn fetch_bars(
        &self,
        symbol: &str,
        timeframe: &str,
        limit: usize,
    ) -> Result<Vec<OhlcvBar>, CrosstraderError>;
}
