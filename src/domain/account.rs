//! Account balances as reported by the venue.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccountBalance {
    /// Balance available for new orders.
    pub free: f64,
    /// Total balance including margin in use.
    pub total: f64,
}

impl AccountBalance {
    pub fn new(free: f64, total: f64) -> Self {
        AccountBalance { free, total }
    }

    /// Equity used for sizing: the total balance when the venue reports
    /// one, otherwise the free balance.
    pub fn equity(&self) -> f64 {
        if self.total > 0.0 { self.total } else { self.free }
    }

    pub fn cash(&self) -> f64 {
        self.free
    }
}
