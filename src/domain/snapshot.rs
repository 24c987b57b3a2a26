//! Flat JSON snapshot of a `StrategyState`.
//!
//! Restoring is strict: parameters and every entry field must be present
//! and sane. Only the entry lists and the completed-trade counters may be
//! omitted, in which case they restore empty / zero.

use crate::domain::engine::StrategyState;
use crate::domain::error::CrosstraderError;
use crate::domain::position::{Entry, Side};

impl StrategyState {
    pub fn to_json(&self) -> Result<String, CrosstraderError> {
        serde_json::to_string(self).map_err(|e| CrosstraderError::Snapshot {
            reason: e.to_string(),
        })
    }

    pub fn to_json_pretty(&self) -> Result<String, CrosstraderError> {
        serde_json::to_string_pretty(self).map_err(|e| CrosstraderError::Snapshot {
            reason: e.to_string(),
        })
    }

    pub fn from_json(s: &str) -> Result<Self, CrosstraderError> {
        let state: StrategyState =
            serde_json::from_str(s).map_err(|e| CrosstraderError::Snapshot {
                reason: e.to_string(),
            })?;
        state.validate_snapshot()?;
        Ok(state)
    }

    fn validate_snapshot(&self) -> Result<(), CrosstraderError> {
        self.params
            .validate()
            .map_err(|e| CrosstraderError::Snapshot {
                reason: e.to_string(),
            })?;
        for side in [Side::Long, Side::Short] {
            for (i, entry) in self.ledger.entries(side).iter().enumerate() {
                validate_entry(side, i, entry)?;
            }
        }
        Ok(())
    }
}

fn validate_entry(side: Side, index: usize, entry: &Entry) -> Result<(), CrosstraderError> {
    if !(entry.price.is_finite() && entry.price > 0.0) {
        return Err(CrosstraderError::Snapshot {
            reason: format!("{side} entry {index}: price {} must be positive", entry.price),
        });
    }
    if !(entry.size.is_finite() && entry.size > 0.0) {
        return Err(CrosstraderError::Snapshot {
            reason: format!("{side} entry {index}: size {} must be positive", entry.size),
        });
    }
    Ok(())
}
