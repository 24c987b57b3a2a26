//! Strategy parameters, fixed for the lifetime of a run.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::error::CrosstraderError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyParams {
    pub ma_fast: usize,
    pub ma_slow: usize,
    /// Fraction of account equity committed to each new entry.
    pub buy_pct: f64,
    pub tp1_pct: f64,
    pub tp2_pct: f64,
    pub sl_pct: f64,
    /// Fraction of an entry's size closed at the tier-1 take-profit.
    pub tp1_sell_prop: f64,
}

impl Default for StrategyParams {
    fn default() -> Self {
        StrategyParams {
            ma_fast: 10,
            ma_slow: 20,
            buy_pct: 0.15,
            tp1_pct: 0.08,
            tp2_pct: 0.14,
            sl_pct: 0.18,
            tp1_sell_prop: 0.9,
        }
    }
}

impl StrategyParams {
    /// Check every field. Windows must be at least 1 and every fraction
    /// must lie in (0, 1]. Orderings that are expected but not required
    /// (`ma_fast < ma_slow`, `tp1_pct < tp2_pct`) only produce a warning.
    pub fn validate(&self) -> Result<(), CrosstraderError> {
        check_window("ma_fast", self.ma_fast)?;
        check_window("ma_slow", self.ma_slow)?;
        check_fraction("buy_pct", self.buy_pct)?;
        check_fraction("tp1_pct", self.tp1_pct)?;
        check_fraction("tp2_pct", self.tp2_pct)?;
        check_fraction("sl_pct", self.sl_pct)?;
        check_fraction("tp1_sell_prop", self.tp1_sell_prop)?;

        if self.ma_fast >= self.ma_slow {
            warn!(
                ma_fast = self.ma_fast,
                ma_slow = self.ma_slow,
                "fast window is not shorter than slow window"
            );
        }
        if self.tp2_pct <= self.tp1_pct {
            warn!(
                tp1_pct = self.tp1_pct,
                tp2_pct = self.tp2_pct,
                "tier-2 take-profit does not exceed tier-1"
            );
        }
        Ok(())
    }
}

fn check_window(field: &str, value: usize) -> Result<(), CrosstraderError> {
    if value == 0 {
        return Err(CrosstraderError::InvalidParams {
            field: field.to_string(),
            reason: "window length must be at least 1".to_string(),
        });
    }
    Ok(())
}

fn check_fraction(field: &str, value: f64) -> Result<(), CrosstraderError> {
    if !(value.is_finite() && value > 0.0 && value <= 1.0) {
        return Err(CrosstraderError::InvalidParams {
            field: field.to_string(),
            reason: format!("{value} is outside (0, 1]"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field_of(err: CrosstraderError) -> String {
        match err {
            CrosstraderError::InvalidParams { field, .. } => field,
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn defaults_are_valid() {
        let params = StrategyParams::default();
        assert!(params.validate().is_ok());
        assert_eq!(params.ma_fast, 10);
        assert_eq!(params.ma_slow, 20);
        assert_eq!(params.tp1_sell_prop, 0.9);
    }

    #[test]
    fn zero_window_rejected() {
        let params = StrategyParams {
            ma_fast: 0,
            ..StrategyParams::default()
        };
        assert_eq!(field_of(params.validate().unwrap_err()), "ma_fast");

        let params = StrategyParams {
            ma_slow: 0,
            ..StrategyParams::default()
        };
        assert_eq!(field_of(params.validate().unwrap_err()), "ma_slow");
    }

    #[test]
    fn fraction_bounds() {
        let params = StrategyParams {
            buy_pct: 0.0,
            ..StrategyParams::default()
        };
        assert_eq!(field_of(params.validate().unwrap_err()), "buy_pct");

        let params = StrategyParams {
            sl_pct: 1.5,
            ..StrategyParams::default()
        };
        assert_eq!(field_of(params.validate().unwrap_err()), "sl_pct");

        let params = StrategyParams {
            tp1_sell_prop: f64::NAN,
            ..StrategyParams::default()
        };
        assert_eq!(field_of(params.validate().unwrap_err()), "tp1_sell_prop");
    }

    #[test]
    fn upper_bound_is_inclusive() {
        let params = StrategyParams {
            buy_pct: 1.0,
            tp1_sell_prop: 1.0,
            ..StrategyParams::default()
        };
        assert!(params.validate().is_ok());
    }

    #[test]
    fn unusual_orderings_only_warn() {
        let params = StrategyParams {
            ma_fast: 30,
            ma_slow: 20,
            tp1_pct: 0.2,
            tp2_pct: 0.1,
            ..StrategyParams::default()
        };
        assert!(params.validate().is_ok());
    }
}
