//! Configuration validation.
//!
//! Validates every config field before a run. Keys may be omitted (the
//! documented default applies) but a present key must parse and be in range.

use crate::domain::error::CrosstraderError;
use crate::ports::config_port::ConfigPort;

const STRATEGY: &str = "strategy";
const MARKET: &str = "market";

const WINDOW_KEYS: [&str; 2] = ["ma_fast", "ma_slow"];
const FRACTION_KEYS: [&str; 5] = ["buy_pct", "tp1_pct", "tp2_pct", "sl_pct", "tp1_sell_prop"];
const TD_MODES: [&str; 3] = ["cross", "isolated", "cash"];

pub fn validate_strategy_config(config: &dyn ConfigPort) -> Result<(), CrosstraderError> {
    for key in WINDOW_KEYS {
        validate_window(config, key)?;
    }
    for key in FRACTION_KEYS {
        validate_fraction(config, key)?;
    }
    Ok(())
}

pub fn validate_market_config(config: &dyn ConfigPort) -> Result<(), CrosstraderError> {
    validate_symbol(config)?;
    validate_contract_size(config)?;
    validate_amount_step(config)?;
    validate_bar_limit(config)?;
    validate_hedge_mode(config)?;
    validate_td_mode(config)?;
    Ok(())
}

/// Parse an optional numeric key. `Ok(None)` when absent, an error when
/// present but unparsable.
fn parse_number<T: std::str::FromStr>(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<Option<T>, CrosstraderError> {
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| CrosstraderError::ConfigInvalid {
                section: section.to_string(),
                key: key.to_string(),
                reason: format!("'{}' is not a number", raw.trim()),
            }),
    }
}

pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

fn invalid(section: &str, key: &str, reason: &str) -> CrosstraderError {
    CrosstraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn validate_window(config: &dyn ConfigPort, key: &str) -> Result<(), CrosstraderError> {
    // parse as signed so that "-5" is reported as out of range, not unparsable
    if let Some(value) = parse_number::<i64>(config, STRATEGY, key)? {
        if value < 1 {
            return Err(invalid(STRATEGY, key, &format!("{key} must be at least 1")));
        }
    }
    Ok(())
}

fn validate_fraction(config: &dyn ConfigPort, key: &str) -> Result<(), CrosstraderError> {
    if let Some(value) = parse_number::<f64>(config, STRATEGY, key)? {
        if !(value > 0.0 && value <= 1.0) {
            return Err(invalid(STRATEGY, key, &format!("{key} must be in (0, 1]")));
        }
    }
    Ok(())
}

fn validate_symbol(config: &dyn ConfigPort) -> Result<(), CrosstraderError> {
    match config.get_string(MARKET, "symbol") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(CrosstraderError::ConfigMissing {
            section: MARKET.to_string(),
            key: "symbol".to_string(),
        }),
    }
}

fn validate_contract_size(config: &dyn ConfigPort) -> Result<(), CrosstraderError> {
    if let Some(value) = parse_number::<f64>(config, MARKET, "contract_size")? {
        if !(value > 0.0 && value.is_finite()) {
            return Err(invalid(MARKET, "contract_size", "contract_size must be positive"));
        }
    }
    Ok(())
}

fn validate_amount_step(config: &dyn ConfigPort) -> Result<(), CrosstraderError> {
    if let Some(value) = parse_number::<f64>(config, MARKET, "amount_step")? {
        if !(value >= 0.0 && value.is_finite()) {
            return Err(invalid(MARKET, "amount_step", "amount_step must be non-negative"));
        }
    }
    Ok(())
}

fn validate_bar_limit(config: &dyn ConfigPort) -> Result<(), CrosstraderError> {
    if let Some(value) = parse_number::<i64>(config, MARKET, "bar_limit")? {
        if value < 2 {
            return Err(invalid(MARKET, "bar_limit", "bar_limit must be at least 2"));
        }
    }
    Ok(())
}

fn validate_hedge_mode(config: &dyn ConfigPort) -> Result<(), CrosstraderError> {
    if let Some(raw) = config.get_string(MARKET, "hedge_mode") {
        if parse_bool(&raw).is_none() {
            return Err(invalid(MARKET, "hedge_mode", "hedge_mode must be true or false"));
        }
    }
    Ok(())
}

fn validate_td_mode(config: &dyn ConfigPort) -> Result<(), CrosstraderError> {
    if let Some(raw) = config.get_string(MARKET, "td_mode") {
        if !TD_MODES.contains(&raw.trim()) {
            return Err(invalid(
                MARKET,
                "td_mode",
                "td_mode must be one of cross, isolated, cash",
            ));
        }
    }
    Ok(())
}
