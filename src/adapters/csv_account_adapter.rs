//! CSV exports of venue positions and fills.
//!
//! Positions: `side,contracts,entry_price,average_price` (prices may be blank).
//! Fills: `timestamp,side,pos_side,amount` (timestamp and pos_side may be blank).

use crate::adapters::csv_adapter::{data_err, parse_field};
use crate::domain::action::OrderSide;
use crate::domain::error::CrosstraderError;
use crate::domain::position::Side;
use crate::domain::reconcile::{ExchangePosition, Fill};
use crate::ports::account_port::AccountPort;
use std::fs;
use std::path::{Path, PathBuf};

pub struct CsvAccountAdapter {
    positions_path: PathBuf,
    fills_path: Option<PathBuf>,
}

impl CsvAccountAdapter {
    pub fn new(positions_path: PathBuf, fills_path: Option<PathBuf>) -> Self {
        Self {
            positions_path,
            fills_path,
        }
    }
}

fn read_records(path: &Path) -> Result<Vec<csv::StringRecord>, CrosstraderError> {
    let content = fs::read_to_string(path)
        .map_err(|e| data_err(format!("failed to read {}: {}", path.display(), e)))?;
    csv::ReaderBuilder::new()
        .flexible(true)
        .from_reader(content.as_bytes())
        .records()
        .map(|r| r.map_err(|e| data_err(format!("CSV parse error: {e}"))))
        .collect()
}

fn blank(record: &csv::StringRecord, idx: usize) -> bool {
    record.get(idx).is_none_or(|s| s.trim().is_empty())
}

fn optional_price(
    record: &csv::StringRecord,
    idx: usize,
    name: &str,
) -> Result<Option<f64>, CrosstraderError> {
    if blank(record, idx) {
        Ok(None)
    } else {
        parse_field(record, idx, name).map(Some)
    }
}

fn parse_side(raw: &str) -> Result<Side, CrosstraderError> {
    match raw.trim().to_lowercase().as_str() {
        "long" => Ok(Side::Long),
        "short" => Ok(Side::Short),
        other => Err(data_err(format!("invalid position side '{other}'"))),
    }
}

fn parse_order_side(raw: &str) -> Result<OrderSide, CrosstraderError> {
    match raw.trim().to_lowercase().as_str() {
        "buy" => Ok(OrderSide::Buy),
        "sell" => Ok(OrderSide::Sell),
        other => Err(data_err(format!("invalid order side '{other}'"))),
    }
}

impl AccountPort for CsvAccountAdapter {
    fn fetch_positions(&self, _symbol: &str) -> Result<Vec<ExchangePosition>, CrosstraderError> {
        read_records(&self.positions_path)?
            .iter()
            .map(|record| {
                Ok(ExchangePosition {
                    side: parse_side(record.get(0).unwrap_or_default())?,
                    contracts: parse_field(record, 1, "contracts")?,
                    entry_price: optional_price(record, 2, "entry_price")?,
                    average_price: optional_price(record, 3, "average_price")?,
                })
            })
            .collect()
    }

    fn fetch_fills(&self, _symbol: &str, limit: usize) -> Result<Vec<Fill>, CrosstraderError> {
        let Some(path) = &self.fills_path else {
            return Ok(Vec::new());
        };

        let mut fills = read_records(path)?
            .iter()
            .map(|record| {
                Ok(Fill {
                    timestamp: if blank(record, 0) {
                        None
                    } else {
                        Some(parse_field(record, 0, "timestamp")?)
                    },
                    side: parse_order_side(record.get(1).unwrap_or_default())?,
                    pos_side: if blank(record, 2) {
                        None
                    } else {
                        Some(parse_side(record.get(2).unwrap_or_default())?)
                    },
                    amount: parse_field(record, 3, "amount")?,
                })
            })
            .collect::<Result<Vec<_>, CrosstraderError>>()?;

        let skip = fills.len().saturating_sub(limit);
        Ok(fills.split_off(skip))
    }
}
