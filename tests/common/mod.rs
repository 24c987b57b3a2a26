#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use crosstrader::domain::engine::StrategyState;
use crosstrader::domain::error::CrosstraderError;
pub use crosstrader::domain::ohlcv::OhlcvBar;
use crosstrader::domain::order::OrderIntent;
use crosstrader::domain::reconcile::{ExchangePosition, Fill};
use crosstrader::ports::account_port::AccountPort;
use crosstrader::ports::data_port::DataPort;
use crosstrader::ports::execution_port::ExecutionPort;
use crosstrader::ports::state_port::StatePort;
use std::cell::{Cell, RefCell};
use std::io::Write;

pub struct MockDataPort {
    pub bars: Vec<OhlcvBar>,
    pub error: Option<String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            bars: Vec::new(),
            error: None,
        }
    }

    pub fn with_closes(mut self, closes: &[f64]) -> Self {
        self.bars = make_bars(closes);
        self
    }

    pub fn with_error(mut self, reason: &str) -> Self {
        self.error = Some(reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(
        &self,
        _symbol: &str,
        _timeframe: &str,
        limit: usize,
    ) -> Result<Vec<OhlcvBar>, CrosstraderError> {
        if let Some(reason) = &self.error {
            return Err(CrosstraderError::Data {
                reason: reason.clone(),
            });
        }
        let skip = self.bars.len().saturating_sub(limit);
        Ok(self.bars[skip..].to_vec())
    }
}

/// In-memory state store that counts saves.
pub struct MemoryStatePort {
    pub state: RefCell<Option<StrategyState>>,
    pub saves: Cell<usize>,
}

impl MemoryStatePort {
    pub fn new() -> Self {
        Self {
            state: RefCell::new(None),
            saves: Cell::new(0),
        }
    }

    pub fn with_state(state: StrategyState) -> Self {
        Self {
            state: RefCell::new(Some(state)),
            saves: Cell::new(0),
        }
    }

    pub fn saved(&self) -> Option<StrategyState> {
        self.state.borrow().clone()
    }
}

impl StatePort for MemoryStatePort {
    fn load(&self) -> Result<Option<StrategyState>, CrosstraderError> {
        Ok(self.state.borrow().clone())
    }

    fn save(&self, state: &StrategyState) -> Result<(), CrosstraderError> {
        *self.state.borrow_mut() = Some(state.clone());
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
}

/// Records submitted orders; optionally rejects all of them.
pub struct RecordingExecutionPort {
    pub orders: Vec<OrderIntent>,
    pub reject: bool,
}

impl RecordingExecutionPort {
    pub fn new() -> Self {
        Self {
            orders: Vec::new(),
            reject: false,
        }
    }

    pub fn rejecting() -> Self {
        Self {
            orders: Vec::new(),
            reject: true,
        }
    }
}

impl ExecutionPort for RecordingExecutionPort {
    fn submit(&mut self, order: &OrderIntent) -> Result<String, CrosstraderError> {
        if self.reject {
            return Err(CrosstraderError::Execution {
                reason: "rejected by venue".to_string(),
            });
        }
        self.orders.push(order.clone());
        Ok(format!("order-{}", self.orders.len()))
    }
}

pub struct MockAccountPort {
    pub positions: Vec<ExchangePosition>,
    pub fills: Vec<Fill>,
}

impl AccountPort for MockAccountPort {
    fn fetch_positions(&self, _symbol: &str) -> Result<Vec<ExchangePosition>, CrosstraderError> {
        Ok(self.positions.clone())
    }

    fn fetch_fills(&self, _symbol: &str, limit: usize) -> Result<Vec<Fill>, CrosstraderError> {
        let skip = self.fills.len().saturating_sub(limit);
        Ok(self.fills[skip..].to_vec())
    }
}

pub fn start_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// Four-hour bars with the given closes.
pub fn make_bars(closes: &[f64]) -> Vec<OhlcvBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| OhlcvBar {
            timestamp: start_time() + Duration::hours(4 * i as i64),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1.0,
        })
        .collect()
}

/// 119 bars at 100, a dip to 90, then a jump to 130: a bullish crossover
/// with exactly the history `ma_fast=10, ma_slow=20` need.
pub fn bullish_closes() -> Vec<f64> {
    let mut closes = vec![100.0; 119];
    closes.extend([90.0, 130.0]);
    closes
}

/// Mirror of [`bullish_closes`]: a pop to 110, then a drop to 70.
pub fn bearish_closes() -> Vec<f64> {
    let mut closes = vec![100.0; 119];
    closes.extend([110.0, 70.0]);
    closes
}

/// 120 bars at 100 followed by `last`; never a crossover.
pub fn flat_closes(last: f64) -> Vec<f64> {
    let mut closes = vec![100.0; 120];
    closes.push(last);
    closes
}

pub fn bars_csv(closes: &[f64]) -> String {
    let mut out = String::from("timestamp,open,high,low,close,volume\n");
    for bar in make_bars(closes) {
        out.push_str(&format!(
            "{},{},{},{},{},{}\n",
            bar.timestamp.format("%Y-%m-%d %H:%M:%S"),
            bar.open,
            bar.high,
            bar.low,
            bar.close,
            bar.volume
        ));
    }
    out
}

pub fn write_temp_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}
