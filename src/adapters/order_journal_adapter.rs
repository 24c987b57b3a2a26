//! Append-only CSV journal of submitted orders.
//!
//! Stands in for a live venue: every order intent becomes one row and the
//! client order id doubles as the returned order id.

use crate::domain::error::CrosstraderError;
use crate::domain::order::OrderIntent;
use crate::ports::execution_port::ExecutionPort;
use std::fs::OpenOptions;
use std::path::PathBuf;
use tracing::info;

pub struct OrderJournalAdapter {
    path: PathBuf,
}

impl OrderJournalAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

fn exec_err(reason: String) -> CrosstraderError {
    CrosstraderError::Execution { reason }
}

impl ExecutionPort for OrderJournalAdapter {
    fn submit(&mut self, order: &OrderIntent) -> Result<String, CrosstraderError> {
        let is_new = !self.path.exists()
            || self.path.metadata().map(|m| m.len() == 0).unwrap_or(true);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| exec_err(format!("failed to open {}: {}", self.path.display(), e)))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(is_new)
            .from_writer(file);
        writer
            .serialize(order)
            .and_then(|()| writer.flush().map_err(csv::Error::from))
            .map_err(|e| exec_err(format!("failed to journal order: {e}")))?;

        info!(
            client_order_id = %order.client_order_id,
            op = %order.op,
            contracts = order.contracts,
            "order journaled"
        );
        Ok(order.client_order_id.clone())
    }
}
