//! Static snapshot store
//!
//! Serves reads from a flat file loaded whole into memory on first access
//! and memoized for the process lifetime. A changed source file is not
//! picked up without a restart.

use crate::engine::run_query;
use crate::error::Result;
use crate::ingest::load_trades;
use crate::model::{Page, Trade, TradeQuery};
use crate::store::TradeSource;
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

/// Read-only store backed by a static trade file
pub struct SnapshotStore {
    path: PathBuf,
    // held across the load so concurrent first reads trigger exactly one
    cache: Mutex<Option<Arc<Vec<Trade>>>>,
}

impl SnapshotStore {
    /// Create a store for the given file; nothing is read until first use
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cache: Mutex::new(None),
        }
    }

    /// Get the cached collection, loading the file on first call
    fn rows(&self) -> Result<Arc<Vec<Trade>>> {
        let mut cache = self.cache.lock();
        if let Some(rows) = cache.as_ref() {
            return Ok(Arc::clone(rows));
        }

        let rows = Arc::new(load_trades(&self.path)?);
        tracing::info!("Loaded {} trades from {}", rows.len(), self.path.display());
        *cache = Some(Arc::clone(&rows));
        Ok(rows)
    }
}

impl TradeSource for SnapshotStore {
    fn list(&self, query: &TradeQuery) -> Result<Page> {
        let rows = self.rows()?;
        Ok(run_query(&rows, query))
    }

    fn trade_codes(&self) -> Result<Vec<String>> {
        let rows = self.rows()?;
        let codes: BTreeSet<String> = rows
            .iter()
            .filter(|t| !t.trade_code.is_empty())
            .map(|t| t.trade_code.clone())
            .collect();
        Ok(codes.into_iter().collect())
    }
}
