//! Storage backends
//!
//! Two independent implementations of one read contract: a static file
//! snapshot cached in memory, and a SQLite table with live writes. The
//! conformance tests below hold both to identical `(total, page)` output
//! for the same logical data.

pub mod snapshot;
pub mod sqlite;

pub use snapshot::SnapshotStore;
pub use sqlite::SqliteDb;

use crate::error::Result;
use crate::model::{Page, TradeQuery};

/// Read contract shared by both storage backends
pub trait TradeSource: Send + Sync {
    /// Filtered, sorted, paginated listing plus the filtered total
    fn list(&self, query: &TradeQuery) -> Result<Page>;

    /// Sorted distinct non-empty instrument codes
    fn trade_codes(&self) -> Result<Vec<String>>;
}
