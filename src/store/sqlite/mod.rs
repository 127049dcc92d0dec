//! SQLite-backed relational store

pub mod migrations;
mod trades;

use crate::error::Result;
use crate::model::{Page, Trade, TradePatch, TradeQuery};
use crate::store::TradeSource;
use parking_lot::Mutex;
use rusqlite::Connection;
use std::path::Path;

/// SQLite database wrapper
pub struct SqliteDb {
    conn: Mutex<Connection>,
}

impl SqliteDb {
    /// Create new SQLite database connection
    pub fn new(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // Enable WAL mode for better concurrent access
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        let db = Self {
            conn: Mutex::new(conn),
        };

        // Run migrations
        db.run_migrations()?;

        Ok(db)
    }

    /// Open an in-memory database (for testing and the importer dry-run)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Run database migrations
    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn.lock();
        migrations::run_migrations(&conn)
    }

    /// Fetch a trade by id
    pub fn get(&self, id: i64) -> Result<Option<Trade>> {
        let conn = self.conn.lock();
        trades::get(&conn, id)
    }

    /// Insert a trade, assigning a fresh identity
    pub fn create(&self, trade: &Trade) -> Result<Trade> {
        let conn = self.conn.lock();
        trades::create(&conn, trade)
    }

    /// Apply a partial update to a trade
    pub fn update(&self, id: i64, patch: &TradePatch) -> Result<Trade> {
        let conn = self.conn.lock();
        trades::update(&conn, id, patch)
    }

    /// Delete a trade permanently
    pub fn delete(&self, id: i64) -> Result<()> {
        let conn = self.conn.lock();
        trades::delete(&conn, id)
    }

    /// Replace the whole trades table with a new collection
    pub fn replace_all(&self, rows: &[Trade]) -> Result<usize> {
        let mut conn = self.conn.lock();
        trades::replace_all(&mut conn, rows)
    }

    /// Number of stored trades
    pub fn count(&self) -> Result<i64> {
        let conn = self.conn.lock();
        trades::count(&conn)
    }
}

impl TradeSource for SqliteDb {
    fn list(&self, query: &TradeQuery) -> Result<Page> {
        let conn = self.conn.lock();
        trades::list(&conn, query)
    }

    fn trade_codes(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock();
        trades::trade_codes(&conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_fetch_update_delete_round_trip() {
        let db = SqliteDb::open_in_memory().unwrap();

        let stored = db
            .create(&Trade {
                id: None,
                date: "2020-01-01".to_string(),
                trade_code: "ABC".to_string(),
                open: 9.0,
                high: 11.0,
                low: 8.5,
                close: 10.0,
                volume: 100,
            })
            .unwrap();
        let id = stored.id.unwrap();

        assert_eq!(db.get(id).unwrap().unwrap(), stored);
        assert_eq!(db.count().unwrap(), 1);

        let updated = db
            .update(
                id,
                &TradePatch {
                    close: Some(10.5),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.close, 10.5);
        assert_eq!(updated.date, "2020-01-01");

        db.delete(id).unwrap();
        assert!(db.get(id).unwrap().is_none());
    }
}
