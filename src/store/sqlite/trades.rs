//! Trade row operations
//!
//! Filtering, ordering, and pagination here must stay in lockstep with
//! the in-memory engine: `COLLATE NOCASE` mirrors the case-insensitive
//! code match, the `date <> ''` guard keeps dateless rows out of range
//! filters, and the `id ASC` tiebreak reproduces stable-sort tie order.

use crate::error::{AppError, Result};
use crate::model::{Page, Trade, TradePatch, TradeQuery};
use rusqlite::{params, Connection, ToSql};

const SELECT_COLUMNS: &str = "id, date, trade_code, open, high, low, close, volume";

/// Rows inserted per transaction during bulk loads
const BULK_CHUNK_SIZE: usize = 2000;

fn trade_from_row(row: &rusqlite::Row) -> rusqlite::Result<Trade> {
    Ok(Trade {
        id: Some(row.get(0)?),
        date: row.get(1)?,
        trade_code: row.get(2)?,
        open: row.get(3)?,
        high: row.get(4)?,
        low: row.get(5)?,
        close: row.get(6)?,
        volume: row.get(7)?,
    })
}

/// Build the WHERE clause shared by the count and page queries
fn filter_clause(query: &TradeQuery) -> (String, Vec<Box<dyn ToSql>>) {
    let mut conditions: Vec<&str> = Vec::new();
    let mut params_vec: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(code) = query.trade_code.as_deref() {
        if !code.is_empty() {
            conditions.push("trade_code = ? COLLATE NOCASE");
            params_vec.push(Box::new(code.to_string()));
        }
    }
    if let Some(from) = query.date_from.as_deref() {
        if !from.is_empty() {
            conditions.push("date <> '' AND date >= ?");
            params_vec.push(Box::new(from.to_string()));
        }
    }
    if let Some(to) = query.date_to.as_deref() {
        if !to.is_empty() {
            conditions.push("date <> '' AND date <= ?");
            params_vec.push(Box::new(to.to_string()));
        }
    }

    let clause = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };
    (clause, params_vec)
}

/// List trades with filters, ordering, and pagination
pub fn list(conn: &Connection, query: &TradeQuery) -> Result<Page> {
    let (clause, mut params_vec) = filter_clause(query);

    let count_sql = format!("SELECT COUNT(*) FROM trades{}", clause);
    let params_refs: Vec<&dyn ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
    let total: i64 = conn.query_row(&count_sql, params_refs.as_slice(), |row| row.get(0))?;

    let page_sql = format!(
        "SELECT {} FROM trades{} ORDER BY {} {}, id ASC LIMIT ? OFFSET ?",
        SELECT_COLUMNS,
        clause,
        query.sort.column(),
        query.order.keyword()
    );
    params_vec.push(Box::new(query.limit as i64));
    params_vec.push(Box::new(query.offset as i64));
    let params_refs: Vec<&dyn ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();

    let mut stmt = conn.prepare(&page_sql)?;
    let items = stmt
        .query_map(params_refs.as_slice(), trade_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(Page {
        total: total as usize,
        items,
    })
}

/// Fetch a trade by id
pub fn get(conn: &Connection, id: i64) -> Result<Option<Trade>> {
    let sql = format!("SELECT {} FROM trades WHERE id = ?1", SELECT_COLUMNS);
    let result = conn.query_row(&sql, params![id], trade_from_row);

    match result {
        Ok(trade) => Ok(Some(trade)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Insert a trade, assigning a fresh id regardless of the caller's
pub fn create(conn: &Connection, trade: &Trade) -> Result<Trade> {
    conn.execute(
        "INSERT INTO trades (date, trade_code, open, high, low, close, volume)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            trade.date,
            trade.trade_code,
            trade.open,
            trade.high,
            trade.low,
            trade.close,
            trade.volume
        ],
    )?;

    let id = conn.last_insert_rowid();
    tracing::info!("Created trade {} ({})", id, trade.trade_code);

    Ok(Trade {
        id: Some(id),
        ..trade.clone()
    })
}

/// Apply a partial update, leaving absent fields untouched
pub fn update(conn: &Connection, id: i64, patch: &TradePatch) -> Result<Trade> {
    // Build dynamic update query
    let mut updates = Vec::new();
    let mut params_vec: Vec<Box<dyn ToSql>> = Vec::new();

    if let Some(ref val) = patch.date {
        updates.push("date = ?");
        params_vec.push(Box::new(val.trim().to_string()));
    }
    if let Some(ref val) = patch.trade_code {
        updates.push("trade_code = ?");
        params_vec.push(Box::new(val.trim().to_string()));
    }
    if let Some(val) = patch.open {
        updates.push("open = ?");
        params_vec.push(Box::new(val));
    }
    if let Some(val) = patch.high {
        updates.push("high = ?");
        params_vec.push(Box::new(val));
    }
    if let Some(val) = patch.low {
        updates.push("low = ?");
        params_vec.push(Box::new(val));
    }
    if let Some(val) = patch.close {
        updates.push("close = ?");
        params_vec.push(Box::new(val));
    }
    if let Some(val) = patch.volume {
        updates.push("volume = ?");
        params_vec.push(Box::new(val));
    }

    if !updates.is_empty() {
        params_vec.push(Box::new(id));
        let sql = format!("UPDATE trades SET {} WHERE id = ?", updates.join(", "));
        let params_refs: Vec<&dyn ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_refs.as_slice())?;
    }

    get(conn, id)?.ok_or_else(|| AppError::NotFound(format!("trade {} not found", id)))
}

/// Delete a trade by id
pub fn delete(conn: &Connection, id: i64) -> Result<()> {
    let rows = conn.execute("DELETE FROM trades WHERE id = ?1", params![id])?;
    if rows == 0 {
        return Err(AppError::NotFound(format!("trade {} not found", id)));
    }
    tracing::info!("Deleted trade {}", id);
    Ok(())
}

/// Sorted distinct non-empty instrument codes
pub fn trade_codes(conn: &Connection) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT trade_code FROM trades WHERE trade_code <> '' ORDER BY trade_code",
    )?;

    let codes = stmt
        .query_map([], |row| row.get(0))?
        .collect::<std::result::Result<Vec<String>, _>>()?;

    Ok(codes)
}

/// Replace the whole table with a new collection (bulk load)
///
/// Inserts run in chunks, one transaction per chunk, so very large
/// imports do not hold a single transaction open for the whole file.
pub fn replace_all(conn: &mut Connection, trades: &[Trade]) -> Result<usize> {
    let tx = conn.transaction()?;
    tx.execute("DELETE FROM trades", [])?;
    tx.commit()?;

    let mut inserted = 0;
    for chunk in trades.chunks(BULK_CHUNK_SIZE) {
        let tx = conn.transaction()?;

        let mut stmt = tx.prepare(
            "INSERT INTO trades (date, trade_code, open, high, low, close, volume)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        )?;

        for trade in chunk {
            stmt.execute(params![
                trade.date,
                trade.trade_code,
                trade.open,
                trade.high,
                trade.low,
                trade.close,
                trade.volume
            ])?;
            inserted += 1;
        }

        drop(stmt);
        tx.commit()?;
    }

    tracing::info!("Loaded {} trades into database", inserted);
    Ok(inserted)
}

/// Get trade count from database
pub fn count(conn: &Connection) -> Result<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM trades", [], |row| row.get(0))?;
    Ok(count)
}
