//! Flat-file ingestion
//!
//! Reads a trade file (JSON array of objects, or CSV with a header row,
//! chosen by extension) into loose row maps and pushes every row through
//! the record normalizer. The snapshot store and the bulk importer both
//! come through here, so a given logical row produces the same canonical
//! record no matter which path ingested it.

use crate::error::{AppError, Result};
use crate::model::Trade;
use crate::normalize::normalize_record;
use crate::store::SqliteDb;
use serde_json::{Map, Value};
use std::path::Path;

/// Read and normalize every row of a trade file.
///
/// Rows whose numeric fields cannot be coerced are skipped with a warning
/// rather than failing the whole load; single-record writes surface the
/// same condition as an error to the caller instead.
pub fn load_trades(path: &Path) -> Result<Vec<Trade>> {
    let raw = read_rows(path)?;

    let mut trades = Vec::with_capacity(raw.len());
    let mut skipped = 0usize;
    for row in &raw {
        match normalize_record(row) {
            Ok(trade) => trades.push(trade),
            Err(e) => {
                skipped += 1;
                tracing::warn!("Skipping unparseable row: {}", e);
            }
        }
    }
    if skipped > 0 {
        tracing::warn!("Skipped {} of {} rows", skipped, raw.len());
    }

    Ok(trades)
}

/// Bulk-load a trade file into the relational store, replacing its contents
pub fn import_file(db: &SqliteDb, path: &Path) -> Result<usize> {
    let trades = load_trades(path)?;
    let inserted = db.replace_all(&trades)?;
    tracing::info!("Imported {} trades from {}", inserted, path.display());
    Ok(inserted)
}

/// Read a file into loosely-typed row maps
fn read_rows(path: &Path) -> Result<Vec<Map<String, Value>>> {
    if !path.exists() {
        return Err(AppError::SourceUnavailable(format!(
            "trade file not found: {}",
            path.display()
        )));
    }

    if path.extension().and_then(|e| e.to_str()) == Some("csv") {
        read_csv(path)
    } else {
        read_json(path)
    }
}

fn read_json(path: &Path) -> Result<Vec<Map<String, Value>>> {
    let text = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Read CSV rows into loose maps so they share the normalizer with JSON
fn read_csv(path: &Path) -> Result<Vec<Map<String, Value>>> {
    let mut reader = csv::ReaderBuilder::new().from_path(path)?;
    let headers = reader.headers()?.clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut row = Map::new();
        for (header, field) in headers.iter().zip(record.iter()) {
            row.insert(header.to_string(), Value::String(field.to_string()));
        }
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "{}", contents).unwrap();
        path
    }

    #[test]
    fn test_csv_and_json_produce_identical_records() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = write_file(
            &dir,
            "trades.csv",
            "Date,Trade Code,Open,High,Low,Close,Volume\n\
             2020-01-02,ABC,9,11,8,10,\"1,000\"\n",
        );
        let json_path = write_file(
            &dir,
            "trades.json",
            r#"[{"Date": "2020-01-02", "Trade Code": "ABC", "Open": "9", "High": "11",
                 "Low": "8", "Close": "10", "Volume": "1,000"}]"#,
        );

        let from_csv = load_trades(&csv_path).unwrap();
        let from_json = load_trades(&json_path).unwrap();
        assert_eq!(from_csv, from_json);
        assert_eq!(from_csv[0].volume, 1000);
    }

    #[test]
    fn test_import_replaces_store_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "trades.csv",
            "date,trade_code,open,high,low,close,volume\n\
             2020-01-01,ABC,1,2,0.5,1.5,100\n\
             2020-01-02,XYZ,2,3,1.5,2.5,200\n",
        );

        let db = SqliteDb::open_in_memory().unwrap();
        db.create(&Trade {
            id: None,
            date: "2019-01-01".to_string(),
            trade_code: "OLD".to_string(),
            open: 0.0,
            high: 0.0,
            low: 0.0,
            close: 0.0,
            volume: 0,
        })
        .unwrap();

        let inserted = import_file(&db, &path).unwrap();
        assert_eq!(inserted, 2);
        assert_eq!(db.count().unwrap(), 2);
    }

    #[test]
    fn test_missing_file_is_source_unavailable() {
        let err = load_trades(Path::new("/nonexistent/trades.csv")).unwrap_err();
        assert!(matches!(err, AppError::SourceUnavailable(_)));
    }
}
