//! Record normalization
//!
//! Source rows arrive with inconsistent key naming (`trade_code`,
//! `Trade Code`, `tradeCode`, ...) and loosely typed values. The
//! normalizer resolves each canonical field through a fixed alias
//! priority list and coerces values into the canonical types. Bulk file
//! imports and single write payloads go through the exact same path, so
//! both produce identical canonical records for the same logical input.

use crate::coerce::{coerce_float, coerce_int};
use crate::error::Result;
use crate::model::Trade;
use serde_json::{Map, Value};

const DATE_ALIASES: &[&str] = &["date", "Date"];
const TRADE_CODE_ALIASES: &[&str] = &["trade_code", "Trade Code", "tradeCode"];
const OPEN_ALIASES: &[&str] = &["open", "Open"];
const HIGH_ALIASES: &[&str] = &["high", "High"];
const LOW_ALIASES: &[&str] = &["low", "Low"];
const CLOSE_ALIASES: &[&str] = &["close", "Close"];
const VOLUME_ALIASES: &[&str] = &["volume", "Volume"];

/// Normalize one loosely-typed source row into a canonical [`Trade`].
///
/// A row with a numeric field that cannot be coerced is rejected; the
/// error carries the offending text. Any `id` key in the row is ignored —
/// identity is assigned by the relational store alone.
pub fn normalize_record(row: &Map<String, Value>) -> Result<Trade> {
    Ok(Trade {
        id: None,
        date: text_field(row, DATE_ALIASES),
        trade_code: text_field(row, TRADE_CODE_ALIASES),
        open: coerce_float(resolve(row, OPEN_ALIASES).unwrap_or(&Value::Null))?,
        high: coerce_float(resolve(row, HIGH_ALIASES).unwrap_or(&Value::Null))?,
        low: coerce_float(resolve(row, LOW_ALIASES).unwrap_or(&Value::Null))?,
        close: coerce_float(resolve(row, CLOSE_ALIASES).unwrap_or(&Value::Null))?,
        volume: coerce_int(resolve(row, VOLUME_ALIASES).unwrap_or(&Value::Null))?,
    })
}

/// First alias present with a non-null value wins
fn resolve<'a>(row: &'a Map<String, Value>, aliases: &[&str]) -> Option<&'a Value> {
    aliases
        .iter()
        .find_map(|alias| row.get(*alias).filter(|v| !v.is_null()))
}

/// Resolve a string field, stringifying non-string values and trimming
fn text_field(row: &Map<String, Value>, aliases: &[&str]) -> String {
    match resolve(row, aliases) {
        None => String::new(),
        Some(Value::String(s)) => s.trim().to_string(),
        Some(other) => other.to_string().trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(v: Value) -> Map<String, Value> {
        v.as_object().unwrap().clone()
    }

    #[test]
    fn test_alias_round_trip() {
        let snake = normalize_record(&row(json!({
            "date": "2020-01-02",
            "trade_code": "ABC",
            "open": "10.5",
            "high": "11",
            "low": "10",
            "close": "10.9",
            "volume": "1,500"
        })))
        .unwrap();

        let spaced = normalize_record(&row(json!({
            "Date": "2020-01-02",
            "Trade Code": "ABC",
            "Open": "10.5",
            "High": "11",
            "Low": "10",
            "Close": "10.9",
            "Volume": "1,500"
        })))
        .unwrap();

        let camel = normalize_record(&row(json!({
            "Date": "2020-01-02",
            "tradeCode": "ABC",
            "Open": "10.5",
            "High": "11",
            "Low": "10",
            "Close": "10.9",
            "Volume": "1,500"
        })))
        .unwrap();

        assert_eq!(snake, spaced);
        assert_eq!(snake, camel);
        assert_eq!(snake.volume, 1500);
        assert_eq!(snake.close, 10.9);
    }

    #[test]
    fn test_first_alias_wins() {
        let trade = normalize_record(&row(json!({
            "trade_code": "abc",
            "Trade Code": "XYZ"
        })))
        .unwrap();
        assert_eq!(trade.trade_code, "abc");
    }

    #[test]
    fn test_null_alias_falls_through() {
        let trade = normalize_record(&row(json!({
            "date": null,
            "Date": "2021-06-01"
        })))
        .unwrap();
        assert_eq!(trade.date, "2021-06-01");
    }

    #[test]
    fn test_strings_are_trimmed() {
        let trade = normalize_record(&row(json!({
            "date": "  2020-01-02 ",
            "trade_code": " ABC  "
        })))
        .unwrap();
        assert_eq!(trade.date, "2020-01-02");
        assert_eq!(trade.trade_code, "ABC");
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let trade = normalize_record(&row(json!({}))).unwrap();
        assert_eq!(trade.date, "");
        assert_eq!(trade.trade_code, "");
        assert_eq!(trade.open, 0.0);
        assert_eq!(trade.high, 0.0);
        assert_eq!(trade.low, 0.0);
        assert_eq!(trade.close, 0.0);
        assert_eq!(trade.volume, 0);
        assert_eq!(trade.id, None);
    }

    #[test]
    fn test_null_marker_values_default() {
        let trade = normalize_record(&row(json!({
            "open": "nan",
            "close": "",
            "volume": "NULL"
        })))
        .unwrap();
        assert_eq!(trade.open, 0.0);
        assert_eq!(trade.close, 0.0);
        assert_eq!(trade.volume, 0);
    }

    #[test]
    fn test_bad_numeric_rejects_record() {
        let result = normalize_record(&row(json!({
            "date": "2020-01-02",
            "close": "not a price"
        })));
        assert!(result.is_err());
    }

    #[test]
    fn test_caller_id_is_ignored() {
        let trade = normalize_record(&row(json!({
            "id": 42,
            "trade_code": "ABC"
        })))
        .unwrap();
        assert_eq!(trade.id, None);
    }
}
