//! Field coercion
//!
//! Source files and write payloads carry numbers in whatever shape the
//! upstream export produced: real JSON numbers, strings with thousands
//! separators, blanks, or `nan`/`null` placeholder text. These functions
//! fold all of that into canonical `f64`/`i64` values.

use crate::error::{AppError, Result};
use serde_json::Value;

/// Null-marker tokens treated as "no value" (compared lowercased)
const NULL_MARKERS: [&str; 2] = ["nan", "null"];

/// Coerce an arbitrary source value into a float.
///
/// Missing values and null markers become 0.0. Textual input is stripped
/// of whitespace and thousands-separator commas before parsing. Anything
/// left over that is not a decimal number is an error.
pub fn coerce_float(v: &Value) -> Result<f64> {
    match v {
        Value::Null => Ok(0.0),
        Value::Number(n) => Ok(n.as_f64().unwrap_or(0.0)),
        other => {
            let s = cleaned_text(other);
            if is_missing(&s) {
                return Ok(0.0);
            }
            s.parse::<f64>()
                .map_err(|_| AppError::InvalidNumericFormat(s))
        }
    }
}

/// Coerce an arbitrary source value into an integer.
///
/// Same pipeline as [`coerce_float`], but the final parse goes through a
/// float and truncates toward zero, so decimal-looking integer fields
/// (`"12.9"`, `"1,234.0"`) are tolerated.
pub fn coerce_int(v: &Value) -> Result<i64> {
    match v {
        Value::Null => Ok(0),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i)
            } else {
                Ok(n.as_f64().unwrap_or(0.0) as i64)
            }
        }
        other => {
            let s = cleaned_text(other);
            if is_missing(&s) {
                return Ok(0);
            }
            let f = s
                .parse::<f64>()
                .map_err(|_| AppError::InvalidNumericFormat(s))?;
            Ok(f as i64)
        }
    }
}

/// Stringify a non-numeric JSON value and strip separators/whitespace
fn cleaned_text(v: &Value) -> String {
    let s = match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    s.replace(',', "").trim().to_string()
}

/// Empty or null-marker text means "no value"
fn is_missing(s: &str) -> bool {
    s.is_empty() || NULL_MARKERS.contains(&s.to_lowercase().as_str())
}
