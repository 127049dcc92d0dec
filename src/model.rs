//! Canonical trade record and query types
//!
//! `Trade` is the canonical form every source row is normalized into,
//! independent of where it came from. Both storage backends speak these
//! types.

use serde::{Deserialize, Serialize};

/// Canonical trade record
///
/// `id` is present only for rows persisted in SQLite; snapshot records
/// carry no identity. All other fields are always populated, with the
/// type's zero value standing in for missing source data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub id: Option<i64>,
    pub date: String,
    pub trade_code: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

/// Partial update payload for a persisted trade
///
/// Only the listed fields are updatable. Unknown field names are rejected
/// at deserialization rather than assigned reflectively.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TradePatch {
    pub date: Option<String>,
    pub trade_code: Option<String>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<i64>,
}

impl TradePatch {
    /// True when no field is present
    pub fn is_empty(&self) -> bool {
        self.date.is_none()
            && self.trade_code.is_none()
            && self.open.is_none()
            && self.high.is_none()
            && self.low.is_none()
            && self.close.is_none()
            && self.volume.is_none()
    }
}

/// Sort key for trade listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Date,
    Close,
    Volume,
}

impl SortKey {
    /// Parse a sort key, falling back to `Date` for anything unrecognized
    pub fn parse(s: &str) -> Self {
        match s {
            "close" => SortKey::Close,
            "volume" => SortKey::Volume,
            _ => SortKey::Date,
        }
    }

    /// Column name in the trades table
    pub fn column(&self) -> &'static str {
        match self {
            SortKey::Date => "date",
            SortKey::Close => "close",
            SortKey::Volume => "volume",
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Parse a direction; anything other than `desc` sorts ascending
    pub fn parse(s: &str) -> Self {
        if s == "desc" {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Default page size when the caller does not supply a limit
pub const DEFAULT_LIMIT: usize = 100;

/// Largest page size the service boundary accepts
pub const MAX_LIMIT: usize = 1000;

/// Filter, sort, and pagination options for a trade listing
#[derive(Debug, Clone)]
pub struct TradeQuery {
    pub trade_code: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub sort: SortKey,
    pub order: SortOrder,
    pub limit: usize,
    pub offset: usize,
}

impl Default for TradeQuery {
    fn default() -> Self {
        Self {
            trade_code: None,
            date_from: None,
            date_to: None,
            sort: SortKey::default(),
            order: SortOrder::default(),
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

/// One page of results plus the size of the whole filtered set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub total: usize,
    pub items: Vec<Trade>,
}
