//! In-memory query engine
//!
//! Filter, sort, and paginate a materialized collection of canonical
//! trades. The SQL rendition in the relational store must produce the
//! same `(total, page)` for the same logical data; the conformance tests
//! in `store` hold both to this.

use crate::model::{Page, SortKey, SortOrder, Trade, TradeQuery};
use std::cmp::Ordering;

/// Run a query against a materialized collection.
///
/// Filters apply in order: instrument code (ASCII-case-insensitive
/// equality), then inclusive date lower bound, then inclusive upper
/// bound. Date bounds are plain string comparisons and a record with an
/// empty date never satisfies one. `total` counts the filtered set before
/// pagination. Sorting is stable, so records with equal keys keep their
/// input order in both directions.
pub fn run_query(rows: &[Trade], query: &TradeQuery) -> Page {
    let mut filtered: Vec<&Trade> = rows
        .iter()
        .filter(|t| matches_filters(t, query))
        .collect();

    filtered.sort_by(|a, b| match query.order {
        SortOrder::Asc => compare(a, b, query.sort),
        SortOrder::Desc => compare(b, a, query.sort),
    });

    let total = filtered.len();
    let items = filtered
        .into_iter()
        .skip(query.offset)
        .take(query.limit)
        .cloned()
        .collect();

    Page { total, items }
}

fn matches_filters(trade: &Trade, query: &TradeQuery) -> bool {
    if let Some(code) = query.trade_code.as_deref() {
        if !code.is_empty() && !trade.trade_code.eq_ignore_ascii_case(code) {
            return false;
        }
    }
    if let Some(from) = query.date_from.as_deref() {
        if !from.is_empty() && (trade.date.is_empty() || trade.date.as_str() < from) {
            return false;
        }
    }
    if let Some(to) = query.date_to.as_deref() {
        if !to.is_empty() && (trade.date.is_empty() || trade.date.as_str() > to) {
            return false;
        }
    }
    true
}

fn compare(a: &Trade, b: &Trade, key: SortKey) -> Ordering {
    match key {
        SortKey::Date => a.date.cmp(&b.date),
        SortKey::Close => a.close.total_cmp(&b.close),
        SortKey::Volume => a.volume.cmp(&b.volume),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trade(date: &str, code: &str, close: f64, volume: i64) -> Trade {
        Trade {
            id: None,
            date: date.to_string(),
            trade_code: code.to_string(),
            open: 0.0,
            high: 0.0,
            low: 0.0,
            close,
            volume,
        }
    }

    fn sample() -> Vec<Trade> {
        vec![
            trade("2020-01-02", "ABC", 10.0, 100),
            trade("2020-01-01", "ABC", 20.0, 50),
            trade("2020-01-03", "XYZ", 5.0, 700),
            trade("", "ABC", 1.0, 10),
        ]
    }

    #[test]
    fn test_code_filter_is_case_insensitive() {
        let page = run_query(
            &sample(),
            &TradeQuery {
                trade_code: Some("abc".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(page.total, 3);
        assert!(page.items.iter().all(|t| t.trade_code == "ABC"));
    }

    #[test]
    fn test_date_bounds_exclude_empty_dates() {
        let rows = sample();

        let page = run_query(
            &rows,
            &TradeQuery {
                date_from: Some("2020-01-02".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(page.total, 2);

        // an empty date is below every bound lexicographically, but it must
        // not satisfy the upper bound either
        let page = run_query(
            &rows,
            &TradeQuery {
                date_to: Some("2020-01-02".to_string()),
                ..Default::default()
            },
        );
        assert_eq!(page.total, 2);
        assert!(page.items.iter().all(|t| !t.date.is_empty()));
    }

    #[test]
    fn test_total_is_computed_before_pagination() {
        let page = run_query(
            &sample(),
            &TradeQuery {
                limit: 2,
                ..Default::default()
            },
        );
        assert_eq!(page.total, 4);
        assert_eq!(page.items.len(), 2);
    }

    #[test]
    fn test_offset_past_total_yields_empty_page() {
        let page = run_query(
            &sample(),
            &TradeQuery {
                offset: 100,
                ..Default::default()
            },
        );
        assert_eq!(page.total, 4);
        assert!(page.items.is_empty());
    }

    #[test]
    fn test_sort_is_stable_for_ties() {
        let rows = vec![
            trade("2020-01-01", "AAA", 5.0, 10),
            trade("2020-01-01", "BBB", 5.0, 10),
            trade("2020-01-01", "CCC", 5.0, 10),
        ];

        let asc = run_query(
            &rows,
            &TradeQuery {
                sort: SortKey::Close,
                ..Default::default()
            },
        );
        let codes: Vec<&str> = asc.items.iter().map(|t| t.trade_code.as_str()).collect();
        assert_eq!(codes, ["AAA", "BBB", "CCC"]);

        let desc = run_query(
            &rows,
            &TradeQuery {
                sort: SortKey::Close,
                order: SortOrder::Desc,
                ..Default::default()
            },
        );
        let codes: Vec<&str> = desc.items.iter().map(|t| t.trade_code.as_str()).collect();
        assert_eq!(codes, ["AAA", "BBB", "CCC"]);
    }

    #[test]
    fn test_sort_by_volume_desc() {
        let page = run_query(
            &sample(),
            &TradeQuery {
                sort: SortKey::Volume,
                order: SortOrder::Desc,
                ..Default::default()
            },
        );
        let volumes: Vec<i64> = page.items.iter().map(|t| t.volume).collect();
        assert_eq!(volumes, [700, 100, 50, 10]);
    }

    #[test]
    fn test_end_to_end_example() {
        let rows = vec![
            trade("2020-01-02", "ABC", 10.0, 100),
            trade("2020-01-01", "ABC", 20.0, 50),
        ];
        let page = run_query(
            &rows,
            &TradeQuery {
                trade_code: Some("abc".to_string()),
                limit: 10,
                ..Default::default()
            },
        );
        assert_eq!(page.total, 2);
        assert_eq!(page.items[0].date, "2020-01-01");
        assert_eq!(page.items[1].date, "2020-01-02");
    }
}
