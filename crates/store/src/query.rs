//! Dynamic query building from raw request parameters.
//!
//! Translates the flat `key=value` parameter map of a list request into a
//! bounded store query: reserved control keys drive pagination and sort
//! order, everything else becomes a filter condition on the named field. No
//! field allow-list is applied; a condition on a field no document carries
//! simply matches nothing.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;

use crate::filter::{Condition, Filter, Op};
use crate::sort::SortSpec;

/// Parameter names that control the query rather than filter it.
pub const RESERVED_PARAMS: &[&str] = &["page", "limit", "sort"];

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;
pub const DEFAULT_SORT: &str = "-created_at";

/// Build a filter from every non-reserved parameter.
///
/// A value may carry an operator tag separated by the first dot
/// (`published_year=gte.1950`); an unrecognized tag leaves the whole value
/// as an equality match.
pub fn filter_from_params(params: &HashMap<String, String>) -> Filter {
    let mut filter = Filter::new();
    for (key, value) in params {
        if RESERVED_PARAMS.contains(&key.as_str()) {
            continue;
        }
        filter = filter.and(parse_condition(key, value));
    }
    filter
}

/// Filter matching `title` OR `author` as a case-insensitive substring.
pub fn search_filter(needle: &str) -> Filter {
    Filter::new()
        .or(Condition::contains("title", needle))
        .or(Condition::contains("author", needle))
}

fn parse_condition(field: &str, raw: &str) -> Condition {
    if let Some((tag, rest)) = raw.split_once('.') {
        if let Some(op) = Op::parse(tag) {
            return Condition::new(field, op, coerce_value(rest));
        }
    }
    Condition::eq(field, coerce_value(raw))
}

/// Interpret a raw parameter value as null, bool, number, or string.
fn coerce_value(raw: &str) -> Value {
    match raw {
        "null" => return Value::Null,
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(n) = raw.parse::<i64>() {
        return Value::Number(n.into());
    }
    if let Ok(n) = raw.parse::<f64>() {
        if let Some(n) = serde_json::Number::from_f64(n) {
            return Value::Number(n);
        }
    }
    Value::String(raw.to_string())
}

/// Page-based window over a result set.
///
/// Both values must be positive integers; anything missing or malformed
/// falls back to the defaults rather than erroring.
#[derive(Debug, Clone, Copy)]
pub struct PageParams {
    pub page: u64,
    pub limit: u64,
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageParams {
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        Self {
            page: parse_positive(params.get("page")).unwrap_or(DEFAULT_PAGE),
            limit: parse_positive(params.get("limit")).unwrap_or(DEFAULT_LIMIT),
        }
    }

    /// Records to skip before the window starts.
    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

fn parse_positive(raw: Option<&String>) -> Option<u64> {
    raw.and_then(|v| v.parse::<u64>().ok()).filter(|v| *v > 0)
}

/// A fully planned list query: filter, sort order, and page window.
#[derive(Debug, Clone)]
pub struct QueryPlan {
    pub filter: Filter,
    pub sort: SortSpec,
    pub page: PageParams,
}

/// Plan a bounded, deterministic query from raw request parameters.
pub fn plan(params: &HashMap<String, String>) -> QueryPlan {
    let sort = match params.get("sort") {
        Some(raw) if !raw.trim().is_empty() => SortSpec::parse(raw),
        _ => SortSpec::parse(DEFAULT_SORT),
    };
    QueryPlan {
        filter: filter_from_params(params),
        sort,
        page: PageParams::from_params(params),
    }
}

/// Reference to an adjacent page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRef {
    pub page: u64,
    pub limit: u64,
}

/// Adjacent-page availability for a result window.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct Pagination {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<PageRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<PageRef>,
}

impl Pagination {
    /// Descriptor for the window `page`/`limit` over `total` records:
    /// `next` exists iff records remain past the window's end, `prev` iff
    /// the window does not start at the first record.
    pub fn window(page: u64, limit: u64, total: u64) -> Self {
        let next = (page.saturating_mul(limit) < total).then_some(PageRef {
            page: page.saturating_add(1),
            limit,
        });
        let prev = (page > 1).then_some(PageRef {
            page: page - 1,
            limit,
        });
        Self { next, prev }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn reserved_params_are_not_filters() {
        let filter = filter_from_params(&params(&[
            ("page", "2"),
            ("limit", "5"),
            ("sort", "title"),
            ("genre", "fantasy"),
        ]));

        assert!(filter.matches(&json!({"genre": "fantasy"})));
        assert!(!filter.matches(&json!({"genre": "horror"})));
        // A document with no page/limit/sort fields still matches.
        assert!(filter.matches(&json!({"genre": "fantasy", "title": "x"})));
    }

    #[test]
    fn operator_tagged_values() {
        let filter = filter_from_params(&params(&[("published_year", "gte.1950")]));

        assert!(filter.matches(&json!({"published_year": 1954})));
        assert!(!filter.matches(&json!({"published_year": 1937})));
    }

    #[test]
    fn unrecognized_tag_is_plain_equality() {
        let filter = filter_from_params(&params(&[("author", "J. R. R. Tolkien")]));

        assert!(filter.matches(&json!({"author": "J. R. R. Tolkien"})));
        assert!(!filter.matches(&json!({"author": "J"})));
    }

    #[test]
    fn values_are_coerced() {
        assert_eq!(coerce_value("42"), json!(42));
        assert_eq!(coerce_value("2.5"), json!(2.5));
        assert_eq!(coerce_value("true"), json!(true));
        assert_eq!(coerce_value("null"), Value::Null);
        assert_eq!(coerce_value("dune"), json!("dune"));
    }

    #[test]
    fn page_params_default_and_fall_back() {
        assert_eq!(PageParams::from_params(&params(&[])).page, 1);
        assert_eq!(PageParams::from_params(&params(&[])).limit, 10);

        let bad = PageParams::from_params(&params(&[("page", "abc"), ("limit", "-3")]));
        assert_eq!(bad.page, 1);
        assert_eq!(bad.limit, 10);

        let zero = PageParams::from_params(&params(&[("page", "0"), ("limit", "0")]));
        assert_eq!(zero.page, 1);
        assert_eq!(zero.limit, 10);
    }

    #[test]
    fn skip_follows_page_window() {
        let p = PageParams { page: 3, limit: 10 };
        assert_eq!(p.skip(), 20);
    }

    #[test]
    fn plan_defaults_sort_to_newest_first() {
        let plan = plan(&params(&[]));
        assert!(!plan.sort.is_empty());

        let newer = json!({"created_at": "2026-02-01T00:00:00Z"});
        let older = json!({"created_at": "2026-01-01T00:00:00Z"});
        assert_eq!(
            plan.sort.compare(&newer, &older),
            std::cmp::Ordering::Less,
            "newest first"
        );
    }

    #[test]
    fn pagination_window_edges() {
        // 15 records, limit 10: page 1 has next only, page 2 has prev only.
        let first = Pagination::window(1, 10, 15);
        assert_eq!(first.next, Some(PageRef { page: 2, limit: 10 }));
        assert_eq!(first.prev, None);

        let second = Pagination::window(2, 10, 15);
        assert_eq!(second.next, None);
        assert_eq!(second.prev, Some(PageRef { page: 1, limit: 10 }));
    }

    #[test]
    fn out_of_range_page_has_no_next() {
        let far = Pagination::window(9, 10, 15);
        assert_eq!(far.next, None);
        assert_eq!(far.prev, Some(PageRef { page: 8, limit: 10 }));
    }

    #[test]
    fn empty_set_has_neither_edge() {
        let none = Pagination::window(1, 10, 0);
        assert_eq!(none.next, None);
        assert_eq!(none.prev, None);

        let serialized = serde_json::to_value(none).unwrap();
        assert_eq!(serialized, json!({}));
    }
}
