//! Sort specifications for store queries.

use std::cmp::Ordering;

use serde_json::Value;

use crate::filter::compare_values;

/// A single sort key.
#[derive(Debug, Clone)]
pub struct SortKey {
    pub field: String,
    pub descending: bool,
}

/// Ordered list of sort keys applied to documents.
#[derive(Debug, Clone, Default)]
pub struct SortSpec {
    keys: Vec<SortKey>,
}

impl SortSpec {
    pub fn new(keys: Vec<SortKey>) -> Self {
        Self { keys }
    }

    /// Parse a comma-separated field list. A leading `-` marks a field as
    /// descending; empty segments are skipped.
    pub fn parse(raw: &str) -> Self {
        let keys = raw
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty() && *part != "-")
            .map(|part| match part.strip_prefix('-') {
                Some(field) => SortKey {
                    field: field.to_string(),
                    descending: true,
                },
                None => SortKey {
                    field: part.to_string(),
                    descending: false,
                },
            })
            .collect();
        Self { keys }
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Compare two documents under this spec. Fields that are missing or
    /// not mutually comparable leave the pair equal, falling through to the
    /// next key.
    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        for key in &self.keys {
            let ordering = match (a.get(&key.field), b.get(&key.field)) {
                (Some(a), Some(b)) => compare_values(a, b).unwrap_or(Ordering::Equal),
                _ => Ordering::Equal,
            };
            let ordering = if key.descending {
                ordering.reverse()
            } else {
                ordering
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_direction_prefix() {
        let spec = SortSpec::parse("-created_at,title");
        assert!(!spec.is_empty());
        assert_eq!(spec.keys.len(), 2);
        assert_eq!(spec.keys[0].field, "created_at");
        assert!(spec.keys[0].descending);
        assert_eq!(spec.keys[1].field, "title");
        assert!(!spec.keys[1].descending);
    }

    #[test]
    fn skips_empty_segments() {
        let spec = SortSpec::parse("title,,");
        assert_eq!(spec.keys.len(), 1);
    }

    #[test]
    fn compares_with_fallthrough() {
        let spec = SortSpec::parse("genre,-published_year");
        let a = json!({"genre": "fantasy", "published_year": 1954});
        let b = json!({"genre": "fantasy", "published_year": 1968});

        assert_eq!(spec.compare(&a, &b), Ordering::Greater);
        assert_eq!(spec.compare(&b, &a), Ordering::Less);
    }

    #[test]
    fn missing_fields_compare_equal() {
        let spec = SortSpec::parse("publisher");
        let a = json!({"title": "a"});
        let b = json!({"publisher": "x"});
        assert_eq!(spec.compare(&a, &b), Ordering::Equal);
    }
}
