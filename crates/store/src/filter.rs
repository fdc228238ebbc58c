//! Store-native filter predicates.
//!
//! A [`Filter`] is a conjunction of field conditions, optionally combined
//! with a disjunctive group. Matching happens against plain JSON documents.

use std::cmp::Ordering;

use serde_json::Value;

/// Comparison operators a condition can apply to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    /// Case-insensitive substring match on string fields
    Contains,
}

impl Op {
    /// Parse the operator tag used in request parameter values.
    pub fn parse(tag: &str) -> Option<Self> {
        match tag {
            "eq" => Some(Op::Eq),
            "ne" => Some(Op::Ne),
            "gt" => Some(Op::Gt),
            "gte" => Some(Op::Gte),
            "lt" => Some(Op::Lt),
            "lte" => Some(Op::Lte),
            "contains" => Some(Op::Contains),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Op::Eq => "eq",
            Op::Ne => "ne",
            Op::Gt => "gt",
            Op::Gte => "gte",
            Op::Lt => "lt",
            Op::Lte => "lte",
            Op::Contains => "contains",
        }
    }
}

/// A single field condition.
#[derive(Debug, Clone)]
pub struct Condition {
    pub field: String,
    pub op: Op,
    pub value: Value,
}

impl Condition {
    pub fn new(field: impl Into<String>, op: Op, value: Value) -> Self {
        Self {
            field: field.into(),
            op,
            value,
        }
    }

    /// Equality condition.
    pub fn eq(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, Op::Eq, value)
    }

    /// Case-insensitive substring condition.
    pub fn contains(field: impl Into<String>, needle: impl Into<String>) -> Self {
        Self::new(field, Op::Contains, Value::String(needle.into()))
    }

    /// Whether `doc` satisfies this condition. Documents missing the field
    /// never match.
    pub fn matches(&self, doc: &Value) -> bool {
        let Some(field_value) = doc.get(&self.field) else {
            return false;
        };

        match self.op {
            Op::Eq => field_value == &self.value,
            Op::Ne => field_value != &self.value,
            Op::Gt => compare_values(field_value, &self.value) == Some(Ordering::Greater),
            Op::Gte => matches!(
                compare_values(field_value, &self.value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Op::Lt => compare_values(field_value, &self.value) == Some(Ordering::Less),
            Op::Lte => matches!(
                compare_values(field_value, &self.value),
                Some(Ordering::Less | Ordering::Equal)
            ),
            Op::Contains => match (field_value.as_str(), self.value.as_str()) {
                (Some(haystack), Some(needle)) => {
                    haystack.to_lowercase().contains(&needle.to_lowercase())
                }
                _ => false,
            },
        }
    }
}

/// Order two JSON values when they are comparable (numbers or strings).
pub(crate) fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => {
            let a = a.as_f64()?;
            let b = b.as_f64()?;
            a.partial_cmp(&b)
        }
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => None,
    }
}

/// Conjunction of conditions, with an optional OR group.
///
/// A document matches when every `all` condition holds and, if the `any`
/// group is non-empty, at least one of its conditions holds.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    all: Vec<Condition>,
    any: Vec<Condition>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a condition every document must satisfy.
    pub fn and(mut self, condition: Condition) -> Self {
        self.all.push(condition);
        self
    }

    /// Add a condition to the OR group.
    pub fn or(mut self, condition: Condition) -> Self {
        self.any.push(condition);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty() && self.any.is_empty()
    }

    pub fn matches(&self, doc: &Value) -> bool {
        self.all.iter().all(|c| c.matches(doc))
            && (self.any.is_empty() || self.any.iter().any(|c| c.matches(doc)))
    }
}
