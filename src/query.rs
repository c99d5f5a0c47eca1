//! Query engine: filter/order/limit constraint evaluation over a
//! collection's documents.
//!
//! Evaluation order is fixed:
//!
//! 1. every filter is applied as a logical AND;
//! 2. the first `order_by` observed stable-sorts the survivors (ties keep
//!    enumeration order);
//! 3. the first `limit` observed truncates after sorting.
//!
//! Constraints fold left-to-right without replacing a prior assignment, so
//! later `order_by`/`limit` constraints in the same call are ignored. This
//! is the authoritative behavior, not an accident of implementation. An
//! empty constraint list returns the whole collection in enumeration order.

use crate::error::Error;
use crate::store::Document;
use crate::value::{is_timestamp_path, Value};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Filter comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    /// `==`
    Eq,
    /// `!=`
    Ne,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `in` — the constraint value is a list, tests membership of the field.
    In,
    /// `not-in` — the constraint value is a list, tests non-membership.
    NotIn,
    /// `array-contains` — the field is a list, tests membership of the
    /// constraint value.
    ArrayContains,
}

impl FromStr for FilterOp {
    type Err = Error;

    /// Parse the wire spelling of an operator.
    ///
    /// An unrecognized spelling is an [`Error::InvalidQuery`], never a
    /// match-everything predicate.
    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "==" => Ok(FilterOp::Eq),
            "!=" => Ok(FilterOp::Ne),
            ">" => Ok(FilterOp::Gt),
            ">=" => Ok(FilterOp::Ge),
            "<" => Ok(FilterOp::Lt),
            "<=" => Ok(FilterOp::Le),
            "in" => Ok(FilterOp::In),
            "not-in" => Ok(FilterOp::NotIn),
            "array-contains" => Ok(FilterOp::ArrayContains),
            other => Err(Error::InvalidQuery(format!(
                "unrecognized filter operator `{other}`"
            ))),
        }
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FilterOp::Eq => "==",
            FilterOp::Ne => "!=",
            FilterOp::Gt => ">",
            FilterOp::Ge => ">=",
            FilterOp::Lt => "<",
            FilterOp::Le => "<=",
            FilterOp::In => "in",
            FilterOp::NotIn => "not-in",
            FilterOp::ArrayContains => "array-contains",
        };
        f.write_str(s)
    }
}

/// Sort direction. Defaults to ascending.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Ascending (default).
    #[default]
    Asc,
    /// Descending.
    Desc,
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "asc" => Ok(Direction::Asc),
            "desc" => Ok(Direction::Desc),
            other => Err(Error::InvalidQuery(format!(
                "unrecognized sort direction `{other}`"
            ))),
        }
    }
}

/// One query constraint.
#[derive(Debug, Clone)]
pub enum Constraint {
    /// Keep documents whose resolved field satisfies `op` against `value`.
    Filter {
        /// Dot-separated field path.
        field: String,
        /// Comparison operator.
        op: FilterOp,
        /// Right-hand operand.
        value: Value,
    },
    /// Stable-sort by the named field.
    OrderBy {
        /// Dot-separated field path.
        field: String,
        /// Sort direction.
        direction: Direction,
    },
    /// Cap the result length after sorting.
    Limit(usize),
}

impl Constraint {
    /// `where(field, op, value)` constraint.
    pub fn filter(field: impl Into<String>, op: FilterOp, value: impl Into<Value>) -> Self {
        Constraint::Filter {
            field: field.into(),
            op,
            value: value.into(),
        }
    }

    /// `orderBy(field, direction)` constraint.
    pub fn order_by(field: impl Into<String>, direction: Direction) -> Self {
        Constraint::OrderBy {
            field: field.into(),
            direction,
        }
    }

    /// `limit(count)` constraint.
    pub fn limit(count: usize) -> Self {
        Constraint::Limit(count)
    }
}

/// Evaluate constraints over documents in enumeration order.
pub fn evaluate(docs: Vec<Document>, constraints: &[Constraint]) -> Vec<Document> {
    let mut order: Option<(&str, Direction)> = None;
    let mut limit: Option<usize> = None;
    let mut filters: Vec<(&str, FilterOp, &Value)> = Vec::new();

    for constraint in constraints {
        match constraint {
            Constraint::Filter { field, op, value } => filters.push((field, *op, value)),
            Constraint::OrderBy { field, direction } => {
                if order.is_none() {
                    order = Some((field, *direction));
                }
            }
            Constraint::Limit(count) => {
                if limit.is_none() {
                    limit = Some(*count);
                }
            }
        }
    }

    let mut out: Vec<Document> = docs
        .into_iter()
        .filter(|doc| {
            filters
                .iter()
                .all(|(field, op, value)| matches(doc, field, *op, value))
        })
        .collect();

    if let Some((field, direction)) = order {
        // sort_by is stable: ties keep enumeration order.
        out.sort_by(|a, b| compare_for_sort(field, direction, a, b));
    }
    if let Some(count) = limit {
        out.truncate(count);
    }
    out
}

fn value_eq(a: &Value, b: &Value) -> bool {
    a.compare(b) == Some(Ordering::Equal)
}

fn matches(doc: &Document, field: &str, op: FilterOp, value: &Value) -> bool {
    let resolved = doc.field(field);
    match op {
        FilterOp::Eq => resolved.map_or(false, |v| value_eq(v, value)),
        // An undefined field is not-equal to anything, so `!=` accepts it.
        FilterOp::Ne => resolved.map_or(true, |v| !value_eq(v, value)),
        FilterOp::Gt => ordered(resolved, value, |o| o == Ordering::Greater),
        FilterOp::Ge => ordered(resolved, value, |o| o != Ordering::Less),
        FilterOp::Lt => ordered(resolved, value, |o| o == Ordering::Less),
        FilterOp::Le => ordered(resolved, value, |o| o != Ordering::Greater),
        FilterOp::In => match (resolved, value.as_array()) {
            (Some(v), Some(list)) => list.iter().any(|m| value_eq(m, v)),
            _ => false,
        },
        FilterOp::NotIn => match (resolved, value.as_array()) {
            (Some(v), Some(list)) => !list.iter().any(|m| value_eq(m, v)),
            // Undefined is in no list, but a non-list operand never matches.
            (None, Some(_)) => true,
            _ => false,
        },
        FilterOp::ArrayContains => resolved
            .and_then(Value::as_array)
            .map_or(false, |list| list.iter().any(|m| value_eq(m, value))),
    }
}

fn ordered(resolved: Option<&Value>, value: &Value, pred: impl Fn(Ordering) -> bool) -> bool {
    resolved
        .and_then(|v| v.compare(value))
        .map_or(false, pred)
}

/// Field comparator for sorting.
///
/// Undefined sorts lower than any defined value ascending and higher
/// descending — documents missing the field surface first either way. On a
/// timestamp-like path, string operands are attempted as instants, with the
/// coercion silently skipped if either side fails to parse.
fn compare_for_sort(field: &str, direction: Direction, a: &Document, b: &Document) -> Ordering {
    match (a.field(field), b.field(field)) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => {
            let ord = if is_timestamp_path(field) {
                match (x.coerce_instant(), y.coerce_instant()) {
                    (Some(xi), Some(yi)) => Some(xi.cmp(&yi)),
                    _ => x.compare(y),
                }
            } else {
                x.compare(y)
            };
            // Incomparable pairs keep enumeration order.
            let ord = ord.unwrap_or(Ordering::Equal);
            match direction {
                Direction::Asc => ord,
                Direction::Desc => ord.reverse(),
            }
        }
    }
}
