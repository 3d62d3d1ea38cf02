//! Row-filter expressions
//!
//! A subscription may narrow its channel to rows matching a
//! `column=eq.value` expression, the same shape the hosted change stream
//! accepts server-side. The adapter re-applies the filter client-side so
//! behavior does not depend on the transport honoring it.

use crate::error::SubscriptionError;
use std::fmt;
use std::str::FromStr;

/// Supported filter operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    /// Column equals value
    Eq,
    /// Column does not equal value
    Neq,
}

impl FilterOp {
    fn parse(token: &str) -> Option<Self> {
        match token {
            "eq" => Some(FilterOp::Eq),
            "neq" => Some(FilterOp::Neq),
            _ => None,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            FilterOp::Eq => "eq",
            FilterOp::Neq => "neq",
        }
    }
}

/// Parsed row-filter expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowFilter {
    column: String,
    op: FilterOp,
    value: String,
}

impl RowFilter {
    /// Build an equality filter
    #[inline]
    #[must_use]
    pub fn eq(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            op: FilterOp::Eq,
            value: value.into(),
        }
    }

    /// Filtered column name
    #[inline]
    #[must_use]
    pub fn column(&self) -> &str {
        &self.column
    }

    /// Check a raw row payload against this filter
    ///
    /// Absent columns never match an equality filter and always pass a
    /// non-equality filter.
    #[must_use]
    pub fn matches(&self, row: &serde_json::Value) -> bool {
        let field = row.get(&self.column);
        let equal = match field {
            Some(serde_json::Value::String(s)) => s == &self.value,
            Some(other) => other.to_string() == self.value,
            None => false,
        };
        match self.op {
            FilterOp::Eq => equal,
            FilterOp::Neq => !equal,
        }
    }
}

impl FromStr for RowFilter {
    type Err = SubscriptionError;

    fn from_str(expr: &str) -> Result<Self, Self::Err> {
        let (column, rest) = expr
            .split_once('=')
            .ok_or_else(|| SubscriptionError::InvalidFilter(expr.to_string()))?;
        let (op_token, value) = rest
            .split_once('.')
            .ok_or_else(|| SubscriptionError::InvalidFilter(expr.to_string()))?;
        if column.is_empty() {
            return Err(SubscriptionError::InvalidFilter(expr.to_string()));
        }
        let op = FilterOp::parse(op_token)
            .ok_or_else(|| SubscriptionError::InvalidFilter(expr.to_string()))?;
        Ok(Self {
            column: column.to_string(),
            op,
            value: value.to_string(),
        })
    }
}

impl fmt::Display for RowFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}.{}", self.column, self.op.as_str(), self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_equality_expression() {
        let filter: RowFilter = "org_id=eq.org-42".parse().unwrap();
        assert_eq!(filter, RowFilter::eq("org_id", "org-42"));
    }

    #[test]
    fn parse_rejects_malformed_expressions() {
        for expr in ["org_id", "=eq.x", "org_id=like.x", "org_id=eqx"] {
            let result: Result<RowFilter, _> = expr.parse();
            assert!(
                matches!(result, Err(SubscriptionError::InvalidFilter(_))),
                "expected parse failure for {expr:?}"
            );
        }
    }

    #[test]
    fn display_round_trip() {
        let filter = RowFilter::eq("org_id", "org-7");
        let reparsed: RowFilter = filter.to_string().parse().unwrap();
        assert_eq!(filter, reparsed);
    }

    #[test]
    fn matches_string_and_non_string_columns() {
        let filter = RowFilter::eq("org_id", "org-1");
        assert!(filter.matches(&json!({"org_id": "org-1"})));
        assert!(!filter.matches(&json!({"org_id": "org-2"})));
        assert!(!filter.matches(&json!({"title": "no org column"})));

        let level: RowFilter = "level=eq.3".parse().unwrap();
        assert!(level.matches(&json!({"level": 3})));
    }

    #[test]
    fn neq_passes_absent_columns() {
        let filter: RowFilter = "status=neq.closed".parse().unwrap();
        assert!(filter.matches(&json!({"status": "open"})));
        assert!(!filter.matches(&json!({"status": "closed"})));
        assert!(filter.matches(&json!({})));
    }
}
