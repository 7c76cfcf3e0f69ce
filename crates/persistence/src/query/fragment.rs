//! SQL fragments and compiled statements.

use crate::codec::StoredValue;

/// A SQL fragment with associated parameters.
///
/// Placeholders are positional `?`, so fragments concatenate without
/// renumbering.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct SqlFragment {
    /// The SQL string with `?` placeholders.
    pub sql: String,
    /// The parameter values, in placeholder order.
    pub params: Vec<StoredValue>,
}

impl SqlFragment {
    /// Creates a new fragment with no parameters.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Creates a fragment with parameters.
    pub fn with_params(sql: impl Into<String>, params: Vec<StoredValue>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    /// Joins fragments with `separator`, wrapping each in parentheses.
    pub fn join(fragments: Vec<SqlFragment>, separator: &str) -> Option<SqlFragment> {
        if fragments.is_empty() {
            return None;
        }

        let mut sql = Vec::with_capacity(fragments.len());
        let mut params = Vec::new();
        for fragment in fragments {
            sql.push(format!("({})", fragment.sql));
            params.extend(fragment.params);
        }

        Some(SqlFragment {
            sql: sql.join(separator),
            params,
        })
    }

    /// Appends `other`, separated by a space.
    pub fn push(&mut self, other: SqlFragment) {
        if other.sql.is_empty() {
            return;
        }
        if !self.sql.is_empty() {
            self.sql.push(' ');
        }
        self.sql.push_str(&other.sql);
        self.params.extend(other.params);
    }
}

/// A compiled statement ready for an [`Executor`](crate::core::Executor).
///
/// Only this crate can build statements.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    sql: String,
    params: Vec<StoredValue>,
}

impl Statement {
    pub(crate) fn new(sql: impl Into<String>, params: Vec<StoredValue>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    /// The SQL text.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// The bound parameters.
    pub fn params(&self) -> &[StoredValue] {
        &self.params
    }
}

impl From<SqlFragment> for Statement {
    fn from(fragment: SqlFragment) -> Self {
        Statement::new(fragment.sql, fragment.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_wraps_and_orders_params() {
        let joined = SqlFragment::join(
            vec![
                SqlFragment::with_params("a = ?", vec![StoredValue::Integer(1)]),
                SqlFragment::with_params("b = ? OR c = ?", vec!["x".into(), "y".into()]),
            ],
            " AND ",
        )
        .unwrap();
        assert_eq!(joined.sql, "(a = ?) AND (b = ? OR c = ?)");
        assert_eq!(
            joined.params,
            vec![StoredValue::Integer(1), "x".into(), "y".into()]
        );
    }

    #[test]
    fn test_join_empty() {
        assert!(SqlFragment::join(Vec::new(), " AND ").is_none());
    }

    #[test]
    fn test_push() {
        let mut fragment = SqlFragment::new("SELECT * FROM goals");
        fragment.push(SqlFragment::with_params("LIMIT ?", vec![StoredValue::Integer(5)]));
        assert_eq!(fragment.sql, "SELECT * FROM goals LIMIT ?");
        assert_eq!(fragment.params.len(), 1);
    }
}
