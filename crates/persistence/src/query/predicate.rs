//! Query predicates.
//!
//! A [`Predicate`] is a pure value describing a row filter. Predicates compose
//! with [`Predicate::and`], [`Predicate::or`] and [`Predicate::not`], and are
//! compiled into SQL only when a query runs.

use super::fragment::SqlFragment;
use crate::codec::{FieldCodec, SqlType, StoredValue};

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `=`
    Eq,
    /// `<>`
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
}

impl CompareOp {
    fn as_sql(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::NotEq => "<>",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }
}

/// A row filter over an entity's columns.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// `column <op> value`
    Compare {
        /// Column name.
        column: &'static str,
        /// Operator.
        op: CompareOp,
        /// Encoded operand.
        value: StoredValue,
        /// Affinity of the operand, which decides the compared expression.
        sql_type: SqlType,
    },
    /// `column IS NULL`
    IsNull(&'static str),
    /// `column IS NOT NULL`
    IsNotNull(&'static str),
    /// `column IN (values...)`
    In {
        /// Column name.
        column: &'static str,
        /// Encoded candidates.
        values: Vec<StoredValue>,
    },
    /// `column LIKE pattern`
    Like {
        /// Column name.
        column: &'static str,
        /// SQL `LIKE` pattern.
        pattern: String,
    },
    /// Every predicate holds. Empty is always true.
    All(Vec<Predicate>),
    /// At least one predicate holds. Empty is always false.
    Any(Vec<Predicate>),
    /// The predicate does not hold.
    Not(Box<Predicate>),
}

impl Predicate {
    fn compare<T: FieldCodec>(column: &'static str, op: CompareOp, value: T) -> Self {
        let value = value.encode();
        match (op, value.is_null()) {
            (CompareOp::Eq, true) => Predicate::IsNull(column),
            (CompareOp::NotEq, true) => Predicate::IsNotNull(column),
            _ => Predicate::Compare {
                column,
                op,
                value,
                sql_type: T::SQL_TYPE,
            },
        }
    }

    /// `column = value`. A `None` value compiles to `IS NULL`.
    pub fn eq<T: FieldCodec>(column: &'static str, value: T) -> Self {
        Self::compare(column, CompareOp::Eq, value)
    }

    /// `column <> value`. A `None` value compiles to `IS NOT NULL`.
    pub fn not_eq<T: FieldCodec>(column: &'static str, value: T) -> Self {
        Self::compare(column, CompareOp::NotEq, value)
    }

    /// `column < value`
    pub fn lt<T: FieldCodec>(column: &'static str, value: T) -> Self {
        Self::compare(column, CompareOp::Lt, value)
    }

    /// `column <= value`
    pub fn le<T: FieldCodec>(column: &'static str, value: T) -> Self {
        Self::compare(column, CompareOp::Le, value)
    }

    /// `column > value`
    pub fn gt<T: FieldCodec>(column: &'static str, value: T) -> Self {
        Self::compare(column, CompareOp::Gt, value)
    }

    /// `column >= value`
    pub fn ge<T: FieldCodec>(column: &'static str, value: T) -> Self {
        Self::compare(column, CompareOp::Ge, value)
    }

    /// `column IS NULL`
    pub fn is_null(column: &'static str) -> Self {
        Predicate::IsNull(column)
    }

    /// `column IS NOT NULL`
    pub fn is_not_null(column: &'static str) -> Self {
        Predicate::IsNotNull(column)
    }

    /// `column IN (...)`
    pub fn is_in<T: FieldCodec>(column: &'static str, values: impl IntoIterator<Item = T>) -> Self {
        Predicate::In {
            column,
            values: values.into_iter().map(|v| v.encode()).collect(),
        }
    }

    /// `column LIKE pattern`
    pub fn like(column: &'static str, pattern: impl Into<String>) -> Self {
        Predicate::Like {
            column,
            pattern: pattern.into(),
        }
    }

    /// Conjunction of `predicates`.
    pub fn all(predicates: impl IntoIterator<Item = Predicate>) -> Self {
        Predicate::All(predicates.into_iter().collect())
    }

    /// Disjunction of `predicates`.
    pub fn any(predicates: impl IntoIterator<Item = Predicate>) -> Self {
        Predicate::Any(predicates.into_iter().collect())
    }

    /// Negation of `predicate`.
    pub fn not(predicate: Predicate) -> Self {
        Predicate::Not(Box::new(predicate))
    }

    /// `self AND other`
    pub fn and(self, other: Predicate) -> Self {
        match self {
            Predicate::All(mut items) => {
                items.push(other);
                Predicate::All(items)
            }
            first => Predicate::All(vec![first, other]),
        }
    }

    /// `self OR other`
    pub fn or(self, other: Predicate) -> Self {
        match self {
            Predicate::Any(mut items) => {
                items.push(other);
                Predicate::Any(items)
            }
            first => Predicate::Any(vec![first, other]),
        }
    }

    /// Every column this predicate mentions.
    pub fn columns(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        self.collect_columns(&mut out);
        out
    }

    fn collect_columns(&self, out: &mut Vec<&'static str>) {
        match self {
            Predicate::Compare { column, .. }
            | Predicate::IsNull(column)
            | Predicate::IsNotNull(column)
            | Predicate::In { column, .. }
            | Predicate::Like { column, .. } => out.push(*column),
            Predicate::All(items) | Predicate::Any(items) => {
                for item in items {
                    item.collect_columns(out);
                }
            }
            Predicate::Not(inner) => inner.collect_columns(out),
        }
    }

    pub(crate) fn to_sql(&self) -> SqlFragment {
        match self {
            Predicate::Compare {
                column,
                op,
                value,
                sql_type,
            } => SqlFragment::with_params(
                format!("{} {} ?", sql_type.sort_key(column), op.as_sql()),
                vec![value.clone()],
            ),
            Predicate::IsNull(column) => SqlFragment::new(format!("{} IS NULL", column)),
            Predicate::IsNotNull(column) => SqlFragment::new(format!("{} IS NOT NULL", column)),
            Predicate::In { values, .. } if values.is_empty() => SqlFragment::new("1 = 0"),
            Predicate::In { column, values } => {
                let placeholders = vec!["?"; values.len()].join(", ");
                SqlFragment::with_params(
                    format!("{} IN ({})", column, placeholders),
                    values.clone(),
                )
            }
            Predicate::Like { column, pattern } => SqlFragment::with_params(
                format!("{} LIKE ?", column),
                vec![StoredValue::Text(pattern.clone())],
            ),
            Predicate::All(items) => {
                SqlFragment::join(items.iter().map(Predicate::to_sql).collect(), " AND ")
                    .unwrap_or_else(|| SqlFragment::new("1 = 1"))
            }
            Predicate::Any(items) => {
                SqlFragment::join(items.iter().map(Predicate::to_sql).collect(), " OR ")
                    .unwrap_or_else(|| SqlFragment::new("1 = 0"))
            }
            Predicate::Not(inner) => {
                let inner = inner.to_sql();
                SqlFragment::with_params(format!("NOT ({})", inner.sql), inner.params)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_sql() {
        let sql = Predicate::ge("score", 3i64).to_sql();
        assert_eq!(sql.sql, "score >= ?");
        assert_eq!(sql.params, vec![StoredValue::Integer(3)]);
    }

    #[test]
    fn test_timestamp_compare_uses_sort_key() {
        let at = chrono::DateTime::from_timestamp(0, 0).unwrap();
        let sql = Predicate::gt("created_at", at).to_sql();
        assert!(sql.sql.starts_with("(CASE WHEN length(created_at) = 19"));
        assert!(sql.sql.ends_with("ELSE created_at END) > ?"));
        assert_eq!(sql.params, vec![StoredValue::from("1970-01-01T00:00:00.000000Z")]);
    }

    #[test]
    fn test_eq_none_becomes_is_null() {
        assert_eq!(
            Predicate::eq("expires_at", None::<String>),
            Predicate::IsNull("expires_at")
        );
        assert_eq!(
            Predicate::not_eq("expires_at", None::<String>),
            Predicate::IsNotNull("expires_at")
        );
    }

    #[test]
    fn test_nested_sql() {
        let p = Predicate::is_not_null("published_at")
            .and(Predicate::any([
                Predicate::is_null("expires_at"),
                Predicate::ge("expires_at", "2024".to_string()),
            ]));
        let sql = p.to_sql();
        assert_eq!(
            sql.sql,
            "(published_at IS NOT NULL) AND ((expires_at IS NULL) OR (expires_at >= ?))"
        );
        assert_eq!(sql.params.len(), 1);
    }

    #[test]
    fn test_empty_in_matches_nothing() {
        assert_eq!(
            Predicate::is_in("id", Vec::<i64>::new()).to_sql().sql,
            "1 = 0"
        );
        assert_eq!(
            Predicate::is_in("id", [1i64, 2]).to_sql().sql,
            "id IN (?, ?)"
        );
    }

    #[test]
    fn test_not_and_columns() {
        let p = Predicate::not(Predicate::like("title", "%draft%")).and(Predicate::eq("author_id", 4i64));
        assert_eq!(p.to_sql().sql, "(NOT (title LIKE ?)) AND (author_id = ?)");
        assert_eq!(p.columns(), vec!["title", "author_id"]);
    }

    #[test]
    fn test_empty_groups() {
        assert_eq!(Predicate::all([]).to_sql().sql, "1 = 1");
        assert_eq!(Predicate::any([]).to_sql().sql, "1 = 0");
    }
}
