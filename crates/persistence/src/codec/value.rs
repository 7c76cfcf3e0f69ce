//! Storage-level values and rows.

use std::sync::Arc;

use super::FieldCodec;
use crate::error::DecodeError;

/// A primitive value as the storage engine holds it.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredValue {
    /// SQL NULL.
    Null,
    /// A 64-bit integer.
    Integer(i64),
    /// A double-precision float.
    Real(f64),
    /// UTF-8 text.
    Text(String),
}

impl StoredValue {
    /// Returns `true` for [`StoredValue::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, StoredValue::Null)
    }

    /// Short name of the primitive type, used in decode errors.
    pub fn kind(&self) -> &'static str {
        match self {
            StoredValue::Null => "null",
            StoredValue::Integer(_) => "integer",
            StoredValue::Real(_) => "real",
            StoredValue::Text(_) => "text",
        }
    }
}

impl From<&str> for StoredValue {
    fn from(value: &str) -> Self {
        StoredValue::Text(value.to_string())
    }
}

impl From<String> for StoredValue {
    fn from(value: String) -> Self {
        StoredValue::Text(value)
    }
}

impl From<i64> for StoredValue {
    fn from(value: i64) -> Self {
        StoredValue::Integer(value)
    }
}

/// One row returned by the storage engine.
///
/// Column names are shared between all rows of a result set.
#[derive(Debug, Clone)]
pub struct StoredRow {
    columns: Arc<[String]>,
    values: Vec<StoredValue>,
}

impl StoredRow {
    /// Creates a row. `values` is positionally aligned with `columns`.
    pub fn new(columns: Arc<[String]>, values: Vec<StoredValue>) -> Self {
        Self { columns, values }
    }

    /// Returns the raw value of `column`, if the row has it.
    pub fn value(&self, column: &str) -> Option<&StoredValue> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|idx| self.values.get(idx))
    }

    /// Decodes `column` into `T`.
    pub fn get<T: FieldCodec>(&self, column: &str) -> Result<T, DecodeError> {
        let value = self.value(column).ok_or_else(|| DecodeError::MissingColumn {
            column: column.to_string(),
        })?;
        T::decode(column, value)
    }

    /// Returns the column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

/// Collects the encoded domain columns of an entity for a write.
#[derive(Debug, Default)]
pub struct RowWriter {
    values: Vec<(&'static str, StoredValue)>,
}

impl RowWriter {
    /// Creates an empty writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Encodes `value` into `column`.
    pub fn set<T: FieldCodec>(&mut self, column: &'static str, value: &T) -> &mut Self {
        self.values.push((column, value.encode()));
        self
    }

    /// Returns the collected column/value pairs in insertion order.
    pub fn into_values(self) -> Vec<(&'static str, StoredValue)> {
        self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> StoredRow {
        let columns: Arc<[String]> = vec!["id".to_string(), "title".to_string()].into();
        StoredRow::new(
            columns,
            vec![StoredValue::Integer(4), StoredValue::from("Quarterly goals")],
        )
    }

    #[test]
    fn test_row_get() {
        let row = row();
        assert_eq!(row.get::<i64>("id").unwrap(), 4);
        assert_eq!(row.get::<String>("title").unwrap(), "Quarterly goals");
    }

    #[test]
    fn test_row_missing_column() {
        let err = row().get::<String>("body").unwrap_err();
        assert_eq!(
            err,
            DecodeError::MissingColumn {
                column: "body".to_string()
            }
        );
    }

    #[test]
    fn test_row_writer_keeps_order() {
        let mut writer = RowWriter::new();
        writer.set("title", &"a".to_string()).set("is_pinned", &true);
        let values = writer.into_values();
        assert_eq!(values[0], ("title", StoredValue::from("a")));
        assert_eq!(values[1], ("is_pinned", StoredValue::Integer(1)));
    }
}
