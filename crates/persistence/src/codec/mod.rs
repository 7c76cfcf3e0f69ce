//! Typed field codec.
//!
//! Every entity field is converted between its domain type and a
//! [`StoredValue`] through a [`FieldCodec`] implementation chosen at compile
//! time. Entities declare their columns as a static table of
//! [`Column`](crate::core::Column) descriptors built from these codecs, so
//! there is no per-access dynamic casting.
//!
//! | Domain type | Storage | Notes |
//! |-------------|---------|-------|
//! | `String` | TEXT | |
//! | `i64`, `i32` | INTEGER | `i32` rejects out-of-range values |
//! | `bool` | INTEGER | only `0` and `1` decode |
//! | `NaiveDate` | TEXT `YYYY-MM-DD` | a stored timestamp reads as its date |
//! | `DateTime<Utc>` | TEXT RFC 3339, microseconds, `Z` | also reads `YYYY-MM-DD HH:MM:SS` |
//! | [`Fixed<S>`] | INTEGER units of `10^-S` | rounds half away from zero |
//! | [`Json<T>`] | TEXT | serde_json |
//! | [`RecordId`], [`ForeignKey<P>`] | INTEGER | |
//! | [`stored_enum!`](crate::stored_enum) types | TEXT | closed set |
//! | `Option<T>` | as `T`, nullable | |

mod decimal;
mod enumeration;
mod id;
mod json;
mod scalar;
mod temporal;
mod value;

pub use decimal::{Decimal2, Fixed};
pub use id::{ForeignKey, RecordId};
pub use json::Json;
pub(crate) use temporal::{format_timestamp, timestamp_key};
pub use value::{RowWriter, StoredRow, StoredValue};

use crate::error::DecodeError;

/// Column affinity used in DDL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    /// INTEGER affinity.
    Integer,
    /// REAL affinity.
    Real,
    /// TEXT affinity.
    Text,
    /// TEXT holding a timestamp. Compared and sorted on a normalized key.
    Timestamp,
}

impl SqlType {
    /// The SQL keyword for this affinity.
    pub fn as_sql(&self) -> &'static str {
        match self {
            SqlType::Integer => "INTEGER",
            SqlType::Real => "REAL",
            SqlType::Text | SqlType::Timestamp => "TEXT",
        }
    }

    /// SQL expression used to compare or sort `column`.
    pub(crate) fn sort_key(&self, column: &str) -> String {
        match self {
            SqlType::Timestamp => timestamp_key(column),
            _ => column.to_string(),
        }
    }
}

/// Conversion between a domain type and its stored representation.
pub trait FieldCodec: Sized {
    /// Column affinity.
    const SQL_TYPE: SqlType;

    /// Whether the column accepts NULL.
    const NULLABLE: bool = false;

    /// Table referenced by this column, for foreign keys.
    const REFERENCES: Option<&'static str> = None;

    /// Converts the value to its stored form.
    fn encode(&self) -> StoredValue;

    /// Converts a stored value back, failing instead of coercing.
    fn decode(column: &str, value: &StoredValue) -> Result<Self, DecodeError>;
}

impl<T: FieldCodec> FieldCodec for Option<T> {
    const SQL_TYPE: SqlType = T::SQL_TYPE;
    const NULLABLE: bool = true;
    const REFERENCES: Option<&'static str> = T::REFERENCES;

    fn encode(&self) -> StoredValue {
        match self {
            Some(value) => value.encode(),
            None => StoredValue::Null,
        }
    }

    fn decode(column: &str, value: &StoredValue) -> Result<Self, DecodeError> {
        match value {
            StoredValue::Null => Ok(None),
            other => T::decode(column, other).map(Some),
        }
    }
}

/// Returns the text payload of `value` or a decode error.
pub fn expect_text<'a>(column: &str, value: &'a StoredValue) -> Result<&'a str, DecodeError> {
    match value {
        StoredValue::Text(text) => Ok(text),
        StoredValue::Null => Err(DecodeError::UnexpectedNull {
            column: column.to_string(),
        }),
        other => Err(DecodeError::TypeMismatch {
            column: column.to_string(),
            expected: "text",
            found: other.kind(),
        }),
    }
}

/// Returns the integer payload of `value` or a decode error.
pub fn expect_integer(column: &str, value: &StoredValue) -> Result<i64, DecodeError> {
    match value {
        StoredValue::Integer(v) => Ok(*v),
        StoredValue::Null => Err(DecodeError::UnexpectedNull {
            column: column.to_string(),
        }),
        other => Err(DecodeError::TypeMismatch {
            column: column.to_string(),
            expected: "integer",
            found: other.kind(),
        }),
    }
}
