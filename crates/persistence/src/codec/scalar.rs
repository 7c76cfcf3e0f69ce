//! Codecs for strings, integers and booleans.

use super::{FieldCodec, SqlType, StoredValue, expect_integer, expect_text};
use crate::error::DecodeError;

impl FieldCodec for String {
    const SQL_TYPE: SqlType = SqlType::Text;

    fn encode(&self) -> StoredValue {
        StoredValue::Text(self.clone())
    }

    fn decode(column: &str, value: &StoredValue) -> Result<Self, DecodeError> {
        expect_text(column, value).map(str::to_string)
    }
}

impl FieldCodec for i64 {
    const SQL_TYPE: SqlType = SqlType::Integer;

    fn encode(&self) -> StoredValue {
        StoredValue::Integer(*self)
    }

    fn decode(column: &str, value: &StoredValue) -> Result<Self, DecodeError> {
        expect_integer(column, value)
    }
}

impl FieldCodec for i32 {
    const SQL_TYPE: SqlType = SqlType::Integer;

    fn encode(&self) -> StoredValue {
        StoredValue::Integer(i64::from(*self))
    }

    fn decode(column: &str, value: &StoredValue) -> Result<Self, DecodeError> {
        let raw = expect_integer(column, value)?;
        i32::try_from(raw).map_err(|e| DecodeError::Malformed {
            column: column.to_string(),
            value: raw.to_string(),
            message: e.to_string(),
        })
    }
}

/// Booleans are stored as `0`/`1`. Anything else fails to decode.
impl FieldCodec for bool {
    const SQL_TYPE: SqlType = SqlType::Integer;

    fn encode(&self) -> StoredValue {
        StoredValue::Integer(i64::from(*self))
    }

    fn decode(column: &str, value: &StoredValue) -> Result<Self, DecodeError> {
        match expect_integer(column, value)? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(DecodeError::Malformed {
                column: column.to_string(),
                value: other.to_string(),
                message: "boolean must be stored as 0 or 1".to_string(),
            }),
        }
    }
}
