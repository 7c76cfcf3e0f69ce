//! JSON column codec.

use serde::Serialize;
use serde::de::DeserializeOwned;

use super::{FieldCodec, SqlType, StoredValue, expect_text};
use crate::error::DecodeError;

/// A field stored as a JSON document in a TEXT column.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    /// Unwraps the inner value.
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> FieldCodec for Json<T>
where
    T: Serialize + DeserializeOwned,
{
    const SQL_TYPE: SqlType = SqlType::Text;

    fn encode(&self) -> StoredValue {
        match serde_json::to_string(&self.0) {
            Ok(text) => StoredValue::Text(text),
            Err(e) => {
                // Surfaces as a NOT NULL constraint violation on write.
                tracing::error!(error = %e, "failed to serialize JSON column");
                StoredValue::Null
            }
        }
    }

    fn decode(column: &str, value: &StoredValue) -> Result<Self, DecodeError> {
        let text = expect_text(column, value)?;
        serde_json::from_str(text)
            .map(Json)
            .map_err(|e| DecodeError::Malformed {
                column: column.to_string(),
                value: text.to_string(),
                message: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_roundtrip() {
        let audience = Json(vec!["engineering".to_string(), "sales".to_string()]);
        let stored = audience.encode();
        assert_eq!(stored, StoredValue::from(r#"["engineering","sales"]"#));
        assert_eq!(Json::<Vec<String>>::decode("audience", &stored).unwrap(), audience);
    }

    #[test]
    fn test_json_malformed() {
        let err = Json::<Vec<String>>::decode("audience", &StoredValue::from("{")).unwrap_err();
        assert!(matches!(err, DecodeError::Malformed { .. }));
    }
}
