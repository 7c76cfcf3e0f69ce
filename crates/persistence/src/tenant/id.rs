//! The [`TenantId`] partition key.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::codec::{FieldCodec, SqlType, StoredValue, expect_text};
use crate::error::DecodeError;

/// An opaque tenant identifier.
///
/// Every tenant-owned record carries exactly one `TenantId`, stamped at
/// creation and never reassigned. Ids arriving from outside the process
/// should pass through a [`TenantIdValidator`](super::TenantIdValidator)
/// first.
///
/// ```
/// use hris_persistence::tenant::TenantId;
///
/// let tenant = TenantId::new("acme");
/// assert_eq!(tenant.as_str(), "acme");
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TenantId(String);

impl TenantId {
    /// Wraps a raw identifier without validating it.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for TenantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TenantId({})", self.0)
    }
}

impl From<&str> for TenantId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for TenantId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Stored in the `tenant_id` column. An empty value is never a valid owner.
impl FieldCodec for TenantId {
    const SQL_TYPE: SqlType = SqlType::Text;

    fn encode(&self) -> StoredValue {
        StoredValue::Text(self.0.clone())
    }

    fn decode(column: &str, value: &StoredValue) -> Result<Self, DecodeError> {
        let text = expect_text(column, value)?;
        if text.is_empty() {
            return Err(DecodeError::Malformed {
                column: column.to_string(),
                value: String::new(),
                message: "empty tenant id".to_string(),
            });
        }
        Ok(Self::new(text))
    }
}
