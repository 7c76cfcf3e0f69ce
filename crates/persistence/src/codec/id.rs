//! Record identifiers and typed foreign keys.

use std::fmt;
use std::marker::PhantomData;

use serde::{Deserialize, Serialize};

use super::{FieldCodec, SqlType, StoredValue, expect_integer};
use crate::core::{Entity, Reference, TenantScoped};
use crate::error::DecodeError;

/// Primary key of a stored record.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(i64);

impl RecordId {
    /// Wraps a raw key.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw key.
    pub const fn get(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RecordId({})", self.0)
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl FieldCodec for RecordId {
    const SQL_TYPE: SqlType = SqlType::Integer;

    fn encode(&self) -> StoredValue {
        StoredValue::Integer(self.0)
    }

    fn decode(column: &str, value: &StoredValue) -> Result<Self, DecodeError> {
        expect_integer(column, value).map(RecordId)
    }
}

/// A reference to a record of entity `P`.
///
/// The parent type makes the relation navigable and lets the write path verify
/// that the parent lives in the writer's tenant.
pub struct ForeignKey<P> {
    id: RecordId,
    _parent: PhantomData<fn() -> P>,
}

impl<P> ForeignKey<P> {
    /// Creates a key pointing at `id`.
    pub const fn new(id: RecordId) -> Self {
        Self {
            id,
            _parent: PhantomData,
        }
    }

    /// Returns the referenced id.
    pub const fn id(&self) -> RecordId {
        self.id
    }
}

impl<P: TenantScoped> ForeignKey<P> {
    /// The write-time reference check for this key held in `column`.
    pub fn reference(&self, column: &'static str) -> Reference {
        Reference::to::<P>(column, self.id)
    }
}

impl<P> Clone for ForeignKey<P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P> Copy for ForeignKey<P> {}

impl<P> PartialEq for ForeignKey<P> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<P> Eq for ForeignKey<P> {}

impl<P: Entity> fmt::Debug for ForeignKey<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ForeignKey({}/{})", P::TABLE, self.id)
    }
}

impl<P> From<RecordId> for ForeignKey<P> {
    fn from(id: RecordId) -> Self {
        Self::new(id)
    }
}

impl<P: Entity> FieldCodec for ForeignKey<P> {
    const SQL_TYPE: SqlType = SqlType::Integer;
    const REFERENCES: Option<&'static str> = Some(P::TABLE);

    fn encode(&self) -> StoredValue {
        self.id.encode()
    }

    fn decode(column: &str, value: &StoredValue) -> Result<Self, DecodeError> {
        RecordId::decode(column, value).map(Self::new)
    }
}
