//! Persisted record wrappers.

use std::ops::Deref;

use chrono::{DateTime, Utc};

use super::entity::{
    CREATED_AT_COLUMN, DELETED_AT_COLUMN, DeletionPolicy, ID_COLUMN, PlatformEntity,
    TENANT_COLUMN, TenantScoped, UPDATED_AT_COLUMN,
};
use crate::codec::{RecordId, StoredRow};
use crate::error::DecodeError;
use crate::tenant::TenantId;

/// A tenant-owned record as stored.
///
/// The owning tenant is fixed at creation; there is no setter for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Record<E> {
    id: RecordId,
    tenant_id: TenantId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
    /// The domain fields.
    pub data: E,
}

impl<E> Record<E> {
    /// Primary key.
    pub fn id(&self) -> RecordId {
        self.id
    }

    /// Owning tenant.
    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    /// Creation time.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last modification time.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Soft-delete marker, for entities that soft delete.
    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        self.deleted_at
    }

    /// Returns `true` if the record is soft-deleted.
    pub fn is_trashed(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Consumes the record, returning the domain fields.
    pub fn into_data(self) -> E {
        self.data
    }
}

impl<E: TenantScoped> Record<E> {
    pub(crate) fn from_row(row: &StoredRow) -> Result<Self, DecodeError> {
        let deleted_at: Option<DateTime<Utc>> = if E::Deletion::SOFT {
            row.get(DELETED_AT_COLUMN)?
        } else {
            None
        };

        Ok(Self {
            id: row.get(ID_COLUMN)?,
            tenant_id: row.get::<TenantId>(TENANT_COLUMN)?,
            created_at: row.get(CREATED_AT_COLUMN)?,
            updated_at: row.get(UPDATED_AT_COLUMN)?,
            deleted_at,
            data: E::decode(row)?,
        })
    }
}

impl<E> Deref for Record<E> {
    type Target = E;

    fn deref(&self) -> &E {
        &self.data
    }
}

/// A record about to be created.
///
/// The owning tenant is normally left unset and stamped from the bound
/// [`TenantContext`](crate::tenant::TenantContext). Setting it explicitly with
/// [`NewRecord::for_tenant`] is allowed only if it matches the context.
#[derive(Debug, Clone)]
pub struct NewRecord<E> {
    pub(crate) tenant_id: Option<TenantId>,
    pub(crate) data: E,
}

impl<E> NewRecord<E> {
    /// A new record with no explicit tenant.
    pub fn new(data: E) -> Self {
        Self {
            tenant_id: None,
            data,
        }
    }

    /// Sets an explicit owning tenant.
    pub fn for_tenant(mut self, tenant_id: impl Into<TenantId>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    /// The explicit owning tenant, if any.
    pub fn tenant_id(&self) -> Option<&TenantId> {
        self.tenant_id.as_ref()
    }
}

impl<E: TenantScoped> From<E> for NewRecord<E> {
    fn from(data: E) -> Self {
        Self::new(data)
    }
}

/// A platform record. It has no tenant.
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformRecord<E> {
    id: RecordId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    /// The domain fields.
    pub data: E,
}

impl<E> PlatformRecord<E> {
    /// Primary key.
    pub fn id(&self) -> RecordId {
        self.id
    }

    /// Creation time.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Last modification time.
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Consumes the record, returning the domain fields.
    pub fn into_data(self) -> E {
        self.data
    }
}

impl<E: PlatformEntity> PlatformRecord<E> {
    pub(crate) fn from_row(row: &StoredRow) -> Result<Self, DecodeError> {
        Ok(Self {
            id: row.get(ID_COLUMN)?,
            created_at: row.get(CREATED_AT_COLUMN)?,
            updated_at: row.get(UPDATED_AT_COLUMN)?,
            data: E::decode(row)?,
        })
    }
}

impl<E> Deref for PlatformRecord<E> {
    type Target = E;

    fn deref(&self) -> &E {
        &self.data
    }
}
