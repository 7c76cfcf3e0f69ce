//! Entity traits.
//!
//! An [`Entity`] describes one table: its name, its domain columns and how a
//! row converts to and from the domain struct. The associated
//! [`Entity::Tenancy`] marker splits entities into two disjoint families:
//!
//! - [`TenantOwned`] entities implement [`TenantScoped`] and are reachable
//!   only through tenant-filtered repositories.
//! - [`PlatformShared`] entities implement [`PlatformEntity`] and are reachable
//!   only through the platform repository, which never applies a tenant filter.
//!
//! Because `Tenancy` is an associated type, no entity can be both.

use crate::codec::{FieldCodec, RecordId, RowWriter, SqlType, StoredRow};
use crate::error::DecodeError;

/// Primary key column.
pub const ID_COLUMN: &str = "id";
/// Owning tenant column on tenant-owned tables.
pub const TENANT_COLUMN: &str = "tenant_id";
/// Creation timestamp column.
pub const CREATED_AT_COLUMN: &str = "created_at";
/// Last modification timestamp column.
pub const UPDATED_AT_COLUMN: &str = "updated_at";
/// Soft-delete marker column.
pub const DELETED_AT_COLUMN: &str = "deleted_at";

mod sealed {
    pub trait Sealed {}
}

/// Marker for which storage family an entity belongs to.
pub trait Tenancy: sealed::Sealed + Send + Sync + 'static {}

/// Tenant-owned rows carrying a `tenant_id`.
#[derive(Debug)]
pub enum TenantOwned {}

/// Tenant-independent platform rows.
#[derive(Debug)]
pub enum PlatformShared {}

impl sealed::Sealed for TenantOwned {}
impl sealed::Sealed for PlatformShared {}
impl Tenancy for TenantOwned {}
impl Tenancy for PlatformShared {}

/// How a tenant-owned entity is deleted.
pub trait DeletionPolicy: Send + Sync + 'static {
    /// `true` when deletion sets `deleted_at` instead of removing the row.
    const SOFT: bool;
}

/// Deletion removes the row.
#[derive(Debug)]
pub enum HardDelete {}

/// Deletion sets the `deleted_at` marker.
#[derive(Debug)]
pub enum SoftDelete {}

impl DeletionPolicy for HardDelete {
    const SOFT: bool = false;
}

impl DeletionPolicy for SoftDelete {
    const SOFT: bool = true;
}

/// Static description of one domain column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    /// Column name.
    pub name: &'static str,
    /// Column affinity.
    pub sql_type: SqlType,
    /// Whether NULL is allowed.
    pub nullable: bool,
    /// Referenced table, for foreign keys.
    pub references: Option<&'static str>,
}

impl Column {
    /// Describes a column holding values of `T`.
    pub const fn of<T: FieldCodec>(name: &'static str) -> Self {
        Self {
            name,
            sql_type: T::SQL_TYPE,
            nullable: T::NULLABLE,
            references: T::REFERENCES,
        }
    }
}

/// A parent reference declared by a record, checked on write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    /// Referenced table.
    pub table: &'static str,
    /// Referencing column.
    pub column: &'static str,
    /// Referenced id.
    pub id: RecordId,
}

impl Reference {
    /// A reference from `column` to the `P` record `id`.
    pub fn to<P: TenantScoped>(column: &'static str, id: RecordId) -> Self {
        Self {
            table: P::TABLE,
            column,
            id,
        }
    }
}

/// A table-backed domain type.
pub trait Entity: Sized + Send + Sync + 'static {
    /// Storage family.
    type Tenancy: Tenancy;

    /// Table name.
    const TABLE: &'static str;

    /// Domain columns, excluding `id`, `tenant_id` and the timestamps.
    const COLUMNS: &'static [Column];

    /// Writes the domain columns.
    fn encode(&self, row: &mut RowWriter);

    /// Reads the domain columns.
    fn decode(row: &StoredRow) -> Result<Self, DecodeError>;

    /// Returns `true` if `column` is a domain column of this entity.
    fn has_column(column: &str) -> bool {
        Self::COLUMNS.iter().any(|c| c.name == column)
    }
}

/// An entity whose rows belong to exactly one tenant.
pub trait TenantScoped: Entity<Tenancy = TenantOwned> {
    /// Deletion behavior.
    type Deletion: DeletionPolicy;

    /// Tenant-owned parents this record points at.
    ///
    /// Every returned reference must resolve inside the writer's tenant or
    /// the write is rejected.
    fn references(&self) -> Vec<Reference> {
        Vec::new()
    }
}

/// Capability of tenant-owned entities with soft-delete semantics.
///
/// Implemented automatically for every entity declaring
/// `type Deletion = SoftDelete`.
pub trait SoftDeletes: TenantScoped<Deletion = SoftDelete> {}

impl<E: TenantScoped<Deletion = SoftDelete>> SoftDeletes for E {}

/// A tenant-owned entity visible only inside a publication window.
pub trait TimeWindowed: TenantScoped {
    /// Start of visibility. NULL means unpublished.
    const PUBLISHED_AT: &'static str = "published_at";

    /// End of visibility. NULL means open-ended.
    const EXPIRES_AT: &'static str = "expires_at";
}

/// A tenant-independent entity stored on the platform connection.
///
/// Implemented automatically for every entity declaring
/// `type Tenancy = PlatformShared`.
pub trait PlatformEntity: Entity<Tenancy = PlatformShared> {}

impl<E: Entity<Tenancy = PlatformShared>> PlatformEntity for E {}

/// DDL input for one table.
#[derive(Debug, Clone, Copy)]
pub struct TableSchema {
    /// Table name.
    pub table: &'static str,
    /// Domain columns.
    pub columns: &'static [Column],
    /// Whether the table has a `tenant_id` column.
    pub tenant_scoped: bool,
    /// Whether the table has a `deleted_at` column.
    pub soft_deletes: bool,
}

impl TableSchema {
    /// Schema of a tenant-owned entity.
    pub fn tenant<E: TenantScoped>() -> Self {
        Self {
            table: E::TABLE,
            columns: E::COLUMNS,
            tenant_scoped: true,
            soft_deletes: E::Deletion::SOFT,
        }
    }

    /// Schema of a platform entity.
    pub fn platform<E: PlatformEntity>() -> Self {
        Self {
            table: E::TABLE,
            columns: E::COLUMNS,
            tenant_scoped: false,
            soft_deletes: false,
        }
    }

    /// Returns `true` if `column` exists on this table.
    pub fn has_column(&self, column: &str) -> bool {
        matches!(column, ID_COLUMN | CREATED_AT_COLUMN | UPDATED_AT_COLUMN)
            || (self.tenant_scoped && column == TENANT_COLUMN)
            || (self.soft_deletes && column == DELETED_AT_COLUMN)
            || self.columns.iter().any(|c| c.name == column)
    }

    /// Affinity of `column`, or `None` if the table has no such column.
    pub fn sql_type(&self, column: &str) -> Option<SqlType> {
        match column {
            ID_COLUMN => Some(SqlType::Integer),
            CREATED_AT_COLUMN | UPDATED_AT_COLUMN => Some(SqlType::Timestamp),
            TENANT_COLUMN if self.tenant_scoped => Some(SqlType::Text),
            DELETED_AT_COLUMN if self.soft_deletes => Some(SqlType::Timestamp),
            _ => self
                .columns
                .iter()
                .find(|c| c.name == column)
                .map(|c| c.sql_type),
        }
    }
}
