//! Core entity and storage abstractions.
//!
//! - [`Entity`], [`TenantScoped`], [`PlatformEntity`] - what a table is
//! - [`SoftDeletes`], [`TimeWindowed`] - opt-in capabilities
//! - [`Record`], [`NewRecord`], [`PlatformRecord`] - persisted values
//! - [`Store`], [`Executor`], [`StoreTransaction`] - the storage engine seam

mod entity;
mod record;
mod store;

pub use entity::{
    CREATED_AT_COLUMN, Column, DELETED_AT_COLUMN, DeletionPolicy, Entity, HardDelete, ID_COLUMN,
    PlatformEntity, PlatformShared, Reference, SoftDelete, SoftDeletes, TENANT_COLUMN,
    TableSchema, Tenancy, TenantOwned, TenantScoped, TimeWindowed, UPDATED_AT_COLUMN,
};
pub use record::{NewRecord, PlatformRecord, Record};
pub use store::{Execution, Executor, Store, StoreTransaction};
