//! HRIS Persistence Layer
//!
//! This crate is the tenant-scoped data-access layer of the HRIS platform.
//! Every tenant-owned read and write is filtered by the tenant bound to the
//! current operation, and a small set of platform records (subscription plans
//! and their modules) lives on a separate, tenant-independent connection.
//!
//! # Features
//!
//! - **Mandatory tenant context**: tenant-owned repositories read the tenant
//!   from a task-local [`TenantContext`] and fail without one
//! - **Scopes**: reusable predicates such as [`Published`](query::Published)
//!   and soft-delete visibility ([`Trashed`](query::Trashed))
//! - **Typed field codec**: compile-time column tables for dates, timestamps,
//!   fixed-point decimals, JSON, enumerations and foreign keys
//! - **Explicit bypass**: cross-tenant reads require an [`AllTenants`] token,
//!   which is logged and refused inside a tenant binding
//! - **Platform records**: [`PlatformRepository`](repository::PlatformRepository)
//!   with store selection by [`StorageTopology`](config::StorageTopology)
//!
//! # Backend Features
//!
//! - `sqlite` (default) - SQLite with in-memory and file modes
//!
//! # Architecture
//!
//! - [`tenant`] - Tenant ids, context binding and the all-tenants bypass
//! - [`codec`] - Conversion between domain field types and stored values
//! - [`core`] - Entity traits, records, and the storage engine seam
//! - [`query`] - Predicates, scopes, and scoped query compilation
//! - [`repository`] - Tenant, all-tenants, transactional and platform repositories
//! - [`entities`] - The entity catalog
//! - [`backends`] - Storage engine implementations
//! - [`config`] / [`datastores`] - Configuration and store wiring
//! - [`error`] - Error types for all operations
//!
//! # Quick Start
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use hris_persistence::codec::RecordId;
//! use hris_persistence::config::PersistenceConfig;
//! use hris_persistence::datastores::Datastores;
//! use hris_persistence::entities::{Goal, GoalStatus};
//! use hris_persistence::tenant::{TenantContext, TenantId};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let stores = Datastores::open(&PersistenceConfig::in_memory())?;
//! stores.init_schema().await?;
//! let goals = stores.tenant::<Goal>();
//!
//! let created = TenantContext::new(TenantId::new("acme"))
//!     .scope(async {
//!         goals
//!             .create(Goal {
//!                 employee_id: RecordId::new(7),
//!                 title: "Ship onboarding".to_string(),
//!                 description: None,
//!                 status: GoalStatus::Active,
//!                 due_date: NaiveDate::from_ymd_opt(2025, 6, 30),
//!                 progress_percent: 0,
//!             })
//!             .await
//!     })
//!     .await??;
//!
//! // The tenant column was set by the repository.
//! assert_eq!(created.tenant_id().as_str(), "acme");
//! # Ok(())
//! # }
//! ```
//!
//! # Multitenancy
//!
//! Tenant-owned operations outside a [`TenantContext`] fail instead of
//! returning unscoped data:
//!
//! ```
//! use hris_persistence::tenant::TenantContext;
//!
//! assert!(TenantContext::current_tenant().is_err());
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod backends;
pub mod codec;
pub mod config;
pub mod core;
pub mod datastores;
pub mod entities;
pub mod error;
pub mod query;
pub mod repository;
pub mod tenant;

// Re-export commonly used types at crate root
pub use codec::{Decimal2, ForeignKey, Json, RecordId};
pub use error::{StorageError, StorageResult};
pub use tenant::{AllTenants, TenantContext, TenantId};

// Re-export core traits
pub use core::{Entity, NewRecord, PlatformEntity, Record, SoftDeletes, Store, TenantScoped};

pub use config::{PersistenceConfig, StorageTopology};
pub use datastores::Datastores;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
