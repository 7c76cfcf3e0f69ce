//! Tenant management for multi-tenant HR data.
//!
//! This module provides the core types for multi-tenant support in the
//! persistence layer. Every tenant-scoped repository call reads the tenant
//! from the [`TenantContext`] bound to the current operation.
//!
//! # Core Types
//!
//! - [`TenantId`] - Opaque tenant identifier
//! - [`TenantContext`] - Task-local binding of the current tenant
//! - [`AllTenants`] - Explicit, logged opt-in for cross-tenant reads
//! - [`TenantIdPolicy`] - Validation rules for tenant ids from external input
//!
//! # Examples
//!
//! ## Binding a Tenant
//!
//! ```
//! use hris_persistence::tenant::{TenantContext, TenantId};
//!
//! # async fn handler() -> Result<(), hris_persistence::error::TenantError> {
//! TenantContext::new(TenantId::new("acme"))
//!     .scope(async {
//!         // every repository call in here is scoped to "acme"
//!     })
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Bypassing for Administration
//!
//! ```
//! use hris_persistence::tenant::AllTenants;
//!
//! let bypass = AllTenants::acquire("monthly usage report").unwrap();
//! assert_eq!(bypass.reason(), "monthly usage report");
//! ```

mod bypass;
mod context;
mod id;
mod policy;

pub use bypass::AllTenants;
pub use context::{TenantContext, TenantContextBuilder};
pub use id::TenantId;
pub use policy::{TenantIdPolicy, TenantIdValidator};
