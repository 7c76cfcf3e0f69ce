//! Repositories: the caller-facing API.
//!
//! | Type | Scope | Obtained from |
//! |------|-------|---------------|
//! | [`TenantRepository`] | bound tenant | [`Datastores::tenant`](crate::datastores::Datastores::tenant) |
//! | [`AllTenantsRepository`] | every tenant, read-only | [`TenantRepository::across_tenants`] |
//! | [`TenantTransaction`] | bound tenant, one transaction | [`Datastores::begin`](crate::datastores::Datastores::begin) |
//! | [`PlatformRepository`] | no tenant | [`Datastores::platform`](crate::datastores::Datastores::platform) |

mod all_tenants;
mod ops;
mod platform;
mod tenant;
mod transaction;

pub use all_tenants::AllTenantsRepository;
pub use platform::{PlatformConnection, PlatformRepository};
pub use tenant::TenantRepository;
pub use transaction::TenantTransaction;
