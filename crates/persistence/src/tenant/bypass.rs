//! Explicit all-tenants access.
//!
//! Administrative and background jobs occasionally need to read across tenant
//! boundaries. They do so by acquiring an [`AllTenants`] token, which is the
//! only value that can construct an unfiltered tenant query. The token cannot
//! be acquired from code running under a bound [`TenantContext`].

use super::context::TenantContext;
use crate::error::TenantError;

/// Proof that the caller opted in to cross-tenant access.
///
/// Not `Clone`: every bypass goes through [`AllTenants::acquire`] and is logged
/// with its reason.
#[derive(Debug)]
pub struct AllTenants {
    reason: String,
}

impl AllTenants {
    /// Acquires the bypass for `reason`.
    ///
    /// Fails with [`TenantError::BypassWithinTenantContext`] when a tenant is
    /// bound to the current operation.
    pub fn acquire(reason: impl Into<String>) -> Result<Self, TenantError> {
        let reason = reason.into();

        if let Ok(tenant_id) = TenantContext::current_tenant() {
            tracing::warn!(
                tenant = %tenant_id,
                reason = %reason,
                "refused all-tenants access from tenant-bound code"
            );
            return Err(TenantError::BypassWithinTenantContext { tenant_id });
        }

        tracing::info!(reason = %reason, "all-tenants access acquired");
        Ok(Self { reason })
    }

    /// Returns the stated reason for the bypass.
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Re-checks that no tenant has been bound since acquisition.
    pub(crate) fn ensure_unbound(&self) -> Result<(), TenantError> {
        match TenantContext::current_tenant() {
            Ok(tenant_id) => Err(TenantError::BypassWithinTenantContext { tenant_id }),
            Err(_) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tenant::TenantId;

    #[test]
    fn test_acquire_outside_context() {
        let bypass = AllTenants::acquire("nightly report").unwrap();
        assert_eq!(bypass.reason(), "nightly report");
        assert!(bypass.ensure_unbound().is_ok());
    }

    #[tokio::test]
    async fn test_acquire_refused_inside_context() {
        let result = TenantContext::new(TenantId::new("acme"))
            .scope(async { AllTenants::acquire("sneaky") })
            .await
            .unwrap();
        assert!(matches!(
            result,
            Err(TenantError::BypassWithinTenantContext { .. })
        ));
    }

    #[tokio::test]
    async fn test_token_unusable_once_tenant_bound() {
        let bypass = AllTenants::acquire("migration").unwrap();
        let result = TenantContext::new(TenantId::new("acme"))
            .scope(async { bypass.ensure_unbound() })
            .await
            .unwrap();
        assert!(result.is_err());
    }
}
