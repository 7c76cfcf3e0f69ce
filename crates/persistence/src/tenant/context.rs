//! Tenant context for storage operations.
//!
//! This module defines [`TenantContext`], the ambient "which tenant is this
//! operation running for" binding. A context is bound once per inbound
//! operation with [`TenantContext::scope`] (or [`TenantContext::sync_scope`]
//! for synchronous code) and is read by every tenant-scoped repository call
//! through [`TenantContext::current`].
//!
//! The binding is task-local. Work spawned onto a new task with
//! `tokio::spawn` does not inherit it and must bind its own context.

use std::future::Future;

use super::id::TenantId;
use super::policy::TenantIdValidator;
use crate::error::{StorageError, TenantError, ValidationError};

tokio::task_local! {
    static CURRENT_TENANT: TenantContext;
}

/// The tenant an operation is executing on behalf of.
///
/// # Binding
///
/// ```
/// use hris_persistence::tenant::{TenantContext, TenantId};
///
/// # async fn demo() -> Result<(), hris_persistence::error::TenantError> {
/// let ctx = TenantContext::new(TenantId::new("acme"));
/// let tenant = ctx
///     .scope(async { TenantContext::current_tenant() })
///     .await??;
/// assert_eq!(tenant.as_str(), "acme");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenantContext {
    /// The tenant identifier.
    tenant_id: TenantId,
    /// Optional correlation ID for request tracing.
    correlation_id: Option<String>,
    /// Optional user ID for audit purposes.
    user_id: Option<String>,
}

impl TenantContext {
    /// Creates a new tenant context for the given tenant.
    pub fn new(tenant_id: TenantId) -> Self {
        Self {
            tenant_id,
            correlation_id: None,
            user_id: None,
        }
    }

    /// Returns a builder that validates input from external sources.
    pub fn builder() -> TenantContextBuilder {
        TenantContextBuilder::new()
    }

    /// Creates a context with the specified correlation ID for tracing.
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    /// Creates a context with the specified user ID for auditing.
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Returns the tenant ID.
    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    /// Returns the correlation ID, if set.
    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    /// Returns the user ID, if set.
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Returns the context bound to the current operation.
    ///
    /// Fails with [`TenantError::NoTenantContext`] outside any binding. That is
    /// a programming error in the caller and must not be swallowed.
    pub fn current() -> Result<TenantContext, TenantError> {
        CURRENT_TENANT
            .try_with(|ctx| ctx.clone())
            .map_err(|_| TenantError::NoTenantContext)
    }

    /// Returns the tenant bound to the current operation.
    pub fn current_tenant() -> Result<TenantId, TenantError> {
        CURRENT_TENANT
            .try_with(|ctx| ctx.tenant_id.clone())
            .map_err(|_| TenantError::NoTenantContext)
    }

    /// Returns `true` if a tenant is bound to the current operation.
    pub fn is_bound() -> bool {
        CURRENT_TENANT.try_with(|_| ()).is_ok()
    }

    /// Runs `future` with this context bound.
    ///
    /// Binding the tenant that is already bound is a no-op re-entry. Binding a
    /// different tenant inside an existing binding fails with
    /// [`TenantError::AlreadyBound`] and `future` is never polled.
    pub async fn scope<F>(self, future: F) -> Result<F::Output, TenantError>
    where
        F: Future,
    {
        match CURRENT_TENANT.try_with(|ctx| ctx.tenant_id.clone()) {
            Ok(bound) if bound != self.tenant_id => Err(TenantError::AlreadyBound {
                bound,
                requested: self.tenant_id,
            }),
            Ok(_) => Ok(future.await),
            Err(_) => {
                tracing::trace!(tenant = %self.tenant_id, "binding tenant context");
                Ok(CURRENT_TENANT.scope(self, future).await)
            }
        }
    }

    /// Runs the closure `f` with this context bound.
    ///
    /// Same rebinding rules as [`TenantContext::scope`].
    pub fn sync_scope<F, R>(self, f: F) -> Result<R, TenantError>
    where
        F: FnOnce() -> R,
    {
        match CURRENT_TENANT.try_with(|ctx| ctx.tenant_id.clone()) {
            Ok(bound) if bound != self.tenant_id => Err(TenantError::AlreadyBound {
                bound,
                requested: self.tenant_id,
            }),
            Ok(_) => Ok(f()),
            Err(_) => Ok(CURRENT_TENANT.sync_scope(self, f)),
        }
    }
}

/// Builder for creating tenant contexts with validation.
///
/// This builder is meant for contexts constructed from external input
/// (e.g., HTTP headers, JWT claims).
#[derive(Debug, Default)]
pub struct TenantContextBuilder {
    tenant_id: Option<TenantId>,
    correlation_id: Option<String>,
    user_id: Option<String>,
    validator: Option<TenantIdValidator>,
}

impl TenantContextBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the tenant ID.
    pub fn tenant_id(mut self, tenant_id: TenantId) -> Self {
        self.tenant_id = Some(tenant_id);
        self
    }

    /// Sets the tenant ID from a string.
    pub fn tenant_id_str(mut self, tenant_id: &str) -> Self {
        self.tenant_id = Some(TenantId::new(tenant_id));
        self
    }

    /// Sets the correlation ID.
    pub fn correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    /// Sets the user ID.
    pub fn user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Validates the tenant id against `validator` on build.
    pub fn validator(mut self, validator: TenantIdValidator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Builds the tenant context.
    pub fn build(self) -> Result<TenantContext, StorageError> {
        let tenant_id = self
            .tenant_id
            .ok_or_else(|| ValidationError::MissingRequiredField {
                field: "tenant_id".to_string(),
            })?;

        if let Some(validator) = &self.validator {
            validator.validate(&tenant_id)?;
        }

        Ok(TenantContext {
            tenant_id,
            correlation_id: self.correlation_id,
            user_id: self.user_id,
        })
    }
}
