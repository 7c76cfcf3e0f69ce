//! Tenant identifier validation.
//!
//! Tenant ids reach the persistence layer from request headers and token
//! claims. [`TenantIdPolicy`] is the serializable configuration and
//! [`TenantIdValidator`] is its compiled form.

use serde::{Deserialize, Serialize};

use super::id::TenantId;
use crate::error::{ConfigError, TenantError};

/// Configuration for tenant id validation.
///
/// # Example
///
/// ```
/// use hris_persistence::tenant::TenantIdPolicy;
///
/// let policy = TenantIdPolicy {
///     max_tenant_id_length: 32,
///     ..Default::default()
/// };
/// assert!(policy.compile().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantIdPolicy {
    /// Maximum length for tenant IDs.
    #[serde(default = "default_max_tenant_id_length")]
    pub max_tenant_id_length: usize,

    /// Allowed characters in tenant IDs (regex pattern).
    #[serde(default = "default_tenant_id_pattern")]
    pub tenant_id_pattern: String,
}

fn default_max_tenant_id_length() -> usize {
    64
}

fn default_tenant_id_pattern() -> String {
    r"^[a-zA-Z0-9_\-]+$".to_string()
}

impl Default for TenantIdPolicy {
    fn default() -> Self {
        Self {
            max_tenant_id_length: default_max_tenant_id_length(),
            tenant_id_pattern: default_tenant_id_pattern(),
        }
    }
}

impl TenantIdPolicy {
    /// Compiles the policy into a validator.
    pub fn compile(&self) -> Result<TenantIdValidator, ConfigError> {
        let pattern = regex::Regex::new(&self.tenant_id_pattern).map_err(|e| {
            ConfigError::InvalidTenantPattern {
                pattern: self.tenant_id_pattern.clone(),
                message: e.to_string(),
            }
        })?;
        Ok(TenantIdValidator {
            max_length: self.max_tenant_id_length,
            pattern,
        })
    }
}

/// A compiled [`TenantIdPolicy`].
#[derive(Debug, Clone)]
pub struct TenantIdValidator {
    max_length: usize,
    pattern: regex::Regex,
}

impl TenantIdValidator {
    /// Checks a tenant id against the policy.
    pub fn validate(&self, tenant_id: &TenantId) -> Result<(), TenantError> {
        let id = tenant_id.as_str();

        if id.is_empty() {
            return Err(TenantError::InvalidTenant {
                tenant_id: id.to_string(),
                reason: "tenant ID is empty".to_string(),
            });
        }

        if id.len() > self.max_length {
            return Err(TenantError::InvalidTenant {
                tenant_id: id.to_string(),
                reason: format!(
                    "tenant ID exceeds maximum length of {} characters",
                    self.max_length
                ),
            });
        }

        if !self.pattern.is_match(id) {
            return Err(TenantError::InvalidTenant {
                tenant_id: id.to_string(),
                reason: format!(
                    "tenant ID does not match required pattern: {}",
                    self.pattern.as_str()
                ),
            });
        }

        Ok(())
    }
}
