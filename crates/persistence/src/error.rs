//! Error types for the persistence layer.
//!
//! This module defines all error types used throughout the persistence layer,
//! following a hierarchy that separates tenant isolation errors, record state
//! errors, decoding errors, validation errors, transaction errors and backend
//! errors.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

use crate::codec::RecordId;
use crate::tenant::TenantId;

/// The primary error type for all storage operations.
///
/// This enum encompasses all possible errors that can occur during persistence
/// operations, organized by category.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Tenant isolation errors
    #[error(transparent)]
    Tenant(#[from] TenantError),

    /// Record state errors
    #[error(transparent)]
    Record(#[from] RecordError),

    /// Stored values that cannot be mapped to their domain type
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Validation errors
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Transaction errors
    #[error(transparent)]
    Transaction(#[from] TransactionError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Backend-specific errors
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl StorageError {
    /// Returns `true` if this is a `NotFound` error.
    ///
    /// A record owned by another tenant is reported the same way as a record
    /// that does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::Record(RecordError::NotFound { .. }))
    }

    /// Returns `true` if the operation was rejected at the tenant boundary.
    pub fn is_tenant_violation(&self) -> bool {
        matches!(
            self,
            StorageError::Tenant(
                TenantError::TenantMismatch { .. } | TenantError::CrossTenantReference { .. }
            )
        )
    }
}

/// Errors related to tenant isolation.
#[derive(Error, Debug)]
pub enum TenantError {
    /// An operation ran outside any bound tenant context.
    #[error("no tenant context is bound to the current operation")]
    NoTenantContext,

    /// An explicit tenant id on a write disagrees with the bound context.
    #[error("tenant mismatch: context is bound to {context}, operation supplied {supplied}")]
    TenantMismatch {
        context: TenantId,
        supplied: TenantId,
    },

    /// A different tenant is already bound to the current operation.
    #[error("tenant {bound} is already bound; cannot switch to {requested} mid-operation")]
    AlreadyBound {
        bound: TenantId,
        requested: TenantId,
    },

    /// The all-tenants bypass was requested from tenant-bound code.
    #[error("all-tenants access is not available inside tenant context {tenant_id}")]
    BypassWithinTenantContext { tenant_id: TenantId },

    /// A reference column points outside the writing tenant.
    #[error("reference {table}.{column} = {id} does not resolve within tenant {tenant_id}")]
    CrossTenantReference {
        tenant_id: TenantId,
        table: &'static str,
        column: &'static str,
        id: RecordId,
    },

    /// The tenant identifier failed validation.
    #[error("invalid tenant '{tenant_id}': {reason}")]
    InvalidTenant { tenant_id: String, reason: String },
}

/// Errors related to record state.
#[derive(Error, Debug)]
pub enum RecordError {
    /// The record does not exist, or is not visible to the current tenant.
    #[error("record not found: {table}/{id}")]
    NotFound { table: &'static str, id: RecordId },
}

/// Errors raised while converting a stored value to its domain type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
    /// A non-nullable column held NULL.
    #[error("column {column} is NULL but the field is not optional")]
    UnexpectedNull { column: String },

    /// The stored value has the wrong primitive type.
    #[error("column {column}: expected {expected}, found {found}")]
    TypeMismatch {
        column: String,
        expected: &'static str,
        found: &'static str,
    },

    /// The stored value is outside an enumeration's closed set.
    #[error("column {column}: unknown variant '{value}'")]
    UnknownVariant { column: String, value: String },

    /// The stored value has the right type but cannot be parsed.
    #[error("column {column}: malformed value '{value}': {message}")]
    Malformed {
        column: String,
        value: String,
        message: String,
    },

    /// The row does not contain the column at all.
    #[error("column {column} missing from row")]
    MissingColumn { column: String },
}

/// Errors related to query and input validation.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// A predicate or ordering names a column the entity does not declare.
    #[error("unknown column {column} on {table}")]
    UnknownColumn { table: &'static str, column: String },

    /// A predicate names a column that only the data-access layer may set.
    #[error("column {column} is managed by the persistence layer and cannot be filtered on")]
    ReservedColumn { column: String },

    /// Missing required field.
    #[error("missing required field: {field}")]
    MissingRequiredField { field: String },

    /// A state change the entity does not allow.
    #[error("{table}: cannot change status from {from} to {to}")]
    InvalidTransition {
        table: &'static str,
        from: String,
        to: String,
    },
}

/// Errors related to transactions.
#[derive(Error, Debug)]
pub enum TransactionError {
    /// Transaction is no longer valid (already committed or rolled back).
    #[error("transaction no longer valid")]
    Inactive,

    /// Transaction was rolled back.
    #[error("transaction rolled back: {reason}")]
    RolledBack { reason: String },
}

/// Errors related to configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Dedicated platform topology without a platform database.
    #[error("topology dedicated_platform requires a platform database")]
    MissingPlatformDatabase,

    /// The configured tenant id pattern is not a valid regular expression.
    #[error("invalid tenant id pattern '{pattern}': {message}")]
    InvalidTenantPattern { pattern: String, message: String },

    /// An unrecognized topology name.
    #[error("unknown storage topology '{0}' (expected single-store or dedicated-platform)")]
    UnknownTopology(String),
}

/// Errors originating from the database backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// Connection to the backend failed.
    #[error("connection failed to {backend_name}: {message}")]
    ConnectionFailed {
        backend_name: String,
        message: String,
    },

    /// Connection pool exhausted.
    #[error("connection pool exhausted for {backend_name}")]
    PoolExhausted { backend_name: String },

    /// A storage-level constraint rejected the statement.
    #[error("constraint violation in {backend_name}: {message}")]
    Constraint {
        backend_name: String,
        message: String,
    },

    /// Schema migration error.
    #[error("schema migration failed: {message}")]
    MigrationError { message: String },

    /// Internal backend error.
    #[error("internal error in {backend_name}: {message}")]
    Internal {
        backend_name: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

/// Result type alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(ref failure, ref message) = err {
            if failure.code == rusqlite::ErrorCode::ConstraintViolation {
                return StorageError::Backend(BackendError::Constraint {
                    backend_name: "sqlite".to_string(),
                    message: message.clone().unwrap_or_else(|| failure.to_string()),
                });
            }
        }
        StorageError::Backend(BackendError::Internal {
            backend_name: "sqlite".to_string(),
            message: err.to_string(),
            source: Some(Box::new(err)),
        })
    }
}

#[cfg(feature = "sqlite")]
impl From<r2d2::Error> for StorageError {
    fn from(_err: r2d2::Error) -> Self {
        StorageError::Backend(BackendError::PoolExhausted {
            backend_name: "sqlite".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = StorageError::Record(RecordError::NotFound {
            table: "goals",
            id: RecordId::new(7),
        });
        assert_eq!(err.to_string(), "record not found: goals/7");
        assert!(err.is_not_found());
        assert!(!err.is_tenant_violation());
    }

    #[test]
    fn test_tenant_mismatch_display() {
        let err = TenantError::TenantMismatch {
            context: TenantId::new("acme"),
            supplied: TenantId::new("globex"),
        };
        assert_eq!(
            err.to_string(),
            "tenant mismatch: context is bound to acme, operation supplied globex"
        );
        assert!(StorageError::from(err).is_tenant_violation());
    }

    #[test]
    fn test_decode_error_display() {
        let err = DecodeError::UnknownVariant {
            column: "status".to_string(),
            value: "lost".to_string(),
        };
        assert_eq!(err.to_string(), "column status: unknown variant 'lost'");
    }

    #[test]
    fn test_cross_tenant_reference_is_violation() {
        let err = StorageError::Tenant(TenantError::CrossTenantReference {
            tenant_id: TenantId::new("acme"),
            table: "goals",
            column: "goal_id",
            id: RecordId::new(3),
        });
        assert!(err.is_tenant_violation());
        assert!(err.to_string().contains("goals.goal_id = 3"));
    }

    #[cfg(feature = "sqlite")]
    #[test]
    fn test_constraint_violation_maps_to_constraint() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (v TEXT NOT NULL);").unwrap();
        let err: StorageError = conn
            .execute("INSERT INTO t (v) VALUES (NULL)", [])
            .unwrap_err()
            .into();
        assert!(matches!(
            err,
            StorageError::Backend(BackendError::Constraint { .. })
        ));
    }
}
