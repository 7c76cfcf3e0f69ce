//! Persistence configuration.
//!
//! [`PersistenceConfig`] describes where the tenant and platform stores live
//! and how tenant identifiers from external input are validated. It
//! deserializes with serde and every field has a default, so an empty
//! document yields a single in-memory store.
//!
//! ```
//! use hris_persistence::config::{PersistenceConfig, StorageTopology};
//!
//! let config: PersistenceConfig = serde_json::from_str(
//!     r#"{
//!         "topology": "dedicated_platform",
//!         "tenant_database": "./data/tenants.db",
//!         "platform_database": "./data/platform.db"
//!     }"#,
//! )
//! .unwrap();
//!
//! assert_eq!(config.topology, StorageTopology::DedicatedPlatform);
//! assert!(config.validate().is_ok());
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[cfg(feature = "sqlite")]
use crate::backends::sqlite::SqliteBackendConfig;
use crate::error::ConfigError;
use crate::tenant::TenantIdPolicy;

/// How platform records are stored relative to tenant records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageTopology {
    /// Platform tables live in the tenant store. Used by tests and small
    /// deployments.
    #[default]
    SingleStore,
    /// Platform tables live in their own store.
    DedicatedPlatform,
}

impl fmt::Display for StorageTopology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageTopology::SingleStore => write!(f, "single-store"),
            StorageTopology::DedicatedPlatform => write!(f, "dedicated-platform"),
        }
    }
}

impl FromStr for StorageTopology {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "single-store" | "single_store" => Ok(StorageTopology::SingleStore),
            "dedicated-platform" | "dedicated_platform" => Ok(StorageTopology::DedicatedPlatform),
            other => Err(ConfigError::UnknownTopology(other.to_string())),
        }
    }
}

/// Location and tuning of the data stores.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Store layout.
    #[serde(default)]
    pub topology: StorageTopology,

    /// Tenant store path, or `:memory:`.
    #[serde(default = "default_tenant_database")]
    pub tenant_database: String,

    /// Platform store path. Required for
    /// [`StorageTopology::DedicatedPlatform`], ignored otherwise.
    #[serde(default)]
    pub platform_database: Option<String>,

    /// SQLite pool and pragma settings, shared by both stores.
    #[cfg(feature = "sqlite")]
    #[serde(default)]
    pub sqlite: SqliteBackendConfig,

    /// Tenant id validation rules.
    #[serde(default)]
    pub tenant_id: TenantIdPolicy,
}

fn default_tenant_database() -> String {
    ":memory:".to_string()
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            topology: StorageTopology::default(),
            tenant_database: default_tenant_database(),
            platform_database: None,
            #[cfg(feature = "sqlite")]
            sqlite: SqliteBackendConfig::default(),
            tenant_id: TenantIdPolicy::default(),
        }
    }
}

impl PersistenceConfig {
    /// A single in-memory store.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Checks the configuration is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.topology == StorageTopology::DedicatedPlatform && self.platform_database.is_none()
        {
            return Err(ConfigError::MissingPlatformDatabase);
        }
        self.tenant_id.compile()?;
        Ok(())
    }
}
