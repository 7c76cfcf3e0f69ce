//! Store wiring.
//!
//! [`Datastores`] owns the tenant store and, in dedicated mode, the platform
//! store. It is the entry point for repositories and transactions.
//!
//! ```no_run
//! use hris_persistence::config::PersistenceConfig;
//! use hris_persistence::datastores::Datastores;
//! use hris_persistence::entities::Goal;
//! use hris_persistence::tenant::{TenantContext, TenantId};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let stores = Datastores::open(&PersistenceConfig::in_memory())?;
//! stores.init_schema().await?;
//!
//! let goals = stores.tenant::<Goal>();
//! let open = TenantContext::new(TenantId::new("acme"))
//!     .scope(async { goals.all().await })
//!     .await??;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

#[cfg(feature = "sqlite")]
use crate::backends::sqlite::SqliteBackend;
use crate::config::{PersistenceConfig, StorageTopology};
use crate::core::{PlatformEntity, Store, TenantScoped};
use crate::entities;
use crate::error::{ConfigError, StorageResult};
use crate::repository::{PlatformConnection, PlatformRepository, TenantRepository, TenantTransaction};
use crate::tenant::{TenantContext, TenantIdValidator};

/// The opened stores.
#[derive(Debug, Clone)]
pub struct Datastores {
    tenant_store: Arc<dyn Store>,
    platform: PlatformConnection,
    validator: TenantIdValidator,
}

impl Datastores {
    /// Opens the stores described by `config`.
    #[cfg(feature = "sqlite")]
    pub fn open(config: &PersistenceConfig) -> StorageResult<Self> {
        config.validate()?;

        let tenant_store: Arc<dyn Store> = Arc::new(SqliteBackend::with_config(
            &config.tenant_database,
            config.sqlite.clone(),
        )?);

        let platform_store: Option<Arc<dyn Store>> = match config.topology {
            StorageTopology::SingleStore => None,
            StorageTopology::DedicatedPlatform => {
                let path = config
                    .platform_database
                    .as_ref()
                    .ok_or(ConfigError::MissingPlatformDatabase)?;
                let store: Arc<dyn Store> =
                    Arc::new(SqliteBackend::with_config(path, config.sqlite.clone())?);
                Some(store)
            }
        };

        tracing::info!(
            topology = %config.topology,
            tenant_database = %config.tenant_database,
            platform_database = ?config.platform_database,
            "datastores opened"
        );

        Ok(Self::new(
            config.topology,
            tenant_store,
            platform_store,
            config.tenant_id.compile()?,
        ))
    }

    /// Wires already-opened stores.
    pub fn new(
        topology: StorageTopology,
        tenant_store: Arc<dyn Store>,
        platform_store: Option<Arc<dyn Store>>,
        validator: TenantIdValidator,
    ) -> Self {
        let platform = PlatformConnection::new(topology, Arc::clone(&tenant_store), platform_store);
        Self {
            tenant_store,
            platform,
            validator,
        }
    }

    /// The configured topology.
    pub fn topology(&self) -> StorageTopology {
        self.platform.topology()
    }

    /// Validator for tenant ids taken from external input.
    pub fn tenant_id_validator(&self) -> &TenantIdValidator {
        &self.validator
    }

    /// Repository for a tenant-owned entity.
    pub fn tenant<E: TenantScoped>(&self) -> TenantRepository<E> {
        TenantRepository::new(Arc::clone(&self.tenant_store))
    }

    /// Repository for a platform entity.
    pub fn platform<E: PlatformEntity>(&self) -> PlatformRepository<E> {
        PlatformRepository::new(self.platform.clone())
    }

    /// Begins a transaction for the bound tenant.
    ///
    /// Fails with `NoTenantContext` when no tenant is bound.
    pub async fn begin(&self) -> StorageResult<TenantTransaction> {
        let tenant_id = TenantContext::current_tenant()?;
        let inner = self.tenant_store.begin().await?;
        tracing::debug!(tenant = %tenant_id, "tenant transaction started");
        Ok(TenantTransaction::new(tenant_id, inner))
    }

    /// Creates every tenant table in the tenant store and every platform
    /// table in the platform store.
    pub async fn init_schema(&self) -> StorageResult<()> {
        self.tenant_store
            .init_schema(&entities::tenant_tables())
            .await?;
        self.platform
            .select()?
            .init_schema(&entities::platform_tables())
            .await?;
        Ok(())
    }

    /// Checks both stores are reachable.
    pub async fn health_check(&self) -> StorageResult<()> {
        self.tenant_store.health_check().await?;
        self.platform.select()?.health_check().await
    }
}
