//! Platform repository.
//!
//! Platform entities never see a tenant filter and never read the tenant
//! context, so they are reachable with or without a bound tenant.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::codec::RecordId;
use crate::config::StorageTopology;
use crate::core::{Executor, ID_COLUMN, PlatformEntity, PlatformRecord, Store};
use crate::error::{ConfigError, RecordError, StorageError, StorageResult};
use crate::query::{PlatformQuery, Predicate, writer};

use super::ops::now;

/// Chooses the store platform records live in.
#[derive(Clone)]
pub struct PlatformConnection {
    topology: StorageTopology,
    tenant_store: Arc<dyn Store>,
    platform_store: Option<Arc<dyn Store>>,
}

impl fmt::Debug for PlatformConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlatformConnection")
            .field("topology", &self.topology)
            .field("dedicated", &self.platform_store.is_some())
            .finish()
    }
}

impl PlatformConnection {
    /// Creates a selector over the given stores.
    pub fn new(
        topology: StorageTopology,
        tenant_store: Arc<dyn Store>,
        platform_store: Option<Arc<dyn Store>>,
    ) -> Self {
        Self {
            topology,
            tenant_store,
            platform_store,
        }
    }

    /// The configured topology.
    pub fn topology(&self) -> StorageTopology {
        self.topology
    }

    /// The store for platform records under the configured topology.
    ///
    /// Single-store mode uses the tenant store; dedicated mode uses the
    /// platform store and fails if none was opened.
    pub fn select(&self) -> Result<&Arc<dyn Store>, ConfigError> {
        match self.topology {
            StorageTopology::SingleStore => Ok(&self.tenant_store),
            StorageTopology::DedicatedPlatform => self
                .platform_store
                .as_ref()
                .ok_or(ConfigError::MissingPlatformDatabase),
        }
    }

    async fn connect(&self) -> StorageResult<Box<dyn Executor>> {
        self.select()?.connect().await
    }
}

/// Access to one platform entity.
pub struct PlatformRepository<E: PlatformEntity> {
    connection: PlatformConnection,
    _entity: PhantomData<fn() -> E>,
}

impl<E: PlatformEntity> Clone for PlatformRepository<E> {
    fn clone(&self) -> Self {
        Self {
            connection: self.connection.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: PlatformEntity> fmt::Debug for PlatformRepository<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlatformRepository")
            .field("table", &E::TABLE)
            .field("connection", &self.connection)
            .finish()
    }
}

impl<E: PlatformEntity> PlatformRepository<E> {
    pub(crate) fn new(connection: PlatformConnection) -> Self {
        Self {
            connection,
            _entity: PhantomData,
        }
    }

    fn not_found(id: RecordId) -> StorageError {
        StorageError::Record(RecordError::NotFound {
            table: E::TABLE,
            id,
        })
    }

    /// Starts an unfiltered query.
    pub fn query(&self) -> PlatformQuery<E> {
        PlatformQuery::new()
    }

    /// Runs `query`.
    pub async fn list(&self, query: PlatformQuery<E>) -> StorageResult<Vec<PlatformRecord<E>>> {
        let statement = query.compile_select()?;
        tracing::debug!(table = E::TABLE, sql = statement.sql(), "platform select");

        let mut conn = self.connection.connect().await?;
        let rows = conn.fetch(&statement).await?;
        rows.iter()
            .map(|row| PlatformRecord::from_row(row).map_err(StorageError::from))
            .collect()
    }

    /// Loads a record.
    pub async fn find(&self, id: RecordId) -> StorageResult<PlatformRecord<E>> {
        let query = self.query().filter(Predicate::eq(ID_COLUMN, id)).limit(1);
        self.list(query)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Self::not_found(id))
    }

    /// Creates a record.
    pub async fn create(&self, data: E) -> StorageResult<PlatformRecord<E>> {
        let statement = writer::insert_platform(&data, now())?;
        tracing::debug!(table = E::TABLE, sql = statement.sql(), "platform insert");

        let mut conn = self.connection.connect().await?;
        let result = conn.execute(&statement).await?;
        drop(conn);
        self.find(RecordId::new(result.last_insert_id)).await
    }

    /// Replaces the domain fields of a record.
    pub async fn update(&self, id: RecordId, data: E) -> StorageResult<PlatformRecord<E>> {
        let statement = writer::update_platform(id, &data, now())?;
        tracing::debug!(table = E::TABLE, sql = statement.sql(), "platform update");

        let mut conn = self.connection.connect().await?;
        let result = conn.execute(&statement).await?;
        drop(conn);
        if result.rows_affected == 0 {
            return Err(Self::not_found(id));
        }
        self.find(id).await
    }

    /// Removes a record.
    pub async fn delete(&self, id: RecordId) -> StorageResult<()> {
        let statement = writer::delete_platform::<E>(id);
        tracing::debug!(table = E::TABLE, sql = statement.sql(), "platform delete");

        let mut conn = self.connection.connect().await?;
        if conn.execute(&statement).await?.rows_affected == 0 {
            return Err(Self::not_found(id));
        }
        Ok(())
    }
}
