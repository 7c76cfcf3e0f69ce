//! Cross-tenant reads for administrative code.

use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use super::ops;
use crate::codec::RecordId;
use crate::core::{Executor, ID_COLUMN, Record, Store, TENANT_COLUMN, TenantScoped};
use crate::error::{RecordError, StorageResult};
use crate::query::{Predicate, ScopedQuery};
use crate::tenant::{AllTenants, TenantId};

/// Read-only access to one tenant-owned entity across every tenant.
///
/// Obtained from
/// [`TenantRepository::across_tenants`](super::TenantRepository::across_tenants)
/// and borrows the [`AllTenants`] token it was built from. Every call re-checks
/// that no tenant has been bound in the meantime.
pub struct AllTenantsRepository<'a, E: TenantScoped> {
    store: Arc<dyn Store>,
    bypass: &'a AllTenants,
    _entity: PhantomData<fn() -> E>,
}

impl<E: TenantScoped> fmt::Debug for AllTenantsRepository<'_, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AllTenantsRepository")
            .field("table", &E::TABLE)
            .field("reason", &self.bypass.reason())
            .finish()
    }
}

impl<'a, E: TenantScoped> AllTenantsRepository<'a, E> {
    pub(crate) fn new(store: Arc<dyn Store>, bypass: &'a AllTenants) -> Self {
        Self {
            store,
            bypass,
            _entity: PhantomData,
        }
    }

    /// Starts a query with no tenant filter.
    pub fn query(&self) -> ScopedQuery<E> {
        ScopedQuery::across_tenants(self.bypass)
    }

    /// Runs `query`.
    pub async fn list(&self, query: ScopedQuery<E>) -> StorageResult<Vec<Record<E>>> {
        self.bypass.ensure_unbound()?;
        let mut conn = self.store.connect().await?;
        ops::select(conn.as_mut(), &query).await
    }

    /// Number of records `query` matches.
    pub async fn count(&self, query: ScopedQuery<E>) -> StorageResult<u64> {
        self.bypass.ensure_unbound()?;
        let mut conn = self.store.connect().await?;
        ops::count(conn.as_mut(), &query).await
    }

    /// Loads a live record of any tenant.
    pub async fn find(&self, id: RecordId) -> StorageResult<Record<E>> {
        let query = self.query().filter(Predicate::eq(ID_COLUMN, id)).limit(1);
        self.list(query).await?.into_iter().next().ok_or_else(|| {
            RecordError::NotFound {
                table: E::TABLE,
                id,
            }
            .into()
        })
    }

    /// Live record counts per tenant. Tenants without records are absent.
    pub async fn tenant_counts(&self) -> StorageResult<BTreeMap<TenantId, u64>> {
        self.bypass.ensure_unbound()?;
        let statement = self.query().compile_tenant_counts()?;
        tracing::debug!(table = E::TABLE, sql = statement.sql(), "tenant counts");

        let mut conn = self.store.connect().await?;
        let mut counts = BTreeMap::new();
        for row in conn.fetch(&statement).await? {
            let tenant_id = row.get::<TenantId>(TENANT_COLUMN)?;
            let count = row.get::<i64>("count")?;
            counts.insert(tenant_id, u64::try_from(count).unwrap_or(0));
        }
        Ok(counts)
    }
}
