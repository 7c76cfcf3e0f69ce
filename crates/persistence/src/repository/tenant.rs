//! Tenant-scoped repository.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use super::all_tenants::AllTenantsRepository;
use super::ops;
use crate::codec::{ForeignKey, RecordId};
use crate::core::{NewRecord, Record, SoftDeletes, Store, TenantScoped};
use crate::error::StorageResult;
use crate::query::{ScopedQuery, Trashed};
use crate::tenant::{AllTenants, TenantContext, TenantId};

/// Access to one tenant-owned entity, scoped to the bound tenant.
///
/// Every method reads the tenant from the [`TenantContext`] bound to the
/// current task and fails with
/// [`TenantError::NoTenantContext`](crate::error::TenantError::NoTenantContext)
/// before touching storage when none is bound. Records of other tenants are
/// indistinguishable from records that do not exist.
pub struct TenantRepository<E: TenantScoped> {
    store: Arc<dyn Store>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: TenantScoped> Clone for TenantRepository<E> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            _entity: PhantomData,
        }
    }
}

impl<E: TenantScoped> fmt::Debug for TenantRepository<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TenantRepository")
            .field("table", &E::TABLE)
            .field("store", &self.store.backend_name())
            .finish()
    }
}

impl<E: TenantScoped> TenantRepository<E> {
    pub(crate) fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    fn tenant() -> StorageResult<TenantId> {
        Ok(TenantContext::current_tenant()?)
    }

    /// Starts a query bound to the current tenant.
    pub fn query(&self) -> StorageResult<ScopedQuery<E>> {
        Ok(ScopedQuery::for_tenant(Self::tenant()?))
    }

    /// Runs `query`.
    ///
    /// Fails with `TenantMismatch` if the query was built under another
    /// tenant.
    pub async fn list(&self, query: ScopedQuery<E>) -> StorageResult<Vec<Record<E>>> {
        let tenant_id = Self::tenant()?;
        query.ensure_tenant(&tenant_id)?;
        let mut conn = self.store.connect().await?;
        ops::select(conn.as_mut(), &query).await
    }

    /// Every live record of the current tenant.
    pub async fn all(&self) -> StorageResult<Vec<Record<E>>> {
        self.list(self.query()?).await
    }

    /// The first record `query` matches.
    pub async fn first(&self, query: ScopedQuery<E>) -> StorageResult<Option<Record<E>>> {
        Ok(self.list(query.limit(1)).await?.into_iter().next())
    }

    /// Number of records `query` matches.
    pub async fn count(&self, query: ScopedQuery<E>) -> StorageResult<u64> {
        let tenant_id = Self::tenant()?;
        query.ensure_tenant(&tenant_id)?;
        let mut conn = self.store.connect().await?;
        ops::count(conn.as_mut(), &query).await
    }

    /// Returns `true` if `query` matches anything.
    pub async fn exists(&self, query: ScopedQuery<E>) -> StorageResult<bool> {
        Ok(self.first(query).await?.is_some())
    }

    /// Loads a live record.
    pub async fn find(&self, id: RecordId) -> StorageResult<Record<E>> {
        let tenant_id = Self::tenant()?;
        let mut conn = self.store.connect().await?;
        ops::find(conn.as_mut(), &tenant_id, id, Trashed::Without).await
    }

    /// Loads a live record, returning `None` when it is not visible.
    pub async fn get(&self, id: RecordId) -> StorageResult<Option<Record<E>>> {
        let tenant_id = Self::tenant()?;
        let mut conn = self.store.connect().await?;
        ops::load(conn.as_mut(), &tenant_id, id, Trashed::Without).await
    }

    /// Creates a record owned by the current tenant.
    ///
    /// An explicit tenant on `record` must match the bound tenant.
    pub async fn create(&self, record: impl Into<NewRecord<E>>) -> StorageResult<Record<E>> {
        let record = record.into();
        let tenant_id = Self::tenant()?;
        let mut conn = self.store.connect().await?;
        ops::insert(conn.as_mut(), &tenant_id, record).await
    }

    /// Replaces the domain fields of a record.
    pub async fn update(&self, id: RecordId, data: E) -> StorageResult<Record<E>> {
        let tenant_id = Self::tenant()?;
        let mut conn = self.store.connect().await?;
        ops::update(conn.as_mut(), &tenant_id, id, data).await
    }

    /// Loads a record, applies `change` and writes it back.
    pub async fn modify<F>(&self, id: RecordId, change: F) -> StorageResult<Record<E>>
    where
        F: FnOnce(&mut E) + Send,
    {
        let tenant_id = Self::tenant()?;
        let mut conn = self.store.connect().await?;
        let mut data = ops::find::<E>(conn.as_mut(), &tenant_id, id, Trashed::Without)
            .await?
            .into_data();
        change(&mut data);
        ops::update(conn.as_mut(), &tenant_id, id, data).await
    }

    /// Deletes a record according to the entity's deletion policy.
    pub async fn delete(&self, id: RecordId) -> StorageResult<()> {
        let tenant_id = Self::tenant()?;
        let mut conn = self.store.connect().await?;
        ops::delete::<E>(conn.as_mut(), &tenant_id, id).await
    }

    /// Cross-tenant access for administrative code.
    pub fn across_tenants<'a>(&self, bypass: &'a AllTenants) -> AllTenantsRepository<'a, E> {
        AllTenantsRepository::new(Arc::clone(&self.store), bypass)
    }
}

impl<E: SoftDeletes> TenantRepository<E> {
    /// Loads a record whether or not it is trashed.
    pub async fn find_with_trashed(&self, id: RecordId) -> StorageResult<Record<E>> {
        let tenant_id = Self::tenant()?;
        let mut conn = self.store.connect().await?;
        ops::find(conn.as_mut(), &tenant_id, id, Trashed::With).await
    }

    /// Clears the deleted marker.
    pub async fn restore(&self, id: RecordId) -> StorageResult<Record<E>> {
        let tenant_id = Self::tenant()?;
        let mut conn = self.store.connect().await?;
        ops::restore(conn.as_mut(), &tenant_id, id).await
    }

    /// Permanently removes a record, trashed or not.
    pub async fn force_delete(&self, id: RecordId) -> StorageResult<()> {
        let tenant_id = Self::tenant()?;
        let mut conn = self.store.connect().await?;
        ops::force_delete::<E>(conn.as_mut(), &tenant_id, id).await
    }
}

impl<P: TenantScoped> ForeignKey<P> {
    /// Loads the referenced record under the current tenant.
    pub async fn load(&self, repository: &TenantRepository<P>) -> StorageResult<Record<P>> {
        repository.find(self.id()).await
    }
}
