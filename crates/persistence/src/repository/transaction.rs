//! Tenant-bound units of work.

use std::fmt;

use super::ops;
use crate::codec::RecordId;
use crate::core::{NewRecord, Record, StoreTransaction, TenantScoped};
use crate::error::{StorageResult, TenantError};
use crate::query::{ScopedQuery, Trashed};
use crate::tenant::{TenantContext, TenantId};

/// A storage transaction bound to one tenant.
///
/// The tenant is captured from the [`TenantContext`] when the transaction
/// begins, and every operation re-checks that the same tenant is still bound.
/// Dropping the transaction without [`commit`](Self::commit) rolls back every
/// write made through it.
///
/// ```ignore
/// let mut tx = stores.begin().await?;
/// let goal = tx.create(goal).await?;
/// tx.create(GoalComment::new(goal.id(), author, "Kickoff done")).await?;
/// tx.commit().await?;
/// ```
pub struct TenantTransaction {
    tenant_id: TenantId,
    inner: Box<dyn StoreTransaction>,
}

impl fmt::Debug for TenantTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TenantTransaction")
            .field("tenant_id", &self.tenant_id)
            .finish_non_exhaustive()
    }
}

impl TenantTransaction {
    pub(crate) fn new(tenant_id: TenantId, inner: Box<dyn StoreTransaction>) -> Self {
        Self { tenant_id, inner }
    }

    /// The tenant this transaction writes for.
    pub fn tenant_id(&self) -> &TenantId {
        &self.tenant_id
    }

    fn ensure_bound(&self) -> Result<(), TenantError> {
        let current = TenantContext::current_tenant()?;
        if current == self.tenant_id {
            Ok(())
        } else {
            Err(TenantError::TenantMismatch {
                context: current,
                supplied: self.tenant_id.clone(),
            })
        }
    }

    /// Starts a query bound to this transaction's tenant.
    pub fn query<E: TenantScoped>(&self) -> ScopedQuery<E> {
        ScopedQuery::for_tenant(self.tenant_id.clone())
    }

    /// Loads a live record.
    pub async fn find<E: TenantScoped>(&mut self, id: RecordId) -> StorageResult<Record<E>> {
        self.ensure_bound()?;
        ops::find(self.inner.executor(), &self.tenant_id, id, Trashed::Without).await
    }

    /// Runs `query`.
    pub async fn list<E: TenantScoped>(
        &mut self,
        query: ScopedQuery<E>,
    ) -> StorageResult<Vec<Record<E>>> {
        self.ensure_bound()?;
        query.ensure_tenant(&self.tenant_id)?;
        ops::select(self.inner.executor(), &query).await
    }

    /// Creates a record owned by this transaction's tenant.
    pub async fn create<E: TenantScoped>(
        &mut self,
        record: impl Into<NewRecord<E>>,
    ) -> StorageResult<Record<E>> {
        let record = record.into();
        self.ensure_bound()?;
        ops::insert(self.inner.executor(), &self.tenant_id, record).await
    }

    /// Replaces the domain fields of a record.
    pub async fn update<E: TenantScoped>(
        &mut self,
        id: RecordId,
        data: E,
    ) -> StorageResult<Record<E>> {
        self.ensure_bound()?;
        ops::update(self.inner.executor(), &self.tenant_id, id, data).await
    }

    /// Deletes a record according to the entity's deletion policy.
    pub async fn delete<E: TenantScoped>(&mut self, id: RecordId) -> StorageResult<()> {
        self.ensure_bound()?;
        ops::delete::<E>(self.inner.executor(), &self.tenant_id, id).await
    }

    /// Commits every write.
    pub async fn commit(self) -> StorageResult<()> {
        self.inner.commit().await?;
        tracing::debug!(tenant = %self.tenant_id, "tenant transaction committed");
        Ok(())
    }

    /// Discards every write.
    pub async fn rollback(self) -> StorageResult<()> {
        self.inner.rollback().await?;
        tracing::warn!(tenant = %self.tenant_id, "tenant transaction rolled back");
        Ok(())
    }
}
