//! Tenant-scoped operations over a single executor.
//!
//! Shared by [`TenantRepository`](super::TenantRepository), which runs each
//! call on a fresh pooled connection, and
//! [`TenantTransaction`](super::TenantTransaction), which runs every call on
//! one storage transaction. Callers resolve the tenant first; nothing here
//! reads the task-local context.

use chrono::{DateTime, SubsecRound, Utc};

use crate::codec::RecordId;
use crate::core::{DeletionPolicy, Executor, ID_COLUMN, NewRecord, Record, TenantScoped};
use crate::error::{RecordError, StorageError, StorageResult, TenantError};
use crate::query::{Predicate, ScopedQuery, Statement, Trashed, writer};
use crate::tenant::TenantId;

/// Write timestamp, at the precision the codec stores.
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

fn not_found<E: TenantScoped>(id: RecordId) -> StorageError {
    StorageError::Record(RecordError::NotFound {
        table: E::TABLE,
        id,
    })
}

async fn fetch_records<E: TenantScoped>(
    exec: &mut dyn Executor,
    statement: &Statement,
) -> StorageResult<Vec<Record<E>>> {
    let rows = exec.fetch(statement).await?;
    rows.iter()
        .map(|row| Record::from_row(row).map_err(StorageError::from))
        .collect()
}

/// Runs a compiled query.
pub(crate) async fn select<E: TenantScoped>(
    exec: &mut dyn Executor,
    query: &ScopedQuery<E>,
) -> StorageResult<Vec<Record<E>>> {
    let statement = query.compile_select()?;
    tracing::debug!(
        table = E::TABLE,
        tenant = ?query.tenant_id(),
        sql = statement.sql(),
        "select"
    );
    fetch_records(exec, &statement).await
}

/// Counts the rows a query matches.
pub(crate) async fn count<E: TenantScoped>(
    exec: &mut dyn Executor,
    query: &ScopedQuery<E>,
) -> StorageResult<u64> {
    let statement = query.compile_count()?;
    tracing::debug!(
        table = E::TABLE,
        tenant = ?query.tenant_id(),
        sql = statement.sql(),
        "count"
    );
    let rows = exec.fetch(&statement).await?;
    let count = match rows.first() {
        Some(row) => row.get::<i64>("count")?,
        None => 0,
    };
    Ok(u64::try_from(count).unwrap_or(0))
}

/// Loads one record of `tenant_id` by id.
pub(crate) async fn load<E: TenantScoped>(
    exec: &mut dyn Executor,
    tenant_id: &TenantId,
    id: RecordId,
    trashed: Trashed,
) -> StorageResult<Option<Record<E>>> {
    let query = ScopedQuery::<E>::for_tenant(tenant_id.clone())
        .filter(Predicate::eq(ID_COLUMN, id))
        .trashed(trashed)
        .limit(1);
    Ok(select(exec, &query).await?.into_iter().next())
}

/// Loads one record or fails with `NotFound`.
pub(crate) async fn find<E: TenantScoped>(
    exec: &mut dyn Executor,
    tenant_id: &TenantId,
    id: RecordId,
    trashed: Trashed,
) -> StorageResult<Record<E>> {
    load(exec, tenant_id, id, trashed)
        .await?
        .ok_or_else(|| not_found::<E>(id))
}

/// Resolves the owning tenant of a new record against the bound tenant.
pub(crate) fn resolve_tenant<E: TenantScoped>(
    context: &TenantId,
    supplied: Option<&TenantId>,
) -> Result<(), TenantError> {
    match supplied {
        Some(supplied) if supplied != context => {
            tracing::warn!(
                table = E::TABLE,
                context = %context,
                supplied = %supplied,
                "rejected create with mismatched tenant"
            );
            Err(TenantError::TenantMismatch {
                context: context.clone(),
                supplied: supplied.clone(),
            })
        }
        _ => Ok(()),
    }
}

/// Checks that every declared parent reference resolves inside `tenant_id`.
pub(crate) async fn verify_references<E: TenantScoped>(
    exec: &mut dyn Executor,
    tenant_id: &TenantId,
    data: &E,
) -> StorageResult<()> {
    for reference in data.references() {
        let lookup = writer::reference_exists(reference.table, tenant_id, reference.id);
        if exec.fetch(&lookup).await?.is_empty() {
            tracing::warn!(
                table = E::TABLE,
                column = reference.column,
                parent = reference.table,
                id = %reference.id,
                tenant = %tenant_id,
                "rejected write with reference outside tenant"
            );
            return Err(TenantError::CrossTenantReference {
                tenant_id: tenant_id.clone(),
                table: E::TABLE,
                column: reference.column,
                id: reference.id,
            }
            .into());
        }
    }
    Ok(())
}

/// Inserts a record stamped with `tenant_id`.
pub(crate) async fn insert<E: TenantScoped>(
    exec: &mut dyn Executor,
    tenant_id: &TenantId,
    record: NewRecord<E>,
) -> StorageResult<Record<E>> {
    resolve_tenant::<E>(tenant_id, record.tenant_id.as_ref())?;
    verify_references(exec, tenant_id, &record.data).await?;

    let statement = writer::insert_tenant(tenant_id, &record.data, now())?;
    tracing::debug!(table = E::TABLE, tenant = %tenant_id, sql = statement.sql(), "insert");
    let result = exec.execute(&statement).await?;

    find(exec, tenant_id, RecordId::new(result.last_insert_id), Trashed::With).await
}

/// Replaces the domain fields of a live record.
pub(crate) async fn update<E: TenantScoped>(
    exec: &mut dyn Executor,
    tenant_id: &TenantId,
    id: RecordId,
    data: E,
) -> StorageResult<Record<E>> {
    find::<E>(exec, tenant_id, id, Trashed::Without).await?;
    verify_references(exec, tenant_id, &data).await?;

    let statement = writer::update_tenant(tenant_id, id, &data, now())?;
    tracing::debug!(table = E::TABLE, tenant = %tenant_id, sql = statement.sql(), "update");
    if exec.execute(&statement).await?.rows_affected == 0 {
        return Err(not_found::<E>(id));
    }

    find(exec, tenant_id, id, Trashed::With).await
}

/// Deletes a live record: sets the marker for soft-delete entities, removes
/// the row otherwise.
pub(crate) async fn delete<E: TenantScoped>(
    exec: &mut dyn Executor,
    tenant_id: &TenantId,
    id: RecordId,
) -> StorageResult<()> {
    find::<E>(exec, tenant_id, id, Trashed::Without).await?;

    let at = now();
    let statement = if E::Deletion::SOFT {
        writer::set_deleted_at::<E>(tenant_id, id, Some(at), at)
    } else {
        writer::delete_tenant::<E>(tenant_id, id)
    };
    tracing::debug!(table = E::TABLE, tenant = %tenant_id, sql = statement.sql(), "delete");
    exec.execute(&statement).await?;
    Ok(())
}

/// Clears the marker of a soft-deleted record.
pub(crate) async fn restore<E: TenantScoped>(
    exec: &mut dyn Executor,
    tenant_id: &TenantId,
    id: RecordId,
) -> StorageResult<Record<E>> {
    find::<E>(exec, tenant_id, id, Trashed::Only).await?;

    let statement = writer::set_deleted_at::<E>(tenant_id, id, None, now());
    tracing::debug!(table = E::TABLE, tenant = %tenant_id, sql = statement.sql(), "restore");
    exec.execute(&statement).await?;

    find(exec, tenant_id, id, Trashed::With).await
}

/// Removes a row, live or trashed.
pub(crate) async fn force_delete<E: TenantScoped>(
    exec: &mut dyn Executor,
    tenant_id: &TenantId,
    id: RecordId,
) -> StorageResult<()> {
    find::<E>(exec, tenant_id, id, Trashed::With).await?;

    let statement = writer::delete_tenant::<E>(tenant_id, id);
    tracing::debug!(table = E::TABLE, tenant = %tenant_id, sql = statement.sql(), "force delete");
    exec.execute(&statement).await?;
    Ok(())
}
