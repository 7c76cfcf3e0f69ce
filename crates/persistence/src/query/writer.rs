//! Write statement compilation.
//!
//! Every tenant-table write carries `tenant_id` either as an inserted value or
//! as a WHERE condition next to the primary key.

use chrono::{DateTime, Utc};

use super::fragment::Statement;
use crate::codec::{RecordId, RowWriter, StoredValue, format_timestamp};
use crate::core::{
    CREATED_AT_COLUMN, DELETED_AT_COLUMN, Entity, ID_COLUMN, PlatformEntity, TENANT_COLUMN,
    TenantScoped, UPDATED_AT_COLUMN,
};
use crate::error::ValidationError;
use crate::tenant::TenantId;

fn timestamp(at: DateTime<Utc>) -> StoredValue {
    StoredValue::Text(format_timestamp(&at))
}

/// Encodes `data` and checks every written column is declared.
fn encode<E: Entity>(data: &E) -> Result<Vec<(&'static str, StoredValue)>, ValidationError> {
    let mut writer = RowWriter::new();
    data.encode(&mut writer);
    let values = writer.into_values();

    for (column, _) in &values {
        if matches!(
            *column,
            ID_COLUMN | TENANT_COLUMN | CREATED_AT_COLUMN | UPDATED_AT_COLUMN | DELETED_AT_COLUMN
        ) {
            return Err(ValidationError::ReservedColumn {
                column: column.to_string(),
            });
        }
        if !E::has_column(column) {
            return Err(ValidationError::UnknownColumn {
                table: E::TABLE,
                column: column.to_string(),
            });
        }
    }
    Ok(values)
}

fn insert(
    table: &str,
    leading: Vec<(&'static str, StoredValue)>,
    values: Vec<(&'static str, StoredValue)>,
) -> Statement {
    let (columns, params): (Vec<_>, Vec<_>) = leading.into_iter().chain(values).unzip();
    let placeholders = vec!["?"; columns.len()].join(", ");
    Statement::new(
        format!(
            "INSERT INTO {} ({}) VALUES ({})",
            table,
            columns.join(", "),
            placeholders
        ),
        params,
    )
}

fn assignments(values: &[(&'static str, StoredValue)]) -> String {
    values
        .iter()
        .map(|(column, _)| format!("{} = ?", column))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `INSERT` of a tenant-owned row stamped with `tenant_id`.
pub(crate) fn insert_tenant<E: TenantScoped>(
    tenant_id: &TenantId,
    data: &E,
    now: DateTime<Utc>,
) -> Result<Statement, ValidationError> {
    Ok(insert(
        E::TABLE,
        vec![
            (TENANT_COLUMN, StoredValue::from(tenant_id.as_str())),
            (CREATED_AT_COLUMN, timestamp(now)),
            (UPDATED_AT_COLUMN, timestamp(now)),
        ],
        encode(data)?,
    ))
}

/// `INSERT` of a platform row.
pub(crate) fn insert_platform<E: PlatformEntity>(
    data: &E,
    now: DateTime<Utc>,
) -> Result<Statement, ValidationError> {
    Ok(insert(
        E::TABLE,
        vec![
            (CREATED_AT_COLUMN, timestamp(now)),
            (UPDATED_AT_COLUMN, timestamp(now)),
        ],
        encode(data)?,
    ))
}

/// `UPDATE` of every domain column of one tenant row.
pub(crate) fn update_tenant<E: TenantScoped>(
    tenant_id: &TenantId,
    id: RecordId,
    data: &E,
    now: DateTime<Utc>,
) -> Result<Statement, ValidationError> {
    let values = encode(data)?;
    let sql = format!(
        "UPDATE {} SET {}, {} = ? WHERE {} = ? AND {} = ?",
        E::TABLE,
        assignments(&values),
        UPDATED_AT_COLUMN,
        ID_COLUMN,
        TENANT_COLUMN
    );
    let mut params: Vec<StoredValue> = values.into_iter().map(|(_, value)| value).collect();
    params.push(timestamp(now));
    params.push(StoredValue::Integer(id.get()));
    params.push(StoredValue::from(tenant_id.as_str()));
    Ok(Statement::new(sql, params))
}

/// `UPDATE` of every domain column of one platform row.
pub(crate) fn update_platform<E: PlatformEntity>(
    id: RecordId,
    data: &E,
    now: DateTime<Utc>,
) -> Result<Statement, ValidationError> {
    let values = encode(data)?;
    let sql = format!(
        "UPDATE {} SET {}, {} = ? WHERE {} = ?",
        E::TABLE,
        assignments(&values),
        UPDATED_AT_COLUMN,
        ID_COLUMN
    );
    let mut params: Vec<StoredValue> = values.into_iter().map(|(_, value)| value).collect();
    params.push(timestamp(now));
    params.push(StoredValue::Integer(id.get()));
    Ok(Statement::new(sql, params))
}

/// Sets or clears `deleted_at` on one live or trashed tenant row.
pub(crate) fn set_deleted_at<E: TenantScoped>(
    tenant_id: &TenantId,
    id: RecordId,
    deleted_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> Statement {
    Statement::new(
        format!(
            "UPDATE {} SET {} = ?, {} = ? WHERE {} = ? AND {} = ?",
            E::TABLE,
            DELETED_AT_COLUMN,
            UPDATED_AT_COLUMN,
            ID_COLUMN,
            TENANT_COLUMN
        ),
        vec![
            deleted_at.map(timestamp).unwrap_or(StoredValue::Null),
            timestamp(now),
            StoredValue::Integer(id.get()),
            StoredValue::from(tenant_id.as_str()),
        ],
    )
}

/// `DELETE` of one tenant row.
pub(crate) fn delete_tenant<E: TenantScoped>(tenant_id: &TenantId, id: RecordId) -> Statement {
    Statement::new(
        format!(
            "DELETE FROM {} WHERE {} = ? AND {} = ?",
            E::TABLE,
            ID_COLUMN,
            TENANT_COLUMN
        ),
        vec![
            StoredValue::Integer(id.get()),
            StoredValue::from(tenant_id.as_str()),
        ],
    )
}

/// `DELETE` of one platform row.
pub(crate) fn delete_platform<E: PlatformEntity>(id: RecordId) -> Statement {
    Statement::new(
        format!("DELETE FROM {} WHERE {} = ?", E::TABLE, ID_COLUMN),
        vec![StoredValue::Integer(id.get())],
    )
}

/// Checks whether `table` has row `id` owned by `tenant_id`.
///
/// Trashed parents still count as present.
pub(crate) fn reference_exists(table: &str, tenant_id: &TenantId, id: RecordId) -> Statement {
    Statement::new(
        format!(
            "SELECT 1 AS present FROM {} WHERE {} = ? AND {} = ? LIMIT 1",
            table, ID_COLUMN, TENANT_COLUMN
        ),
        vec![
            StoredValue::Integer(id.get()),
            StoredValue::from(tenant_id.as_str()),
        ],
    )
}
