//! SQLite schema definitions.

use rusqlite::{Connection, OptionalExtension};

use crate::core::{
    CREATED_AT_COLUMN, DELETED_AT_COLUMN, ID_COLUMN, TENANT_COLUMN, TableSchema,
    UPDATED_AT_COLUMN,
};
use crate::error::{BackendError, StorageError, StorageResult};

/// Current schema version.
pub const SCHEMA_VERSION: i32 = 1;

/// Creates the given tables if they do not exist.
///
/// Safe to run repeatedly. Fails if the database was created by a newer
/// schema version.
pub fn initialize_schema(conn: &Connection, tables: &[TableSchema]) -> StorageResult<()> {
    let current_version = get_schema_version(conn)?;
    if current_version > SCHEMA_VERSION {
        return Err(StorageError::Backend(BackendError::MigrationError {
            message: format!(
                "database schema version {} is newer than supported version {}",
                current_version, SCHEMA_VERSION
            ),
        }));
    }

    for table in tables {
        conn.execute_batch(&table_ddl(table))?;
    }

    if current_version < SCHEMA_VERSION {
        set_schema_version(conn, SCHEMA_VERSION)?;
    }

    tracing::info!(
        tables = tables.len(),
        version = SCHEMA_VERSION,
        "sqlite schema initialized"
    );
    Ok(())
}

/// Get the current schema version.
fn get_schema_version(conn: &Connection) -> StorageResult<i32> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER NOT NULL
        )",
        [],
    )?;

    let version: Option<i32> = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get(0)
        })
        .optional()?;

    Ok(version.unwrap_or(0))
}

fn set_schema_version(conn: &Connection, version: i32) -> StorageResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// DDL for one table and its tenant index.
pub(crate) fn table_ddl(table: &TableSchema) -> String {
    let mut columns = vec![format!("{} INTEGER PRIMARY KEY AUTOINCREMENT", ID_COLUMN)];
    if table.tenant_scoped {
        columns.push(format!("{} TEXT NOT NULL", TENANT_COLUMN));
    }
    for column in table.columns {
        let mut ddl = format!("{} {}", column.name, column.sql_type.as_sql());
        if !column.nullable {
            ddl.push_str(" NOT NULL");
        }
        if let Some(parent) = column.references {
            ddl.push_str(&format!(" REFERENCES {}({})", parent, ID_COLUMN));
        }
        columns.push(ddl);
    }
    columns.push(format!("{} TEXT NOT NULL", CREATED_AT_COLUMN));
    columns.push(format!("{} TEXT NOT NULL", UPDATED_AT_COLUMN));
    if table.soft_deletes {
        columns.push(format!("{} TEXT", DELETED_AT_COLUMN));
    }

    let mut ddl = format!(
        "CREATE TABLE IF NOT EXISTS {} (\n    {}\n);",
        table.table,
        columns.join(",\n    ")
    );
    if table.tenant_scoped {
        ddl.push_str(&format!(
            "\nCREATE INDEX IF NOT EXISTS idx_{0}_tenant ON {0} ({1}, {2});",
            table.table, TENANT_COLUMN, ID_COLUMN
        ));
    }
    ddl
}
