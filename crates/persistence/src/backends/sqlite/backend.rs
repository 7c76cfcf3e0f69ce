//! SQLite backend implementation.

use std::fmt::Debug;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::types::{ToSqlOutput, Value, ValueRef};
use rusqlite::{Connection, ToSql, params_from_iter};
use serde::{Deserialize, Serialize};

use super::schema;
use super::transaction::SqliteTransaction;
use crate::codec::{StoredRow, StoredValue};
use crate::core::{Execution, Executor, Store, StoreTransaction, TableSchema};
use crate::error::{BackendError, DecodeError, StorageError, StorageResult};
use crate::query::Statement;

/// SQLite store.
pub struct SqliteBackend {
    pool: Pool<SqliteConnectionManager>,
    config: SqliteBackendConfig,
    is_memory: bool,
}

impl Debug for SqliteBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteBackend")
            .field("config", &self.config)
            .field("is_memory", &self.is_memory)
            .finish_non_exhaustive()
    }
}

/// Configuration for the SQLite backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SqliteBackendConfig {
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Minimum number of idle connections.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    /// Connection timeout in milliseconds.
    #[serde(default = "default_connection_timeout_ms")]
    pub connection_timeout_ms: u64,

    /// SQLite busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u32,

    /// Enable WAL mode for file databases.
    #[serde(default = "default_true")]
    pub enable_wal: bool,

    /// Enable foreign key constraints.
    #[serde(default = "default_true")]
    pub enable_foreign_keys: bool,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_connection_timeout_ms() -> u64 {
    30000
}

fn default_busy_timeout_ms() -> u32 {
    5000
}

fn default_true() -> bool {
    true
}

impl Default for SqliteBackendConfig {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
            min_connections: default_min_connections(),
            connection_timeout_ms: default_connection_timeout_ms(),
            busy_timeout_ms: default_busy_timeout_ms(),
            enable_wal: true,
            enable_foreign_keys: true,
        }
    }
}

impl SqliteBackend {
    /// Creates a new in-memory SQLite backend.
    ///
    /// An in-memory database lives inside a single connection, so the pool is
    /// capped at one connection that is never recycled. A transaction holds
    /// that connection until it ends.
    pub fn in_memory() -> StorageResult<Self> {
        Self::with_config(":memory:", SqliteBackendConfig::default())
    }

    /// Opens or creates a file-based SQLite database.
    pub fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        Self::with_config(path, SqliteBackendConfig::default())
    }

    /// Creates a backend with custom configuration.
    pub fn with_config<P: AsRef<Path>>(
        path: P,
        config: SqliteBackendConfig,
    ) -> StorageResult<Self> {
        let is_memory = path.as_ref().to_string_lossy() == ":memory:";

        let manager = if is_memory {
            SqliteConnectionManager::memory()
        } else {
            SqliteConnectionManager::file(path.as_ref())
        };

        let busy_timeout = Duration::from_millis(u64::from(config.busy_timeout_ms));
        let foreign_keys = config.enable_foreign_keys;
        let wal = config.enable_wal && !is_memory;
        let manager = manager.with_init(move |conn| configure_connection(conn, busy_timeout, foreign_keys, wal));

        let builder = Pool::builder().connection_timeout(Duration::from_millis(
            config.connection_timeout_ms,
        ));
        let builder = if is_memory {
            builder
                .max_size(1)
                .min_idle(Some(1))
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            builder
                .max_size(config.max_connections)
                .min_idle(Some(config.min_connections))
        };

        let pool = builder.build(manager).map_err(|e| {
            StorageError::Backend(BackendError::ConnectionFailed {
                backend_name: "sqlite".to_string(),
                message: e.to_string(),
            })
        })?;

        tracing::debug!(
            path = %path.as_ref().display(),
            is_memory,
            "opened sqlite store"
        );

        Ok(Self {
            pool,
            config,
            is_memory,
        })
    }

    /// Get a connection from the pool.
    pub(crate) fn get_connection(
        &self,
    ) -> StorageResult<PooledConnection<SqliteConnectionManager>> {
        self.pool.get().map_err(StorageError::from)
    }

    /// Returns whether this is an in-memory database.
    pub fn is_memory(&self) -> bool {
        self.is_memory
    }

    /// Returns the backend configuration.
    pub fn config(&self) -> &SqliteBackendConfig {
        &self.config
    }
}

fn configure_connection(
    conn: &mut Connection,
    busy_timeout: Duration,
    foreign_keys: bool,
    wal: bool,
) -> rusqlite::Result<()> {
    conn.busy_timeout(busy_timeout)?;
    if foreign_keys {
        conn.pragma_update(None, "foreign_keys", true)?;
    }
    if wal {
        let _mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
    }
    Ok(())
}

impl ToSql for StoredValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            StoredValue::Null => ToSqlOutput::Owned(Value::Null),
            StoredValue::Integer(v) => ToSqlOutput::Owned(Value::Integer(*v)),
            StoredValue::Real(v) => ToSqlOutput::Owned(Value::Real(*v)),
            StoredValue::Text(v) => ToSqlOutput::Borrowed(ValueRef::Text(v.as_bytes())),
        })
    }
}

/// Copies one column out of a result row. Text must be valid UTF-8 and no
/// column ever holds a BLOB.
fn stored_value(column: &str, value: ValueRef<'_>) -> Result<StoredValue, DecodeError> {
    match value {
        ValueRef::Null => Ok(StoredValue::Null),
        ValueRef::Integer(v) => Ok(StoredValue::Integer(v)),
        ValueRef::Real(v) => Ok(StoredValue::Real(v)),
        ValueRef::Text(bytes) => std::str::from_utf8(bytes)
            .map(|text| StoredValue::Text(text.to_string()))
            .map_err(|e| DecodeError::Malformed {
                column: column.to_string(),
                value: String::from_utf8_lossy(bytes).into_owned(),
                message: e.to_string(),
            }),
        ValueRef::Blob(_) => Err(DecodeError::TypeMismatch {
            column: column.to_string(),
            expected: "text, integer or real",
            found: "blob",
        }),
    }
}

/// Runs a query on `conn`.
pub(crate) fn fetch_rows(conn: &Connection, statement: &Statement) -> StorageResult<Vec<StoredRow>> {
    tracing::debug!(sql = statement.sql(), params = statement.params().len(), "fetch");

    let mut stmt = conn.prepare_cached(statement.sql())?;
    let columns: Arc<[String]> = stmt.column_names().into_iter().map(String::from).collect();
    let mut rows = stmt.query(params_from_iter(statement.params().iter()))?;

    let mut out = Vec::new();
    while let Some(row) = rows.next()? {
        let mut values = Vec::with_capacity(columns.len());
        for (idx, column) in columns.iter().enumerate() {
            values.push(stored_value(column, row.get_ref(idx)?)?);
        }
        out.push(StoredRow::new(Arc::clone(&columns), values));
    }
    Ok(out)
}

/// Runs a write statement on `conn`.
pub(crate) fn execute_statement(conn: &Connection, statement: &Statement) -> StorageResult<Execution> {
    tracing::debug!(sql = statement.sql(), params = statement.params().len(), "execute");

    let mut stmt = conn.prepare_cached(statement.sql())?;
    let rows_affected = stmt.execute(params_from_iter(statement.params().iter()))?;
    drop(stmt);

    Ok(Execution {
        rows_affected: rows_affected as u64,
        last_insert_id: conn.last_insert_rowid(),
    })
}

/// A pooled connection running statements outside any transaction.
pub struct SqliteConnection(pub(crate) PooledConnection<SqliteConnectionManager>);

impl Debug for SqliteConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteConnection").finish()
    }
}

#[async_trait]
impl Executor for SqliteConnection {
    async fn fetch(&mut self, statement: &Statement) -> StorageResult<Vec<StoredRow>> {
        fetch_rows(&self.0, statement)
    }

    async fn execute(&mut self, statement: &Statement) -> StorageResult<Execution> {
        execute_statement(&self.0, statement)
    }
}

#[async_trait]
impl Store for SqliteBackend {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    async fn connect(&self) -> StorageResult<Box<dyn Executor>> {
        Ok(Box::new(SqliteConnection(self.get_connection()?)))
    }

    async fn begin(&self) -> StorageResult<Box<dyn StoreTransaction>> {
        let conn = self.get_connection()?;
        Ok(Box::new(SqliteTransaction::begin(conn)?))
    }

    async fn init_schema(&self, tables: &[TableSchema]) -> StorageResult<()> {
        let conn = self.get_connection()?;
        schema::initialize_schema(&conn, tables)
    }

    async fn health_check(&self) -> StorageResult<()> {
        let conn = self.get_connection()?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .map_err(|e| {
                StorageError::Backend(BackendError::ConnectionFailed {
                    backend_name: "sqlite".to_string(),
                    message: e.to_string(),
                })
            })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_backend() {
        let backend = SqliteBackend::in_memory().unwrap();
        assert!(backend.is_memory());
        assert_eq!(backend.backend_name(), "sqlite");
    }

    #[test]
    fn test_stored_value_is_strict() {
        assert_eq!(
            stored_value("title", ValueRef::Text(b"plain")).unwrap(),
            StoredValue::from("plain")
        );
        assert!(matches!(
            stored_value("title", ValueRef::Text(&[0xFF, 0x41])),
            Err(DecodeError::Malformed { .. })
        ));
        assert!(matches!(
            stored_value("title", ValueRef::Blob(&[0x01])),
            Err(DecodeError::TypeMismatch { found: "blob", .. })
        ));
    }

    #[test]
    fn test_config_defaults() {
        let config: SqliteBackendConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, SqliteBackendConfig::default());
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.busy_timeout_ms, 5000);
    }

    #[tokio::test]
    async fn test_health_check() {
        let backend = SqliteBackend::in_memory().unwrap();
        assert!(backend.health_check().await.is_ok());
    }

    #[tokio::test]
    async fn test_in_memory_state_survives_connections() {
        let backend = SqliteBackend::in_memory().unwrap();
        {
            let conn = backend.get_connection().unwrap();
            conn.execute_batch("CREATE TABLE scratch (id INTEGER PRIMARY KEY, label TEXT)")
                .unwrap();
        }

        let mut conn = backend.connect().await.unwrap();
        let insert = Statement::new(
            "INSERT INTO scratch (label) VALUES (?)",
            vec![StoredValue::from("first")],
        );
        let result = conn.execute(&insert).await.unwrap();
        assert_eq!(result.rows_affected, 1);
        assert_eq!(result.last_insert_id, 1);
        drop(conn);

        let mut conn = backend.connect().await.unwrap();
        let rows = conn
            .fetch(&Statement::new("SELECT id, label FROM scratch", Vec::new()))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get::<String>("label").unwrap(), "first");
    }

    #[tokio::test]
    async fn test_null_and_real_values() {
        let backend = SqliteBackend::in_memory().unwrap();
        let mut conn = backend.connect().await.unwrap();
        let rows = conn
            .fetch(&Statement::new(
                "SELECT ? AS missing, ? AS ratio",
                vec![StoredValue::Null, StoredValue::Real(0.5)],
            ))
            .await
            .unwrap();
        assert_eq!(rows[0].value("missing"), Some(&StoredValue::Null));
        assert_eq!(rows[0].value("ratio"), Some(&StoredValue::Real(0.5)));
    }
}
