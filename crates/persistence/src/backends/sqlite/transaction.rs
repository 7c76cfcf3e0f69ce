//! Transaction support for SQLite backend.

use async_trait::async_trait;
use r2d2::PooledConnection;
use r2d2_sqlite::SqliteConnectionManager;

use super::backend::{execute_statement, fetch_rows};
use crate::codec::StoredRow;
use crate::core::{Execution, Executor, StoreTransaction};
use crate::error::{StorageError, StorageResult, TransactionError};
use crate::query::Statement;

/// A SQLite transaction on a dedicated pooled connection.
///
/// Dropping the transaction without committing rolls it back.
pub struct SqliteTransaction {
    conn: PooledConnection<SqliteConnectionManager>,
    active: bool,
}

impl std::fmt::Debug for SqliteTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteTransaction")
            .field("active", &self.active)
            .finish()
    }
}

impl SqliteTransaction {
    pub(crate) fn begin(conn: PooledConnection<SqliteConnectionManager>) -> StorageResult<Self> {
        conn.execute_batch("BEGIN IMMEDIATE").map_err(|e| {
            StorageError::Transaction(TransactionError::RolledBack {
                reason: format!("failed to begin transaction: {}", e),
            })
        })?;
        tracing::debug!("sqlite transaction started");

        Ok(Self { conn, active: true })
    }

    /// Returns whether the transaction has not yet ended.
    pub fn is_active(&self) -> bool {
        self.active
    }

    fn ensure_active(&self) -> StorageResult<()> {
        if self.active {
            Ok(())
        } else {
            Err(StorageError::Transaction(TransactionError::Inactive))
        }
    }
}

#[async_trait]
impl Executor for SqliteTransaction {
    async fn fetch(&mut self, statement: &Statement) -> StorageResult<Vec<StoredRow>> {
        self.ensure_active()?;
        fetch_rows(&self.conn, statement)
    }

    async fn execute(&mut self, statement: &Statement) -> StorageResult<Execution> {
        self.ensure_active()?;
        execute_statement(&self.conn, statement)
    }
}

#[async_trait]
impl StoreTransaction for SqliteTransaction {
    fn executor(&mut self) -> &mut dyn Executor {
        self
    }

    async fn commit(self: Box<Self>) -> StorageResult<()> {
        let mut this = self;
        this.ensure_active()?;
        this.conn.execute_batch("COMMIT")?;
        this.active = false;
        tracing::debug!("sqlite transaction committed");
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> StorageResult<()> {
        let mut this = self;
        this.ensure_active()?;
        this.conn.execute_batch("ROLLBACK")?;
        this.active = false;
        tracing::debug!("sqlite transaction rolled back");
        Ok(())
    }
}

impl Drop for SqliteTransaction {
    fn drop(&mut self) {
        if self.active {
            tracing::warn!("rolling back transaction dropped without commit");
            if let Err(e) = self.conn.execute_batch("ROLLBACK") {
                tracing::error!(error = %e, "rollback of dropped transaction failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::sqlite::SqliteBackend;
    use crate::codec::StoredValue;
    use crate::core::Store;

    async fn backend() -> SqliteBackend {
        let backend = SqliteBackend::in_memory().unwrap();
        let conn = backend.get_connection().unwrap();
        conn.execute_batch("CREATE TABLE scratch (id INTEGER PRIMARY KEY, label TEXT)")
            .unwrap();
        backend
    }

    fn insert(label: &str) -> Statement {
        Statement::new(
            "INSERT INTO scratch (label) VALUES (?)",
            vec![StoredValue::from(label)],
        )
    }

    async fn count(backend: &SqliteBackend) -> usize {
        let mut conn = backend.connect().await.unwrap();
        conn.fetch(&Statement::new("SELECT id FROM scratch", Vec::new()))
            .await
            .unwrap()
            .len()
    }

    #[tokio::test]
    async fn test_commit() {
        let backend = backend().await;
        let mut tx = backend.begin().await.unwrap();
        tx.execute(&insert("kept")).await.unwrap();
        tx.commit().await.unwrap();
        assert_eq!(count(&backend).await, 1);
    }

    #[tokio::test]
    async fn test_rollback() {
        let backend = backend().await;
        let mut tx = backend.begin().await.unwrap();
        tx.execute(&insert("discarded")).await.unwrap();
        tx.rollback().await.unwrap();
        assert_eq!(count(&backend).await, 0);
    }

    #[tokio::test]
    async fn test_drop_rolls_back() {
        let backend = backend().await;
        {
            let mut tx = backend.begin().await.unwrap();
            tx.execute(&insert("dropped")).await.unwrap();
        }
        assert_eq!(count(&backend).await, 0);
    }

    #[tokio::test]
    async fn test_reads_own_writes() {
        let backend = backend().await;
        let mut tx = backend.begin().await.unwrap();
        tx.executor().execute(&insert("visible")).await.unwrap();
        let rows = tx
            .fetch(&Statement::new("SELECT label FROM scratch", Vec::new()))
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        tx.rollback().await.unwrap();
    }
}
