//! Storage engine traits.
//!
//! A [`Store`] is one physical database (the tenant store or the platform
//! store). Repositories talk to it through an [`Executor`], which runs
//! [`Statement`]s compiled by this crate. `Statement` cannot be built outside
//! the crate, so every statement that reaches an executor for a tenant table
//! went through the tenant-scoped query compiler.

use std::fmt::Debug;

use async_trait::async_trait;

use super::entity::TableSchema;
use crate::codec::StoredRow;
use crate::error::StorageResult;
use crate::query::Statement;

/// Outcome of a write statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Execution {
    /// Number of rows inserted, updated or deleted.
    pub rows_affected: u64,
    /// Rowid of the last inserted row on this connection.
    pub last_insert_id: i64,
}

/// Runs compiled statements on one connection.
#[async_trait]
pub trait Executor: Send {
    /// Runs a query and returns every row.
    async fn fetch(&mut self, statement: &Statement) -> StorageResult<Vec<StoredRow>>;

    /// Runs a write statement.
    async fn execute(&mut self, statement: &Statement) -> StorageResult<Execution>;
}

/// A storage transaction.
///
/// Dropping an active transaction rolls it back.
#[async_trait]
pub trait StoreTransaction: Executor {
    /// Returns this transaction as a plain executor.
    fn executor(&mut self) -> &mut dyn Executor;

    /// Commits the transaction.
    async fn commit(self: Box<Self>) -> StorageResult<()>;

    /// Rolls back the transaction.
    async fn rollback(self: Box<Self>) -> StorageResult<()>;
}

/// One physical database.
#[async_trait]
pub trait Store: Send + Sync + Debug {
    /// Returns a human-readable name for this backend.
    fn backend_name(&self) -> &'static str;

    /// Acquires a connection.
    async fn connect(&self) -> StorageResult<Box<dyn Executor>>;

    /// Starts a transaction on a dedicated connection.
    async fn begin(&self) -> StorageResult<Box<dyn StoreTransaction>>;

    /// Creates the given tables if they do not exist.
    async fn init_schema(&self, tables: &[TableSchema]) -> StorageResult<()>;

    /// Verifies the store is reachable.
    async fn health_check(&self) -> StorageResult<()>;
}
