//! SQLite backend implementation.
//!
//! Supports in-memory databases (used by the test suite) and file-based
//! databases. Every table created by [`SqliteBackend`] follows the same
//! layout:
//!
//! ```sql
//! CREATE TABLE goals (
//!     id INTEGER PRIMARY KEY AUTOINCREMENT,
//!     tenant_id TEXT NOT NULL,          -- tenant-owned tables only
//!     employee_id INTEGER NOT NULL,
//!     ...                               -- domain columns
//!     created_at TEXT NOT NULL,
//!     updated_at TEXT NOT NULL,
//!     deleted_at TEXT                   -- soft-delete tables only
//! );
//! CREATE INDEX idx_goals_tenant ON goals (tenant_id, id);
//! ```
//!
//! Timestamps are RFC 3339 text with microsecond precision, so lexical order
//! matches chronological order.

mod backend;
mod schema;
mod transaction;

pub use backend::{SqliteBackend, SqliteBackendConfig, SqliteConnection};
pub use schema::SCHEMA_VERSION;
pub use transaction::SqliteTransaction;
