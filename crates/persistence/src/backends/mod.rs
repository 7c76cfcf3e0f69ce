//! Storage engine implementations.
//!
//! Each engine implements [`Store`](crate::core::Store) and is gated behind a
//! feature flag.
//!
//! | Backend | Feature | Description |
//! |---------|---------|-------------|
//! | SQLite | `sqlite` | Embedded database, in-memory or file-backed |
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(feature = "sqlite")]
//! use hris_persistence::backends::sqlite::SqliteBackend;
//!
//! # #[cfg(feature = "sqlite")]
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! // In-memory database for tests
//! let backend = SqliteBackend::in_memory()?;
//!
//! // Or a file-based database
//! let backend = SqliteBackend::open("./data/hris.db")?;
//! # Ok(())
//! # }
//! ```

#[cfg(feature = "sqlite")]
pub mod sqlite;
