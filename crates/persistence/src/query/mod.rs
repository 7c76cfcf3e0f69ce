//! Query model.
//!
//! Queries are pure values. A [`ScopedQuery`] is created already bound to a
//! tenant, callers add [`Predicate`]s and [`Scope`]s, and the repository
//! compiles it into a [`Statement`] when it runs. [`PlatformQuery`] is the
//! tenant-free counterpart for platform entities.
//!
//! # Example
//!
//! ```ignore
//! let pinned = repo
//!     .query()?
//!     .scope(&Published::now())
//!     .filter(Predicate::eq("is_pinned", true))
//!     .order_by_desc("published_at");
//! let rows = repo.list(pinned).await?;
//! ```

mod fragment;
mod platform;
mod predicate;
mod scope;
mod scoped;
pub(crate) mod writer;

pub use fragment::Statement;
pub use platform::PlatformQuery;
pub use predicate::{CompareOp, Predicate};
pub use scope::{Published, Scope, Trashed};
pub use scoped::{Direction, ScopedQuery};
