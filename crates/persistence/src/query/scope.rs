//! Named, reusable query scopes.
//!
//! A scope is a pure transformation: it contributes one predicate that is
//! AND-ed beneath the mandatory tenant filter. Applying scopes in any order
//! yields the same result set.

use chrono::{DateTime, Utc};

use super::predicate::Predicate;
use crate::core::{Entity, TimeWindowed};

/// A named predicate applicable to queries over `E`.
pub trait Scope<E: Entity> {
    /// The predicate this scope contributes.
    fn predicate(&self) -> Predicate;
}

impl<E: Entity> Scope<E> for Predicate {
    fn predicate(&self) -> Predicate {
        self.clone()
    }
}

/// Records inside their publication window.
///
/// `now` is captured once when the scope is built, so both window bounds are
/// checked against the same instant for every row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Published {
    now: DateTime<Utc>,
}

impl Published {
    /// Snapshots the current time.
    pub fn now() -> Self {
        Self::at(Utc::now())
    }

    /// Evaluates the window at `now`.
    pub fn at(now: DateTime<Utc>) -> Self {
        Self { now }
    }

    /// The instant both bounds are compared against.
    pub fn snapshot(&self) -> DateTime<Utc> {
        self.now
    }
}

impl<E: TimeWindowed> Scope<E> for Published {
    fn predicate(&self) -> Predicate {
        Predicate::all([
            Predicate::is_not_null(E::PUBLISHED_AT),
            Predicate::le(E::PUBLISHED_AT, self.now),
            Predicate::any([
                Predicate::is_null(E::EXPIRES_AT),
                Predicate::ge(E::EXPIRES_AT, self.now),
            ]),
        ])
    }
}

/// Soft-delete visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Trashed {
    /// Only live records.
    #[default]
    Without,
    /// Live and soft-deleted records.
    With,
    /// Only soft-deleted records.
    Only,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::timestamp_key;
    use crate::entities::Announcement;
    use chrono::TimeZone;

    #[test]
    fn test_published_uses_single_snapshot() {
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let predicate = <Published as Scope<Announcement>>::predicate(&Published::at(now));
        let sql = predicate.to_sql();

        assert_eq!(
            sql.sql,
            format!(
                "(published_at IS NOT NULL) AND ({} <= ?) AND ((expires_at IS NULL) OR ({} >= ?))",
                timestamp_key("published_at"),
                timestamp_key("expires_at")
            )
        );
        assert_eq!(sql.params.len(), 2);
        assert_eq!(sql.params[0], sql.params[1]);
    }
}
