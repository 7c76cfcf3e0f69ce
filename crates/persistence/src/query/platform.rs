//! Platform query builder.

use std::marker::PhantomData;

use super::fragment::Statement;
use super::predicate::Predicate;
use super::scoped::{Direction, QueryParts, select_from};
use crate::core::{PlatformEntity, TableSchema};
use crate::error::ValidationError;

/// A query over a platform entity. No tenant filter is ever applied.
#[derive(Debug)]
pub struct PlatformQuery<E: PlatformEntity> {
    parts: QueryParts,
    _entity: PhantomData<fn() -> E>,
}

impl<E: PlatformEntity> Clone for PlatformQuery<E> {
    fn clone(&self) -> Self {
        Self {
            parts: self.parts.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E: PlatformEntity> Default for PlatformQuery<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: PlatformEntity> PlatformQuery<E> {
    /// An unfiltered query.
    pub fn new() -> Self {
        Self {
            parts: QueryParts::default(),
            _entity: PhantomData,
        }
    }

    /// Adds a predicate. Predicates are AND-ed.
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.parts.predicates.push(predicate);
        self
    }

    /// Sorts ascending by `column`.
    pub fn order_by(mut self, column: &'static str) -> Self {
        self.parts.order.push((column, Direction::Asc));
        self
    }

    /// Sorts descending by `column`.
    pub fn order_by_desc(mut self, column: &'static str) -> Self {
        self.parts.order.push((column, Direction::Desc));
        self
    }

    /// Caps the number of rows.
    pub fn limit(mut self, limit: u64) -> Self {
        self.parts.limit = Some(limit);
        self
    }

    /// Skips the first `offset` rows.
    pub fn offset(mut self, offset: u64) -> Self {
        self.parts.offset = Some(offset);
        self
    }

    pub(crate) fn compile_select(&self) -> Result<Statement, ValidationError> {
        let schema = TableSchema::platform::<E>();
        self.parts.validate(&schema)?;
        let mut sql = select_from("*", E::TABLE, self.parts.filters());
        sql.push(self.parts.tail(&schema));
        Ok(sql.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Plan, PlanModule};

    #[test]
    fn test_platform_query_has_no_tenant_filter() {
        let stmt = PlatformQuery::<Plan>::new().compile_select().unwrap();
        assert_eq!(stmt.sql(), "SELECT * FROM plans ORDER BY id ASC");
        assert!(stmt.params().is_empty());
    }

    #[test]
    fn test_platform_tables_reject_tenant_column() {
        let err = PlatformQuery::<PlanModule>::new()
            .filter(Predicate::eq("tenant_id", "acme".to_string()))
            .compile_select()
            .unwrap_err();
        assert!(matches!(err, ValidationError::ReservedColumn { .. }));
    }

    #[test]
    fn test_platform_filter() {
        let stmt = PlatformQuery::<PlanModule>::new()
            .filter(Predicate::eq("module_key", "recruiting".to_string()))
            .limit(5)
            .compile_select()
            .unwrap();
        assert_eq!(
            stmt.sql(),
            "SELECT * FROM plan_modules WHERE (module_key = ?) ORDER BY id ASC LIMIT ?"
        );
    }
}
