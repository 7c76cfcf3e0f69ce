//! Tenant-scoped query builder.
//!
//! A [`ScopedQuery`] always carries its tenant filter. The filter is set when
//! the query is created and is private: caller predicates and scopes are only
//! ever AND-ed beneath it, and predicates may not mention `tenant_id` at all.
//! The compiled WHERE clause is therefore always
//!
//! ```sql
//! tenant_id = ? AND (<predicate 1>) AND (<predicate 2>) ... AND deleted_at IS NULL
//! ```
//!
//! An all-tenants query can only be created from an
//! [`AllTenants`](crate::tenant::AllTenants) token.

use std::marker::PhantomData;

use super::fragment::{SqlFragment, Statement};
use super::predicate::Predicate;
use super::scope::{Scope, Trashed};
use crate::codec::StoredValue;
use crate::core::{
    DELETED_AT_COLUMN, DeletionPolicy, ID_COLUMN, SoftDeletes, TENANT_COLUMN, TableSchema,
    TenantScoped,
};
use crate::error::{TenantError, ValidationError};
use crate::tenant::{AllTenants, TenantId};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

impl Direction {
    fn as_sql(&self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// Filters, ordering and paging shared by tenant and platform queries.
#[derive(Debug, Clone, Default)]
pub(crate) struct QueryParts {
    pub predicates: Vec<Predicate>,
    pub order: Vec<(&'static str, Direction)>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl QueryParts {
    /// Checks every referenced column against `schema`.
    pub fn validate(&self, schema: &TableSchema) -> Result<(), ValidationError> {
        let columns = self
            .predicates
            .iter()
            .flat_map(Predicate::columns)
            .chain(self.order.iter().map(|(column, _)| *column));

        for column in columns {
            if column == TENANT_COLUMN {
                return Err(ValidationError::ReservedColumn {
                    column: column.to_string(),
                });
            }
            if !schema.has_column(column) {
                return Err(ValidationError::UnknownColumn {
                    table: schema.table,
                    column: column.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Caller predicates, each as its own fragment.
    pub fn filters(&self) -> Vec<SqlFragment> {
        self.predicates.iter().map(Predicate::to_sql).collect()
    }

    /// `ORDER BY ... LIMIT ? OFFSET ?`
    pub fn tail(&self, schema: &TableSchema) -> SqlFragment {
        let order = if self.order.is_empty() {
            format!("{} ASC", ID_COLUMN)
        } else {
            self.order
                .iter()
                .map(|(column, direction)| {
                    let key = schema
                        .sql_type(column)
                        .map_or_else(|| column.to_string(), |ty| ty.sort_key(column));
                    format!("{} {}", key, direction.as_sql())
                })
                .collect::<Vec<_>>()
                .join(", ")
        };

        let mut tail = SqlFragment::new(format!("ORDER BY {}", order));
        match (self.limit, self.offset) {
            (Some(limit), Some(offset)) => tail.push(SqlFragment::with_params(
                "LIMIT ? OFFSET ?",
                vec![to_param(limit), to_param(offset)],
            )),
            (Some(limit), None) => {
                tail.push(SqlFragment::with_params("LIMIT ?", vec![to_param(limit)]))
            }
            (None, Some(offset)) => tail.push(SqlFragment::with_params(
                "LIMIT -1 OFFSET ?",
                vec![to_param(offset)],
            )),
            (None, None) => {}
        }
        tail
    }
}

fn to_param(value: u64) -> StoredValue {
    StoredValue::Integer(i64::try_from(value).unwrap_or(i64::MAX))
}

/// Builds `SELECT <projection> FROM <table> [WHERE ...]`.
pub(crate) fn select_from(projection: &str, table: &str, filters: Vec<SqlFragment>) -> SqlFragment {
    let mut sql = SqlFragment::new(format!("SELECT {} FROM {}", projection, table));
    if let Some(filter) = SqlFragment::join(filters, " AND ") {
        sql.push(SqlFragment::with_params(
            format!("WHERE {}", filter.sql),
            filter.params,
        ));
    }
    sql
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TenantFilter {
    Tenant(TenantId),
    AllTenants,
}

/// A query over a tenant-owned entity.
///
/// Obtain one from [`TenantRepository::query`](crate::repository::TenantRepository::query),
/// which binds it to the current tenant.
#[derive(Debug)]
pub struct ScopedQuery<E: TenantScoped> {
    tenant: TenantFilter,
    parts: QueryParts,
    trashed: Trashed,
    _entity: PhantomData<fn() -> E>,
}

impl<E: TenantScoped> Clone for ScopedQuery<E> {
    fn clone(&self) -> Self {
        Self {
            tenant: self.tenant.clone(),
            parts: self.parts.clone(),
            trashed: self.trashed,
            _entity: PhantomData,
        }
    }
}

impl<E: TenantScoped> ScopedQuery<E> {
    pub(crate) fn for_tenant(tenant_id: TenantId) -> Self {
        Self {
            tenant: TenantFilter::Tenant(tenant_id),
            parts: QueryParts::default(),
            trashed: Trashed::Without,
            _entity: PhantomData,
        }
    }

    pub(crate) fn across_tenants(_bypass: &AllTenants) -> Self {
        Self {
            tenant: TenantFilter::AllTenants,
            parts: QueryParts::default(),
            trashed: Trashed::Without,
            _entity: PhantomData,
        }
    }

    /// The tenant this query is bound to. `None` for all-tenants queries.
    pub fn tenant_id(&self) -> Option<&TenantId> {
        match &self.tenant {
            TenantFilter::Tenant(tenant_id) => Some(tenant_id),
            TenantFilter::AllTenants => None,
        }
    }

    /// Adds a predicate. Predicates are AND-ed.
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.parts.predicates.push(predicate);
        self
    }

    /// Applies a named scope.
    pub fn scope<S: Scope<E>>(self, scope: &S) -> Self {
        self.filter(scope.predicate())
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

    pub(crate) fn trashed(mut self, trashed: Trashed) -> Self {
        self.trashed = trashed;
        self
    }

    /// Fails unless this query is bound to `tenant_id`.
    pub(crate) fn ensure_tenant(&self, tenant_id: &TenantId) -> Result<(), TenantError> {
        match &self.tenant {
            TenantFilter::Tenant(bound) if bound == tenant_id => Ok(()),
            TenantFilter::Tenant(bound) => Err(TenantError::TenantMismatch {
                context: tenant_id.clone(),
                supplied: bound.clone(),
            }),
            TenantFilter::AllTenants => Err(TenantError::BypassWithinTenantContext {
                tenant_id: tenant_id.clone(),
            }),
        }
    }

    fn where_filters(&self) -> Result<Vec<SqlFragment>, ValidationError> {
        self.parts.validate(&TableSchema::tenant::<E>())?;

        let mut filters = Vec::with_capacity(self.parts.predicates.len() + 2);
        if let TenantFilter::Tenant(tenant_id) = &self.tenant {
            filters.push(SqlFragment::with_params(
                format!("{} = ?", TENANT_COLUMN),
                vec![StoredValue::from(tenant_id.as_str())],
            ));
        }
        filters.extend(self.parts.filters());

        if E::Deletion::SOFT {
            match self.trashed {
                Trashed::Without => {
                    filters.push(SqlFragment::new(format!("{} IS NULL", DELETED_AT_COLUMN)))
                }
                Trashed::Only => {
                    filters.push(SqlFragment::new(format!("{} IS NOT NULL", DELETED_AT_COLUMN)))
                }
                Trashed::With => {}
            }
        }
        Ok(filters)
    }

    /// Compiles the row query.
    pub(crate) fn compile_select(&self) -> Result<Statement, ValidationError> {
        let mut sql = select_from("*", E::TABLE, self.where_filters()?);
        sql.push(self.parts.tail(&TableSchema::tenant::<E>()));
        Ok(sql.into())
    }

    /// Compiles the count query. Ordering and paging are ignored.
    pub(crate) fn compile_count(&self) -> Result<Statement, ValidationError> {
        Ok(select_from("COUNT(*) AS count", E::TABLE, self.where_filters()?).into())
    }

    /// Compiles a per-tenant count. Ordering and paging are ignored.
    pub(crate) fn compile_tenant_counts(&self) -> Result<Statement, ValidationError> {
        let mut sql = select_from(
            &format!("{}, COUNT(*) AS count", TENANT_COLUMN),
            E::TABLE,
            self.where_filters()?,
        );
        sql.push(SqlFragment::new(format!(
            "GROUP BY {0} ORDER BY {0}",
            TENANT_COLUMN
        )));
        Ok(sql.into())
    }
}

impl<E: SoftDeletes> ScopedQuery<E> {
    /// Includes soft-deleted records.
    pub fn with_trashed(self) -> Self {
        self.trashed(Trashed::With)
    }

    /// Returns only soft-deleted records.
    pub fn only_trashed(self) -> Self {
        self.trashed(Trashed::Only)
    }

    /// Returns only live records. This is the default.
    pub fn without_trashed(self) -> Self {
        self.trashed(Trashed::Without)
    }
}
