//! Document categories.

use crate::codec::{RowWriter, StoredRow};
use crate::core::{Column, Entity, HardDelete, TenantOwned, TenantScoped};
use crate::error::DecodeError;
use crate::query::Predicate;

/// A tenant-defined kind of document (ID, consent form, certificate).
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentCategory {
    /// Display name.
    pub name: String,
    /// Explanation for uploaders.
    pub description: Option<String>,
    /// Must be provided during onboarding.
    pub is_required: bool,
    /// Days to keep documents of this category.
    pub retention_days: Option<i32>,
}

impl DocumentCategory {
    /// Categories every new hire must provide.
    pub fn required() -> Predicate {
        Predicate::eq("is_required", true)
    }
}

impl Entity for DocumentCategory {
    type Tenancy = TenantOwned;

    const TABLE: &'static str = "document_categories";

    const COLUMNS: &'static [Column] = &[
        Column::of::<String>("name"),
        Column::of::<Option<String>>("description"),
        Column::of::<bool>("is_required"),
        Column::of::<Option<i32>>("retention_days"),
    ];

    fn encode(&self, row: &mut RowWriter) {
        row.set("name", &self.name)
            .set("description", &self.description)
            .set("is_required", &self.is_required)
            .set("retention_days", &self.retention_days);
    }

    fn decode(row: &StoredRow) -> Result<Self, DecodeError> {
        Ok(Self {
            name: row.get("name")?,
            description: row.get("description")?,
            is_required: row.get("is_required")?,
            retention_days: row.get("retention_days")?,
        })
    }
}

impl TenantScoped for DocumentCategory {
    type Deletion = HardDelete;
}
