//! Background checks and their documents.

use chrono::{DateTime, Utc};

use super::candidate::Candidate;
use super::document_category::DocumentCategory;
use crate::codec::{ForeignKey, RecordId, RowWriter, StoredRow};
use crate::core::{Column, Entity, HardDelete, Reference, TenantOwned, TenantScoped};
use crate::error::DecodeError;
use crate::query::Predicate;
use crate::stored_enum;

stored_enum! {
    /// Progress of a background check with the screening provider.
    pub enum BackgroundCheckStatus {
        /// Ordered, not yet started.
        Pending => "pending",
        /// Provider is working on it.
        InProgress => "in_progress",
        /// Nothing reportable found.
        Clear => "clear",
        /// Findings need review.
        Consider => "consider",
        /// Withdrawn before completion.
        Cancelled => "cancelled",
    }
}

/// A screening ordered for a candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundCheck {
    /// Screened candidate.
    pub candidate_id: ForeignKey<Candidate>,
    /// Screening provider.
    pub provider: String,
    /// Provider package name.
    pub package: String,
    /// Current state.
    pub status: BackgroundCheckStatus,
    /// When the check was ordered.
    pub requested_at: DateTime<Utc>,
    /// When the provider reported.
    pub completed_at: Option<DateTime<Utc>>,
    /// Provider summary.
    pub result_summary: Option<String>,
}

impl BackgroundCheck {
    /// Checks still waiting on the provider.
    pub fn outstanding() -> Predicate {
        Predicate::is_in(
            "status",
            [BackgroundCheckStatus::Pending, BackgroundCheckStatus::InProgress],
        )
    }
}

impl Entity for BackgroundCheck {
    type Tenancy = TenantOwned;

    const TABLE: &'static str = "background_checks";

    const COLUMNS: &'static [Column] = &[
        Column::of::<ForeignKey<Candidate>>("candidate_id"),
        Column::of::<String>("provider"),
        Column::of::<String>("package"),
        Column::of::<BackgroundCheckStatus>("status"),
        Column::of::<DateTime<Utc>>("requested_at"),
        Column::of::<Option<DateTime<Utc>>>("completed_at"),
        Column::of::<Option<String>>("result_summary"),
    ];

    fn encode(&self, row: &mut RowWriter) {
        row.set("candidate_id", &self.candidate_id)
            .set("provider", &self.provider)
            .set("package", &self.package)
            .set("status", &self.status)
            .set("requested_at", &self.requested_at)
            .set("completed_at", &self.completed_at)
            .set("result_summary", &self.result_summary);
    }

    fn decode(row: &StoredRow) -> Result<Self, DecodeError> {
        Ok(Self {
            candidate_id: row.get("candidate_id")?,
            provider: row.get("provider")?,
            package: row.get("package")?,
            status: row.get("status")?,
            requested_at: row.get("requested_at")?,
            completed_at: row.get("completed_at")?,
            result_summary: row.get("result_summary")?,
        })
    }
}

impl TenantScoped for BackgroundCheck {
    type Deletion = HardDelete;

    fn references(&self) -> Vec<Reference> {
        vec![self.candidate_id.reference("candidate_id")]
    }
}

/// Metadata of a file attached to a background check. File contents live in
/// external storage at `storage_path`.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundCheckDocument {
    /// Owning check.
    pub background_check_id: ForeignKey<BackgroundCheck>,
    /// Optional classification.
    pub document_category_id: Option<ForeignKey<DocumentCategory>>,
    /// Original file name.
    pub file_name: String,
    /// Location in document storage.
    pub storage_path: String,
    /// MIME type.
    pub mime_type: String,
    /// Size in bytes.
    pub size_bytes: i64,
    /// Uploading user.
    pub uploaded_by: RecordId,
}

impl BackgroundCheckDocument {
    /// Documents attached to `background_check_id`.
    pub fn for_check(background_check_id: RecordId) -> Predicate {
        Predicate::eq("background_check_id", background_check_id)
    }
}

impl Entity for BackgroundCheckDocument {
    type Tenancy = TenantOwned;

    const TABLE: &'static str = "background_check_documents";

    const COLUMNS: &'static [Column] = &[
        Column::of::<ForeignKey<BackgroundCheck>>("background_check_id"),
        Column::of::<Option<ForeignKey<DocumentCategory>>>("document_category_id"),
        Column::of::<String>("file_name"),
        Column::of::<String>("storage_path"),
        Column::of::<String>("mime_type"),
        Column::of::<i64>("size_bytes"),
        Column::of::<RecordId>("uploaded_by"),
    ];

    fn encode(&self, row: &mut RowWriter) {
        row.set("background_check_id", &self.background_check_id)
            .set("document_category_id", &self.document_category_id)
            .set("file_name", &self.file_name)
            .set("storage_path", &self.storage_path)
            .set("mime_type", &self.mime_type)
            .set("size_bytes", &self.size_bytes)
            .set("uploaded_by", &self.uploaded_by);
    }

    fn decode(row: &StoredRow) -> Result<Self, DecodeError> {
        Ok(Self {
            background_check_id: row.get("background_check_id")?,
            document_category_id: row.get("document_category_id")?,
            file_name: row.get("file_name")?,
            storage_path: row.get("storage_path")?,
            mime_type: row.get("mime_type")?,
            size_bytes: row.get("size_bytes")?,
            uploaded_by: row.get("uploaded_by")?,
        })
    }
}

impl TenantScoped for BackgroundCheckDocument {
    type Deletion = HardDelete;

    fn references(&self) -> Vec<Reference> {
        let mut references = vec![self.background_check_id.reference("background_check_id")];
        if let Some(category) = &self.document_category_id {
            references.push(category.reference("document_category_id"));
        }
        references
    }
}
