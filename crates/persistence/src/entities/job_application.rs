//! Job applications and their status history.
//!
//! The current status lives on [`JobApplication`]; every change is also
//! appended to [`JobApplicationStatusHistory`]. Both writes happen in one
//! [`TenantTransaction`] through [`change_status`], so the history never
//! disagrees with the current status.

use chrono::{DateTime, Utc};

use super::candidate::Candidate;
use crate::codec::{ForeignKey, RecordId, RowWriter, StoredRow};
use crate::core::{Column, Entity, HardDelete, Record, Reference, TenantOwned, TenantScoped};
use crate::datastores::Datastores;
use crate::error::{DecodeError, StorageResult, ValidationError};
use crate::query::Predicate;
use crate::repository::TenantTransaction;
use crate::stored_enum;

stored_enum! {
    /// Where an application stands in the hiring pipeline.
    pub enum ApplicationStatus {
        /// Received.
        Applied => "applied",
        /// Recruiter screening.
        Screening => "screening",
        /// In interviews.
        Interviewing => "interviewing",
        /// Offer extended.
        Offered => "offered",
        /// Offer accepted.
        Hired => "hired",
        /// Turned down by the company.
        Rejected => "rejected",
        /// Pulled by the candidate.
        Withdrawn => "withdrawn",
    }
}

impl ApplicationStatus {
    /// Returns `true` for statuses that end the pipeline.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::Hired | ApplicationStatus::Rejected | ApplicationStatus::Withdrawn
        )
    }
}

/// A candidate's application to a job posting.
#[derive(Debug, Clone, PartialEq)]
pub struct JobApplication {
    /// Applying candidate.
    pub candidate_id: ForeignKey<Candidate>,
    /// Posting applied to, owned by the recruiting service.
    pub job_posting_id: RecordId,
    /// Current pipeline status.
    pub status: ApplicationStatus,
    /// When the application arrived.
    pub applied_at: DateTime<Utc>,
    /// Cover letter text.
    pub cover_letter: Option<String>,
    /// Location of the uploaded resume.
    pub resume_path: Option<String>,
}

impl JobApplication {
    /// Applications of `candidate_id`.
    pub fn for_candidate(candidate_id: RecordId) -> Predicate {
        Predicate::eq("candidate_id", candidate_id)
    }

    /// Applications in `status`.
    pub fn in_status(status: ApplicationStatus) -> Predicate {
        Predicate::eq("status", status)
    }

    /// Applications still moving through the pipeline.
    pub fn open() -> Predicate {
        Predicate::is_in(
            "status",
            ApplicationStatus::ALL.iter().copied().filter(|s| !s.is_terminal()),
        )
    }
}

impl Entity for JobApplication {
    type Tenancy = TenantOwned;

    const TABLE: &'static str = "job_applications";

    const COLUMNS: &'static [Column] = &[
        Column::of::<ForeignKey<Candidate>>("candidate_id"),
        Column::of::<RecordId>("job_posting_id"),
        Column::of::<ApplicationStatus>("status"),
        Column::of::<DateTime<Utc>>("applied_at"),
        Column::of::<Option<String>>("cover_letter"),
        Column::of::<Option<String>>("resume_path"),
    ];

    fn encode(&self, row: &mut RowWriter) {
        row.set("candidate_id", &self.candidate_id)
            .set("job_posting_id", &self.job_posting_id)
            .set("status", &self.status)
            .set("applied_at", &self.applied_at)
            .set("cover_letter", &self.cover_letter)
            .set("resume_path", &self.resume_path);
    }

    fn decode(row: &StoredRow) -> Result<Self, DecodeError> {
        Ok(Self {
            candidate_id: row.get("candidate_id")?,
            job_posting_id: row.get("job_posting_id")?,
            status: row.get("status")?,
            applied_at: row.get("applied_at")?,
            cover_letter: row.get("cover_letter")?,
            resume_path: row.get("resume_path")?,
        })
    }
}

impl TenantScoped for JobApplication {
    type Deletion = HardDelete;

    fn references(&self) -> Vec<Reference> {
        vec![self.candidate_id.reference("candidate_id")]
    }
}

/// One status change of a job application.
#[derive(Debug, Clone, PartialEq)]
pub struct JobApplicationStatusHistory {
    /// Changed application.
    pub job_application_id: ForeignKey<JobApplication>,
    /// Previous status. NULL for the initial entry.
    pub from_status: Option<ApplicationStatus>,
    /// New status.
    pub to_status: ApplicationStatus,
    /// Acting user, if any.
    pub changed_by: Option<RecordId>,
    /// Reason given.
    pub notes: Option<String>,
    /// When the change happened.
    pub changed_at: DateTime<Utc>,
}

impl JobApplicationStatusHistory {
    /// History of `job_application_id`.
    pub fn for_application(job_application_id: RecordId) -> Predicate {
        Predicate::eq("job_application_id", job_application_id)
    }
}

impl Entity for JobApplicationStatusHistory {
    type Tenancy = TenantOwned;

    const TABLE: &'static str = "job_application_status_histories";

    const COLUMNS: &'static [Column] = &[
        Column::of::<ForeignKey<JobApplication>>("job_application_id"),
        Column::of::<Option<ApplicationStatus>>("from_status"),
        Column::of::<ApplicationStatus>("to_status"),
        Column::of::<Option<RecordId>>("changed_by"),
        Column::of::<Option<String>>("notes"),
        Column::of::<DateTime<Utc>>("changed_at"),
    ];

    fn encode(&self, row: &mut RowWriter) {
        row.set("job_application_id", &self.job_application_id)
            .set("from_status", &self.from_status)
            .set("to_status", &self.to_status)
            .set("changed_by", &self.changed_by)
            .set("notes", &self.notes)
            .set("changed_at", &self.changed_at);
    }

    fn decode(row: &StoredRow) -> Result<Self, DecodeError> {
        Ok(Self {
            job_application_id: row.get("job_application_id")?,
            from_status: row.get("from_status")?,
            to_status: row.get("to_status")?,
            changed_by: row.get("changed_by")?,
            notes: row.get("notes")?,
            changed_at: row.get("changed_at")?,
        })
    }
}

impl TenantScoped for JobApplicationStatusHistory {
    type Deletion = HardDelete;

    fn references(&self) -> Vec<Reference> {
        vec![self.job_application_id.reference("job_application_id")]
    }
}

/// Appends a history entry and moves the application to `to` within `tx`.
///
/// Fails with [`ValidationError::InvalidTransition`] when the application is
/// already in a terminal status or already in `to`. Nothing is written in
/// that case.
pub async fn record_status_change(
    tx: &mut TenantTransaction,
    id: RecordId,
    to: ApplicationStatus,
    changed_by: Option<RecordId>,
    notes: Option<String>,
) -> StorageResult<Record<JobApplication>> {
    let application = tx.find::<JobApplication>(id).await?;
    let from = application.data.status;
    if from.is_terminal() || from == to {
        return Err(ValidationError::InvalidTransition {
            table: JobApplication::TABLE,
            from: from.to_string(),
            to: to.to_string(),
        }
        .into());
    }

    tx.create(JobApplicationStatusHistory {
        job_application_id: ForeignKey::new(id),
        from_status: Some(from),
        to_status: to,
        changed_by,
        notes,
        changed_at: Utc::now(),
    })
    .await?;

    let mut data = application.into_data();
    data.status = to;
    tx.update(id, data).await
}

/// Changes the status of application `id` in its own transaction.
///
/// Commits when both writes succeed. Any failure rolls back and the original
/// error is returned.
pub async fn change_status(
    stores: &Datastores,
    id: RecordId,
    to: ApplicationStatus,
    changed_by: Option<RecordId>,
    notes: Option<String>,
) -> StorageResult<Record<JobApplication>> {
    let mut tx = stores.begin().await?;
    match record_status_change(&mut tx, id, to, changed_by, notes).await {
        Ok(application) => {
            tx.commit().await?;
            tracing::debug!(id = %id, status = %to, "job application status changed");
            Ok(application)
        }
        Err(e) => {
            tracing::warn!(id = %id, status = %to, error = %e, "status change failed, rolling back");
            if let Err(rollback) = tx.rollback().await {
                tracing::error!(id = %id, error = %rollback, "rollback after failed status change failed");
            }
            Err(e)
        }
    }
}
