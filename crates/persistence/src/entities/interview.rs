//! Interviews and panelists.

use chrono::{DateTime, Utc};

use super::job_application::JobApplication;
use crate::codec::{ForeignKey, RecordId, RowWriter, StoredRow};
use crate::core::{Column, Entity, HardDelete, Reference, TenantOwned, TenantScoped};
use crate::error::DecodeError;
use crate::query::Predicate;
use crate::stored_enum;

stored_enum! {
    /// How an interview is held.
    pub enum InterviewFormat {
        /// In the office.
        Onsite => "onsite",
        /// Phone call.
        Phone => "phone",
        /// Video call.
        Video => "video",
    }
}

stored_enum! {
    /// Lifecycle of an interview.
    pub enum InterviewStatus {
        /// On the calendar.
        Scheduled => "scheduled",
        /// Took place.
        Completed => "completed",
        /// Called off.
        Cancelled => "cancelled",
        /// The candidate did not show up.
        NoShow => "no_show",
    }
}

/// An interview slot for a job application.
#[derive(Debug, Clone, PartialEq)]
pub struct Interview {
    /// Application being interviewed.
    pub job_application_id: ForeignKey<JobApplication>,
    /// Start time.
    pub scheduled_at: DateTime<Utc>,
    /// Planned length.
    pub duration_minutes: i32,
    /// Channel.
    pub format: InterviewFormat,
    /// Room or meeting link.
    pub location: Option<String>,
    /// Lifecycle state.
    pub status: InterviewStatus,
}

impl Interview {
    /// Interviews of `job_application_id`.
    pub fn for_application(job_application_id: RecordId) -> Predicate {
        Predicate::eq("job_application_id", job_application_id)
    }

    /// Scheduled interviews starting at or after `from`.
    pub fn upcoming(from: DateTime<Utc>) -> Predicate {
        Predicate::eq("status", InterviewStatus::Scheduled).and(Predicate::ge("scheduled_at", from))
    }
}

impl Entity for Interview {
    type Tenancy = TenantOwned;

    const TABLE: &'static str = "interviews";

    const COLUMNS: &'static [Column] = &[
        Column::of::<ForeignKey<JobApplication>>("job_application_id"),
        Column::of::<DateTime<Utc>>("scheduled_at"),
        Column::of::<i32>("duration_minutes"),
        Column::of::<InterviewFormat>("format"),
        Column::of::<Option<String>>("location"),
        Column::of::<InterviewStatus>("status"),
    ];

    fn encode(&self, row: &mut RowWriter) {
        row.set("job_application_id", &self.job_application_id)
            .set("scheduled_at", &self.scheduled_at)
            .set("duration_minutes", &self.duration_minutes)
            .set("format", &self.format)
            .set("location", &self.location)
            .set("status", &self.status);
    }

    fn decode(row: &StoredRow) -> Result<Self, DecodeError> {
        Ok(Self {
            job_application_id: row.get("job_application_id")?,
            scheduled_at: row.get("scheduled_at")?,
            duration_minutes: row.get("duration_minutes")?,
            format: row.get("format")?,
            location: row.get("location")?,
            status: row.get("status")?,
        })
    }
}

impl TenantScoped for Interview {
    type Deletion = HardDelete;

    fn references(&self) -> Vec<Reference> {
        vec![self.job_application_id.reference("job_application_id")]
    }
}

/// A member of an interview panel and their feedback.
#[derive(Debug, Clone, PartialEq)]
pub struct InterviewPanelist {
    /// Interview sat on.
    pub interview_id: ForeignKey<Interview>,
    /// Interviewer.
    pub user_id: RecordId,
    /// Leads the panel.
    pub is_lead: bool,
    /// Written feedback.
    pub feedback: Option<String>,
    /// Score, 1 to 5.
    pub rating: Option<i32>,
    /// When feedback was handed in.
    pub submitted_at: Option<DateTime<Utc>>,
}

impl InterviewPanelist {
    /// Panelists of `interview_id`.
    pub fn for_interview(interview_id: RecordId) -> Predicate {
        Predicate::eq("interview_id", interview_id)
    }

    /// Panelists who have not submitted feedback.
    pub fn awaiting_feedback() -> Predicate {
        Predicate::is_null("submitted_at")
    }
}

impl Entity for InterviewPanelist {
    type Tenancy = TenantOwned;

    const TABLE: &'static str = "interview_panelists";

    const COLUMNS: &'static [Column] = &[
        Column::of::<ForeignKey<Interview>>("interview_id"),
        Column::of::<RecordId>("user_id"),
        Column::of::<bool>("is_lead"),
        Column::of::<Option<String>>("feedback"),
        Column::of::<Option<i32>>("rating"),
        Column::of::<Option<DateTime<Utc>>>("submitted_at"),
    ];

    fn encode(&self, row: &mut RowWriter) {
        row.set("interview_id", &self.interview_id)
            .set("user_id", &self.user_id)
            .set("is_lead", &self.is_lead)
            .set("feedback", &self.feedback)
            .set("rating", &self.rating)
            .set("submitted_at", &self.submitted_at);
    }

    fn decode(row: &StoredRow) -> Result<Self, DecodeError> {
        Ok(Self {
            interview_id: row.get("interview_id")?,
            user_id: row.get("user_id")?,
            is_lead: row.get("is_lead")?,
            feedback: row.get("feedback")?,
            rating: row.get("rating")?,
            submitted_at: row.get("submitted_at")?,
        })
    }
}

impl TenantScoped for InterviewPanelist {
    type Deletion = HardDelete;

    fn references(&self) -> Vec<Reference> {
        vec![self.interview_id.reference("interview_id")]
    }
}
