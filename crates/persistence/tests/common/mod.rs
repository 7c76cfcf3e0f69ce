//! Shared setup for the persistence integration tests.

#![allow(dead_code)]

use std::future::Future;

use chrono::{DateTime, NaiveDate, Utc};

use hris_persistence::codec::{Json, RecordId};
use hris_persistence::config::PersistenceConfig;
use hris_persistence::datastores::Datastores;
use hris_persistence::entities::{
    Announcement, ApplicationStatus, Audience, Candidate, Goal, GoalStatus, JobApplication,
};
use hris_persistence::error::TenantError;
use hris_persistence::tenant::{TenantContext, TenantId};
use hris_persistence::ForeignKey;

/// A single in-memory store with every table created.
pub async fn create_stores() -> Datastores {
    let stores = Datastores::open(&PersistenceConfig::in_memory()).expect("Failed to open stores");
    stores.init_schema().await.expect("Failed to initialize schema");
    stores
}

/// Runs `future` with `tenant` bound.
pub async fn as_tenant<F: Future>(tenant: &str, future: F) -> F::Output {
    TenantContext::new(TenantId::new(tenant))
        .scope(future)
        .await
        .expect("tenant already bound")
}

/// Same as [`as_tenant`] but returns the binding error.
pub async fn try_as_tenant<F: Future>(tenant: &str, future: F) -> Result<F::Output, TenantError> {
    TenantContext::new(TenantId::new(tenant)).scope(future).await
}

pub fn goal(employee_id: i64, title: &str) -> Goal {
    Goal {
        employee_id: RecordId::new(employee_id),
        title: title.to_string(),
        description: None,
        status: GoalStatus::Active,
        due_date: NaiveDate::from_ymd_opt(2025, 12, 31),
        progress_percent: 0,
    }
}

pub fn candidate(first_name: &str, last_name: &str) -> Candidate {
    Candidate {
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: format!("{}@example.com", first_name.to_lowercase()),
        phone: None,
        source: Some("referral".to_string()),
        linkedin_url: None,
    }
}

pub fn application(candidate_id: RecordId, status: ApplicationStatus) -> JobApplication {
    JobApplication {
        candidate_id: ForeignKey::new(candidate_id),
        job_posting_id: RecordId::new(100),
        status,
        applied_at: Utc::now(),
        cover_letter: None,
        resume_path: None,
    }
}

pub fn announcement(
    title: &str,
    published_at: Option<DateTime<Utc>>,
    expires_at: Option<DateTime<Utc>>,
) -> Announcement {
    Announcement {
        author_id: RecordId::new(1),
        title: title.to_string(),
        body: format!("{title} body"),
        audience: Json(Audience::everyone()),
        is_pinned: false,
        published_at,
        expires_at,
    }
}
