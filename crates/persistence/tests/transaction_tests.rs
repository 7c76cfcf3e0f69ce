//! Tenant transaction tests, including the job application status workflow.

#![cfg(feature = "sqlite")]

mod common;

use common::*;

use hris_persistence::codec::RecordId;
use hris_persistence::entities::job_application::{change_status, record_status_change};
use hris_persistence::entities::{
    ApplicationStatus, Candidate, Goal, GoalComment, JobApplication, JobApplicationStatusHistory,
};
use hris_persistence::error::{StorageError, TenantError, ValidationError};

// ============================================================================
// Commit and Rollback Tests
// ============================================================================

#[tokio::test]
async fn test_commit_makes_writes_visible() {
    let stores = create_stores().await;

    as_tenant("acme", async {
        let mut tx = stores.begin().await.unwrap();
        assert_eq!(tx.tenant_id().as_str(), "acme");

        let parent = tx.create(goal(1, "Transactional")).await.unwrap();
        tx.create(GoalComment::new(parent.id(), RecordId::new(2), "Same unit of work"))
            .await
            .unwrap();

        // Reads inside the transaction see its own writes.
        let query = tx.query::<GoalComment>().filter(GoalComment::for_goal(parent.id()));
        assert_eq!(tx.list(query).await.unwrap().len(), 1);

        tx.commit().await.unwrap();

        assert_eq!(stores.tenant::<Goal>().all().await.unwrap().len(), 1);
        assert_eq!(stores.tenant::<GoalComment>().all().await.unwrap().len(), 1);
    })
    .await;
}

#[tokio::test]
async fn test_rollback_discards_writes() {
    let stores = create_stores().await;

    as_tenant("acme", async {
        let mut tx = stores.begin().await.unwrap();
        tx.create(goal(1, "Never happened")).await.unwrap();
        tx.rollback().await.unwrap();

        assert!(stores.tenant::<Goal>().all().await.unwrap().is_empty());
    })
    .await;
}

#[tokio::test]
async fn test_drop_rolls_back() {
    let stores = create_stores().await;

    as_tenant("acme", async {
        {
            let mut tx = stores.begin().await.unwrap();
            tx.create(goal(1, "Dropped")).await.unwrap();
        }

        assert!(stores.tenant::<Goal>().all().await.unwrap().is_empty());
    })
    .await;
}

#[tokio::test]
async fn test_update_and_delete_inside_transaction() {
    let stores = create_stores().await;

    as_tenant("acme", async {
        let goals = stores.tenant::<Goal>();
        let first = goals.create(goal(1, "First")).await.unwrap();
        let second = goals.create(goal(2, "Second")).await.unwrap();

        let mut tx = stores.begin().await.unwrap();
        let mut data = tx.find::<Goal>(first.id()).await.unwrap().into_data();
        data.progress_percent = 75;
        tx.update(first.id(), data).await.unwrap();
        tx.delete::<Goal>(second.id()).await.unwrap();
        tx.commit().await.unwrap();

        let remaining = goals.all().await.unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].data.progress_percent, 75);
    })
    .await;
}

// ============================================================================
// Tenant Binding Tests
// ============================================================================

#[tokio::test]
async fn test_begin_requires_tenant_context() {
    let stores = create_stores().await;
    let result = stores.begin().await;
    assert!(matches!(
        result,
        Err(StorageError::Tenant(TenantError::NoTenantContext))
    ));
}

#[tokio::test]
async fn test_transaction_rejects_use_outside_its_tenant() {
    let stores = create_stores().await;

    let mut tx = as_tenant("acme", stores.begin()).await.unwrap();

    let result = tx.find::<Goal>(RecordId::new(1)).await;
    assert!(matches!(
        result,
        Err(StorageError::Tenant(TenantError::NoTenantContext))
    ));

    let result = as_tenant("globex", tx.create(goal(1, "Wrong tenant"))).await;
    assert!(matches!(
        result,
        Err(StorageError::Tenant(TenantError::TenantMismatch { .. }))
    ));

    tx.rollback().await.unwrap();
}

// ============================================================================
// Status Workflow Tests
// ============================================================================

async fn seed_application(
    stores: &hris_persistence::Datastores,
    status: ApplicationStatus,
) -> RecordId {
    let person = stores
        .tenant::<Candidate>()
        .create(candidate("Mary", "Jackson"))
        .await
        .unwrap();
    stores
        .tenant::<JobApplication>()
        .create(application(person.id(), status))
        .await
        .unwrap()
        .id()
}

#[tokio::test]
async fn test_change_status_appends_history() {
    let stores = create_stores().await;

    as_tenant("acme", async {
        let id = seed_application(&stores, ApplicationStatus::Applied).await;

        let updated = change_status(
            &stores,
            id,
            ApplicationStatus::Screening,
            Some(RecordId::new(9)),
            Some("Strong resume".to_string()),
        )
        .await
        .unwrap();
        assert_eq!(updated.data.status, ApplicationStatus::Screening);

        change_status(&stores, id, ApplicationStatus::Interviewing, None, None)
            .await
            .unwrap();

        let history = stores.tenant::<JobApplicationStatusHistory>();
        let query = history
            .query()
            .unwrap()
            .filter(JobApplicationStatusHistory::for_application(id))
            .order_by("id");
        let entries = history.list(query).await.unwrap();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].data.from_status, Some(ApplicationStatus::Applied));
        assert_eq!(entries[0].data.to_status, ApplicationStatus::Screening);
        assert_eq!(entries[0].data.changed_by, Some(RecordId::new(9)));
        assert_eq!(entries[0].data.notes.as_deref(), Some("Strong resume"));
        assert_eq!(entries[1].data.from_status, Some(ApplicationStatus::Screening));
        assert_eq!(entries[1].data.to_status, ApplicationStatus::Interviewing);

        let current = stores.tenant::<JobApplication>().find(id).await.unwrap();
        assert_eq!(current.data.status, ApplicationStatus::Interviewing);
    })
    .await;
}

#[tokio::test]
async fn test_change_status_from_terminal_is_rejected() {
    let stores = create_stores().await;

    as_tenant("acme", async {
        let id = seed_application(&stores, ApplicationStatus::Hired).await;

        let err = change_status(&stores, id, ApplicationStatus::Screening, None, None)
            .await
            .unwrap_err();
        match err {
            StorageError::Validation(ValidationError::InvalidTransition { table, from, to }) => {
                assert_eq!(table, "job_applications");
                assert_eq!(from, "hired");
                assert_eq!(to, "screening");
            }
            other => panic!("Expected InvalidTransition, got {:?}", other),
        }

        let history = stores.tenant::<JobApplicationStatusHistory>();
        assert!(history.all().await.unwrap().is_empty());
        let current = stores.tenant::<JobApplication>().find(id).await.unwrap();
        assert_eq!(current.data.status, ApplicationStatus::Hired);
    })
    .await;
}

#[tokio::test]
async fn test_change_status_unknown_application_is_not_found() {
    let stores = create_stores().await;

    let result = as_tenant(
        "acme",
        change_status(&stores, RecordId::new(404), ApplicationStatus::Offered, None, None),
    )
    .await;

    assert!(result.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_change_status_of_other_tenant_is_not_found() {
    let stores = create_stores().await;

    let id = as_tenant("acme", seed_application(&stores, ApplicationStatus::Applied)).await;
    let result = as_tenant(
        "globex",
        change_status(&stores, id, ApplicationStatus::Rejected, None, None),
    )
    .await;
    assert!(result.unwrap_err().is_not_found());

    as_tenant("acme", async {
        let current = stores.tenant::<JobApplication>().find(id).await.unwrap();
        assert_eq!(current.data.status, ApplicationStatus::Applied);
    })
    .await;
}

#[tokio::test]
async fn test_status_change_rolled_back_with_surrounding_work() {
    let stores = create_stores().await;

    as_tenant("acme", async {
        let id = seed_application(&stores, ApplicationStatus::Applied).await;

        let mut tx = stores.begin().await.unwrap();
        record_status_change(&mut tx, id, ApplicationStatus::Offered, None, None)
            .await
            .unwrap();
        tx.rollback().await.unwrap();

        let history = stores.tenant::<JobApplicationStatusHistory>();
        assert!(history.all().await.unwrap().is_empty());
        let current = stores.tenant::<JobApplication>().find(id).await.unwrap();
        assert_eq!(current.data.status, ApplicationStatus::Applied);
    })
    .await;
}
