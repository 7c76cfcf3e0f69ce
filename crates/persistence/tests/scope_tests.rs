//! Query scope tests: publication windows, soft deletes, ordering and paging.

#![cfg(feature = "sqlite")]

mod common;

use chrono::{Duration, NaiveDate, Utc};

use common::*;

use hris_persistence::codec::{Decimal2, ForeignKey, RecordId};
use hris_persistence::entities::{
    Announcement, Goal, GoalComment, Kpi, KpiFrequency, KpiProgressEntry,
};
use hris_persistence::error::{StorageError, ValidationError};
use hris_persistence::query::{Predicate, Published};
use hris_persistence::tenant::AllTenants;

// ============================================================================
// Published Scope Tests
// ============================================================================

#[tokio::test]
async fn test_published_scope_applies_window() {
    let stores = create_stores().await;
    let announcements = stores.tenant::<Announcement>();
    let now = Utc::now();
    let day = Duration::days(1);

    let titles = as_tenant("acme", async {
        announcements
            .create(announcement("current", Some(now - day), Some(now + day)))
            .await?;
        announcements
            .create(announcement("open-ended", Some(now - day), None))
            .await?;
        announcements
            .create(announcement("expired", Some(now - day * 2), Some(now - day)))
            .await?;
        announcements
            .create(announcement("scheduled", Some(now + day), None))
            .await?;
        announcements.create(announcement("draft", None, None)).await?;

        let query = announcements
            .query()?
            .scope(&Announcement::published())
            .order_by("title");
        announcements.list(query).await
    })
    .await
    .unwrap()
    .into_iter()
    .map(|r| r.data.title)
    .collect::<Vec<_>>();

    assert_eq!(titles, vec!["current", "open-ended"]);
}

#[tokio::test]
async fn test_published_scope_at_fixed_instant() {
    let stores = create_stores().await;
    let announcements = stores.tenant::<Announcement>();
    let now = Utc::now();
    let day = Duration::days(1);

    let count = as_tenant("acme", async {
        announcements
            .create(announcement("next week", Some(now + day * 7), None))
            .await?;
        let query = announcements
            .query()?
            .scope(&Published::at(now + day * 8));
        announcements.count(query).await
    })
    .await
    .unwrap();

    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_published_scope_stays_tenant_filtered() {
    let stores = create_stores().await;
    let announcements = stores.tenant::<Announcement>();
    let past = Utc::now() - Duration::hours(1);

    as_tenant("globex", announcements.create(announcement("globex news", Some(past), None)))
        .await
        .unwrap();

    let visible = as_tenant("acme", async {
        let query = announcements.query()?.scope(&Announcement::published());
        announcements.list(query).await
    })
    .await
    .unwrap();

    assert!(visible.is_empty());
}

#[tokio::test]
async fn test_scopes_compose_in_any_order() {
    let stores = create_stores().await;
    let announcements = stores.tenant::<Announcement>();
    let past = Utc::now() - Duration::hours(1);

    let (first, second) = as_tenant("acme", async {
        let mut pinned = announcement("pinned", Some(past), None);
        pinned.is_pinned = true;
        announcements.create(pinned).await?;
        announcements.create(announcement("plain", Some(past), None)).await?;

        let published = Announcement::published();
        let a = announcements
            .query()?
            .scope(&published)
            .scope(&Announcement::pinned());
        let b = announcements
            .query()?
            .scope(&Announcement::pinned())
            .scope(&published);
        Ok::<_, StorageError>((announcements.list(a).await?, announcements.list(b).await?))
    })
    .await
    .unwrap();

    assert_eq!(first.len(), 1);
    assert_eq!(first, second);
    assert_eq!(first[0].data.title, "pinned");
}

// ============================================================================
// Soft Delete Tests
// ============================================================================

#[tokio::test]
async fn test_soft_delete_lifecycle() {
    let stores = create_stores().await;
    let goals = stores.tenant::<Goal>();
    let comments = stores.tenant::<GoalComment>();

    as_tenant("acme", async {
        let parent = goals.create(goal(1, "Quarterly targets")).await.unwrap();
        let kept = comments
            .create(GoalComment::new(parent.id(), RecordId::new(3), "Keep me"))
            .await
            .unwrap();
        let trashed = comments
            .create(GoalComment::new(parent.id(), RecordId::new(3), "Trash me"))
            .await
            .unwrap();

        comments.delete(trashed.id()).await.unwrap();

        // Default queries exclude the trashed comment.
        let live = comments.all().await.unwrap();
        assert_eq!(live.len(), 1);
        assert_eq!(live[0].id(), kept.id());
        assert!(comments.find(trashed.id()).await.unwrap_err().is_not_found());

        // Deleting again is not found: only live records can be deleted.
        assert!(comments.delete(trashed.id()).await.unwrap_err().is_not_found());

        let with = comments.query().unwrap().with_trashed();
        assert_eq!(comments.count(with).await.unwrap(), 2);
        let only = comments.query().unwrap().only_trashed();
        let only = comments.list(only).await.unwrap();
        assert_eq!(only.len(), 1);
        assert!(only[0].is_trashed());
        assert!(only[0].deleted_at().is_some());

        let found = comments.find_with_trashed(trashed.id()).await.unwrap();
        assert!(found.is_trashed());

        let restored = comments.restore(trashed.id()).await.unwrap();
        assert!(!restored.is_trashed());
        assert_eq!(comments.all().await.unwrap().len(), 2);

        comments.force_delete(trashed.id()).await.unwrap();
        assert!(
            comments
                .find_with_trashed(trashed.id())
                .await
                .unwrap_err()
                .is_not_found()
        );
        let with = comments.query().unwrap().with_trashed();
        assert_eq!(comments.count(with).await.unwrap(), 1);
    })
    .await;
}

#[tokio::test]
async fn test_restore_live_record_is_not_found() {
    let stores = create_stores().await;
    let goals = stores.tenant::<Goal>();
    let comments = stores.tenant::<GoalComment>();

    as_tenant("acme", async {
        let parent = goals.create(goal(1, "Goal")).await.unwrap();
        let comment = comments
            .create(GoalComment::new(parent.id(), RecordId::new(3), "Live"))
            .await
            .unwrap();
        assert!(comments.restore(comment.id()).await.unwrap_err().is_not_found());
    })
    .await;
}

#[tokio::test]
async fn test_hard_delete_removes_row() {
    let stores = create_stores().await;
    let goals = stores.tenant::<Goal>();

    let id = as_tenant("acme", async {
        let created = goals.create(goal(1, "Temporary")).await.unwrap();
        goals.delete(created.id()).await.unwrap();
        assert!(goals.find(created.id()).await.unwrap_err().is_not_found());
        created.id()
    })
    .await;

    let bypass = AllTenants::acquire("verify hard delete").unwrap();
    let result = goals.across_tenants(&bypass).find(id).await;
    assert!(result.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_trashed_rows_hidden_from_bypass_by_default() {
    let stores = create_stores().await;
    let goals = stores.tenant::<Goal>();
    let comments = stores.tenant::<GoalComment>();

    as_tenant("acme", async {
        let parent = goals.create(goal(1, "Goal")).await.unwrap();
        let comment = comments
            .create(GoalComment::new(parent.id(), RecordId::new(3), "Gone"))
            .await
            .unwrap();
        comments.delete(comment.id()).await.unwrap();
    })
    .await;

    let bypass = AllTenants::acquire("audit").unwrap();
    let all = comments.across_tenants(&bypass);
    assert_eq!(all.count(all.query()).await.unwrap(), 0);
    assert_eq!(all.count(all.query().with_trashed()).await.unwrap(), 1);
    assert!(all.tenant_counts().await.unwrap().is_empty());
}

// ============================================================================
// Ordering and Paging Tests
// ============================================================================

#[tokio::test]
async fn test_order_limit_offset() {
    let stores = create_stores().await;
    let goals = stores.tenant::<Goal>();

    let titles = as_tenant("acme", async {
        for (employee, title) in [(3, "charlie"), (1, "alpha"), (2, "bravo"), (4, "delta")] {
            goals.create(goal(employee, title)).await?;
        }
        let query = goals.query()?.order_by_desc("employee_id").limit(2).offset(1);
        goals.list(query).await
    })
    .await
    .unwrap()
    .into_iter()
    .map(|r| r.data.title)
    .collect::<Vec<_>>();

    assert_eq!(titles, vec!["charlie", "bravo"]);
}

#[tokio::test]
async fn test_first_and_exists() {
    let stores = create_stores().await;
    let goals = stores.tenant::<Goal>();

    as_tenant("acme", async {
        assert!(goals.first(goals.query().unwrap()).await.unwrap().is_none());
        goals.create(goal(1, "Only")).await.unwrap();

        let open = goals.query().unwrap().filter(Goal::open());
        assert!(goals.exists(open).await.unwrap());
        let missing = goals.query().unwrap().filter(Goal::for_employee(RecordId::new(99)));
        assert!(!goals.exists(missing).await.unwrap());
    })
    .await;
}

#[tokio::test]
async fn test_unknown_column_is_rejected() {
    let stores = create_stores().await;
    let goals = stores.tenant::<Goal>();

    let result = as_tenant("acme", async {
        let query = goals.query()?.filter(Predicate::eq("salary", 10i64));
        goals.list(query).await
    })
    .await;

    assert!(matches!(
        result,
        Err(StorageError::Validation(ValidationError::UnknownColumn { .. }))
    ));
}

#[tokio::test]
async fn test_modify_updates_fields_and_timestamp() {
    let stores = create_stores().await;
    let goals = stores.tenant::<Goal>();

    as_tenant("acme", async {
        let created = goals.create(goal(1, "Draft title")).await.unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let modified = goals
            .modify(created.id(), |g| {
                g.title = "Final title".to_string();
                g.progress_percent = 40;
            })
            .await
            .unwrap();

        assert_eq!(modified.data.title, "Final title");
        assert_eq!(modified.data.progress_percent, 40);
        assert_eq!(modified.created_at(), created.created_at());
        assert!(modified.updated_at() > created.updated_at());
    })
    .await;
}

// ============================================================================
// Fixed-Point Aggregation Tests
// ============================================================================

#[tokio::test]
async fn test_kpi_total_has_no_float_drift() {
    let stores = create_stores().await;
    let kpis = stores.tenant::<Kpi>();
    let entries = stores.tenant::<KpiProgressEntry>();

    let total = as_tenant("acme", async {
        let kpi = kpis
            .create(Kpi {
                employee_id: Some(RecordId::new(1)),
                goal_id: None,
                name: "Story points".to_string(),
                unit: "points".to_string(),
                target_value: Decimal2::parse("1.00").unwrap(),
                frequency: KpiFrequency::Weekly,
            })
            .await?;

        for day in 1..=10 {
            entries
                .create(KpiProgressEntry {
                    kpi_id: ForeignKey::new(kpi.id()),
                    recorded_by: RecordId::new(1),
                    value: Decimal2::parse("0.10").unwrap(),
                    recorded_on: NaiveDate::from_ymd_opt(2025, 3, day).unwrap(),
                    note: None,
                })
                .await?;
        }

        KpiProgressEntry::total_for(&entries, kpi.id()).await
    })
    .await
    .unwrap();

    assert_eq!(total, Decimal2::parse("1.00").unwrap());
    assert_eq!(total.to_string(), "1.00");
}

fn kpi(name: &str, target: &str) -> Kpi {
    Kpi {
        employee_id: Some(RecordId::new(1)),
        goal_id: None,
        name: name.to_string(),
        unit: "tickets".to_string(),
        target_value: Decimal2::parse(target).unwrap(),
        frequency: KpiFrequency::Monthly,
    }
}

#[tokio::test]
async fn test_decimal_filters_and_ordering_are_numeric() {
    let stores = create_stores().await;
    let kpis = stores.tenant::<Kpi>();

    as_tenant("acme", async {
        kpis.create(kpi("big", "100.00")).await.unwrap();
        kpis.create(kpi("small", "9.00")).await.unwrap();
        kpis.create(kpi("middle", "50.50")).await.unwrap();

        let threshold = Decimal2::parse("50.00").unwrap();
        let query = kpis
            .query()
            .unwrap()
            .filter(Predicate::gt("target_value", threshold))
            .order_by("target_value");
        let names: Vec<String> = kpis
            .list(query)
            .await
            .unwrap()
            .into_iter()
            .map(|record| record.data.name)
            .collect();
        assert_eq!(names, ["middle", "big"]);

        let query = kpis.query().unwrap().filter(Predicate::le("target_value", threshold));
        let small = kpis.list(query).await.unwrap();
        assert_eq!(small.len(), 1);
        assert_eq!(small[0].data.target_value.to_string(), "9.00");

        let query = kpis.query().unwrap().order_by_desc("target_value");
        let names: Vec<String> = kpis
            .list(query)
            .await
            .unwrap()
            .into_iter()
            .map(|record| record.data.name)
            .collect();
        assert_eq!(names, ["big", "middle", "small"]);
    })
    .await;
}
