//! Platform record tests: plans and plan modules under both topologies.

#![cfg(feature = "sqlite")]

mod common;

use std::path::Path;

use serde_json::json;

use common::*;

use hris_persistence::codec::{Decimal2, ForeignKey, Json, RecordId};
use hris_persistence::config::{PersistenceConfig, StorageTopology};
use hris_persistence::datastores::Datastores;
use hris_persistence::entities::{Goal, Plan, PlanModule};
use hris_persistence::error::{BackendError, StorageError, ValidationError};
use hris_persistence::query::Predicate;

fn plan(code: &str, price: &str) -> Plan {
    Plan {
        code: code.to_string(),
        name: code.to_uppercase(),
        monthly_price: Decimal2::parse(price).unwrap(),
        max_employees: Some(50),
        is_active: true,
    }
}

fn module(plan_id: RecordId, key: &str, enabled: bool) -> PlanModule {
    PlanModule {
        plan_id: ForeignKey::new(plan_id),
        module_key: key.to_string(),
        is_enabled: enabled,
        settings: Json(json!({ "seats": 10 })),
    }
}

fn table_exists(path: &Path, table: &str) -> bool {
    let conn = rusqlite::Connection::open(path).unwrap();
    conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [table],
        |row| row.get::<_, i64>(0),
    )
    .unwrap()
        == 1
}

// ============================================================================
// Single-Store Tests
// ============================================================================

#[tokio::test]
async fn test_platform_records_need_no_tenant() {
    let stores = create_stores().await;
    let plans = stores.platform::<Plan>();

    let created = plans.create(plan("starter", "19.99")).await.unwrap();
    assert_eq!(created.data.code, "starter");
    assert_eq!(created.data.monthly_price.to_string(), "19.99");

    let found = plans.find(created.id()).await.unwrap();
    assert_eq!(found.data, created.data);
}

#[tokio::test]
async fn test_platform_records_identical_under_any_tenant() {
    let stores = create_stores().await;
    let plans = stores.platform::<Plan>();
    plans.create(plan("starter", "19.99")).await.unwrap();
    plans.create(plan("growth", "49.00")).await.unwrap();

    let acme = as_tenant("acme", plans.list(plans.query())).await.unwrap();
    let globex = as_tenant("globex", plans.list(plans.query())).await.unwrap();
    let unbound = plans.list(plans.query()).await.unwrap();

    assert_eq!(acme.len(), 2);
    assert_eq!(acme, globex);
    assert_eq!(acme, unbound);
}

#[tokio::test]
async fn test_plan_modules_filter_and_update() {
    let stores = create_stores().await;
    let plans = stores.platform::<Plan>();
    let modules = stores.platform::<PlanModule>();

    let growth = plans.create(plan("growth", "49.00")).await.unwrap();
    let starter = plans.create(plan("starter", "19.99")).await.unwrap();
    modules.create(module(growth.id(), "recruiting", true)).await.unwrap();
    let perf = modules.create(module(growth.id(), "performance", false)).await.unwrap();
    modules.create(module(starter.id(), "recruiting", true)).await.unwrap();

    let query = modules
        .query()
        .filter(PlanModule::for_plan(growth.id()))
        .filter(PlanModule::enabled());
    let enabled = modules.list(query).await.unwrap();
    assert_eq!(enabled.len(), 1);
    assert_eq!(enabled[0].data.module_key, "recruiting");

    let perf_id = perf.id();
    let mut data = perf.into_data();
    data.is_enabled = true;
    data.settings = Json(json!({ "review_cycle": "quarterly" }));
    let updated = modules.update(perf_id, data).await.unwrap();
    assert!(updated.data.is_enabled);
    assert_eq!(updated.data.settings.0["review_cycle"], "quarterly");

    let by_code = plans.list(plans.query().filter(Plan::by_code("starter"))).await.unwrap();
    assert_eq!(by_code.len(), 1);
    assert_eq!(by_code[0].id(), starter.id());
}

#[tokio::test]
async fn test_platform_delete_and_missing() {
    let stores = create_stores().await;
    let plans = stores.platform::<Plan>();

    let legacy = plans.create(plan("legacy", "5.00")).await.unwrap();
    plans.delete(legacy.id()).await.unwrap();

    assert!(plans.find(legacy.id()).await.unwrap_err().is_not_found());
    assert!(plans.delete(legacy.id()).await.unwrap_err().is_not_found());
    assert!(
        plans
            .update(legacy.id(), plan("legacy", "6.00"))
            .await
            .unwrap_err()
            .is_not_found()
    );
}

#[tokio::test]
async fn test_platform_query_rejects_tenant_column() {
    let stores = create_stores().await;
    let modules = stores.platform::<PlanModule>();

    let query = modules
        .query()
        .filter(Predicate::eq("tenant_id", "acme".to_string()));
    let result = modules.list(query).await;

    assert!(matches!(
        result,
        Err(StorageError::Validation(ValidationError::ReservedColumn { .. }))
    ));
}

#[tokio::test]
async fn test_module_for_missing_plan_violates_constraint() {
    let stores = create_stores().await;
    let modules = stores.platform::<PlanModule>();

    let result = modules.create(module(RecordId::new(999), "recruiting", true)).await;
    assert!(matches!(
        result,
        Err(StorageError::Backend(BackendError::Constraint { .. }))
    ));
}

// ============================================================================
// Dedicated Platform Store Tests
// ============================================================================

#[tokio::test]
async fn test_dedicated_topology_routes_platform_tables() {
    let dir = tempfile::tempdir().unwrap();
    let tenant_path = dir.path().join("tenants.db");
    let platform_path = dir.path().join("platform.db");

    let config = PersistenceConfig {
        topology: StorageTopology::DedicatedPlatform,
        tenant_database: tenant_path.to_string_lossy().into_owned(),
        platform_database: Some(platform_path.to_string_lossy().into_owned()),
        ..PersistenceConfig::default()
    };
    let stores = Datastores::open(&config).unwrap();
    stores.init_schema().await.unwrap();
    assert_eq!(stores.topology(), StorageTopology::DedicatedPlatform);

    assert!(table_exists(&platform_path, "plans"));
    assert!(table_exists(&platform_path, "plan_modules"));
    assert!(!table_exists(&platform_path, "goals"));
    assert!(table_exists(&tenant_path, "goals"));
    assert!(!table_exists(&tenant_path, "plans"));

    let created = stores
        .platform::<Plan>()
        .create(plan("enterprise", "199.00"))
        .await
        .unwrap();
    as_tenant("acme", stores.tenant::<Goal>().create(goal(1, "Tenant data")))
        .await
        .unwrap();

    let raw = rusqlite::Connection::open(&platform_path).unwrap();
    let code: String = raw
        .query_row(
            "SELECT code FROM plans WHERE id = ?1",
            [created.id().get()],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(code, "enterprise");

    stores.health_check().await.unwrap();
}

#[tokio::test]
async fn test_single_store_keeps_platform_tables_with_tenant_tables() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("all.db");

    let config = PersistenceConfig {
        tenant_database: path.to_string_lossy().into_owned(),
        ..PersistenceConfig::default()
    };
    let stores = Datastores::open(&config).unwrap();
    stores.init_schema().await.unwrap();

    assert!(table_exists(&path, "plans"));
    assert!(table_exists(&path, "goals"));
}

#[tokio::test]
async fn test_dedicated_topology_without_platform_database_fails() {
    let config = PersistenceConfig {
        topology: StorageTopology::DedicatedPlatform,
        ..PersistenceConfig::default()
    };
    assert!(matches!(
        Datastores::open(&config),
        Err(StorageError::Config(_))
    ));
}
