//! HRIS administration tool.
//!
//! Initializes the data stores and reports on their contents across tenants.

mod config;

use std::collections::BTreeMap;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use hris_persistence::core::Entity;
use hris_persistence::entities::{
    Announcement, BackgroundCheck, BackgroundCheckDocument, Candidate, CandidateEducation,
    CandidateWorkExperience, DevelopmentPlan, DevelopmentPlanCheckIn, DocumentCategory, Goal,
    GoalComment, Interview, InterviewPanelist, JobApplication, JobApplicationStatusHistory, Kpi,
    KpiProgressEntry, Offer, OfferSignature, Plan, PlanModule,
};
use hris_persistence::{AllTenants, Datastores, TenantId};

use crate::config::{AdminConfig, Command};

/// Installs the global subscriber. `RUST_LOG` wins over `level`.
fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("hris_persistence={level},hris_admin={level}"))
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

type TenantCounts = BTreeMap<TenantId, u64>;

/// Counts rows per tenant for each listed entity whose table is selected.
macro_rules! count_tables {
    ($stores:expr, $bypass:expr, $only:expr; $($entity:ty),+ $(,)?) => {{
        let mut report: Vec<(&'static str, TenantCounts)> = Vec::new();
        $(
            let table = <$entity as Entity>::TABLE;
            if $only.is_none_or(|wanted| wanted == table) {
                let counts = $stores
                    .tenant::<$entity>()
                    .across_tenants($bypass)
                    .tenant_counts()
                    .await
                    .with_context(|| format!("counting {table}"))?;
                report.push((table, counts));
            }
        )+
        report
    }};
}

async fn tenant_stats(stores: &Datastores, only: Option<&str>) -> anyhow::Result<()> {
    let bypass = AllTenants::acquire("hris-admin tenant-stats")?;

    let report = count_tables!(stores, &bypass, only;
        Announcement,
        DocumentCategory,
        Candidate,
        CandidateEducation,
        CandidateWorkExperience,
        BackgroundCheck,
        BackgroundCheckDocument,
        JobApplication,
        JobApplicationStatusHistory,
        Interview,
        InterviewPanelist,
        Offer,
        OfferSignature,
        Goal,
        GoalComment,
        Kpi,
        KpiProgressEntry,
        DevelopmentPlan,
        DevelopmentPlanCheckIn,
    );

    for (table, counts) in report {
        let total: u64 = counts.values().sum();
        println!("{table}: {total}");
        for (tenant, count) in counts {
            println!("  {tenant}: {count}");
        }
    }
    Ok(())
}

async fn plan_modules(stores: &Datastores, code: &str) -> anyhow::Result<()> {
    let plans = stores.platform::<Plan>();
    let plan = plans
        .list(plans.query().filter(Plan::by_code(code)).limit(1))
        .await?
        .into_iter()
        .next()
        .with_context(|| format!("no plan with code {code}"))?;

    let modules = stores.platform::<PlanModule>();
    let query = modules
        .query()
        .filter(PlanModule::for_plan(plan.id()))
        .order_by("module_key");
    let assignments = modules.list(query).await?;

    println!("{} ({}) {}/month", plan.name, plan.code, plan.monthly_price);
    for assignment in assignments {
        let state = if assignment.is_enabled { "enabled" } else { "disabled" };
        println!("  {}: {} {}", assignment.module_key, state, assignment.settings.0);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AdminConfig::parse();
    init_logging(&config.log_level);

    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("Configuration error: {}", error);
        }
        std::process::exit(1);
    }

    info!(
        topology = %config.topology,
        tenant_database = %config.tenant_database,
        platform_database = ?config.platform_database,
        "Opening data stores"
    );
    let stores = Datastores::open(&config.to_persistence_config())
        .context("failed to open data stores")?;

    match &config.command {
        Command::Init => {
            stores.init_schema().await?;
            println!("Schema initialized");
        }
        Command::TenantStats { table } => tenant_stats(&stores, table.as_deref()).await?,
        Command::PlanModules { plan } => plan_modules(&stores, plan).await?,
    }

    Ok(())
}

#[cfg(not(feature = "sqlite"))]
compile_error!("At least one database backend feature must be enabled");
