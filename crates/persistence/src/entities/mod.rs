//! The entity catalog.
//!
//! Tenant-owned entities carry a `tenant_id` column managed by the
//! repositories. [`Plan`] and [`PlanModule`] are platform records and live on
//! the platform connection.
//!
//! | Module | Entities | Notes |
//! |--------|----------|-------|
//! | `announcement` | [`Announcement`] | time-windowed, JSON audience |
//! | `background_check` | [`BackgroundCheck`], [`BackgroundCheckDocument`] | |
//! | `candidate` | [`Candidate`], [`CandidateEducation`], [`CandidateWorkExperience`] | |
//! | `development_plan` | [`DevelopmentPlan`], [`DevelopmentPlanCheckIn`] | |
//! | `document_category` | [`DocumentCategory`] | |
//! | `goal` | [`Goal`], [`GoalComment`] | comments soft-delete |
//! | `interview` | [`Interview`], [`InterviewPanelist`] | |
//! | `job_application` | [`JobApplication`], [`JobApplicationStatusHistory`] | transactional status changes |
//! | `kpi` | [`Kpi`], [`KpiProgressEntry`] | fixed-point values |
//! | `offer` | [`Offer`], [`OfferSignature`] | |
//! | `platform` | [`Plan`], [`PlanModule`] | platform store |

mod announcement;
mod background_check;
mod candidate;
mod development_plan;
mod document_category;
mod goal;
mod interview;
pub mod job_application;
mod kpi;
mod offer;
mod platform;

pub use announcement::{Announcement, Audience};
pub use background_check::{BackgroundCheck, BackgroundCheckDocument, BackgroundCheckStatus};
pub use candidate::{Candidate, CandidateEducation, CandidateWorkExperience, EducationLevel};
pub use development_plan::{DevelopmentPlan, DevelopmentPlanCheckIn, DevelopmentPlanStatus};
pub use document_category::DocumentCategory;
pub use goal::{Goal, GoalComment, GoalStatus};
pub use interview::{Interview, InterviewFormat, InterviewPanelist, InterviewStatus};
pub use job_application::{ApplicationStatus, JobApplication, JobApplicationStatusHistory};
pub use kpi::{Kpi, KpiFrequency, KpiProgressEntry};
pub use offer::{Offer, OfferSignature, OfferStatus, SignerType};
pub use platform::{Plan, PlanModule};

use crate::core::TableSchema;

/// Every tenant-owned table, parents before children.
pub fn tenant_tables() -> Vec<TableSchema> {
    vec![
        TableSchema::tenant::<Announcement>(),
        TableSchema::tenant::<DocumentCategory>(),
        TableSchema::tenant::<Candidate>(),
        TableSchema::tenant::<CandidateEducation>(),
        TableSchema::tenant::<CandidateWorkExperience>(),
        TableSchema::tenant::<BackgroundCheck>(),
        TableSchema::tenant::<BackgroundCheckDocument>(),
        TableSchema::tenant::<JobApplication>(),
        TableSchema::tenant::<JobApplicationStatusHistory>(),
        TableSchema::tenant::<Interview>(),
        TableSchema::tenant::<InterviewPanelist>(),
        TableSchema::tenant::<Offer>(),
        TableSchema::tenant::<OfferSignature>(),
        TableSchema::tenant::<Goal>(),
        TableSchema::tenant::<GoalComment>(),
        TableSchema::tenant::<Kpi>(),
        TableSchema::tenant::<KpiProgressEntry>(),
        TableSchema::tenant::<DevelopmentPlan>(),
        TableSchema::tenant::<DevelopmentPlanCheckIn>(),
    ]
}

/// Every platform table, parents before children.
pub fn platform_tables() -> Vec<TableSchema> {
    vec![
        TableSchema::platform::<Plan>(),
        TableSchema::platform::<PlanModule>(),
    ]
}

/// Looks up a tenant-owned table by name.
pub fn tenant_table(name: &str) -> Option<TableSchema> {
    tenant_tables().into_iter().find(|schema| schema.table == name)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::core::{
        CREATED_AT_COLUMN, DELETED_AT_COLUMN, ID_COLUMN, TENANT_COLUMN, UPDATED_AT_COLUMN,
    };

    const MANAGED: [&str; 5] = [
        ID_COLUMN,
        TENANT_COLUMN,
        CREATED_AT_COLUMN,
        UPDATED_AT_COLUMN,
        DELETED_AT_COLUMN,
    ];

    #[test]
    fn test_catalog_sizes() {
        assert_eq!(tenant_tables().len(), 19);
        assert_eq!(platform_tables().len(), 2);
    }

    #[test]
    fn test_table_names_are_unique() {
        let mut seen = HashSet::new();
        for schema in tenant_tables().iter().chain(platform_tables().iter()) {
            assert!(seen.insert(schema.table), "duplicate table {}", schema.table);
        }
    }

    #[test]
    fn test_entities_never_declare_managed_columns() {
        for schema in tenant_tables().iter().chain(platform_tables().iter()) {
            let mut names = HashSet::new();
            for column in schema.columns {
                assert!(
                    !MANAGED.contains(&column.name),
                    "{} declares managed column {}",
                    schema.table,
                    column.name
                );
                assert!(names.insert(column.name), "{} repeats {}", schema.table, column.name);
            }
        }
    }

    #[test]
    fn test_parents_are_created_first() {
        let tables = tenant_tables();
        for (position, schema) in tables.iter().enumerate() {
            for column in schema.columns {
                if let Some(parent) = column.references {
                    let parent_position = tables.iter().position(|t| t.table == parent);
                    assert!(
                        parent_position.is_some_and(|p| p < position),
                        "{} references {} before it exists",
                        schema.table,
                        parent
                    );
                }
            }
        }
    }

    #[test]
    fn test_only_goal_comments_soft_delete() {
        let soft: Vec<_> = tenant_tables()
            .into_iter()
            .filter(|schema| schema.soft_deletes)
            .map(|schema| schema.table)
            .collect();
        assert_eq!(soft, vec!["goal_comments"]);
        assert_eq!(tenant_table("goal_comments").map(|s| s.table), Some("goal_comments"));
        assert!(tenant_table("plans").is_none());
    }
}
