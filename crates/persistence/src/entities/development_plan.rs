//! Development plans and their check-ins.

use chrono::NaiveDate;

use crate::codec::{ForeignKey, RecordId, RowWriter, StoredRow};
use crate::core::{Column, Entity, HardDelete, Reference, TenantOwned, TenantScoped};
use crate::error::DecodeError;
use crate::query::Predicate;
use crate::stored_enum;

stored_enum! {
    /// Lifecycle of a development plan.
    pub enum DevelopmentPlanStatus {
        /// Being drafted with the manager.
        Draft => "draft",
        /// In progress.
        Active => "active",
        /// Finished.
        Completed => "completed",
        /// Dropped.
        Cancelled => "cancelled",
    }
}

/// A growth plan agreed between an employee and their manager.
#[derive(Debug, Clone, PartialEq)]
pub struct DevelopmentPlan {
    /// Employee the plan is for.
    pub employee_id: RecordId,
    /// Sponsoring manager.
    pub manager_id: Option<RecordId>,
    /// Short title.
    pub title: String,
    /// What the plan should achieve.
    pub objective: Option<String>,
    /// Lifecycle state.
    pub status: DevelopmentPlanStatus,
    /// First day.
    pub start_date: NaiveDate,
    /// Planned end.
    pub target_date: Option<NaiveDate>,
}

impl DevelopmentPlan {
    /// Plans of `employee_id`.
    pub fn for_employee(employee_id: RecordId) -> Predicate {
        Predicate::eq("employee_id", employee_id)
    }

    /// Plans sponsored by `manager_id`.
    pub fn managed_by(manager_id: RecordId) -> Predicate {
        Predicate::eq("manager_id", manager_id)
    }
}

impl Entity for DevelopmentPlan {
    type Tenancy = TenantOwned;

    const TABLE: &'static str = "development_plans";

    const COLUMNS: &'static [Column] = &[
        Column::of::<RecordId>("employee_id"),
        Column::of::<Option<RecordId>>("manager_id"),
        Column::of::<String>("title"),
        Column::of::<Option<String>>("objective"),
        Column::of::<DevelopmentPlanStatus>("status"),
        Column::of::<NaiveDate>("start_date"),
        Column::of::<Option<NaiveDate>>("target_date"),
    ];

    fn encode(&self, row: &mut RowWriter) {
        row.set("employee_id", &self.employee_id)
            .set("manager_id", &self.manager_id)
            .set("title", &self.title)
            .set("objective", &self.objective)
            .set("status", &self.status)
            .set("start_date", &self.start_date)
            .set("target_date", &self.target_date);
    }

    fn decode(row: &StoredRow) -> Result<Self, DecodeError> {
        Ok(Self {
            employee_id: row.get("employee_id")?,
            manager_id: row.get("manager_id")?,
            title: row.get("title")?,
            objective: row.get("objective")?,
            status: row.get("status")?,
            start_date: row.get("start_date")?,
            target_date: row.get("target_date")?,
        })
    }
}

impl TenantScoped for DevelopmentPlan {
    type Deletion = HardDelete;
}

/// A progress note on a development plan.
#[derive(Debug, Clone, PartialEq)]
pub struct DevelopmentPlanCheckIn {
    /// Plan checked in on.
    pub development_plan_id: ForeignKey<DevelopmentPlan>,
    /// Writing user.
    pub author_id: RecordId,
    /// Day of the check-in.
    pub check_in_date: NaiveDate,
    /// What moved forward.
    pub progress_notes: String,
    /// What is in the way.
    pub blockers: Option<String>,
    /// Overall progress, 0 to 100.
    pub progress_percent: i32,
}

impl DevelopmentPlanCheckIn {
    /// Check-ins belonging to `development_plan_id`.
    pub fn for_plan(development_plan_id: RecordId) -> Predicate {
        Predicate::eq("development_plan_id", development_plan_id)
    }
}

impl Entity for DevelopmentPlanCheckIn {
    type Tenancy = TenantOwned;

    const TABLE: &'static str = "development_plan_check_ins";

    const COLUMNS: &'static [Column] = &[
        Column::of::<ForeignKey<DevelopmentPlan>>("development_plan_id"),
        Column::of::<RecordId>("author_id"),
        Column::of::<NaiveDate>("check_in_date"),
        Column::of::<String>("progress_notes"),
        Column::of::<Option<String>>("blockers"),
        Column::of::<i32>("progress_percent"),
    ];

    fn encode(&self, row: &mut RowWriter) {
        row.set("development_plan_id", &self.development_plan_id)
            .set("author_id", &self.author_id)
            .set("check_in_date", &self.check_in_date)
            .set("progress_notes", &self.progress_notes)
            .set("blockers", &self.blockers)
            .set("progress_percent", &self.progress_percent);
    }

    fn decode(row: &StoredRow) -> Result<Self, DecodeError> {
        Ok(Self {
            development_plan_id: row.get("development_plan_id")?,
            author_id: row.get("author_id")?,
            check_in_date: row.get("check_in_date")?,
            progress_notes: row.get("progress_notes")?,
            blockers: row.get("blockers")?,
            progress_percent: row.get("progress_percent")?,
        })
    }
}

impl TenantScoped for DevelopmentPlanCheckIn {
    type Deletion = HardDelete;

    fn references(&self) -> Vec<Reference> {
        vec![self.development_plan_id.reference("development_plan_id")]
    }
}
