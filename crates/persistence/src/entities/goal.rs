//! Goals and goal comments.

use chrono::NaiveDate;

use crate::codec::{ForeignKey, RecordId, RowWriter, StoredRow};
use crate::core::{
    Column, Entity, HardDelete, Reference, SoftDelete, TenantOwned, TenantScoped,
};
use crate::error::DecodeError;
use crate::query::Predicate;
use crate::stored_enum;

stored_enum! {
    /// Lifecycle of a goal.
    pub enum GoalStatus {
        /// Not yet agreed.
        Draft => "draft",
        /// Being worked on.
        Active => "active",
        /// Achieved.
        Completed => "completed",
        /// Abandoned.
        Cancelled => "cancelled",
    }
}

/// A goal set for an employee.
#[derive(Debug, Clone, PartialEq)]
pub struct Goal {
    /// Owning employee.
    pub employee_id: RecordId,
    /// Short title.
    pub title: String,
    /// Longer description.
    pub description: Option<String>,
    /// Lifecycle state.
    pub status: GoalStatus,
    /// Target completion date.
    pub due_date: Option<NaiveDate>,
    /// Progress, 0 to 100.
    pub progress_percent: i32,
}

impl Goal {
    /// Goals of `employee_id`.
    pub fn for_employee(employee_id: RecordId) -> Predicate {
        Predicate::eq("employee_id", employee_id)
    }

    /// Goals still being worked on.
    pub fn open() -> Predicate {
        Predicate::is_in("status", [GoalStatus::Draft, GoalStatus::Active])
    }
}

impl Entity for Goal {
    type Tenancy = TenantOwned;

    const TABLE: &'static str = "goals";

    const COLUMNS: &'static [Column] = &[
        Column::of::<RecordId>("employee_id"),
        Column::of::<String>("title"),
        Column::of::<Option<String>>("description"),
        Column::of::<GoalStatus>("status"),
        Column::of::<Option<NaiveDate>>("due_date"),
        Column::of::<i32>("progress_percent"),
    ];

    fn encode(&self, row: &mut RowWriter) {
        row.set("employee_id", &self.employee_id)
            .set("title", &self.title)
            .set("description", &self.description)
            .set("status", &self.status)
            .set("due_date", &self.due_date)
            .set("progress_percent", &self.progress_percent);
    }

    fn decode(row: &StoredRow) -> Result<Self, DecodeError> {
        Ok(Self {
            employee_id: row.get("employee_id")?,
            title: row.get("title")?,
            description: row.get("description")?,
            status: row.get("status")?,
            due_date: row.get("due_date")?,
            progress_percent: row.get("progress_percent")?,
        })
    }
}

impl TenantScoped for Goal {
    type Deletion = HardDelete;
}

/// A comment on a goal. Deleting a comment only marks it deleted.
#[derive(Debug, Clone, PartialEq)]
pub struct GoalComment {
    /// Commented goal.
    pub goal_id: ForeignKey<Goal>,
    /// Writing user.
    pub author_id: RecordId,
    /// Comment text.
    pub body: String,
}

impl GoalComment {
    /// A comment by `author_id` on `goal_id`.
    pub fn new(goal_id: RecordId, author_id: RecordId, body: impl Into<String>) -> Self {
        Self {
            goal_id: ForeignKey::new(goal_id),
            author_id,
            body: body.into(),
        }
    }

    /// Comments belonging to `goal_id`.
    pub fn for_goal(goal_id: RecordId) -> Predicate {
        Predicate::eq("goal_id", goal_id)
    }
}

impl Entity for GoalComment {
    type Tenancy = TenantOwned;

    const TABLE: &'static str = "goal_comments";

    const COLUMNS: &'static [Column] = &[
        Column::of::<ForeignKey<Goal>>("goal_id"),
        Column::of::<RecordId>("author_id"),
        Column::of::<String>("body"),
    ];

    fn encode(&self, row: &mut RowWriter) {
        row.set("goal_id", &self.goal_id)
            .set("author_id", &self.author_id)
            .set("body", &self.body);
    }

    fn decode(row: &StoredRow) -> Result<Self, DecodeError> {
        Ok(Self {
            goal_id: row.get("goal_id")?,
            author_id: row.get("author_id")?,
            body: row.get("body")?,
        })
    }
}

impl TenantScoped for GoalComment {
    type Deletion = SoftDelete;

    fn references(&self) -> Vec<Reference> {
        vec![self.goal_id.reference("goal_id")]
    }
}
