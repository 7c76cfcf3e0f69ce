//! Subscription plans and their module assignments.
//!
//! These records are shared by every tenant and live on the platform
//! connection. They have no `tenant_id` column and can only be reached through
//! [`PlatformRepository`](crate::repository::PlatformRepository).

use crate::codec::{Decimal2, ForeignKey, Json, RecordId, RowWriter, StoredRow};
use crate::core::{Column, Entity, PlatformShared};
use crate::error::DecodeError;
use crate::query::Predicate;

/// A subscription plan.
#[derive(Debug, Clone, PartialEq)]
pub struct Plan {
    /// Stable plan code (`starter`, `growth`).
    pub code: String,
    /// Display name.
    pub name: String,
    /// Price per month.
    pub monthly_price: Decimal2,
    /// Seat limit. NULL is unlimited.
    pub max_employees: Option<i32>,
    /// Still sold.
    pub is_active: bool,
}

impl Plan {
    /// The plan with `code`.
    pub fn by_code(code: impl Into<String>) -> Predicate {
        Predicate::eq("code", code.into())
    }
}

impl Entity for Plan {
    type Tenancy = PlatformShared;

    const TABLE: &'static str = "plans";

    const COLUMNS: &'static [Column] = &[
        Column::of::<String>("code"),
        Column::of::<String>("name"),
        Column::of::<Decimal2>("monthly_price"),
        Column::of::<Option<i32>>("max_employees"),
        Column::of::<bool>("is_active"),
    ];

    fn encode(&self, row: &mut RowWriter) {
        row.set("code", &self.code)
            .set("name", &self.name)
            .set("monthly_price", &self.monthly_price)
            .set("max_employees", &self.max_employees)
            .set("is_active", &self.is_active);
    }

    fn decode(row: &StoredRow) -> Result<Self, DecodeError> {
        Ok(Self {
            code: row.get("code")?,
            name: row.get("name")?,
            monthly_price: row.get("monthly_price")?,
            max_employees: row.get("max_employees")?,
            is_active: row.get("is_active")?,
        })
    }
}

/// A product module assigned to a plan, with module-specific settings.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanModule {
    /// Owning plan.
    pub plan_id: ForeignKey<Plan>,
    /// Module identifier (`recruiting`, `performance`).
    pub module_key: String,
    /// Whether the module is switched on for the plan.
    pub is_enabled: bool,
    /// Free-form module settings.
    pub settings: Json<serde_json::Value>,
}

impl PlanModule {
    /// Modules assigned to `plan_id`.
    pub fn for_plan(plan_id: RecordId) -> Predicate {
        Predicate::eq("plan_id", plan_id)
    }

    /// Enabled modules.
    pub fn enabled() -> Predicate {
        Predicate::eq("is_enabled", true)
    }
}

impl Entity for PlanModule {
    type Tenancy = PlatformShared;

    const TABLE: &'static str = "plan_modules";

    const COLUMNS: &'static [Column] = &[
        Column::of::<ForeignKey<Plan>>("plan_id"),
        Column::of::<String>("module_key"),
        Column::of::<bool>("is_enabled"),
        Column::of::<Json<serde_json::Value>>("settings"),
    ];

    fn encode(&self, row: &mut RowWriter) {
        row.set("plan_id", &self.plan_id)
            .set("module_key", &self.module_key)
            .set("is_enabled", &self.is_enabled)
            .set("settings", &self.settings);
    }

    fn decode(row: &StoredRow) -> Result<Self, DecodeError> {
        Ok(Self {
            plan_id: row.get("plan_id")?,
            module_key: row.get("module_key")?,
            is_enabled: row.get("is_enabled")?,
            settings: row.get("settings")?,
        })
    }
}
