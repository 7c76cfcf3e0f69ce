//! Key performance indicators and progress entries.

use chrono::NaiveDate;

use super::goal::Goal;
use crate::codec::{Decimal2, ForeignKey, RecordId, RowWriter, StoredRow};
use crate::core::{Column, Entity, HardDelete, Reference, TenantOwned, TenantScoped};
use crate::error::{DecodeError, StorageResult};
use crate::query::Predicate;
use crate::repository::TenantRepository;
use crate::stored_enum;

stored_enum! {
    /// How often a KPI is measured.
    pub enum KpiFrequency {
        /// Every week.
        Weekly => "weekly",
        /// Every month.
        Monthly => "monthly",
        /// Every quarter.
        Quarterly => "quarterly",
        /// Once a year.
        Yearly => "yearly",
    }
}

/// A measurable target, optionally tied to an employee or a goal.
#[derive(Debug, Clone, PartialEq)]
pub struct Kpi {
    /// Measured employee. NULL for team KPIs.
    pub employee_id: Option<RecordId>,
    /// Goal the KPI tracks.
    pub goal_id: Option<ForeignKey<Goal>>,
    /// Display name.
    pub name: String,
    /// Unit of `target_value` (hours, tickets, EUR).
    pub unit: String,
    /// Value to reach.
    pub target_value: Decimal2,
    /// Measurement cadence.
    pub frequency: KpiFrequency,
}

impl Kpi {
    /// KPIs of `employee_id`.
    pub fn for_employee(employee_id: RecordId) -> Predicate {
        Predicate::eq("employee_id", employee_id)
    }

    /// KPIs tracking `goal_id`.
    pub fn for_goal(goal_id: RecordId) -> Predicate {
        Predicate::eq("goal_id", goal_id)
    }
}

impl Entity for Kpi {
    type Tenancy = TenantOwned;

    const TABLE: &'static str = "kpis";

    const COLUMNS: &'static [Column] = &[
        Column::of::<Option<RecordId>>("employee_id"),
        Column::of::<Option<ForeignKey<Goal>>>("goal_id"),
        Column::of::<String>("name"),
        Column::of::<String>("unit"),
        Column::of::<Decimal2>("target_value"),
        Column::of::<KpiFrequency>("frequency"),
    ];

    fn encode(&self, row: &mut RowWriter) {
        row.set("employee_id", &self.employee_id)
            .set("goal_id", &self.goal_id)
            .set("name", &self.name)
            .set("unit", &self.unit)
            .set("target_value", &self.target_value)
            .set("frequency", &self.frequency);
    }

    fn decode(row: &StoredRow) -> Result<Self, DecodeError> {
        Ok(Self {
            employee_id: row.get("employee_id")?,
            goal_id: row.get("goal_id")?,
            name: row.get("name")?,
            unit: row.get("unit")?,
            target_value: row.get("target_value")?,
            frequency: row.get("frequency")?,
        })
    }
}

impl TenantScoped for Kpi {
    type Deletion = HardDelete;

    fn references(&self) -> Vec<Reference> {
        self.goal_id
            .iter()
            .map(|goal| goal.reference("goal_id"))
            .collect()
    }
}

/// One recorded measurement of a KPI.
#[derive(Debug, Clone, PartialEq)]
pub struct KpiProgressEntry {
    /// Measured KPI.
    pub kpi_id: ForeignKey<Kpi>,
    /// Recording user.
    pub recorded_by: RecordId,
    /// Measured value, in the KPI's unit.
    pub value: Decimal2,
    /// Day the value applies to.
    pub recorded_on: NaiveDate,
    /// Free-form note.
    pub note: Option<String>,
}

impl KpiProgressEntry {
    /// Entries of `kpi_id`.
    pub fn for_kpi(kpi_id: RecordId) -> Predicate {
        Predicate::eq("kpi_id", kpi_id)
    }

    /// Sum of every entry recorded for `kpi_id` in the current tenant.
    ///
    /// Values are added as fixed-point decimals, so ten entries of `0.10`
    /// total exactly `1.00`.
    pub async fn total_for(
        repository: &TenantRepository<KpiProgressEntry>,
        kpi_id: RecordId,
    ) -> StorageResult<Decimal2> {
        let query = repository.query()?.filter(Self::for_kpi(kpi_id));
        let entries = repository.list(query).await?;
        Ok(entries.into_iter().map(|entry| entry.data.value).sum())
    }
}

impl Entity for KpiProgressEntry {
    type Tenancy = TenantOwned;

    const TABLE: &'static str = "kpi_progress_entries";

    const COLUMNS: &'static [Column] = &[
        Column::of::<ForeignKey<Kpi>>("kpi_id"),
        Column::of::<RecordId>("recorded_by"),
        Column::of::<Decimal2>("value"),
        Column::of::<NaiveDate>("recorded_on"),
        Column::of::<Option<String>>("note"),
    ];

    fn encode(&self, row: &mut RowWriter) {
        row.set("kpi_id", &self.kpi_id)
            .set("recorded_by", &self.recorded_by)
            .set("value", &self.value)
            .set("recorded_on", &self.recorded_on)
            .set("note", &self.note);
    }

    fn decode(row: &StoredRow) -> Result<Self, DecodeError> {
        Ok(Self {
            kpi_id: row.get("kpi_id")?,
            recorded_by: row.get("recorded_by")?,
            value: row.get("value")?,
            recorded_on: row.get("recorded_on")?,
            note: row.get("note")?,
        })
    }
}

impl TenantScoped for KpiProgressEntry {
    type Deletion = HardDelete;

    fn references(&self) -> Vec<Reference> {
        vec![self.kpi_id.reference("kpi_id")]
    }
}
