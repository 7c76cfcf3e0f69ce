//! Candidates and their history.

use chrono::NaiveDate;

use crate::codec::{Decimal2, ForeignKey, RecordId, RowWriter, StoredRow};
use crate::core::{Column, Entity, HardDelete, Reference, TenantOwned, TenantScoped};
use crate::error::DecodeError;
use crate::query::Predicate;
use crate::stored_enum;

/// A person applying for jobs.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact email.
    pub email: String,
    /// Contact phone.
    pub phone: Option<String>,
    /// Where the candidate came from (referral, job board).
    pub source: Option<String>,
    /// Profile link.
    pub linkedin_url: Option<String>,
}

impl Candidate {
    /// Full display name.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Candidates with `email`.
    pub fn with_email(email: impl Into<String>) -> Predicate {
        Predicate::eq("email", email.into())
    }
}

impl Entity for Candidate {
    type Tenancy = TenantOwned;

    const TABLE: &'static str = "candidates";

    const COLUMNS: &'static [Column] = &[
        Column::of::<String>("first_name"),
        Column::of::<String>("last_name"),
        Column::of::<String>("email"),
        Column::of::<Option<String>>("phone"),
        Column::of::<Option<String>>("source"),
        Column::of::<Option<String>>("linkedin_url"),
    ];

    fn encode(&self, row: &mut RowWriter) {
        row.set("first_name", &self.first_name)
            .set("last_name", &self.last_name)
            .set("email", &self.email)
            .set("phone", &self.phone)
            .set("source", &self.source)
            .set("linkedin_url", &self.linkedin_url);
    }

    fn decode(row: &StoredRow) -> Result<Self, DecodeError> {
        Ok(Self {
            first_name: row.get("first_name")?,
            last_name: row.get("last_name")?,
            email: row.get("email")?,
            phone: row.get("phone")?,
            source: row.get("source")?,
            linkedin_url: row.get("linkedin_url")?,
        })
    }
}

impl TenantScoped for Candidate {
    type Deletion = HardDelete;
}

stored_enum! {
    /// Highest level reached in one education entry.
    pub enum EducationLevel {
        /// Secondary school diploma.
        HighSchool => "high_school",
        /// Two-year degree.
        Associate => "associate",
        /// Bachelor's degree.
        Bachelor => "bachelor",
        /// Master's degree.
        Master => "master",
        /// Doctorate.
        Doctorate => "doctorate",
        /// Certificates and anything else.
        Other => "other",
    }
}

/// One education entry of a candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateEducation {
    /// Owning candidate.
    pub candidate_id: ForeignKey<Candidate>,
    /// School or university.
    pub institution: String,
    /// Degree level.
    pub education_level: EducationLevel,
    /// Major or subject.
    pub field_of_study: Option<String>,
    /// First day.
    pub start_date: Option<NaiveDate>,
    /// Graduation or last day.
    pub end_date: Option<NaiveDate>,
    /// Grade point average.
    pub gpa: Option<Decimal2>,
}

impl CandidateEducation {
    /// Education entries of `candidate_id`.
    pub fn for_candidate(candidate_id: RecordId) -> Predicate {
        Predicate::eq("candidate_id", candidate_id)
    }
}

impl Entity for CandidateEducation {
    type Tenancy = TenantOwned;

    const TABLE: &'static str = "candidate_educations";

    const COLUMNS: &'static [Column] = &[
        Column::of::<ForeignKey<Candidate>>("candidate_id"),
        Column::of::<String>("institution"),
        Column::of::<EducationLevel>("education_level"),
        Column::of::<Option<String>>("field_of_study"),
        Column::of::<Option<NaiveDate>>("start_date"),
        Column::of::<Option<NaiveDate>>("end_date"),
        Column::of::<Option<Decimal2>>("gpa"),
    ];

    fn encode(&self, row: &mut RowWriter) {
        row.set("candidate_id", &self.candidate_id)
            .set("institution", &self.institution)
            .set("education_level", &self.education_level)
            .set("field_of_study", &self.field_of_study)
            .set("start_date", &self.start_date)
            .set("end_date", &self.end_date)
            .set("gpa", &self.gpa);
    }

    fn decode(row: &StoredRow) -> Result<Self, DecodeError> {
        Ok(Self {
            candidate_id: row.get("candidate_id")?,
            institution: row.get("institution")?,
            education_level: row.get("education_level")?,
            field_of_study: row.get("field_of_study")?,
            start_date: row.get("start_date")?,
            end_date: row.get("end_date")?,
            gpa: row.get("gpa")?,
        })
    }
}

impl TenantScoped for CandidateEducation {
    type Deletion = HardDelete;

    fn references(&self) -> Vec<Reference> {
        vec![self.candidate_id.reference("candidate_id")]
    }
}

/// One past or current job of a candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateWorkExperience {
    /// Owning candidate.
    pub candidate_id: ForeignKey<Candidate>,
    /// Employer.
    pub company: String,
    /// Job title.
    pub title: String,
    /// First day.
    pub start_date: NaiveDate,
    /// Last day. NULL while current.
    pub end_date: Option<NaiveDate>,
    /// Still employed there.
    pub is_current: bool,
    /// Responsibilities.
    pub description: Option<String>,
}

impl CandidateWorkExperience {
    /// Work history of `candidate_id`.
    pub fn for_candidate(candidate_id: RecordId) -> Predicate {
        Predicate::eq("candidate_id", candidate_id)
    }

    /// Current positions.
    pub fn current() -> Predicate {
        Predicate::eq("is_current", true)
    }
}

impl Entity for CandidateWorkExperience {
    type Tenancy = TenantOwned;

    const TABLE: &'static str = "candidate_work_experiences";

    const COLUMNS: &'static [Column] = &[
        Column::of::<ForeignKey<Candidate>>("candidate_id"),
        Column::of::<String>("company"),
        Column::of::<String>("title"),
        Column::of::<NaiveDate>("start_date"),
        Column::of::<Option<NaiveDate>>("end_date"),
        Column::of::<bool>("is_current"),
        Column::of::<Option<String>>("description"),
    ];

    fn encode(&self, row: &mut RowWriter) {
        row.set("candidate_id", &self.candidate_id)
            .set("company", &self.company)
            .set("title", &self.title)
            .set("start_date", &self.start_date)
            .set("end_date", &self.end_date)
            .set("is_current", &self.is_current)
            .set("description", &self.description);
    }

    fn decode(row: &StoredRow) -> Result<Self, DecodeError> {
        Ok(Self {
            candidate_id: row.get("candidate_id")?,
            company: row.get("company")?,
            title: row.get("title")?,
            start_date: row.get("start_date")?,
            end_date: row.get("end_date")?,
            is_current: row.get("is_current")?,
            description: row.get("description")?,
        })
    }
}

impl TenantScoped for CandidateWorkExperience {
    type Deletion = HardDelete;

    fn references(&self) -> Vec<Reference> {
        vec![self.candidate_id.reference("candidate_id")]
    }
}
