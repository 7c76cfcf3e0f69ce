//! Job offers and signatures.

use chrono::{DateTime, NaiveDate, Utc};

use super::job_application::JobApplication;
use crate::codec::{Decimal2, ForeignKey, RecordId, RowWriter, StoredRow};
use crate::core::{Column, Entity, HardDelete, Reference, TenantOwned, TenantScoped};
use crate::error::DecodeError;
use crate::query::Predicate;
use crate::stored_enum;

stored_enum! {
    /// Lifecycle of an offer.
    pub enum OfferStatus {
        /// Being prepared.
        Draft => "draft",
        /// Sent to the candidate.
        Sent => "sent",
        /// Signed by the candidate.
        Accepted => "accepted",
        /// Turned down by the candidate.
        Declined => "declined",
        /// Not answered in time.
        Expired => "expired",
        /// Pulled by the company.
        Withdrawn => "withdrawn",
    }
}

/// An employment offer made on a job application.
#[derive(Debug, Clone, PartialEq)]
pub struct Offer {
    /// Application the offer answers.
    pub job_application_id: ForeignKey<JobApplication>,
    /// Offered position.
    pub position_title: String,
    /// Yearly base salary.
    pub base_salary: Decimal2,
    /// ISO 4217 code.
    pub currency: String,
    /// Proposed first day.
    pub start_date: Option<NaiveDate>,
    /// Deadline to sign.
    pub expires_at: Option<DateTime<Utc>>,
    /// Lifecycle state.
    pub status: OfferStatus,
}

impl Offer {
    /// Offers made on `job_application_id`.
    pub fn for_application(job_application_id: RecordId) -> Predicate {
        Predicate::eq("job_application_id", job_application_id)
    }
}

impl Entity for Offer {
    type Tenancy = TenantOwned;

    const TABLE: &'static str = "offers";

    const COLUMNS: &'static [Column] = &[
        Column::of::<ForeignKey<JobApplication>>("job_application_id"),
        Column::of::<String>("position_title"),
        Column::of::<Decimal2>("base_salary"),
        Column::of::<String>("currency"),
        Column::of::<Option<NaiveDate>>("start_date"),
        Column::of::<Option<DateTime<Utc>>>("expires_at"),
        Column::of::<OfferStatus>("status"),
    ];

    fn encode(&self, row: &mut RowWriter) {
        row.set("job_application_id", &self.job_application_id)
            .set("position_title", &self.position_title)
            .set("base_salary", &self.base_salary)
            .set("currency", &self.currency)
            .set("start_date", &self.start_date)
            .set("expires_at", &self.expires_at)
            .set("status", &self.status);
    }

    fn decode(row: &StoredRow) -> Result<Self, DecodeError> {
        Ok(Self {
            job_application_id: row.get("job_application_id")?,
            position_title: row.get("position_title")?,
            base_salary: row.get("base_salary")?,
            currency: row.get("currency")?,
            start_date: row.get("start_date")?,
            expires_at: row.get("expires_at")?,
            status: row.get("status")?,
        })
    }
}

impl TenantScoped for Offer {
    type Deletion = HardDelete;

    fn references(&self) -> Vec<Reference> {
        vec![self.job_application_id.reference("job_application_id")]
    }
}

stored_enum! {
    /// Role of a party signing an offer.
    pub enum SignerType {
        /// The hired person.
        Candidate => "candidate",
        /// The future manager.
        HiringManager => "hiring_manager",
        /// People operations.
        HumanResources => "hr",
        /// Executive approval.
        Executive => "executive",
    }
}

/// A required or collected signature on an offer.
#[derive(Debug, Clone, PartialEq)]
pub struct OfferSignature {
    /// Signed offer.
    pub offer_id: ForeignKey<Offer>,
    /// Signing role.
    pub signer_type: SignerType,
    /// Signer name.
    pub signer_name: String,
    /// Signer email.
    pub signer_email: String,
    /// When the signature was given. NULL while pending.
    pub signed_at: Option<DateTime<Utc>>,
    /// Address the signature came from.
    pub ip_address: Option<String>,
}

impl OfferSignature {
    /// Signatures of `offer_id`.
    pub fn for_offer(offer_id: RecordId) -> Predicate {
        Predicate::eq("offer_id", offer_id)
    }

    /// Signatures not yet given.
    pub fn pending() -> Predicate {
        Predicate::is_null("signed_at")
    }

    /// Returns `true` once signed.
    pub fn is_signed(&self) -> bool {
        self.signed_at.is_some()
    }
}

impl Entity for OfferSignature {
    type Tenancy = TenantOwned;

    const TABLE: &'static str = "offer_signatures";

    const COLUMNS: &'static [Column] = &[
        Column::of::<ForeignKey<Offer>>("offer_id"),
        Column::of::<SignerType>("signer_type"),
        Column::of::<String>("signer_name"),
        Column::of::<String>("signer_email"),
        Column::of::<Option<DateTime<Utc>>>("signed_at"),
        Column::of::<Option<String>>("ip_address"),
    ];

    fn encode(&self, row: &mut RowWriter) {
        row.set("offer_id", &self.offer_id)
            .set("signer_type", &self.signer_type)
            .set("signer_name", &self.signer_name)
            .set("signer_email", &self.signer_email)
            .set("signed_at", &self.signed_at)
            .set("ip_address", &self.ip_address);
    }

    fn decode(row: &StoredRow) -> Result<Self, DecodeError> {
        Ok(Self {
            offer_id: row.get("offer_id")?,
            signer_type: row.get("signer_type")?,
            signer_name: row.get("signer_name")?,
            signer_email: row.get("signer_email")?,
            signed_at: row.get("signed_at")?,
            ip_address: row.get("ip_address")?,
        })
    }
}

impl TenantScoped for OfferSignature {
    type Deletion = HardDelete;

    fn references(&self) -> Vec<Reference> {
        vec![self.offer_id.reference("offer_id")]
    }
}
