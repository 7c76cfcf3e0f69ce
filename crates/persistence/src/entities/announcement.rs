//! Company announcements.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::codec::{Json, RecordId, RowWriter, StoredRow};
use crate::core::{Column, Entity, HardDelete, TenantOwned, TenantScoped, TimeWindowed};
use crate::error::DecodeError;
use crate::query::{Predicate, Published};

/// Who an announcement targets. Empty lists mean everyone.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Audience {
    /// Department names.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub departments: Vec<String>,
    /// Office locations.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub locations: Vec<String>,
}

impl Audience {
    /// Every employee of the tenant.
    pub fn everyone() -> Self {
        Self::default()
    }

    /// Returns `true` when no restriction applies.
    pub fn is_everyone(&self) -> bool {
        self.departments.is_empty() && self.locations.is_empty()
    }
}

/// A message shown to employees between `published_at` and `expires_at`.
///
/// A NULL `published_at` is a draft. A NULL `expires_at` never expires.
#[derive(Debug, Clone, PartialEq)]
pub struct Announcement {
    /// Writing user.
    pub author_id: RecordId,
    /// Headline.
    pub title: String,
    /// Message body.
    pub body: String,
    /// Targeting.
    pub audience: Json<Audience>,
    /// Pinned to the top of listings.
    pub is_pinned: bool,
    /// Start of visibility.
    pub published_at: Option<DateTime<Utc>>,
    /// End of visibility.
    pub expires_at: Option<DateTime<Utc>>,
}

impl Announcement {
    /// Announcements visible right now.
    pub fn published() -> Published {
        Published::now()
    }

    /// Pinned announcements.
    pub fn pinned() -> Predicate {
        Predicate::eq("is_pinned", true)
    }

    /// Whether this announcement is visible at `now`, by the same rule as the
    /// [`Published`] scope.
    pub fn is_visible_at(&self, now: DateTime<Utc>) -> bool {
        match self.published_at {
            Some(published_at) if published_at <= now => {
                self.expires_at.is_none_or(|expires_at| expires_at >= now)
            }
            _ => false,
        }
    }
}

impl Entity for Announcement {
    type Tenancy = TenantOwned;

    const TABLE: &'static str = "announcements";

    const COLUMNS: &'static [Column] = &[
        Column::of::<RecordId>("author_id"),
        Column::of::<String>("title"),
        Column::of::<String>("body"),
        Column::of::<Json<Audience>>("audience"),
        Column::of::<bool>("is_pinned"),
        Column::of::<Option<DateTime<Utc>>>("published_at"),
        Column::of::<Option<DateTime<Utc>>>("expires_at"),
    ];

    fn encode(&self, row: &mut RowWriter) {
        row.set("author_id", &self.author_id)
            .set("title", &self.title)
            .set("body", &self.body)
            .set("audience", &self.audience)
            .set("is_pinned", &self.is_pinned)
            .set("published_at", &self.published_at)
            .set("expires_at", &self.expires_at);
    }

    fn decode(row: &StoredRow) -> Result<Self, DecodeError> {
        Ok(Self {
            author_id: row.get("author_id")?,
            title: row.get("title")?,
            body: row.get("body")?,
            audience: row.get("audience")?,
            is_pinned: row.get("is_pinned")?,
            published_at: row.get("published_at")?,
            expires_at: row.get("expires_at")?,
        })
    }
}

impl TenantScoped for Announcement {
    type Deletion = HardDelete;
}

impl TimeWindowed for Announcement {}
