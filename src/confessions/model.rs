use std::fmt::{Display, Formatter};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::identity::SubjectId;

/// System-generated, immutable address of a single confession.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfessionId(Uuid);

impl ConfessionId {
    pub fn generate() -> Self { Self(Uuid::new_v4()) }

    /// Parse an id taken from a request path. Anything that is not a UUID
    /// cannot address a stored confession.
    pub fn parse(raw: &str) -> Option<Self> { Uuid::parse_str(raw.trim()).ok().map(Self) }
}

impl Display for ConfessionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result { write!(f, "{}", self.0) }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Confession {
    pub id: ConfessionId,
    pub text: String,
    pub owner_id: SubjectId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Confession {
    /// `updatedAt == createdAt` means the text was never changed.
    pub fn is_edited(&self) -> bool { self.updated_at != self.created_at }

    pub fn is_owned_by(&self, subject: &SubjectId) -> bool { &self.owner_id == subject }
}

/// Insert request handed to the store; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewConfession {
    pub text: String,
    pub owner_id: SubjectId,
    pub created_at: DateTime<Utc>,
}

/// One page of the public listing, serialized exactly as the API returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfessionPage {
    pub confessions: Vec<Confession>,
    pub page: u64,
    pub total_pages: u64,
    pub total_items: u64,
}
