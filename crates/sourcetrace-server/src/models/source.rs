//! Source model: a tracked document identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A tracked document. The canonical URL is unique per organization and
/// is the identity the capture chain is computed against.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Source {
    /// Unique identifier for this source.
    pub id: Uuid,
    /// Owning organization.
    pub org_id: Uuid,
    /// URL exactly as submitted.
    pub url: String,
    /// Canonicalized URL used for deduplication and chain input.
    pub canonical_url: String,
    /// Optional display title.
    pub title: Option<String>,
    /// Inactive sources reject new captures.
    pub is_active: bool,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
}
