//! Capture artifact model: a stored derived payload.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Bucket used until artifact payloads move to object storage.
pub const LOCAL_BUCKET: &str = "local";

/// The derived payloads stored per capture, one artifact per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Raw response bytes.
    Raw,
    /// Normalized text rendition.
    Text,
}

impl ArtifactKind {
    /// Kind discriminator as persisted.
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Raw => "raw",
            ArtifactKind::Text => "text",
        }
    }

    /// Storage locator for this kind under a capture.
    pub fn object_key(&self, capture_id: Uuid) -> String {
        match self {
            ArtifactKind::Raw => format!("data/artifacts/{capture_id}/raw.bin"),
            ArtifactKind::Text => format!("data/artifacts/{capture_id}/text.txt"),
        }
    }
}

/// A named byte payload derived from a capture. The locator is opaque;
/// payload storage itself is outside this service.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CaptureArtifact {
    /// Unique identifier for this artifact record.
    pub id: Uuid,
    /// Capture this artifact was derived from.
    pub capture_id: Uuid,
    /// Artifact kind discriminator (`raw`, `text`).
    pub kind: String,
    /// Storage bucket.
    pub bucket: String,
    /// Storage key within the bucket.
    pub object_key: String,
    /// Payload size in bytes.
    pub bytes: i64,
    /// SHA-256 of the payload.
    pub sha256: String,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
}
