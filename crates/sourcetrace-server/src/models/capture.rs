//! Capture model: one fetch-and-hash event for a source.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use sourcetrace_core::capture_timestamp_iso;

/// One capture of a source. Rows are append-only: created exactly once
/// per fetch attempt (failed fetches included) and never mutated, so the
/// chain of `prev_capture_id` references stays verifiable forever.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Capture {
    /// Unique identifier for this capture.
    pub id: Uuid,
    /// Owning organization.
    pub org_id: Uuid,
    /// Source this capture belongs to.
    pub source_id: Uuid,
    /// Instant of the fetch attempt; also the chain timestamp.
    pub captured_at: DateTime<Utc>,
    /// HTTP status of the fetch; 0 signals a fetch failure.
    pub fetch_status: i32,
    /// Error description when the fetch failed.
    pub fetch_error: Option<String>,
    pub content_type: Option<String>,
    pub etag: Option<String>,
    pub last_modified: Option<String>,
    /// Response headers as captured.
    pub response_headers: Option<serde_json::Value>,
    /// SHA-256 of the raw response payload.
    pub raw_bytes_sha256: String,
    /// SHA-256 of the normalized text payload.
    pub normalized_text_sha256: String,
    /// Byte length of the normalized text.
    pub normalized_text_len: i32,
    /// Predecessor capture; `None` only for the first capture of a source.
    pub prev_capture_id: Option<Uuid>,
    /// Chain digest binding this capture to its predecessor.
    pub chain_sha256: String,
    /// When this record was created.
    pub created_at: DateTime<Utc>,
}

impl Capture {
    /// True when the underlying fetch failed and the empty-payload
    /// substitution was recorded.
    pub fn is_fetch_failure(&self) -> bool {
        self.fetch_status == 0
    }

    /// The canonical ISO-8601 rendering of `captured_at`, identical to
    /// the string that was fed to the chain digest at capture time.
    pub fn captured_at_iso(&self) -> String {
        capture_timestamp_iso(&self.captured_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_capture() -> Capture {
        Capture {
            id: Uuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap(),
            org_id: Uuid::from_u128(1),
            source_id: Uuid::from_u128(2),
            captured_at: Utc.with_ymd_and_hms(2026, 3, 5, 14, 30, 15).unwrap(),
            fetch_status: 200,
            fetch_error: None,
            content_type: Some("text/html".to_string()),
            etag: None,
            last_modified: None,
            response_headers: None,
            raw_bytes_sha256: "a".repeat(64),
            normalized_text_sha256: "b".repeat(64),
            normalized_text_len: 42,
            prev_capture_id: None,
            chain_sha256: "c".repeat(64),
            created_at: Utc.with_ymd_and_hms(2026, 3, 5, 14, 30, 16).unwrap(),
        }
    }

    #[test]
    fn test_fetch_failure_flag() {
        let mut capture = sample_capture();
        assert!(!capture.is_fetch_failure());
        capture.fetch_status = 0;
        assert!(capture.is_fetch_failure());
    }

    #[test]
    fn test_captured_at_iso_has_fixed_precision() {
        let capture = sample_capture();
        assert_eq!(capture.captured_at_iso(), "2026-03-05T14:30:15.000000Z");
    }
}
