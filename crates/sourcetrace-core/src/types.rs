//! Type definitions for sourcetrace proof packs.
//!
//! These types describe the two JSON documents inside a proof pack:
//! the capture timeline and the integrity manifest. Both are written
//! through the canonical encoder, so serialized key order is always
//! lexicographic regardless of field declaration order.

use serde::{Deserialize, Serialize};

/// One capture in a proof-pack timeline.
///
/// The canonical URL is denormalized into every item so a verifier can
/// replay the chain with no input other than the timeline itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimelineItem {
    /// Capture identifier.
    pub id: String,
    /// Identifier of the predecessor capture; `None` only for the first
    /// capture of a source.
    pub prev_capture_id: Option<String>,
    /// Capture timestamp, ISO 8601 with microsecond precision.
    pub captured_at: String,
    /// Canonical URL of the source at capture time.
    pub canonical_url: String,
    /// SHA-256 of the raw response payload (lowercase hex).
    pub raw_bytes_sha256: String,
    /// SHA-256 of the normalized text payload (lowercase hex).
    pub normalized_text_sha256: String,
    /// Chain digest binding this capture to its predecessor. Absent in
    /// timelines exported before chain support; the verifier then skips
    /// chain replay.
    pub chain_sha256: Option<String>,
}

/// The `timeline.json` document: an ordered capture sequence for one source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimelineDocument {
    /// Source identifier the timeline belongs to.
    pub source_id: String,
    /// Captures ordered by capture timestamp ascending.
    pub items: Vec<TimelineItem>,
}

/// Digest entry for one file covered by the manifest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManifestFileEntry {
    /// Archive-relative path.
    pub path: String,
    /// SHA-256 of the file's serialized bytes (lowercase hex).
    pub sha256: String,
}

/// The `manifest.json` document: a metadata-only digest index covering
/// every file in the pack except the manifest itself.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PackManifest {
    /// Source identifier the pack was built for.
    pub source_id: String,
    /// Build timestamp (ISO 8601). Provenance only; never verified.
    pub generated_at: String,
    /// Hash algorithm for every digest in the pack, always `"sha256"`.
    pub hash_algo: String,
    /// Number of timeline items in the pack.
    pub capture_count: usize,
    /// Digest entries for every packed file except this manifest.
    pub files: Vec<ManifestFileEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::to_canonical_json;

    fn sample_item() -> TimelineItem {
        TimelineItem {
            id: "11111111-1111-1111-1111-111111111111".to_string(),
            prev_capture_id: None,
            captured_at: "2026-01-10T08:00:00.000000Z".to_string(),
            canonical_url: "https://example.com/doc".to_string(),
            raw_bytes_sha256: "a".repeat(64),
            normalized_text_sha256: "b".repeat(64),
            chain_sha256: Some("c".repeat(64)),
        }
    }

    #[test]
    fn test_timeline_item_roundtrip() {
        let item = sample_item();
        let json = serde_json::to_string(&item).unwrap();
        let back: TimelineItem = serde_json::from_str(&json).unwrap();
        assert_eq!(item, back);
    }

    #[test]
    fn test_absent_predecessor_serializes_as_null() {
        let item = sample_item();
        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("\"prev_capture_id\":null"));
    }

    #[test]
    fn test_timeline_document_keys_sorted_in_canonical_form() {
        let doc = TimelineDocument {
            source_id: "s-1".to_string(),
            items: vec![sample_item()],
        };
        let text = String::from_utf8(to_canonical_json(&doc).unwrap()).unwrap();
        // "items" sorts before "source_id" at the top level.
        let items_pos = text.find("\"items\"").unwrap();
        let source_pos = text.find("\"source_id\"").unwrap();
        assert!(items_pos < source_pos);
    }

    #[test]
    fn test_manifest_deserializes_from_wire_form() {
        let json = r#"{
            "capture_count": 2,
            "files": [
                {"path": "timeline.json", "sha256": "abc"}
            ],
            "generated_at": "2026-01-10T08:00:00Z",
            "hash_algo": "sha256",
            "source_id": "s-1"
        }"#;
        let manifest: PackManifest = serde_json::from_str(json).unwrap();
        assert_eq!(manifest.capture_count, 2);
        assert_eq!(manifest.files.len(), 1);
        assert_eq!(manifest.hash_algo, "sha256");
    }
}
