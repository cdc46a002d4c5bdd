// Proof pack builder for sourcetrace
//
// Produces a self-contained ZIP archive that lets any holder re-derive
// every digest and chain link without access to the original store. The
// archive is byte-for-byte reproducible for identical input data, subject
// only to the `generated_at` provenance field inside the manifest.

use std::io::{Cursor, Write};

use chrono::{DateTime, SecondsFormat, Utc};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::encode::to_canonical_json;
use crate::hash::sha256_hex;
use crate::types::{ManifestFileEntry, PackManifest, TimelineDocument, TimelineItem};

/// Default number of captures included in a pack timeline.
pub const DEFAULT_TIMELINE_LIMIT: i64 = 50;

/// Archive path of the integrity manifest.
pub const MANIFEST_PATH: &str = "manifest.json";

/// Archive path of the capture timeline.
pub const TIMELINE_PATH: &str = "timeline.json";

/// Archive path of the methodology description.
pub const METHODOLOGY_PATH: &str = "methodology.md";

/// Archive path of the embedded standalone verifier.
pub const VERIFY_SCRIPT_PATH: &str = "verify.py";

/// Size ceiling for the encoded manifest. The manifest is a metadata-only
/// digest index; anything near this limit indicates file contents leaked
/// into it.
const MANIFEST_MAX_BYTES: usize = 10_000;

/// Errors raised while building a proof pack.
#[derive(Debug, thiserror::Error)]
pub enum PackError {
    /// The manifest violated a structural invariant; the build is aborted.
    #[error("manifest integrity violation: {0}")]
    ManifestIntegrity(String),

    /// A pack document could not be serialized.
    #[error("failed to encode pack document: {0}")]
    Encode(#[source] anyhow::Error),

    /// The archive could not be written.
    #[error("failed to write archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("archive I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Input to a proof pack build: the capture window plus the one
/// intentionally non-deterministic field, the build timestamp.
#[derive(Debug, Clone)]
pub struct PackRequest {
    /// Source identifier the pack is built for.
    pub source_id: String,
    /// Build timestamp; embedded in the manifest for provenance only.
    pub generated_at: DateTime<Utc>,
    /// Captures ordered by capture timestamp ascending, canonical URL
    /// denormalized into every item.
    pub items: Vec<TimelineItem>,
}

/// A finished proof pack.
#[derive(Debug, Clone)]
pub struct ProofPack {
    /// The complete ZIP archive.
    pub bytes: Vec<u8>,
    /// Download filename, `proofpack_<source_id>_<YYYYMMDDTHHMMSSZ>.zip`.
    pub filename: String,
}

/// Builds a proof pack archive.
///
/// Entry order is lexicographic by path with the manifest last:
/// `methodology.md`, `timeline.json`, `verify.py`, `manifest.json`.
/// Every entry uses a fixed modification timestamp and Deflate
/// compression, so identical input data yields identical archive bytes.
pub fn build_proof_pack(request: &PackRequest) -> Result<ProofPack, PackError> {
    let timeline = TimelineDocument {
        source_id: request.source_id.clone(),
        items: request.items.clone(),
    };
    let timeline_bytes = to_canonical_json(&timeline).map_err(PackError::Encode)?;

    let entries: [(&str, Vec<u8>); 3] = [
        (METHODOLOGY_PATH, METHODOLOGY.as_bytes().to_vec()),
        (TIMELINE_PATH, timeline_bytes),
        (VERIFY_SCRIPT_PATH, VERIFY_SCRIPT.as_bytes().to_vec()),
    ];

    let files = entries
        .iter()
        .map(|(path, bytes)| ManifestFileEntry {
            path: path.to_string(),
            sha256: sha256_hex(bytes),
        })
        .collect();

    let manifest = PackManifest {
        source_id: request.source_id.clone(),
        generated_at: request
            .generated_at
            .to_rfc3339_opts(SecondsFormat::Micros, true),
        hash_algo: "sha256".to_string(),
        capture_count: request.items.len(),
        files,
    };
    let manifest_bytes = to_canonical_json(&manifest).map_err(PackError::Encode)?;
    guard_manifest(&manifest, &manifest_bytes)?;

    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(zip::DateTime::default());
    for (path, bytes) in &entries {
        writer.start_file(*path, options)?;
        writer.write_all(bytes)?;
    }
    writer.start_file(MANIFEST_PATH, options)?;
    writer.write_all(&manifest_bytes)?;
    let bytes = writer.finish()?.into_inner();

    let filename = format!(
        "proofpack_{}_{}.zip",
        request.source_id,
        request.generated_at.format("%Y%m%dT%H%M%SZ")
    );

    Ok(ProofPack { bytes, filename })
}

/// Structural invariant check run before the manifest is written: the
/// manifest must stay small and must hold digests only, never payloads.
fn guard_manifest(manifest: &PackManifest, encoded: &[u8]) -> Result<(), PackError> {
    if encoded.len() >= MANIFEST_MAX_BYTES {
        return Err(PackError::ManifestIntegrity(format!(
            "encoded manifest is {} bytes (limit {}); it may contain file contents",
            encoded.len(),
            MANIFEST_MAX_BYTES
        )));
    }
    for entry in &manifest.files {
        let is_digest = entry.sha256.len() == 64
            && entry
                .sha256
                .chars()
                .all(|c| c.is_ascii_hexdigit() && !c.is_uppercase());
        if !is_digest {
            return Err(PackError::ManifestIntegrity(format!(
                "file entry '{}' carries a non-digest value",
                entry.path
            )));
        }
    }
    Ok(())
}

/// Fixed methodology description shipped in every pack.
const METHODOLOGY: &str = "\
# Methodology

This proof pack documents a sequence of captures of one tracked source.

For every capture, the raw response payload and a normalized text
rendition were hashed with SHA-256. A chain digest binds each capture to
its predecessor: the SHA-256 of the previous capture id, the previous
chain digest, both content digests, the capture timestamp, and the
canonical URL, joined in that order with `|` (empty string for absent
values). Altering any capture therefore invalidates every later chain
digest.

`manifest.json` lists the SHA-256 of every other file in this pack.
Run `python3 verify.py` inside the unpacked directory to recompute all
digests and replay the chain.
";

/// Standalone verifier source shipped in every pack. Self-contained:
/// Python standard library only, exit code 0 on PASS and 1 on FAIL.
const VERIFY_SCRIPT: &str = r##"#!/usr/bin/env python3
"""Standalone proof pack verifier.

Recomputes every file digest listed in manifest.json, then replays the
capture hash chain in timeline.json. Uses only the Python standard
library. Exit code 0 means every check passed.
"""
import hashlib
import json
import sys
from pathlib import Path


def sha256_hex(data):
    return hashlib.sha256(data).hexdigest()


def main():
    failures = 0

    manifest_path = Path("manifest.json")
    if not manifest_path.exists():
        print("FAIL: manifest.json not found")
        sys.exit(1)
    manifest = json.loads(manifest_path.read_bytes().decode("utf-8"))

    for entry in manifest.get("files", []):
        path = Path(entry["path"])
        expected = entry["sha256"]
        if not path.exists():
            print(f"FAIL: {path} not found")
            failures += 1
            continue
        computed = sha256_hex(path.read_bytes())
        if computed != expected:
            print(f"FAIL: {path} sha256 mismatch (expected {expected}, computed {computed})")
            failures += 1
        else:
            print(f"OK: {path}")

    timeline_path = Path("timeline.json")
    if timeline_path.exists():
        timeline = json.loads(timeline_path.read_bytes().decode("utf-8"))
        items = timeline.get("items", [])
        if not any(item.get("chain_sha256") for item in items):
            print("SKIP: timeline items carry no chain_sha256; chain not verified")
        else:
            chain_failures = 0
            prev_chain = None
            for idx, item in enumerate(items):
                prev_capture_id = item.get("prev_capture_id")
                if idx == 0:
                    if prev_capture_id is not None:
                        print(f"FAIL: item[{idx}] prev_capture_id must be null for the first item")
                        chain_failures += 1
                else:
                    prev_id = items[idx - 1].get("id")
                    if prev_capture_id != prev_id:
                        print(f"FAIL: item[{idx}] prev_capture_id {prev_capture_id} does not match previous item id {prev_id}")
                        chain_failures += 1
                chain_input = "|".join([
                    prev_capture_id or "",
                    prev_chain or "",
                    item.get("raw_bytes_sha256") or "",
                    item.get("normalized_text_sha256") or "",
                    item.get("captured_at") or "",
                    item.get("canonical_url") or "",
                ])
                computed = sha256_hex(chain_input.encode("utf-8"))
                stored = item.get("chain_sha256")
                if computed != stored:
                    print(f"FAIL: item[{idx}] chain_sha256 mismatch (expected {stored}, computed {computed})")
                    chain_failures += 1
                prev_chain = stored
            if chain_failures == 0:
                print("PASS: capture hash chain verified")
            failures += chain_failures

    if failures:
        print(f"FAIL: {failures} check(s) failed")
        sys.exit(1)
    print("PASS: proof pack verified")
    sys.exit(0)


if __name__ == "__main__":
    main()
"##;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn build_request(items: Vec<TimelineItem>) -> PackRequest {
        PackRequest {
            source_id: "11111111-1111-1111-1111-111111111111".to_string(),
            generated_at: Utc.with_ymd_and_hms(2026, 2, 1, 12, 0, 0).unwrap(),
            items,
        }
    }

    #[test]
    fn test_filename_encodes_source_and_timestamp() {
        let pack = build_proof_pack(&build_request(vec![])).unwrap();
        assert_eq!(
            pack.filename,
            "proofpack_11111111-1111-1111-1111-111111111111_20260201T120000Z.zip"
        );
    }

    #[test]
    fn test_archive_entry_order_is_fixed() {
        let pack = build_proof_pack(&build_request(vec![])).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(pack.bytes)).unwrap();
        let names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        assert_eq!(
            names,
            vec!["methodology.md", "timeline.json", "verify.py", "manifest.json"]
        );
    }

    #[test]
    fn test_manifest_excludes_itself() {
        let pack = build_proof_pack(&build_request(vec![])).unwrap();
        let mut archive = zip::ZipArchive::new(Cursor::new(pack.bytes)).unwrap();
        let mut manifest_bytes = Vec::new();
        std::io::Read::read_to_end(
            &mut archive.by_name(MANIFEST_PATH).unwrap(),
            &mut manifest_bytes,
        )
        .unwrap();
        let manifest: PackManifest = serde_json::from_slice(&manifest_bytes).unwrap();
        assert_eq!(manifest.files.len(), 3);
        assert!(manifest.files.iter().all(|f| f.path != MANIFEST_PATH));
        assert_eq!(manifest.hash_algo, "sha256");
    }

    #[test]
    fn test_guard_rejects_oversized_manifest() {
        let manifest = PackManifest {
            source_id: "s".to_string(),
            generated_at: "2026-02-01T12:00:00Z".to_string(),
            hash_algo: "sha256".to_string(),
            capture_count: 0,
            files: vec![],
        };
        let oversized = vec![b'x'; MANIFEST_MAX_BYTES];
        let err = guard_manifest(&manifest, &oversized).unwrap_err();
        assert!(matches!(err, PackError::ManifestIntegrity(_)));
    }

    #[test]
    fn test_guard_rejects_non_digest_file_entry() {
        let manifest = PackManifest {
            source_id: "s".to_string(),
            generated_at: "2026-02-01T12:00:00Z".to_string(),
            hash_algo: "sha256".to_string(),
            capture_count: 0,
            files: vec![ManifestFileEntry {
                path: "timeline.json".to_string(),
                sha256: "<html>payload</html>".to_string(),
            }],
        };
        let err = guard_manifest(&manifest, b"{}").unwrap_err();
        assert!(matches!(err, PackError::ManifestIntegrity(_)));
    }
}
