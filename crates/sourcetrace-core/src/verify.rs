// Proof pack verification for sourcetrace
//
// The verifier is a standalone consumer of an unpacked (or in-memory)
// proof pack. It trusts only the manifest format and the chain formula:
// every listed file is re-hashed, then the capture chain is replayed
// from the timeline alone. Expected failure conditions never abort the
// run; every mismatch is accumulated into the report.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};

use crate::chain::chain_sha256;
use crate::hash::sha256_hex;
use crate::pack::{MANIFEST_PATH, TIMELINE_PATH};
use crate::types::{PackManifest, TimelineDocument};

/// Outcome of one per-file digest check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Recomputed digest matches the manifest.
    Verified,
    /// The file named by the manifest is absent.
    Missing,
    /// The file's bytes do not hash to the manifest digest.
    DigestMismatch { expected: String, computed: String },
    /// The file exists but could not be interpreted.
    Malformed(String),
}

/// One per-file check result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileCheck {
    pub path: String,
    pub outcome: FileOutcome,
}

/// A single chain replay failure, anchored to its timeline index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainFailure {
    pub index: usize,
    pub detail: String,
}

/// Outcome of the chain replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainOutcome {
    /// Every link verified.
    Verified { links: usize },
    /// Chain verification did not apply; the reason is reported, and a
    /// skip is not a failure.
    Skipped { reason: String },
    /// One or more links failed.
    Failed { failures: Vec<ChainFailure> },
}

/// Aggregated verification result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationReport {
    pub files: Vec<FileCheck>,
    pub chain: ChainOutcome,
}

impl VerificationReport {
    /// True when every file check passed and the chain replay did not fail.
    pub fn passed(&self) -> bool {
        self.files
            .iter()
            .all(|check| check.outcome == FileOutcome::Verified)
            && !matches!(self.chain, ChainOutcome::Failed { .. })
    }

    /// Renders the per-check report, one line per finding, ending with
    /// the overall PASS/FAIL verdict.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for check in &self.files {
            match &check.outcome {
                FileOutcome::Verified => {
                    let _ = writeln!(out, "OK: {}", check.path);
                }
                FileOutcome::Missing => {
                    let _ = writeln!(out, "FAIL: {} not found", check.path);
                }
                FileOutcome::DigestMismatch { expected, computed } => {
                    let _ = writeln!(
                        out,
                        "FAIL: {} sha256 mismatch (expected {expected}, computed {computed})",
                        check.path
                    );
                }
                FileOutcome::Malformed(detail) => {
                    let _ = writeln!(out, "FAIL: {}: {detail}", check.path);
                }
            }
        }
        match &self.chain {
            ChainOutcome::Verified { links } => {
                let _ = writeln!(out, "PASS: capture hash chain verified ({links} links)");
            }
            ChainOutcome::Skipped { reason } => {
                let _ = writeln!(out, "SKIP: {reason}");
            }
            ChainOutcome::Failed { failures } => {
                for failure in failures {
                    let _ = writeln!(out, "FAIL: item[{}] {}", failure.index, failure.detail);
                }
            }
        }
        let verdict = if self.passed() {
            "PASS: proof pack verified"
        } else {
            "FAIL: proof pack verification failed"
        };
        let _ = writeln!(out, "{verdict}");
        out
    }
}

/// Verifies an unpacked proof pack held in memory, keyed by archive path.
pub fn verify_pack_files(files: &BTreeMap<String, Vec<u8>>) -> VerificationReport {
    let manifest_bytes = match files.get(MANIFEST_PATH) {
        Some(bytes) => bytes,
        None => {
            return VerificationReport {
                files: vec![FileCheck {
                    path: MANIFEST_PATH.to_string(),
                    outcome: FileOutcome::Missing,
                }],
                chain: ChainOutcome::Skipped {
                    reason: "manifest missing; chain not replayed".to_string(),
                },
            };
        }
    };

    let manifest: PackManifest = match serde_json::from_slice(manifest_bytes) {
        Ok(manifest) => manifest,
        Err(err) => {
            return VerificationReport {
                files: vec![FileCheck {
                    path: MANIFEST_PATH.to_string(),
                    outcome: FileOutcome::Malformed(format!("unparseable manifest: {err}")),
                }],
                chain: ChainOutcome::Skipped {
                    reason: "manifest unparseable; chain not replayed".to_string(),
                },
            };
        }
    };

    let file_checks = manifest
        .files
        .iter()
        .map(|entry| {
            let outcome = match files.get(&entry.path) {
                None => FileOutcome::Missing,
                Some(bytes) => {
                    let computed = sha256_hex(bytes);
                    if computed == entry.sha256 {
                        FileOutcome::Verified
                    } else {
                        FileOutcome::DigestMismatch {
                            expected: entry.sha256.clone(),
                            computed,
                        }
                    }
                }
            };
            FileCheck {
                path: entry.path.clone(),
                outcome,
            }
        })
        .collect();

    VerificationReport {
        files: file_checks,
        chain: replay_chain(files.get(TIMELINE_PATH).map(Vec::as_slice)),
    }
}

/// Verifies an unpacked proof pack directory.
pub fn verify_pack_dir(dir: &Path) -> Result<VerificationReport> {
    let mut files = BTreeMap::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("cannot read pack directory {}", dir.display()))?
    {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        let bytes = std::fs::read(entry.path())
            .with_context(|| format!("cannot read pack file {}", entry.path().display()))?;
        files.insert(name, bytes);
    }
    Ok(verify_pack_files(&files))
}

/// Verifies a proof pack archive without unpacking it to disk.
pub fn verify_pack_archive(bytes: &[u8]) -> Result<VerificationReport> {
    let mut archive =
        zip::ZipArchive::new(std::io::Cursor::new(bytes)).context("not a ZIP archive")?;
    let mut files = BTreeMap::new();
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        if !entry.is_file() {
            continue;
        }
        let mut contents = Vec::new();
        entry.read_to_end(&mut contents)?;
        files.insert(entry.name().to_string(), contents);
    }
    Ok(verify_pack_files(&files))
}

/// Replays the capture chain from the timeline document.
///
/// For each item the chain digest is recomputed from the item's own
/// fields and the previous item's stored chain digest. A linkage or
/// digest failure is recorded with its index; replay continues so every
/// broken link is reported.
fn replay_chain(timeline_bytes: Option<&[u8]>) -> ChainOutcome {
    let bytes = match timeline_bytes {
        Some(bytes) => bytes,
        None => {
            return ChainOutcome::Skipped {
                reason: "no timeline.json present; chain not replayed".to_string(),
            };
        }
    };

    let timeline: TimelineDocument = match serde_json::from_slice(bytes) {
        Ok(timeline) => timeline,
        Err(err) => {
            return ChainOutcome::Failed {
                failures: vec![ChainFailure {
                    index: 0,
                    detail: format!("timeline.json could not be parsed: {err}"),
                }],
            };
        }
    };

    if timeline.items.is_empty() {
        return ChainOutcome::Skipped {
            reason: "timeline contains no items".to_string(),
        };
    }
    if timeline
        .items
        .iter()
        .all(|item| item.chain_sha256.is_none())
    {
        return ChainOutcome::Skipped {
            reason: "timeline items carry no chain digests; chain not verified".to_string(),
        };
    }

    let mut failures = Vec::new();
    let mut prev_chain: Option<String> = None;
    for (index, item) in timeline.items.iter().enumerate() {
        if index == 0 {
            if let Some(prev_id) = &item.prev_capture_id {
                failures.push(ChainFailure {
                    index,
                    detail: format!(
                        "first item must have no predecessor, found prev_capture_id {prev_id}"
                    ),
                });
            }
        } else {
            let expected_prev = &timeline.items[index - 1].id;
            match &item.prev_capture_id {
                Some(prev_id) if prev_id == expected_prev => {}
                Some(prev_id) => failures.push(ChainFailure {
                    index,
                    detail: format!(
                        "prev_capture_id {prev_id} does not match previous item id {expected_prev}"
                    ),
                }),
                None => failures.push(ChainFailure {
                    index,
                    detail: format!(
                        "prev_capture_id is null but previous item id is {expected_prev}"
                    ),
                }),
            }
        }

        match &item.chain_sha256 {
            None => failures.push(ChainFailure {
                index,
                detail: "chain_sha256 is missing".to_string(),
            }),
            Some(stored) => {
                let computed = chain_sha256(
                    item.prev_capture_id.as_deref(),
                    prev_chain.as_deref(),
                    &item.raw_bytes_sha256,
                    &item.normalized_text_sha256,
                    &item.captured_at,
                    &item.canonical_url,
                );
                if &computed != stored {
                    failures.push(ChainFailure {
                        index,
                        detail: format!(
                            "chain_sha256 mismatch (expected {stored}, computed {computed})"
                        ),
                    });
                }
            }
        }

        prev_chain = item.chain_sha256.clone();
    }

    if failures.is_empty() {
        ChainOutcome::Verified {
            links: timeline.items.len(),
        }
    } else {
        ChainOutcome::Failed { failures }
    }
}
