// Proof pack build/verify integration tests
//
// These tests exercise the builder and verifier together over a
// realistic chained capture sequence, including the reproducibility
// guarantee: identical input data must yield byte-identical archives.

use std::io::Read;

use chrono::{TimeZone, Utc};
use sourcetrace_core::{
    build_proof_pack, chain_sha256, sha256_hex, verify_pack_archive, verify_pack_dir,
    ChainOutcome, PackRequest, TimelineItem, MANIFEST_PATH,
};

fn chained_items(count: usize) -> Vec<TimelineItem> {
    let url = "https://example.com/terms";
    let raw = sha256_hex(b"<html><body>terms v1</body></html>");
    let norm = sha256_hex(b"terms v1");
    let mut items: Vec<TimelineItem> = Vec::new();
    for n in 0..count {
        let prev = items.last();
        let captured_at = format!("2026-02-{:02}T09:15:00.000000Z", n + 1);
        let chain = chain_sha256(
            prev.map(|p| p.id.as_str()),
            prev.and_then(|p| p.chain_sha256.as_deref()),
            &raw,
            &norm,
            &captured_at,
            url,
        );
        items.push(TimelineItem {
            id: format!("00000000-0000-0000-0000-0000000000{n:02}"),
            prev_capture_id: prev.map(|p| p.id.clone()),
            captured_at,
            canonical_url: url.to_string(),
            raw_bytes_sha256: raw.clone(),
            normalized_text_sha256: norm.clone(),
            chain_sha256: Some(chain),
        });
    }
    items
}

fn request_at(generated_at: chrono::DateTime<Utc>, items: Vec<TimelineItem>) -> PackRequest {
    PackRequest {
        source_id: "9f0e7c54-0000-4000-8000-000000000001".to_string(),
        generated_at,
        items,
    }
}

#[test]
fn fresh_pack_verifies_clean() {
    let generated_at = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
    let pack = build_proof_pack(&request_at(generated_at, chained_items(5))).unwrap();

    let report = verify_pack_archive(&pack.bytes).unwrap();
    assert!(report.passed(), "report:\n{}", report.render());
    assert_eq!(report.chain, ChainOutcome::Verified { links: 5 });
}

#[test]
fn unpacked_directory_verifies_clean() {
    let generated_at = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
    let pack = build_proof_pack(&request_at(generated_at, chained_items(2))).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(pack.bytes)).unwrap();
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).unwrap();
        let mut contents = Vec::new();
        entry.read_to_end(&mut contents).unwrap();
        std::fs::write(dir.path().join(entry.name()), contents).unwrap();
    }

    let report = verify_pack_dir(dir.path()).unwrap();
    assert!(report.passed(), "report:\n{}", report.render());
}

#[test]
fn identical_inputs_yield_byte_identical_archives() {
    let generated_at = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
    let items = chained_items(4);

    let first = build_proof_pack(&request_at(generated_at, items.clone())).unwrap();
    let second = build_proof_pack(&request_at(generated_at, items)).unwrap();

    assert_eq!(first.bytes, second.bytes);
    assert_eq!(first.filename, second.filename);
}

#[test]
fn only_the_manifest_differs_across_build_times() {
    let items = chained_items(3);
    let first = build_proof_pack(&request_at(
        Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap(),
        items.clone(),
    ))
    .unwrap();
    let second = build_proof_pack(&request_at(
        Utc.with_ymd_and_hms(2026, 4, 2, 11, 30, 0).unwrap(),
        items,
    ))
    .unwrap();

    let entry_bytes = |pack_bytes: &[u8]| {
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(pack_bytes.to_vec())).unwrap();
        let mut entries = Vec::new();
        for index in 0..archive.len() {
            let mut entry = archive.by_index(index).unwrap();
            let mut contents = Vec::new();
            entry.read_to_end(&mut contents).unwrap();
            entries.push((entry.name().to_string(), contents));
        }
        entries
    };

    let first_entries = entry_bytes(&first.bytes);
    let second_entries = entry_bytes(&second.bytes);
    for ((name_a, bytes_a), (name_b, bytes_b)) in first_entries.iter().zip(second_entries.iter()) {
        assert_eq!(name_a, name_b);
        if name_a == MANIFEST_PATH {
            assert_ne!(bytes_a, bytes_b, "generated_at must differ");
        } else {
            assert_eq!(bytes_a, bytes_b, "{name_a} must be build-time independent");
        }
    }
}

#[test]
fn empty_capture_window_still_builds_and_verifies() {
    let generated_at = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
    let pack = build_proof_pack(&request_at(generated_at, vec![])).unwrap();

    let report = verify_pack_archive(&pack.bytes).unwrap();
    assert!(report.passed(), "report:\n{}", report.render());
    assert!(matches!(report.chain, ChainOutcome::Skipped { .. }));
}

#[test]
fn tampered_archive_entry_fails_verification() {
    let generated_at = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
    let pack = build_proof_pack(&request_at(generated_at, chained_items(2))).unwrap();

    // Re-pack with one flipped byte inside timeline.json, keeping the
    // stale manifest.
    let mut archive = zip::ZipArchive::new(std::io::Cursor::new(pack.bytes)).unwrap();
    let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated);
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).unwrap();
        let mut contents = Vec::new();
        entry.read_to_end(&mut contents).unwrap();
        if entry.name() == "timeline.json" {
            let position = contents.len() / 2;
            contents[position] ^= 0x01;
        }
        let name = entry.name().to_string();
        writer.start_file(name, options).unwrap();
        std::io::Write::write_all(&mut writer, &contents).unwrap();
    }
    let tampered = writer.finish().unwrap().into_inner();

    let report = verify_pack_archive(&tampered).unwrap();
    assert!(!report.passed());
}
