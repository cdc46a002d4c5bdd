// Capture chain digest for sourcetrace
//
// The chain digest binds each capture to its predecessor: the digest of
// capture n is a pure function of capture n's own fields and capture n-1's
// chain digest. This is a singly linked hash chain, not a Merkle tree, so
// altering one capture invalidates every later digest for that source.

use chrono::{DateTime, SecondsFormat, Timelike, Utc};

use crate::hash::sha256_hex;

/// Computes the chain digest for one capture.
///
/// The six fields are joined in this exact order with a single `|`
/// separator, substituting the empty string for absent values, then
/// UTF-8 encoded and hashed with SHA-256. The field order and separator
/// are a wire-level contract shared with every pack verifier; changing
/// either breaks cross-system verification.
pub fn chain_sha256(
    prev_capture_id: Option<&str>,
    prev_chain_sha256: Option<&str>,
    raw_bytes_sha256: &str,
    normalized_text_sha256: &str,
    captured_at_iso: &str,
    canonical_url: &str,
) -> String {
    let input = [
        prev_capture_id.unwrap_or(""),
        prev_chain_sha256.unwrap_or(""),
        raw_bytes_sha256,
        normalized_text_sha256,
        captured_at_iso,
        canonical_url,
    ]
    .join("|");
    sha256_hex(input.as_bytes())
}

/// Truncates a timestamp to whole microseconds.
///
/// Capture timestamps are persisted with microsecond precision. The
/// sequencer must truncate before hashing so the ISO string fed to the
/// chain matches what any later reader derives from the stored value.
pub fn truncate_to_micros(ts: DateTime<Utc>) -> DateTime<Utc> {
    ts.with_nanosecond(ts.nanosecond() / 1_000 * 1_000)
        .unwrap_or(ts)
}

/// Renders a capture timestamp as the canonical ISO-8601 string used as
/// chain input: RFC 3339 with six fractional digits and a `Z` suffix.
pub fn capture_timestamp_iso(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}
