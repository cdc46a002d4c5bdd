// sourcetrace-core - capture integrity chain and proof pack primitives
//
// Pure logic shared by the API server and the CLI verifier: content and
// chain digests, URL canonicalization, canonical JSON encoding, and the
// proof pack builder/verifier pair. Nothing in this crate touches the
// network or a database.

pub mod canon;
pub mod chain;
pub mod encode;
pub mod hash;
pub mod pack;
pub mod types;
pub mod verify;

pub use canon::canonicalize_url;
pub use chain::{capture_timestamp_iso, chain_sha256, truncate_to_micros};
pub use encode::to_canonical_json;
pub use hash::{empty_sha256, sha256_hex};
pub use pack::{
    build_proof_pack, PackError, PackRequest, ProofPack, DEFAULT_TIMELINE_LIMIT, MANIFEST_PATH,
    METHODOLOGY_PATH, TIMELINE_PATH, VERIFY_SCRIPT_PATH,
};
pub use types::{ManifestFileEntry, PackManifest, TimelineDocument, TimelineItem};
pub use verify::{
    verify_pack_archive, verify_pack_dir, verify_pack_files, ChainOutcome, FileOutcome,
    VerificationReport,
};
