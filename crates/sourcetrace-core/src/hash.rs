// SHA-256 content digests for sourcetrace

use sha2::{Digest, Sha256};

/// Computes the SHA-256 digest of the input bytes as a lowercase hex string.
///
/// Applied identically to raw payloads, normalized text, and proof-pack
/// file contents.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Digest of the empty byte string, used as the substitute content digest
/// for failed fetches.
pub fn empty_sha256() -> String {
    sha256_hex(b"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_vectors() {
        assert_eq!(
            sha256_hex(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(
            sha256_hex(b"hello"),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_sha256_is_lowercase_hex() {
        let digest = sha256_hex(b"capture");
        assert_eq!(digest.len(), 64);
        assert!(digest
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_uppercase()));
    }

    #[test]
    fn test_sha256_is_stable_across_calls() {
        let a = sha256_hex(b"same input");
        let b = sha256_hex(b"same input");
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_sha256_matches_empty_input() {
        assert_eq!(empty_sha256(), sha256_hex(b""));
    }
}
