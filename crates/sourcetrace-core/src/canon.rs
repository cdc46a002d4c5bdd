// URL canonicalization for sourcetrace
//
// The canonical URL is the deduplication key for a source and a chain
// digest input, so the rules here are part of the verification contract.

use anyhow::{Context, Result};
use url::Url;

/// Normalizes an arbitrary URL into its canonical form.
///
/// Rules, applied in order: lowercase scheme and host, drop any fragment,
/// empty path becomes `/`, strip a single trailing slash from non-root
/// paths, preserve the query string. No network access; idempotent.
pub fn canonicalize_url(raw: &str) -> Result<String> {
    let mut parsed = Url::parse(raw).with_context(|| format!("invalid URL: {raw}"))?;
    parsed.set_fragment(None);

    let path = parsed.path().to_string();
    if path != "/" && path.ends_with('/') {
        parsed.set_path(&path[..path.len() - 1]);
    }

    Ok(parsed.into())
}
