//! Document fetching and text normalization.
//!
//! Retrieves a document once over HTTP (redirects followed, bounded
//! timeout) and derives the normalized text rendition that feeds the
//! content digests. Fetch errors never surface to callers as errors;
//! the sequencer substitutes [`failure_document`] so a failed fetch
//! still yields a valid, chainable capture record.

use std::time::Duration;

use anyhow::Result;
use reqwest::header::{HeaderMap, CONTENT_TYPE, ETAG, LAST_MODIFIED};
use scraper::{Html, Node};

use sourcetrace_core::{empty_sha256, sha256_hex};

/// User agent sent with every fetch.
const USER_AGENT: &str = "sourcetrace/0.1";

/// Everything derived from one fetch attempt.
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    /// HTTP status code; 0 signals a fetch failure and is distinct from
    /// any real status.
    pub status: i32,
    /// Error description for failed fetches, `None` on success.
    pub fetch_error: Option<String>,
    pub content_type: Option<String>,
    pub etag: Option<String>,
    pub last_modified: Option<String>,
    /// Response headers as a JSON object.
    pub response_headers: serde_json::Value,
    /// Raw response payload.
    pub raw_bytes: Vec<u8>,
    /// SHA-256 of the raw payload.
    pub raw_bytes_sha256: String,
    /// Normalized UTF-8 text rendition of the payload.
    pub normalized_text: String,
    /// SHA-256 of the normalized text.
    pub normalized_text_sha256: String,
    /// Byte length of the normalized text.
    pub normalized_text_len: i32,
}

/// HTTP fetcher with a bounded timeout.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
}

impl Fetcher {
    /// Builds a fetcher. Redirects are followed; `timeout` bounds the
    /// whole request.
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    /// Fetches a document and derives its digests.
    ///
    /// Callers are expected to catch any error and substitute
    /// [`failure_document`]; nothing here retries.
    pub async fn fetch(&self, url: &str) -> Result<FetchedDocument> {
        let response = self.client.get(url).send().await?;
        let status = i32::from(response.status().as_u16());
        let response_headers = headers_to_json(response.headers());
        let content_type = header_value(response.headers(), CONTENT_TYPE.as_str());
        let etag = header_value(response.headers(), ETAG.as_str());
        let last_modified = header_value(response.headers(), LAST_MODIFIED.as_str());

        let raw_bytes = response.bytes().await?.to_vec();
        let normalized_text = normalize_html_to_text(&raw_bytes);

        Ok(FetchedDocument {
            status,
            fetch_error: None,
            content_type,
            etag,
            last_modified,
            response_headers,
            raw_bytes_sha256: sha256_hex(&raw_bytes),
            normalized_text_sha256: sha256_hex(normalized_text.as_bytes()),
            normalized_text_len: normalized_text.len() as i32,
            raw_bytes,
            normalized_text,
        })
    }
}

/// Deterministic substitute for a failed fetch: empty payloads, digests
/// of the empty byte string, status 0, and the error description.
pub fn failure_document(error: impl std::fmt::Display) -> FetchedDocument {
    FetchedDocument {
        status: 0,
        fetch_error: Some(error.to_string()),
        content_type: None,
        etag: None,
        last_modified: None,
        response_headers: serde_json::json!({}),
        raw_bytes: Vec::new(),
        raw_bytes_sha256: empty_sha256(),
        normalized_text: String::new(),
        normalized_text_sha256: empty_sha256(),
        normalized_text_len: 0,
    }
}

/// Extracts visible text from an HTML payload: text nodes outside
/// script/style/noscript subtrees, whitespace collapsed to single
/// spaces, trimmed. Non-HTML payloads fall through as collapsed text.
pub fn normalize_html_to_text(raw: &[u8]) -> String {
    let html = String::from_utf8_lossy(raw);
    let document = Html::parse_document(&html);

    let mut collected = String::new();
    for node in document.tree.nodes() {
        if let Node::Text(text) = node.value() {
            let hidden = node.ancestors().any(|ancestor| match ancestor.value() {
                Node::Element(element) => {
                    matches!(element.name(), "script" | "style" | "noscript")
                }
                _ => false,
            });
            if !hidden {
                collected.push(' ');
                collected.push_str(text);
            }
        }
    }

    collected.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
}

fn headers_to_json(headers: &HeaderMap) -> serde_json::Value {
    let map: serde_json::Map<String, serde_json::Value> = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                serde_json::Value::String(String::from_utf8_lossy(value.as_bytes()).to_string()),
            )
        })
        .collect();
    serde_json::Value::Object(map)
}
