//! Capture creation: the capture sequencer.
//!
//! One invocation performs one fetch-and-hash event for a source and
//! persists the capture, its artifacts, and an audit event as a single
//! transaction. Captures for the same source are serialized end-to-end
//! by a row lock on the source; captures for different sources proceed
//! independently.

use axum::extract::{Path, State};
use axum::routing::post;
use axum::{Json, Router};
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::fetch::{failure_document, FetchedDocument};
use crate::models::capture::Capture;
use crate::models::capture_artifact::{ArtifactKind, LOCAL_BUCKET};
use crate::models::event_log::{EventLog, EVENT_CAPTURE_CREATED, EVENT_CAPTURE_FAILED};
use crate::models::source::Source;
use crate::state::AppState;
use crate::tenant::OrgContext;
use sourcetrace_core::{capture_timestamp_iso, chain_sha256, truncate_to_micros};

/// Summary returned after a capture is recorded.
#[derive(Debug, Serialize)]
pub struct CaptureResponse {
    pub id: Uuid,
    pub source_id: Uuid,
    /// Capture timestamp exactly as fed to the chain digest.
    pub captured_at: String,
    /// HTTP status; 0 for an absorbed fetch failure.
    pub fetch_status: i32,
    pub raw_bytes_sha256: String,
    pub normalized_text_sha256: String,
    pub chain_sha256: String,
}

/// Creates the captures router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/{source_id}/captures", post(create_capture))
        .with_state(state)
}

/// POST /api/v1/sources/{source_id}/captures
///
/// Records one capture. The `FOR UPDATE` lock on the source row holds
/// for the whole transaction, so reading the predecessor and inserting
/// the new capture can never interleave with another capture of the
/// same source; the chain cannot fork.
async fn create_capture(
    State(state): State<AppState>,
    OrgContext(org_id): OrgContext,
    Path(source_id): Path<Uuid>,
) -> Result<Json<CaptureResponse>, AppError> {
    let mut tx = state.pool.begin().await?;

    let source: Source = sqlx::query_as(
        r#"
        SELECT id, org_id, url, canonical_url, title, is_active, created_at
        FROM source
        WHERE id = $1 AND org_id = $2 AND is_active
        FOR UPDATE
        "#,
    )
    .bind(source_id)
    .bind(org_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::NotFound("Source not found".to_string()))?;

    let prev: Option<Capture> = sqlx::query_as(
        r#"
        SELECT id, org_id, source_id, captured_at, fetch_status, fetch_error,
               content_type, etag, last_modified, response_headers,
               raw_bytes_sha256, normalized_text_sha256, normalized_text_len,
               prev_capture_id, chain_sha256, created_at
        FROM capture
        WHERE source_id = $1 AND org_id = $2
        ORDER BY captured_at DESC
        LIMIT 1
        "#,
    )
    .bind(source_id)
    .bind(org_id)
    .fetch_optional(&mut *tx)
    .await?;

    // One instant serves both the stored timestamp and the chain input;
    // truncated to the microsecond precision the store keeps.
    let captured_at = truncate_to_micros(Utc::now());
    let captured_at_iso = capture_timestamp_iso(&captured_at);

    let fetched = match state.fetcher.fetch(&source.canonical_url).await {
        Ok(document) => document,
        Err(err) => {
            tracing::warn!(source_id = %source_id, error = %err, "fetch failed; recording failure capture");
            failure_document(err)
        }
    };

    let prev_id_str = prev.as_ref().map(|c| c.id.to_string());
    let prev_chain = prev.as_ref().map(|c| c.chain_sha256.clone());
    let chain = chain_sha256(
        prev_id_str.as_deref(),
        prev_chain.as_deref(),
        &fetched.raw_bytes_sha256,
        &fetched.normalized_text_sha256,
        &captured_at_iso,
        &source.canonical_url,
    );

    let capture_id = Uuid::new_v4();
    insert_capture(
        &mut tx,
        capture_id,
        org_id,
        source_id,
        captured_at,
        &fetched,
        prev.as_ref().map(|c| c.id),
        &chain,
    )
    .await?;
    insert_artifacts(&mut tx, capture_id, &fetched).await?;

    let event_type = if fetched.fetch_error.is_none() {
        EVENT_CAPTURE_CREATED
    } else {
        EVENT_CAPTURE_FAILED
    };
    EventLog::record(
        &mut *tx,
        org_id,
        event_type,
        "capture",
        capture_id,
        serde_json::json!({ "source_id": source_id, "fetch_status": fetched.status }),
    )
    .await?;

    tx.commit().await?;

    Ok(Json(CaptureResponse {
        id: capture_id,
        source_id,
        captured_at: captured_at_iso,
        fetch_status: fetched.status,
        raw_bytes_sha256: fetched.raw_bytes_sha256,
        normalized_text_sha256: fetched.normalized_text_sha256,
        chain_sha256: chain,
    }))
}

#[allow(clippy::too_many_arguments)]
async fn insert_capture(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    capture_id: Uuid,
    org_id: Uuid,
    source_id: Uuid,
    captured_at: chrono::DateTime<Utc>,
    fetched: &FetchedDocument,
    prev_capture_id: Option<Uuid>,
    chain: &str,
) -> Result<(), AppError> {
    sqlx::query(
        r#"
        INSERT INTO capture (
            id, org_id, source_id, captured_at,
            fetch_status, fetch_error, content_type, etag, last_modified,
            response_headers, raw_bytes_sha256, normalized_text_sha256,
            normalized_text_len, prev_capture_id, chain_sha256
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        "#,
    )
    .bind(capture_id)
    .bind(org_id)
    .bind(source_id)
    .bind(captured_at)
    .bind(fetched.status)
    .bind(&fetched.fetch_error)
    .bind(&fetched.content_type)
    .bind(&fetched.etag)
    .bind(&fetched.last_modified)
    .bind(&fetched.response_headers)
    .bind(&fetched.raw_bytes_sha256)
    .bind(&fetched.normalized_text_sha256)
    .bind(fetched.normalized_text_len)
    .bind(prev_capture_id)
    .bind(chain)
    .execute(&mut **tx)
    .await
    .map_err(|e| AppError::conflict_on_unique_violation(e, "concurrent capture collision"))?;
    Ok(())
}

/// Inserts the raw and normalized-text artifact rows for one capture.
/// Payload storage is external; only locator and digest are recorded.
async fn insert_artifacts(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    capture_id: Uuid,
    fetched: &FetchedDocument,
) -> Result<(), AppError> {
    let artifacts = [
        (
            ArtifactKind::Raw,
            &fetched.raw_bytes_sha256,
            fetched.raw_bytes.len() as i64,
        ),
        (
            ArtifactKind::Text,
            &fetched.normalized_text_sha256,
            fetched.normalized_text.len() as i64,
        ),
    ];
    for (kind, sha256, size) in artifacts {
        sqlx::query(
            r#"
            INSERT INTO capture_artifact (id, capture_id, kind, bucket, object_key, bytes, sha256)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(capture_id)
        .bind(kind.as_str())
        .bind(LOCAL_BUCKET)
        .bind(kind.object_key(capture_id))
        .bind(size)
        .bind(sha256)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use sourcetrace_core::empty_sha256;

    #[test]
    fn test_failure_capture_chains_like_any_other() {
        // A failed fetch substitutes empty-payload digests but still
        // extends the chain deterministically.
        let failed = failure_document("dns error");
        let chain = chain_sha256(
            Some("cap-1"),
            Some("prevchain"),
            &failed.raw_bytes_sha256,
            &failed.normalized_text_sha256,
            "2026-03-05T14:30:15.000000Z",
            "https://example.com/doc",
        );
        let expected = chain_sha256(
            Some("cap-1"),
            Some("prevchain"),
            &empty_sha256(),
            &empty_sha256(),
            "2026-03-05T14:30:15.000000Z",
            "https://example.com/doc",
        );
        assert_eq!(chain, expected);
        assert_eq!(failed.status, 0);
    }

    #[test]
    fn test_event_type_selection() {
        let ok = FetchedDocument {
            fetch_error: None,
            ..failure_document("ignored")
        };
        assert_eq!(
            if ok.fetch_error.is_none() {
                EVENT_CAPTURE_CREATED
            } else {
                EVENT_CAPTURE_FAILED
            },
            EVENT_CAPTURE_CREATED
        );
        let failed = failure_document("boom");
        assert_eq!(
            if failed.fetch_error.is_none() {
                EVENT_CAPTURE_CREATED
            } else {
                EVENT_CAPTURE_FAILED
            },
            EVENT_CAPTURE_FAILED
        );
    }
}
