//! Proof pack export endpoint.
//!
//! Reads a bounded capture window for a source and delegates to the
//! core builder. Building only reads committed rows, so it runs safely
//! alongside capture creation with no extra coordination; this handler
//! is the async boundary around the single synchronous build path.

use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::capture::Capture;
use crate::models::source::Source;
use crate::state::AppState;
use crate::tenant::OrgContext;
use sourcetrace_core::{build_proof_pack, PackRequest, TimelineItem, DEFAULT_TIMELINE_LIMIT};

/// Query parameters for a pack build.
#[derive(Debug, Deserialize)]
pub struct ProofPackQuery {
    /// Maximum captures included in the timeline window.
    pub limit: Option<i64>,
}

/// Creates the proof pack router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/{source_id}/proofpack", get(download_proof_pack))
        .with_state(state)
}

/// GET /api/v1/sources/{source_id}/proofpack
///
/// Builds and returns a proof pack archive for the source.
async fn download_proof_pack(
    State(state): State<AppState>,
    OrgContext(org_id): OrgContext,
    Path(source_id): Path<Uuid>,
    Query(query): Query<ProofPackQuery>,
) -> Result<Response, AppError> {
    let source: Source = sqlx::query_as(
        r#"
        SELECT id, org_id, url, canonical_url, title, is_active, created_at
        FROM source
        WHERE id = $1 AND org_id = $2
        "#,
    )
    .bind(source_id)
    .bind(org_id)
    .fetch_optional(&state.pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Source not found".to_string()))?;

    let limit = query.limit.unwrap_or(DEFAULT_TIMELINE_LIMIT).clamp(1, 500);
    let captures: Vec<Capture> = sqlx::query_as(
        r#"
        SELECT id, org_id, source_id, captured_at, fetch_status, fetch_error,
               content_type, etag, last_modified, response_headers,
               raw_bytes_sha256, normalized_text_sha256, normalized_text_len,
               prev_capture_id, chain_sha256, created_at
        FROM capture
        WHERE source_id = $1 AND org_id = $2
        ORDER BY captured_at ASC
        LIMIT $3
        "#,
    )
    .bind(source_id)
    .bind(org_id)
    .bind(limit)
    .fetch_all(&state.pool)
    .await?;

    // The canonical URL is denormalized into every item so the pack
    // verifies with no input beyond its own timeline.
    let items = captures
        .into_iter()
        .map(|capture| TimelineItem {
            id: capture.id.to_string(),
            prev_capture_id: capture.prev_capture_id.map(|id| id.to_string()),
            captured_at: capture.captured_at_iso(),
            canonical_url: source.canonical_url.clone(),
            raw_bytes_sha256: capture.raw_bytes_sha256,
            normalized_text_sha256: capture.normalized_text_sha256,
            chain_sha256: Some(capture.chain_sha256),
        })
        .collect();

    let request = PackRequest {
        source_id: source.id.to_string(),
        generated_at: Utc::now(),
        items,
    };
    let pack = build_proof_pack(&request).map_err(|e| {
        tracing::error!(source_id = %source_id, error = %e, "proof pack build failed");
        AppError::Internal(e.to_string())
    })?;

    let disposition = format!("attachment; filename=\"{}\"", pack.filename);
    Ok((
        [
            (header::CONTENT_TYPE, "application/zip".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        pack.bytes,
    )
        .into_response())
}
