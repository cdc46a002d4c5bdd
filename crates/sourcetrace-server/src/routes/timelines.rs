//! Capture timeline endpoints.

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::capture::Capture;
use crate::state::AppState;
use crate::tenant::OrgContext;
use sourcetrace_core::DEFAULT_TIMELINE_LIMIT;

/// Query parameters for the timeline listing.
#[derive(Debug, Deserialize)]
pub struct TimelineQuery {
    pub limit: Option<i64>,
}

/// One capture summary in a timeline listing.
#[derive(Debug, Serialize)]
pub struct TimelineItemSummary {
    pub id: Uuid,
    pub captured_at: String,
    pub fetch_status: i32,
    pub raw_bytes_sha256: String,
    pub normalized_text_sha256: String,
    pub chain_sha256: String,
}

/// Timeline listing response.
#[derive(Debug, Serialize)]
pub struct TimelineResponse {
    pub source_id: Uuid,
    pub items: Vec<TimelineItemSummary>,
}

/// Creates the timelines router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/{source_id}/timeline", get(get_timeline))
        .with_state(state)
}

/// GET /api/v1/sources/{source_id}/timeline
///
/// Returns capture summaries for a source, newest first.
async fn get_timeline(
    State(state): State<AppState>,
    OrgContext(org_id): OrgContext,
    Path(source_id): Path<Uuid>,
    Query(query): Query<TimelineQuery>,
) -> Result<Json<TimelineResponse>, AppError> {
    let exists: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM source WHERE id = $1 AND org_id = $2")
            .bind(source_id)
            .bind(org_id)
            .fetch_optional(&state.pool)
            .await?;
    if exists.is_none() {
        return Err(AppError::NotFound("Source not found".to_string()));
    }

    let limit = query.limit.unwrap_or(DEFAULT_TIMELINE_LIMIT).clamp(1, 500);
    let captures: Vec<Capture> = sqlx::query_as(
        r#"
        SELECT id, org_id, source_id, captured_at, fetch_status, fetch_error,
               content_type, etag, last_modified, response_headers,
               raw_bytes_sha256, normalized_text_sha256, normalized_text_len,
               prev_capture_id, chain_sha256, created_at
        FROM capture
        WHERE source_id = $1 AND org_id = $2
        ORDER BY captured_at DESC
        LIMIT $3
        "#,
    )
    .bind(source_id)
    .bind(org_id)
    .bind(limit)
    .fetch_all(&state.pool)
    .await?;

    let items = captures
        .into_iter()
        .map(|capture| TimelineItemSummary {
            id: capture.id,
            captured_at: capture.captured_at_iso(),
            fetch_status: capture.fetch_status,
            raw_bytes_sha256: capture.raw_bytes_sha256,
            normalized_text_sha256: capture.normalized_text_sha256,
            chain_sha256: capture.chain_sha256,
        })
        .collect();

    Ok(Json(TimelineResponse { source_id, items }))
}
