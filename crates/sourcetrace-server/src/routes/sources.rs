//! Source registration endpoints.

use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;
use crate::models::event_log::{EventLog, EVENT_SOURCE_CREATED};
use crate::state::AppState;
use crate::tenant::OrgContext;
use sourcetrace_core::canonicalize_url;

/// Request body for registering a source.
#[derive(Debug, Deserialize)]
pub struct CreateSourceRequest {
    /// URL to track. Canonicalized before any uniqueness check.
    pub url: String,
    /// Optional display title.
    pub title: Option<String>,
}

/// Response for a registered source.
#[derive(Debug, Serialize)]
pub struct SourceResponse {
    pub id: Uuid,
    pub url: String,
    pub canonical_url: String,
}

/// Creates the sources router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", post(create_source))
        .with_state(state)
}

/// POST /api/v1/sources
///
/// Registers a new tracked source. The canonical URL is unique per
/// organization; a duplicate registration is a 409.
async fn create_source(
    State(state): State<AppState>,
    OrgContext(org_id): OrgContext,
    Json(payload): Json<CreateSourceRequest>,
) -> Result<Json<SourceResponse>, AppError> {
    let canonical = canonicalize_url(&payload.url)
        .map_err(|e| AppError::BadRequest(format!("invalid url: {e}")))?;

    let existing: Option<(Uuid,)> =
        sqlx::query_as("SELECT id FROM source WHERE org_id = $1 AND canonical_url = $2 LIMIT 1")
            .bind(org_id)
            .bind(&canonical)
            .fetch_optional(&state.pool)
            .await?;
    if existing.is_some() {
        return Err(AppError::Conflict("Source already exists".to_string()));
    }

    let id = Uuid::new_v4();
    let mut tx = state.pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO source (id, org_id, url, canonical_url, title)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(id)
    .bind(org_id)
    .bind(&payload.url)
    .bind(&canonical)
    .bind(&payload.title)
    .execute(&mut *tx)
    .await
    // The pre-check above races with concurrent registrations; the
    // unique constraint is the authority.
    .map_err(|e| AppError::conflict_on_unique_violation(e, "Source already exists"))?;

    EventLog::record(
        &mut *tx,
        org_id,
        EVENT_SOURCE_CREATED,
        "source",
        id,
        serde_json::json!({ "url": payload.url, "canonical_url": canonical }),
    )
    .await?;

    tx.commit().await?;

    Ok(Json(SourceResponse {
        id,
        url: payload.url,
        canonical_url: canonical,
    }))
}
