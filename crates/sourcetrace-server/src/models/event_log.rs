//! Audit event model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Event recorded when a source is created.
pub const EVENT_SOURCE_CREATED: &str = "source.created";

/// Event recorded when a capture succeeds.
pub const EVENT_CAPTURE_CREATED: &str = "capture.created";

/// Event recorded when a capture's fetch failed (the capture row still
/// exists; this only marks the outcome).
pub const EVENT_CAPTURE_FAILED: &str = "capture.failed";

/// An append-only record of a state-changing action. Never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct EventLog {
    /// Unique identifier for this event.
    pub id: Uuid,
    /// Owning organization.
    pub org_id: Uuid,
    /// When the event happened.
    pub at: DateTime<Utc>,
    /// Acting user, when one is known.
    pub actor_user_id: Option<Uuid>,
    /// Event discriminator, e.g. `capture.created`.
    pub event_type: String,
    /// Entity kind the event refers to.
    pub entity_type: String,
    /// Entity the event refers to.
    pub entity_id: Uuid,
    /// Structured event payload.
    pub payload: serde_json::Value,
}

impl EventLog {
    /// Appends one audit event. Callers pass their open transaction so
    /// the event commits or rolls back with the action it describes.
    pub async fn record<'e, E>(
        executor: E,
        org_id: Uuid,
        event_type: &str,
        entity_type: &str,
        entity_id: Uuid,
        payload: serde_json::Value,
    ) -> Result<(), sqlx::Error>
    where
        E: sqlx::PgExecutor<'e>,
    {
        sqlx::query(
            r#"
            INSERT INTO event_log (id, org_id, event_type, entity_type, entity_id, payload)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(org_id)
        .bind(event_type)
        .bind(entity_type)
        .bind(entity_id)
        .bind(payload)
        .execute(executor)
        .await?;
        Ok(())
    }
}
