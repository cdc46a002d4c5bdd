//! Shared application state.

use sqlx::PgPool;

use crate::fetch::Fetcher;

/// State handed to every route: the database pool and the document
/// fetcher. Both are cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub fetcher: Fetcher,
}
