//! sourcetrace server - capture sequencing and proof pack export API
//!
//! This crate provides the REST API for tracking remote documents:
//! registering sources, recording hash-chained captures, listing
//! timelines, and exporting verifiable proof packs.

pub mod config;
pub mod db;
pub mod error;
pub mod fetch;
pub mod models;
pub mod routes;
pub mod state;
pub mod tenant;

pub use error::AppError;
pub use routes::create_router;
pub use state::AppState;
