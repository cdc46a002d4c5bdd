//! sourcetrace server binary.

use tracing_subscriber::EnvFilter;

use sourcetrace_server::config::Config;
use sourcetrace_server::fetch::Fetcher;
use sourcetrace_server::routes::create_router;
use sourcetrace_server::state::AppState;
use sourcetrace_server::db;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;

    let pool = db::create_pool(&config.database_url).await?;
    db::run_migrations(&pool).await?;

    let fetcher = Fetcher::new(config.fetch_timeout)?;
    let app = create_router(AppState { pool, fetcher });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("listening on {}", config.bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
