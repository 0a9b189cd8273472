use anyhow::Context;
use clap::Parser;
use gradebookd::api::{build_router, AppState};
use gradebookd::config::Config;
use gradebookd::{db, uploads};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::parse();

    uploads::ensure_upload_dir(&config.upload_dir)?;
    let pool = db::open_pool(&config.database, config.pool_size, config.pool_timeout())?;
    tracing::info!(
        database = %config.database.to_string_lossy(),
        upload_dir = %config.upload_dir.to_string_lossy(),
        pool_size = config.pool_size,
        "database ready"
    );

    let bind = config.bind;
    let app = build_router(AppState::new(pool, config));

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind {}", bind))?;
    tracing::info!(%bind, "gradebookd listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
