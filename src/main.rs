use std::sync::Arc;

use movie_recommender_api::{create_router, AppState, Catalog, Config};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(env_filter).with_target(false).init();

    let config = Config::from_env()?;

    // The server still starts without data so /health can report the problem
    let catalog = match Catalog::load(&config.dataset_path) {
        Ok(catalog) => Some(catalog),
        Err(e) => {
            tracing::error!(
                error = %e,
                path = %config.dataset_path,
                "Failed to load movie dataset"
            );
            None
        }
    };

    let addr = format!("{}:{}", config.host, config.port);
    let state = Arc::new(AppState::new(catalog, config));
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server running on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
