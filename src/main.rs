mod api;
mod authentication;
mod config;
mod db;
mod errors;
mod system;

use std::error::Error;
use std::sync::Arc;

use axum_prometheus::PrometheusMetricLayer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::api::create_api_router;
use crate::config::Settings;
use crate::db::{init_db, PgRepository, VideoRepository};

#[derive(Clone)]
pub struct InnerState {
    pub repo: Arc<dyn VideoRepository>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vidshare_api=debug,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::from_env()?;

    let pool = init_db(&settings.database).await?;
    let repo = PgRepository::new(pool, settings.database.query_timeout);
    let app_state = InnerState {
        repo: Arc::new(repo),
    };

    let (prometheus_layer, metric_handle) = PrometheusMetricLayer::pair();

    let app = create_api_router(
        app_state,
        settings.request_timeout,
        prometheus_layer,
        metric_handle,
    );

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", settings.port)).await?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {:?}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
