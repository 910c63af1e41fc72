use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crescent::config::AppConfig;
use crescent::handlers;
use crescent::services::backend::http::HttpBookingService;
use crescent::services::console::LogNotifier;
use crescent::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let backend = Arc::new(HttpBookingService::new(config.backend_url.clone()));
    tracing::info!("using booking service at {}", backend.base_url());

    if config.admin_token.is_none() {
        tracing::warn!("ADMIN_TOKEN is not set; console routes are unauthenticated");
    }

    let state = Arc::new(AppState::new(
        config.clone(),
        backend.clone(),
        backend,
        Arc::new(LogNotifier),
    ));

    // Initial load; a failure is kept in the console view.
    if let Err(e) = state.console.refresh().await {
        tracing::warn!(error = %e, "initial booking fetch failed");
    }

    let app = handlers::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
